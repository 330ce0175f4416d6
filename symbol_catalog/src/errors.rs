//! Failures while downloading or parsing the reference table.

use thiserror::Error;

/// Reasons a remote catalog could not be used.
///
/// These never reach the user: [`crate::CatalogLoader::load`] logs them and
/// substitutes [`crate::fallback_catalog`].
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Failed to build the HTTP client.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// Network failure, timeout, or non-success HTTP status.
    #[error("Catalog download failed: {0}")]
    Download(#[from] reqwest::Error),

    /// The body was not well-formed CSV.
    #[error("Catalog CSV is malformed: {0}")]
    Csv(#[from] csv::Error),

    /// The CSV parsed but does not have the expected layout.
    #[error("Unexpected catalog shape: {0}")]
    UnexpectedShape(String),
}
