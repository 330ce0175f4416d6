//! Symbol catalog: loading the exchange reference table, caching it, and
//! searching it by display name.

#![deny(missing_docs)]

pub mod cache;
pub mod errors;
pub mod loader;
pub mod models;
pub mod search;

pub use cache::CatalogCache;
pub use errors::CatalogError;
pub use loader::{CatalogLoader, CatalogSource, fallback_catalog, parse_catalog_csv};
pub use models::{Catalog, CatalogOrigin, SymbolOption, SymbolRecord};
pub use search::{SearchResult, search, symbol_from_label};
