//! Small helpers shared by the catalog and downloader crates.

pub mod env;
