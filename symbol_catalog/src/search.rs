//! Name search over the catalog.

use crate::models::{Catalog, SymbolOption};

/// Outcome of a catalog search. An empty match set is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResult {
    /// Nothing matched the query.
    NoResults,
    /// Matching options in catalog order.
    Matches(Vec<SymbolOption>),
}

impl SearchResult {
    /// Matching options; empty for [`SearchResult::NoResults`].
    pub fn options(&self) -> &[SymbolOption] {
        match self {
            SearchResult::NoResults => &[],
            SearchResult::Matches(options) => options,
        }
    }

    /// Consumes the result into its options.
    pub fn into_options(self) -> Vec<SymbolOption> {
        match self {
            SearchResult::NoResults => Vec::new(),
            SearchResult::Matches(options) => options,
        }
    }
}

/// Filters the catalog by case-insensitive substring match on the name.
///
/// An empty query returns every record (including nameless ones). Any other
/// query, whitespace included, is matched as given and never matches a
/// record without a name.
pub fn search(catalog: &Catalog, query: &str) -> SearchResult {
    let needle = query.to_lowercase();
    let options: Vec<SymbolOption> = if needle.is_empty() {
        catalog.records().iter().map(|r| r.to_option()).collect()
    } else {
        catalog
            .records()
            .iter()
            .filter(|record| {
                record
                    .name
                    .as_deref()
                    .is_some_and(|name| name.to_lowercase().contains(&needle))
            })
            .map(|r| r.to_option())
            .collect()
    };

    if options.is_empty() {
        SearchResult::NoResults
    } else {
        SearchResult::Matches(options)
    }
}

/// Extracts `SYMBOL` from a `"Name (SYMBOL)"` label.
///
/// Only the last parenthesised group counts, so names that themselves
/// contain parentheses still resolve. Prefer carrying [`SymbolOption`] values;
/// this is for labels typed or pasted by a user.
pub fn symbol_from_label(label: &str) -> Option<&str> {
    let inner = label.trim().strip_suffix(')')?;
    let open = inner.rfind('(')?;
    let symbol = inner[open + 1..].trim();
    if symbol.is_empty() { None } else { Some(symbol) }
}
