//! In-memory catalog types.
//!
//! The catalog is loaded once and then only read. Identity of a symbol is
//! always carried as a structured [`SymbolOption`]; the `"Name (SYMBOL)"`
//! label is a display string and is never the source of truth.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::search::symbol_from_label;

/// One tradable instrument from the exchange reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolRecord {
    /// Exchange-qualified ticker (e.g. `NSE:SBIN-EQ`).
    pub symbol: String,
    /// Human-readable name. Missing names are excluded from name searches.
    pub name: Option<String>,
    /// Instrument-type code from the reference table, when it parsed.
    pub segment: Option<i64>,
}

impl SymbolRecord {
    /// Builds a record with a known name and segment.
    pub fn new(symbol: impl Into<String>, name: impl Into<String>, segment: i64) -> Self {
        Self {
            symbol: symbol.into(),
            name: Some(name.into()),
            segment: Some(segment),
        }
    }

    /// The structured selection handle for this record.
    pub fn to_option(&self) -> SymbolOption {
        SymbolOption {
            symbol: self.symbol.clone(),
            name: self.name.clone(),
        }
    }
}

/// A selectable `(symbol, name)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolOption {
    /// Exchange-qualified ticker passed to the history API.
    pub symbol: String,
    /// Display name, if the catalog had one.
    pub name: Option<String>,
}

impl SymbolOption {
    /// A bare symbol with no display name.
    pub fn bare(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: None,
        }
    }

    /// Display name, falling back to the symbol itself.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.symbol)
    }

    /// `"Name (SYMBOL)"`, as shown in selection lists.
    pub fn label(&self) -> String {
        format!("{} ({})", self.display_name(), self.symbol)
    }
}

impl fmt::Display for SymbolOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Where a [`Catalog`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogOrigin {
    /// Downloaded and parsed from the remote reference CSV.
    Remote,
    /// The built-in two-row table used when the download fails.
    Fallback,
}

/// The symbol catalog: cash-equity instruments in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    records: Vec<SymbolRecord>,
    origin: CatalogOrigin,
}

impl Catalog {
    /// Wraps already-filtered records.
    pub fn new(records: Vec<SymbolRecord>, origin: CatalogOrigin) -> Self {
        Self { records, origin }
    }

    /// All records in source order.
    pub fn records(&self) -> &[SymbolRecord] {
        &self.records
    }

    /// Whether this is the remote table or the fallback.
    pub fn origin(&self) -> CatalogOrigin {
        self.origin
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// `true` when the catalog has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every distinct symbol, first occurrence wins, in catalog order.
    pub fn unique_symbols(&self) -> Vec<SymbolOption> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut unique = Vec::new();
        for record in &self.records {
            if seen.insert(record.symbol.as_str()) {
                unique.push(record.to_option());
            }
        }
        unique
    }

    /// Finds a record by exact symbol (case-insensitive).
    pub fn find(&self, symbol: &str) -> Option<&SymbolRecord> {
        let symbol = symbol.trim();
        self.records
            .iter()
            .find(|record| record.symbol.eq_ignore_ascii_case(symbol))
    }

    /// Resolves user input that is either a bare symbol or a
    /// `"Name (SYMBOL)"` label.
    pub fn resolve(&self, input: &str) -> Option<SymbolOption> {
        if let Some(record) = self.find(input) {
            return Some(record.to_option());
        }
        let symbol = symbol_from_label(input)?;
        self.find(symbol).map(SymbolRecord::to_option)
    }
}
