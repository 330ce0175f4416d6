//! Downloading and parsing the exchange reference CSV.
//!
//! The upstream file is positional CSV with no header row. We assign the
//! fixed column names below, append generated `colN` names for any trailing
//! columns, and keep only cash-equity rows. Anything that goes wrong falls
//! back to [`fallback_catalog`] so the rest of the tool keeps working offline.

use std::time::Duration;

use async_trait::async_trait;
use csv::{ReaderBuilder, StringRecord};
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::errors::CatalogError;
use crate::models::{Catalog, CatalogOrigin, SymbolRecord};

/// Public NSE cash-market symbol master.
pub const DEFAULT_CATALOG_URL: &str = "https://public.fyers.in/sym_details/NSE_CM.csv";

/// `segment` value identifying cash-equity instruments.
pub const CASH_EQUITY_SEGMENT: i64 = 0;

/// Names assigned to the leading positional columns of the reference CSV.
pub const CATALOG_COLUMNS: [&str; 18] = [
    "fytoken",
    "name",
    "segment",
    "lot_size",
    "tick_size",
    "isin",
    "trading_session",
    "last_update",
    "expiry",
    "symbol",
    "exchange",
    "segment_code",
    "short_name",
    "strike",
    "option_type",
    "fytoken2",
    "misc",
    "misc2",
];

/// Anything that can produce a [`Catalog`].
///
/// Loading never fails from the caller's point of view; implementations
/// recover internally (see [`CatalogLoader`]).
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Produces a catalog, falling back to a static table on failure.
    async fn load(&self) -> Catalog;
}

/// Loads the catalog over HTTP.
#[derive(Debug, Clone)]
pub struct CatalogLoader {
    client: Client,
    url: String,
}

impl CatalogLoader {
    /// Creates a loader for `url` whose requests give up after `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(CatalogError::ClientBuild)?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// The URL this loader downloads from.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Downloads and parses the catalog without the fallback.
    pub async fn try_load(&self) -> Result<Catalog, CatalogError> {
        let body = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_catalog_csv(&body)
    }
}

#[async_trait]
impl CatalogSource for CatalogLoader {
    async fn load(&self) -> Catalog {
        match self.try_load().await {
            Ok(catalog) => {
                info!(url = %self.url, symbols = catalog.len(), "symbol catalog loaded");
                catalog
            }
            Err(err) => {
                warn!(url = %self.url, error = %err, "symbol catalog unavailable, using fallback table");
                fallback_catalog()
            }
        }
    }
}

/// The two-row table used when the remote catalog cannot be loaded.
pub fn fallback_catalog() -> Catalog {
    Catalog::new(
        vec![
            SymbolRecord::new("NSE:SBIN-EQ", "State Bank of India", CASH_EQUITY_SEGMENT),
            SymbolRecord::new("NSE:INFY-EQ", "Infosys Ltd", CASH_EQUITY_SEGMENT),
        ],
        CatalogOrigin::Fallback,
    )
}

/// Column names for a raw table `raw_width` columns wide.
///
/// The count of generated `colN` names comes from the raw parsed width, so a
/// file with 21 columns gets `col18..=col20`.
pub fn column_names(raw_width: usize) -> Result<Vec<String>, CatalogError> {
    if raw_width < CATALOG_COLUMNS.len() {
        return Err(CatalogError::UnexpectedShape(format!(
            "expected at least {} columns, found {raw_width}",
            CATALOG_COLUMNS.len()
        )));
    }
    let mut names: Vec<String> = CATALOG_COLUMNS.iter().map(|c| c.to_string()).collect();
    names.extend((CATALOG_COLUMNS.len()..raw_width).map(|i| format!("col{i}")));
    Ok(names)
}

/// Headerless CSV rows with the assigned column names.
#[derive(Debug)]
pub struct RawCatalogTable {
    columns: Vec<String>,
    rows: Vec<StringRecord>,
}

impl RawCatalogTable {
    /// Parses headerless CSV. The table is as wide as its widest row; shorter
    /// rows read as empty in the columns they lack.
    pub fn parse(text: &str) -> Result<Self, CatalogError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());
        let rows = reader.records().collect::<Result<Vec<_>, _>>()?;
        let raw_width = rows
            .iter()
            .map(StringRecord::len)
            .max()
            .ok_or_else(|| CatalogError::UnexpectedShape("catalog has no rows".to_string()))?;
        let columns = column_names(raw_width)?;
        Ok(Self { columns, rows })
    }

    /// Assigned column names, fixed names first.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of a named column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Raw rows in file order.
    pub fn rows(&self) -> &[StringRecord] {
        &self.rows
    }

    fn required_index(&self, name: &str) -> Result<usize, CatalogError> {
        self.column_index(name)
            .ok_or_else(|| CatalogError::UnexpectedShape(format!("missing column {name}")))
    }
}

/// Parses the reference CSV and keeps cash-equity rows.
pub fn parse_catalog_csv(text: &str) -> Result<Catalog, CatalogError> {
    let table = RawCatalogTable::parse(text)?;
    let name_idx = table.required_index("name")?;
    let segment_idx = table.required_index("segment")?;
    let symbol_idx = table.required_index("symbol")?;

    let mut records = Vec::new();
    for row in table.rows() {
        let segment = row
            .get(segment_idx)
            .and_then(|value| value.trim().parse::<i64>().ok());
        if segment != Some(CASH_EQUITY_SEGMENT) {
            continue;
        }
        let symbol = row.get(symbol_idx).map(str::trim).unwrap_or_default();
        if symbol.is_empty() {
            debug!(?row, "skipping catalog row without symbol");
            continue;
        }
        let name = row
            .get(name_idx)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        records.push(SymbolRecord {
            symbol: symbol.to_string(),
            name,
            segment,
        });
    }

    if records.is_empty() {
        return Err(CatalogError::UnexpectedShape(
            "no cash-equity rows in catalog".to_string(),
        ));
    }
    Ok(Catalog::new(records, CatalogOrigin::Remote))
}
