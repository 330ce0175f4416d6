//! One user action: resolve the selection, fetch every symbol, export.

use std::collections::HashSet;

use futures::stream::{self, StreamExt};
use symbol_catalog::{Catalog, SymbolOption};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    history::{FetchOutcome, HistoryFetcher},
    io::{DataSink, ExportMode, SinkError, build_artifacts},
    models::{candle_series::CandleSeries, date_range::DateRange, resolution::Resolution},
};

pub const DEFAULT_MAX_CONCURRENT_SYMBOLS: usize = 1;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No symbols selected")]
    EmptySelection,

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Which symbols a download covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Symbols(Vec<SymbolOption>),
    /// Every unique symbol in the catalog.
    All,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub selection: Selection,
    pub range: DateRange,
    pub resolution: Resolution,
    pub mode: ExportMode,
}

impl DownloadRequest {
    /// The symbols to fetch, duplicates removed, first occurrence first.
    pub fn symbols(&self, catalog: &Catalog) -> Result<Vec<SymbolOption>, SessionError> {
        let symbols = match &self.selection {
            Selection::All => catalog.unique_symbols(),
            Selection::Symbols(options) => {
                let mut seen = HashSet::new();
                options
                    .iter()
                    .filter(|option| seen.insert(option.symbol.clone()))
                    .cloned()
                    .collect()
            }
        };
        if symbols.is_empty() {
            return Err(SessionError::EmptySelection);
        }
        Ok(symbols)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolOutcome {
    Fetched { rows: usize, skipped_windows: usize },
    /// Windows answered without candles. `skipped_windows` counts windows that
    /// failed and were skipped; at least one window always succeeded.
    NoData { skipped_windows: usize },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolReport {
    pub symbol: SymbolOption,
    pub outcome: SymbolOutcome,
}

/// Per-symbol outcomes in selection order, plus what the sink produced.
#[derive(Debug)]
pub struct DownloadReport<O> {
    pub symbols: Vec<SymbolReport>,
    /// Names of the artifacts handed to the sink.
    pub artifacts: Vec<String>,
    /// Sink output; `None` when nothing was exported.
    pub output: Option<O>,
}

impl<O> DownloadReport<O> {
    pub fn fetched(&self) -> usize {
        self.symbols
            .iter()
            .filter(|r| matches!(r.outcome, SymbolOutcome::Fetched { .. }))
            .count()
    }
}

pub struct DownloadSession {
    fetcher: HistoryFetcher,
    max_concurrent_symbols: usize,
}

impl DownloadSession {
    pub fn new(fetcher: HistoryFetcher) -> Self {
        Self {
            fetcher,
            max_concurrent_symbols: DEFAULT_MAX_CONCURRENT_SYMBOLS,
        }
    }

    /// Allows up to `limit` symbols in flight at once (minimum 1).
    pub fn with_max_concurrent_symbols(mut self, limit: usize) -> Self {
        self.max_concurrent_symbols = limit.max(1);
        self
    }

    pub async fn run<S>(
        &self,
        request: &DownloadRequest,
        catalog: &Catalog,
        sink: &S,
    ) -> Result<DownloadReport<S::Output>, SessionError>
    where
        S: DataSink + ?Sized,
    {
        let symbols = request.symbols(catalog)?;
        info!(
            symbols = symbols.len(),
            range = %request.range,
            resolution = %request.resolution,
            mode = %request.mode,
            "starting download"
        );

        let fetcher = &self.fetcher;
        let results: Vec<(SymbolReport, Option<CandleSeries>)> = stream::iter(symbols)
            .map(|symbol| async move {
                let result = fetcher
                    .fetch_with_stats(&symbol.symbol, &request.range, request.resolution)
                    .await;
                match result {
                    Ok(report) => {
                        let skipped_windows = report.stats.skipped_windows.len();
                        match report.outcome {
                            FetchOutcome::Rows(series) => {
                                info!(symbol = %symbol.symbol, rows = series.len(), "data fetched");
                                let outcome = SymbolOutcome::Fetched {
                                    rows: series.len(),
                                    skipped_windows,
                                };
                                (SymbolReport { symbol, outcome }, Some(series))
                            }
                            FetchOutcome::Empty if report.stats.all_windows_failed() => {
                                let error = format!(
                                    "all {} windows failed, last error: {}",
                                    report.stats.windows_requested,
                                    report
                                        .stats
                                        .skipped_windows
                                        .last()
                                        .map_or("unknown", |w| w.reason.as_str())
                                );
                                warn!(symbol = %symbol.symbol, %error, "fetch failed");
                                let outcome = SymbolOutcome::Failed { error };
                                (SymbolReport { symbol, outcome }, None)
                            }
                            FetchOutcome::Empty => {
                                warn!(symbol = %symbol.symbol, skipped_windows, "no data found");
                                let outcome = SymbolOutcome::NoData { skipped_windows };
                                (SymbolReport { symbol, outcome }, None)
                            }
                        }
                    }
                    Err(error) => {
                        warn!(symbol = %symbol.symbol, %error, "fetch failed");
                        let outcome = SymbolOutcome::Failed {
                            error: error.to_string(),
                        };
                        (SymbolReport { symbol, outcome }, None)
                    }
                }
            })
            .buffered(self.max_concurrent_symbols)
            .collect()
            .await;

        let mut reports = Vec::with_capacity(results.len());
        let mut series = Vec::new();
        for (report, fetched) in results {
            reports.push(report);
            series.extend(fetched);
        }

        let artifacts = build_artifacts(&series, request.mode, &request.range)?;
        let names = artifacts.iter().map(|a| a.file_name.clone()).collect();
        let output = if artifacts.is_empty() {
            None
        } else {
            Some(sink.write(&artifacts).await?)
        };

        Ok(DownloadReport {
            symbols: reports,
            artifacts: names,
            output,
        })
    }
}
