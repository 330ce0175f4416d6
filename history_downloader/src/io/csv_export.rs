//! Turning fetched series into named CSV documents.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::io::sink::SinkError;
use crate::models::{candle_series::CandleSeries, date_range::DateRange};

pub const CSV_HEADER: [&str; 7] = ["symbol", "date", "open", "high", "low", "close", "volume"];
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const COMBINED_PREFIX: &str = "Combined_Stock_Data";

/// How fetched series are packaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum ExportMode {
    /// One file per symbol.
    #[default]
    Individually,
    /// A single file holding every symbol's rows.
    Combined,
}

impl fmt::Display for ExportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportMode::Individually => f.write_str("individually"),
            ExportMode::Combined => f.write_str("combined"),
        }
    }
}

/// A named CSV document ready for a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvArtifact {
    pub file_name: String,
    /// Symbols whose rows are in this document, in row order.
    pub symbols: Vec<String>,
    pub rows: usize,
    pub bytes: Vec<u8>,
}

/// `NSE:SBIN-EQ` becomes `NSE_SBIN-EQ_2020-01-01_2020-05-01.csv`.
pub fn individual_file_name(symbol: &str, range: &DateRange) -> String {
    format!("{}_{}_{}.csv", symbol.replace(':', "_"), range.start(), range.end())
}

pub fn combined_file_name(range: &DateRange) -> String {
    format!("{COMBINED_PREFIX}_{}_{}.csv", range.start(), range.end())
}

/// Packages `series` per `mode`. No series means no artifacts.
pub fn build_artifacts(
    series: &[CandleSeries],
    mode: ExportMode,
    range: &DateRange,
) -> Result<Vec<CsvArtifact>, SinkError> {
    if series.is_empty() {
        return Ok(Vec::new());
    }

    match mode {
        ExportMode::Individually => series
            .iter()
            .map(|s| encode(individual_file_name(&s.symbol, range), std::slice::from_ref(s)))
            .collect(),
        ExportMode::Combined => Ok(vec![encode(combined_file_name(range), series)?]),
    }
}

fn encode(file_name: String, series: &[CandleSeries]) -> Result<CsvArtifact, SinkError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    let mut rows = 0;
    for s in series {
        for candle in &s.candles {
            writer.write_record([
                s.symbol.clone(),
                candle.timestamp.format(DATE_FORMAT).to_string(),
                candle.open.to_string(),
                candle.high.to_string(),
                candle.low.to_string(),
                candle.close.to_string(),
                candle.volume.to_string(),
            ])?;
            rows += 1;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| SinkError::Buffer(e.error().to_string()))?;

    Ok(CsvArtifact {
        file_name,
        symbols: series.iter().map(|s| s.symbol.clone()).collect(),
        rows,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::*;
    use crate::models::{candle::Candle, resolution::Resolution};

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2020, 5, 1).unwrap(),
        )
        .unwrap()
    }

    fn series(symbol: &str, closes: &[f64]) -> CandleSeries {
        CandleSeries {
            symbol: symbol.to_string(),
            resolution: Resolution::Day,
            candles: closes
                .iter()
                .enumerate()
                .map(|(i, close)| Candle {
                    timestamp: Utc.timestamp_opt(1_577_836_800 + 86_400 * i as i64, 0).unwrap(),
                    open: 1.5,
                    high: 2.0,
                    low: 1.0,
                    close: *close,
                    volume: 12345.0,
                })
                .collect(),
        }
    }

    fn text(artifact: &CsvArtifact) -> String {
        String::from_utf8(artifact.bytes.clone()).unwrap()
    }

    #[test]
    fn file_names() {
        assert_eq!(
            individual_file_name("NSE:SBIN-EQ", &range()),
            "NSE_SBIN-EQ_2020-01-01_2020-05-01.csv"
        );
        assert_eq!(
            combined_file_name(&range()),
            "Combined_Stock_Data_2020-01-01_2020-05-01.csv"
        );
    }

    #[test]
    fn individually_writes_one_artifact_per_series() {
        let data = [series("NSE:SBIN-EQ", &[1.0]), series("NSE:INFY-EQ", &[2.0, 3.0])];
        let artifacts = build_artifacts(&data, ExportMode::Individually, &range()).unwrap();

        assert_eq!(artifacts.len(), 2);
        assert_eq!(artifacts[1].symbols, ["NSE:INFY-EQ"]);
        assert_eq!(artifacts[1].rows, 2);
        assert_eq!(
            text(&artifacts[0]),
            "symbol,date,open,high,low,close,volume\n\
             NSE:SBIN-EQ,2020-01-01 00:00:00,1.5,2,1,1,12345\n"
        );
    }

    #[test]
    fn combined_concatenates_in_order() {
        let data = [series("NSE:SBIN-EQ", &[1.0]), series("NSE:INFY-EQ", &[2.0])];
        let artifacts = build_artifacts(&data, ExportMode::Combined, &range()).unwrap();

        assert_eq!(artifacts.len(), 1);
        let body = text(&artifacts[0]);
        let symbols: Vec<&str> = body
            .lines()
            .skip(1)
            .map(|line| line.split(',').next().unwrap())
            .collect();
        assert_eq!(symbols, ["NSE:SBIN-EQ", "NSE:INFY-EQ"]);
        assert_eq!(artifacts[0].rows, 2);
    }

    #[test]
    fn nothing_to_export() {
        assert!(build_artifacts(&[], ExportMode::Combined, &range()).unwrap().is_empty());
    }
}
