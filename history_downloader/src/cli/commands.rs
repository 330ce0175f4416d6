use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::{io::ExportMode, models::resolution::Resolution};

#[derive(Parser, Debug)]
#[command(author, version, about = "Download NSE price history as CSV")]
pub struct Cli {
    /// Optional TOML config file (history_downloader.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. "info" or "history_downloader=debug".
    /// HISTORY_DOWNLOADER_LOG takes precedence.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List catalog entries whose name contains the query
    Search {
        /// Case-insensitive name fragment; empty lists everything
        #[arg(short, long, default_value = "")]
        query: String,
    },

    /// Fetch history for the selected symbols and write CSV files
    Download {
        /// Select every entry whose name matches this query
        #[arg(short, long)]
        query: Option<String>,

        /// Symbol or "Name (SYMBOL)" label; repeatable
        #[arg(short, long = "symbol", value_name = "SYMBOL")]
        symbols: Vec<String>,

        /// Download every symbol in the catalog
        #[arg(long, conflicts_with_all = ["query", "symbols"])]
        all: bool,

        /// First date, YYYY-MM-DD
        #[arg(long)]
        start: NaiveDate,

        /// Last date, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        end: Option<NaiveDate>,

        #[arg(long, value_enum, default_value_t = ExportMode::Individually)]
        mode: ExportMode,

        /// D, W, M or a minute interval such as 15
        #[arg(long, default_value = "D")]
        resolution: Resolution,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_args_parse() {
        let cli = Cli::try_parse_from([
            "history-downloader",
            "download",
            "--symbol",
            "NSE:SBIN-EQ",
            "-s",
            "Infosys Limited (NSE:INFY-EQ)",
            "--start",
            "2020-01-01",
            "--end",
            "2020-05-01",
            "--mode",
            "combined",
            "--resolution",
            "15",
        ])
        .unwrap();

        let Commands::Download {
            symbols,
            start,
            end,
            mode,
            resolution,
            all,
            ..
        } = cli.command
        else {
            panic!("expected download");
        };
        assert_eq!(symbols.len(), 2);
        assert_eq!(start.to_string(), "2020-01-01");
        assert_eq!(end.map(|d| d.to_string()).as_deref(), Some("2020-05-01"));
        assert_eq!(mode, ExportMode::Combined);
        assert_eq!(resolution, Resolution::Minutes(15));
        assert!(!all);
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn all_conflicts_with_symbols() {
        let err = Cli::try_parse_from([
            "history-downloader",
            "download",
            "--all",
            "--symbol",
            "NSE:SBIN-EQ",
            "--start",
            "2020-01-01",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn bad_date_is_rejected() {
        assert!(
            Cli::try_parse_from(["history-downloader", "download", "--start", "01/01/2020"])
                .is_err()
        );
    }
}
