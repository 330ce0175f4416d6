use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use history_downloader::{
    cli::{
        commands::{Cli, Commands},
        logging::init_tracing,
        params,
    },
    config::DownloaderConfig,
    history::HistoryFetcher,
    io::DirectorySink,
    providers::fyers_rest::FyersProvider,
    session::{DownloadSession, SymbolOutcome},
};
use symbol_catalog::{CatalogLoader, SearchResult, search};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli.log_level).map_err(|e| anyhow!(e))?;

    let config = match &cli.config {
        Some(path) => DownloaderConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => DownloaderConfig::default(),
    }
    .with_env_overrides()?;
    config.validate()?;

    let loader = CatalogLoader::new(config.catalog.url.clone(), config.catalog_timeout())?;
    let cache = config.catalog_cache();
    let catalog = cache.get_or_load(&loader).await;

    match cli.command {
        Commands::Search { query } => match search(&catalog, &query) {
            SearchResult::NoResults => println!("No stocks found."),
            SearchResult::Matches(options) => {
                for option in options {
                    println!("{option}");
                }
            }
        },
        Commands::Download {
            query,
            symbols,
            all,
            start,
            end,
            mode,
            resolution,
            out,
        } => {
            let range = params::date_range(start, end)?;
            let selection = params::selection(&catalog, all, query.as_deref(), &symbols);
            let request = params::download_request(&catalog, selection, range, resolution, mode)?;

            // Credentials are checked before any request goes out.
            let provider = FyersProvider::from_env(&config.fyers_settings()?)
                .context("initialising history provider")?;
            let fetcher = HistoryFetcher::new(Arc::new(provider))
                .with_span_days(config.history.window_span_days)
                .with_policy(config.history.on_window_error);
            let session = DownloadSession::new(fetcher)
                .with_max_concurrent_symbols(config.history.max_concurrent_symbols);

            let report = session
                .run(&request, &catalog, &DirectorySink::new(out))
                .await?;

            for entry in &report.symbols {
                match &entry.outcome {
                    SymbolOutcome::Fetched {
                        rows,
                        skipped_windows,
                    } => {
                        println!("Data fetched for {} ({rows} rows)", entry.symbol.symbol);
                        if *skipped_windows > 0 {
                            println!("  {skipped_windows} window(s) skipped after errors");
                        }
                    }
                    SymbolOutcome::NoData { skipped_windows } => {
                        println!("No data found for {}", entry.symbol.symbol);
                        if *skipped_windows > 0 {
                            println!("  {skipped_windows} window(s) skipped after errors");
                        }
                    }
                    SymbolOutcome::Failed { error } => {
                        println!("Failed to fetch {}: {error}", entry.symbol.symbol)
                    }
                }
            }
            for path in report.output.unwrap_or_default() {
                println!("Wrote {}", path.display());
            }
        }
    }

    Ok(())
}
