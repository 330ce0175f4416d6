//! Turning command-line arguments into a [`Selection`] and [`DateRange`].

use chrono::{Local, NaiveDate};
use symbol_catalog::{Catalog, SymbolOption, search, symbol_from_label};
use tracing::warn;

use crate::{
    io::ExportMode,
    models::{
        date_range::{DateRange, RangeError},
        resolution::Resolution,
    },
    session::{DownloadRequest, Selection, SessionError},
};

/// Builds the inclusive range, defaulting `end` to today's local date.
pub fn date_range(start: NaiveDate, end: Option<NaiveDate>) -> Result<DateRange, RangeError> {
    DateRange::new(start, end.unwrap_or_else(|| Local::now().date_naive()))
}

/// Resolves one `--symbol` argument.
///
/// Catalog entries keep their display name. Input that is not in the catalog
/// is passed through as a bare symbol (taken from the label if it has one),
/// since the history API may still know it.
pub fn resolve_symbol(catalog: &Catalog, input: &str) -> Option<SymbolOption> {
    if let Some(option) = catalog.resolve(input) {
        return Some(option);
    }
    let symbol = symbol_from_label(input).unwrap_or(input).trim();
    if symbol.is_empty() {
        return None;
    }
    warn!(input, symbol, "symbol not in catalog, requesting it as given");
    Some(SymbolOption::bare(symbol))
}

/// Combines `--all`, `--query` and `--symbol` into one selection.
///
/// Query matches come first, then explicit symbols, in argument order.
pub fn selection(
    catalog: &Catalog,
    all: bool,
    query: Option<&str>,
    symbols: &[String],
) -> Selection {
    if all {
        return Selection::All;
    }

    let mut options = Vec::new();
    if let Some(query) = query {
        let matches = search(catalog, query).into_options();
        if matches.is_empty() {
            warn!(query, "no stocks found for query");
        }
        options.extend(matches);
    }
    options.extend(symbols.iter().filter_map(|s| resolve_symbol(catalog, s)));
    Selection::Symbols(options)
}

/// Builds the download request and rejects an empty selection, so nothing
/// else (credentials included) is touched when there is nothing to fetch.
pub fn download_request(
    catalog: &Catalog,
    selection: Selection,
    range: DateRange,
    resolution: Resolution,
    mode: ExportMode,
) -> Result<DownloadRequest, SessionError> {
    let request = DownloadRequest {
        selection,
        range,
        resolution,
        mode,
    };
    request.symbols(catalog)?;
    Ok(request)
}

#[cfg(test)]
mod tests {
    use symbol_catalog::fallback_catalog;

    use super::*;

    #[test]
    fn labels_and_symbols_resolve_against_catalog() {
        let catalog = fallback_catalog();
        let by_symbol = resolve_symbol(&catalog, "nse:sbin-eq").unwrap();
        assert_eq!(by_symbol.symbol, "NSE:SBIN-EQ");
        assert!(by_symbol.name.is_some());

        let by_label = resolve_symbol(&catalog, &by_symbol.label()).unwrap();
        assert_eq!(by_label, by_symbol);
    }

    #[test]
    fn unknown_input_passes_through_bare() {
        let catalog = fallback_catalog();
        assert_eq!(
            resolve_symbol(&catalog, "Tata Motors (NSE:TATAMOTORS-EQ)"),
            Some(SymbolOption::bare("NSE:TATAMOTORS-EQ"))
        );
        assert_eq!(resolve_symbol(&catalog, "  "), None);
    }

    #[test]
    fn query_then_symbols() {
        let catalog = fallback_catalog();
        let Selection::Symbols(options) = selection(
            &catalog,
            false,
            Some("infosys"),
            &["NSE:SBIN-EQ".to_string()],
        ) else {
            panic!("expected explicit symbols");
        };
        let symbols: Vec<&str> = options.iter().map(|o| o.symbol.as_str()).collect();
        assert_eq!(symbols, ["NSE:INFY-EQ", "NSE:SBIN-EQ"]);
        assert_eq!(selection(&catalog, true, None, &[]), Selection::All);
    }

    #[test]
    fn unmatched_query_is_an_empty_selection() {
        let catalog = fallback_catalog();
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let range = date_range(start, Some(start)).unwrap();

        let err = download_request(
            &catalog,
            selection(&catalog, false, Some("nomatch"), &[]),
            range,
            Resolution::Day,
            ExportMode::Combined,
        )
        .unwrap_err();
        assert!(matches!(err, SessionError::EmptySelection));

        let request = download_request(
            &catalog,
            selection(&catalog, false, Some("infosys"), &[]),
            range,
            Resolution::Day,
            ExportMode::Combined,
        )
        .unwrap();
        assert_eq!(request.symbols(&catalog).unwrap()[0].symbol, "NSE:INFY-EQ");
    }

    #[test]
    fn range_defaults_end_to_today() {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let range = date_range(start, None).unwrap();
        assert_eq!(range.end(), Local::now().date_naive());
        assert!(date_range(start, NaiveDate::from_ymd_opt(2019, 1, 1)).is_err());
    }
}
