use serde::Serialize;

use crate::models::request_params::HistoryRequest;

/// `date_format=1`: range bounds are `YYYY-MM-DD` strings rather than epochs.
pub const DATE_FORMAT_YMD: &str = "1";

/// `cont_flag=1`: continuous data for expired contracts.
pub const CONT_FLAG: &str = "1";

/// Query string of `GET /data/history`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FyersHistoryParams {
    pub symbol: String,
    pub resolution: String,
    pub date_format: &'static str,
    pub range_from: String,
    pub range_to: String,
    pub cont_flag: &'static str,
}

pub fn construct_params(request: &HistoryRequest) -> FyersHistoryParams {
    FyersHistoryParams {
        symbol: request.symbol.clone(),
        resolution: request.resolution.as_api_value(),
        date_format: DATE_FORMAT_YMD,
        range_from: request.window.start.format("%Y-%m-%d").to_string(),
        range_to: request.window.end.format("%Y-%m-%d").to_string(),
        cont_flag: CONT_FLAG,
    }
}
