pub mod candle;
pub mod candle_series;
pub mod date_range;
pub mod request_params;
pub mod resolution;
