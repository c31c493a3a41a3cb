use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily bars for one ticker over a requested range, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteHistory {
    pub ticker: String,
    pub bars: Vec<DailyBar>,
}

/// One trading day. The provider reports null fields for sessions without a
/// usable quote, so everything but the date is optional.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub adj_close: Option<f64>,
    pub volume: Option<f64>,
}
