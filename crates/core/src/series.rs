use crate::error::ForecastError;
use crate::market::{DailyBar, QuoteHistory};
use chrono::NaiveDate;

/// A price field of the daily bar data, named as the form posts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceColumn {
    Open,
    High,
    Low,
    Close,
    AdjClose,
    Volume,
}

impl PriceColumn {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Open" => Some(Self::Open),
            "High" => Some(Self::High),
            "Low" => Some(Self::Low),
            "Close" => Some(Self::Close),
            "Adj Close" => Some(Self::AdjClose),
            "Volume" => Some(Self::Volume),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::High => "High",
            Self::Low => "Low",
            Self::Close => "Close",
            Self::AdjClose => "Adj Close",
            Self::Volume => "Volume",
        }
    }

    pub const ALL: [PriceColumn; 6] = [
        Self::Open,
        Self::High,
        Self::Low,
        Self::Close,
        Self::AdjClose,
        Self::Volume,
    ];

    fn value(&self, bar: &DailyBar) -> Option<f64> {
        match self {
            Self::Open => bar.open,
            Self::High => bar.high,
            Self::Low => bar.low,
            Self::Close => bar.close,
            Self::AdjClose => bar.adj_close,
            Self::Volume => bar.volume,
        }
    }
}

/// One selected column of a quote history, rows with missing values dropped.
/// Dates stay chronologically ordered because the history is.
#[derive(Debug, Clone)]
pub struct DailySeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl DailySeries {
    pub fn from_history(
        history: &QuoteHistory,
        column: PriceColumn,
    ) -> Result<Self, ForecastError> {
        let mut dates = Vec::with_capacity(history.bars.len());
        let mut values = Vec::with_capacity(history.bars.len());
        for bar in &history.bars {
            if let Some(v) = column.value(bar) {
                dates.push(bar.date);
                values.push(v);
            }
        }

        // A column the provider never populated reads the same as an unknown
        // column name: not found.
        if values.is_empty() && !history.bars.is_empty() {
            return Err(ForecastError::ColumnNotFound(column.label().to_string()));
        }

        Ok(Self { dates, values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(date: NaiveDate, close: Option<f64>) -> DailyBar {
        DailyBar {
            date,
            open: close.map(|c| c - 1.0),
            high: close.map(|c| c + 1.0),
            low: close.map(|c| c - 2.0),
            close,
            adj_close: None,
            volume: Some(1000.0),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, d).unwrap()
    }

    #[test]
    fn labels_round_trip() {
        for column in PriceColumn::ALL {
            assert_eq!(PriceColumn::from_label(column.label()), Some(column));
        }
        assert_eq!(PriceColumn::from_label("Adj Close"), Some(PriceColumn::AdjClose));
        assert_eq!(PriceColumn::from_label("Foo"), None);
        assert_eq!(PriceColumn::from_label("close"), None);
    }

    #[test]
    fn missing_rows_are_dropped() {
        let history = QuoteHistory {
            ticker: "AAPL".into(),
            bars: vec![
                bar(day(2), Some(100.0)),
                bar(day(3), None),
                bar(day(6), Some(101.5)),
            ],
        };

        let series = DailySeries::from_history(&history, PriceColumn::Close).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.dates(), &[day(2), day(6)]);
        assert_eq!(series.values(), &[100.0, 101.5]);
        assert_eq!(series.last_date(), Some(day(6)));
    }

    #[test]
    fn unpopulated_column_is_not_found() {
        let history = QuoteHistory {
            ticker: "AAPL".into(),
            bars: vec![bar(day(2), Some(100.0)), bar(day(3), Some(101.0))],
        };

        let err = DailySeries::from_history(&history, PriceColumn::AdjClose).unwrap_err();
        assert_eq!(
            err,
            ForecastError::ColumnNotFound("Adj Close".to_string())
        );
    }

    #[test]
    fn empty_history_yields_an_empty_series() {
        let history = QuoteHistory {
            ticker: "AAPL".into(),
            bars: vec![],
        };

        let series = DailySeries::from_history(&history, PriceColumn::Close).unwrap();
        assert!(series.is_empty());
        assert_eq!(series.last_date(), None);
    }
}
