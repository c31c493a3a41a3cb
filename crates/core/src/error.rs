use thiserror::Error;

/// Errors produced by the forecast domain: column selection, statistics and
/// model fitting. Transport-level failures stay as `anyhow` errors at the
/// ingestion seam; the HTTP layer downcasts to this enum to pick a response.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// The requested price column is not present in the fetched data. The
    /// HTTP layer renders this message verbatim as a plain-text body.
    #[error("Column {0} not found.")]
    ColumnNotFound(String),

    #[error("insufficient data: need at least {needed} observations, got {got}")]
    TooShort { needed: usize, got: usize },

    #[error("invalid model order: {0}")]
    InvalidOrder(String),

    #[error("model must be fitted before forecasting")]
    NotFitted,

    #[error("chart rendering failed: {0}")]
    Chart(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_not_found_keeps_the_legacy_wording() {
        let err = ForecastError::ColumnNotFound("Foo".to_string());
        assert_eq!(err.to_string(), "Column Foo not found.");
    }

    #[test]
    fn too_short_names_both_counts() {
        let err = ForecastError::TooShort { needed: 24, got: 7 };
        assert_eq!(
            err.to_string(),
            "insufficient data: need at least 24 observations, got 7"
        );
    }
}
