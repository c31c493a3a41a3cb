use crate::market::types::QuoteHistory;
use anyhow::Result;
use chrono::NaiveDate;

/// Source of historical daily quotes. The HTTP handler only sees this seam,
/// which keeps the pipeline testable without a live endpoint.
#[async_trait::async_trait]
pub trait QuoteProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Daily bars for `ticker` in `[start, end)`, oldest first.
    async fn fetch_daily_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<QuoteHistory>;
}
