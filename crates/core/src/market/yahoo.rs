use crate::config::Settings;
use crate::market::provider::QuoteProvider;
use crate::market::types::{DailyBar, QuoteHistory};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRIES: u32 = 3;

/// Client for the Yahoo Finance v8 chart endpoint.
#[derive(Debug, Clone)]
pub struct YahooChartClient {
    http: reqwest::Client,
    base_url: String,
    retries: u32,
}

impl YahooChartClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings
            .quote_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = std::env::var("QUOTE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let retries = std::env::var("QUOTE_RETRIES")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_RETRIES);

        // The endpoint rejects requests without a user agent.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("stockcast/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build quote http client")?;

        Ok(Self {
            http,
            base_url,
            retries,
        })
    }

    fn chart_url(&self, ticker: &str) -> String {
        format!(
            "{}/v8/finance/chart/{}",
            self.base_url.trim_end_matches('/'),
            ticker
        )
    }

    async fn fetch_once(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<QuoteHistory> {
        let period1 = unix_midnight(start)?;
        let period2 = unix_midnight(end)?;

        let res = self
            .http
            .get(self.chart_url(ticker))
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
            ])
            .send()
            .await
            .context("quote request failed")?;

        let status = res.status();
        let text = res.text().await.context("failed to read quote response")?;

        if !status.is_success() {
            anyhow::bail!("quote provider HTTP {status}: {text}");
        }

        let envelope = serde_json::from_str::<ChartEnvelope>(&text)
            .with_context(|| format!("quote response is not the expected shape: {text}"))?;

        into_history(ticker, envelope)
    }
}

#[async_trait::async_trait]
impl QuoteProvider for YahooChartClient {
    fn provider_name(&self) -> &'static str {
        "yahoo_chart"
    }

    async fn fetch_daily_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<QuoteHistory> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.fetch_once(ticker, start, end).await {
                Ok(history) => return Ok(history),
                Err(err) => {
                    if attempt >= self.retries {
                        return Err(err);
                    }
                    let backoff = Duration::from_secs(1 << (attempt - 1));
                    tracing::warn!(
                        attempt,
                        ?backoff,
                        %ticker,
                        error = %err,
                        "quote fetch failed; retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

fn unix_midnight(date: NaiveDate) -> Result<i64> {
    let dt = date
        .and_hms_opt(0, 0, 0)
        .with_context(|| format!("invalid date: {date}"))?;
    Ok(dt.and_utc().timestamp())
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartNode,
}

#[derive(Debug, Deserialize)]
struct ChartNode {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteArrays>,
    #[serde(default)]
    adjclose: Vec<AdjCloseArray>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct QuoteArrays {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct AdjCloseArray {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

fn into_history(ticker: &str, envelope: ChartEnvelope) -> Result<QuoteHistory> {
    if let Some(err) = &envelope.chart.error {
        if !err.is_null() {
            anyhow::bail!("quote provider error for {ticker}: {err}");
        }
    }

    let result = envelope
        .chart
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .with_context(|| format!("quote response for {ticker} contained no series"))?;

    let quote = result.indicators.quote.first().cloned().unwrap_or_default();
    let adjclose = result
        .indicators
        .adjclose
        .first()
        .cloned()
        .unwrap_or_default();

    let mut bars = Vec::with_capacity(result.timestamp.len());
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let date = DateTime::from_timestamp(ts, 0)
            .with_context(|| format!("invalid timestamp {ts} in quote response"))?
            .date_naive();

        bars.push(DailyBar {
            date,
            open: nth(&quote.open, i),
            high: nth(&quote.high, i),
            low: nth(&quote.low, i),
            close: nth(&quote.close, i),
            adj_close: nth(&adjclose.adjclose, i),
            volume: nth(&quote.volume, i),
        });
    }

    for pair in bars.windows(2) {
        anyhow::ensure!(
            pair[0].date < pair[1].date,
            "quote response for {ticker} is not chronologically ordered"
        );
    }

    Ok(QuoteHistory {
        ticker: ticker.to_string(),
        bars,
    })
}

fn nth(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(v: serde_json::Value) -> ChartEnvelope {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn parses_the_chart_envelope() {
        // 2020-01-02 and 2020-01-03 midnights UTC, with one halted session.
        let v = json!({
            "chart": {
                "result": [{
                    "timestamp": [1577923200, 1578009600, 1578268800],
                    "indicators": {
                        "quote": [{
                            "open": [74.06, null, 73.45],
                            "high": [75.15, null, 74.99],
                            "low": [73.80, null, 73.19],
                            "close": [75.09, null, 74.36],
                            "volume": [135480400, null, 118387200]
                        }],
                        "adjclose": [{
                            "adjclose": [73.06, null, 72.34]
                        }]
                    }
                }],
                "error": null
            }
        });

        let history = into_history("AAPL", envelope(v)).unwrap();
        assert_eq!(history.ticker, "AAPL");
        assert_eq!(history.bars.len(), 3);
        assert_eq!(
            history.bars[0].date,
            NaiveDate::from_ymd_opt(2020, 1, 2).unwrap()
        );
        assert_eq!(history.bars[0].close, Some(75.09));
        assert_eq!(history.bars[0].adj_close, Some(73.06));
        assert_eq!(history.bars[1].close, None);
        assert_eq!(history.bars[2].volume, Some(118_387_200.0));
    }

    #[test]
    fn missing_adjclose_block_is_tolerated() {
        let v = json!({
            "chart": {
                "result": [{
                    "timestamp": [1577923200],
                    "indicators": {
                        "quote": [{
                            "open": [74.06], "high": [75.15], "low": [73.80],
                            "close": [75.09], "volume": [135480400]
                        }]
                    }
                }],
                "error": null
            }
        });

        let history = into_history("AAPL", envelope(v)).unwrap();
        assert_eq!(history.bars[0].adj_close, None);
        assert_eq!(history.bars[0].close, Some(75.09));
    }

    #[test]
    fn provider_error_payload_fails() {
        let v = json!({
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found"}
            }
        });

        let err = into_history("NOPE", envelope(v)).unwrap_err();
        assert!(err.to_string().contains("quote provider error"));
    }

    #[test]
    fn out_of_order_timestamps_fail() {
        let v = json!({
            "chart": {
                "result": [{
                    "timestamp": [1578009600, 1577923200],
                    "indicators": {
                        "quote": [{
                            "open": [1.0, 2.0], "high": [1.0, 2.0], "low": [1.0, 2.0],
                            "close": [1.0, 2.0], "volume": [1, 2]
                        }]
                    }
                }],
                "error": null
            }
        });

        let err = into_history("AAPL", envelope(v)).unwrap_err();
        assert!(err.to_string().contains("not chronologically ordered"));
    }

    #[test]
    fn unix_midnight_is_utc() {
        let ts = unix_midnight(NaiveDate::from_ymd_opt(2020, 1, 2).unwrap()).unwrap();
        assert_eq!(ts, 1_577_923_200);
    }
}
