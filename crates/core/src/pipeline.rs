//! The forecast request, end to end: fetch, select, test, decompose, fit,
//! predict, render.

use crate::chart;
use crate::error::ForecastError;
use crate::market::QuoteProvider;
use crate::sarima::{Sarima, SarimaSpec};
use crate::series::{DailySeries, PriceColumn};
use crate::stats::{adf, decompose};
use anyhow::Result;
use chrono::{Duration, NaiveDate};

/// Fixed decomposition period, in trading days.
pub const DECOMPOSITION_PERIOD: usize = 12;

#[derive(Debug, Clone)]
pub struct ForecastParams {
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub column: String,
    pub forecast_days: usize,
    pub p: usize,
    pub d: usize,
    pub q: usize,
    pub seasonal_p: usize,
}

#[derive(Debug, Clone)]
pub struct ForecastReport {
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub column_label: &'static str,
    pub is_stationary: bool,
    pub adf_p_value: f64,
    pub seasonal_strength: f64,
    pub forecast: Vec<(NaiveDate, f64)>,
    pub chart_svg: String,
    pub summary: String,
}

pub async fn run(provider: &dyn QuoteProvider, params: &ForecastParams) -> Result<ForecastReport> {
    let column = PriceColumn::from_label(&params.column)
        .ok_or_else(|| ForecastError::ColumnNotFound(params.column.clone()))?;

    tracing::info!(
        ticker = %params.ticker,
        start = %params.start,
        end = %params.end,
        provider = provider.provider_name(),
        "fetching daily history"
    );
    let history = provider
        .fetch_daily_history(&params.ticker, params.start, params.end)
        .await?;

    let series = DailySeries::from_history(&history, column)?;

    // Descriptive only; the fit below runs either way.
    let stationarity = adf::adf_test(series.values())?;
    let decomposition = decompose::seasonal_decompose(series.values(), DECOMPOSITION_PERIOD)?;

    // The seasonal orders reuse (p, d, q); only the period comes from the
    // form separately.
    let spec = SarimaSpec::new(
        (params.p, params.d, params.q),
        (params.p, params.d, params.q, params.seasonal_p),
    );
    let mut model = Sarima::new(spec);
    model.fit(series.values())?;

    let predicted = model.forecast(params.forecast_days)?;
    let forecast: Vec<(NaiveDate, f64)> = predicted
        .into_iter()
        .enumerate()
        .map(|(i, v)| (params.end + Duration::days(i as i64), v))
        .collect();

    tracing::info!(
        ticker = %params.ticker,
        model = %spec.label(),
        n_obs = series.len(),
        horizon = forecast.len(),
        stationary = stationarity.is_stationary,
        "model fitted"
    );

    let chart_svg = chart::render_overlay_svg(&series, &forecast, &params.ticker, column.label())?;
    let summary = model.summary();

    Ok(ForecastReport {
        ticker: params.ticker.clone(),
        start: params.start,
        end: params.end,
        column_label: column.label(),
        is_stationary: stationarity.is_stationary,
        adf_p_value: stationarity.p_value,
        seasonal_strength: decomposition.seasonal_strength(),
        forecast,
        chart_svg,
        summary,
    })
}
