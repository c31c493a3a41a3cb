//! SVG overlay chart for the results page.

use crate::error::ForecastError;
use crate::series::DailySeries;
use chrono::NaiveDate;
use plotters::prelude::*;

const WIDTH: u32 = 900;
const HEIGHT: u32 = 500;

/// Draw the historical series (blue) with the forecast overlaid (red) and
/// return the chart as SVG markup. An empty forecast draws only the
/// historical trace.
pub fn render_overlay_svg(
    history: &DailySeries,
    forecast: &[(NaiveDate, f64)],
    ticker: &str,
    column_label: &str,
) -> Result<String, ForecastError> {
    if history.len() < 2 {
        return Err(ForecastError::TooShort {
            needed: 2,
            got: history.len(),
        });
    }

    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for v in history
        .values()
        .iter()
        .chain(forecast.iter().map(|(_, v)| v))
    {
        y_min = y_min.min(*v);
        y_max = y_max.max(*v);
    }
    let padding = (y_max - y_min).max(1e-8) * 0.1;
    let y_range = (y_min - padding)..(y_max + padding);

    let x_min = history.dates()[0];
    let mut x_max = history.dates()[history.len() - 1];
    if let Some((last, _)) = forecast.last() {
        x_max = x_max.max(*last);
    }

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| ForecastError::Chart(format!("failed to fill canvas: {e}")))?;

        let mut chart = ChartBuilder::on(&root)
            .caption(format!("{ticker} {column_label}"), ("sans-serif", 24))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_min..x_max, y_range)
            .map_err(|e| ForecastError::Chart(format!("failed to build chart: {e}")))?;

        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc(column_label)
            .draw()
            .map_err(|e| ForecastError::Chart(format!("failed to draw mesh: {e}")))?;

        chart
            .draw_series(LineSeries::new(history.iter(), &BLUE))
            .map_err(|e| ForecastError::Chart(format!("failed to draw history: {e}")))?
            .label("Actual")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

        if !forecast.is_empty() {
            chart
                .draw_series(LineSeries::new(forecast.iter().copied(), &RED))
                .map_err(|e| ForecastError::Chart(format!("failed to draw forecast: {e}")))?
                .label("Forecast")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));
        }

        chart
            .configure_series_labels()
            .border_style(BLACK)
            .background_style(WHITE.mix(0.8))
            .draw()
            .map_err(|e| ForecastError::Chart(format!("failed to draw legend: {e}")))?;

        root.present()
            .map_err(|e| ForecastError::Chart(format!("failed to render chart: {e}")))?;
    }

    Ok(svg)
}
