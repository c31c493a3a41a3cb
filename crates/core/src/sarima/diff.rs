//! Differencing and its inverses.

/// Difference a series `order` times. Each pass shortens the series by one;
/// over-differencing a short series yields an empty vector.
pub fn difference(series: &[f64], order: usize) -> Vec<f64> {
    let mut out = series.to_vec();
    for _ in 0..order {
        out = out.windows(2).map(|w| w[1] - w[0]).collect();
    }
    out
}

/// Seasonal differencing at lag `period`, applied `order` times.
pub fn seasonal_difference(series: &[f64], order: usize, period: usize) -> Vec<f64> {
    if period == 0 {
        return series.to_vec();
    }
    let mut out = series.to_vec();
    for _ in 0..order {
        out = out
            .iter()
            .skip(period)
            .zip(out.iter())
            .map(|(cur, prev)| cur - prev)
            .collect();
    }
    out
}

/// Undo regular differencing: cumulate `forecast_diffs` forward from the end
/// of `history` (the series as it was before differencing).
pub fn integrate(forecast_diffs: &[f64], history: &[f64], order: usize) -> Vec<f64> {
    if order == 0 || forecast_diffs.is_empty() {
        return forecast_diffs.to_vec();
    }

    let mut out = forecast_diffs.to_vec();
    for level in (0..order).rev() {
        let base = difference(history, level);
        let mut cum = base.last().copied().unwrap_or(0.0);
        for v in &mut out {
            cum += *v;
            *v = cum;
        }
    }
    out
}

/// Undo seasonal differencing: each new value adds the observation one
/// period back, walking forward from the end of `history`.
pub fn seasonal_integrate(
    forecast_diffs: &[f64],
    history: &[f64],
    order: usize,
    period: usize,
) -> Vec<f64> {
    if order == 0 || period == 0 || forecast_diffs.is_empty() {
        return forecast_diffs.to_vec();
    }

    let mut out = forecast_diffs.to_vec();
    for level in (0..order).rev() {
        let mut extended = seasonal_difference(history, level, period);
        let base_len = extended.len();
        for &v in &out {
            let anchor = if extended.len() >= period {
                extended[extended.len() - period]
            } else {
                0.0
            };
            extended.push(v + anchor);
        }
        out = extended.split_off(base_len);
    }
    out
}
