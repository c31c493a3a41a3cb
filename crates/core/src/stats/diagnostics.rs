//! Residual diagnostics for the model-fit summary.

/// Ljung-Box portmanteau test for residual autocorrelation.
#[derive(Debug, Clone)]
pub struct LjungBoxReport {
    pub statistic: f64,
    pub p_value: f64,
    pub lags: usize,
    pub df: usize,
}

/// Jarque-Bera normality test on residuals.
#[derive(Debug, Clone)]
pub struct JarqueBeraReport {
    pub statistic: f64,
    pub p_value: f64,
}

/// Test the null that `residuals` are white noise. `fitted_params` lowers the
/// chi-squared degrees of freedom by the number of estimated coefficients.
pub fn ljung_box(residuals: &[f64], lags: Option<usize>, fitted_params: usize) -> LjungBoxReport {
    let n = residuals.len();
    if n < 3 {
        return LjungBoxReport {
            statistic: f64::NAN,
            p_value: f64::NAN,
            lags: 0,
            df: 0,
        };
    }

    let lags = lags.unwrap_or_else(|| 10.min(n / 5).max(1)).min(n - 1);

    let mean = residuals.iter().sum::<f64>() / n as f64;
    let centered: Vec<f64> = residuals.iter().map(|&x| x - mean).collect();
    let denom: f64 = centered.iter().map(|&x| x * x).sum();

    let df = lags.saturating_sub(fitted_params).max(1);

    if denom == 0.0 {
        return LjungBoxReport {
            statistic: 0.0,
            p_value: 1.0,
            lags,
            df,
        };
    }

    let mut q = 0.0;
    for k in 1..=lags {
        let acf: f64 = centered
            .iter()
            .skip(k)
            .zip(&centered)
            .map(|(&a, &b)| a * b)
            .sum::<f64>()
            / denom;
        q += acf * acf / (n - k) as f64;
    }
    q *= n as f64 * (n + 2) as f64;

    LjungBoxReport {
        statistic: q,
        p_value: chi_squared_sf(q, df),
        lags,
        df,
    }
}

/// JB = n/6 · (S² + (K−3)²/4); chi-squared with 2 degrees of freedom under
/// the normality null.
pub fn jarque_bera(residuals: &[f64]) -> JarqueBeraReport {
    let n = residuals.len();
    if n < 4 {
        return JarqueBeraReport {
            statistic: f64::NAN,
            p_value: f64::NAN,
        };
    }

    let nf = n as f64;
    let mean = residuals.iter().sum::<f64>() / nf;
    let m2 = residuals.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / nf;
    if m2 == 0.0 {
        return JarqueBeraReport {
            statistic: 0.0,
            p_value: 1.0,
        };
    }
    let m3 = residuals.iter().map(|&x| (x - mean).powi(3)).sum::<f64>() / nf;
    let m4 = residuals.iter().map(|&x| (x - mean).powi(4)).sum::<f64>() / nf;

    let skew = m3 / m2.powf(1.5);
    let kurt = m4 / (m2 * m2);
    let statistic = nf / 6.0 * (skew * skew + (kurt - 3.0).powi(2) / 4.0);

    JarqueBeraReport {
        statistic,
        p_value: chi_squared_sf(statistic, 2),
    }
}

/// Chi-squared survival function P(X > x).
pub fn chi_squared_sf(x: f64, df: usize) -> f64 {
    if x <= 0.0 || df == 0 {
        return 1.0;
    }
    let k = df as f64;

    // Wilson-Hilferty normal approximation for large df.
    if df > 30 {
        let z = ((x / k).powf(1.0 / 3.0) - (1.0 - 2.0 / (9.0 * k))) / (2.0 / (9.0 * k)).sqrt();
        return normal_sf(z);
    }

    incomplete_gamma_q(k / 2.0, x / 2.0)
}

/// Upper regularized incomplete gamma Q(a, x).
fn incomplete_gamma_q(a: f64, x: f64) -> f64 {
    if x <= 0.0 || a <= 0.0 {
        return 1.0;
    }
    if x < a + 1.0 {
        1.0 - gamma_series_p(a, x)
    } else {
        gamma_cf_q(a, x)
    }
}

fn gamma_series_p(a: f64, x: f64) -> f64 {
    let mut sum = 1.0 / a;
    let mut term = sum;
    for n in 1..200 {
        term *= x / (a + n as f64);
        sum += term;
        if term.abs() < sum.abs() * 1e-15 {
            break;
        }
    }
    sum * (-x + a * x.ln() - ln_gamma(a)).exp()
}

fn gamma_cf_q(a: f64, x: f64) -> f64 {
    // Lentz's continued-fraction evaluation.
    let tiny = 1e-300;
    let mut b = x + 1.0 - a;
    let mut c = 1.0 / tiny;
    let mut d = 1.0 / b;
    let mut h = d;
    for i in 1..200 {
        let an = -(i as f64) * (i as f64 - a);
        b += 2.0;
        d = an * d + b;
        if d.abs() < tiny {
            d = tiny;
        }
        c = b + an / c;
        if c.abs() < tiny {
            c = tiny;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;
        if (delta - 1.0).abs() < 1e-15 {
            break;
        }
    }
    h * (-x + a * x.ln() - ln_gamma(a)).exp()
}

/// Lanczos approximation, g = 7.
fn ln_gamma(x: f64) -> f64 {
    const COEFFS: [f64; 8] = [
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_1,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_572e-6,
        1.505_632_735_149_311_6e-7,
    ];

    if x < 0.5 {
        // Reflection formula.
        return std::f64::consts::PI.ln()
            - (std::f64::consts::PI * x).sin().ln()
            - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let mut acc = 0.999_999_999_999_809_9;
    for (i, c) in COEFFS.iter().enumerate() {
        acc += c / (x + i as f64 + 1.0);
    }
    let t = x + 7.5;
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + acc.ln()
}

fn normal_sf(z: f64) -> f64 {
    0.5 * erfc(z / std::f64::consts::SQRT_2)
}

/// Abramowitz-Stegun 7.1.26 polynomial approximation.
fn erfc(x: f64) -> f64 {
    let sign_negative = x < 0.0;
    let x = x.abs();
    let t = 1.0 / (1.0 + 0.327_591_1 * x);
    let poly = t
        * (0.254_829_592
            + t * (-0.284_496_736 + t * (1.421_413_741 + t * (-1.453_152_027 + t * 1.061_405_429))));
    let result = poly * (-x * x).exp();
    if sign_negative {
        2.0 - result
    } else {
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn noise(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| ((i * 17 + 13) % 97) as f64 / 50.0 - 1.0)
            .collect()
    }

    // Lehmer generator; near-zero autocorrelation at small lags.
    fn lcg_noise(n: usize) -> Vec<f64> {
        let mut state: u64 = 42;
        (0..n)
            .map(|_| {
                state = state.wrapping_mul(16807) % 2_147_483_647;
                state as f64 / 2_147_483_647.0 - 0.5
            })
            .collect()
    }

    #[test]
    fn chi_squared_known_values() {
        // df=2 is exponential: P(X > 2) = e^{-1}.
        assert_relative_eq!(chi_squared_sf(2.0, 2), (-1.0f64).exp(), epsilon = 1e-6);
        // Standard critical value: P(X > 18.31 | df=10) ~ 0.05.
        let p = chi_squared_sf(18.31, 10);
        assert!(p > 0.045 && p < 0.055);
        assert_relative_eq!(chi_squared_sf(0.0, 5), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn ln_gamma_matches_factorials() {
        assert_relative_eq!(ln_gamma(5.0), 24.0f64.ln(), epsilon = 1e-10);
        assert_relative_eq!(ln_gamma(1.0), 0.0, epsilon = 1e-10);
        assert_relative_eq!(ln_gamma(0.5), std::f64::consts::PI.sqrt().ln(), epsilon = 1e-10);
    }

    #[test]
    fn ljung_box_accepts_white_noise() {
        let report = ljung_box(&lcg_noise(300), Some(10), 0);
        assert!(report.p_value > 0.01);
    }

    #[test]
    fn ljung_box_flags_strong_autocorrelation() {
        // AR(1) with coefficient close to 1.
        let shocks = noise(300);
        let mut series = vec![0.0];
        for s in &shocks {
            series.push(0.95 * series.last().copied().unwrap_or(0.0) + s);
        }

        let report = ljung_box(&series, Some(10), 0);
        assert!(report.p_value < 0.01);
    }

    #[test]
    fn ljung_box_short_input() {
        let report = ljung_box(&[1.0, 2.0], None, 0);
        assert!(report.statistic.is_nan());
    }

    #[test]
    fn jarque_bera_skewed_series_scores_high() {
        // Heavily right-skewed.
        let series: Vec<f64> = (0..200)
            .map(|i| {
                let u = ((i * 29 + 7) % 101) as f64 / 101.0;
                u * u * u * 10.0
            })
            .collect();

        let symmetric = noise(200);
        let skewed = jarque_bera(&series);
        let flat = jarque_bera(&symmetric);
        assert!(skewed.statistic > flat.statistic);
        assert!(skewed.p_value < 0.05);
    }

    #[test]
    fn jarque_bera_constant_series() {
        let report = jarque_bera(&[2.0; 50]);
        assert_relative_eq!(report.statistic, 0.0, epsilon = 1e-12);
        assert_relative_eq!(report.p_value, 1.0, epsilon = 1e-12);
    }
}
