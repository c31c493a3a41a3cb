use crate::error::ForecastError;
use crate::sarima::diff::{difference, integrate, seasonal_difference, seasonal_integrate};
use crate::stats::optim::{minimize, SimplexOptions};

/// Model orders: non-seasonal (p, d, q) and seasonal (P, D, Q) at `period`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SarimaSpec {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    pub seasonal_p: usize,
    pub seasonal_d: usize,
    pub seasonal_q: usize,
    pub period: usize,
}

impl SarimaSpec {
    pub fn new(order: (usize, usize, usize), seasonal: (usize, usize, usize, usize)) -> Self {
        Self {
            p: order.0,
            d: order.1,
            q: order.2,
            seasonal_p: seasonal.0,
            seasonal_d: seasonal.1,
            seasonal_q: seasonal.2,
            period: seasonal.3,
        }
    }

    /// Estimated coefficients: intercept + AR + MA + seasonal AR + seasonal MA.
    pub fn num_params(&self) -> usize {
        1 + self.p + self.q + self.seasonal_p + self.seasonal_q
    }

    pub fn has_seasonal_terms(&self) -> bool {
        self.seasonal_p > 0 || self.seasonal_d > 0 || self.seasonal_q > 0
    }

    pub fn label(&self) -> String {
        format!(
            "SARIMA({}, {}, {})x({}, {}, {}, {})",
            self.p, self.d, self.q, self.seasonal_p, self.seasonal_d, self.seasonal_q, self.period
        )
    }

    /// First index of the differenced series with every lag available.
    fn recursion_start(&self) -> usize {
        self.p
            .max(self.q)
            .max(self.seasonal_p * self.period)
            .max(self.seasonal_q * self.period)
    }
}

#[derive(Debug, Clone)]
struct Coefficients {
    intercept: f64,
    ar: Vec<f64>,
    ma: Vec<f64>,
    seasonal_ar: Vec<f64>,
    seasonal_ma: Vec<f64>,
}

impl Coefficients {
    fn from_flat(spec: &SarimaSpec, flat: &[f64]) -> Self {
        let (p, q, sp, sq) = (spec.p, spec.q, spec.seasonal_p, spec.seasonal_q);
        Self {
            intercept: flat[0],
            ar: flat[1..1 + p].to_vec(),
            ma: flat[1 + p..1 + p + q].to_vec(),
            seasonal_ar: flat[1 + p + q..1 + p + q + sp].to_vec(),
            seasonal_ma: flat[1 + p + q + sp..1 + p + q + sp + sq].to_vec(),
        }
    }
}

#[derive(Debug, Clone)]
struct FitState {
    original: Vec<f64>,
    regular_diff: Vec<f64>,
    work: Vec<f64>,
    residuals: Vec<f64>,
    sigma2: f64,
    log_likelihood: f64,
    aic: f64,
    bic: f64,
    n_obs: usize,
}

/// Seasonal ARIMA with an additive seasonal lag structure, estimated by
/// minimizing the conditional sum of squares.
#[derive(Debug, Clone)]
pub struct Sarima {
    spec: SarimaSpec,
    coeffs: Coefficients,
    state: Option<FitState>,
}

impl Sarima {
    pub fn new(spec: SarimaSpec) -> Self {
        Self {
            spec,
            coeffs: Coefficients {
                intercept: 0.0,
                ar: vec![],
                ma: vec![],
                seasonal_ar: vec![],
                seasonal_ma: vec![],
            },
            state: None,
        }
    }

    pub fn spec(&self) -> SarimaSpec {
        self.spec
    }

    pub fn intercept(&self) -> f64 {
        self.coeffs.intercept
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.coeffs.ar
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.coeffs.ma
    }

    pub fn seasonal_ar_coefficients(&self) -> &[f64] {
        &self.coeffs.seasonal_ar
    }

    pub fn seasonal_ma_coefficients(&self) -> &[f64] {
        &self.coeffs.seasonal_ma
    }

    pub fn sigma2(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.sigma2)
    }

    pub fn log_likelihood(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.log_likelihood)
    }

    pub fn aic(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.aic)
    }

    pub fn bic(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.bic)
    }

    pub fn n_obs(&self) -> Option<usize> {
        self.state.as_ref().map(|s| s.n_obs)
    }

    /// Residuals after the recursion warm-up, on the differenced scale.
    pub fn residuals(&self) -> Option<&[f64]> {
        self.state
            .as_ref()
            .map(|s| &s.residuals[self.spec.recursion_start()..])
    }

    pub fn fit(&mut self, values: &[f64]) -> Result<(), ForecastError> {
        let spec = self.spec;

        if spec.period < 2 && spec.has_seasonal_terms() {
            return Err(ForecastError::InvalidOrder(format!(
                "seasonal period must be at least 2, got {}",
                spec.period
            )));
        }

        let start = spec.recursion_start();
        let needed = spec.d + spec.seasonal_d * spec.period + start + 3;
        if values.len() < needed {
            return Err(ForecastError::TooShort {
                needed,
                got: values.len(),
            });
        }

        let regular_diff = difference(values, spec.d);
        let work = seasonal_difference(&regular_diff, spec.seasonal_d, spec.period);

        let n_coeffs = spec.num_params();
        let mean = work.iter().sum::<f64>() / work.len() as f64;

        let flat = if n_coeffs == 1 {
            vec![mean]
        } else {
            let mut initial = vec![0.0; n_coeffs];
            initial[0] = mean;
            for (i, v) in initial.iter_mut().enumerate().skip(1) {
                *v = 0.1 / i as f64;
            }

            let mut bounds = vec![(f64::NEG_INFINITY, f64::INFINITY)];
            bounds.resize(n_coeffs, (-0.99, 0.99));

            let result = minimize(
                |params| css(&work, &spec, &Coefficients::from_flat(&spec, params)),
                &initial,
                Some(&bounds),
                SimplexOptions::default(),
            );
            if !result.converged {
                tracing::debug!(
                    model = %spec.label(),
                    iterations = result.iterations,
                    "coefficient search stopped at the iteration cap"
                );
            }
            result.point
        };

        self.coeffs = Coefficients::from_flat(&spec, &flat);

        let residuals = residual_pass(&work, &spec, &self.coeffs);
        let valid = &residuals[start..];
        let m = valid.len() as f64;
        let sigma2 = valid.iter().map(|e| e * e).sum::<f64>() / m;
        let k = n_coeffs as f64;
        let log_likelihood = if sigma2 > 0.0 {
            -0.5 * m * (1.0 + sigma2.ln() + (2.0 * std::f64::consts::PI).ln())
        } else {
            0.0
        };

        self.state = Some(FitState {
            original: values.to_vec(),
            regular_diff,
            work,
            residuals,
            sigma2,
            log_likelihood,
            aic: -2.0 * log_likelihood + 2.0 * k,
            bic: -2.0 * log_likelihood + k * m.ln(),
            n_obs: values.len(),
        });

        Ok(())
    }

    /// Point forecasts for `horizon` periods past the end of the fitted
    /// series, on the original level scale. A zero horizon yields an empty
    /// forecast.
    pub fn forecast(&self, horizon: usize) -> Result<Vec<f64>, ForecastError> {
        let state = self.state.as_ref().ok_or(ForecastError::NotFitted)?;
        if horizon == 0 {
            return Ok(vec![]);
        }

        let spec = &self.spec;
        let c = &self.coeffs;
        let mu = c.intercept;
        let s = spec.period;

        let mut extended = state.work.clone();
        let mut shocks = state.residuals.clone();

        for _ in 0..horizon {
            let t = extended.len();
            let mut pred = mu;
            for (i, phi) in c.ar.iter().enumerate() {
                if t > i {
                    pred += phi * (extended[t - 1 - i] - mu);
                }
            }
            for (j, phi) in c.seasonal_ar.iter().enumerate() {
                let lag = (j + 1) * s;
                if t >= lag {
                    pred += phi * (extended[t - lag] - mu);
                }
            }
            for (i, theta) in c.ma.iter().enumerate() {
                if t > i {
                    pred += theta * shocks[t - 1 - i];
                }
            }
            for (j, theta) in c.seasonal_ma.iter().enumerate() {
                let lag = (j + 1) * s;
                if t >= lag {
                    pred += theta * shocks[t - lag];
                }
            }
            extended.push(pred);
            // Future shocks are their expectation: zero.
            shocks.push(0.0);
        }

        let forecast_diff = extended[state.work.len()..].to_vec();
        let on_regular_scale =
            seasonal_integrate(&forecast_diff, &state.regular_diff, spec.seasonal_d, s);
        let levels = integrate(&on_regular_scale, &state.original, spec.d);
        Ok(levels)
    }
}

/// One-step-ahead prediction errors over the whole differenced series.
fn residual_pass(work: &[f64], spec: &SarimaSpec, c: &Coefficients) -> Vec<f64> {
    let n = work.len();
    let start = spec.recursion_start();
    let mu = c.intercept;
    let s = spec.period;
    let mut residuals = vec![0.0; n];

    for t in start..n {
        let mut pred = mu;
        for (i, phi) in c.ar.iter().enumerate() {
            pred += phi * (work[t - 1 - i] - mu);
        }
        for (j, phi) in c.seasonal_ar.iter().enumerate() {
            pred += phi * (work[t - (j + 1) * s] - mu);
        }
        for (i, theta) in c.ma.iter().enumerate() {
            pred += theta * residuals[t - 1 - i];
        }
        for (j, theta) in c.seasonal_ma.iter().enumerate() {
            pred += theta * residuals[t - (j + 1) * s];
        }
        residuals[t] = work[t] - pred;
    }

    residuals
}

fn css(work: &[f64], spec: &SarimaSpec, c: &Coefficients) -> f64 {
    let residuals = residual_pass(work, spec, c);
    residuals[spec.recursion_start()..]
        .iter()
        .map(|e| e * e)
        .sum()
}
