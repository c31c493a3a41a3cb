//! Plain-text fit summary for the results page.

use crate::sarima::Sarima;
use crate::stats::diagnostics::{jarque_bera, ljung_box};

const RULE: &str = "======================================================";
const LIGHT_RULE: &str = "------------------------------------------------------";

impl Sarima {
    /// Render the fitted model as a fixed-width text block: specification,
    /// fit statistics, coefficient table and residual diagnostics.
    pub fn summary(&self) -> String {
        let spec = self.spec();
        let mut out = String::new();
        out.push_str(RULE);
        out.push('\n');
        out.push_str("                   SARIMA Results\n");
        out.push_str(RULE);
        out.push('\n');

        push_row(&mut out, "Model:", &spec.label());
        match self.n_obs() {
            Some(n) => push_row(&mut out, "No. Observations:", &n.to_string()),
            None => push_row(&mut out, "No. Observations:", "-"),
        }
        push_stat(&mut out, "Log Likelihood:", self.log_likelihood());
        push_stat(&mut out, "AIC:", self.aic());
        push_stat(&mut out, "BIC:", self.bic());
        push_stat(&mut out, "Residual Variance:", self.sigma2());

        out.push_str(LIGHT_RULE);
        out.push('\n');
        out.push_str("Coefficients\n");
        push_coef(&mut out, "intercept", self.intercept());
        for (i, c) in self.ar_coefficients().iter().enumerate() {
            push_coef(&mut out, &format!("ar.L{}", i + 1), *c);
        }
        for (i, c) in self.ma_coefficients().iter().enumerate() {
            push_coef(&mut out, &format!("ma.L{}", i + 1), *c);
        }
        for (i, c) in self.seasonal_ar_coefficients().iter().enumerate() {
            push_coef(&mut out, &format!("ar.S.L{}", (i + 1) * spec.period), *c);
        }
        for (i, c) in self.seasonal_ma_coefficients().iter().enumerate() {
            push_coef(&mut out, &format!("ma.S.L{}", (i + 1) * spec.period), *c);
        }

        out.push_str(LIGHT_RULE);
        out.push('\n');
        out.push_str("Diagnostics\n");
        if let Some(residuals) = self.residuals() {
            let fitted = spec.num_params() - 1;
            let lb = ljung_box(residuals, None, fitted);
            out.push_str(&format!(
                "  Ljung-Box Q({}): {:>12.3}  (p = {:.3})\n",
                lb.lags, lb.statistic, lb.p_value
            ));
            let jb = jarque_bera(residuals);
            out.push_str(&format!(
                "  Jarque-Bera:    {:>12.3}  (p = {:.3})\n",
                jb.statistic, jb.p_value
            ));
        } else {
            out.push_str("  (model not fitted)\n");
        }
        out.push_str(RULE);
        out.push('\n');

        out
    }
}

fn push_row(out: &mut String, name: &str, value: &str) {
    out.push_str(&format!("{name:<20}{value:>34}\n"));
}

fn push_stat(out: &mut String, name: &str, value: Option<f64>) {
    match value {
        Some(v) => push_row(out, name, &format!("{v:.3}")),
        None => push_row(out, name, "-"),
    }
}

fn push_coef(out: &mut String, name: &str, value: f64) {
    out.push_str(&format!("  {name:<12}{value:>14.6}\n"));
}
