//! Derivative-free minimization used by the model fit.

// Standard Nelder-Mead coefficients.
const REFLECT: f64 = 1.0;
const EXPAND: f64 = 2.0;
const CONTRACT: f64 = 0.5;
const SHRINK: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct SimplexOptions {
    pub max_iter: usize,
    pub tolerance: f64,
    pub initial_step: f64,
}

impl Default for SimplexOptions {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
            initial_step: 0.05,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Minimum {
    pub point: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Minimize `objective` with the Nelder-Mead simplex, optionally clamping
/// every candidate point to per-dimension `bounds`.
pub fn minimize<F>(
    objective: F,
    start: &[f64],
    bounds: Option<&[(f64, f64)]>,
    opts: SimplexOptions,
) -> Minimum
where
    F: Fn(&[f64]) -> f64,
{
    let dim = start.len();
    if dim == 0 {
        return Minimum {
            point: vec![],
            value: f64::NAN,
            iterations: 0,
            converged: false,
        };
    }

    let clamp = |point: Vec<f64>| -> Vec<f64> {
        match bounds {
            None => point,
            Some(b) => point
                .into_iter()
                .enumerate()
                .map(|(i, x)| if i < b.len() { x.clamp(b[i].0, b[i].1) } else { x })
                .collect(),
        }
    };

    // Vertices carry their objective value so sorting never re-evaluates.
    let mut simplex: Vec<(f64, Vec<f64>)> = Vec::with_capacity(dim + 1);
    let base = clamp(start.to_vec());
    simplex.push((objective(&base), base));
    for i in 0..dim {
        let mut vertex = start.to_vec();
        vertex[i] += if start[i].abs() > 1e-10 {
            opts.initial_step * start[i].abs()
        } else {
            opts.initial_step
        };
        let vertex = clamp(vertex);
        simplex.push((objective(&vertex), vertex));
    }

    let mut iterations = 0;
    let mut converged = false;

    while iterations < opts.max_iter {
        iterations += 1;
        simplex.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let best = simplex[0].0;
        let worst = simplex[dim].0;
        if worst - best < opts.tolerance {
            converged = true;
            break;
        }

        // Centroid of every vertex except the worst.
        let mut centroid = vec![0.0; dim];
        for (_, vertex) in &simplex[..dim] {
            for (c, x) in centroid.iter_mut().zip(vertex) {
                *c += x;
            }
        }
        for c in &mut centroid {
            *c /= dim as f64;
        }

        let blend = |towards: &[f64], coeff: f64| -> Vec<f64> {
            clamp(
                centroid
                    .iter()
                    .zip(towards)
                    .map(|(c, x)| c + coeff * (x - c))
                    .collect(),
            )
        };

        let reflected = blend(&simplex[dim].1, -REFLECT);
        let reflected_value = objective(&reflected);

        if reflected_value < best {
            let expanded = blend(&reflected, EXPAND);
            let expanded_value = objective(&expanded);
            simplex[dim] = if expanded_value < reflected_value {
                (expanded_value, expanded)
            } else {
                (reflected_value, reflected)
            };
            continue;
        }

        if reflected_value < simplex[dim - 1].0 {
            simplex[dim] = (reflected_value, reflected);
            continue;
        }

        // Contract towards whichever of worst/reflected is better.
        let contracted = if reflected_value < simplex[dim].0 {
            blend(&reflected, CONTRACT)
        } else {
            blend(&simplex[dim].1, CONTRACT)
        };
        let contracted_value = objective(&contracted);
        if contracted_value < simplex[dim].0.min(reflected_value) {
            simplex[dim] = (contracted_value, contracted);
            continue;
        }

        // Shrink everything towards the best vertex.
        let anchor = simplex[0].1.clone();
        for entry in simplex.iter_mut().skip(1) {
            let shrunk: Vec<f64> = anchor
                .iter()
                .zip(&entry.1)
                .map(|(a, x)| a + SHRINK * (x - a))
                .collect();
            let shrunk = clamp(shrunk);
            *entry = (objective(&shrunk), shrunk);
        }
    }

    simplex.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    let (value, point) = simplex.swap_remove(0);

    Minimum {
        point,
        value,
        iterations,
        converged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn finds_quadratic_minimum() {
        let result = minimize(
            |x| (x[0] - 2.0).powi(2) + (x[1] + 3.0).powi(2),
            &[0.0, 0.0],
            None,
            SimplexOptions::default(),
        );

        assert!(result.converged);
        assert_relative_eq!(result.point[0], 2.0, epsilon = 1e-3);
        assert_relative_eq!(result.point[1], -3.0, epsilon = 1e-3);
    }

    #[test]
    fn respects_bounds() {
        // Unconstrained minimum at 5, but x is capped at 3.
        let result = minimize(
            |x| (x[0] - 5.0).powi(2),
            &[1.0],
            Some(&[(0.0, 3.0)]),
            SimplexOptions::default(),
        );

        assert_relative_eq!(result.point[0], 3.0, epsilon = 1e-3);
    }

    #[test]
    fn handles_start_at_optimum() {
        let result = minimize(
            |x| (x[0] - 1.0).powi(2),
            &[1.0],
            None,
            SimplexOptions::default(),
        );

        assert!(result.converged);
        assert_relative_eq!(result.point[0], 1.0, epsilon = 1e-3);
    }

    #[test]
    fn empty_start_does_not_panic() {
        let result = minimize(|_| 0.0, &[], None, SimplexOptions::default());
        assert!(!result.converged);
        assert!(result.value.is_nan());
    }
}
