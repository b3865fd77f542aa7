//! Constrained minimization used by the MLE fitter.
//!
//! The fitter only depends on the [`Minimizer`] trait: it hands over an
//! objective, a starting point, per-component bounds and a sum constraint,
//! and gets back a candidate optimum together with a success flag.
//! [`ProjectedGradient`] is the bundled implementation; tests swap in stubs.

use log::debug;
use ndarray::Array1;

use crate::config::settings::MleSettings;

const MIN_STEP: f64 = 1e-20;
const BISECTION_ROUNDS: usize = 200;
const METRIC_FLOOR: f64 = 1e-12;

/// Differentiable objective to be minimized
pub trait Objective {
    fn value(&self, x: &Array1<f64>) -> f64;
    fn gradient(&self, x: &Array1<f64>) -> Array1<f64>;
}

/// Box constraint on one component; `upper == None` means unbounded
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub lower: f64,
    pub upper: Option<f64>,
}

impl Bound {
    pub fn at_least(lower: f64) -> Self {
        Self { lower, upper: None }
    }

    fn upper_or_inf(&self) -> f64 {
        self.upper.unwrap_or(f64::INFINITY)
    }

    fn clamp(&self, value: f64) -> f64 {
        value.max(self.lower).min(self.upper_or_inf())
    }
}

/// Equality constraint `sum(x) == total`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SumConstraint {
    pub total: f64,
}

impl SumConstraint {
    pub fn new(total: f64) -> Self {
        Self { total }
    }

    pub fn residual(&self, x: &Array1<f64>) -> f64 {
        x.sum() - self.total
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Minimization {
    pub solution: Array1<f64>,
    pub success: bool,
    pub iterations: usize,
    pub message: String,
}

impl Minimization {
    pub fn converged(solution: Array1<f64>, iterations: usize) -> Self {
        Self {
            solution,
            success: true,
            iterations,
            message: "converged".to_string(),
        }
    }

    pub fn failed(solution: Array1<f64>, iterations: usize, message: impl Into<String>) -> Self {
        Self {
            solution,
            success: false,
            iterations,
            message: message.into(),
        }
    }
}

pub trait Minimizer {
    fn minimize(
        &self,
        objective: &dyn Objective,
        initial: &Array1<f64>,
        bounds: &[Bound],
        constraint: &SumConstraint,
    ) -> Minimization;
}

impl<M: Minimizer + ?Sized> Minimizer for &M {
    fn minimize(
        &self,
        objective: &dyn Objective,
        initial: &Array1<f64>,
        bounds: &[Bound],
        constraint: &SumConstraint,
    ) -> Minimization {
        (**self).minimize(objective, initial, bounds, constraint)
    }
}

/// Scaled projected gradient descent with Barzilai-Borwein trial steps and
/// backtracking on the proximal sufficient-decrease condition.
///
/// Steps are taken in the diagonal metric `max(|x_i|, METRIC_FLOOR)^2`, the
/// curvature of `ln x_i`, so it suits objectives over positive variables.
/// Stops when the largest component change or the relative objective change
/// falls below `tolerance`.
#[derive(Debug, Clone)]
pub struct ProjectedGradient {
    max_iterations: usize,
    tolerance: f64,
    initial_step: f64,
}

impl ProjectedGradient {
    pub fn new(max_iterations: usize, tolerance: f64, initial_step: f64) -> Self {
        Self {
            max_iterations,
            tolerance,
            initial_step,
        }
    }

    fn line_search(
        &self,
        objective: &dyn Objective,
        current: &Iterate,
        metric: &Array1<f64>,
        bounds: &[Bound],
        total: f64,
        trial_step: f64,
    ) -> Option<Iterate> {
        let scaled_gradient = &current.gradient * metric;
        let mut step = trial_step;

        while step > MIN_STEP {
            let shifted = &current.x - &(&scaled_gradient * step);
            let candidate = project_scaled(&shifted, metric, bounds, total)?;
            let delta = &candidate - &current.x;
            let value = objective.value(&candidate);
            let upper_model = current.value
                + current.gradient.dot(&delta)
                + metric_norm_sq(&delta, metric) / (2.0 * step)
                + f64::EPSILON * current.value.abs().max(1.0);

            if value.is_finite() && value <= upper_model {
                let gradient = objective.gradient(&candidate);
                return Some(Iterate {
                    x: candidate,
                    value,
                    gradient,
                    step,
                });
            }

            step *= 0.5;
        }

        None
    }

    fn has_converged(&self, current: &Iterate, next: &Iterate) -> bool {
        let max_change = max_abs_difference(&next.x, &current.x);
        let value_change = (current.value - next.value).abs();

        max_change < self.tolerance || value_change <= self.tolerance * next.value.abs().max(1.0)
    }
}

impl From<&MleSettings> for ProjectedGradient {
    fn from(settings: &MleSettings) -> Self {
        Self::new(
            settings.max_iterations,
            settings.tolerance,
            settings.initial_step,
        )
    }
}

impl Default for ProjectedGradient {
    fn default() -> Self {
        Self::from(&MleSettings::default())
    }
}

impl Minimizer for ProjectedGradient {
    fn minimize(
        &self,
        objective: &dyn Objective,
        initial: &Array1<f64>,
        bounds: &[Bound],
        constraint: &SumConstraint,
    ) -> Minimization {
        if bounds.len() != initial.len() {
            return Minimization::failed(
                initial.clone(),
                0,
                format!(
                    "expected {} bounds, got {}",
                    initial.len(),
                    bounds.len()
                ),
            );
        }

        let Some(start) = project(initial, bounds, constraint.total) else {
            return Minimization::failed(initial.clone(), 0, "constraints are infeasible");
        };

        let value = objective.value(&start);
        if !value.is_finite() {
            return Minimization::failed(start, 0, "objective is not finite at the start point");
        }

        let gradient = objective.gradient(&start);
        let mut current = Iterate {
            x: start,
            value,
            gradient,
            step: self.initial_step,
        };
        let mut trial_step = self.initial_step;

        for iteration in 1..=self.max_iterations {
            let metric = diagonal_metric(&current.x);
            let Some(next) = self.line_search(
                objective,
                &current,
                &metric,
                bounds,
                constraint.total,
                trial_step,
            ) else {
                return Minimization::failed(current.x, iteration, "step size collapsed");
            };

            debug!(
                "Minimizer iteration {}: objective {:.9}, step {:.3e}, max change {:.3e}",
                iteration,
                next.value,
                next.step,
                max_abs_difference(&next.x, &current.x)
            );

            if self.has_converged(&current, &next) {
                return Minimization::converged(next.x, iteration);
            }

            trial_step =
                barzilai_borwein_step(&current, &next, &metric).unwrap_or(next.step * 2.0);
            current = next;
        }

        Minimization::failed(current.x, self.max_iterations, "maximum iterations reached")
    }
}

struct Iterate {
    x: Array1<f64>,
    value: f64,
    gradient: Array1<f64>,
    step: f64,
}

fn diagonal_metric(x: &Array1<f64>) -> Array1<f64> {
    x.mapv(|v| v.abs().max(METRIC_FLOOR).powi(2))
}

fn metric_norm_sq(delta: &Array1<f64>, metric: &Array1<f64>) -> f64 {
    delta.iter().zip(metric).map(|(d, w)| d * d / w).sum()
}

fn barzilai_borwein_step(
    previous: &Iterate,
    next: &Iterate,
    metric: &Array1<f64>,
) -> Option<f64> {
    let s = &next.x - &previous.x;
    let y = &next.gradient - &previous.gradient;
    let curvature = s.dot(&y);

    if curvature > 0.0 {
        let step = metric_norm_sq(&s, metric) / curvature;
        step.is_finite().then_some(step)
    } else {
        None
    }
}

fn max_abs_difference(a: &Array1<f64>, b: &Array1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

/// Euclidean projection onto `{ x : bounds hold, sum(x) == total }`.
///
/// Returns `None` when no such point exists.
pub fn project(y: &Array1<f64>, bounds: &[Bound], total: f64) -> Option<Array1<f64>> {
    project_scaled(y, &Array1::ones(y.len()), bounds, total)
}

/// Projection in the metric `sum (x_i - y_i)^2 / w_i`.
///
/// Finds the shift `tau` with `sum(clamp(y_i - tau * w_i)) == total`. Weights
/// must be positive.
fn project_scaled(
    y: &Array1<f64>,
    weights: &Array1<f64>,
    bounds: &[Bound],
    total: f64,
) -> Option<Array1<f64>> {
    let lower_sum: f64 = bounds.iter().map(|b| b.lower).sum();
    let upper_sum: f64 = bounds.iter().map(|b| b.upper_or_inf()).sum();
    if lower_sum > total || upper_sum < total || y.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let shifted = |tau: f64| -> Array1<f64> {
        y.iter()
            .zip(weights)
            .zip(bounds)
            .map(|((&v, &w), b)| b.clamp(v - tau * w))
            .collect()
    };

    // At `hi` everything sits on its lower bound, at `lo` the sum reaches `total`.
    let slack = total - lower_sum;
    let mut hi = y
        .iter()
        .zip(weights)
        .zip(bounds)
        .map(|((&v, &w), b)| (v - b.lower) / w)
        .fold(f64::NEG_INFINITY, f64::max);
    let mut lo = y
        .iter()
        .zip(weights)
        .zip(bounds)
        .map(|((&v, &w), b)| {
            let to_slack = (v - b.lower - slack) / w;
            b.upper.map_or(to_slack, |u| to_slack.min((v - u) / w))
        })
        .fold(f64::INFINITY, f64::min);
    if !(lo.is_finite() && hi.is_finite()) {
        return None;
    }

    for _ in 0..BISECTION_ROUNDS {
        let mid = 0.5 * (lo + hi);
        if mid <= lo || mid >= hi {
            break;
        }
        if shifted(mid).sum() > total {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    let tau = refine_shift(y, weights, bounds, total, 0.5 * (lo + hi));
    Some(shifted(tau))
}

/// Solve exactly for `tau` on the components that are strictly inside their bounds.
fn refine_shift(
    y: &Array1<f64>,
    weights: &Array1<f64>,
    bounds: &[Bound],
    total: f64,
    tau: f64,
) -> f64 {
    let mut free_weight = 0.0;
    let mut free_sum = 0.0;
    let mut clamped_sum = 0.0;

    for ((&v, &w), b) in y.iter().zip(weights).zip(bounds) {
        let shifted = v - tau * w;
        if shifted > b.lower && shifted < b.upper_or_inf() {
            free_weight += w;
            free_sum += v;
        } else {
            clamped_sum += b.clamp(shifted);
        }
    }

    if free_weight == 0.0 {
        return tau;
    }

    let refined = (free_sum - (total - clamped_sum)) / free_weight;
    if refined.is_finite() { refined } else { tau }
}
