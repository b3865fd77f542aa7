use log::{info, warn};
use ndarray::Array1;

use super::fitter::{FitOutcome, Fitter};
use super::likelihood::{log_likelihood, log_likelihood_gradient};
use super::minimizer::{Bound, Minimizer, Objective, ProjectedGradient, SumConstraint};
use super::types::{FitMethod, FitOptions, Ranking, Strengths};
use crate::config::settings::MleSettings;
use crate::errors::{ModelError, ModelResult};

/// Negative log-likelihood of a fixed set of rankings
pub struct NegativeLogLikelihood<'a> {
    rankings: &'a [Ranking],
}

impl<'a> NegativeLogLikelihood<'a> {
    pub fn new(rankings: &'a [Ranking]) -> Self {
        Self { rankings }
    }
}

impl Objective for NegativeLogLikelihood<'_> {
    fn value(&self, x: &Array1<f64>) -> f64 {
        -log_likelihood(x, self.rankings)
    }

    fn gradient(&self, x: &Array1<f64>) -> Array1<f64> {
        -log_likelihood_gradient(x, self.rankings)
    }
}

/// Fits strengths by direct constrained maximization of the log-likelihood.
///
/// Strengths are kept at `sum == n_items` and `>= lower_bound`. The iteration
/// budget of the minimizer is part of the minimizer itself, so
/// `FitOptions::max_iterations` and `tolerance` are not consulted here.
pub struct MleFitter<M = ProjectedGradient> {
    minimizer: M,
    lower_bound: f64,
}

impl MleFitter<ProjectedGradient> {
    pub fn from_settings(settings: &MleSettings) -> Self {
        Self::new(ProjectedGradient::from(settings), settings.lower_bound)
    }
}

impl Default for MleFitter<ProjectedGradient> {
    fn default() -> Self {
        Self::from_settings(&MleSettings::default())
    }
}

impl<M: Minimizer> MleFitter<M> {
    pub fn new(minimizer: M, lower_bound: f64) -> Self {
        Self {
            minimizer,
            lower_bound,
        }
    }
}

impl<M: Minimizer> Fitter for MleFitter<M> {
    fn method(&self) -> FitMethod {
        FitMethod::Mle
    }

    fn fit(
        &self,
        rankings: &[Ranking],
        initial: &Strengths,
        _options: &FitOptions,
    ) -> ModelResult<FitOutcome> {
        let n_items = initial.len();
        info!(
            "Fitting {} items on {} rankings using constrained MLE",
            n_items,
            rankings.len()
        );

        let objective = NegativeLogLikelihood::new(rankings);
        let bounds = vec![Bound::at_least(self.lower_bound); n_items];
        let constraint = SumConstraint::new(n_items as f64);

        let result = self
            .minimizer
            .minimize(&objective, initial, &bounds, &constraint);

        if !result.success {
            warn!(
                "Minimizer failed after {} iterations: {}",
                result.iterations, result.message
            );
            return Err(ModelError::OptimizationFailure {
                iterations: result.iterations,
                message: result.message,
            });
        }

        info!("MLE converged in {} iterations", result.iterations);
        Ok(FitOutcome {
            strengths: result.solution,
            iterations: result.iterations,
            converged: true,
        })
    }
}
