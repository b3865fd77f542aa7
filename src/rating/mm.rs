use log::{debug, info, warn};
use ndarray::Array1;

use super::convergence::{calculate_max_change, should_continue};
use super::fitter::{FitOutcome, Fitter};
use super::likelihood::{choice_positions, remaining_sum};
use super::normalization::rescale_to_total;
use super::types::{FitMethod, FitOptions, Ranking, Strengths};
use crate::config::settings::MmSettings;
use crate::errors::ModelResult;

/// Fits strengths using the MM (Minorization-Maximization) algorithm
/// This is Hunter's (2004) fixed-point iteration for Plackett-Luce; every step
/// is guaranteed not to decrease the log-likelihood.
#[derive(Debug, Clone, Default)]
pub struct MmFitter {
    settings: MmSettings,
}

impl MmFitter {
    pub fn new(settings: MmSettings) -> Self {
        Self { settings }
    }

    /// One MM update: reads `current`, returns the rescaled candidate.
    pub fn step(&self, rankings: &[Ranking], current: &Strengths) -> Strengths {
        let n_items = current.len();
        let (wins, gamma) = accumulate(rankings, current);

        // Items that never compete have no information; keep them as they are.
        let active: Vec<bool> = gamma.iter().map(|&g| g > 0.0).collect();

        let mut next = Array1::from_shape_fn(n_items, |i| {
            if active[i] {
                self.update_strength(wins[i], gamma[i])
            } else {
                current[i]
            }
        });

        rescale_to_total(&mut next, &active, n_items as f64);
        next
    }

    fn update_strength(&self, wins: f64, gamma: f64) -> f64 {
        let strength = wins / (gamma + self.settings.gamma_epsilon);
        strength.max(self.settings.min_strength)
    }
}

impl Fitter for MmFitter {
    fn method(&self) -> FitMethod {
        FitMethod::Mm
    }

    fn fit(
        &self,
        rankings: &[Ranking],
        initial: &Strengths,
        options: &FitOptions,
    ) -> ModelResult<FitOutcome> {
        info!(
            "Fitting {} items on {} rankings using MM algorithm",
            initial.len(),
            rankings.len()
        );

        let mut strengths = initial.clone();
        let mut iteration = 0;
        let mut converged = false;

        while should_continue(iteration, options.max_iterations) {
            let next = self.step(rankings, &strengths);
            let max_change = calculate_max_change(&strengths, &next);
            debug!("MM iteration {}: max change {:.3e}", iteration + 1, max_change);

            strengths = next;
            iteration += 1;

            if max_change < options.tolerance {
                converged = true;
                break;
            }
        }

        if converged {
            info!("MM algorithm converged in {} iterations", iteration);
        } else {
            warn!(
                "MM algorithm stopped after {} iterations without reaching tolerance {:e}",
                iteration, options.tolerance
            );
        }

        Ok(FitOutcome {
            strengths,
            iterations: iteration,
            converged,
        })
    }
}

/// Build the `wins` and `gamma` accumulators for one iteration.
fn accumulate(rankings: &[Ranking], strengths: &Strengths) -> (Array1<f64>, Array1<f64>) {
    let mut wins = Array1::<f64>::zeros(strengths.len());
    let mut gamma = Array1::<f64>::zeros(strengths.len());

    for ranking in rankings {
        for pos in choice_positions(ranking) {
            let suffix = &ranking[pos..];
            let inverse_sum = 1.0 / remaining_sum(strengths, suffix);

            wins[ranking[pos]] += 1.0;
            for &item in suffix {
                gamma[item] += inverse_sum;
            }
        }
    }

    (wins, gamma)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::likelihood::log_likelihood;

    fn ones(n: usize) -> Strengths {
        Array1::from_elem(n, 1.0)
    }

    fn mixed_rankings() -> Vec<Ranking> {
        vec![
            vec![0, 1, 2, 3],
            vec![0, 2, 1, 3],
            vec![1, 0, 2, 3],
            vec![0, 1, 3, 2],
            vec![3, 0, 2, 1],
            vec![2, 1, 0],
            vec![1, 3],
        ]
    }

    #[test]
    fn test_step_keeps_sum_at_n_items() {
        let fitter = MmFitter::default();
        let next = fitter.step(&mixed_rankings(), &ones(4));

        assert!((next.sum() - 4.0).abs() < 1e-9);
        assert!(next.iter().all(|&s| s > 0.0));
    }

    #[test]
    fn test_log_likelihood_never_decreases() {
        let fitter = MmFitter::default();
        let rankings = mixed_rankings();
        let mut strengths = ones(4);
        let mut previous = log_likelihood(&strengths, &rankings);

        for _ in 0..50 {
            strengths = fitter.step(&rankings, &strengths);
            let current = log_likelihood(&strengths, &rankings);
            assert!(
                current >= previous - 1e-12,
                "log-likelihood dropped from {} to {}",
                previous,
                current
            );
            previous = current;
        }
    }

    #[test]
    fn test_fit_converges_on_informative_data() {
        let fitter = MmFitter::default();
        let outcome = fitter
            .fit(&mixed_rankings(), &ones(4), &FitOptions::new(1000, 1e-8))
            .unwrap();

        assert!(outcome.converged);
        assert!(outcome.iterations < 1000);
        assert!(outcome.strengths[0] > outcome.strengths[3]);
    }

    #[test]
    fn test_fit_reports_exhausted_iterations() {
        // Item 0 always wins, so the MLE sits on the boundary and MM keeps moving.
        let fitter = MmFitter::default();
        let rankings = vec![vec![0, 1, 2], vec![0, 1, 2]];
        let outcome = fitter
            .fit(&rankings, &ones(3), &FitOptions::new(5, 1e-12))
            .unwrap();

        assert!(!outcome.converged);
        assert_eq!(outcome.iterations, 5);
    }

    #[test]
    fn test_absent_item_keeps_initial_strength() {
        let fitter = MmFitter::default();
        let rankings = vec![vec![0, 1], vec![1, 0], vec![0, 1]];
        let outcome = fitter
            .fit(&rankings, &ones(3), &FitOptions::default())
            .unwrap();

        assert_eq!(outcome.strengths[2], 1.0);
        assert!((outcome.strengths.sum() - 3.0).abs() < 1e-9);
        assert!(outcome.strengths[0] > outcome.strengths[1]);
    }

    #[test]
    fn test_never_winning_item_stays_positive() {
        let fitter = MmFitter::default();
        let rankings = vec![vec![0, 1, 2], vec![1, 0, 2]];
        let next = fitter.step(&rankings, &ones(3));

        assert!(next[2] > 0.0);
        assert!(next[2] < next[0]);
    }
}
