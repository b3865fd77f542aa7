use log::{debug, info};
use ndarray::Array1;

use super::extraction::{rank_by_strength, top_k_by_strength};
use super::fitter::Fitter;
use super::likelihood::{log_likelihood, ranking_probability};
use super::minimizer::{Minimizer, ProjectedGradient};
use super::mle::MleFitter;
use super::mm::MmFitter;
use super::types::{
    FitMethod, FitOptions, FitReport, INITIAL_STRENGTH, ItemId, Ranking, Strengths,
};
use super::validation::{validate_ranking, validate_rankings};
use crate::config::settings::AppConfig;
use crate::errors::{ModelError, ModelResult};

/// Per-item strengths plus the fitted flag
#[derive(Debug, Clone, PartialEq)]
pub struct StrengthStore {
    strengths: Strengths,
    fitted: bool,
}

impl StrengthStore {
    pub fn new(n_items: usize) -> Self {
        Self {
            strengths: Array1::from_elem(n_items, INITIAL_STRENGTH),
            fitted: false,
        }
    }

    pub fn len(&self) -> usize {
        self.strengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strengths.is_empty()
    }

    pub fn strength(&self, item: ItemId) -> Option<f64> {
        self.strengths.get(item).copied()
    }

    pub fn strengths(&self) -> &Strengths {
        &self.strengths
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    pub fn set_fitted(&mut self, fitted: bool) {
        self.fitted = fitted;
    }

    /// Swap in a new vector; the fitted flag is left as it is.
    pub fn replace(&mut self, strengths: Strengths) -> ModelResult<()> {
        check_strengths(&strengths, self.len()).map_err(ModelError::InvalidArgument)?;
        self.strengths = strengths;
        Ok(())
    }

    fn require_fitted(&self) -> ModelResult<()> {
        if self.fitted {
            Ok(())
        } else {
            Err(ModelError::NotFitted)
        }
    }
}

fn check_strengths(strengths: &Strengths, n_items: usize) -> Result<(), String> {
    if strengths.len() != n_items {
        return Err(format!(
            "expected {} strengths, got {}",
            n_items,
            strengths.len()
        ));
    }
    match strengths.iter().position(|s| !(s.is_finite() && *s > 0.0)) {
        Some(item) => Err(format!(
            "strength of item {} must be positive and finite, got {}",
            item, strengths[item]
        )),
        None => Ok(()),
    }
}

/// Plackett-Luce model over `n_items` items identified by `0..n_items`.
pub struct PlackettLuce {
    method: FitMethod,
    store: StrengthStore,
    config: AppConfig,
    minimizer: Box<dyn Minimizer + Send>,
}

impl std::fmt::Debug for PlackettLuce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlackettLuce")
            .field("method", &self.method)
            .field("store", &self.store)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PlackettLuce {
    pub fn new(n_items: usize, method: FitMethod) -> ModelResult<Self> {
        Self::with_config(n_items, method, AppConfig::default())
    }

    pub fn with_config(n_items: usize, method: FitMethod, config: AppConfig) -> ModelResult<Self> {
        if n_items == 0 {
            return Err(ModelError::invalid("n_items must be positive"));
        }

        let minimizer = Box::new(ProjectedGradient::from(&config.mle));
        Ok(Self {
            method,
            store: StrengthStore::new(n_items),
            config,
            minimizer,
        })
    }

    /// Replace the minimizer used by the MLE method.
    pub fn with_minimizer<M: Minimizer + Send + 'static>(mut self, minimizer: M) -> Self {
        self.minimizer = Box::new(minimizer);
        self
    }

    pub fn n_items(&self) -> usize {
        self.store.len()
    }

    pub fn method(&self) -> FitMethod {
        self.method
    }

    pub fn store(&self) -> &StrengthStore {
        &self.store
    }

    pub fn strengths(&self) -> &Strengths {
        self.store.strengths()
    }

    pub fn strength(&self, item: ItemId) -> Option<f64> {
        self.store.strength(item)
    }

    pub fn is_fitted(&self) -> bool {
        self.store.is_fitted()
    }

    /// Load strengths computed elsewhere. Does not mark the model as fitted.
    pub fn set_strengths(&mut self, strengths: Vec<f64>) -> ModelResult<()> {
        self.store.replace(Array1::from(strengths))
    }

    /// Fit strengths to `rankings` with the method chosen at construction.
    ///
    /// On success the model is marked fitted. If the MLE minimizer reports a
    /// failure, `OptimizationFailure` is returned and strengths and fitted flag
    /// are left untouched.
    pub fn fit(&mut self, rankings: &[Ranking], options: &FitOptions) -> ModelResult<FitReport> {
        options.validate()?;
        validate_rankings(rankings, self.n_items())?;

        let outcome = {
            let fitter = self.fitter();
            debug!("Dispatching {} rankings to the {} fitter", rankings.len(), fitter.method());
            fitter.fit(rankings, self.store.strengths(), options)?
        };

        check_strengths(&outcome.strengths, self.n_items()).map_err(|message| {
            ModelError::OptimizationFailure {
                iterations: outcome.iterations,
                message,
            }
        })?;

        self.store.replace(outcome.strengths)?;
        self.store.set_fitted(true);

        let report = FitReport {
            method: self.method,
            iterations: outcome.iterations,
            converged: outcome.converged,
            log_likelihood: log_likelihood(self.store.strengths(), rankings),
        };
        info!(
            "Fit complete ({}): {} iterations, converged = {}, log-likelihood = {:.6}",
            report.method, report.iterations, report.converged, report.log_likelihood
        );

        Ok(report)
    }

    /// Probability of `ranking` under the fitted strengths.
    pub fn probability(&self, ranking: &[ItemId]) -> ModelResult<f64> {
        self.store.require_fitted()?;
        validate_ranking(ranking, self.n_items())?;
        Ok(ranking_probability(self.store.strengths(), ranking))
    }

    /// Log-likelihood of `rankings` under the current strengths.
    ///
    /// Unlike [`probability`](Self::probability) this does not require a
    /// fitted model: it evaluates whatever strengths are held, including the
    /// initial all-ones vector.
    pub fn log_likelihood<R: AsRef<[ItemId]>>(&self, rankings: &[R]) -> ModelResult<f64> {
        validate_rankings(rankings, self.n_items())?;
        Ok(log_likelihood(self.store.strengths(), rankings))
    }

    pub fn rank_items(&self) -> ModelResult<Vec<ItemId>> {
        self.store.require_fitted()?;
        Ok(rank_by_strength(self.store.strengths()))
    }

    pub fn top_k(&self, k: usize) -> ModelResult<Vec<ItemId>> {
        self.store.require_fitted()?;
        if k > self.n_items() {
            return Err(ModelError::invalid(format!(
                "k = {} exceeds n_items = {}",
                k,
                self.n_items()
            )));
        }
        Ok(top_k_by_strength(self.store.strengths(), k))
    }

    fn fitter(&self) -> Box<dyn Fitter + '_> {
        match self.method {
            FitMethod::Mm => Box::new(MmFitter::new(self.config.mm.clone())),
            FitMethod::Mle => Box::new(MleFitter::new(
                self.minimizer.as_ref(),
                self.config.mle.lower_bound,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::minimizer::{Bound, Minimization, Objective, SumConstraint};

    struct FailingMinimizer;

    impl Minimizer for FailingMinimizer {
        fn minimize(
            &self,
            _objective: &dyn Objective,
            initial: &Array1<f64>,
            _bounds: &[Bound],
            _constraint: &SumConstraint,
        ) -> Minimization {
            Minimization::failed(initial.clone(), 3, "no progress")
        }
    }

    struct GarbageMinimizer;

    impl Minimizer for GarbageMinimizer {
        fn minimize(
            &self,
            _objective: &dyn Objective,
            _initial: &Array1<f64>,
            _bounds: &[Bound],
            _constraint: &SumConstraint,
        ) -> Minimization {
            Minimization::converged(Array1::from(vec![1.0, -1.0]), 1)
        }
    }

    #[test]
    fn test_new_model_is_unfitted_with_unit_strengths() {
        let model = PlackettLuce::new(5, FitMethod::Mm).unwrap();

        assert_eq!(model.n_items(), 5);
        assert!(!model.is_fitted());
        assert!(model.strengths().iter().all(|&s| s == 1.0));
    }

    #[test]
    fn test_zero_items_rejected() {
        assert!(matches!(
            PlackettLuce::new(0, FitMethod::Mm),
            Err(ModelError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_queries_before_fit_fail() {
        let model = PlackettLuce::new(3, FitMethod::Mm).unwrap();

        assert_eq!(model.probability(&[0, 1, 2]), Err(ModelError::NotFitted));
        assert_eq!(model.rank_items(), Err(ModelError::NotFitted));
        assert_eq!(model.top_k(1), Err(ModelError::NotFitted));
    }

    #[test]
    fn test_log_likelihood_works_before_fit() {
        let model = PlackettLuce::new(3, FitMethod::Mm).unwrap();
        let ll = model.log_likelihood(&[vec![0, 1, 2]]).unwrap();

        // ln(1/3) + ln(1/2)
        assert!((ll - (1.0f64 / 6.0).ln()).abs() < 1e-12);
    }

    #[test]
    fn test_fit_rejects_bad_rankings_and_options() {
        let mut model = PlackettLuce::new(3, FitMethod::Mm).unwrap();

        let duplicate = model.fit(&[vec![0, 0, 1]], &FitOptions::default());
        assert!(matches!(duplicate, Err(ModelError::InvalidArgument(_))));

        let out_of_range = model.fit(&[vec![0, 5]], &FitOptions::default());
        assert!(matches!(out_of_range, Err(ModelError::InvalidArgument(_))));

        let zero_iterations = model.fit(&[vec![0, 1]], &FitOptions::new(0, 1e-6));
        assert!(matches!(zero_iterations, Err(ModelError::InvalidArgument(_))));

        assert!(!model.is_fitted());
    }

    #[test]
    fn test_failed_mle_leaves_model_unfitted() {
        let mut model = PlackettLuce::new(3, FitMethod::Mle)
            .unwrap()
            .with_minimizer(FailingMinimizer);

        let err = model
            .fit(&[vec![0, 1, 2]], &FitOptions::default())
            .unwrap_err();

        assert!(matches!(err, ModelError::OptimizationFailure { iterations: 3, .. }));
        assert!(!model.is_fitted());
        assert!(model.strengths().iter().all(|&s| s == 1.0));
    }

    #[test]
    fn test_invalid_minimizer_output_is_rejected() {
        let mut model = PlackettLuce::new(3, FitMethod::Mle)
            .unwrap()
            .with_minimizer(GarbageMinimizer);

        let err = model
            .fit(&[vec![0, 1, 2]], &FitOptions::default())
            .unwrap_err();

        assert!(matches!(err, ModelError::OptimizationFailure { .. }));
        assert!(!model.is_fitted());
    }

    #[test]
    fn test_top_k_rejects_k_above_n_items() {
        let mut model = PlackettLuce::new(3, FitMethod::Mm).unwrap();
        model.fit(&[vec![0, 1, 2]], &FitOptions::default()).unwrap();

        assert!(matches!(model.top_k(4), Err(ModelError::InvalidArgument(_))));
        assert_eq!(model.top_k(0).unwrap(), Vec::<ItemId>::new());
    }

    #[test]
    fn test_refit_after_loading_lopsided_strengths() {
        // Item 2 never competes but holds more than n_items of the mass.
        let mut model = PlackettLuce::new(3, FitMethod::Mm).unwrap();
        model.set_strengths(vec![0.1, 0.1, 10.0]).unwrap();

        let rankings = vec![vec![0, 1], vec![1, 0], vec![0, 1]];
        let report = model.fit(&rankings, &FitOptions::default()).unwrap();

        assert!(report.converged);
        assert!(model.strengths().iter().all(|&s| s > 0.0));
        assert!((model.strengths().sum() - 3.0).abs() < 1e-9);
        assert!(model.strength(0).unwrap() > model.strength(1).unwrap());

        model.fit(&rankings, &FitOptions::default()).unwrap();
        assert!(model.is_fitted());
    }

    #[test]
    fn test_set_strengths_validates() {
        let mut model = PlackettLuce::new(2, FitMethod::Mm).unwrap();

        assert!(model.set_strengths(vec![1.0]).is_err());
        assert!(model.set_strengths(vec![1.0, 0.0]).is_err());
        model.set_strengths(vec![0.5, 1.5]).unwrap();
        assert_eq!(model.strength(1), Some(1.5));
        assert!(!model.is_fitted());
    }
}
