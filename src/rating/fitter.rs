use super::types::{FitMethod, FitOptions, Ranking, Strengths};
use crate::errors::ModelResult;

/// Strengths produced by a fitting strategy
#[derive(Debug, Clone, PartialEq)]
pub struct FitOutcome {
    pub strengths: Strengths,
    pub iterations: usize,
    pub converged: bool,
}

/// A strategy that turns rankings into strengths.
///
/// Rankings are assumed to be validated against `initial.len()` already.
pub trait Fitter {
    fn method(&self) -> FitMethod;

    fn fit(
        &self,
        rankings: &[Ranking],
        initial: &Strengths,
        options: &FitOptions,
    ) -> ModelResult<FitOutcome>;
}
