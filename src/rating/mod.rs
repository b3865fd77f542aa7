mod convergence;
pub mod extraction;
pub mod fitter;
pub mod likelihood;
pub mod minimizer;
pub mod mle;
pub mod mm;
pub mod model;
mod normalization;
pub mod types;
pub mod validation;

pub use fitter::{FitOutcome, Fitter};
pub use minimizer::{Bound, Minimization, Minimizer, Objective, ProjectedGradient, SumConstraint};
pub use mle::MleFitter;
pub use mm::MmFitter;
pub use model::{PlackettLuce, StrengthStore};
pub use types::{FitMethod, FitOptions, FitReport, ItemId, Ranking, Strengths};
