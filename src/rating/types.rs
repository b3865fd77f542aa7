use std::fmt;
use std::str::FromStr;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::config::settings::FitSettings;
use crate::errors::ModelError;

pub type ItemId = usize;
pub type Ranking = Vec<ItemId>;
pub type Strengths = Array1<f64>;

/// Strength every item starts from
pub const INITIAL_STRENGTH: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMethod {
    Mm,
    Mle,
}

impl FitMethod {
    pub fn as_str(&self) -> &str {
        match self {
            FitMethod::Mm => "mm",
            FitMethod::Mle => "mle",
        }
    }
}

impl fmt::Display for FitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FitMethod {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mm" => Ok(FitMethod::Mm),
            "mle" => Ok(FitMethod::Mle),
            other => Err(ModelError::invalid(format!("Unknown method: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FitOptions {
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl FitOptions {
    pub fn new(max_iterations: usize, tolerance: f64) -> Self {
        Self {
            max_iterations,
            tolerance,
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.max_iterations == 0 {
            return Err(ModelError::invalid("max_iter must be positive"));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(ModelError::invalid(format!(
                "tol must be a positive finite number, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

impl From<&FitSettings> for FitOptions {
    fn from(settings: &FitSettings) -> Self {
        Self::new(settings.max_iterations, settings.convergence_tolerance)
    }
}

impl Default for FitOptions {
    fn default() -> Self {
        Self::from(&FitSettings::default())
    }
}

/// Outcome of a completed fit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitReport {
    pub method: FitMethod,
    pub iterations: usize,
    /// False when MM ran out of iterations before meeting the tolerance
    pub converged: bool,
    pub log_likelihood: f64,
}
