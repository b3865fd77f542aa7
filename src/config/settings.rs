#[derive(Debug, Clone, PartialEq)]
pub struct FitSettings {
    pub max_iterations: usize,
    pub convergence_tolerance: f64,
}

impl Default for FitSettings {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            convergence_tolerance: 1e-6,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MmSettings {
    /// Added to every gamma accumulator before dividing
    pub gamma_epsilon: f64,
    /// Floor for items that compete but never win
    pub min_strength: f64,
}

impl Default for MmSettings {
    fn default() -> Self {
        Self {
            gamma_epsilon: 1e-10,
            min_strength: 1e-10,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MleSettings {
    /// Lower bound applied to every strength
    pub lower_bound: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
    pub initial_step: f64,
}

impl Default for MleSettings {
    fn default() -> Self {
        Self {
            lower_bound: 1e-6,
            max_iterations: 1000,
            tolerance: 1e-9,
            initial_step: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    pub fit: FitSettings,
    pub mm: MmSettings,
    pub mle: MleSettings,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }
}
