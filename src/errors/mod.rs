use anyhow::Context as _;
use thiserror::Error;

/// Errors raised by the estimation core
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Model must be fitted before use")]
    NotFitted,

    #[error("Optimization failed after {iterations} iterations: {message}")]
    OptimizationFailure { iterations: usize, message: String },
}

impl ModelError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ModelError::InvalidArgument(message.into())
    }
}

pub type ModelResult<T> = Result<T, ModelError>;

/// Add context to dataset loading errors
pub fn dataset_context(path: &str) -> String {
    format!("Failed to load dataset from: {}", path)
}

/// Add context to fitting errors
pub fn fit_context(method: &str) -> String {
    format!("Failed to fit model using {} method", method)
}

/// Wrap result with dataset context
pub fn with_dataset_context<T, E>(result: Result<T, E>, path: &str) -> anyhow::Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    result.context(dataset_context(path))
}

/// Wrap result with fit context
pub fn with_fit_context<T>(result: ModelResult<T>, method: &str) -> anyhow::Result<T> {
    result.context(fit_context(method))
}
