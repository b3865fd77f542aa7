pub mod settings;

pub use settings::{AppConfig, FitSettings, MleSettings, MmSettings};
