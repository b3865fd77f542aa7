//! Plackett-Luce strength estimation from total-order rankings.
//!
//! The estimation core lives in [`rating`]: a [`PlackettLuce`] model holds one
//! positive strength per item, is fitted with either the MM fixed-point
//! iteration or constrained maximum likelihood, and then answers probability,
//! log-likelihood and ranking queries. Everything else in the crate is the
//! command-line front end.
//!
//! ```
//! use plackett_luce::{FitMethod, FitOptions, PlackettLuce};
//!
//! let rankings = vec![vec![0, 1, 2], vec![0, 2, 1], vec![1, 0, 2]];
//! let mut model = PlackettLuce::new(3, FitMethod::Mm).unwrap();
//! let report = model.fit(&rankings, &FitOptions::default()).unwrap();
//!
//! assert_eq!(model.rank_items().unwrap()[0], 0);
//! assert!(report.log_likelihood < 0.0);
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod rating;
pub mod services;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use cli::{Cli, FitArgs};

use crate::cli::Command;
use crate::config::settings::AppConfig;
use crate::services::FittingService;

pub use errors::ModelError;
pub use rating::{FitMethod, FitOptions, FitReport, ItemId, PlackettLuce, Ranking};

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_fit(args: &FitArgs, top_k: Option<usize>, json: bool) -> Result<()> {
    let service = FittingService::new(AppConfig::new());
    service.run_fit(args, top_k, json)
}

pub fn handle_probability(args: &FitArgs, ranking: &[ItemId]) -> Result<()> {
    let service = FittingService::new(AppConfig::new());
    service.run_probability(args, ranking)
}

pub fn handle_completions(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}
