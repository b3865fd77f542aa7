use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use log::{info, warn};

use crate::cli::FitArgs;
use crate::config::settings::AppConfig;
use crate::domain::{Dataset, FitSummary};
use crate::errors::{with_dataset_context, with_fit_context};
use crate::rating::{FitMethod, FitOptions, FitReport, ItemId, PlackettLuce};

pub struct FittingService {
    config: AppConfig,
}

impl FittingService {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn run_fit(&self, args: &FitArgs, top_k: Option<usize>, json: bool) -> Result<()> {
        let dataset = self.load_dataset(&args.input)?;
        let (model, report) = self.fit_dataset(&dataset, args)?;
        let summary = FitSummary::build(&dataset, &model, &report, top_k)?;

        if json {
            let rendered =
                serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?;
            println!("{}", rendered);
        } else {
            print_summary(&summary);
        }

        Ok(())
    }

    pub fn run_probability(&self, args: &FitArgs, ranking: &[ItemId]) -> Result<()> {
        let dataset = self.load_dataset(&args.input)?;
        let (model, _) = self.fit_dataset(&dataset, args)?;
        let probability = model.probability(ranking)?;

        println!(
            "P({}) = {}",
            format_ranking(&dataset, ranking),
            format!("{:.6}", probability).green().bold()
        );
        Ok(())
    }

    pub fn load_dataset(&self, path: &Path) -> Result<Dataset> {
        let display = path.display().to_string();
        let json = with_dataset_context(fs::read_to_string(path), &display)?;
        let dataset: Dataset = with_dataset_context(serde_json::from_str(&json), &display)?;

        info!(
            "Loaded {} rankings from {}",
            dataset.rankings.len(),
            display
        );
        Ok(dataset)
    }

    /// Build a model for the dataset and fit it with the requested method.
    pub fn fit_dataset(
        &self,
        dataset: &Dataset,
        args: &FitArgs,
    ) -> Result<(PlackettLuce, FitReport)> {
        let method: FitMethod = args.method.parse()?;
        let n_items = dataset.resolve_n_items()?;
        let options = self.fit_options(method, args);

        let mut model = PlackettLuce::with_config(n_items, method, self.config.clone())?;
        let report = with_fit_context(model.fit(&dataset.rankings, &options), method.as_str())?;

        Ok((model, report))
    }

    /// MM options from the command line, falling back to the configured defaults.
    fn fit_options(&self, method: FitMethod, args: &FitArgs) -> FitOptions {
        if method == FitMethod::Mle && (args.max_iter.is_some() || args.tol.is_some()) {
            warn!("--max-iter and --tol only apply to the mm method; mle uses its own settings");
        }

        let defaults = FitOptions::from(&self.config.fit);
        FitOptions::new(
            args.max_iter.unwrap_or(defaults.max_iterations),
            args.tol.unwrap_or(defaults.tolerance),
        )
    }
}

fn print_summary(summary: &FitSummary) {
    println!("{}", "Item strengths (best to worst):".bold());
    for entry in &summary.ranking {
        let label = match &entry.name {
            Some(name) => format!("{} [{}]", name, entry.item),
            None => format!("item {}", entry.item),
        };
        println!(
            "  {:>3}. {:<30} {}",
            entry.rank,
            label,
            format!("{:.4}", entry.strength).green()
        );
    }

    if let Some(top_k) = &summary.top_k {
        println!("\n{} {:?}", format!("Top {}:", top_k.len()).bold(), top_k);
    }

    let status = if summary.converged {
        "converged".green()
    } else {
        "not converged".yellow()
    };
    println!(
        "\nMethod: {}, iterations: {} ({}), log-likelihood: {:.6}",
        summary.method, summary.iterations, status, summary.log_likelihood
    );
}

fn format_ranking(dataset: &Dataset, ranking: &[ItemId]) -> String {
    ranking
        .iter()
        .map(|&item| match dataset.item_name(item) {
            Some(name) => name.to_string(),
            None => item.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" > ")
}
