use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(name = "plackett-luce", author, version, about = "Plackett-Luce strength estimation from rankings")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct FitArgs {
    /// JSON dataset with `rankings` and optional `items` / `n_items`
    #[arg(short, long)]
    pub input: PathBuf,

    /// Fitting method: mm or mle
    #[arg(short, long, default_value = "mm")]
    pub method: String,

    /// Maximum number of MM iterations (defaults to the configured value)
    #[arg(long)]
    pub max_iter: Option<usize>,

    /// MM tolerance on the largest per-item change (defaults to the configured value)
    #[arg(long)]
    pub tol: Option<f64>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Fit strengths and print the resulting ranking
    Fit {
        #[command(flatten)]
        fit: FitArgs,

        /// Also report the K strongest items
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Fit strengths, then print the probability of one ranking
    Probability {
        #[command(flatten)]
        fit: FitArgs,

        /// Comma separated item ids, most preferred first
        #[arg(short, long, value_delimiter = ',', required = true)]
        ranking: Vec<usize>,
    },
    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fit_defaults() {
        let cli = Cli::try_parse_from(["plackett-luce", "fit", "--input", "data.json"]).unwrap();

        let Command::Fit { fit, top_k, json } = cli.command else {
            panic!("expected fit command");
        };
        assert_eq!(fit.input, PathBuf::from("data.json"));
        assert_eq!(fit.method, "mm");
        assert_eq!(fit.max_iter, None);
        assert_eq!(fit.tol, None);
        assert_eq!(top_k, None);
        assert!(!json);
    }

    #[test]
    fn test_parse_probability_ranking() {
        let cli = Cli::try_parse_from([
            "plackett-luce",
            "probability",
            "-i",
            "data.json",
            "--method",
            "mle",
            "--ranking",
            "2,0,1",
        ])
        .unwrap();

        let Command::Probability { fit, ranking } = cli.command else {
            panic!("expected probability command");
        };
        assert_eq!(fit.method, "mle");
        assert_eq!(ranking, vec![2, 0, 1]);
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
