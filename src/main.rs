use anyhow::Result;

use plackett_luce::cli::Command;
use plackett_luce::{handle_completions, handle_fit, handle_probability, interpret};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Fit { fit, top_k, json } => handle_fit(fit, *top_k, *json),
        Command::Probability { fit, ranking } => handle_probability(fit, ranking),
        Command::Completions { shell } => handle_completions(*shell),
    }
}
