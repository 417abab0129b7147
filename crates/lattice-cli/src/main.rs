mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::price::{ConvergenceArgs, PriceArgs};

/// European option pricing on CRR binomial lattices
#[derive(Parser)]
#[command(
    name = "crr",
    version,
    about = "European option pricing on Cox-Ross-Rubinstein binomial lattices",
    long_about = "Prices European calls and puts on a recombining binomial lattice \
                  with decimal precision. Inputs come from flags, a JSON file, or \
                  piped stdin; output as JSON, a table, CSV, or the bare price."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Price a European option
    Price(PriceArgs),
    /// Price the same contract at increasing step counts
    Convergence(ConvergenceArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Price(args) => commands::price::run_price(args),
        Commands::Convergence(args) => commands::price::run_convergence(args),
        Commands::Version => {
            println!("crr {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
