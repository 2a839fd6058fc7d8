#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::uninlined_format_args, clippy::module_name_repetitions)]

mod analysis;
mod csv_reader;
mod structs;

use analysis::pipeline::{run_analysis, AnalysisConfig};
use clap::Parser;
use std::path::PathBuf;
use structs::{GrowthError, Result, DEFAULT_ALPHA, DEFAULT_TAXON_PREFIX};

/// Identify gut bacterial taxa correlated with infant growth z-scores
#[derive(Parser, Debug)]
#[command(name = "growth-taxa")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input CSV/TSV file with growth z-scores and taxon abundances
    #[arg(short, long, default_value = "data/infant_growth_metagenomics.csv")]
    input: PathBuf,

    /// Output directory for result tables and plot
    #[arg(short, long, default_value = "results")]
    output_dir: PathBuf,

    /// Column name prefix identifying taxon abundance columns
    #[arg(long, default_value = DEFAULT_TAXON_PREFIX)]
    taxon_prefix: String,

    /// FDR level and significance threshold for adjusted p-values
    #[arg(long, default_value_t = DEFAULT_ALPHA)]
    alpha: f64,

    /// Treat input as TSV instead of CSV
    #[arg(long)]
    tsv: bool,

    /// Fail if no column matches the taxon prefix
    #[arg(long)]
    require_taxa: bool,

    /// Skip rendering the weight correlation plot
    #[arg(long)]
    no_plot: bool,

    /// Also write run_summary.json with descriptive statistics
    #[arg(long)]
    summary_json: bool,
}

impl From<Args> for AnalysisConfig {
    fn from(args: Args) -> Self {
        Self {
            input: args.input,
            output_dir: args.output_dir,
            tsv: args.tsv,
            taxon_prefix: args.taxon_prefix,
            alpha: args.alpha,
            require_taxa: args.require_taxa,
            plot: !args.no_plot,
            summary_json: args.summary_json,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    if let Err(e) = run() {
        eprintln!("{}", fatal_message(&e));
        std::process::exit(1);
    }
}

fn fatal_message(err: &GrowthError) -> String {
    format!("Error: {err}")
}

fn run() -> Result<()> {
    let config = AnalysisConfig::from(Args::parse());

    log::info!("=== Infant Growth-Associated Bacteria Analysis ===");
    let (result, outcome) = run_analysis(&config)?;

    if outcome.plot.is_none() && result.significant_weight.is_empty() {
        log::info!("No taxa significant for weight; plot skipped.");
    }
    if outcome.is_success() {
        return Ok(());
    }

    let mut failures = outcome.failures;
    match failures.len() {
        1 => Err(failures.remove(0)),
        n => Err(GrowthError::OutputWrite {
            path: config.output_dir,
            message: format!("{n} artifacts could not be written"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_message_names_the_input() {
        let err = GrowthError::DataAccess {
            path: PathBuf::from("data/missing.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };

        let message = fatal_message(&err);

        assert!(message.starts_with("Error: "));
        assert!(message.contains("data/missing.csv"));
    }
}
