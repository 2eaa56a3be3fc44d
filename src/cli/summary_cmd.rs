//! Summary command - report mutation rates and quality grades of a snapshot.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::{print_summary, OutputFormat};
use crate::histogram::store::HistogramSet;

/// Arguments for the summary command
#[derive(Args)]
pub struct SummaryArgs {
    /// Histogram snapshot written by `run` or `merge`
    #[arg(required = true)]
    pub snapshot: PathBuf,

    /// Also grade read depth, signal-to-noise and coverage
    #[arg(short, long)]
    pub quality_control: bool,
}

/// Execute the summary command
///
/// # Errors
///
/// Returns an error if the snapshot cannot be read.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: SummaryArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let histograms = HistogramSet::load_from_file(&args.snapshot)
        .with_context(|| format!("Failed to load snapshot {}", args.snapshot.display()))?;

    if verbose {
        eprintln!(
            "Loaded {} histograms from {}",
            histograms.len(),
            args.snapshot.display()
        );
    }

    print_summary(&histograms, format, args.quality_control)
}
