//! Merge command - combine histogram snapshots from separate runs.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::cli::{print_summary, OutputFormat};
use crate::histogram::store::HistogramSet;

/// Arguments for the merge command
#[derive(Args)]
pub struct MergeArgs {
    /// Snapshot file to write
    #[arg(required = true)]
    pub output: PathBuf,

    /// Snapshot files to merge
    #[arg(required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,
}

/// Execute the merge command
///
/// # Errors
///
/// Returns an error if a snapshot cannot be read, two snapshots disagree on a
/// reference's identity, or the output cannot be written.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: MergeArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let sets = args
        .inputs
        .iter()
        .map(|path| {
            HistogramSet::load_from_file(path)
                .with_context(|| format!("Failed to load snapshot {}", path.display()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let merged = HistogramSet::merge_all(sets).context("Snapshots cannot be merged")?;
    info!(
        snapshots = args.inputs.len(),
        references = merged.len(),
        "Merged snapshots"
    );

    merged
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    if verbose {
        eprintln!("Wrote {}", args.output.display());
    }

    print_summary(&merged, format, false)
}
