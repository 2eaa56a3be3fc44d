//! Command-line interface for dms-bitvector.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **run**: Convert aligned reads into bit vectors and mutation histograms
//! - **merge**: Merge histogram snapshots from several runs
//! - **summary**: Summarize a histogram snapshot, optionally with quality control
//!
//! ## Usage
//!
//! ```text
//! # Paired-end run with default thresholds
//! dms-bitvector run --fasta ref.fasta --sam aligned.sam --paired --out-dir output
//!
//! # Histograms only, stricter quality cutoff, JSON summary
//! dms-bitvector run --fasta ref.fasta --sam aligned.sam --summary-only \
//!     --quality-score-cutoff 30 --format json
//!
//! # Combine shards processed separately
//! dms-bitvector merge merged.json shard1/mutation_histos.json shard2/mutation_histos.json
//!
//! # Quality control report
//! dms-bitvector summary output/mutation_histos.json --quality-control
//! ```

use clap::{Parser, Subcommand};

use crate::histogram::quality_control::QualityReport;
use crate::histogram::store::HistogramSet;
use crate::output::summary;

pub mod merge;
pub mod run;
pub mod summary_cmd;

#[derive(Parser)]
#[command(name = "dms-bitvector")]
#[command(version)]
#[command(about = "Convert DMS-MaPseq alignments into per-read bit vectors and mutation histograms")]
#[command(
    long_about = "dms-bitvector classifies every reference position covered by an aligned read as matching, mutated, deleted, ambiguous or missing.\n\nAccepted reads are written as bit vectors and aggregated into per-reference mutation histograms that can be merged across runs and summarized with quality-control grades."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate bit vectors and mutation histograms from a SAM file
    Run(run::RunArgs),

    /// Merge histogram snapshots
    Merge(merge::MergeArgs),

    /// Summarize a histogram snapshot
    Summary(summary_cmd::SummaryArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Print the per-reference summary table, with quality-control reports if requested
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn print_summary(
    histograms: &HistogramSet,
    format: OutputFormat,
    quality_control: bool,
) -> anyhow::Result<()> {
    let rows = summary::summarize(histograms);
    match format {
        OutputFormat::Text => {
            print!("{}", summary::render_text(&rows));
            if quality_control {
                println!();
                print!("{}", summary::render_quality_text(histograms));
            }
        }
        OutputFormat::Json => {
            if quality_control {
                let reports: Vec<QualityReport> =
                    histograms.iter().map(QualityReport::assess).collect();
                let output = serde_json::json!({
                    "summary": rows,
                    "quality_control": reports,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{}", summary::render_json(&rows)?);
            }
        }
        OutputFormat::Tsv => {
            print!("{}", summary::render_tsv(&rows));
            if quality_control {
                println!();
                print!("{}", summary::render_quality_tsv(histograms));
            }
        }
    }
    Ok(())
}
