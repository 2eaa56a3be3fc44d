//! Run command - decode a SAM file into bit vectors and mutation histograms.
//!
//! Read groups are pulled from the SAM file in chunks; each chunk is split into
//! batches that are decoded in parallel and folded back in input order.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use tracing::{debug, info, warn};

use crate::cli::{print_summary, OutputFormat};
use crate::config::BitVectorConfig;
use crate::core::quality::QualityTable;
use crate::core::read::ReadGroup;
use crate::core::reference::ReferenceSet;
use crate::decode::pipeline::{BitVectorPipeline, PipelineStats};
use crate::histogram::store::HistogramSet;
use crate::output::bit_vector::BitVectorWriter;
use crate::parsing::fasta::load_references;
use crate::parsing::sam::SamReadSource;
use crate::parsing::structure::parse_structure_file;

/// File name of the histogram snapshot written to the output directory
pub const SNAPSHOT_FILE_NAME: &str = "mutation_histos.json";

/// Arguments for the run command
#[derive(Args)]
pub struct RunArgs {
    /// Reference sequences (FASTA, optionally gzip compressed)
    #[arg(long, required = true)]
    pub fasta: PathBuf,

    /// Aligned reads (SAM)
    #[arg(long, required = true)]
    pub sam: PathBuf,

    /// Treat consecutive records with the same query name as mates
    #[arg(long)]
    pub paired: bool,

    /// Directory for bit vector files and the histogram snapshot
    #[arg(short, long, default_value = "output")]
    pub out_dir: PathBuf,

    /// JSON config file; flags below override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// CSV/TSV file with `name` and `structure` columns
    #[arg(long)]
    pub structures: Option<PathBuf>,

    /// Only write the histogram snapshot, not per-read bit vectors
    #[arg(long)]
    pub summary_only: bool,

    /// Number of worker threads (default: all cores)
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    pub threads: Option<u16>,

    // === Config overrides ===
    /// Phred score below which a matched base is ambiguous
    #[arg(long)]
    pub quality_score_cutoff: Option<u8>,

    /// Flank length compared when resolving deletion ambiguity
    #[arg(long)]
    pub ambiguity_window_size: Option<usize>,

    /// Minimum read length as a fraction of reference length
    #[arg(long)]
    pub read_length_fraction_cutoff: Option<f64>,

    /// Minimum mapping quality of every mate
    #[arg(long)]
    pub mapping_quality_cutoff: Option<u8>,

    /// Maximum mutations per read group
    #[arg(long)]
    pub mutation_count_cutoff: Option<usize>,

    /// Chemical probe label stored in the histograms
    #[arg(long)]
    pub data_type: Option<String>,

    /// Read groups per parallel batch
    #[arg(long)]
    pub batch_size: Option<usize>,
}

impl RunArgs {
    /// Config file (or defaults) with command-line overrides applied
    fn resolve_config(&self) -> anyhow::Result<BitVectorConfig> {
        let mut config = match &self.config {
            Some(path) => BitVectorConfig::load_from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => BitVectorConfig::default(),
        };

        if let Some(v) = self.quality_score_cutoff {
            config.quality_score_cutoff = v;
        }
        if let Some(v) = self.ambiguity_window_size {
            config.ambiguity_window_size = v;
        }
        if let Some(v) = self.read_length_fraction_cutoff {
            config.read_length_fraction_cutoff = v;
        }
        if let Some(v) = self.mapping_quality_cutoff {
            config.mapping_quality_cutoff = v;
        }
        if let Some(v) = self.mutation_count_cutoff {
            config.mutation_count_cutoff = v;
        }
        if let Some(v) = &self.data_type {
            config.data_type.clone_from(v);
        }
        if let Some(v) = self.batch_size {
            config.batch_size = v;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Execute the run command
///
/// # Errors
///
/// Returns an error if an input cannot be read, a read cannot be placed on its
/// reference, or an output cannot be written.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: RunArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = args.resolve_config()?;
    debug!(?config, "Resolved configuration");

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(usize::from(threads))
            .build_global()
            .context("Failed to configure worker threads")?;
    }

    let references = load_references(&args.fasta)
        .with_context(|| format!("Failed to load references from {}", args.fasta.display()))?;
    info!(references = references.len(), "Loaded references");

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create {}", args.out_dir.display()))?;

    let mut writer = if args.summary_only {
        None
    } else {
        Some(BitVectorWriter::new(&args.out_dir, config.data_type.as_str())?)
    };

    let qualities = QualityTable::phred33();
    let pipeline = BitVectorPipeline::new(&references, &qualities, &config);
    let mut histograms = HistogramSet::for_references(&references, &config.data_type);

    let mut source = SamReadSource::from_path(&args.sam, args.paired)
        .with_context(|| format!("Failed to open {}", args.sam.display()))?;

    let chunk_len = config.batch_size.saturating_mul(rayon::current_num_threads());
    info!(
        sam = %args.sam.display(),
        paired = args.paired,
        threads = rayon::current_num_threads(),
        "Decoding reads"
    );
    let mut stats = PipelineStats::default();
    let mut chunk: Vec<ReadGroup> = Vec::new();

    for group in source.by_ref() {
        chunk.push(group.with_context(|| format!("Failed to read {}", args.sam.display()))?);
        if chunk.len() >= chunk_len {
            process_chunk(
                &pipeline,
                &chunk,
                &config,
                &references,
                &mut histograms,
                &mut stats,
                writer.as_mut(),
            )?;
            chunk.clear();
        }
    }
    if !chunk.is_empty() {
        process_chunk(
            &pipeline,
            &chunk,
            &config,
            &references,
            &mut histograms,
            &mut stats,
            writer.as_mut(),
        )?;
    }

    info!(
        read_groups = stats.read_groups,
        accepted = stats.accepted,
        skipped = stats.skipped,
        filtered_records = source.skipped(),
        "Finished decoding"
    );
    if stats.unclassifiable > 0 {
        warn!(
            mates = stats.unclassifiable,
            "Mates with unsupported CIGAR operations were recorded as uncovered"
        );
    }

    if let Some(path) = &args.structures {
        let structures = parse_structure_file(path)
            .with_context(|| format!("Failed to read structures from {}", path.display()))?;
        let attached = histograms.attach_structures(&structures);
        debug!(attached, "Attached structure annotations");
    }

    let snapshot = snapshot_path(&args.out_dir);
    histograms
        .save(&snapshot)
        .with_context(|| format!("Failed to write {}", snapshot.display()))?;

    if let Some(writer) = writer {
        let paths = writer.finish()?;
        if verbose {
            for path in &paths {
                eprintln!("Wrote {}", path.display());
            }
        }
    }
    if verbose {
        eprintln!("Wrote {}", snapshot.display());
    }

    print_summary(&histograms, format, false)
}

/// Decode one chunk of read groups and fold the results into the run totals
fn process_chunk(
    pipeline: &BitVectorPipeline<'_>,
    chunk: &[ReadGroup],
    config: &BitVectorConfig,
    references: &ReferenceSet,
    histograms: &mut HistogramSet,
    stats: &mut PipelineStats,
    writer: Option<&mut BitVectorWriter>,
) -> anyhow::Result<()> {
    let output = pipeline.run_batches(chunk, config.batch_size, writer.is_some())?;
    histograms.merge(output.histograms)?;
    stats.merge(&output.stats);

    if let Some(writer) = writer {
        for accepted in &output.accepted {
            let reference = references
                .get(&accepted.reference_name)
                .with_context(|| format!("Unknown reference {}", accepted.reference_name))?;
            writer.write(&accepted.query_name, reference, &accepted.bit_vector)?;
        }
    }

    debug!(read_groups = stats.read_groups, "Processed chunk");
    Ok(())
}

/// Path of the snapshot a run writes into `out_dir`
#[must_use]
pub fn snapshot_path(out_dir: &Path) -> PathBuf {
    out_dir.join(SNAPSHOT_FILE_NAME)
}
