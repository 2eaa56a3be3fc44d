//! End-to-end tests of the library: FASTA and SAM files on disk through the
//! read source, the batch pipeline and histogram snapshots.

use std::path::{Path, PathBuf};

use dms_bitvector::parsing::fasta::load_references;
use dms_bitvector::parsing::sam::SamReadSource;
use dms_bitvector::{
    Base, BitVectorConfig, BitVectorPipeline, HistogramSet, QualityTable, ReadGroup,
    ReferenceSet, Symbol,
};

const FASTA: &str = ">ref\nACGTACGTAC\n>short\nGGAACC\n";

const SAM_HEADER: &str = "@HD\tVN:1.6\tSO:unsorted\n@SQ\tSN:ref\tLN:10\n@SQ\tSN:short\tLN:6\n";

const SINGLE_END: &str = "r1\t0\tref\t1\t40\t10M\t*\t0\t0\tACGTACGTAC\tIIIIIIIIII\n\
                          r2\t0\tref\t1\t40\t10M\t*\t0\t0\tACGTTCGTAC\tIIIIIIIIII\n\
                          r3\t0\tref\t1\t5\t10M\t*\t0\t0\tACGTACGTAC\tIIIIIIIIII\n\
                          r4\t4\t*\t0\t0\t*\t*\t0\t0\tACGT\tIIII\n\
                          r5\t0\tshort\t1\t40\t6M\t*\t0\t0\tGGATCC\tIIIIII\n";

const PAIRED_END: &str = "p1\t99\tref\t1\t40\t6M\t=\t5\t10\tACGTAC\tIIIIII\n\
                          p1\t147\tref\t5\t40\t6M\t=\t1\t-10\tACGTAC\tIIIIII\n\
                          p2\t99\tref\t1\t40\t4M\t=\t7\t10\tACGG\tIIII\n\
                          p2\t147\tref\t7\t40\t4M\t=\t1\t-10\tGTAC\tIIII\n";

fn write_inputs(dir: &Path, records: &str) -> (PathBuf, PathBuf) {
    let fasta = dir.join("ref.fasta");
    let sam = dir.join("aligned.sam");
    std::fs::write(&fasta, FASTA).unwrap();
    std::fs::write(&sam, format!("{SAM_HEADER}{records}")).unwrap();
    (fasta, sam)
}

fn read_groups(sam: &Path, paired: bool) -> Vec<ReadGroup> {
    SamReadSource::from_path(sam, paired)
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

fn references(fasta: &Path) -> ReferenceSet {
    load_references(fasta).unwrap()
}

#[test]
fn test_single_end_run() {
    let dir = tempfile::tempdir().unwrap();
    let (fasta, sam) = write_inputs(dir.path(), SINGLE_END);

    let references = references(&fasta);
    let config = BitVectorConfig::default();
    let qualities = QualityTable::phred33();
    let pipeline = BitVectorPipeline::new(&references, &qualities, &config);

    let groups = read_groups(&sam, false);
    assert_eq!(groups.len(), 4);

    let mut histograms = HistogramSet::for_references(&references, &config.data_type);
    let stats = pipeline.run(&groups, &mut histograms).unwrap();
    assert_eq!(stats.read_groups, 4);
    assert_eq!(stats.accepted, 3);
    assert_eq!(stats.skipped, 1);

    let mh = histograms.get("ref").unwrap();
    assert_eq!(mh.num_reads, 3);
    assert_eq!(mh.num_aligned, 2);
    assert_eq!(mh.skip_counts.low_mapping_quality, 1);
    assert_eq!(mh.coverage_count[1..=10], [2; 10]);
    assert_eq!(mh.mutation_count[5], 1);
    assert_eq!(mh.mutation_count.iter().sum::<u64>(), 1);
    assert_eq!(mh.mutation_count_distribution[0], 1);
    assert_eq!(mh.mutation_count_distribution[1], 1);

    let short = histograms.get("short").unwrap();
    assert_eq!(short.num_aligned, 1);
    assert_eq!(short.mutation_count[4], 1);
    assert_eq!(short.per_base_mutation_count.get(Base::T)[4], 1);
}

#[test]
fn test_paired_end_run() {
    let dir = tempfile::tempdir().unwrap();
    let (fasta, sam) = write_inputs(dir.path(), PAIRED_END);

    let references = references(&fasta);
    let config = BitVectorConfig::default();
    let qualities = QualityTable::phred33();
    let pipeline = BitVectorPipeline::new(&references, &qualities, &config);

    let groups = read_groups(&sam, true);
    assert_eq!(groups.len(), 2);
    assert!(groups.iter().all(ReadGroup::is_paired));

    let mut histograms = HistogramSet::new();
    let stats = pipeline.run(&groups, &mut histograms).unwrap();
    assert_eq!(stats.accepted, 2);

    let mh = histograms.get("ref").unwrap();
    assert_eq!(mh.num_reads, 2);
    // p1 covers 1-10 through overlapping mates, p2 leaves 5 and 6 uncovered
    assert_eq!(mh.coverage_count[1..=10], [2, 2, 2, 2, 1, 1, 2, 2, 2, 2]);
    assert_eq!(mh.mutation_count[4], 1);
}

#[test]
fn test_paired_mutation_survives_merge() {
    let dir = tempfile::tempdir().unwrap();
    let (fasta, sam) = write_inputs(dir.path(), PAIRED_END);

    let references = references(&fasta);
    let config = BitVectorConfig::default();
    let qualities = QualityTable::phred33();
    let pipeline = BitVectorPipeline::new(&references, &qualities, &config);

    let output = pipeline
        .run_batches(&read_groups(&sam, true), 1, true)
        .unwrap();
    assert_eq!(output.accepted.len(), 2);

    let p2 = &output.accepted[1];
    assert_eq!(p2.query_name, "p2");
    assert_eq!(p2.bit_vector.get(4), Some(Symbol::Mutated(Base::G)));
    assert_eq!(p2.bit_vector.get(5), None);
}

#[test]
fn test_snapshot_round_trip_and_merge() {
    let dir = tempfile::tempdir().unwrap();
    let (fasta, sam) = write_inputs(dir.path(), SINGLE_END);

    let references = references(&fasta);
    let config = BitVectorConfig::default();
    let qualities = QualityTable::phred33();
    let pipeline = BitVectorPipeline::new(&references, &qualities, &config);
    let groups = read_groups(&sam, false);

    let mut whole = HistogramSet::new();
    pipeline.run(&groups, &mut whole).unwrap();

    // Process two halves separately, snapshot both and merge the loaded copies
    let (first, second) = groups.split_at(2);
    let mut left = HistogramSet::new();
    pipeline.run(first, &mut left).unwrap();
    let mut right = HistogramSet::new();
    pipeline.run(second, &mut right).unwrap();

    let left_path = dir.path().join("left.json");
    let right_path = dir.path().join("right.json");
    left.save(&left_path).unwrap();
    right.save(&right_path).unwrap();

    let merged = HistogramSet::merge_all([
        HistogramSet::load_from_file(&left_path).unwrap(),
        HistogramSet::load_from_file(&right_path).unwrap(),
    ])
    .unwrap();
    assert_eq!(merged, whole);
}

#[test]
fn test_read_on_unknown_reference_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let fasta = dir.path().join("ref.fasta");
    let sam = dir.path().join("aligned.sam");
    std::fs::write(&fasta, FASTA).unwrap();
    std::fs::write(
        &sam,
        "@HD\tVN:1.6\n@SQ\tSN:other\tLN:4\n\
         r1\t0\tother\t1\t40\t4M\t*\t0\t0\tACGT\tIIII\n",
    )
    .unwrap();

    let references = references(&fasta);
    let config = BitVectorConfig::default();
    let qualities = QualityTable::phred33();
    let pipeline = BitVectorPipeline::new(&references, &qualities, &config);

    let result = pipeline.run_batches(&read_groups(&sam, false), 10, false);
    assert!(result.is_err());
}
