//! Command-line tests for the `dms-bitvector` binary.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

const FASTA: &str = ">ref\nACGTACGTAC\n";

const SAM: &str = "@HD\tVN:1.6\tSO:unsorted\n@SQ\tSN:ref\tLN:10\n\
                   r1\t0\tref\t1\t40\t10M\t*\t0\t0\tACGTACGTAC\tIIIIIIIIII\n\
                   r2\t0\tref\t1\t40\t10M\t*\t0\t0\tACGTTCGTAC\tIIIIIIIIII\n\
                   r3\t0\tref\t1\t5\t10M\t*\t0\t0\tACGTACGTAC\tIIIIIIIIII\n";

fn write_inputs(dir: &Path) -> (PathBuf, PathBuf) {
    let fasta = dir.join("ref.fasta");
    let sam = dir.join("aligned.sam");
    std::fs::write(&fasta, FASTA).unwrap();
    std::fs::write(&sam, SAM).unwrap();
    (fasta, sam)
}

fn bin() -> Command {
    Command::cargo_bin("dms-bitvector").unwrap()
}

fn run_into(dir: &Path, out_dir: &Path) {
    let (fasta, sam) = write_inputs(dir);
    bin()
        .arg("run")
        .arg("--fasta")
        .arg(&fasta)
        .arg("--sam")
        .arg(&sam)
        .arg("--out-dir")
        .arg(out_dir)
        .assert()
        .success();
}

#[test]
fn test_help() {
    bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("merge"))
        .stdout(predicate::str::contains("summary"));
}

#[test]
fn test_run_writes_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("out");
    run_into(dir.path(), &out_dir);

    assert!(out_dir.join("mutation_histos.json").exists());

    let bit_vectors = std::fs::read_to_string(out_dir.join("ref_bitvectors.txt")).unwrap();
    let lines: Vec<&str> = bit_vectors.lines().collect();
    assert_eq!(lines[0], "@ref\tref\tACGTACGTAC\tDMS");
    assert_eq!(lines[3], "r1\t0000000000\t0");
    assert_eq!(lines[4], "r2\t0000T00000\t1");
    // r3 fails the mapping quality gate
    assert_eq!(lines.len(), 5);
}

#[test]
fn test_run_json_summary() {
    let dir = tempfile::tempdir().unwrap();
    let (fasta, sam) = write_inputs(dir.path());

    let output = bin()
        .args(["--format", "json", "run", "--summary-only"])
        .arg("--fasta")
        .arg(&fasta)
        .arg("--sam")
        .arg(&sam)
        .arg("--out-dir")
        .arg(dir.path().join("out"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value[0]["name"], "ref");
    assert_eq!(value[0]["reads"], 3);
    assert!(!dir.path().join("out").join("ref_bitvectors.txt").exists());
}

#[test]
fn test_run_config_override() {
    let dir = tempfile::tempdir().unwrap();
    let (fasta, sam) = write_inputs(dir.path());
    let out_dir = dir.path().join("out");

    bin()
        .args(["run", "--mapping-quality-cutoff", "0"])
        .arg("--fasta")
        .arg(&fasta)
        .arg("--sam")
        .arg(&sam)
        .arg("--out-dir")
        .arg(&out_dir)
        .assert()
        .success();

    let bit_vectors = std::fs::read_to_string(out_dir.join("ref_bitvectors.txt")).unwrap();
    assert!(bit_vectors.contains("r3\t"));
}

#[test]
fn test_run_invalid_override() {
    let dir = tempfile::tempdir().unwrap();
    let (fasta, sam) = write_inputs(dir.path());

    bin()
        .args(["run", "--read-length-fraction-cutoff", "2"])
        .arg("--fasta")
        .arg(&fasta)
        .arg("--sam")
        .arg(&sam)
        .arg("--out-dir")
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("read_length_fraction_cutoff"));
}

#[test]
fn test_run_missing_fasta() {
    let dir = tempfile::tempdir().unwrap();
    let (_, sam) = write_inputs(dir.path());

    bin()
        .arg("run")
        .arg("--fasta")
        .arg(dir.path().join("missing.fasta"))
        .arg("--sam")
        .arg(&sam)
        .arg("--out-dir")
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load references"));
}

#[test]
fn test_run_unknown_reference() {
    let dir = tempfile::tempdir().unwrap();
    let (fasta, _) = write_inputs(dir.path());
    let sam = dir.path().join("other.sam");
    std::fs::write(
        &sam,
        "@HD\tVN:1.6\n@SQ\tSN:other\tLN:4\n\
         r1\t0\tother\t1\t40\t4M\t*\t0\t0\tACGT\tIIII\n",
    )
    .unwrap();

    bin()
        .arg("run")
        .arg("--fasta")
        .arg(&fasta)
        .arg("--sam")
        .arg(&sam)
        .arg("--out-dir")
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not in the reference FASTA"));
}

#[test]
fn test_merge_and_summary() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first");
    let second = dir.path().join("second");
    run_into(dir.path(), &first);
    run_into(dir.path(), &second);

    let merged = dir.path().join("merged.json");
    bin()
        .arg("merge")
        .arg(&merged)
        .arg(first.join("mutation_histos.json"))
        .arg(second.join("mutation_histos.json"))
        .assert()
        .success();
    assert!(merged.exists());

    bin()
        .args(["--format", "tsv", "summary"])
        .arg(&merged)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("name\treads\t"))
        .stdout(predicate::str::contains("ref\t6\t66.67\t"));
}

#[test]
fn test_summary_quality_control() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("out");
    run_into(dir.path(), &out_dir);

    bin()
        .arg("summary")
        .arg(out_dir.join("mutation_histos.json"))
        .arg("--quality-control")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "ref has 3 reads mapping to it. This is: BAD.",
        ))
        .stdout(predicate::str::contains("Distribution of coverage:"));
}

#[test]
fn test_merge_mismatched_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("out");
    run_into(dir.path(), &out_dir);

    let other = dir.path().join("other");
    std::fs::create_dir_all(&other).unwrap();
    std::fs::write(other.join("ref.fasta"), ">ref\nGGGGGGGGGG\n").unwrap();
    std::fs::write(
        other.join("aligned.sam"),
        "@HD\tVN:1.6\n@SQ\tSN:ref\tLN:10\n",
    )
    .unwrap();
    bin()
        .arg("run")
        .arg("--fasta")
        .arg(other.join("ref.fasta"))
        .arg("--sam")
        .arg(other.join("aligned.sam"))
        .arg("--out-dir")
        .arg(&other)
        .assert()
        .success();

    bin()
        .arg("merge")
        .arg(dir.path().join("merged.json"))
        .arg(out_dir.join("mutation_histos.json"))
        .arg(other.join("mutation_histos.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Snapshots cannot be merged"));
}

#[test]
fn test_summary_missing_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    bin()
        .arg("summary")
        .arg(dir.path().join("missing.json"))
        .assert()
        .failure();
}
