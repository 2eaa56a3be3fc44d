use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::core::bit_vector::BitVector;
use crate::core::reference::ReferenceSequence;
use crate::utils::validation::sanitize_file_stem;

/// Suffix of per-reference bit vector files
pub const BIT_VECTOR_FILE_SUFFIX: &str = "_bitvectors.txt";

/// Path of the bit vector file for `reference_name` inside `out_dir`
#[must_use]
pub fn bit_vector_path(out_dir: &Path, reference_name: &str) -> PathBuf {
    out_dir.join(format!(
        "{}{BIT_VECTOR_FILE_SUFFIX}",
        sanitize_file_stem(reference_name)
    ))
}

struct OpenFile {
    path: PathBuf,
    out: BufWriter<File>,
}

/// Writes accepted bit vectors to one text file per reference.
///
/// Files are created on the first vector for a reference and start with
///
/// ```text
/// @ref	<name>	<sequence>	<data_type>
/// @coordinates:	0,<len>:<len>
/// Query_name	Bit_vector	N_Mutations
/// ```
///
/// Names that sanitize to the same file stem get a numeric suffix (`a_b_2_bitvectors.txt`)
/// so no reference overwrites another's file.
pub struct BitVectorWriter {
    out_dir: PathBuf,
    data_type: String,
    files: HashMap<String, OpenFile>,
    taken: HashSet<PathBuf>,
}

impl BitVectorWriter {
    /// # Errors
    ///
    /// Returns an error if `out_dir` cannot be created.
    pub fn new(out_dir: &Path, data_type: impl Into<String>) -> io::Result<Self> {
        std::fs::create_dir_all(out_dir)?;
        Ok(Self {
            out_dir: out_dir.to_path_buf(),
            data_type: data_type.into(),
            files: HashMap::new(),
            taken: HashSet::new(),
        })
    }

    /// Append one row. Uncovered positions render as `.`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn write(
        &mut self,
        query_name: &str,
        reference: &ReferenceSequence,
        bit_vector: &BitVector,
    ) -> io::Result<()> {
        let len = reference.len();
        let out = self.file_for(reference)?;
        writeln!(
            out,
            "{query_name}\t{}\t{}",
            bit_vector.to_bit_string(1, len),
            bit_vector.mutation_count(1, len)
        )
    }

    /// Flush every file and return their paths, sorted
    ///
    /// # Errors
    ///
    /// Returns the first flush error.
    pub fn finish(self) -> io::Result<Vec<PathBuf>> {
        let mut paths = Vec::with_capacity(self.files.len());
        for (_, mut file) in self.files {
            file.out.flush()?;
            paths.push(file.path);
        }
        paths.sort();
        Ok(paths)
    }

    fn file_for(&mut self, reference: &ReferenceSequence) -> io::Result<&mut BufWriter<File>> {
        match self.files.entry(reference.name.clone()) {
            Entry::Occupied(entry) => Ok(&mut entry.into_mut().out),
            Entry::Vacant(entry) => {
                let path = unique_path(&self.out_dir, &reference.name, &self.taken);
                let mut out = BufWriter::new(File::create(&path)?);
                writeln!(out, "@ref\t{}\t{}\t{}", reference.name, reference, self.data_type)?;
                writeln!(out, "@coordinates:\t0,{len}:{len}", len = reference.len())?;
                writeln!(out, "Query_name\tBit_vector\tN_Mutations")?;
                self.taken.insert(path.clone());
                Ok(&mut entry.insert(OpenFile { path, out }).out)
            }
        }
    }
}

/// First path for `reference_name` not already used by another reference
fn unique_path(out_dir: &Path, reference_name: &str, taken: &HashSet<PathBuf>) -> PathBuf {
    let path = bit_vector_path(out_dir, reference_name);
    if !taken.contains(&path) {
        return path;
    }

    let stem = sanitize_file_stem(reference_name);
    let unique = (2usize..)
        .map(|n| out_dir.join(format!("{stem}_{n}{BIT_VECTOR_FILE_SUFFIX}")))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or(path);
    warn!(
        reference = %reference_name,
        path = %unique.display(),
        "Bit vector file name already used by another reference"
    );
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Base, Symbol};

    #[test]
    fn test_write_bit_vectors() {
        let dir = tempfile::tempdir().unwrap();
        let reference = ReferenceSequence::from_ascii("ref", b"ACGTACGT").unwrap();
        let mut writer = BitVectorWriter::new(dir.path(), "DMS").unwrap();

        let full = BitVector::from_symbols(8, (1..=8).map(|pos| (pos, Symbol::NoMutation)));
        writer.write("read1", &reference, &full).unwrap();

        let partial = BitVector::from_symbols(
            8,
            [
                (2, Symbol::Mutated(Base::T)),
                (3, Symbol::Deletion),
                (4, Symbol::Ambiguous),
                (5, Symbol::Missing),
            ],
        );
        writer.write("read2", &reference, &partial).unwrap();

        let paths = writer.finish().unwrap();
        assert_eq!(paths, vec![dir.path().join("ref_bitvectors.txt")]);

        let content = std::fs::read_to_string(&paths[0]).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "@ref\tref\tACGTACGT\tDMS");
        assert_eq!(lines[1], "@coordinates:\t0,8:8");
        assert_eq!(lines[2], "Query_name\tBit_vector\tN_Mutations");
        assert_eq!(lines[3], "read1\t00000000\t0");
        assert_eq!(lines[4], "read2\t.T1?*...\t1");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_one_file_per_reference() {
        let dir = tempfile::tempdir().unwrap();
        let a = ReferenceSequence::from_ascii("a", b"ACGT").unwrap();
        let b = ReferenceSequence::from_ascii("b/c", b"GG").unwrap();
        let mut writer = BitVectorWriter::new(dir.path(), "DMS").unwrap();
        writer.write("r1", &a, &BitVector::new(4)).unwrap();
        writer.write("r2", &b, &BitVector::new(2)).unwrap();
        writer.write("r3", &a, &BitVector::new(4)).unwrap();

        let paths = writer.finish().unwrap();
        assert_eq!(paths.len(), 2);
        assert!(dir.path().join("b_c_bitvectors.txt").exists());

        let content = std::fs::read_to_string(dir.path().join("a_bitvectors.txt")).unwrap();
        assert_eq!(content.lines().count(), 5);
        assert!(content.ends_with("r3\t....\t0\n"));
    }

    #[test]
    fn test_colliding_file_names_get_distinct_files() {
        let dir = tempfile::tempdir().unwrap();
        let slash = ReferenceSequence::from_ascii("a/b", b"ACGT").unwrap();
        let underscore = ReferenceSequence::from_ascii("a_b", b"GGCC").unwrap();
        let mut writer = BitVectorWriter::new(dir.path(), "DMS").unwrap();
        writer.write("r1", &slash, &BitVector::new(4)).unwrap();
        writer.write("r2", &underscore, &BitVector::new(4)).unwrap();
        writer.write("r3", &slash, &BitVector::new(4)).unwrap();

        let paths = writer.finish().unwrap();
        assert_eq!(
            paths,
            vec![
                dir.path().join("a_b_2_bitvectors.txt"),
                dir.path().join("a_b_bitvectors.txt"),
            ]
        );

        let first = std::fs::read_to_string(dir.path().join("a_b_bitvectors.txt")).unwrap();
        assert!(first.starts_with("@ref\ta/b\tACGT\tDMS\n"));
        assert!(first.contains("r1\t....\t0\n"));
        assert!(first.ends_with("r3\t....\t0\n"));
        assert!(!first.contains("r2"));

        let second = std::fs::read_to_string(dir.path().join("a_b_2_bitvectors.txt")).unwrap();
        assert!(second.starts_with("@ref\ta_b\tGGCC\tDMS\n"));
        assert_eq!(second.lines().count(), 4);
    }
}
