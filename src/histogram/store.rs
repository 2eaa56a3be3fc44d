use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, warn};

use crate::core::reference::{ReferenceSequence, ReferenceSet};
use crate::histogram::histogram::MutationHistogram;
use crate::histogram::HistogramError;

/// Snapshot version for compatibility checking
pub const SNAPSHOT_VERSION: &str = "1.0.0";

/// Serializable snapshot format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotData {
    pub version: String,
    pub created_at: String,
    pub histograms: Vec<MutationHistogram>,
}

/// Mutation histograms keyed by reference name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistogramSet {
    histograms: BTreeMap<String, MutationHistogram>,
}

impl HistogramSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// One whole-reference histogram per reference
    #[must_use]
    pub fn for_references(references: &ReferenceSet, data_type: &str) -> Self {
        references
            .iter()
            .map(|reference| MutationHistogram::for_reference(reference, data_type))
            .collect()
    }

    /// Histogram for `reference`, created on first use
    pub fn entry(&mut self, reference: &ReferenceSequence, data_type: &str) -> &mut MutationHistogram {
        self.histograms
            .entry(reference.name.clone())
            .or_insert_with(|| MutationHistogram::for_reference(reference, data_type))
    }

    /// Add a histogram, replacing any with the same name
    pub fn insert(&mut self, histogram: MutationHistogram) -> Option<MutationHistogram> {
        self.histograms.insert(histogram.name.clone(), histogram)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MutationHistogram> {
        self.histograms.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut MutationHistogram> {
        self.histograms.get_mut(name)
    }

    /// Histograms in name order
    pub fn iter(&self) -> impl Iterator<Item = &MutationHistogram> {
        self.histograms.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.histograms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.histograms.is_empty()
    }

    /// Fold `other` into this set. Histograms present on both sides are merged, the rest
    /// are inserted.
    ///
    /// # Errors
    ///
    /// Returns `HistogramError::IdentityMismatch` if two same-named histograms differ in
    /// identity. The set is left unchanged on error.
    pub fn merge(&mut self, other: HistogramSet) -> Result<(), HistogramError> {
        for (name, histogram) in &other.histograms {
            if let Some(existing) = self.histograms.get(name) {
                existing.check_identity(histogram)?;
            }
        }

        for (name, histogram) in other.histograms {
            match self.histograms.get_mut(&name) {
                Some(existing) => existing.merge(&histogram)?,
                None => {
                    self.histograms.insert(name, histogram);
                }
            }
        }
        Ok(())
    }

    /// Merge a sequence of sets in order
    ///
    /// # Errors
    ///
    /// Returns the first identity mismatch encountered.
    pub fn merge_all<I>(sets: I) -> Result<Self, HistogramError>
    where
        I: IntoIterator<Item = HistogramSet>,
    {
        sets.into_iter().try_fold(Self::new(), |mut merged, set| {
            merged.merge(set)?;
            Ok(merged)
        })
    }

    /// Attach structure annotations by reference name. Returns how many were attached.
    pub fn attach_structures(&mut self, structures: &HashMap<String, String>) -> usize {
        let mut attached = 0;
        for (name, structure) in structures {
            match self.histograms.get_mut(name) {
                Some(histogram) => {
                    if structure.len() != histogram.sequence.len() {
                        warn!(
                            reference = %name,
                            structure_len = structure.len(),
                            sequence_len = histogram.sequence.len(),
                            "Structure length differs from sequence length"
                        );
                    }
                    histogram.structure = Some(structure.clone());
                    attached += 1;
                }
                None => debug!(reference = %name, "No histogram for structure annotation"),
            }
        }
        attached
    }

    /// Load a snapshot from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid snapshot.
    pub fn load_from_file(path: &Path) -> Result<Self, HistogramError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a snapshot from a JSON string
    ///
    /// # Errors
    ///
    /// Returns `HistogramError::Json` if the snapshot is malformed.
    pub fn from_json(json: &str) -> Result<Self, HistogramError> {
        let data: SnapshotData = serde_json::from_str(json)?;

        // Version check (warn but don't fail)
        if data.version != SNAPSHOT_VERSION {
            warn!(
                expected = SNAPSHOT_VERSION,
                found = %data.version,
                "Histogram snapshot version mismatch"
            );
        }

        Ok(data.histograms.into_iter().collect())
    }

    /// Export a snapshot as pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns `HistogramError::Json` if serialization fails.
    pub fn to_json(&self) -> Result<String, HistogramError> {
        let data = SnapshotData {
            version: SNAPSHOT_VERSION.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            histograms: self.histograms.values().cloned().collect(),
        };
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Write a snapshot to `path`
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<(), HistogramError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

impl FromIterator<MutationHistogram> for HistogramSet {
    fn from_iter<I: IntoIterator<Item = MutationHistogram>>(iter: I) -> Self {
        let mut set = Self::new();
        for histogram in iter {
            set.insert(histogram);
        }
        set
    }
}
