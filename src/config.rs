//! Run configuration for bit-vector generation.
//!
//! Every field has a default, so a JSON config file only needs the values it changes:
//!
//! ```json
//! { "quality_score_cutoff": 20, "mutation_count_cutoff": 8 }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub const DEFAULT_QUALITY_SCORE_CUTOFF: u8 = 25;
pub const DEFAULT_AMBIGUITY_WINDOW_SIZE: usize = 10;
pub const DEFAULT_READ_LENGTH_FRACTION_CUTOFF: f64 = 0.1;
pub const DEFAULT_MAPPING_QUALITY_CUTOFF: u8 = 15;
pub const DEFAULT_MUTATION_COUNT_CUTOFF: usize = 10;
pub const DEFAULT_DATA_TYPE: &str = "DMS";
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Thresholds and knobs consumed by the classifier, acceptance gates and batch driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BitVectorConfig {
    /// Matched bases scoring below this are classified ambiguous
    pub quality_score_cutoff: u8,
    /// Flank length compared when deciding deletion ambiguity
    pub ambiguity_window_size: usize,
    /// Minimum read length / reference length ratio
    pub read_length_fraction_cutoff: f64,
    /// Minimum mapping quality, checked for every mate
    pub mapping_quality_cutoff: u8,
    /// Maximum mutated bases per read group
    pub mutation_count_cutoff: usize,
    /// Chemical probe label recorded in histograms
    pub data_type: String,
    /// Read groups per parallel batch
    pub batch_size: usize,
}

impl Default for BitVectorConfig {
    fn default() -> Self {
        Self {
            quality_score_cutoff: DEFAULT_QUALITY_SCORE_CUTOFF,
            ambiguity_window_size: DEFAULT_AMBIGUITY_WINDOW_SIZE,
            read_length_fraction_cutoff: DEFAULT_READ_LENGTH_FRACTION_CUTOFF,
            mapping_quality_cutoff: DEFAULT_MAPPING_QUALITY_CUTOFF,
            mutation_count_cutoff: DEFAULT_MUTATION_COUNT_CUTOFF,
            data_type: DEFAULT_DATA_TYPE.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl BitVectorConfig {
    /// Load a config from a JSON file and validate it
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read, `ConfigError::Json` if it is
    /// not valid JSON for this config, or `ConfigError::Invalid` if a value is out of range.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a config from JSON text and validate it
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Json` or `ConfigError::Invalid`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.read_length_fraction_cutoff) {
            return Err(ConfigError::Invalid(format!(
                "read_length_fraction_cutoff must be within [0, 1], got {}",
                self.read_length_fraction_cutoff
            )));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if self.data_type.trim().is_empty() {
            return Err(ConfigError::Invalid("data_type must not be empty".to_string()));
        }
        Ok(())
    }
}
