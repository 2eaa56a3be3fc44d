use serde::{Deserialize, Serialize};

/// A reference or read nucleotide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Base {
    A,
    C,
    G,
    T,
}

impl Base {
    /// All bases in canonical order
    pub const ALL: [Base; 4] = [Base::A, Base::C, Base::G, Base::T];

    /// Parse an ASCII nucleotide, case-insensitive. `U` is read as `T`.
    #[must_use]
    pub fn from_ascii(b: u8) -> Option<Self> {
        match b.to_ascii_uppercase() {
            b'A' => Some(Self::A),
            b'C' => Some(Self::C),
            b'G' => Some(Self::G),
            b'T' | b'U' => Some(Self::T),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Self::A => 'A',
            Self::C => 'C',
            Self::G => 'G',
            Self::T => 'T',
        }
    }

    /// Index into per-base arrays (A=0, C=1, G=2, T=3)
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Bases DMS modifies (the expected-reactive set)
    #[must_use]
    pub fn is_dms_reactive(self) -> bool {
        matches!(self, Self::A | Self::C)
    }
}

impl std::fmt::Display for Base {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Classification of a single reference position covered by a read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// Read base matches the reference
    NoMutation,
    /// Confidently placed deletion
    Deletion,
    /// Low quality base or unplaceable indel
    Ambiguous,
    /// Position covered by a trailing soft clip
    Missing,
    /// Read carries a different base than the reference
    Mutated(Base),
}

impl Symbol {
    /// Single-character rendering used by bit-vector text files
    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Self::NoMutation => '0',
            Self::Deletion => '1',
            Self::Ambiguous => '?',
            Self::Missing => '*',
            Self::Mutated(base) => base.as_char(),
        }
    }

    #[must_use]
    pub fn is_mutation(self) -> bool {
        matches!(self, Self::Mutated(_))
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Reason a read group was rejected by an acceptance gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    LowMappingQuality,
    ShortRead,
    TooManyMutations,
}

impl SkipReason {
    pub const ALL: [SkipReason; 3] = [
        SkipReason::LowMappingQuality,
        SkipReason::ShortRead,
        SkipReason::TooManyMutations,
    ];
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LowMappingQuality => write!(f, "low_mapping_quality"),
            Self::ShortRead => write!(f, "short_read"),
            Self::TooManyMutations => write!(f, "too_many_mutations"),
        }
    }
}
