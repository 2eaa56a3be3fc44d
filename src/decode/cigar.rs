//! CIGAR string decoding.

use crate::decode::DecodeError;

/// Kind of a CIGAR run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CigarKind {
    /// `M`: alignment match or mismatch
    Match,
    /// `D`: bases deleted from the reference
    Deletion,
    /// `I`: bases inserted into the read
    Insertion,
    /// `S`: read bases clipped from the alignment
    SoftClip,
    /// Any other operation code, kept raw so callers can report it
    Other(char),
}

impl CigarKind {
    fn from_char(op: char) -> Self {
        match op {
            'M' => Self::Match,
            'D' => Self::Deletion,
            'I' => Self::Insertion,
            'S' => Self::SoftClip,
            other => Self::Other(other),
        }
    }
}

/// One `(length, operation)` run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CigarOp {
    pub len: usize,
    pub kind: CigarKind,
}

impl CigarOp {
    #[must_use]
    pub fn new(len: usize, kind: CigarKind) -> Self {
        Self { len, kind }
    }
}

/// A decoded CIGAR, in alignment order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cigar {
    ops: Vec<CigarOp>,
}

impl Cigar {
    /// Tokenize a CIGAR string into length+operation runs.
    ///
    /// Unknown operation letters are kept as [`CigarKind::Other`].
    ///
    /// # Errors
    ///
    /// Returns `DecodeError::Format` if the string is empty, an operation lacks a
    /// length, a length is zero or overflows, or the string ends in digits.
    pub fn parse(cigar: &str) -> Result<Self, DecodeError> {
        let format_error = |reason: String| DecodeError::Format {
            cigar: cigar.to_string(),
            reason,
        };

        if cigar.is_empty() {
            return Err(format_error("empty CIGAR".to_string()));
        }

        let mut ops = Vec::new();
        let mut len: Option<usize> = None;

        for ch in cigar.chars() {
            if let Some(digit) = ch.to_digit(10) {
                let current = len.unwrap_or(0);
                let next = current
                    .checked_mul(10)
                    .and_then(|v| v.checked_add(digit as usize))
                    .ok_or_else(|| format_error("run length overflows".to_string()))?;
                len = Some(next);
                continue;
            }

            match len.take() {
                None => {
                    return Err(format_error(format!("operation '{ch}' has no length")));
                }
                Some(0) => {
                    return Err(format_error(format!("operation '{ch}' has zero length")));
                }
                Some(n) => ops.push(CigarOp::new(n, CigarKind::from_char(ch))),
            }
        }

        if len.is_some() {
            return Err(format_error("trailing length without operation".to_string()));
        }

        Ok(Self { ops })
    }

    #[must_use]
    pub fn ops(&self) -> &[CigarOp] {
        &self.ops
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CigarOp> {
        self.ops.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl<'a> IntoIterator for &'a Cigar {
    type Item = &'a CigarOp;
    type IntoIter = std::slice::Iter<'a, CigarOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}
