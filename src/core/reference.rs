use std::collections::HashMap;

use crate::core::types::Base;

/// A reference sequence reads are aligned against.
///
/// Positions handed to the accessors are 1-based, matching SAM coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSequence {
    pub name: String,
    bases: Vec<Base>,
}

impl ReferenceSequence {
    pub fn new(name: impl Into<String>, bases: Vec<Base>) -> Self {
        Self {
            name: name.into(),
            bases,
        }
    }

    /// Build from ASCII text. Returns the first offending byte when the text is not
    /// made of nucleotides.
    pub fn from_ascii(name: impl Into<String>, text: &[u8]) -> Result<Self, u8> {
        let bases = text
            .iter()
            .map(|&b| Base::from_ascii(b).ok_or(b))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(name, bases))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bases.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    /// Base at a 1-based position, `None` outside `1..=len`
    #[must_use]
    pub fn base_at(&self, pos: usize) -> Option<Base> {
        pos.checked_sub(1).and_then(|i| self.bases.get(i)).copied()
    }

    #[must_use]
    pub fn bases(&self) -> &[Base] {
        &self.bases
    }

    /// Bases in the 0-based half-open range `[lo, hi)`, clamped to the sequence.
    ///
    /// Out-of-range or inverted bounds produce an empty slice.
    #[must_use]
    pub fn window(&self, lo: i64, hi: i64) -> &[Base] {
        #[allow(clippy::cast_possible_wrap)]
        let len = self.bases.len() as i64;
        let lo = lo.clamp(0, len);
        let hi = hi.clamp(0, len);
        if lo >= hi {
            return &[];
        }
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let range = lo as usize..hi as usize;
        &self.bases[range]
    }
}

impl std::fmt::Display for ReferenceSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for base in &self.bases {
            write!(f, "{base}")?;
        }
        Ok(())
    }
}

/// All references loaded for a run, looked up by name.
///
/// Loaded once and shared read-only by every batch.
#[derive(Debug, Default)]
pub struct ReferenceSet {
    references: Vec<ReferenceSequence>,
    name_to_index: HashMap<String, usize>,
}

impl ReferenceSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a reference. Returns it back if the name is already present.
    pub fn insert(&mut self, reference: ReferenceSequence) -> Result<(), ReferenceSequence> {
        if self.name_to_index.contains_key(&reference.name) {
            return Err(reference);
        }
        self.name_to_index
            .insert(reference.name.clone(), self.references.len());
        self.references.push(reference);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ReferenceSequence> {
        self.name_to_index
            .get(name)
            .map(|&idx| &self.references[idx])
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.name_to_index.contains_key(name)
    }

    /// References in load order
    pub fn iter(&self) -> impl Iterator<Item = &ReferenceSequence> {
        self.references.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.references.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}

impl FromIterator<ReferenceSequence> for ReferenceSet {
    /// Later duplicates are dropped
    fn from_iter<I: IntoIterator<Item = ReferenceSequence>>(iter: I) -> Self {
        let mut set = Self::new();
        for reference in iter {
            let _ = set.insert(reference);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_ascii() {
        let reference = ReferenceSequence::from_ascii("ref", b"acgU").unwrap();
        assert_eq!(reference.to_string(), "ACGT");
        assert_eq!(reference.len(), 4);

        let err = ReferenceSequence::from_ascii("ref", b"ACNT").unwrap_err();
        assert_eq!(err, b'N');
    }

    #[test]
    fn test_base_at_is_one_based() {
        let reference = ReferenceSequence::from_ascii("ref", b"ACGT").unwrap();
        assert_eq!(reference.base_at(0), None);
        assert_eq!(reference.base_at(1), Some(Base::A));
        assert_eq!(reference.base_at(4), Some(Base::T));
        assert_eq!(reference.base_at(5), None);
    }

    #[test]
    fn test_window_clamps() {
        let reference = ReferenceSequence::from_ascii("ref", b"ACGTACGT").unwrap();
        assert_eq!(reference.window(-3, 2), &[Base::A, Base::C]);
        assert_eq!(reference.window(6, 20), &[Base::G, Base::T]);
        assert!(reference.window(5, 5).is_empty());
        assert!(reference.window(6, 2).is_empty());
        assert!(reference.window(-10, -2).is_empty());
    }

    #[test]
    fn test_reference_set_rejects_duplicates() {
        let mut set = ReferenceSet::new();
        set.insert(ReferenceSequence::from_ascii("a", b"ACGT").unwrap())
            .unwrap();
        assert!(set
            .insert(ReferenceSequence::from_ascii("a", b"GGGG").unwrap())
            .is_err());
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("a").unwrap().to_string(), "ACGT");
        assert!(set.get("b").is_none());
    }
}
