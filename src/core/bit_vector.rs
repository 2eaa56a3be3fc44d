use crate::core::types::Symbol;

/// Per-position classification of the reference positions a read (or mate pair) covers.
///
/// Stored densely over `1..=reference_len`; positions the read does not cover hold no
/// symbol. Positions outside the reference can never be set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitVector {
    symbols: Vec<Option<Symbol>>,
}

impl BitVector {
    /// An empty bit vector over a reference of `reference_len` bases
    #[must_use]
    pub fn new(reference_len: usize) -> Self {
        Self {
            symbols: vec![None; reference_len],
        }
    }

    /// Build from `(position, symbol)` pairs; out-of-range positions are dropped
    pub fn from_symbols<I>(reference_len: usize, symbols: I) -> Self
    where
        I: IntoIterator<Item = (usize, Symbol)>,
    {
        let mut bit_vector = Self::new(reference_len);
        for (pos, symbol) in symbols {
            bit_vector.set(pos, symbol);
        }
        bit_vector
    }

    /// Length of the reference this bit vector spans
    #[must_use]
    pub fn reference_len(&self) -> usize {
        self.symbols.len()
    }

    /// Set the symbol at a 1-based position. Returns false (and stores nothing) when the
    /// position lies outside the reference.
    pub fn set(&mut self, pos: usize, symbol: Symbol) -> bool {
        match pos.checked_sub(1).and_then(|i| self.symbols.get_mut(i)) {
            Some(slot) => {
                *slot = Some(symbol);
                true
            }
            None => false,
        }
    }

    /// Symbol at a 1-based position, `None` when uncovered or out of range
    #[must_use]
    pub fn get(&self, pos: usize) -> Option<Symbol> {
        pos.checked_sub(1)
            .and_then(|i| self.symbols.get(i))
            .copied()
            .flatten()
    }

    /// Covered positions in ascending order
    pub fn iter(&self) -> impl Iterator<Item = (usize, Symbol)> + '_ {
        self.symbols
            .iter()
            .enumerate()
            .filter_map(|(i, symbol)| symbol.map(|s| (i + 1, s)))
    }

    /// Number of covered positions
    #[must_use]
    pub fn covered(&self) -> usize {
        self.symbols.iter().filter(|s| s.is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.iter().all(Option::is_none)
    }

    /// Number of mutated bases within the inclusive 1-based range `[start, end]`
    #[must_use]
    pub fn mutation_count(&self, start: usize, end: usize) -> usize {
        (start.max(1)..=end)
            .filter(|&pos| self.get(pos).is_some_and(Symbol::is_mutation))
            .count()
    }

    /// Render `[start, end]` as text, `.` marking uncovered positions
    #[must_use]
    pub fn to_bit_string(&self, start: usize, end: usize) -> String {
        (start.max(1)..=end)
            .map(|pos| self.get(pos).map_or('.', Symbol::as_char))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Base;

    #[test]
    fn test_set_and_get() {
        let mut bv = BitVector::new(4);
        assert!(bv.is_empty());
        assert!(bv.set(1, Symbol::NoMutation));
        assert!(bv.set(4, Symbol::Mutated(Base::G)));
        assert!(!bv.set(0, Symbol::Missing));
        assert!(!bv.set(5, Symbol::Missing));

        assert_eq!(bv.get(1), Some(Symbol::NoMutation));
        assert_eq!(bv.get(2), None);
        assert_eq!(bv.get(4), Some(Symbol::Mutated(Base::G)));
        assert_eq!(bv.get(5), None);
        assert_eq!(bv.covered(), 2);
    }

    #[test]
    fn test_iter_is_ordered() {
        let bv = BitVector::from_symbols(
            6,
            [
                (5, Symbol::Deletion),
                (2, Symbol::Ambiguous),
                (3, Symbol::NoMutation),
            ],
        );
        let positions: Vec<usize> = bv.iter().map(|(pos, _)| pos).collect();
        assert_eq!(positions, vec![2, 3, 5]);
    }

    #[test]
    fn test_mutation_count_and_rendering() {
        let bv = BitVector::from_symbols(
            5,
            [
                (1, Symbol::NoMutation),
                (2, Symbol::Mutated(Base::A)),
                (3, Symbol::Deletion),
                (4, Symbol::Mutated(Base::T)),
            ],
        );
        assert_eq!(bv.mutation_count(1, 5), 2);
        assert_eq!(bv.mutation_count(3, 5), 1);
        assert_eq!(bv.to_bit_string(1, 5), "0A1T.");
    }
}
