//! Merging mate bit vectors into one consensus vector.

use tracing::warn;

use crate::core::bit_vector::BitVector;
use crate::core::types::Symbol;

/// Merge the bit vectors of two mates aligned to the same reference.
///
/// The result starts as `mate1`. Positions only `mate2` covers are copied over. Where both
/// cover a position with different symbols, the first matching rule wins:
///
/// 1. either side `NoMutation` → `NoMutation`
/// 2. either side `Ambiguous` → the other side
/// 3. either side `Missing` → the other side
/// 4. two different mutated bases → `Ambiguous`
/// 5. a deletion against a mutated base → `Ambiguous`
///
/// Any other combination keeps `mate1`'s symbol and logs a warning.
#[must_use]
pub fn merge_mates(mate1: &BitVector, mate2: &BitVector) -> BitVector {
    let len = mate1.reference_len().max(mate2.reference_len());
    let mut merged = BitVector::from_symbols(len, mate1.iter());

    for (pos, second) in mate2.iter() {
        let symbol = match merged.get(pos) {
            None => second,
            Some(first) if first == second => continue,
            Some(first) => resolve(first, second).unwrap_or_else(|| {
                warn!(
                    position = pos,
                    first = %first,
                    second = %second,
                    "Unable to merge mate symbols, keeping first mate"
                );
                first
            }),
        };
        merged.set(pos, symbol);
    }

    merged
}

/// Precedence table for two differing symbols; `None` when no rule applies
fn resolve(first: Symbol, second: Symbol) -> Option<Symbol> {
    use Symbol::{Ambiguous, Deletion, Missing, Mutated, NoMutation};

    let either = |s: Symbol| first == s || second == s;
    let other = |s: Symbol| if first == s { second } else { first };

    if either(NoMutation) {
        return Some(NoMutation);
    }
    if either(Ambiguous) {
        return Some(other(Ambiguous));
    }
    if either(Missing) {
        return Some(other(Missing));
    }
    match (first, second) {
        (Mutated(_), Mutated(_)) | (Deletion, Mutated(_)) | (Mutated(_), Deletion) => {
            Some(Ambiguous)
        }
        _ => None,
    }
}
