//! Deletion placement ambiguity.
//!
//! In a locally repetitive region, a deletion of length `L` ending at `i` produces the
//! same aligned context as a deletion of the same length ending nearby. Such a deletion
//! cannot be pinned to a position and is reported as ambiguous.

use crate::core::reference::ReferenceSequence;
use crate::core::types::Base;

/// Decide whether a deletion ending at 1-based position `end` with length `len` could
/// equally be placed at another end point in `[end - len, end + len]`.
///
/// The comparison uses a fixed window spanning `window` bases before the deletion start
/// through `window` bases after `end`. For each alternate end point the deleted bases are
/// removed from that window and the remainder compared with the remainder of the
/// original placement. Window parts falling outside the reference are empty.
#[must_use]
pub fn is_ambiguous_deletion(
    reference: &ReferenceSequence,
    end: usize,
    len: usize,
    window: usize,
) -> bool {
    if len == 0 {
        return false;
    }

    #[allow(clippy::cast_possible_wrap)]
    let (end, len, window) = (end as i64, len as i64, window as i64);

    // 0-based half-open window bounds
    let window_lo = end - len - window;
    let window_hi = end + window;

    let (orig_left, orig_right) = flanks(reference, window_lo, window_hi, end, len);

    ((end - len)..=(end + len))
        .filter(|&alt_end| alt_end != end)
        .any(|alt_end| {
            let (left, right) = flanks(reference, window_lo, window_hi, alt_end, len);
            left.iter()
                .chain(right)
                .eq(orig_left.iter().chain(orig_right))
        })
}

/// Window contents left and right of a deletion of `len` bases ending at `del_end`
fn flanks(
    reference: &ReferenceSequence,
    window_lo: i64,
    window_hi: i64,
    del_end: i64,
    len: i64,
) -> (&[Base], &[Base]) {
    let del_start = del_end - len + 1;
    (
        reference.window(window_lo, del_start - 1),
        reference.window(del_end, window_hi),
    )
}
