//! Files and tables produced by a run.
//!
//! - [`bit_vector`]: one `<reference>_bitvectors.txt` file per reference with a row per
//!   accepted read group
//! - [`summary`]: per-reference summary rows rendered as text, JSON or TSV

pub mod bit_vector;
pub mod summary;
