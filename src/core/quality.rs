/// ASCII offset of Phred+33 encoded quality strings
pub const PHRED_OFFSET: u8 = 33;

/// Lookup from an ASCII quality character to its Phred score.
///
/// Built once per run and shared by reference with every classifier.
#[derive(Debug, Clone)]
pub struct QualityTable {
    scores: [Option<u8>; 256],
}

impl QualityTable {
    /// Phred+33 table covering `!` (0) through `~` (93)
    #[must_use]
    pub fn phred33() -> Self {
        let mut scores = [None; 256];
        for ch in PHRED_OFFSET..=b'~' {
            scores[usize::from(ch)] = Some(ch - PHRED_OFFSET);
        }
        Self { scores }
    }

    /// Score for a quality character. Characters outside the encoding score 0 so the
    /// base is treated as unreliable.
    #[must_use]
    pub fn score(&self, ch: u8) -> u8 {
        self.scores[usize::from(ch)].unwrap_or(0)
    }
}

impl Default for QualityTable {
    fn default() -> Self {
        Self::phred33()
    }
}
