use flashdeck_core::model::PracticePhase;

/// Position within the current round, as shown in the practice header.
///
/// `current` is one-based and reads `total + 1` once the round is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PracticeProgress {
    pub current: usize,
    pub total: usize,
    pub phase: PracticePhase,
}

impl PracticeProgress {
    #[must_use]
    pub fn answered(&self) -> usize {
        self.current.saturating_sub(1).min(self.total)
    }

    #[must_use]
    pub fn is_round_exhausted(&self) -> bool {
        self.current > self.total
    }
}
