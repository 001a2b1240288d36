use serde::{Deserialize, Serialize};
use std::fmt;

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// Where a practice run currently is.
///
/// `All` and `Missed` are answering rounds; `Summary` sits between rounds and
/// `Done` is terminal until the run is restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PracticePhase {
    All,
    Missed,
    Summary,
    Done,
}

impl PracticePhase {
    /// True for the phases that accept answers.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::All | Self::Missed)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Missed => "missed",
            Self::Summary => "summary",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for PracticePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── TALLIES ───────────────────────────────────────────────────────────────────
//

/// Per-card tally within a single round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardResult {
    pub correct: u32,
    pub wrong: u32,
}

impl CardResult {
    #[must_use]
    pub fn record(self, is_correct: bool) -> Self {
        if is_correct {
            Self {
                correct: self.correct.saturating_add(1),
                ..self
            }
        } else {
            Self {
                wrong: self.wrong.saturating_add(1),
                ..self
            }
        }
    }
}

/// Aggregate of every card tally in a round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundStats {
    pub correct: u32,
    pub wrong: u32,
}

impl RoundStats {
    #[must_use]
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a CardResult>) -> Self {
        results
            .into_iter()
            .fold(Self::default(), |acc, result| Self {
                correct: acc.correct.saturating_add(result.correct),
                wrong: acc.wrong.saturating_add(result.wrong),
            })
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.correct.saturating_add(self.wrong)
    }

    /// Percentage of correct attempts, `0.0` when nothing was recorded.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        f64::from(self.correct) / f64::from(total) * 100.0
    }
}
