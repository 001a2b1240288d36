//! Side effects requested by [`crate::practice::ActivePractice`].

use std::fmt;
use std::time::Duration;

/// Identifies one scheduled feedback delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AdvanceToken(u64);

impl AdvanceToken {
    #[must_use]
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for AdvanceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Actions produced by the controller for the runtime to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PracticeAction {
    /// Redraw the practice screen.
    Render,

    /// Deliver `PracticeInput::DelayElapsed(token)` once `after` has passed.
    ScheduleAdvance {
        token: AdvanceToken,
        after: Duration,
    },

    /// The delay for `token` must never be delivered.
    CancelAdvance { token: AdvanceToken },
}
