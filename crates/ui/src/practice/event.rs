//! Inputs that drive [`crate::practice::ActivePractice`].

use super::action::AdvanceToken;

/// Events processed by the active-card controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PracticeInput {
    /// The user submitted an answer. Blank text is ignored.
    Submit(String),
    /// Retry a card that was just answered wrong.
    TryAgain,
    /// Give up on a wrong card and move on without retrying.
    SkipCard,
    /// Skip the rest of the feedback delay.
    Continue,
    /// Stop the session where it is.
    EndSession,
    /// A scheduled feedback delay ran out.
    DelayElapsed(AdvanceToken),
}
