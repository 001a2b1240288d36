//! Shared error types for the services crate.

use thiserror::Error;

use flashdeck_core::model::{CardId, PracticePhase};
use storage::repository::StorageError;

/// Why a practice command was not applied.
///
/// `PracticeSession` transforms return it directly; the engine logs it and
/// leaves the session untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum TransitionError {
    #[error("no practice session for this deck")]
    NoSession,
    #[error("no card ids to practice")]
    EmptyQueue,
    #[error("command not allowed in phase {0}")]
    WrongPhase(PracticePhase),
    #[error("round has no current card")]
    RoundExhausted,
    #[error("card {0} is not the current card")]
    StaleCard(CardId),
    #[error("card {0} is waiting for a retry")]
    RetryPending(CardId),
    #[error("card {0} was already marked incorrect")]
    AlreadyPenalized(CardId),
    #[error("round still has unanswered cards")]
    RoundInProgress,
}

/// Errors emitted by practice orchestration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PracticeError {
    #[error("no cards available for practice")]
    Empty,
    #[error(transparent)]
    Storage(#[from] StorageError),
}
