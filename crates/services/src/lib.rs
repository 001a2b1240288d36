#![forbid(unsafe_code)]

pub mod error;
pub mod practice;

pub use flashdeck_core::Clock;

pub use error::{PracticeError, TransitionError};
pub use practice::{
    AnswerOutcome, CardFilter, CardIndex, CardSortMode, DeckSync, PracticeDeck, PracticeEngine,
    PracticeLoopService, PracticeProgress, PracticeSession, SortOrder, StartOptions,
};
