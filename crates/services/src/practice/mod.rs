mod engine;
mod filter;
mod plan;
mod progress;
mod session;
mod workflow;

// Public API of the practice subsystem.
pub use crate::error::{PracticeError, TransitionError};
pub use engine::{AnswerOutcome, PracticeEngine};
pub use filter::{CardFilter, CardSortMode, ParseSortError, SortOrder};
pub use plan::build_queue;
pub use progress::PracticeProgress;
pub use session::{PracticeSession, StartOptions};
pub use workflow::{CardIndex, DeckSync, PracticeDeck, PracticeLoopService};
