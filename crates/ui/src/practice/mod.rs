mod action;
mod active;
mod event;
mod timer;

pub use action::{AdvanceToken, PracticeAction};
pub use active::ActivePractice;
pub use event::PracticeInput;
pub use timer::FeedbackTimer;
