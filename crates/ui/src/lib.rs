#![forbid(unsafe_code)]

pub mod practice;
pub mod vm;

pub use practice::{ActivePractice, AdvanceToken, FeedbackTimer, PracticeAction, PracticeInput};
pub use vm::PracticeScreen;
