mod card;
mod deck;
mod ids;
mod practice;
mod settings;

pub use ids::{CardId, DeckId, ParseIdError, SessionId};

pub use card::{Card, CardError, CardSide, CardStats};
pub use deck::{Deck, DeckError};
pub use practice::{CardResult, PracticePhase, RoundStats};
pub use settings::{
    DEFAULT_FEEDBACK_DELAY, DEFAULT_SKIP_DEBOUNCE, ENV_FEEDBACK_DELAY_MS, ENV_SHUFFLE,
    ENV_SKIP_DEBOUNCE_MS, PracticeSettings, SettingsError,
};
