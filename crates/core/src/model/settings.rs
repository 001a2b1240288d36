use std::time::Duration;
use thiserror::Error;

use crate::model::card::CardSide;

pub const DEFAULT_FEEDBACK_DELAY: Duration = Duration::from_millis(2_500);
pub const DEFAULT_SKIP_DEBOUNCE: Duration = Duration::from_millis(100);

pub const ENV_FEEDBACK_DELAY_MS: &str = "FLASHDECK_FEEDBACK_DELAY_MS";
pub const ENV_SKIP_DEBOUNCE_MS: &str = "FLASHDECK_SKIP_DEBOUNCE_MS";
pub const ENV_SHUFFLE: &str = "FLASHDECK_SHUFFLE";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("prompt side and answer side must differ")]
    SameSides,

    #[error("feedback delay must be > 0")]
    InvalidFeedbackDelay,

    #[error("skip debounce must be shorter than the feedback delay")]
    InvalidSkipDebounce,

    #[error("invalid value for {key}: {raw}")]
    InvalidEnv { key: &'static str, raw: String },
}

/// Tunables for practice runs and the answer-feedback window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeSettings {
    prompt_side: CardSide,
    answer_side: CardSide,
    shuffle: bool,
    feedback_delay: Duration,
    skip_debounce: Duration,
}

impl Default for PracticeSettings {
    fn default() -> Self {
        Self {
            prompt_side: CardSide::Front,
            answer_side: CardSide::Back,
            shuffle: true,
            feedback_delay: DEFAULT_FEEDBACK_DELAY,
            skip_debounce: DEFAULT_SKIP_DEBOUNCE,
        }
    }
}

impl PracticeSettings {
    /// Creates validated settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the sides match, the delay is zero, or the
    /// debounce does not fit inside the delay.
    pub fn new(
        prompt_side: CardSide,
        answer_side: CardSide,
        shuffle: bool,
        feedback_delay: Duration,
        skip_debounce: Duration,
    ) -> Result<Self, SettingsError> {
        if prompt_side == answer_side {
            return Err(SettingsError::SameSides);
        }
        if feedback_delay.is_zero() {
            return Err(SettingsError::InvalidFeedbackDelay);
        }
        if skip_debounce >= feedback_delay {
            return Err(SettingsError::InvalidSkipDebounce);
        }
        Ok(Self {
            prompt_side,
            answer_side,
            shuffle,
            feedback_delay,
            skip_debounce,
        })
    }

    /// Defaults overridden by `FLASHDECK_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidEnv` for unparsable values.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`PracticeSettings::from_env`] but reads through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` for unparsable or inconsistent values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let defaults = Self::default();

        let feedback_delay = match lookup(ENV_FEEDBACK_DELAY_MS) {
            Some(raw) => parse_millis(ENV_FEEDBACK_DELAY_MS, raw)?,
            None => defaults.feedback_delay,
        };
        let skip_debounce = match lookup(ENV_SKIP_DEBOUNCE_MS) {
            Some(raw) => parse_millis(ENV_SKIP_DEBOUNCE_MS, raw)?,
            None => defaults.skip_debounce,
        };
        let shuffle = match lookup(ENV_SHUFFLE) {
            Some(raw) => parse_flag(ENV_SHUFFLE, raw)?,
            None => defaults.shuffle,
        };

        Self::new(
            defaults.prompt_side,
            defaults.answer_side,
            shuffle,
            feedback_delay,
            skip_debounce,
        )
    }

    /// Swap which side is prompted and which is graded.
    #[must_use]
    pub fn reversed(self) -> Self {
        Self {
            prompt_side: self.answer_side,
            answer_side: self.prompt_side,
            ..self
        }
    }

    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    #[must_use]
    pub fn prompt_side(&self) -> CardSide {
        self.prompt_side
    }

    #[must_use]
    pub fn answer_side(&self) -> CardSide {
        self.answer_side
    }

    #[must_use]
    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    #[must_use]
    pub fn feedback_delay(&self) -> Duration {
        self.feedback_delay
    }

    #[must_use]
    pub fn skip_debounce(&self) -> Duration {
        self.skip_debounce
    }
}

fn parse_millis(key: &'static str, raw: String) -> Result<Duration, SettingsError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| SettingsError::InvalidEnv { key, raw })
}

fn parse_flag(key: &'static str, raw: String) -> Result<bool, SettingsError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SettingsError::InvalidEnv { key, raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_practice_screen_timing() {
        let settings = PracticeSettings::default();
        assert_eq!(settings.feedback_delay(), Duration::from_millis(2_500));
        assert_eq!(settings.skip_debounce(), Duration::from_millis(100));
        assert_eq!(settings.prompt_side(), CardSide::Front);
        assert_eq!(settings.answer_side(), CardSide::Back);
        assert!(settings.shuffle());
    }

    #[test]
    fn same_sides_are_rejected() {
        let err = PracticeSettings::new(
            CardSide::Back,
            CardSide::Back,
            true,
            DEFAULT_FEEDBACK_DELAY,
            DEFAULT_SKIP_DEBOUNCE,
        )
        .unwrap_err();
        assert_eq!(err, SettingsError::SameSides);
    }

    #[test]
    fn debounce_must_fit_inside_delay() {
        let err = PracticeSettings::new(
            CardSide::Front,
            CardSide::Back,
            true,
            Duration::from_millis(50),
            Duration::from_millis(50),
        )
        .unwrap_err();
        assert_eq!(err, SettingsError::InvalidSkipDebounce);
    }

    #[test]
    fn env_overrides_are_applied() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_FEEDBACK_DELAY_MS, "1000"),
            (ENV_SHUFFLE, "off"),
        ]);
        let settings =
            PracticeSettings::from_lookup(|key| vars.get(key).map(ToString::to_string)).unwrap();
        assert_eq!(settings.feedback_delay(), Duration::from_millis(1_000));
        assert_eq!(settings.skip_debounce(), DEFAULT_SKIP_DEBOUNCE);
        assert!(!settings.shuffle());
    }

    #[test]
    fn garbage_env_value_is_reported() {
        let err = PracticeSettings::from_lookup(|key| {
            (key == ENV_SHUFFLE).then(|| "sometimes".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, SettingsError::InvalidEnv { key, .. } if key == ENV_SHUFFLE));
    }

    #[test]
    fn reversed_swaps_sides() {
        let settings = PracticeSettings::default().reversed();
        assert_eq!(settings.prompt_side(), CardSide::Back);
        assert_eq!(settings.answer_side(), CardSide::Front);
    }
}
