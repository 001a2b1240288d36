use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::ids::CardId;

//
// ─── CARD SIDE ─────────────────────────────────────────────────────────────────
//

/// One face of a card.
///
/// A practice run shows one side as the prompt and grades typed input
/// against the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardSide {
    Front,
    Back,
}

impl CardSide {
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Back => "back",
        }
    }
}

impl fmt::Display for CardSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── CARD TYPES ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CardError {
    #[error("card front cannot be empty")]
    EmptyFront,

    #[error("card back cannot be empty")]
    EmptyBack,
}

/// Lifetime practice counters stored alongside a card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardStats {
    pub correct_count: u32,
    pub incorrect_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_practiced_at: Option<DateTime<Utc>>,
}

/// A flashcard as stored in the document.
///
/// Timestamps and stats are optional so older documents still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    id: CardId,
    front: String,
    back: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stats: Option<CardStats>,
}

impl Card {
    /// Creates a new card with both sides filled in.
    ///
    /// # Errors
    ///
    /// Returns `CardError::EmptyFront` / `CardError::EmptyBack` if a side is blank.
    pub fn new(
        id: CardId,
        front: impl Into<String>,
        back: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, CardError> {
        let (front, back) = validate_sides(front.into(), back.into())?;
        Ok(Self {
            id,
            front,
            back,
            created_at: Some(now),
            updated_at: Some(now),
            stats: None,
        })
    }

    #[must_use]
    pub fn id(&self) -> &CardId {
        &self.id
    }

    #[must_use]
    pub fn front(&self) -> &str {
        &self.front
    }

    #[must_use]
    pub fn back(&self) -> &str {
        &self.back
    }

    /// Text shown on the given side.
    #[must_use]
    pub fn side(&self, side: CardSide) -> &str {
        match side {
            CardSide::Front => &self.front,
            CardSide::Back => &self.back,
        }
    }

    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    #[must_use]
    pub fn stats(&self) -> Option<&CardStats> {
        self.stats.as_ref()
    }

    /// Replace both sides of the card.
    ///
    /// # Errors
    ///
    /// Returns `CardError` if either side is blank; the card is left untouched.
    pub fn edit(
        &mut self,
        front: impl Into<String>,
        back: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), CardError> {
        let (front, back) = validate_sides(front.into(), back.into())?;
        self.front = front;
        self.back = back;
        self.updated_at = Some(now);
        Ok(())
    }

    /// Case-insensitive substring match on either side.
    ///
    /// `needle` is expected to be lowercased already.
    #[must_use]
    pub fn matches_query(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.front.to_lowercase().contains(needle)
            || self.back.to_lowercase().contains(needle)
    }
}

fn validate_sides(front: String, back: String) -> Result<(String, String), CardError> {
    if front.trim().is_empty() {
        return Err(CardError::EmptyFront);
    }
    if back.trim().is_empty() {
        return Err(CardError::EmptyBack);
    }
    Ok((front, back))
}
