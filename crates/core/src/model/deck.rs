use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{CardId, DeckId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DeckError {
    #[error("deck name cannot be empty")]
    EmptyName,
}

//
// ─── DECK ──────────────────────────────────────────────────────────────────────
//

/// A named, ordered collection of card identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    id: DeckId,
    name: String,
    card_ids: Vec<CardId>,
    #[serde(default)]
    pinned: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    last_opened_at: DateTime<Utc>,
}

impl Deck {
    /// Creates an empty deck.
    ///
    /// # Errors
    ///
    /// Returns `DeckError::EmptyName` if the name is blank.
    pub fn new(id: DeckId, name: impl Into<String>, now: DateTime<Utc>) -> Result<Self, DeckError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DeckError::EmptyName);
        }
        Ok(Self {
            id,
            name,
            card_ids: Vec::new(),
            pinned: false,
            created_at: now,
            updated_at: now,
            last_opened_at: now,
        })
    }

    #[must_use]
    pub fn id(&self) -> &DeckId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn card_ids(&self) -> &[CardId] {
        &self.card_ids
    }

    #[must_use]
    pub fn card_count(&self) -> usize {
        self.card_ids.len()
    }

    #[must_use]
    pub fn pinned(&self) -> bool {
        self.pinned
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    #[must_use]
    pub fn last_opened_at(&self) -> DateTime<Utc> {
        self.last_opened_at
    }

    #[must_use]
    pub fn contains_card(&self, card_id: &CardId) -> bool {
        self.card_ids.contains(card_id)
    }

    /// Append a card to the deck. Returns false if it was already linked.
    pub fn link_card(&mut self, card_id: CardId, now: DateTime<Utc>) -> bool {
        if self.contains_card(&card_id) {
            return false;
        }
        self.card_ids.push(card_id);
        self.updated_at = now;
        true
    }

    /// Remove a card from the deck. Returns false if it was not linked.
    pub fn unlink_card(&mut self, card_id: &CardId, now: DateTime<Utc>) -> bool {
        let before = self.card_ids.len();
        self.card_ids.retain(|id| id != card_id);
        let removed = self.card_ids.len() != before;
        if removed {
            self.updated_at = now;
        }
        removed
    }

    pub fn mark_opened(&mut self, now: DateTime<Utc>) {
        self.last_opened_at = now;
    }

    pub fn set_pinned(&mut self, pinned: bool, now: DateTime<Utc>) {
        self.pinned = pinned;
        self.updated_at = now;
    }
}
