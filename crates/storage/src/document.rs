//! The flashcard document: every deck and card, persisted as one JSON value.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use flashdeck_core::model::{Card, CardId, Deck, DeckId};
use serde::{Deserialize, Serialize};

use crate::repository::StorageError;

/// Whole-store snapshot, loaded and saved wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    pub decks: BTreeMap<DeckId, Deck>,
    pub cards: BTreeMap<CardId, Card>,
}

impl Database {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for malformed documents.
    pub fn from_json(raw: &str) -> Result<Self, StorageError> {
        serde_json::from_str(raw).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// Render the document as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if encoding fails.
    pub fn to_json(&self) -> Result<String, StorageError> {
        serde_json::to_string_pretty(self).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// Cards of a deck in deck order, skipping ids with no card record.
    #[must_use]
    pub fn deck_cards(&self, deck_id: &DeckId) -> Vec<&Card> {
        self.decks
            .get(deck_id)
            .map(|deck| {
                deck.card_ids()
                    .iter()
                    .filter_map(|id| self.cards.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Contents shipped with the app and used when no file exists yet.
    #[must_use]
    pub fn seed() -> Self {
        let base = seed_epoch();
        let mut db = Self::new();

        let names = [
            "French",
            "Biology",
            "Korean",
            "Neuroscience",
            "Chemistry",
            "Calculus",
        ];
        for (offset, name) in (0_i64..).zip(names) {
            let id = DeckId::new(format!("deck_{}", offset + 1));
            if let Ok(deck) = Deck::new(id.clone(), name, base + Duration::days(offset)) {
                db.decks.insert(id, deck);
            }
        }

        let french = DeckId::new("deck_1");
        for (id, front, back) in [
            ("card_1", "bonjour", "hello"),
            ("card_2", "au revoir", "goodbye"),
        ] {
            let card_id = CardId::new(id);
            let Ok(card) = Card::new(card_id.clone(), front, back, base) else {
                continue;
            };
            db.cards.insert(card_id.clone(), card);
            if let Some(deck) = db.decks.get_mut(&french) {
                deck.link_card(card_id, base);
            }
        }

        db
    }
}

fn seed_epoch() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_735_732_800, 0).unwrap_or_default()
}
