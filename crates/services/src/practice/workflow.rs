use std::collections::HashMap;
use std::sync::Arc;

use flashdeck_core::model::{Card, CardId, Deck, DeckId, SessionId};
use storage::repository::{CardRepository, DeckRepository, StorageError};

use super::engine::PracticeEngine;
use super::filter::CardFilter;
use crate::Clock;
use crate::error::PracticeError;

/// Cards of a deck looked up by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardIndex {
    cards: HashMap<CardId, Card>,
}

impl CardIndex {
    #[must_use]
    pub fn new(cards: impl IntoIterator<Item = Card>) -> Self {
        Self {
            cards: cards
                .into_iter()
                .map(|card| (card.id().clone(), card))
                .collect(),
        }
    }

    #[must_use]
    pub fn get(&self, id: &CardId) -> Option<&Card> {
        self.cards.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// A deck as seen by practice: its record, its cards, and the ids that pass
/// the active filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeDeck {
    pub deck: Deck,
    pub cards: CardIndex,
    pub valid_card_ids: Vec<CardId>,
}

/// Result of reconciling a running session with storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckSync {
    /// `None` when the deck no longer exists.
    pub deck: Option<PracticeDeck>,
    /// True when the session had to be rehydrated.
    pub changed: bool,
}

/// Loads decks from storage and drives the practice engine with them.
#[derive(Clone)]
pub struct PracticeLoopService {
    clock: Clock,
    decks: Arc<dyn DeckRepository>,
    cards: Arc<dyn CardRepository>,
}

impl PracticeLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        decks: Arc<dyn DeckRepository>,
        cards: Arc<dyn CardRepository>,
    ) -> Self {
        Self {
            clock,
            decks,
            cards,
        }
    }

    /// Load a deck with its cards, filtered and ordered by `filter`.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::Storage` if the deck cannot be loaded.
    pub async fn load_deck(
        &self,
        deck_id: &DeckId,
        filter: &CardFilter,
    ) -> Result<PracticeDeck, PracticeError> {
        let deck = self.decks.get_deck(deck_id).await?;
        let cards = self.cards.load_cards(deck.card_ids()).await?;
        let valid_card_ids = filter.valid_card_ids(&cards);
        Ok(PracticeDeck {
            deck,
            cards: CardIndex::new(cards),
            valid_card_ids,
        })
    }

    /// Start a session over the deck's valid cards.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::Empty` when no card passes the filter, or
    /// `PracticeError::Storage` for storage failures.
    pub async fn start_practice(
        &self,
        engine: &mut PracticeEngine,
        deck_id: &DeckId,
        filter: &CardFilter,
    ) -> Result<(PracticeDeck, SessionId), PracticeError> {
        let deck = self.load_deck(deck_id, filter).await?;
        let session_id = engine
            .start_session(deck_id.clone(), &deck.valid_card_ids)
            .ok_or(PracticeError::Empty)?;
        self.decks.mark_opened(deck_id, self.clock.now()).await?;
        Ok((deck, session_id))
    }

    /// Discard the deck's session and start again from the current cards.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::Empty` when no card passes the filter, or
    /// `PracticeError::Storage` for storage failures.
    pub async fn restart_practice(
        &self,
        engine: &mut PracticeEngine,
        deck_id: &DeckId,
        filter: &CardFilter,
    ) -> Result<(PracticeDeck, SessionId), PracticeError> {
        let deck = self.load_deck(deck_id, filter).await?;
        let session_id = engine
            .reset_session(deck_id, &deck.valid_card_ids)
            .ok_or(PracticeError::Empty)?;
        Ok((deck, session_id))
    }

    /// Reload the deck and rehydrate its session against the cards that
    /// still exist and pass `filter`.
    ///
    /// A deck that was deleted rehydrates its session to an empty card set,
    /// so the round ends through the normal completion check.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::Storage` if the store cannot be read.
    pub async fn sync_deck(
        &self,
        engine: &mut PracticeEngine,
        deck_id: &DeckId,
        filter: &CardFilter,
    ) -> Result<DeckSync, PracticeError> {
        let deck = match self.load_deck(deck_id, filter).await {
            Ok(deck) => Some(deck),
            Err(PracticeError::Storage(StorageError::NotFound)) => {
                tracing::info!(%deck_id, "deck no longer exists");
                None
            }
            Err(err) => return Err(err),
        };
        let valid_card_ids = deck
            .as_ref()
            .map_or(&[][..], |deck| deck.valid_card_ids.as_slice());
        let changed = engine.rehydrate_session(deck_id, valid_card_ids);
        Ok(DeckSync { deck, changed })
    }
}
