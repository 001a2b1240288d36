use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use flashdeck_core::model::{Card, CardId, Deck, DeckId};
use thiserror::Error;
use tokio::sync::watch;

use crate::document::Database;
use crate::json::DocumentStore;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Monotonic counter bumped on every store mutation.
///
/// Consumers compare revisions (or await `watch::Receiver::changed`) to learn
/// that the card set may have changed shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StoreRevision(u64);

impl StoreRevision {
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Repository contract for decks.
#[async_trait]
pub trait DeckRepository: Send + Sync {
    /// Persist or update a deck.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the deck cannot be stored.
    async fn upsert_deck(&self, deck: &Deck) -> Result<(), StorageError>;

    /// Fetch a deck by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_deck(&self, id: &DeckId) -> Result<Deck, StorageError>;

    /// All decks, pinned first, then by name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn list_decks(&self) -> Result<Vec<Deck>, StorageError>;

    /// Record that the deck was opened at `at`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the deck does not exist.
    async fn mark_opened(&self, id: &DeckId, at: DateTime<Utc>) -> Result<(), StorageError>;

    /// Delete a deck together with its cards.
    ///
    /// Returns the document as it was before the delete, for `restore`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the deck does not exist.
    async fn delete_deck(&self, id: &DeckId) -> Result<Database, StorageError>;

    /// Replace the whole document, typically to undo a delete.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the document cannot be written.
    async fn restore(&self, db: Database) -> Result<(), StorageError>;
}

#[async_trait]
pub trait CardRepository: Send + Sync {
    /// Fetch cards by ID, in request order.
    ///
    /// Unknown ids are skipped rather than reported: decks may still list
    /// cards that were deleted elsewhere.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn load_cards(&self, ids: &[CardId]) -> Result<Vec<Card>, StorageError>;

    /// Persist or update a card and make sure the deck lists it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the deck does not exist.
    async fn upsert_card(&self, deck_id: &DeckId, card: &Card) -> Result<(), StorageError>;

    /// Delete a card and unlink it from every deck.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the card does not exist.
    async fn delete_card(&self, id: &CardId) -> Result<(), StorageError>;
}

/// Change notifications for the whole store.
pub trait StoreEvents: Send + Sync {
    fn revision(&self) -> StoreRevision;

    fn subscribe(&self) -> watch::Receiver<StoreRevision>;
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub decks: Arc<dyn DeckRepository>,
    pub cards: Arc<dyn CardRepository>,
    pub events: Arc<dyn StoreEvents>,
    pub document: DocumentStore,
}

impl Storage {
    /// Store backed by memory only, starting from `db`.
    #[must_use]
    pub fn in_memory(db: Database) -> Self {
        Self::from_store(DocumentStore::in_memory(db))
    }

    /// Store bound to a JSON file; missing files start from the seed document.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the file exists but cannot be read or parsed.
    pub async fn json_file(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let store = DocumentStore::open(path).await?;
        Ok(Self::from_store(store))
    }

    fn from_store(store: DocumentStore) -> Self {
        let decks: Arc<dyn DeckRepository> = Arc::new(store.clone());
        let cards: Arc<dyn CardRepository> = Arc::new(store.clone());
        let events: Arc<dyn StoreEvents> = Arc::new(store.clone());
        Self {
            decks,
            cards,
            events,
            document: store,
        }
    }
}
