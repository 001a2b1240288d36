//! JSON document backend.
//!
//! The whole document lives in memory behind a mutex; when bound to a file,
//! every mutation rewrites the file wholesale.
//!
//! Mutations are serialized by an async writer lock held from snapshot to
//! swap. A change is applied to a copy, persisted, and only then installed
//! and announced, so a failed write leaves memory and revision untouched.

mod file;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use flashdeck_core::Clock;
use flashdeck_core::model::{Card, CardId, Deck, DeckId};
use tokio::sync::watch;

use crate::document::Database;
use crate::repository::{CardRepository, DeckRepository, StorageError, StoreEvents, StoreRevision};

#[derive(Clone)]
pub struct DocumentStore {
    db: Arc<Mutex<Database>>,
    writer: Arc<tokio::sync::Mutex<()>>,
    path: Option<Arc<PathBuf>>,
    revision: Arc<watch::Sender<StoreRevision>>,
    clock: Clock,
}

impl DocumentStore {
    #[must_use]
    pub fn in_memory(db: Database) -> Self {
        let (revision, _) = watch::channel(StoreRevision::default());
        Self {
            db: Arc::new(Mutex::new(db)),
            writer: Arc::new(tokio::sync::Mutex::new(())),
            path: None,
            revision: Arc::new(revision),
            clock: Clock::default(),
        }
    }

    /// Load the document at `path`, falling back to the seed when absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the file exists but cannot be read or parsed.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let db = match file::read_document(&path).await? {
            Some(db) => {
                tracing::debug!(path = %path.display(), decks = db.decks.len(), "loaded flashcard document");
                db
            }
            None => {
                tracing::warn!(path = %path.display(), "no flashcard document found, starting from defaults");
                Database::seed()
            }
        };
        Ok(Self::in_memory(db).with_path(path))
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Bind the store to `path` so mutations and `save` write there.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(Arc::new(path.into()));
        self
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref().map(PathBuf::as_path)
    }

    /// Copy of the current document.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn snapshot(&self) -> Result<Database, StorageError> {
        Ok(self.lock()?.clone())
    }

    /// Write the document to its file. No-op for memory-only stores.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if encoding or the write fails.
    pub async fn save(&self) -> Result<(), StorageError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        let _writer = self.writer.lock().await;
        let db = self.snapshot()?;
        file::write_document(path, &db).await
    }

    fn lock(&self) -> Result<MutexGuard<'_, Database>, StorageError> {
        self.db
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }

    /// Apply `change` to a copy of the document, persist it, then install it
    /// and publish a new revision.
    async fn commit<T>(
        &self,
        change: impl FnOnce(&mut Database) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let _writer = self.writer.lock().await;

        let mut next = self.snapshot()?;
        let out = change(&mut next)?;

        if let Some(path) = self.path.as_deref() {
            if let Err(err) = file::write_document(path, &next).await {
                tracing::warn!(path = %path.display(), error = %err, "flashcard document not written, change discarded");
                return Err(err);
            }
        }

        *self.lock()? = next;
        self.revision.send_modify(|rev| *rev = rev.next());
        Ok(out)
    }
}

#[async_trait]
impl DeckRepository for DocumentStore {
    async fn upsert_deck(&self, deck: &Deck) -> Result<(), StorageError> {
        let deck = deck.clone();
        self.commit(move |db| {
            db.decks.insert(deck.id().clone(), deck);
            Ok(())
        })
        .await
    }

    async fn get_deck(&self, id: &DeckId) -> Result<Deck, StorageError> {
        let guard = self.lock()?;
        guard.decks.get(id).cloned().ok_or(StorageError::NotFound)
    }

    async fn list_decks(&self) -> Result<Vec<Deck>, StorageError> {
        let guard = self.lock()?;
        let mut decks: Vec<Deck> = guard.decks.values().cloned().collect();
        decks.sort_by(|a, b| {
            b.pinned()
                .cmp(&a.pinned())
                .then_with(|| a.name().to_lowercase().cmp(&b.name().to_lowercase()))
        });
        Ok(decks)
    }

    async fn mark_opened(&self, id: &DeckId, at: DateTime<Utc>) -> Result<(), StorageError> {
        self.commit(|db| {
            let deck = db.decks.get_mut(id).ok_or(StorageError::NotFound)?;
            deck.mark_opened(at);
            Ok(())
        })
        .await
    }

    async fn delete_deck(&self, id: &DeckId) -> Result<Database, StorageError> {
        let now = self.clock.now();
        self.commit(|db| {
            let previous = db.clone();
            let deck = db.decks.remove(id).ok_or(StorageError::NotFound)?;
            for card_id in deck.card_ids() {
                db.cards.remove(card_id);
                for other in db.decks.values_mut() {
                    other.unlink_card(card_id, now);
                }
            }
            Ok(previous)
        })
        .await
    }

    async fn restore(&self, db: Database) -> Result<(), StorageError> {
        self.commit(move |current| {
            *current = db;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl CardRepository for DocumentStore {
    async fn load_cards(&self, ids: &[CardId]) -> Result<Vec<Card>, StorageError> {
        let guard = self.lock()?;
        Ok(ids
            .iter()
            .filter_map(|id| guard.cards.get(id).cloned())
            .collect())
    }

    async fn upsert_card(&self, deck_id: &DeckId, card: &Card) -> Result<(), StorageError> {
        let card = card.clone();
        let now = self.clock.now();
        self.commit(move |db| {
            let deck = db.decks.get_mut(deck_id).ok_or(StorageError::NotFound)?;
            deck.link_card(card.id().clone(), now);
            db.cards.insert(card.id().clone(), card);
            Ok(())
        })
        .await
    }

    async fn delete_card(&self, id: &CardId) -> Result<(), StorageError> {
        let now = self.clock.now();
        self.commit(|db| {
            db.cards.remove(id).ok_or(StorageError::NotFound)?;
            for deck in db.decks.values_mut() {
                deck.unlink_card(id, now);
            }
            Ok(())
        })
        .await
    }
}

impl StoreEvents for DocumentStore {
    fn revision(&self) -> StoreRevision {
        *self.revision.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<StoreRevision> {
        self.revision.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashdeck_core::time::{fixed_clock, fixed_now};

    fn store() -> DocumentStore {
        DocumentStore::in_memory(Database::seed()).with_clock(fixed_clock())
    }

    #[tokio::test]
    async fn load_cards_keeps_request_order_and_skips_unknown() {
        let store = store();
        let ids = [
            CardId::new("card_2"),
            CardId::new("missing"),
            CardId::new("card_1"),
        ];
        let cards = store.load_cards(&ids).await.unwrap();
        let loaded: Vec<_> = cards.iter().map(|c| c.id().as_str()).collect();
        assert_eq!(loaded, vec!["card_2", "card_1"]);
    }

    #[tokio::test]
    async fn mutations_bump_revision() {
        let store = store();
        let mut rx = store.subscribe();
        let before = store.revision();

        store.delete_card(&CardId::new("card_1")).await.unwrap();

        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), before.next());
        let deck = store.get_deck(&DeckId::new("deck_1")).await.unwrap();
        assert_eq!(deck.card_ids(), &[CardId::new("card_2")]);
    }

    #[tokio::test]
    async fn failed_mutation_keeps_revision() {
        let store = store();
        let before = store.revision();
        let err = store.delete_card(&CardId::new("nope")).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
        assert_eq!(store.revision(), before);
    }

    #[tokio::test]
    async fn upsert_card_links_into_deck() {
        let store = store();
        let deck_id = DeckId::new("deck_2");
        let card = Card::new(CardId::new("card_9"), "cell", "unit of life", fixed_now()).unwrap();
        store.upsert_card(&deck_id, &card).await.unwrap();

        let deck = store.get_deck(&deck_id).await.unwrap();
        assert!(deck.contains_card(card.id()));
        let loaded = store.load_cards(deck.card_ids()).await.unwrap();
        assert_eq!(loaded, vec![card]);
    }

    #[tokio::test]
    async fn list_decks_puts_pinned_first() {
        let store = store();
        let mut calculus = store.get_deck(&DeckId::new("deck_6")).await.unwrap();
        calculus.set_pinned(true, fixed_now());
        store.upsert_deck(&calculus).await.unwrap();

        let decks = store.list_decks().await.unwrap();
        assert_eq!(decks[0].name(), "Calculus");
        assert_eq!(decks[1].name(), "Biology");
    }

    #[tokio::test]
    async fn delete_deck_removes_its_cards_and_restore_brings_them_back() {
        let store = store();
        let mut rx = store.subscribe();
        let deck_id = DeckId::new("deck_1");

        let previous = store.delete_deck(&deck_id).await.unwrap();

        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();
        assert!(matches!(
            store.get_deck(&deck_id).await,
            Err(StorageError::NotFound)
        ));
        let cards = store
            .load_cards(&[CardId::new("card_1"), CardId::new("card_2")])
            .await
            .unwrap();
        assert!(cards.is_empty());

        store.restore(previous).await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(store.snapshot().unwrap(), Database::seed());
    }

    #[tokio::test]
    async fn delete_unknown_deck_is_not_found() {
        let store = store();
        let before = store.revision();
        let err = store.delete_deck(&DeckId::new("nope")).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
        assert_eq!(store.revision(), before);
    }
}
