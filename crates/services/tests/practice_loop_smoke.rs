use std::sync::Arc;

use flashdeck_core::model::{Card, CardId, DeckId, PracticePhase};
use flashdeck_core::time::{fixed_clock, fixed_now};
use services::{CardFilter, PracticeEngine, PracticeError, PracticeLoopService, StartOptions};
use storage::repository::{CardRepository, DeckRepository, StoreEvents};
use storage::{Database, DocumentStore};

fn service(store: &DocumentStore) -> PracticeLoopService {
    PracticeLoopService::new(
        fixed_clock(),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
    )
}

fn engine() -> PracticeEngine {
    PracticeEngine::new().with_start_options(StartOptions::default().with_shuffle(false))
}

#[tokio::test]
async fn seeded_french_deck_runs_to_completion() {
    let store = DocumentStore::in_memory(Database::seed());
    let loop_svc = service(&store);
    let mut engine = engine();
    let deck_id = DeckId::new("deck_1");

    let (deck, _) = loop_svc
        .start_practice(&mut engine, &deck_id, &CardFilter::all())
        .await
        .unwrap();
    assert_eq!(deck.valid_card_ids.len(), 2);

    while let Some(card_id) = engine.current_card_id(&deck_id).cloned() {
        let card = deck.cards.get(&card_id).unwrap();
        let side = engine.session(&deck_id).unwrap().answer_side();
        let outcome = engine
            .submit_answer(&deck_id, &card_id, &card.side(side).to_uppercase(), card.side(side))
            .unwrap();
        assert!(outcome.is_correct);
    }

    assert_eq!(engine.start_missed_round(&deck_id), Some(PracticePhase::Done));
    let opened = store.get_deck(&deck_id).await.unwrap();
    assert_eq!(opened.last_opened_at(), fixed_now());
}

#[tokio::test]
async fn empty_deck_cannot_start() {
    let store = DocumentStore::in_memory(Database::seed());
    let mut engine = engine();
    let err = service(&store)
        .start_practice(&mut engine, &DeckId::new("deck_2"), &CardFilter::all())
        .await
        .unwrap_err();
    assert!(matches!(err, PracticeError::Empty));
    assert!(engine.session(&DeckId::new("deck_2")).is_none());
}

#[tokio::test]
async fn unknown_deck_is_a_storage_error() {
    let store = DocumentStore::in_memory(Database::seed());
    let mut engine = engine();
    let err = service(&store)
        .start_practice(&mut engine, &DeckId::new("nope"), &CardFilter::all())
        .await
        .unwrap_err();
    assert!(matches!(err, PracticeError::Storage(_)));
}

#[tokio::test]
async fn deleting_a_card_rehydrates_the_session() {
    let store = DocumentStore::in_memory(Database::seed());
    let loop_svc = service(&store);
    let mut engine = engine();
    let deck_id = DeckId::new("deck_1");
    let mut revisions = store.subscribe();

    loop_svc
        .start_practice(&mut engine, &deck_id, &CardFilter::all())
        .await
        .unwrap();
    let _ = revisions.borrow_and_update();

    store.delete_card(&CardId::new("card_1")).await.unwrap();
    assert!(revisions.has_changed().unwrap());

    let sync = loop_svc
        .sync_deck(&mut engine, &deck_id, &CardFilter::all())
        .await
        .unwrap();
    assert!(sync.changed);
    assert_eq!(
        engine.current_card_id(&deck_id),
        Some(&CardId::new("card_2"))
    );

    let again = loop_svc
        .sync_deck(&mut engine, &deck_id, &CardFilter::all())
        .await
        .unwrap();
    assert!(!again.changed);
}

#[tokio::test]
async fn editing_text_keeps_the_session_untouched() {
    let store = DocumentStore::in_memory(Database::seed());
    let loop_svc = service(&store);
    let mut engine = engine();
    let deck_id = DeckId::new("deck_1");
    loop_svc
        .start_practice(&mut engine, &deck_id, &CardFilter::all())
        .await
        .unwrap();

    let edited = Card::new(CardId::new("card_1"), "salut", "hi", fixed_now()).unwrap();
    store.upsert_card(&deck_id, &edited).await.unwrap();

    let sync = loop_svc
        .sync_deck(&mut engine, &deck_id, &CardFilter::all())
        .await
        .unwrap();
    assert!(!sync.changed);
    let deck = sync.deck.expect("deck still exists");
    assert_eq!(deck.cards.get(&CardId::new("card_1")).unwrap().back(), "hi");
}

#[tokio::test]
async fn filter_narrows_practice_and_restart_uses_current_cards() {
    let store = DocumentStore::in_memory(Database::seed());
    let loop_svc = service(&store);
    let mut engine = engine();
    let deck_id = DeckId::new("deck_1");
    let filter = CardFilter::all().with_query("revoir");

    let (deck, first) = loop_svc
        .start_practice(&mut engine, &deck_id, &filter)
        .await
        .unwrap();
    assert_eq!(deck.valid_card_ids, vec![CardId::new("card_2")]);

    let (_, second) = loop_svc
        .restart_practice(&mut engine, &deck_id, &CardFilter::all())
        .await
        .unwrap();
    assert_ne!(first, second);
    assert_eq!(engine.progress(&deck_id).unwrap().total, 2);
}

#[tokio::test]
async fn deleted_deck_empties_the_session_instead_of_failing() {
    let store = DocumentStore::in_memory(Database::seed());
    let loop_svc = service(&store);
    let mut engine = engine();
    let deck_id = DeckId::new("deck_1");
    loop_svc
        .start_practice(&mut engine, &deck_id, &CardFilter::all())
        .await
        .unwrap();

    let previous = store.delete_deck(&deck_id).await.unwrap();

    let sync = loop_svc
        .sync_deck(&mut engine, &deck_id, &CardFilter::all())
        .await
        .expect("a missing deck is not an error");
    assert!(sync.deck.is_none());
    assert!(sync.changed);
    assert_eq!(engine.current_card_id(&deck_id), None);
    assert_eq!(
        engine.start_missed_round(&deck_id),
        Some(PracticePhase::Done)
    );

    store.restore(previous).await.unwrap();
    let restored = loop_svc
        .sync_deck(&mut engine, &deck_id, &CardFilter::all())
        .await
        .unwrap();
    assert_eq!(restored.deck.map(|deck| deck.valid_card_ids.len()), Some(2));
    assert!(!restored.changed);
}
