use flashdeck_core::grading::normalize;
use flashdeck_core::model::{CardId, DeckId, PracticePhase};
use services::{PracticeEngine, PracticeProgress, StartOptions};

fn ids(raw: &[&str]) -> Vec<CardId> {
    raw.iter().map(|id| CardId::new(*id)).collect()
}

fn engine() -> PracticeEngine {
    PracticeEngine::new().with_start_options(StartOptions::default().with_shuffle(false))
}

fn assert_invariants(engine: &PracticeEngine, deck: &DeckId) {
    if let Some(session) = engine.session(deck) {
        assert!(session.index() <= session.queue().len());
        assert!(session.invariants_hold());
    }
}

/// Answer whatever card is current, right or wrong.
fn answer(engine: &mut PracticeEngine, deck: &DeckId, correct: bool) {
    let card = engine.current_card_id(deck).cloned().expect("current card");
    let submitted = if correct { "right" } else { "wrong" };
    engine
        .submit_answer(deck, &card, submitted, "right")
        .expect("answer accepted");
    assert_invariants(engine, deck);
}

#[test]
fn normalization_ignores_case_and_spacing() {
    assert_eq!(normalize("  Bonjour   le Monde "), normalize("bonjour le monde"));
}

#[test]
fn empty_start_leaves_deck_without_session() {
    let mut engine = engine();
    let deck = DeckId::new("deck_1");
    assert!(engine.start_session(deck.clone(), &[]).is_none());
    assert!(engine.session(&deck).is_none());
    assert!(engine.active_deck_id().is_none());
}

#[test]
fn one_miss_out_of_three_goes_through_summary() {
    let mut engine = engine();
    let deck = DeckId::new("deck_1");
    engine.start_session(deck.clone(), &ids(&["a", "b", "c"]));

    answer(&mut engine, &deck, true);
    answer(&mut engine, &deck, false);
    answer(&mut engine, &deck, true);

    let session = engine.session(&deck).unwrap();
    assert_eq!(session.index(), 3);
    assert_eq!(session.queue().len(), 3);

    assert_eq!(engine.start_missed_round(&deck), Some(PracticePhase::Summary));
    let stats = engine.round_stats(&deck).unwrap();
    assert_eq!((stats.correct, stats.wrong), (2, 1));

    assert_eq!(engine.continue_from_summary(&deck), Some(PracticePhase::Missed));
    let session = engine.session(&deck).unwrap();
    assert_eq!(session.queue(), ids(&["b"]).as_slice());
    assert_eq!(session.index(), 0);
    assert_invariants(&engine, &deck);
}

#[test]
fn clean_round_finishes_without_summary() {
    let mut engine = engine();
    let deck = DeckId::new("deck_1");
    engine.start_session(deck.clone(), &ids(&["a", "b"]));

    answer(&mut engine, &deck, true);
    answer(&mut engine, &deck, true);

    assert_eq!(engine.start_missed_round(&deck), Some(PracticePhase::Done));
    let card = CardId::new("a");
    assert!(engine.submit_answer(&deck, &card, "right", "right").is_none());
}

#[test]
fn repeated_wrong_answers_miss_once() {
    let mut engine = engine();
    let deck = DeckId::new("deck_1");
    let card = CardId::new("a");
    engine.start_session(deck.clone(), &ids(&["a", "b"]));

    assert!(engine.mark_incorrect_without_advancing(&deck, &card));
    assert!(!engine.mark_incorrect_without_advancing(&deck, &card));
    assert!(engine.submit_answer(&deck, &card, "wrong", "right").is_none());
    assert!(engine.advance_past(&deck, &card));

    let session = engine.session(&deck).unwrap();
    assert_eq!(session.missed_order(), ids(&["a"]).as_slice());
    assert_eq!(session.result_for(&card).wrong, 1);
    assert_eq!(session.current_card_id(), Some(&CardId::new("b")));
}

#[test]
fn correct_answers_never_enter_missed_list() {
    let mut engine = engine();
    let deck = DeckId::new("deck_1");
    engine.start_session(deck.clone(), &ids(&["a", "b", "c", "d"]));
    for _ in 0..4 {
        answer(&mut engine, &deck, true);
    }
    assert!(engine.session(&deck).unwrap().missed_order().is_empty());
}

#[test]
fn missed_rounds_repeat_until_clean() {
    let mut engine = engine();
    let deck = DeckId::new("deck_1");
    engine.start_session(deck.clone(), &ids(&["a", "b"]));

    answer(&mut engine, &deck, false);
    answer(&mut engine, &deck, false);
    engine.start_missed_round(&deck);
    engine.continue_from_summary(&deck);

    answer(&mut engine, &deck, true);
    answer(&mut engine, &deck, false);
    assert_eq!(engine.start_missed_round(&deck), Some(PracticePhase::Summary));
    engine.continue_from_summary(&deck);
    assert_eq!(engine.session(&deck).unwrap().queue(), ids(&["b"]).as_slice());

    answer(&mut engine, &deck, true);
    assert_eq!(engine.start_missed_round(&deck), Some(PracticePhase::Done));
}

#[test]
fn rehydrating_away_the_last_card_clamps_index() {
    let mut engine = engine();
    let deck = DeckId::new("deck_1");
    engine.start_session(deck.clone(), &ids(&["a", "b"]));
    answer(&mut engine, &deck, false);

    assert!(engine.rehydrate_session(&deck, &ids(&["a"])));
    let session = engine.session(&deck).unwrap();
    assert_eq!(session.queue(), ids(&["a"]).as_slice());
    assert_eq!(session.index(), 1);
    assert_eq!(session.phase(), PracticePhase::All);

    assert_eq!(engine.start_missed_round(&deck), Some(PracticePhase::Summary));
}

#[test]
fn rehydrating_to_nothing_finishes_on_completion_check() {
    let mut engine = engine();
    let deck = DeckId::new("deck_1");
    engine.start_session(deck.clone(), &ids(&["a"]));

    assert!(engine.rehydrate_session(&deck, &[]));
    let session = engine.session(&deck).unwrap();
    assert!(session.queue().is_empty());
    assert_eq!(session.index(), 0);
    assert_invariants(&engine, &deck);

    assert_eq!(engine.start_missed_round(&deck), Some(PracticePhase::Done));
}

#[test]
fn reset_restarts_progress() {
    let mut engine = engine();
    let deck = DeckId::new("deck_1");
    let first = engine.start_session(deck.clone(), &ids(&["a", "b", "c"])).unwrap();
    answer(&mut engine, &deck, true);
    engine.end_session(&deck);

    let second = engine.reset_session(&deck, &ids(&["a", "b", "c"])).unwrap();
    assert_ne!(first, second);
    assert_eq!(
        engine.progress(&deck),
        Some(PracticeProgress {
            current: 1,
            total: 3,
            phase: PracticePhase::All,
        })
    );
}

#[test]
fn end_session_keeps_partial_stats() {
    let mut engine = engine();
    let deck = DeckId::new("deck_1");
    engine.start_session(deck.clone(), &ids(&["a", "b", "c"]));
    answer(&mut engine, &deck, false);

    assert!(engine.end_session(&deck));
    assert!(!engine.end_session(&deck));
    let session = engine.session(&deck).unwrap();
    assert_eq!(session.phase(), PracticePhase::Done);
    assert_eq!(session.round_stats().wrong, 1);
}
