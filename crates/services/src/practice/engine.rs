use std::collections::HashMap;

use flashdeck_core::grading;
use flashdeck_core::model::{CardId, DeckId, PracticePhase, RoundStats, SessionId};

use super::progress::PracticeProgress;
use super::session::{PracticeSession, StartOptions};
use crate::error::TransitionError;

/// Result of grading a submission with `submit_answer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    /// The submission after normalization.
    pub normalized: String,
    /// True when the answered card was the last one of the round.
    pub round_complete: bool,
}

/// Owns every practice session, one per deck.
///
/// Commands are addressed by deck. A command that cannot apply (no session,
/// wrong phase, stale card) leaves the session untouched and reports that
/// through its return value; nothing here panics or blocks.
#[derive(Debug, Clone, Default)]
pub struct PracticeEngine {
    sessions: HashMap<DeckId, PracticeSession>,
    active_deck_id: Option<DeckId>,
    start_options: StartOptions,
}

impl PracticeEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options used by `start_session` and `reset_session`.
    #[must_use]
    pub fn with_start_options(mut self, options: StartOptions) -> Self {
        self.start_options = options;
        self
    }

    #[must_use]
    pub fn start_options(&self) -> StartOptions {
        self.start_options
    }

    //
    // ─── QUERIES ───────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn session(&self, deck_id: &DeckId) -> Option<&PracticeSession> {
        self.sessions.get(deck_id)
    }

    /// Deck that last started a session. Used for UI focus only.
    #[must_use]
    pub fn active_deck_id(&self) -> Option<&DeckId> {
        self.active_deck_id.as_ref()
    }

    pub fn set_active_deck(&mut self, deck_id: Option<DeckId>) {
        self.active_deck_id = deck_id;
    }

    #[must_use]
    pub fn active_session(&self) -> Option<&PracticeSession> {
        self.active_deck_id
            .as_ref()
            .and_then(|deck_id| self.sessions.get(deck_id))
    }

    #[must_use]
    pub fn progress(&self, deck_id: &DeckId) -> Option<PracticeProgress> {
        self.session(deck_id).map(PracticeSession::progress)
    }

    #[must_use]
    pub fn current_card_id(&self, deck_id: &DeckId) -> Option<&CardId> {
        self.session(deck_id)
            .and_then(PracticeSession::current_card_id)
    }

    #[must_use]
    pub fn round_stats(&self, deck_id: &DeckId) -> Option<RoundStats> {
        self.session(deck_id).map(PracticeSession::round_stats)
    }

    //
    // ─── COMMANDS ──────────────────────────────────────────────────────────────
    //

    /// Start a fresh session with the engine's default options.
    ///
    /// Returns `None` and leaves any existing session alone when `card_ids`
    /// is empty.
    pub fn start_session(&mut self, deck_id: DeckId, card_ids: &[CardId]) -> Option<SessionId> {
        self.start_session_with(deck_id, card_ids, self.start_options)
    }

    pub fn start_session_with(
        &mut self,
        deck_id: DeckId,
        card_ids: &[CardId],
        options: StartOptions,
    ) -> Option<SessionId> {
        match PracticeSession::start(deck_id.clone(), card_ids, options) {
            Ok(session) => {
                let session_id = session.session_id();
                tracing::info!(
                    deck_id = %deck_id,
                    session_id = %session_id,
                    cards = session.queue().len(),
                    prompt = %options.prompt_side(),
                    "practice session started"
                );
                self.sessions.insert(deck_id.clone(), session);
                self.active_deck_id = Some(deck_id);
                Some(session_id)
            }
            Err(err) => {
                tracing::debug!(deck_id = %deck_id, error = %err, "start_session ignored");
                None
            }
        }
    }

    /// Grade `submitted` against `correct_answer` and accept it for `card_id`.
    ///
    /// Returns `None` when the command does not apply.
    pub fn submit_answer(
        &mut self,
        deck_id: &DeckId,
        card_id: &CardId,
        submitted: &str,
        correct_answer: &str,
    ) -> Option<AnswerOutcome> {
        let is_correct = grading::answers_match(submitted, correct_answer);
        let session = self
            .apply(deck_id, "submit_answer", |s| s.submit(card_id, is_correct))
            .ok()?;

        Some(AnswerOutcome {
            is_correct,
            normalized: grading::normalize(submitted),
            round_complete: session.is_round_exhausted(),
        })
    }

    /// Penalise the current card once and keep it current for a retry.
    pub fn mark_incorrect_without_advancing(&mut self, deck_id: &DeckId, card_id: &CardId) -> bool {
        self.apply(deck_id, "mark_incorrect_without_advancing", |s| {
            s.mark_incorrect(card_id)
        })
        .is_ok()
    }

    /// Move to the next card without recording anything.
    pub fn advance_to_next_card(&mut self, deck_id: &DeckId) -> bool {
        self.apply(deck_id, "advance_to_next_card", |s| s.advance(None))
            .is_ok()
    }

    /// Like `advance_to_next_card`, but only while `card_id` is still current.
    pub fn advance_past(&mut self, deck_id: &DeckId, card_id: &CardId) -> bool {
        self.apply(deck_id, "advance_past", |s| s.advance(Some(card_id)))
            .is_ok()
    }

    /// Round completion check. Returns the phase it moved to.
    pub fn start_missed_round(&mut self, deck_id: &DeckId) -> Option<PracticePhase> {
        let session = self
            .apply(deck_id, "start_missed_round", PracticeSession::start_missed_round)
            .ok()?;
        let stats = session.round_stats();
        tracing::info!(
            deck_id = %deck_id,
            phase = %session.phase(),
            correct = stats.correct,
            wrong = stats.wrong,
            missed = session.missed_order().len(),
            "practice round finished"
        );
        Some(session.phase())
    }

    /// Begin the next missed round, shuffled if the session was started so.
    pub fn continue_from_summary(&mut self, deck_id: &DeckId) -> Option<PracticePhase> {
        let session = self
            .apply(deck_id, "continue_from_summary", |s| {
                s.continue_from_summary(s.options().shuffle())
            })
            .ok()?;
        tracing::info!(
            deck_id = %deck_id,
            phase = %session.phase(),
            cards = session.queue().len(),
            "practice continued from summary"
        );
        Some(session.phase())
    }

    /// Finish the session from any phase. No-op without a session.
    pub fn end_session(&mut self, deck_id: &DeckId) -> bool {
        let Ok(session) = self.apply(deck_id, "end_session", PracticeSession::end) else {
            return false;
        };
        tracing::info!(deck_id = %deck_id, session_id = %session.session_id(), "practice session ended");
        true
    }

    /// Drop the deck's session and start over with `card_ids`.
    ///
    /// The prompt side of the dropped session carries over. With no card ids
    /// the deck is simply left without a session.
    pub fn reset_session(&mut self, deck_id: &DeckId, card_ids: &[CardId]) -> Option<SessionId> {
        let previous = self.sessions.remove(deck_id);
        if self.active_deck_id.as_ref() == Some(deck_id) {
            self.active_deck_id = None;
        }

        let options = previous.map_or(self.start_options, |s| {
            StartOptions::new(s.prompt_side(), self.start_options.shuffle())
        });
        self.start_session_with(deck_id.clone(), card_ids, options)
    }

    /// Reconcile the session with the deck's currently valid cards.
    ///
    /// Returns `true` only if the session actually changed.
    pub fn rehydrate_session(&mut self, deck_id: &DeckId, valid_card_ids: &[CardId]) -> bool {
        let Some(session) = self.sessions.get_mut(deck_id) else {
            return false;
        };
        let Some(next) = session.rehydrate(valid_card_ids) else {
            return false;
        };
        tracing::debug!(
            deck_id = %deck_id,
            queue = next.queue().len(),
            index = next.index(),
            missed = next.missed_order().len(),
            "practice session rehydrated"
        );
        *session = next;
        true
    }

    /// Compute the next session from the current one and commit it, or log
    /// why the command was ignored.
    fn apply(
        &mut self,
        deck_id: &DeckId,
        command: &'static str,
        transform: impl FnOnce(&PracticeSession) -> Result<PracticeSession, TransitionError>,
    ) -> Result<&PracticeSession, TransitionError> {
        let result = match self.sessions.get_mut(deck_id) {
            None => Err(TransitionError::NoSession),
            Some(session) => transform(session).map(|next| {
                *session = next;
            }),
        };

        match result {
            Ok(()) => self.sessions.get(deck_id).ok_or(TransitionError::NoSession),
            Err(err) => {
                tracing::debug!(deck_id = %deck_id, command, error = %err, "practice command ignored");
                Err(err)
            }
        }
    }
}
