//! Active-card controller.
//!
//! Sequences one card presentation: answer, optional retry, feedback delay,
//! then the engine command that moves on. The controller never sleeps; it
//! asks the runtime to schedule delays through [`PracticeAction`] and is told
//! when they run out through [`PracticeInput::DelayElapsed`].
//!
//! Local state is keyed by the identity of the presented card (session, phase,
//! cursor and card id). When that identity changes for any reason, including
//! rehydration silently replacing the current card, local state is dropped
//! and any pending delay is cancelled.

use std::time::Duration;

use flashdeck_core::grading;
use flashdeck_core::model::{CardId, DeckId, PracticePhase, PracticeSettings, SessionId};
use services::{CardIndex, PracticeDeck, PracticeEngine};
use tokio::time::Instant;

use super::action::{AdvanceToken, PracticeAction};
use super::event::PracticeInput;
use crate::vm::{PracticeScreen, StageVm};

#[derive(Debug, Clone, PartialEq, Eq)]
struct PresentationKey {
    session_id: SessionId,
    phase: PracticePhase,
    index: usize,
    card_id: CardId,
}

/// Engine command run when feedback ends.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Commit {
    /// First attempt was right: record it and advance together.
    Submit {
        submitted: String,
        correct_answer: String,
    },
    /// The card was already penalised: advance without another tally.
    Advance,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingAdvance {
    token: AdvanceToken,
    was_correct: bool,
    submitted: String,
    commit: Commit,
    /// `Continue` is ignored before this instant.
    armed_at: Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Stage {
    Answering,
    RetryOffered { submitted: String },
    Retrying,
    Feedback(PendingAdvance),
}

/// Sans-IO controller for the active practice screen of one deck.
#[derive(Debug, Clone)]
pub struct ActivePractice {
    deck_id: DeckId,
    feedback_delay: Duration,
    skip_debounce: Duration,
    presentation: Option<PresentationKey>,
    stage: Stage,
    next_token: u64,
}

impl ActivePractice {
    #[must_use]
    pub fn new(deck_id: DeckId, settings: &PracticeSettings) -> Self {
        Self {
            deck_id,
            feedback_delay: settings.feedback_delay(),
            skip_debounce: settings.skip_debounce(),
            presentation: None,
            stage: Stage::Answering,
            next_token: 0,
        }
    }

    #[must_use]
    pub fn deck_id(&self) -> &DeckId {
        &self.deck_id
    }

    /// Token of the delay currently awaited, if any.
    #[must_use]
    pub fn pending_token(&self) -> Option<AdvanceToken> {
        match &self.stage {
            Stage::Feedback(pending) => Some(pending.token),
            _ => None,
        }
    }

    #[must_use]
    pub fn stage_vm(&self) -> StageVm {
        match &self.stage {
            Stage::Answering => StageVm::Answering { retrying: false },
            Stage::Retrying => StageVm::Answering { retrying: true },
            Stage::RetryOffered { submitted } => StageVm::RetryOffered {
                submitted: submitted.clone(),
            },
            Stage::Feedback(pending) => StageVm::Feedback {
                was_correct: pending.was_correct,
                submitted: pending.submitted.clone(),
                advance_after: self.feedback_delay,
            },
        }
    }

    /// Screen for the deck with this controller's answer stage applied.
    #[must_use]
    pub fn screen(&self, engine: &PracticeEngine, deck: &PracticeDeck) -> PracticeScreen {
        match PracticeScreen::from_session(deck, engine.session(&self.deck_id)) {
            PracticeScreen::Active(vm) if self.presentation_matches(&vm.card_id) => {
                PracticeScreen::Active(vm.with_stage(self.stage_vm()))
            }
            other => other,
        }
    }

    /// Reconcile with the engine after anything outside this controller
    /// changed the session (start, reset, rehydration).
    ///
    /// Runs the round completion check when the queue is already exhausted,
    /// since rehydration never changes the phase by itself.
    pub fn on_session_changed(&mut self, engine: &mut PracticeEngine) -> Vec<PracticeAction> {
        let mut actions = self.sync(engine);
        if self.finish_round_if_exhausted(engine) {
            actions.extend(self.sync(engine));
        }
        actions.push(PracticeAction::Render);
        actions
    }

    /// Process one input and return the side effects to perform.
    pub fn handle(
        &mut self,
        engine: &mut PracticeEngine,
        cards: &CardIndex,
        input: PracticeInput,
        now: Instant,
    ) -> Vec<PracticeAction> {
        let mut actions = self.sync(engine);

        match input {
            PracticeInput::Submit(text) => self.on_submit(engine, cards, text, now, &mut actions),
            PracticeInput::TryAgain => {
                if matches!(self.stage, Stage::RetryOffered { .. }) {
                    self.stage = Stage::Retrying;
                    actions.push(PracticeAction::Render);
                }
            }
            PracticeInput::SkipCard => {
                if matches!(self.stage, Stage::RetryOffered { .. }) {
                    self.commit(engine, Commit::Advance, &mut actions);
                }
            }
            PracticeInput::Continue => match &self.stage {
                Stage::Feedback(pending) if now >= pending.armed_at => {
                    let pending = pending.clone();
                    actions.push(PracticeAction::CancelAdvance {
                        token: pending.token,
                    });
                    self.commit(engine, pending.commit, &mut actions);
                }
                Stage::Feedback(_) => {
                    tracing::debug!(deck_id = %self.deck_id, "continue ignored during debounce");
                }
                _ => {}
            },
            PracticeInput::DelayElapsed(token) => match &self.stage {
                Stage::Feedback(pending) if pending.token == token => {
                    let commit = pending.commit.clone();
                    self.commit(engine, commit, &mut actions);
                }
                _ => {
                    tracing::debug!(deck_id = %self.deck_id, %token, "stale feedback delay ignored");
                }
            },
            PracticeInput::EndSession => {
                if let Some(token) = self.pending_token() {
                    actions.push(PracticeAction::CancelAdvance { token });
                }
                self.stage = Stage::Answering;
                engine.end_session(&self.deck_id);
                self.presentation = None;
                actions.push(PracticeAction::Render);
            }
        }

        actions
    }

    fn on_submit(
        &mut self,
        engine: &mut PracticeEngine,
        cards: &CardIndex,
        text: String,
        now: Instant,
        actions: &mut Vec<PracticeAction>,
    ) {
        if text.trim().is_empty() {
            return;
        }
        let retrying = match self.stage {
            Stage::Answering => false,
            Stage::Retrying => true,
            Stage::RetryOffered { .. } | Stage::Feedback(_) => return,
        };
        let Some(key) = self.presentation.clone() else {
            return;
        };
        let Some(session) = engine.session(&self.deck_id) else {
            return;
        };
        let Some(card) = cards.get(&key.card_id) else {
            tracing::debug!(deck_id = %self.deck_id, card_id = %key.card_id, "answer for unknown card ignored");
            return;
        };

        let correct_answer = card.side(session.answer_side()).to_string();
        let is_correct = grading::answers_match(&text, &correct_answer);

        if retrying {
            self.begin_feedback(is_correct, text, Commit::Advance, now, actions);
        } else if is_correct {
            let commit = Commit::Submit {
                submitted: text.clone(),
                correct_answer,
            };
            self.begin_feedback(true, text, commit, now, actions);
        } else if engine.mark_incorrect_without_advancing(&self.deck_id, &key.card_id) {
            self.stage = Stage::RetryOffered { submitted: text };
            actions.push(PracticeAction::Render);
        }
    }

    fn begin_feedback(
        &mut self,
        was_correct: bool,
        submitted: String,
        commit: Commit,
        now: Instant,
        actions: &mut Vec<PracticeAction>,
    ) {
        let token = AdvanceToken::new(self.next_token);
        self.next_token = self.next_token.wrapping_add(1);
        self.stage = Stage::Feedback(PendingAdvance {
            token,
            was_correct,
            submitted,
            commit,
            armed_at: now + self.skip_debounce,
        });
        actions.push(PracticeAction::ScheduleAdvance {
            token,
            after: self.feedback_delay,
        });
        actions.push(PracticeAction::Render);
    }

    /// Run the engine command for the presented card, then the round check.
    fn commit(&mut self, engine: &mut PracticeEngine, commit: Commit, actions: &mut Vec<PracticeAction>) {
        let Some(key) = self.presentation.clone() else {
            return;
        };
        self.stage = Stage::Answering;

        let applied = match commit {
            Commit::Submit {
                submitted,
                correct_answer,
            } => engine
                .submit_answer(&self.deck_id, &key.card_id, &submitted, &correct_answer)
                .is_some(),
            Commit::Advance => engine.advance_past(&self.deck_id, &key.card_id),
        };
        if applied {
            self.finish_round_if_exhausted(engine);
        }

        actions.extend(self.sync(engine));
        actions.push(PracticeAction::Render);
    }

    fn finish_round_if_exhausted(&self, engine: &mut PracticeEngine) -> bool {
        let exhausted = engine
            .session(&self.deck_id)
            .is_some_and(|s| s.phase().is_active() && s.is_round_exhausted());
        exhausted && engine.start_missed_round(&self.deck_id).is_some()
    }

    /// Track the presented card; drop local state if it changed.
    fn sync(&mut self, engine: &PracticeEngine) -> Vec<PracticeAction> {
        let key = engine.session(&self.deck_id).and_then(|session| {
            let card_id = session.current_card_id()?;
            session.phase().is_active().then(|| PresentationKey {
                session_id: session.session_id(),
                phase: session.phase(),
                index: session.index(),
                card_id: card_id.clone(),
            })
        });

        if key == self.presentation {
            return Vec::new();
        }

        let mut actions = Vec::new();
        if let Some(token) = self.pending_token() {
            tracing::debug!(deck_id = %self.deck_id, %token, "presented card changed, cancelling feedback");
            actions.push(PracticeAction::CancelAdvance { token });
        }
        self.stage = Stage::Answering;
        self.presentation = key;
        actions
    }

    fn presentation_matches(&self, card_id: &CardId) -> bool {
        self.presentation
            .as_ref()
            .is_some_and(|key| &key.card_id == card_id)
    }
}
