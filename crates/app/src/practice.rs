//! Practice loop state for one deck.
//!
//! Owns the engine, the active-card controller and the answer line, and
//! reacts to the three event sources the terminal multiplexes: key presses,
//! feedback delays running out, and store revisions. Store changes trigger a
//! resync so deleted or filtered-out cards leave the running session.
//! Failures end up in the status bar instead of ending the program.

use std::sync::Arc;

use flashdeck_core::model::{DeckId, PracticeSettings};
use ratatui::Frame;
use services::{
    CardFilter, CardIndex, Clock, PracticeDeck, PracticeEngine, PracticeError,
    PracticeLoopService, StartOptions,
};
use storage::repository::{Storage, StoreRevision};
use tokio::sync::watch;
use tokio::time::Instant;
use ui::{ActivePractice, AdvanceToken, FeedbackTimer, PracticeAction, PracticeInput, PracticeScreen};

use crate::command::Entry;
use crate::input::{InputOutcome, InputState, KeyInput};
use crate::view::{self, View};

/// What the terminal should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Render,
    Quiet,
    Quit,
}

pub struct PracticeLoop {
    storage: Storage,
    service: PracticeLoopService,
    engine: PracticeEngine,
    controller: ActivePractice,
    timer: FeedbackTimer,
    filter: CardFilter,
    deck: PracticeDeck,
    input: InputState,
    status: Option<String>,
    show_help: bool,
}

impl PracticeLoop {
    /// Load the deck and prepare an idle engine for it.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::Storage` if the deck cannot be loaded.
    pub async fn open(
        storage: Storage,
        deck_id: DeckId,
        filter: CardFilter,
        settings: PracticeSettings,
    ) -> Result<Self, PracticeError> {
        let service = PracticeLoopService::new(
            Clock::default(),
            Arc::clone(&storage.decks),
            Arc::clone(&storage.cards),
        );
        let deck = service.load_deck(&deck_id, &filter).await?;

        let mut engine = PracticeEngine::new().with_start_options(StartOptions::from(&settings));
        engine.set_active_deck(Some(deck_id.clone()));

        tracing::info!(
            %deck_id,
            cards = deck.cards.len(),
            valid = deck.valid_card_ids.len(),
            "deck opened"
        );

        Ok(Self {
            storage,
            service,
            engine,
            controller: ActivePractice::new(deck_id, &settings),
            timer: FeedbackTimer::new(),
            filter,
            deck,
            input: InputState::new(),
            status: None,
            show_help: false,
        })
    }

    pub fn revisions(&self) -> watch::Receiver<StoreRevision> {
        self.storage.events.subscribe()
    }

    /// Wait for the pending feedback delay, if any, to run out.
    pub async fn delay_elapsed(&mut self) -> Option<AdvanceToken> {
        self.timer.elapsed().await
    }

    pub fn draw(&self, frame: &mut Frame) {
        let screen = self.screen();
        view::render(
            frame,
            &View {
                deck_name: self.deck.deck.name(),
                screen: &screen,
                input: &self.input,
                status: self.status.as_deref(),
                show_help: self.show_help,
            },
        );
    }

    pub async fn on_key(&mut self, key: KeyInput) -> Flow {
        match self.input.handle_key(key) {
            InputOutcome::Unchanged => Flow::Quiet,
            InputOutcome::Edited => Flow::Render,
            InputOutcome::Quit => Flow::Quit,
            InputOutcome::Submitted(line) => self.on_line(&line).await,
        }
    }

    pub fn on_delay(&mut self, token: AdvanceToken) -> Flow {
        let actions = self.input(PracticeInput::DelayElapsed(token));
        if self.timer.apply(&actions) {
            Flow::Render
        } else {
            Flow::Quiet
        }
    }

    pub async fn on_store_changed(&mut self) -> Flow {
        let deck_id = self.deck_id();
        let sync = match self
            .service
            .sync_deck(&mut self.engine, &deck_id, &self.filter)
            .await
        {
            Ok(sync) => sync,
            Err(err) => {
                tracing::warn!(%deck_id, error = %err, "deck resync failed");
                self.status = Some(format!("Could not reload the deck: {err}"));
                return Flow::Render;
            }
        };

        let cards_changed = match sync.deck {
            Some(deck) => {
                let changed = deck.cards != self.deck.cards
                    || deck.valid_card_ids != self.deck.valid_card_ids;
                self.deck = deck;
                changed
            }
            None => {
                self.deck.cards = CardIndex::default();
                self.deck.valid_card_ids.clear();
                self.status = Some("This deck was deleted.".into());
                true
            }
        };
        self.session_changed();

        if sync.changed || cards_changed {
            tracing::debug!(%deck_id, rehydrated = sync.changed, "deck resynced");
            Flow::Render
        } else {
            Flow::Quiet
        }
    }

    pub fn log_exit(&self) {
        if let Some(session) = self.engine.session(self.controller.deck_id()) {
            tracing::info!(
                deck_id = %self.controller.deck_id(),
                phase = %session.phase(),
                "leaving practice"
            );
        }
    }

    fn deck_id(&self) -> DeckId {
        self.controller.deck_id().clone()
    }

    fn screen(&self) -> PracticeScreen {
        self.controller.screen(&self.engine, &self.deck)
    }

    fn input(&mut self, input: PracticeInput) -> Vec<PracticeAction> {
        self.controller
            .handle(&mut self.engine, &self.deck.cards, input, Instant::now())
    }

    fn session_changed(&mut self) {
        let actions = self.controller.on_session_changed(&mut self.engine);
        self.timer.apply(&actions);
    }

    fn report(&mut self, what: &str, err: &PracticeError) {
        tracing::warn!(deck_id = %self.controller.deck_id(), error = %err, "{what} failed");
        self.status = Some(format!("Could not {what}: {err}"));
    }

    /// The input line was cleared, so a submitted line always re-renders.
    async fn on_line(&mut self, line: &str) -> Flow {
        self.status = None;
        let entry = match Entry::parse(line) {
            Ok(entry) => entry,
            Err(err) => {
                self.status = Some(err.to_string());
                return Flow::Render;
            }
        };

        if entry == Entry::Help {
            self.show_help = !self.show_help;
            return Flow::Render;
        }
        self.show_help = false;

        match entry {
            Entry::Quit => return Flow::Quit,
            Entry::Help => {}
            Entry::Restart => self.restart().await,
            Entry::Delete => self.delete_current().await,
            Entry::End => self.send(PracticeInput::EndSession),
            Entry::Retry => self.send(PracticeInput::TryAgain),
            Entry::Skip => self.send(PracticeInput::SkipCard),
            Entry::Text(text) => self.send(PracticeInput::Submit(text)),
            Entry::Blank => match self.screen() {
                PracticeScreen::Start(vm) if vm.can_start => self.start().await,
                PracticeScreen::Start(_) | PracticeScreen::Completion(_) => {}
                PracticeScreen::Loading | PracticeScreen::Active(_) => {
                    self.send(PracticeInput::Continue);
                }
                PracticeScreen::RoundSummary(_) => {
                    let deck_id = self.deck_id();
                    self.engine.continue_from_summary(&deck_id);
                    self.session_changed();
                }
            },
        }
        Flow::Render
    }

    fn send(&mut self, input: PracticeInput) {
        let actions = self.input(input);
        self.timer.apply(&actions);
    }

    async fn reload(&mut self) {
        let deck_id = self.deck_id();
        match self.service.load_deck(&deck_id, &self.filter).await {
            Ok(deck) => self.deck = deck,
            Err(err) => self.report("reload the deck", &err),
        }
    }

    async fn start(&mut self) {
        let deck_id = self.deck_id();
        match self
            .service
            .start_practice(&mut self.engine, &deck_id, &self.filter)
            .await
        {
            Ok((deck, _)) => {
                self.deck = deck;
                self.session_changed();
            }
            Err(PracticeError::Empty) => self.reload().await,
            Err(err) => self.report("start practice", &err),
        }
    }

    async fn restart(&mut self) {
        let deck_id = self.deck_id();
        match self
            .service
            .restart_practice(&mut self.engine, &deck_id, &self.filter)
            .await
        {
            Ok((deck, _)) => self.deck = deck,
            Err(PracticeError::Empty) => self.reload().await,
            Err(err) => {
                self.report("restart practice", &err);
                return;
            }
        }
        self.session_changed();
    }

    /// Delete the card on screen. The resulting store revision resyncs the
    /// session.
    async fn delete_current(&mut self) {
        let deck_id = self.deck_id();
        let Some(card_id) = self.engine.current_card_id(&deck_id).cloned() else {
            self.status = Some("No card to delete.".into());
            return;
        };
        match self.storage.cards.delete_card(&card_id).await {
            Ok(()) => {
                tracing::info!(%deck_id, %card_id, "card deleted during practice");
                self.status = Some("Card deleted.".into());
            }
            Err(err) => self.report("delete the card", &PracticeError::Storage(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use flashdeck_core::model::{CardId, PracticePhase};
    use ratatui::{Terminal, backend::TestBackend};
    use storage::Database;
    use ui::vm::StageVm;

    use super::*;

    async fn french() -> PracticeLoop {
        PracticeLoop::open(
            Storage::in_memory(Database::seed()),
            DeckId::new("deck_1"),
            CardFilter::all(),
            PracticeSettings::default().with_shuffle(false),
        )
        .await
        .unwrap()
    }

    async fn type_line(practice: &mut PracticeLoop, line: &str) -> Flow {
        for c in line.chars() {
            practice.on_key(KeyInput::Char(c)).await;
        }
        practice.on_key(KeyInput::Enter).await
    }

    fn status_row(practice: &PracticeLoop) -> String {
        let mut terminal = Terminal::new(TestBackend::new(64, 18)).unwrap();
        terminal.draw(|frame| practice.draw(frame)).unwrap();
        let buffer = terminal.backend().buffer();
        let width = usize::from(buffer.area.width);
        buffer.content[buffer.content.len() - width..]
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    #[tokio::test]
    async fn typed_answer_is_graded_on_enter() {
        let mut practice = french().await;
        assert_eq!(practice.on_key(KeyInput::Enter).await, Flow::Render);
        assert_eq!(
            practice.engine.current_card_id(&DeckId::new("deck_1")),
            Some(&CardId::new("card_1"))
        );

        type_line(&mut practice, "Hello").await;
        match practice.screen() {
            PracticeScreen::Active(vm) => assert!(matches!(
                vm.stage,
                StageVm::Feedback {
                    was_correct: true,
                    ..
                }
            )),
            other => panic!("expected the card, got {other:?}"),
        }
        assert!(practice.input.buffer().is_empty());
    }

    #[tokio::test]
    async fn unknown_commands_and_help_use_the_status_bar() {
        let mut practice = french().await;
        assert_eq!(type_line(&mut practice, ":fly").await, Flow::Render);
        assert!(status_row(&practice).contains("unknown command :fly"));

        type_line(&mut practice, ":help").await;
        assert!(practice.show_help);
        assert!(practice.status.is_none());
        type_line(&mut practice, ":help").await;
        assert!(!practice.show_help);
    }

    #[tokio::test]
    async fn delete_without_a_card_is_reported() {
        let mut practice = french().await;
        type_line(&mut practice, ":delete").await;
        assert_eq!(practice.status.as_deref(), Some("No card to delete."));
    }

    #[tokio::test]
    async fn deleting_the_deck_keeps_the_loop_running() {
        let mut practice = french().await;
        practice.on_key(KeyInput::Enter).await;
        let deck_id = DeckId::new("deck_1");

        let previous = practice.storage.decks.delete_deck(&deck_id).await.unwrap();
        assert_eq!(practice.on_store_changed().await, Flow::Render);
        assert_eq!(practice.status.as_deref(), Some("This deck was deleted."));
        assert!(practice.deck.valid_card_ids.is_empty());
        assert!(practice.engine.current_card_id(&deck_id).is_none());
        assert!(!matches!(practice.screen(), PracticeScreen::Active(_)));

        assert_eq!(type_line(&mut practice, ":restart").await, Flow::Render);
        assert!(practice.status.as_deref().is_some_and(|s| s.starts_with("Could not")));

        practice.storage.decks.restore(previous).await.unwrap();
        practice.on_store_changed().await;
        assert_eq!(practice.deck.valid_card_ids.len(), 2);
        type_line(&mut practice, ":restart").await;
        assert_eq!(
            practice.engine.session(&deck_id).map(|s| s.phase()),
            Some(PracticePhase::Practice)
        );
    }

    #[tokio::test]
    async fn escape_quits() {
        let mut practice = french().await;
        assert_eq!(practice.on_key(KeyInput::Esc).await, Flow::Quit);
    }
}
