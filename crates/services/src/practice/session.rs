use std::collections::{HashMap, HashSet};

use flashdeck_core::model::{
    CardId, CardResult, CardSide, DeckId, PracticePhase, PracticeSettings, RoundStats, SessionId,
};

use super::plan::build_queue;
use super::progress::PracticeProgress;
use crate::error::TransitionError;

//
// ─── START OPTIONS ─────────────────────────────────────────────────────────────
//

/// How a fresh session is laid out.
///
/// The answer side is always the opposite of the prompt side, so the two can
/// never coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartOptions {
    prompt_side: CardSide,
    shuffle: bool,
}

impl Default for StartOptions {
    fn default() -> Self {
        Self {
            prompt_side: CardSide::Front,
            shuffle: true,
        }
    }
}

impl From<&PracticeSettings> for StartOptions {
    fn from(settings: &PracticeSettings) -> Self {
        Self::new(settings.prompt_side(), settings.shuffle())
    }
}

impl StartOptions {
    #[must_use]
    pub fn new(prompt_side: CardSide, shuffle: bool) -> Self {
        Self {
            prompt_side,
            shuffle,
        }
    }

    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    #[must_use]
    pub fn prompt_side(&self) -> CardSide {
        self.prompt_side
    }

    #[must_use]
    pub fn answer_side(&self) -> CardSide {
        self.prompt_side.opposite()
    }

    #[must_use]
    pub fn shuffle(&self) -> bool {
        self.shuffle
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One practice run over a deck.
///
/// Every command is a pure transform: it reads `&self` and returns the next
/// session value, or a `TransitionError` describing why nothing changed.
/// Per-round fields (`queue`, `index`, the missed list and the tallies) are
/// replaced wholesale when a missed round begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeSession {
    deck_id: DeckId,
    session_id: SessionId,
    options: StartOptions,
    phase: PracticePhase,
    queue: Vec<CardId>,
    index: usize,
    missed_set: HashSet<CardId>,
    missed_order: Vec<CardId>,
    results_by_card_id: HashMap<CardId, CardResult>,
    retry_pending: Option<CardId>,
}

impl PracticeSession {
    /// Begin a new run with a fresh session id.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::EmptyQueue` when `card_ids` is empty.
    pub fn start(
        deck_id: DeckId,
        card_ids: &[CardId],
        options: StartOptions,
    ) -> Result<Self, TransitionError> {
        let queue = build_queue(card_ids, options.shuffle());
        if queue.is_empty() {
            return Err(TransitionError::EmptyQueue);
        }

        Ok(Self {
            deck_id,
            session_id: SessionId::generate(),
            options,
            phase: PracticePhase::All,
            queue,
            index: 0,
            missed_set: HashSet::new(),
            missed_order: Vec::new(),
            results_by_card_id: HashMap::new(),
            retry_pending: None,
        })
    }

    #[must_use]
    pub fn deck_id(&self) -> &DeckId {
        &self.deck_id
    }

    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    #[must_use]
    pub fn options(&self) -> StartOptions {
        self.options
    }

    #[must_use]
    pub fn prompt_side(&self) -> CardSide {
        self.options.prompt_side()
    }

    #[must_use]
    pub fn answer_side(&self) -> CardSide {
        self.options.answer_side()
    }

    #[must_use]
    pub fn phase(&self) -> PracticePhase {
        self.phase
    }

    #[must_use]
    pub fn queue(&self) -> &[CardId] {
        &self.queue
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Cards missed this round, in first-miss order.
    #[must_use]
    pub fn missed_order(&self) -> &[CardId] {
        &self.missed_order
    }

    #[must_use]
    pub fn is_missed(&self, card_id: &CardId) -> bool {
        self.missed_set.contains(card_id)
    }

    #[must_use]
    pub fn results(&self) -> &HashMap<CardId, CardResult> {
        &self.results_by_card_id
    }

    #[must_use]
    pub fn result_for(&self, card_id: &CardId) -> CardResult {
        self.results_by_card_id
            .get(card_id)
            .copied()
            .unwrap_or_default()
    }

    /// Card penalised by `mark_incorrect` and still waiting for its retry.
    #[must_use]
    pub fn retry_pending(&self) -> Option<&CardId> {
        self.retry_pending.as_ref()
    }

    #[must_use]
    pub fn round_stats(&self) -> RoundStats {
        RoundStats::from_results(self.results_by_card_id.values())
    }

    #[must_use]
    pub fn progress(&self) -> PracticeProgress {
        PracticeProgress {
            current: self.index + 1,
            total: self.queue.len(),
            phase: self.phase,
        }
    }

    #[must_use]
    pub fn current_card_id(&self) -> Option<&CardId> {
        self.queue.get(self.index)
    }

    #[must_use]
    pub fn is_round_exhausted(&self) -> bool {
        self.index >= self.queue.len()
    }

    /// Structural invariants that every reachable session satisfies.
    #[must_use]
    pub fn invariants_hold(&self) -> bool {
        let index_in_bounds = self.index <= self.queue.len();
        let missed_unique = self.missed_order.len() == self.missed_set.len();
        let missed_agree = self
            .missed_order
            .iter()
            .all(|id| self.missed_set.contains(id));
        let pending_is_current = self
            .retry_pending
            .as_ref()
            .is_none_or(|id| self.current_card_id() == Some(id));
        index_in_bounds && missed_unique && missed_agree && pending_is_current
    }

    //
    // ─── COMMANDS ──────────────────────────────────────────────────────────────
    //

    /// Accept the graded answer for the current card and move past it.
    ///
    /// # Errors
    ///
    /// Fails when the session is not answering, `card_id` is not the current
    /// card, or the card is waiting for its retry.
    pub fn submit(&self, card_id: &CardId, is_correct: bool) -> Result<Self, TransitionError> {
        self.ensure_current(card_id)?;
        if self.retry_pending.as_ref() == Some(card_id) {
            return Err(TransitionError::RetryPending(card_id.clone()));
        }

        let mut next = self.clone();
        next.record(card_id, is_correct);
        next.index += 1;
        Ok(next)
    }

    /// Record one wrong attempt for the current card without moving on.
    ///
    /// # Errors
    ///
    /// Fails when the session is not answering, `card_id` is not the current
    /// card, or it was already penalised for this presentation.
    pub fn mark_incorrect(&self, card_id: &CardId) -> Result<Self, TransitionError> {
        self.ensure_current(card_id)?;
        if self.retry_pending.as_ref() == Some(card_id) {
            return Err(TransitionError::AlreadyPenalized(card_id.clone()));
        }

        let mut next = self.clone();
        next.record(card_id, false);
        next.retry_pending = Some(card_id.clone());
        Ok(next)
    }

    /// Move past the current card without touching tallies.
    ///
    /// With `expected`, the move only happens if that card is still current.
    ///
    /// # Errors
    ///
    /// Fails when the session is not answering, the round is exhausted, or
    /// `expected` names another card.
    pub fn advance(&self, expected: Option<&CardId>) -> Result<Self, TransitionError> {
        match expected {
            Some(card_id) => self.ensure_current(card_id)?,
            None => {
                self.ensure_answering()?;
                if self.is_round_exhausted() {
                    return Err(TransitionError::RoundExhausted);
                }
            }
        }

        let mut next = self.clone();
        next.index += 1;
        next.retry_pending = None;
        Ok(next)
    }

    /// Close an exhausted round: `Done` when nothing was missed, otherwise
    /// `Summary` with the round's statistics intact.
    ///
    /// # Errors
    ///
    /// Fails when the session is not answering or cards remain in the round.
    pub fn start_missed_round(&self) -> Result<Self, TransitionError> {
        self.ensure_answering()?;
        if !self.is_round_exhausted() {
            return Err(TransitionError::RoundInProgress);
        }

        let mut next = self.clone();
        next.retry_pending = None;
        next.phase = if self.missed_order.is_empty() {
            PracticePhase::Done
        } else {
            PracticePhase::Summary
        };
        Ok(next)
    }

    /// Start a missed round from the summary screen.
    ///
    /// The new queue holds exactly the cards missed last round. If rehydration
    /// removed all of them, the session finishes instead.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::WrongPhase` outside `Summary`.
    pub fn continue_from_summary(&self, shuffle: bool) -> Result<Self, TransitionError> {
        if self.phase != PracticePhase::Summary {
            return Err(TransitionError::WrongPhase(self.phase));
        }

        let mut next = self.clone();
        if self.missed_order.is_empty() {
            next.phase = PracticePhase::Done;
            return Ok(next);
        }

        next.phase = PracticePhase::Missed;
        next.queue = build_queue(&self.missed_order, shuffle);
        next.index = 0;
        next.missed_set.clear();
        next.missed_order.clear();
        next.results_by_card_id.clear();
        next.retry_pending = None;
        Ok(next)
    }

    /// Finish the run from any phase, keeping partial statistics.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::WrongPhase` if the session is already done.
    pub fn end(&self) -> Result<Self, TransitionError> {
        if self.phase == PracticePhase::Done {
            return Err(TransitionError::WrongPhase(self.phase));
        }
        let mut next = self.clone();
        next.phase = PracticePhase::Done;
        next.retry_pending = None;
        Ok(next)
    }

    /// Restrict the session to `valid_card_ids`.
    ///
    /// Keeps the relative order of the queue and the missed list, and clamps
    /// the cursor to the shorter queue. Returns `None` when nothing would
    /// change. Never changes the phase.
    #[must_use]
    pub fn rehydrate(&self, valid_card_ids: &[CardId]) -> Option<Self> {
        let valid: HashSet<&CardId> = valid_card_ids.iter().collect();

        let queue: Vec<CardId> = self
            .queue
            .iter()
            .filter(|id| valid.contains(id))
            .cloned()
            .collect();
        let missed_order: Vec<CardId> = self
            .missed_order
            .iter()
            .filter(|id| valid.contains(id))
            .cloned()
            .collect();
        let results_by_card_id: HashMap<CardId, CardResult> = self
            .results_by_card_id
            .iter()
            .filter(|(id, _)| valid.contains(id))
            .map(|(id, result)| (id.clone(), *result))
            .collect();
        let index = self.index.min(queue.len());

        if queue == self.queue
            && missed_order == self.missed_order
            && results_by_card_id == self.results_by_card_id
            && index == self.index
        {
            return None;
        }

        let mut next = self.clone();
        next.missed_set = missed_order.iter().cloned().collect();
        next.queue = queue;
        next.missed_order = missed_order;
        next.results_by_card_id = results_by_card_id;
        next.index = index;
        next.retry_pending = self
            .retry_pending
            .clone()
            .filter(|id| next.current_card_id() == Some(id));
        Some(next)
    }

    fn ensure_answering(&self) -> Result<(), TransitionError> {
        if self.phase.is_active() {
            Ok(())
        } else {
            Err(TransitionError::WrongPhase(self.phase))
        }
    }

    fn ensure_current(&self, card_id: &CardId) -> Result<(), TransitionError> {
        self.ensure_answering()?;
        match self.current_card_id() {
            None => Err(TransitionError::RoundExhausted),
            Some(current) if current != card_id => Err(TransitionError::StaleCard(card_id.clone())),
            Some(_) => Ok(()),
        }
    }

    fn record(&mut self, card_id: &CardId, is_correct: bool) {
        let entry = self.results_by_card_id.entry(card_id.clone()).or_default();
        *entry = entry.record(is_correct);

        if !is_correct && self.missed_set.insert(card_id.clone()) {
            self.missed_order.push(card_id.clone());
        }
    }
}
