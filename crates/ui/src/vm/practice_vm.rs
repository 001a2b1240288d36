use std::time::Duration;

use flashdeck_core::model::{CardId, PracticePhase, RoundStats};
use services::{PracticeDeck, PracticeSession};

#[derive(Clone, Debug, PartialEq)]
pub enum PracticeScreen {
    Start(StartScreenVm),
    /// Active phase, but the current card cannot be shown yet.
    Loading,
    Active(ActiveCardVm),
    RoundSummary(RoundSummaryVm),
    Completion(CompletionVm),
}

impl PracticeScreen {
    /// Pick the screen for the deck's session. No session means the start
    /// screen.
    #[must_use]
    pub fn from_session(deck: &PracticeDeck, session: Option<&PracticeSession>) -> Self {
        let Some(session) = session else {
            return Self::Start(map_start_screen(deck));
        };

        match session.phase() {
            PracticePhase::All | PracticePhase::Missed => {
                map_active_card(deck, session).map_or(Self::Loading, Self::Active)
            }
            PracticePhase::Summary => Self::RoundSummary(map_round_summary(session)),
            PracticePhase::Done => Self::Completion(map_completion(session)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StartScreenVm {
    pub deck_name: String,
    pub card_count_label: String,
    pub hint: Option<String>,
    pub can_start: bool,
}

#[must_use]
pub fn map_start_screen(deck: &PracticeDeck) -> StartScreenVm {
    let count = deck.valid_card_ids.len();
    let card_count_label = match count {
        0 => "No cards available to practice".to_string(),
        1 => "1 card ready".to_string(),
        n => format!("{n} cards ready"),
    };
    let hint = (count == 0).then(|| {
        "Add some cards to this deck or adjust your search/filter to begin practicing.".to_string()
    });

    StartScreenVm {
        deck_name: deck.deck.name().to_string(),
        card_count_label,
        hint,
        can_start: count > 0,
    }
}

/// What the answer area shows for the current card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageVm {
    Answering { retrying: bool },
    RetryOffered { submitted: String },
    Feedback {
        was_correct: bool,
        submitted: String,
        /// Time until the card advances without input.
        advance_after: Duration,
    },
}

impl StageVm {
    #[must_use]
    pub fn reveals_answer(&self) -> bool {
        !matches!(self, Self::Answering { .. })
    }

    /// Countdown notice shown while feedback is on screen.
    #[must_use]
    pub fn advance_label(&self) -> Option<String> {
        match self {
            Self::Feedback { advance_after, .. } => Some(format!(
                "Moving to next card in {:.1}s...",
                advance_after.as_secs_f64()
            )),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveCardVm {
    pub card_id: CardId,
    pub phase_label: &'static str,
    pub progress_label: String,
    pub prompt: String,
    pub correct_answer: String,
    pub stage: StageVm,
}

impl ActiveCardVm {
    #[must_use]
    pub fn with_stage(mut self, stage: StageVm) -> Self {
        self.stage = stage;
        self
    }
}

#[must_use]
pub fn map_active_card(deck: &PracticeDeck, session: &PracticeSession) -> Option<ActiveCardVm> {
    let card_id = session.current_card_id()?;
    let card = deck.cards.get(card_id)?;
    let progress = session.progress();

    let phase_label = if session.phase() == PracticePhase::All {
        "Practice"
    } else {
        "Missed Cards"
    };

    Some(ActiveCardVm {
        card_id: card_id.clone(),
        phase_label,
        progress_label: format!("{} / {}", progress.current, progress.total),
        prompt: card.side(session.prompt_side()).to_string(),
        correct_answer: card.side(session.answer_side()).to_string(),
        stage: StageVm::Answering { retrying: false },
    })
}

#[derive(Clone, Debug, PartialEq)]
pub struct StatsVm {
    pub accuracy: f64,
    pub accuracy_label: String,
    pub correct: u32,
    pub wrong: u32,
}

fn map_stats(stats: RoundStats) -> StatsVm {
    let accuracy = stats.accuracy();
    StatsVm {
        accuracy,
        accuracy_label: format!("{accuracy:.0}%"),
        correct: stats.correct,
        wrong: stats.wrong,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RoundSummaryVm {
    pub stats: StatsVm,
    pub missed_count: usize,
    pub missed_label: String,
    pub continue_label: &'static str,
}

#[must_use]
pub fn map_round_summary(session: &PracticeSession) -> RoundSummaryVm {
    let missed_count = session.missed_order().len();
    let missed_label = match missed_count {
        0 => "All cards answered correctly!".to_string(),
        1 => "1 card to review".to_string(),
        n => format!("{n} cards to review"),
    };
    let continue_label = if missed_count > 0 {
        "Review Missed Cards"
    } else {
        "Finish Session"
    };

    RoundSummaryVm {
        stats: map_stats(session.round_stats()),
        missed_count,
        missed_label,
        continue_label,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CompletionVm {
    pub stats: StatsVm,
    pub encouragement: &'static str,
}

#[must_use]
pub fn map_completion(session: &PracticeSession) -> CompletionVm {
    let stats = map_stats(session.round_stats());
    let encouragement = encouragement_for(stats.accuracy);
    CompletionVm {
        stats,
        encouragement,
    }
}

#[must_use]
pub fn encouragement_for(accuracy: f64) -> &'static str {
    if accuracy >= 100.0 {
        "Perfect score!"
    } else if accuracy >= 80.0 {
        "Great job!"
    } else if accuracy >= 60.0 {
        "Good effort!"
    } else if accuracy >= 40.0 {
        "Keep practicing!"
    } else {
        "Try again!"
    }
}
