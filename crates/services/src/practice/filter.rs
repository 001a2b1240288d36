use std::cmp::Ordering;
use std::str::FromStr;

use flashdeck_core::model::{Card, CardId};

/// Card ordering offered by the deck view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CardSortMode {
    /// Deck order.
    #[default]
    Default,
    CreatedDate,
    EditedDate,
    FrontText,
    BackText,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort mode: {0}")]
pub struct ParseSortError(String);

impl FromStr for CardSortMode {
    type Err = ParseSortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "created" | "created-date" => Ok(Self::CreatedDate),
            "edited" | "edited-date" => Ok(Self::EditedDate),
            "front" | "front-text" => Ok(Self::FrontText),
            "back" | "back-text" => Ok(Self::BackText),
            other => Err(ParseSortError(other.to_string())),
        }
    }
}

/// Narrows and orders a deck's cards before practice.
///
/// The resulting id list is what practice treats as the valid card set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardFilter {
    needle: Option<String>,
    sort: CardSortMode,
    order: SortOrder,
}

impl CardFilter {
    /// No narrowing, deck order.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Case-insensitive search over both sides. Blank queries match everything.
    #[must_use]
    pub fn with_query(mut self, query: &str) -> Self {
        let needle = query.trim().to_lowercase();
        self.needle = (!needle.is_empty()).then_some(needle);
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: CardSortMode, order: SortOrder) -> Self {
        self.sort = sort;
        self.order = order;
        self
    }

    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.needle.as_deref()
    }

    #[must_use]
    pub fn matches(&self, card: &Card) -> bool {
        self.needle
            .as_deref()
            .is_none_or(|needle| card.matches_query(needle))
    }

    /// Ids of the matching cards, sorted. `cards` is expected in deck order.
    #[must_use]
    pub fn valid_card_ids(&self, cards: &[Card]) -> Vec<CardId> {
        let mut kept: Vec<&Card> = cards.iter().filter(|card| self.matches(card)).collect();

        if self.sort != CardSortMode::Default {
            kept.sort_by(|a, b| self.compare(a, b));
        }
        if self.order == SortOrder::Desc {
            kept.reverse();
        }

        kept.into_iter().map(|card| card.id().clone()).collect()
    }

    fn compare(&self, a: &Card, b: &Card) -> Ordering {
        match self.sort {
            CardSortMode::Default => Ordering::Equal,
            CardSortMode::CreatedDate => a.created_at().cmp(&b.created_at()),
            CardSortMode::EditedDate => a
                .updated_at()
                .or(a.created_at())
                .cmp(&b.updated_at().or(b.created_at())),
            CardSortMode::FrontText => a.front().to_lowercase().cmp(&b.front().to_lowercase()),
            CardSortMode::BackText => a.back().to_lowercase().cmp(&b.back().to_lowercase()),
        }
    }
}
