use std::collections::HashSet;

use rand::rng;
use rand::seq::SliceRandom;

use flashdeck_core::model::CardId;

/// Build the queue for a round.
///
/// Duplicate ids are dropped, keeping the first occurrence. With `shuffle`
/// the survivors are put in a uniformly random order; otherwise input order
/// is kept.
#[must_use]
pub fn build_queue<'a>(card_ids: impl IntoIterator<Item = &'a CardId>, shuffle: bool) -> Vec<CardId> {
    let mut seen = HashSet::new();
    let mut queue: Vec<CardId> = card_ids
        .into_iter()
        .filter(|id| seen.insert(*id))
        .cloned()
        .collect();

    if shuffle {
        let mut rng = rng();
        queue.as_mut_slice().shuffle(&mut rng);
    }
    queue
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<CardId> {
        raw.iter().map(|id| CardId::new(*id)).collect()
    }

    #[test]
    fn keeps_order_without_shuffle() {
        let input = ids(&["c", "a", "b"]);
        assert_eq!(build_queue(&input, false), input);
    }

    #[test]
    fn drops_duplicates_keeping_first() {
        let input = ids(&["a", "b", "a", "c", "b"]);
        assert_eq!(build_queue(&input, false), ids(&["a", "b", "c"]));
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let input = ids(&["a", "b", "c", "d", "e", "f", "a"]);
        let mut queue = build_queue(&input, true);
        queue.sort();
        assert_eq!(queue, ids(&["a", "b", "c", "d", "e", "f"]));
    }

    #[test]
    fn empty_input_gives_empty_queue() {
        assert!(build_queue(&[], true).is_empty());
    }
}
