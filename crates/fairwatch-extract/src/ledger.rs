//! Per-(player, time control) observation ledgers.
//!
//! A [`LedgerBook`] is an explicit accumulator owned by one extraction run
//! and passed by reference into the extraction routine. Ledgers preserve
//! first-seen key order, and each ledger appends observations in arrival
//! order.

use std::collections::HashMap;

use crate::observation::{GameObservation, TimeControlClass};

/// Rating assigned to accounts before they have played rated games.
///
/// A first observation at exactly this rating is dropped: the rating is
/// provisional and no rating change is meaningful yet. Once a ledger exists,
/// later observations at this rating are real data and are retained.
pub const PLACEHOLDER_RATING: f64 = 1500.0;

/// Identity of one ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LedgerKey {
    pub player: String,
    pub time_control: TimeControlClass,
}

/// Ordered observations for one (player, time control) pair.
#[derive(Debug, Clone)]
pub struct Ledger {
    key: LedgerKey,
    observations: Vec<GameObservation>,
}

impl Ledger {
    #[must_use]
    pub fn key(&self) -> &LedgerKey {
        &self.key
    }

    #[must_use]
    pub fn observations(&self) -> &[GameObservation] {
        &self.observations
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

/// Accumulator for all ledgers of one extraction run.
#[derive(Debug, Default)]
pub struct LedgerBook {
    index: HashMap<LedgerKey, usize>,
    ledgers: Vec<Ledger>,
}

impl LedgerBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one observation, applying the placeholder-rating rule.
    ///
    /// Returns `true` if the observation was retained, `false` if it was
    /// dropped because it would have created a ledger at the placeholder
    /// rating.
    #[expect(clippy::float_cmp, reason = "the placeholder rating is an exact sentinel")]
    pub fn record(&mut self, observation: GameObservation) -> bool {
        let key = LedgerKey {
            player: observation.player.clone(),
            time_control: observation.time_control,
        };
        if let Some(&slot) = self.index.get(&key) {
            self.ledgers[slot].observations.push(observation);
            return true;
        }
        if observation.rating == PLACEHOLDER_RATING {
            return false;
        }
        self.index.insert(key.clone(), self.ledgers.len());
        self.ledgers.push(Ledger {
            key,
            observations: vec![observation],
        });
        true
    }

    /// All ledgers in first-seen key order.
    #[must_use]
    pub fn ledgers(&self) -> &[Ledger] {
        &self.ledgers
    }

    /// All observations, exploded to one item per row: ledger key order,
    /// then arrival order within each ledger.
    pub fn observations(&self) -> impl Iterator<Item = &GameObservation> {
        self.ledgers
            .iter()
            .flat_map(|ledger| ledger.observations.iter())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ledgers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ledgers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(player: &str, rating: f64) -> GameObservation {
        GameObservation {
            player: player.to_owned(),
            time_control: TimeControlClass::Blitz,
            rating,
            opponent_rating: 1600.0,
            actual_score: 1.0,
            rating_gain: 8.0,
            has_increment: false,
        }
    }

    #[test]
    fn test_first_placeholder_rating_creates_no_ledger() {
        let mut book = LedgerBook::new();
        assert!(!book.record(observation("alice", 1500.0)));
        assert!(book.is_empty());
    }

    #[test]
    fn test_placeholder_rating_after_first_game_is_retained() {
        let mut book = LedgerBook::new();
        assert!(book.record(observation("alice", 1512.0)));
        assert!(book.record(observation("alice", 1500.0)));
        assert_eq!(book.len(), 1);
        assert_eq!(book.ledgers()[0].len(), 2);
    }

    #[test]
    fn test_keys_split_by_time_control() {
        let mut book = LedgerBook::new();
        let mut bullet = observation("alice", 1550.0);
        bullet.time_control = TimeControlClass::Bullet;
        book.record(observation("alice", 1550.0));
        book.record(bullet);
        assert_eq!(book.len(), 2);
    }

    #[test]
    fn test_explode_preserves_key_then_arrival_order() {
        let mut book = LedgerBook::new();
        book.record(observation("alice", 1510.0));
        book.record(observation("bob", 1710.0));
        book.record(observation("alice", 1518.0));
        let order = book
            .observations()
            .map(|o| (o.player.as_str(), o.rating))
            .collect::<Vec<_>>();
        assert_eq!(
            order,
            [("alice", 1510.0), ("alice", 1518.0), ("bob", 1710.0)]
        );
    }
}
