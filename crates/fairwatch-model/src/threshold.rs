//! Calibration groups and the threshold table.

use std::collections::BTreeMap;

use fairwatch_extract::observation::TimeControlClass;
use fairwatch_features::row::PlayerFeatureRow;
use serde::{Deserialize, Serialize};

/// One calibration group: a recognized time control and a rating bin.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    derive_more::Display,
    Serialize,
    Deserialize,
)]
#[display("{time_control}/{rating_bin}")]
pub struct GroupKey {
    pub time_control: TimeControlClass,
    pub rating_bin: i64,
}

impl GroupKey {
    /// The group a feature row belongs to, or `None` for the unmodelled
    /// `other` time control.
    #[must_use]
    pub fn of(row: &PlayerFeatureRow) -> Option<Self> {
        row.time_control.is_recognized().then_some(Self {
            time_control: row.time_control,
            rating_bin: row.rating_bin,
        })
    }
}

/// Calibrated cutoffs per group.
///
/// Groups are initialized to a uniform default threshold and overwritten in
/// place as their sweeps finish. Iteration order is deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTable {
    default_threshold: f64,
    thresholds: BTreeMap<GroupKey, f64>,
}

impl ThresholdTable {
    #[must_use]
    pub fn new(default_threshold: f64) -> Self {
        Self {
            default_threshold,
            thresholds: BTreeMap::new(),
        }
    }

    /// Ensures `key` has an entry, seeding it with the default threshold.
    pub fn initialize_group(&mut self, key: GroupKey) {
        self.thresholds.entry(key).or_insert(self.default_threshold);
    }

    pub fn set(&mut self, key: GroupKey, threshold: f64) {
        self.thresholds.insert(key, threshold);
    }

    /// Calibrated threshold for `key`, if the group was ever observed.
    /// A miss is the explicit unrecognized-group condition; callers must not
    /// default it away.
    #[must_use]
    pub fn get(&self, key: GroupKey) -> Option<f64> {
        self.thresholds.get(&key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (GroupKey, f64)> + '_ {
        self.thresholds.iter().map(|(&key, &threshold)| (key, threshold))
    }

    #[must_use]
    pub fn default_threshold(&self) -> f64 {
        self.default_threshold
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(time_control: TimeControlClass, rating_bin: i64) -> GroupKey {
        GroupKey {
            time_control,
            rating_bin,
        }
    }

    #[test]
    fn test_initialize_seeds_default_once() {
        let mut table = ThresholdTable::new(0.15);
        let blitz = key(TimeControlClass::Blitz, 1500);
        table.initialize_group(blitz);
        assert_eq!(table.get(blitz), Some(0.15));

        table.set(blitz, 0.18);
        table.initialize_group(blitz);
        assert_eq!(table.get(blitz), Some(0.18));
    }

    #[test]
    fn test_lookup_miss_is_explicit() {
        let table = ThresholdTable::new(0.15);
        assert_eq!(table.get(key(TimeControlClass::Bullet, 1600)), None);
    }

    #[test]
    fn test_other_time_control_has_no_group() {
        let row = PlayerFeatureRow {
            player: "alice".to_owned(),
            time_control: TimeControlClass::Other,
            number_of_games: 40,
            mean_perf_diff: 0.2,
            std_perf_diff: 0.01,
            mean_rating: 1550.0,
            median_rating: 1550.0,
            std_rating: 10.0,
            mean_opponent_rating: 1550.0,
            std_opponent_rating: 10.0,
            mean_rating_gain: 1.0,
            std_rating_gain: 0.5,
            proportion_increment_games: 0.0,
            rating_bin: 1500,
        };
        assert_eq!(GroupKey::of(&row), None);
    }
}
