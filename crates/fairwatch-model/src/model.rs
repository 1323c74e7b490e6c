//! The anomaly model: fit, predict, and its two states.

use std::{collections::BTreeMap, sync::Arc, thread, time::Duration};

use chrono::{DateTime, Utc};
use fairwatch_extract::observation::TimeControlClass;
use fairwatch_features::row::PlayerFeatureRow;
use fairwatch_oracle::{AccountOracle, AccountStatus};
use serde::Serialize;
use tracing::warn;

use crate::{
    calibrate::{DEFAULT_THRESHOLD, GroupCalibration, GroupRow, calibrate_group},
    resolver::{StatusCache, StatusResolver, lock_cache},
    threshold::{GroupKey, ThresholdTable},
};

/// Default bounded wait for one status resolution during calibration.
pub const ORACLE_WAIT: Duration = Duration::from_secs(30);

/// What `fit` did.
#[derive(Debug, Clone)]
pub struct FitReport {
    /// `true` when the call was ignored because the model was already
    /// fitted.
    pub refit_ignored: bool,
    /// Feature rows offered to the fit.
    pub rows_seen: usize,
    /// Rows dropped for carrying the unmodelled `other` time control.
    pub skipped_unrecognized: usize,
    /// Per-group sweep outcomes, in group key order.
    pub groups: Vec<GroupCalibration>,
}

impl FitReport {
    fn refit_ignored() -> Self {
        Self {
            refit_ignored: true,
            rows_seen: 0,
            skipped_unrecognized: 0,
            groups: Vec::new(),
        }
    }
}

/// A feature row augmented with the model's verdict.
///
/// `is_anomaly` is empty for a row whose group was never calibrated: the row
/// is unscorable, which is deliberately distinct from "not anomalous".
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedRow {
    pub player: String,
    pub time_control: TimeControlClass,
    pub number_of_games: usize,
    pub mean_perf_diff: f64,
    pub std_perf_diff: f64,
    pub mean_rating: f64,
    pub median_rating: f64,
    pub std_rating: f64,
    pub mean_opponent_rating: f64,
    pub std_opponent_rating: f64,
    pub mean_rating_gain: f64,
    pub std_rating_gain: f64,
    pub proportion_increment_games: f64,
    pub rating_bin: i64,
    pub is_anomaly: Option<bool>,
    pub account_status: AccountStatus,
}

impl ClassifiedRow {
    fn new(row: &PlayerFeatureRow, is_anomaly: Option<bool>, account_status: AccountStatus) -> Self {
        Self {
            player: row.player.clone(),
            time_control: row.time_control,
            number_of_games: row.number_of_games,
            mean_perf_diff: row.mean_perf_diff,
            std_perf_diff: row.std_perf_diff,
            mean_rating: row.mean_rating,
            median_rating: row.median_rating,
            std_rating: row.std_rating,
            mean_opponent_rating: row.mean_opponent_rating,
            std_opponent_rating: row.std_opponent_rating,
            mean_rating_gain: row.mean_rating_gain,
            std_rating_gain: row.std_rating_gain,
            proportion_increment_games: row.proportion_increment_games,
            rating_bin: row.rating_bin,
            is_anomaly,
            account_status,
        }
    }
}

/// Output of [`AnomalyModel::predict`].
#[derive(Debug, Clone)]
pub struct Prediction {
    pub rows: Vec<ClassifiedRow>,
    /// Rows dropped for carrying the `other` time control.
    pub skipped_unrecognized: usize,
    /// Rows kept but left unscored for lack of a calibrated group.
    pub unscorable: usize,
}

impl Prediction {
    /// Rows the model flagged as anomalous.
    #[must_use]
    pub fn flagged(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| row.is_anomaly == Some(true))
            .count()
    }
}

/// Predict-time failure.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum PredictError {
    #[display("model has not been fitted or loaded")]
    NotFitted,
}

/// Per-group anomaly thresholds with a two-state lifecycle.
///
/// A model is `unfitted` until [`fit`](Self::fit) or a
/// [`load`](Self::load) transitions it to `fitted`, exactly once. A repeat
/// `fit` is a warned no-op; recalibration means constructing a new instance.
///
/// The model exclusively owns its threshold table and its account-status
/// cache. The cache lives for the instance's lifetime and is never
/// persisted.
#[derive(Debug)]
pub struct AnomalyModel {
    name: String,
    corpus: String,
    calibrated_at: Option<DateTime<Utc>>,
    thresholds: ThresholdTable,
    status_cache: StatusCache,
    oracle_wait: Duration,
    fitted: bool,
}

impl AnomalyModel {
    /// Creates an unfitted model keyed by a model name and the identifier of
    /// the corpus its training rows come from.
    #[must_use]
    pub fn new(name: impl Into<String>, corpus: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            corpus: corpus.into(),
            calibrated_at: None,
            thresholds: ThresholdTable::new(DEFAULT_THRESHOLD),
            status_cache: StatusCache::default(),
            oracle_wait: ORACLE_WAIT,
            fitted: false,
        }
    }

    /// Overrides the bounded per-lookup wait applied during calibration.
    #[must_use]
    pub fn with_oracle_wait(mut self, wait: Duration) -> Self {
        self.oracle_wait = wait;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn corpus(&self) -> &str {
        &self.corpus
    }

    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    #[must_use]
    pub fn calibrated_at(&self) -> Option<DateTime<Utc>> {
        self.calibrated_at
    }

    #[must_use]
    pub fn thresholds(&self) -> &ThresholdTable {
        &self.thresholds
    }

    /// Calibrates per-group thresholds against weak labels from `oracle`.
    ///
    /// Rows in the `other` time control are dropped with a warning. Group
    /// sweeps run concurrently on scoped threads; status lookups are
    /// serialized through one resolver worker sharing this model's cache.
    ///
    /// On a model that is already fitted this is a no-op that returns a
    /// report with `refit_ignored` set.
    pub fn fit(&mut self, rows: &[PlayerFeatureRow], oracle: Arc<dyn AccountOracle>) -> FitReport {
        if self.fitted {
            warn!(
                model = self.name,
                "model is already fitted; ignoring repeat fit call"
            );
            return FitReport::refit_ignored();
        }

        let mut groups: BTreeMap<GroupKey, Vec<GroupRow>> = BTreeMap::new();
        let mut skipped_unrecognized = 0;
        for row in rows {
            if let Some(key) = GroupKey::of(row) {
                groups.entry(key).or_default().push(GroupRow {
                    player: row.player.clone(),
                    mean_perf_diff: row.mean_perf_diff,
                });
            } else {
                skipped_unrecognized += 1;
            }
        }
        if skipped_unrecognized > 0 {
            warn!(
                skipped_unrecognized,
                "dropping rows in unrecognized time controls from calibration"
            );
        }
        for &key in groups.keys() {
            self.thresholds.initialize_group(key);
        }

        let resolver = StatusResolver::spawn(
            oracle,
            Arc::clone(&self.status_cache),
            self.oracle_wait,
        );
        let group_list = groups
            .iter()
            .map(|(&key, rows)| (key, rows.as_slice()))
            .collect::<Vec<(GroupKey, &[GroupRow])>>();
        let mut results: Vec<Option<GroupCalibration>> = vec![None; group_list.len()];
        thread::scope(|scope| {
            for (slot, &(key, group_rows)) in results.iter_mut().zip(&group_list) {
                let resolver = resolver.clone();
                scope.spawn(move || {
                    *slot = Some(calibrate_group(key, group_rows, &resolver));
                });
            }
        });

        let calibrations = results.into_iter().flatten().collect::<Vec<_>>();
        for calibration in &calibrations {
            self.thresholds.set(calibration.key, calibration.threshold);
        }
        self.fitted = true;
        self.calibrated_at = Some(Utc::now());

        FitReport {
            refit_ignored: false,
            rows_seen: rows.len(),
            skipped_unrecognized,
            groups: calibrations,
        }
    }

    /// Classifies feature rows against the calibrated thresholds.
    ///
    /// A row is anomalous when its mean performance difference strictly
    /// exceeds its group's threshold; equality is not anomalous. Account
    /// statuses come from the fit-time cache only; predict never calls the
    /// oracle.
    ///
    /// # Errors
    ///
    /// Returns [`PredictError::NotFitted`] on an unfitted model.
    pub fn predict(&self, rows: &[PlayerFeatureRow]) -> Result<Prediction, PredictError> {
        if !self.fitted {
            return Err(PredictError::NotFitted);
        }

        let cache = lock_cache(&self.status_cache);
        let mut classified = Vec::with_capacity(rows.len());
        let mut skipped_unrecognized = 0;
        let mut unscorable = 0;
        for row in rows {
            let Some(key) = GroupKey::of(row) else {
                skipped_unrecognized += 1;
                continue;
            };
            let is_anomaly = match self.thresholds.get(key) {
                Some(threshold) => Some(row.mean_perf_diff > threshold),
                None => {
                    warn!(group = %key, player = row.player, "no calibrated threshold; row left unscored");
                    unscorable += 1;
                    None
                }
            };
            let account_status = cache
                .get(&row.player)
                .copied()
                .unwrap_or(AccountStatus::Unknown);
            classified.push(ClassifiedRow::new(row, is_anomaly, account_status));
        }
        if skipped_unrecognized > 0 {
            warn!(
                skipped_unrecognized,
                "dropped rows in unrecognized time controls from prediction"
            );
        }

        Ok(Prediction {
            rows: classified,
            skipped_unrecognized,
            unscorable,
        })
    }

    pub(crate) fn restore(
        name: String,
        corpus: String,
        calibrated_at: DateTime<Utc>,
        thresholds: ThresholdTable,
    ) -> Self {
        Self {
            name,
            corpus,
            calibrated_at: Some(calibrated_at),
            thresholds,
            status_cache: StatusCache::default(),
            oracle_wait: ORACLE_WAIT,
            fitted: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use fairwatch_oracle::FixedOracle;

    use super::*;

    fn feature_row(
        player: &str,
        time_control: TimeControlClass,
        mean_perf_diff: f64,
        rating_bin: i64,
    ) -> PlayerFeatureRow {
        PlayerFeatureRow {
            player: player.to_owned(),
            time_control,
            number_of_games: 100,
            mean_perf_diff,
            std_perf_diff: 0.005,
            mean_rating: 1535.0,
            median_rating: 1535.0,
            std_rating: 10.0,
            mean_opponent_rating: 1535.0,
            std_opponent_rating: 10.0,
            mean_rating_gain: 1.0,
            std_rating_gain: 0.01,
            proportion_increment_games: 1.0,
            rating_bin,
        }
    }

    /// Six players per group with known statuses; the calibration fixture
    /// from the original analysis.
    fn fixture_rows() -> Vec<PlayerFeatureRow> {
        let blitz_diffs = [0.155, 0.16, 0.17, 0.18, 0.19, 0.25];
        let bullet_diffs = [0.16, 0.17, 0.18, 0.19, 0.20, 0.26];
        let mut rows = Vec::new();
        for (i, diff) in blitz_diffs.into_iter().enumerate() {
            rows.push(feature_row(
                &format!("test_player{}", i + 1),
                TimeControlClass::Blitz,
                diff,
                1500,
            ));
        }
        for (i, diff) in bullet_diffs.into_iter().enumerate() {
            rows.push(feature_row(
                &format!("test_player{}", i + 1),
                TimeControlClass::Bullet,
                diff,
                1600,
            ));
        }
        rows
    }

    fn fixture_oracle() -> Arc<FixedOracle> {
        Arc::new(
            FixedOracle::new()
                .with("test_player1", AccountStatus::Open)
                .with("test_player2", AccountStatus::Open)
                .with("test_player3", AccountStatus::TosViolation)
                .with("test_player4", AccountStatus::TosViolation)
                .with("test_player5", AccountStatus::TosViolation)
                .with("test_player6", AccountStatus::Closed),
        )
    }

    fn blitz_1500() -> GroupKey {
        GroupKey {
            time_control: TimeControlClass::Blitz,
            rating_bin: 1500,
        }
    }

    fn bullet_1600() -> GroupKey {
        GroupKey {
            time_control: TimeControlClass::Bullet,
            rating_bin: 1600,
        }
    }

    #[test]
    fn test_fit_calibrates_fixture_thresholds() {
        let mut model = AnomalyModel::new("anomaly", "fixture");
        let report = model.fit(&fixture_rows(), fixture_oracle());

        assert!(!report.refit_ignored);
        assert_eq!(report.groups.len(), 2);
        assert_eq!(model.thresholds().get(blitz_1500()), Some(0.16));
        assert_eq!(model.thresholds().get(bullet_1600()), Some(0.17));

        let blitz = report
            .groups
            .iter()
            .find(|g| g.key == blitz_1500())
            .unwrap();
        assert_eq!(blitz.flagged, 4);
        assert!((blitz.accuracy - 0.9375).abs() < 1e-12);
        assert!((blitz.metric - 5.0_f64.ln() * 0.9375).abs() < 1e-12);
    }

    #[test]
    fn test_all_unknown_statuses_keep_default_threshold() {
        // nothing scoreable: accuracy 0 everywhere, first threshold wins
        let mut model = AnomalyModel::new("anomaly", "fixture");
        let oracle = Arc::new(FixedOracle::new());
        let rows = vec![
            feature_row("ghost1", TimeControlClass::Blitz, 0.2, 1500),
            feature_row("ghost2", TimeControlClass::Blitz, 0.3, 1500),
        ];
        model.fit(&rows, oracle);
        assert_eq!(model.thresholds().get(blitz_1500()), Some(0.15));
    }

    #[test]
    fn test_refit_is_a_warned_no_op() {
        let mut model = AnomalyModel::new("anomaly", "fixture");
        model.fit(&fixture_rows(), fixture_oracle());
        let before = model.thresholds().clone();

        let report = model.fit(&[], fixture_oracle());
        assert!(report.refit_ignored);
        assert_eq!(*model.thresholds(), before);
    }

    #[test]
    fn test_predict_equality_is_not_anomalous() {
        let mut model = AnomalyModel::new("anomaly", "fixture");
        model.fit(&fixture_rows(), fixture_oracle());

        let rows = vec![
            feature_row("at_threshold", TimeControlClass::Blitz, 0.16, 1500),
            feature_row("above_threshold", TimeControlClass::Blitz, 0.161, 1500),
        ];
        let prediction = model.predict(&rows).unwrap();
        assert_eq!(prediction.rows[0].is_anomaly, Some(false));
        assert_eq!(prediction.rows[1].is_anomaly, Some(true));
        assert_eq!(prediction.flagged(), 1);
    }

    #[test]
    fn test_predict_unseen_group_is_unscorable_not_clean() {
        let mut model = AnomalyModel::new("anomaly", "fixture");
        model.fit(&fixture_rows(), fixture_oracle());

        let rows = vec![feature_row(
            "stranger",
            TimeControlClass::Rapid,
            0.5,
            2100,
        )];
        let prediction = model.predict(&rows).unwrap();
        assert_eq!(prediction.unscorable, 1);
        assert_eq!(prediction.rows[0].is_anomaly, None);
    }

    #[test]
    fn test_predict_uses_cached_statuses_only() {
        let mut model = AnomalyModel::new("anomaly", "fixture");
        model.fit(&fixture_rows(), fixture_oracle());

        // flagged during fit, so cached
        let cached = feature_row("test_player6", TimeControlClass::Blitz, 0.25, 1500);
        // absent from the fit rows, so never resolved
        let uncached = feature_row("drifter", TimeControlClass::Blitz, 0.10, 1500);
        let prediction = model.predict(&[cached, uncached]).unwrap();
        assert_eq!(prediction.rows[0].account_status, AccountStatus::Closed);
        assert_eq!(prediction.rows[1].account_status, AccountStatus::Unknown);
    }

    #[test]
    fn test_predict_unfitted_is_an_error() {
        let model = AnomalyModel::new("anomaly", "fixture");
        assert!(matches!(
            model.predict(&[]),
            Err(PredictError::NotFitted)
        ));
    }

    #[test]
    fn test_other_rows_are_skipped_at_fit_and_predict() {
        let mut model = AnomalyModel::new("anomaly", "fixture");
        let mut rows = fixture_rows();
        rows.push(feature_row("oddball", TimeControlClass::Other, 0.9, 1500));
        let report = model.fit(&rows, fixture_oracle());
        assert_eq!(report.skipped_unrecognized, 1);

        let prediction = model
            .predict(&[feature_row("oddball", TimeControlClass::Other, 0.9, 1500)])
            .unwrap();
        assert_eq!(prediction.skipped_unrecognized, 1);
        assert!(prediction.rows.is_empty());
    }

    #[test]
    fn test_stalled_oracle_does_not_wedge_fit() {
        use fairwatch_oracle::OracleError;

        struct StallingOracle;
        impl fairwatch_oracle::AccountOracle for StallingOracle {
            fn resolve(&self, _player: &str) -> Result<AccountStatus, OracleError> {
                std::thread::sleep(Duration::from_millis(200));
                Ok(AccountStatus::TosViolation)
            }
        }

        let mut model = AnomalyModel::new("anomaly", "fixture")
            .with_oracle_wait(Duration::from_millis(5));
        let rows = vec![feature_row("slowpoke", TimeControlClass::Blitz, 0.2, 1500)];
        model.fit(&rows, Arc::new(StallingOracle));
        // every lookup degraded to unknown, so the default threshold stands
        assert_eq!(model.thresholds().get(blitz_1500()), Some(0.15));
    }
}
