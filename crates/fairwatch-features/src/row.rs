//! Feature rows aggregated per (player, time control).

use fairwatch_extract::{
    ledger::{Ledger, LedgerBook},
    observation::TimeControlClass,
};
use fairwatch_stats::{binning::RatingBins, summary::Summary};
use serde::{Deserialize, Serialize};

use crate::expected::expected_score;

/// Minimum observations a ledger needs to produce a feature row.
///
/// Performance-vs-expectation statistics over a handful of games are noise;
/// thirty is the established floor for the corpus this pipeline targets.
pub const MIN_GAMES: usize = 30;

/// One player's aggregated record in one time control.
///
/// Field names are the column vocabulary of the feature table artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerFeatureRow {
    pub player: String,
    pub time_control: TimeControlClass,
    pub number_of_games: usize,
    /// Mean of per-game (actual − expected) score. The central signal:
    /// sustained positive values mean the player outperforms their rating.
    pub mean_perf_diff: f64,
    pub std_perf_diff: f64,
    pub mean_rating: f64,
    pub median_rating: f64,
    pub std_rating: f64,
    pub mean_opponent_rating: f64,
    pub std_opponent_rating: f64,
    pub mean_rating_gain: f64,
    pub std_rating_gain: f64,
    /// Share of the player's games played with an increment.
    pub proportion_increment_games: f64,
    /// Lower edge of the width-100 bracket containing `mean_rating`.
    pub rating_bin: i64,
}

/// Aggregates every qualifying ledger into a feature row.
///
/// Ledgers with fewer than [`MIN_GAMES`] observations are dropped. Rating
/// bins cover the span of surviving rows' mean ratings, so every returned
/// row carries a bin label; empty input yields empty output.
#[must_use]
pub fn build_feature_rows(book: &LedgerBook) -> Vec<PlayerFeatureRow> {
    let mut rows = book
        .ledgers()
        .iter()
        .filter(|ledger| ledger.len() >= MIN_GAMES)
        .filter_map(aggregate_ledger)
        .collect::<Vec<_>>();

    let Some(first) = rows.first() else {
        return rows;
    };
    let (min, max) = rows.iter().skip(1).fold(
        (first.mean_rating, first.mean_rating),
        |(min, max), row| (min.min(row.mean_rating), max.max(row.mean_rating)),
    );
    let bins = RatingBins::covering(min, max);
    for row in &mut rows {
        row.rating_bin = bins.bin_of(row.mean_rating);
    }
    rows
}

#[expect(clippy::cast_precision_loss)]
fn aggregate_ledger(ledger: &Ledger) -> Option<PlayerFeatureRow> {
    let observations = ledger.observations();
    let perf_diffs = Summary::of(
        observations
            .iter()
            .map(|o| o.actual_score - expected_score(o.rating, o.opponent_rating)),
    )?;
    let ratings = Summary::of(observations.iter().map(|o| o.rating))?;
    let opponent_ratings = Summary::of(observations.iter().map(|o| o.opponent_rating))?;
    let rating_gains = Summary::of(observations.iter().map(|o| o.rating_gain))?;
    let increment_games = observations.iter().filter(|o| o.has_increment).count();

    Some(PlayerFeatureRow {
        player: ledger.key().player.clone(),
        time_control: ledger.key().time_control,
        number_of_games: observations.len(),
        mean_perf_diff: perf_diffs.mean,
        std_perf_diff: perf_diffs.std_dev,
        mean_rating: ratings.mean,
        median_rating: ratings.median,
        std_rating: ratings.std_dev,
        mean_opponent_rating: opponent_ratings.mean,
        std_opponent_rating: opponent_ratings.std_dev,
        mean_rating_gain: rating_gains.mean,
        std_rating_gain: rating_gains.std_dev,
        proportion_increment_games: increment_games as f64 / observations.len() as f64,
        // assigned once the whole output set is known
        rating_bin: 0,
    })
}

#[cfg(test)]
mod tests {
    use fairwatch_extract::observation::GameObservation;

    use super::*;

    fn book_with_games(player: &str, rating: f64, games: usize) -> LedgerBook {
        let mut book = LedgerBook::new();
        record_games(&mut book, player, rating, games);
        book
    }

    fn record_games(book: &mut LedgerBook, player: &str, rating: f64, games: usize) {
        for i in 0..games {
            book.record(GameObservation {
                player: player.to_owned(),
                time_control: TimeControlClass::Blitz,
                rating,
                opponent_rating: rating - 50.0,
                actual_score: if i % 2 == 0 { 1.0 } else { 0.0 },
                rating_gain: 2.0,
                has_increment: i % 4 == 0,
            });
        }
    }

    #[test]
    fn test_ledger_below_min_games_produces_no_row() {
        let book = book_with_games("alice", 1550.0, MIN_GAMES - 1);
        assert!(build_feature_rows(&book).is_empty());
    }

    #[test]
    fn test_ledger_at_min_games_produces_one_row() {
        let book = book_with_games("alice", 1550.0, MIN_GAMES);
        let rows = build_feature_rows(&book);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].player, "alice");
        assert_eq!(rows[0].number_of_games, MIN_GAMES);
    }

    #[test]
    fn test_perf_diff_nets_out_opponent_strength() {
        // 32 games against weaker opposition, exactly half won: the actual
        // score of 0.5 sits below the >0.5 expectation, so the mean
        // performance difference is negative.
        let book = book_with_games("alice", 1550.0, 32);
        let rows = build_feature_rows(&book);
        assert!(rows[0].mean_perf_diff < 0.0);
        assert!(rows[0].mean_perf_diff > -0.5);
    }

    #[test]
    fn test_increment_proportion() {
        let book = book_with_games("alice", 1550.0, 32);
        let rows = build_feature_rows(&book);
        assert_eq!(rows[0].proportion_increment_games, 0.25);
    }

    #[test]
    fn test_rating_bins_cover_surviving_rows() {
        let mut book = LedgerBook::new();
        record_games(&mut book, "alice", 1512.0, 30);
        record_games(&mut book, "bob", 1787.0, 30);
        // too few games to survive; must not stretch the bin span
        record_games(&mut book, "carol", 2400.0, 5);

        let rows = build_feature_rows(&book);
        assert_eq!(rows.len(), 2);
        let alice = rows.iter().find(|r| r.player == "alice").unwrap();
        let bob = rows.iter().find(|r| r.player == "bob").unwrap();
        assert_eq!(alice.rating_bin, 1500);
        assert_eq!(bob.rating_bin, 1700);
    }

    #[test]
    fn test_empty_book_yields_no_rows() {
        assert!(build_feature_rows(&LedgerBook::new()).is_empty());
    }
}
