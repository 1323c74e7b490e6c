//! Record validation and the extraction driver.
//!
//! Validation is skip-based: a malformed or incomplete record is dropped and
//! counted, never fatal. Only an I/O failure in the underlying stream aborts
//! a run.

use std::io::BufRead;

use tracing::debug;

use crate::{
    ledger::LedgerBook,
    observation::{GameObservation, TimeControlClass},
    pgn::{PgnReadError, PgnReader, RawGame},
};

/// Why a game record was dropped during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum SkipReason {
    /// A required header tag is absent.
    #[display("missing required header")]
    MissingHeader,
    /// A player handle is absent or contains the unknown marker.
    #[display("unknown player handle")]
    UnknownPlayer,
    /// A final rating is absent, marked unknown, or unparseable.
    #[display("unknown rating")]
    UnknownRating,
    /// A rating change is absent or unparseable. Ratings without a computed
    /// change are provisional and misleading.
    #[display("missing rating change")]
    MissingRatingChange,
    /// The result is not decisive-white, decisive-black, or a draw.
    #[display("unrecognized result")]
    UnrecognizedResult,
}

/// Counts accumulated over one extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    /// Games read from the stream, valid or not.
    pub games_read: usize,
    /// Games that passed validation.
    pub games_accepted: usize,
    pub skipped_missing_header: usize,
    pub skipped_unknown_player: usize,
    pub skipped_unknown_rating: usize,
    pub skipped_missing_rating_change: usize,
    pub skipped_unrecognized_result: usize,
    /// Observations retained in ledgers.
    pub observations_kept: usize,
    /// Observations dropped by the placeholder-rating rule.
    pub observations_dropped: usize,
}

impl ExtractSummary {
    /// Total games dropped by validation.
    #[must_use]
    pub fn games_skipped(&self) -> usize {
        self.skipped_missing_header
            + self.skipped_unknown_player
            + self.skipped_unknown_rating
            + self.skipped_missing_rating_change
            + self.skipped_unrecognized_result
    }

    fn count_skip(&mut self, reason: SkipReason) {
        let counter = match reason {
            SkipReason::MissingHeader => &mut self.skipped_missing_header,
            SkipReason::UnknownPlayer => &mut self.skipped_unknown_player,
            SkipReason::UnknownRating => &mut self.skipped_unknown_rating,
            SkipReason::MissingRatingChange => &mut self.skipped_missing_rating_change,
            SkipReason::UnrecognizedResult => &mut self.skipped_unrecognized_result,
        };
        *counter += 1;
    }
}

/// Validates one raw game into its two per-side observations.
///
/// # Errors
///
/// Returns the [`SkipReason`] that disqualifies the record.
pub fn observations_from_game(game: &RawGame) -> Result<[GameObservation; 2], SkipReason> {
    let event = game.tag("Event").ok_or(SkipReason::MissingHeader)?;
    let time_control = TimeControlClass::classify(event);

    let white = game.tag("White").ok_or(SkipReason::UnknownPlayer)?;
    let black = game.tag("Black").ok_or(SkipReason::UnknownPlayer)?;
    if white.contains('?') || black.contains('?') {
        return Err(SkipReason::UnknownPlayer);
    }

    let white_rating = parse_rating(game.tag("WhiteElo"))?;
    let black_rating = parse_rating(game.tag("BlackElo"))?;
    let white_gain = parse_rating_change(game.tag("WhiteRatingDiff"))?;
    let black_gain = parse_rating_change(game.tag("BlackRatingDiff"))?;

    let (white_score, black_score) = match game.tag("Result") {
        Some("1-0") => (1.0, 0.0),
        Some("0-1") => (0.0, 1.0),
        Some("1/2-1/2") => (0.5, 0.5),
        _ => return Err(SkipReason::UnrecognizedResult),
    };

    // Leading numeral of the clock spec: a base of "0" means no increment
    // phase; anything else (including "-" for correspondence) counts as
    // increment.
    let clock = game.tag("TimeControl").ok_or(SkipReason::MissingHeader)?;
    if clock.is_empty() {
        return Err(SkipReason::MissingHeader);
    }
    let has_increment = !clock.starts_with('0');

    Ok([
        GameObservation {
            player: white.to_owned(),
            time_control,
            rating: white_rating,
            opponent_rating: black_rating,
            actual_score: white_score,
            rating_gain: white_gain,
            has_increment,
        },
        GameObservation {
            player: black.to_owned(),
            time_control,
            rating: black_rating,
            opponent_rating: white_rating,
            actual_score: black_score,
            rating_gain: black_gain,
            has_increment,
        },
    ])
}

fn parse_rating(tag: Option<&str>) -> Result<f64, SkipReason> {
    let value = tag.ok_or(SkipReason::UnknownRating)?;
    if value.contains('?') {
        return Err(SkipReason::UnknownRating);
    }
    value.parse().map_err(|_| SkipReason::UnknownRating)
}

fn parse_rating_change(tag: Option<&str>) -> Result<f64, SkipReason> {
    tag.ok_or(SkipReason::MissingRatingChange)?
        .parse()
        .map_err(|_| SkipReason::MissingRatingChange)
}

/// Streams a whole corpus into `book`, single-threaded.
///
/// # Errors
///
/// Returns [`PgnReadError`] only on an I/O failure; validation failures are
/// counted in the summary instead.
pub fn extract_games<R>(
    reader: PgnReader<R>,
    book: &mut LedgerBook,
) -> Result<ExtractSummary, PgnReadError>
where
    R: BufRead,
{
    extract_games_with_progress(reader, book, |_| {})
}

/// [`extract_games`] with a hook called after every accepted game, for
/// progress reporting on long corpora.
///
/// # Errors
///
/// Returns [`PgnReadError`] only on an I/O failure.
pub fn extract_games_with_progress<R, F>(
    reader: PgnReader<R>,
    book: &mut LedgerBook,
    mut on_accepted: F,
) -> Result<ExtractSummary, PgnReadError>
where
    R: BufRead,
    F: FnMut(&ExtractSummary),
{
    let mut summary = ExtractSummary::default();
    for game in reader {
        let game = game?;
        summary.games_read += 1;
        match observations_from_game(&game) {
            Ok(pair) => {
                summary.games_accepted += 1;
                for observation in pair {
                    if book.record(observation) {
                        summary.observations_kept += 1;
                    } else {
                        summary.observations_dropped += 1;
                    }
                }
                on_accepted(&summary);
            }
            Err(reason) => {
                debug!(%reason, "dropping game record");
                summary.count_skip(reason);
            }
        }
    }
    Ok(summary)
}
