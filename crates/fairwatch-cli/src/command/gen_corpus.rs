use std::{io::Write as _, path::PathBuf};

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

use crate::util::Output;

/// One in twenty accounts plays far above its rating, the population the
/// anomaly model is supposed to find.
const OVERPERFORMER_SHARE: usize = 20;
const OVERPERFORMER_EDGE: f64 = 350.0;

const DRAW_PROBABILITY: f64 = 0.05;
const RATING_K: f64 = 16.0;

/// Clock specs per time-control class; half of each pair has no increment.
const CLOCKS: [(&str, [&str; 2]); 4] = [
    ("Rated Bullet game", ["60+0", "120+1"]),
    ("Rated Blitz game", ["300+0", "180+2"]),
    ("Rated Rapid game", ["600+0", "600+10"]),
    ("Rated Classical game", ["1800+0", "1800+20"]),
];

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct GenCorpusArg {
    /// Number of games to generate
    #[arg(long, default_value_t = 20_000)]
    pub(crate) games: usize,
    /// Number of accounts in the pool
    #[arg(long, default_value_t = 120)]
    pub(crate) players: usize,
    /// RNG seed; identical seeds reproduce identical corpora
    #[arg(long, default_value_t = 0)]
    pub(crate) seed: u64,
    /// Output PGN path; stdout when omitted
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Debug)]
struct Account {
    name: String,
    rating: f64,
    /// True playing strength; over-performers sit well above their rating.
    strength_edge: f64,
}

pub(crate) fn run(arg: &GenCorpusArg) -> anyhow::Result<()> {
    let GenCorpusArg {
        games,
        players,
        seed,
        output,
    } = arg;
    anyhow::ensure!(*players >= 2, "need at least two players");

    let mut rng = Pcg64Mcg::seed_from_u64(*seed);
    let mut accounts = (0..*players)
        .map(|i| Account {
            name: format!("player{i}"),
            rating: f64::from(rng.random_range(1400..=2100)),
            strength_edge: if i % OVERPERFORMER_SHARE == 0 {
                OVERPERFORMER_EDGE
            } else {
                0.0
            },
        })
        .collect::<Vec<_>>();
    let overperformers = accounts.iter().filter(|a| a.strength_edge > 0.0).count();

    let mut output = Output::from_output_path(output.clone())?;
    eprintln!(
        "Generating {games} games across {players} accounts ({overperformers} over-performing)..."
    );

    for _ in 0..*games {
        let white = rng.random_range(0..accounts.len());
        let black = loop {
            let candidate = rng.random_range(0..accounts.len());
            if candidate != white {
                break candidate;
            }
        };
        let (event, clocks) = CLOCKS[rng.random_range(0..CLOCKS.len())];
        let clock = clocks[usize::from(rng.random_bool(0.5))];

        let white_strength = accounts[white].rating + accounts[white].strength_edge;
        let black_strength = accounts[black].rating + accounts[black].strength_edge;
        let white_win = elo_expectation(white_strength, black_strength);
        let (result, white_score) = if rng.random_bool(DRAW_PROBABILITY) {
            ("1/2-1/2", 0.5)
        } else if rng.random_bool(white_win) {
            ("1-0", 1.0)
        } else {
            ("0-1", 0.0)
        };

        // rating updates follow the *ratings*, so over-performers keep
        // gaining: their published rating chases a strength it never reaches
        let expectation = elo_expectation(accounts[white].rating, accounts[black].rating);
        let white_gain = (RATING_K * (white_score - expectation)).round();
        let black_gain = -white_gain;

        writeln!(output, "[Event \"{event}\"]")?;
        writeln!(output, "[White \"{}\"]", accounts[white].name)?;
        writeln!(output, "[Black \"{}\"]", accounts[black].name)?;
        writeln!(output, "[Result \"{result}\"]")?;
        writeln!(output, "[WhiteElo \"{}\"]", accounts[white].rating)?;
        writeln!(output, "[BlackElo \"{}\"]", accounts[black].rating)?;
        writeln!(output, "[WhiteRatingDiff \"{white_gain:+}\"]")?;
        writeln!(output, "[BlackRatingDiff \"{black_gain:+}\"]")?;
        writeln!(output, "[TimeControl \"{clock}\"]")?;
        writeln!(output)?;
        writeln!(output, "1. e4 e5 2. Nf3 Nc6 {result}")?;
        writeln!(output)?;

        accounts[white].rating += white_gain;
        accounts[black].rating += black_gain;
    }

    output.flush()?;
    eprintln!("Wrote {games} games to {}.", output.display_path());
    Ok(())
}

fn elo_expectation(rating: f64, opponent_rating: f64) -> f64 {
    1.0 / (1.0 + 10.0_f64.powf((opponent_rating - rating) / 400.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elo_expectation_is_symmetric() {
        let a = elo_expectation(1700.0, 1500.0);
        let b = elo_expectation(1500.0, 1700.0);
        assert!((a + b - 1.0).abs() < 1e-12);
        assert!(a > 0.5);
    }
}
