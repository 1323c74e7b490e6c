use std::{fs::File, io::BufReader, path::PathBuf};

use anyhow::Context;
use fairwatch_extract::{LedgerBook, PgnReader, extract_games_with_progress};

use crate::util::save_csv;

const PROGRESS_INTERVAL: usize = 10_000;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ExtractArg {
    /// Input PGN corpus
    #[arg(long)]
    pub(crate) pgn: PathBuf,
    /// Output observation table (CSV); stdout when omitted
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

pub(crate) fn run(arg: &ExtractArg) -> anyhow::Result<()> {
    let ExtractArg { pgn, output } = arg;
    let file = File::open(pgn)
        .with_context(|| format!("Failed to open PGN file: {}", pgn.display()))?;
    let reader = PgnReader::new(BufReader::new(file));

    eprintln!("Parsing {}...", pgn.display());
    let mut book = LedgerBook::new();
    let summary = extract_games_with_progress(reader, &mut book, |summary| {
        if summary.games_accepted.is_multiple_of(PROGRESS_INTERVAL) {
            eprintln!("{} games parsed...", summary.games_accepted);
        }
    })
    .with_context(|| format!("Failed to read PGN file: {}", pgn.display()))?;

    eprintln!("{} [valid] games parsed.", summary.games_accepted);
    eprintln!(
        "{} games skipped, {} observations kept, {} dropped as placeholder-rated first games.",
        summary.games_skipped(),
        summary.observations_kept,
        summary.observations_dropped,
    );

    save_csv(book.observations(), output.clone())
}
