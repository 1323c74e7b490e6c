use std::path::PathBuf;

use fairwatch_extract::{GameObservation, LedgerBook};
use fairwatch_features::build_feature_rows;

use crate::util::{read_csv_file, save_csv};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct FeaturesArg {
    /// Input observation table (CSV)
    #[arg(long)]
    pub(crate) observations: PathBuf,
    /// Output feature table (CSV); stdout when omitted
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

pub(crate) fn run(arg: &FeaturesArg) -> anyhow::Result<()> {
    let FeaturesArg {
        observations,
        output,
    } = arg;
    let rows: Vec<GameObservation> = read_csv_file("observations", observations)?;
    eprintln!("Read {} observations.", rows.len());

    // Rebuilding the book re-applies the placeholder rule, which is harmless:
    // no persisted ledger can start at the placeholder rating.
    let mut book = LedgerBook::new();
    for observation in rows {
        book.record(observation);
    }
    let feature_rows = build_feature_rows(&book);
    eprintln!(
        "Aggregated {} ledgers into {} feature rows.",
        book.len(),
        feature_rows.len()
    );

    save_csv(&feature_rows, output.clone())
}
