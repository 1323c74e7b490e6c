use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use fairwatch_features::PlayerFeatureRow;
use fairwatch_model::AnomalyModel;
use fairwatch_oracle::{AccountOracle, LichessOracle, StatusFileOracle};

use crate::util::read_csv_file;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct FitArg {
    /// Input feature table (CSV)
    #[arg(long)]
    pub(crate) features: PathBuf,
    /// Offline account-status labels (CSV: player,account_status)
    #[arg(long, conflicts_with = "lichess")]
    pub(crate) status_file: Option<PathBuf>,
    /// Resolve account statuses live against lichess
    #[arg(long)]
    pub(crate) lichess: bool,
    /// Base URL for live resolution
    #[arg(long, default_value = "https://lichess.org")]
    pub(crate) lichess_url: String,
    /// Model label used in the artifact key
    #[arg(long, default_value = "anomaly")]
    pub(crate) name: String,
    /// Source-corpus identifier used in the artifact key
    #[arg(long)]
    pub(crate) corpus: String,
    /// Output model artifact; defaults to {corpus}_{name}.model.json
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

pub(crate) fn run(arg: &FitArg) -> anyhow::Result<()> {
    let FitArg {
        features,
        status_file,
        lichess,
        lichess_url,
        name,
        corpus,
        output,
    } = arg;

    let rows: Vec<PlayerFeatureRow> = read_csv_file("features", features)?;
    eprintln!("Read {} feature rows.", rows.len());

    let oracle: Arc<dyn AccountOracle> = match status_file {
        Some(path) => Arc::new(
            StatusFileOracle::open(path)
                .with_context(|| format!("Failed to load status file: {}", path.display()))?,
        ),
        None if *lichess => Arc::new(
            LichessOracle::with_base_url(lichess_url)
                .context("Failed to build the lichess client")?,
        ),
        None => anyhow::bail!("either --status-file or --lichess is required"),
    };

    let mut model = AnomalyModel::new(name, corpus);
    let report = model.fit(&rows, oracle);
    if report.skipped_unrecognized > 0 {
        eprintln!(
            "Skipped {} rows in unrecognized time controls.",
            report.skipped_unrecognized
        );
    }

    println!(
        "{:>10} {:>10} {:>10} {:>8} {:>9} {:>8}",
        "control", "bin", "threshold", "flagged", "accuracy", "metric"
    );
    for group in &report.groups {
        println!(
            "{:>10} {:>10} {:>10.2} {:>8} {:>9.4} {:>8.4}",
            group.key.time_control.label(),
            group.key.rating_bin,
            group.threshold,
            group.flagged,
            group.accuracy,
            group.metric,
        );
    }

    let path = output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{corpus}_{name}.model.json")));
    model
        .save(&path)
        .with_context(|| format!("Failed to save model artifact: {}", path.display()))?;
    eprintln!("Saved model to {}.", path.display());
    Ok(())
}
