use std::path::PathBuf;

use anyhow::Context;
use fairwatch_features::PlayerFeatureRow;
use fairwatch_model::AnomalyModel;

use crate::util::{read_csv_file, save_csv};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PredictArg {
    /// Input feature table (CSV)
    #[arg(long)]
    pub(crate) features: PathBuf,
    /// Calibrated model artifact (JSON)
    #[arg(long)]
    pub(crate) model: PathBuf,
    /// Output classified table (CSV); stdout when omitted
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

pub(crate) fn run(arg: &PredictArg) -> anyhow::Result<()> {
    let PredictArg {
        features,
        model,
        output,
    } = arg;
    let rows: Vec<PlayerFeatureRow> = read_csv_file("features", features)?;
    let model = AnomalyModel::load(model)
        .with_context(|| format!("Failed to load model artifact: {}", model.display()))?;

    let prediction = model.predict(&rows)?;
    eprintln!(
        "Classified {} rows: {} flagged, {} unscorable, {} skipped.",
        prediction.rows.len(),
        prediction.flagged(),
        prediction.unscorable,
        prediction.skipped_unrecognized,
    );

    save_csv(&prediction.rows, output.clone())
}
