use clap::{Parser, Subcommand};

use self::{
    extract::ExtractArg, features::FeaturesArg, fit::FitArg, gen_corpus::GenCorpusArg,
    predict::PredictArg,
};

mod extract;
mod features;
mod fit;
mod gen_corpus;
mod predict;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What stage of the pipeline to run
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Extract per-player observations from a PGN corpus
    Extract(#[clap(flatten)] ExtractArg),
    /// Aggregate observations into per-player feature rows
    Features(#[clap(flatten)] FeaturesArg),
    /// Calibrate anomaly thresholds against account-status labels
    Fit(#[clap(flatten)] FitArg),
    /// Classify feature rows with a calibrated model
    Predict(#[clap(flatten)] PredictArg),
    /// Generate a synthetic rated corpus for offline runs
    GenCorpus(#[clap(flatten)] GenCorpusArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Extract(arg) => extract::run(&arg)?,
        Mode::Features(arg) => features::run(&arg)?,
        Mode::Fit(arg) => fit::run(&arg)?,
        Mode::Predict(arg) => predict::run(&arg)?,
        Mode::GenCorpus(arg) => gen_corpus::run(&arg)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fmt::Write as _;

    use fairwatch_model::ModelArtifact;

    use super::*;
    use crate::util::read_csv_file;

    /// 40 alternating games between two stable players, enough for both to
    /// clear the minimum-games cutoff.
    fn synthetic_pgn() -> String {
        let mut pgn = String::new();
        for i in 0..40 {
            let result = if i % 2 == 0 { "1-0" } else { "0-1" };
            write!(
                pgn,
                "[Event \"Rated Blitz game\"]\n\
                 [White \"alice\"]\n\
                 [Black \"bob\"]\n\
                 [Result \"{result}\"]\n\
                 [WhiteElo \"1612\"]\n\
                 [BlackElo \"1587\"]\n\
                 [WhiteRatingDiff \"+4\"]\n\
                 [BlackRatingDiff \"-4\"]\n\
                 [TimeControl \"300+0\"]\n\
                 \n\
                 1. e4 e5 {result}\n\n"
            )
            .unwrap();
        }
        pgn
    }

    #[test]
    fn test_pipeline_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let pgn_path = dir.path().join("corpus.pgn");
        let observations_path = dir.path().join("observations.csv");
        let features_path = dir.path().join("features.csv");
        let status_path = dir.path().join("statuses.csv");
        let model_path = dir.path().join("model.json");
        let classified_path = dir.path().join("classified.csv");

        std::fs::write(&pgn_path, synthetic_pgn()).unwrap();
        std::fs::write(
            &status_path,
            "player,account_status\nalice,open\nbob,tosViolation\n",
        )
        .unwrap();

        extract::run(&ExtractArg {
            pgn: pgn_path,
            output: Some(observations_path.clone()),
        })
        .unwrap();

        features::run(&FeaturesArg {
            observations: observations_path,
            output: Some(features_path.clone()),
        })
        .unwrap();

        fit::run(&FitArg {
            features: features_path.clone(),
            status_file: Some(status_path),
            lichess: false,
            lichess_url: "https://lichess.org".to_owned(),
            name: "anomaly".to_owned(),
            corpus: "synthetic".to_owned(),
            output: Some(model_path.clone()),
        })
        .unwrap();

        predict::run(&PredictArg {
            features: features_path,
            model: model_path.clone(),
            output: Some(classified_path.clone()),
        })
        .unwrap();

        let artifact: ModelArtifact = serde_json::from_reader(
            std::fs::File::open(&model_path).unwrap(),
        )
        .unwrap();
        assert_eq!(artifact.corpus, "synthetic");
        assert!(!artifact.thresholds.is_empty());

        #[derive(Debug, serde::Deserialize)]
        struct Classified {
            player: String,
            is_anomaly: Option<bool>,
        }
        let classified: Vec<Classified> = read_csv_file("classified", &classified_path).unwrap();
        assert_eq!(classified.len(), 2);
        assert!(classified.iter().all(|row| row.is_anomaly.is_some()));
        assert!(classified.iter().any(|row| row.player == "alice"));
    }

    #[test]
    fn test_gen_corpus_output_survives_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let pgn_path = dir.path().join("generated.pgn");
        let observations_path = dir.path().join("observations.csv");

        gen_corpus::run(&GenCorpusArg {
            games: 500,
            players: 20,
            seed: 7,
            output: Some(pgn_path.clone()),
        })
        .unwrap();

        extract::run(&ExtractArg {
            pgn: pgn_path,
            output: Some(observations_path.clone()),
        })
        .unwrap();

        #[derive(Debug, serde::Deserialize)]
        struct Observation {
            player: String,
        }
        let observations: Vec<Observation> =
            read_csv_file("observations", &observations_path).unwrap();
        assert!(!observations.is_empty());
        assert!(observations[0].player.starts_with("player"));
    }
}
