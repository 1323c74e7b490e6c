//! Persisted model artifact: the threshold table and its provenance.
//!
//! Only the thresholds are persisted; the account-status cache is fit-time
//! state and a loaded model starts with an empty one.

use std::{
    fs::File,
    io::{self, BufReader, BufWriter},
    path::Path,
};

use chrono::{DateTime, Utc};
use fairwatch_extract::observation::TimeControlClass;
use serde::{Deserialize, Serialize};

use crate::{
    model::AnomalyModel,
    threshold::{GroupKey, ThresholdTable},
};

/// Failure saving or loading a model artifact.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ArtifactError {
    #[display("cannot save a model that has not been fitted")]
    NotFitted,
    #[display("failed to read or write the model artifact: {_0}")]
    Io(io::Error),
    #[display("malformed model artifact: {_0}")]
    Json(serde_json::Error),
}

/// One calibrated group in the artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdEntry {
    pub time_control: TimeControlClass,
    pub rating_bin: i64,
    pub threshold: f64,
}

/// The serialized form of a fitted model, keyed by model name and
/// source-corpus identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub name: String,
    pub corpus: String,
    pub calibrated_at: DateTime<Utc>,
    pub default_threshold: f64,
    /// Entries in group key order.
    pub thresholds: Vec<ThresholdEntry>,
}

impl AnomalyModel {
    /// Snapshot of this model as an artifact.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::NotFitted`] on an unfitted model.
    pub fn to_artifact(&self) -> Result<ModelArtifact, ArtifactError> {
        let calibrated_at = self.calibrated_at().ok_or(ArtifactError::NotFitted)?;
        Ok(ModelArtifact {
            name: self.name().to_owned(),
            corpus: self.corpus().to_owned(),
            calibrated_at,
            default_threshold: self.thresholds().default_threshold(),
            thresholds: self
                .thresholds()
                .iter()
                .map(|(key, threshold)| ThresholdEntry {
                    time_control: key.time_control,
                    rating_bin: key.rating_bin,
                    threshold,
                })
                .collect(),
        })
    }

    /// Reconstructs a fitted model from an artifact. The status cache starts
    /// empty.
    #[must_use]
    pub fn from_artifact(artifact: ModelArtifact) -> Self {
        let mut thresholds = ThresholdTable::new(artifact.default_threshold);
        for entry in artifact.thresholds {
            thresholds.set(
                GroupKey {
                    time_control: entry.time_control,
                    rating_bin: entry.rating_bin,
                },
                entry.threshold,
            );
        }
        Self::restore(artifact.name, artifact.corpus, artifact.calibrated_at, thresholds)
    }

    /// Writes the artifact as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::NotFitted`] on an unfitted model, or an I/O
    /// or serialization failure.
    pub fn save<P>(&self, path: P) -> Result<(), ArtifactError>
    where
        P: AsRef<Path>,
    {
        let artifact = self.to_artifact()?;
        let file = File::create(path).map_err(ArtifactError::Io)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &artifact).map_err(ArtifactError::Json)
    }

    /// Reads a JSON artifact back into a fitted model.
    ///
    /// # Errors
    ///
    /// Returns an I/O or deserialization failure.
    pub fn load<P>(path: P) -> Result<Self, ArtifactError>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path).map_err(ArtifactError::Io)?;
        let artifact =
            serde_json::from_reader(BufReader::new(file)).map_err(ArtifactError::Json)?;
        Ok(Self::from_artifact(artifact))
    }
}
