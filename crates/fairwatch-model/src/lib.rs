//! Self-calibrating anomaly thresholds over player feature rows.
//!
//! The [`AnomalyModel`](model::AnomalyModel) learns, per (time control,
//! rating bin) group, the performance-difference cutoff that best separates
//! weakly labeled suspicious accounts from clean ones, then classifies
//! feature rows against the learned table.
//!
//! # Calibration
//!
//! Each group runs an independent 1-D sweep: starting from the uniform
//! default threshold, the cutoff is raised in fixed steps until no row is
//! flagged. At every step the flagged players' account statuses (resolved
//! through an injected [`AccountOracle`](fairwatch_oracle::AccountOracle))
//! are scored, and the composite metric `ln(flagged + 1) · accuracy` decides
//! the winner. The logarithmic factor rewards thresholds implicating more
//! players at comparable accuracy, so a "perfect" threshold flagging one
//! player does not win outright.
//!
//! Group sweeps are mutually independent and run on scoped threads; all of
//! them share one status cache and one oracle behind a single resolver
//! worker, so a player flagged by several groups is resolved at most once
//! and a stalled resolution costs each waiting group a bounded wait instead
//! of wedging the pass.
//!
//! # Modules
//!
//! - [`threshold`]: group keys and the threshold table
//! - [`model`]: fit / predict / save / load
//! - [`calibrate`]: the per-group sweep
//! - [`artifact`]: the persisted model artifact

pub mod artifact;
pub mod calibrate;
pub mod model;
mod resolver;
pub mod threshold;

pub use self::{
    artifact::{ArtifactError, ModelArtifact, ThresholdEntry},
    calibrate::{DEFAULT_THRESHOLD, GroupCalibration, MAX_SWEEP_STEPS},
    model::{AnomalyModel, ClassifiedRow, FitReport, PredictError, Prediction},
    threshold::{GroupKey, ThresholdTable},
};
