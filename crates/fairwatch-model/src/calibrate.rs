//! The per-group threshold sweep.

use fairwatch_oracle::AccountStatus;
use serde::Serialize;

use crate::{resolver::StatusResolver, threshold::GroupKey};

/// Uniform threshold every observed group starts from.
pub const DEFAULT_THRESHOLD: f64 = 0.15;

/// Safety cap on sweep iterations. The sweep stops on its own once no row is
/// flagged; the cap guards against degenerate inputs.
pub const MAX_SWEEP_STEPS: u32 = 1000;

/// Sweep grid in integer hundredths, so long sweeps never accumulate
/// floating-point drift: `tᵢ = (15 + i) / 100`.
const SWEEP_START_CENTS: u32 = 15;
const SWEEP_STEP_CENTS: u32 = 1;

fn threshold_at(step: u32) -> f64 {
    f64::from(SWEEP_START_CENTS + step * SWEEP_STEP_CENTS) / 100.0
}

/// Suspicion score of an account status, or `None` when the status carries
/// no signal and must not enter the accuracy mean.
///
/// A closed account is more suspicious than an open one but less certain
/// than a confirmed violation.
fn suspicion_score(status: AccountStatus) -> Option<f64> {
    match status {
        AccountStatus::Open => Some(0.0),
        AccountStatus::TosViolation => Some(1.0),
        AccountStatus::Closed => Some(0.75),
        AccountStatus::NotFound | AccountStatus::Unknown => None,
    }
}

/// One mean-performance-difference sample inside a group.
#[derive(Debug, Clone)]
pub(crate) struct GroupRow {
    pub player: String,
    pub mean_perf_diff: f64,
}

/// Outcome of one group's sweep.
#[derive(Debug, Clone, Serialize)]
pub struct GroupCalibration {
    pub key: GroupKey,
    /// The winning threshold.
    pub threshold: f64,
    /// Steps the sweep examined before the flagged set emptied.
    pub steps_swept: u32,
    /// Players flagged at the winning threshold.
    pub flagged: usize,
    /// Mean suspicion score over the scoreable flagged players.
    pub accuracy: f64,
    /// `ln(flagged + 1) · accuracy` at the winning threshold.
    pub metric: f64,
}

/// Sweeps one group and returns the best threshold seen.
///
/// Raising the threshold can only shrink the flagged set, so the sweep stops
/// at the first empty step. Metric ties keep the first (lowest) threshold.
#[expect(clippy::cast_precision_loss)]
pub(crate) fn calibrate_group(
    key: GroupKey,
    rows: &[GroupRow],
    resolver: &StatusResolver,
) -> GroupCalibration {
    let mut best: Option<GroupCalibration> = None;
    let mut steps_swept = 0;

    for step in 0..MAX_SWEEP_STEPS {
        let threshold = threshold_at(step);
        let flagged = rows
            .iter()
            .filter(|row| row.mean_perf_diff > threshold)
            .collect::<Vec<_>>();
        if flagged.is_empty() {
            steps_swept = step;
            break;
        }
        steps_swept = step + 1;

        let scores = flagged
            .iter()
            .filter_map(|row| suspicion_score(resolver.lookup(&row.player)))
            .collect::<Vec<_>>();
        let accuracy = if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        };
        let metric = ((flagged.len() + 1) as f64).ln() * accuracy;

        if best.as_ref().is_none_or(|b| metric > b.metric) {
            best = Some(GroupCalibration {
                key,
                threshold,
                steps_swept,
                flagged: flagged.len(),
                accuracy,
                metric,
            });
        }
    }

    match best {
        Some(mut calibration) => {
            calibration.steps_swept = steps_swept;
            calibration
        }
        // no row ever exceeded the default threshold
        None => GroupCalibration {
            key,
            threshold: DEFAULT_THRESHOLD,
            steps_swept,
            flagged: 0,
            accuracy: 0.0,
            metric: 0.0,
        },
    }
}
