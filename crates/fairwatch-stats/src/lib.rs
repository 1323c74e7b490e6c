//! Statistical building blocks for the fairwatch pipeline.
//!
//! This crate provides the two numeric tools the feature and model layers
//! share:
//!
//! - **Summary statistics**: count, mean, median, and sample standard
//!   deviation for a batch of observations
//! - **Rating bins**: fixed-width, right-closed rating intervals labelled by
//!   their lower edge
//!
//! # Modules
//!
//! - [`summary`]: summary statistics for observation batches
//! - [`binning`]: fixed-width rating binning
//!
//! # Examples
//!
//! ## Summarizing a batch
//!
//! ```
//! use fairwatch_stats::summary::Summary;
//!
//! let values = [1.0, 2.0, 3.0, 4.0];
//! let summary = Summary::of(values).unwrap();
//! assert_eq!(summary.mean, 2.5);
//! assert_eq!(summary.median, 2.5);
//! ```
//!
//! ## Assigning rating bins
//!
//! ```
//! use fairwatch_stats::binning::RatingBins;
//!
//! let bins = RatingBins::covering(1512.0, 1787.0);
//! assert_eq!(bins.bin_of(1650.0), 1600);
//! ```

pub mod binning;
pub mod summary;
