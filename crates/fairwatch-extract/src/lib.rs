//! Streaming extraction of per-player game observations from a PGN corpus.
//!
//! This crate implements the first stage of the fairwatch pipeline: it reads
//! a PGN-like stream of rated games, validates each record, and accumulates
//! two per-player observations per accepted game into per-(player, time
//! control) ledgers.
//!
//! # Pipeline Position
//!
//! ```text
//! PGN corpus
//!     ↓ PgnReader (header-only streaming)
//! RawGame records
//!     ↓ validation (skip malformed records, never abort)
//! GameObservation pairs
//!     ↓ LedgerBook (placeholder-rating rule, arrival order)
//! observation table
//! ```
//!
//! # Ordering
//!
//! Extraction is deliberately single-threaded: whether the *first* observation
//! for a (player, time control) key carries the provisional placeholder rating
//! decides if a ledger is ever created, so per-key arrival order must match
//! corpus order.
//!
//! # Modules
//!
//! - [`pgn`]: header-only PGN stream reader
//! - [`observation`]: time-control classes and per-game observations
//! - [`ledger`]: the [`LedgerBook`](ledger::LedgerBook) accumulator
//! - [`extract`]: record validation and the extraction driver

pub mod extract;
pub mod ledger;
pub mod observation;
pub mod pgn;

pub use self::{
    extract::{ExtractSummary, extract_games, extract_games_with_progress},
    ledger::{LedgerBook, PLACEHOLDER_RATING},
    observation::{GameObservation, TimeControlClass},
    pgn::{PgnReadError, PgnReader, RawGame},
};
