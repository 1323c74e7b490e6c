//! Offline account statuses from a labeled CSV.

use std::{collections::HashMap, fs::File, io, path::Path};

use serde::Deserialize;

use crate::{AccountOracle, AccountStatus, OracleError};

/// Failure loading a status file.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum StatusFileError {
    #[display("failed to open status file: {_0}")]
    Io(io::Error),
    #[display("malformed status file: {_0}")]
    Csv(csv::Error),
}

#[derive(Debug, Deserialize)]
struct StatusRecord {
    player: String,
    account_status: AccountStatus,
}

/// [`AccountOracle`] over a `player,account_status` CSV produced by an
/// earlier labeling run.
///
/// Players absent from the file resolve to [`AccountStatus::NotFound`],
/// mirroring what a live lookup of a label-less player would report.
#[derive(Debug)]
pub struct StatusFileOracle {
    statuses: HashMap<String, AccountStatus>,
}

impl StatusFileOracle {
    /// Loads statuses from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns [`StatusFileError`] if the file cannot be opened or parsed.
    pub fn open<P>(path: P) -> Result<Self, StatusFileError>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path).map_err(StatusFileError::Io)?;
        Self::from_reader(file)
    }

    /// Loads statuses from any CSV reader.
    ///
    /// # Errors
    ///
    /// Returns [`StatusFileError::Csv`] on a malformed record.
    pub fn from_reader<R>(reader: R) -> Result<Self, StatusFileError>
    where
        R: io::Read,
    {
        let mut statuses = HashMap::new();
        for record in csv::Reader::from_reader(reader).deserialize() {
            let record: StatusRecord = record.map_err(StatusFileError::Csv)?;
            statuses.insert(record.player, record.account_status);
        }
        Ok(Self { statuses })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}

impl AccountOracle for StatusFileOracle {
    fn resolve(&self, player: &str) -> Result<AccountStatus, OracleError> {
        Ok(self
            .statuses
            .get(player)
            .copied()
            .unwrap_or(AccountStatus::NotFound))
    }
}
