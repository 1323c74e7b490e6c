//! In-memory oracle for tests and dry runs.

use std::collections::HashMap;

use crate::{AccountOracle, AccountStatus, OracleError};

/// [`AccountOracle`] over a fixed in-memory map.
///
/// Players absent from the map resolve to [`AccountStatus::NotFound`].
#[derive(Debug, Clone, Default)]
pub struct FixedOracle {
    statuses: HashMap<String, AccountStatus>,
}

impl FixedOracle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, player: &str, status: AccountStatus) -> Self {
        self.statuses.insert(player.to_owned(), status);
        self
    }
}

impl<S> FromIterator<(S, AccountStatus)> for FixedOracle
where
    S: Into<String>,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (S, AccountStatus)>,
    {
        Self {
            statuses: iter
                .into_iter()
                .map(|(player, status)| (player.into(), status))
                .collect(),
        }
    }
}

impl AccountOracle for FixedOracle {
    fn resolve(&self, player: &str) -> Result<AccountStatus, OracleError> {
        Ok(self
            .statuses
            .get(player)
            .copied()
            .unwrap_or(AccountStatus::NotFound))
    }
}
