//! Live account-status lookups against the lichess user API.

use std::{
    sync::{Mutex, PoisonError},
    thread,
    time::{Duration, Instant},
};

use serde::Deserialize;
use tracing::debug;

use crate::{AccountOracle, AccountStatus, OracleError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// The upstream API asks for one request at a time; spacing requests out
/// keeps a long labeling pass under the rate limit.
const MIN_REQUEST_SPACING: Duration = Duration::from_millis(750);

const USER_AGENT: &str = concat!("fairwatch/", env!("CARGO_PKG_VERSION"));

/// [`AccountOracle`] backed by `GET {base}/api/user/{player}`.
///
/// Requests are paced to [`MIN_REQUEST_SPACING`]; pacing serializes across
/// threads through an internal mutex, so one instance can be shared safely.
#[derive(Debug)]
pub struct LichessOracle {
    client: reqwest::blocking::Client,
    base_url: String,
    last_request: Mutex<Option<Instant>>,
}

impl LichessOracle {
    /// Creates an oracle against the public lichess API.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Http`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, OracleError> {
        Self::with_base_url("https://lichess.org")
    }

    /// Creates an oracle against a custom base URL (mirrors, test servers).
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Http`] if the HTTP client cannot be built.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, OracleError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(OracleError::Http)?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            last_request: Mutex::new(None),
        })
    }

    fn pace(&self) {
        let mut last_request = self
            .last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(last) = *last_request {
            let elapsed = last.elapsed();
            if elapsed < MIN_REQUEST_SPACING {
                thread::sleep(MIN_REQUEST_SPACING - elapsed);
            }
        }
        *last_request = Some(Instant::now());
    }
}

/// The slice of the user payload the status mapping needs.
#[derive(Debug, Default, Deserialize)]
struct UserPayload {
    #[serde(default, rename = "tosViolation")]
    tos_violation: bool,
    #[serde(default)]
    disabled: bool,
}

impl AccountOracle for LichessOracle {
    fn resolve(&self, player: &str) -> Result<AccountStatus, OracleError> {
        self.pace();
        let url = format!("{}/api/user/{player}", self.base_url);
        debug!(player, "resolving account status");
        let response = self.client.get(&url).send().map_err(OracleError::Http)?;
        match response.status().as_u16() {
            200 => {
                let payload: UserPayload =
                    response.json().map_err(OracleError::MalformedPayload)?;
                Ok(if payload.tos_violation {
                    AccountStatus::TosViolation
                } else if payload.disabled {
                    AccountStatus::Closed
                } else {
                    AccountStatus::Open
                })
            }
            404 => Ok(AccountStatus::NotFound),
            429 => Err(OracleError::RateLimited),
            status => Err(OracleError::UnexpectedStatus { status }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_flag_mapping() {
        let payload: UserPayload =
            serde_json::from_str(r#"{"id":"x","tosViolation":true}"#).unwrap();
        assert!(payload.tos_violation);
        assert!(!payload.disabled);

        let payload: UserPayload = serde_json::from_str(r#"{"id":"x","disabled":true}"#).unwrap();
        assert!(payload.disabled);

        let payload: UserPayload = serde_json::from_str(r#"{"id":"x"}"#).unwrap();
        assert!(!payload.tos_violation);
        assert!(!payload.disabled);
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let oracle = LichessOracle::with_base_url("http://localhost:9999/").unwrap();
        assert_eq!(oracle.base_url, "http://localhost:9999");
    }
}
