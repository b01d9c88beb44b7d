//! Client configuration. Credentials are passed in explicitly; nothing here
//! reads or writes the process environment.

use std::fmt;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://bigquery.googleapis.com/bigquery/v2";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// OAuth2 bearer token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub(crate) fn header_value(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Settings for [`crate::BigQuery`].
#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    pub token: AccessToken,
    pub base_url: String,
    /// Location for newly created datasets; `None` lets the service choose.
    pub location: Option<String>,
    /// Applies to each HTTP request (connect and read), not to a whole job.
    pub request_timeout: Duration,
    pub poll_interval: Duration,
    /// Upper bound on waiting for a job. `None` waits until the job finishes.
    pub job_timeout: Option<Duration>,
}

impl WarehouseConfig {
    pub fn new(token: AccessToken) -> Self {
        Self {
            token,
            base_url: DEFAULT_BASE_URL.to_string(),
            location: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            job_timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_debug_is_redacted() {
        let token = AccessToken::new("ya29.secret");
        assert!(!format!("{token:?}").contains("secret"));
        assert_eq!(token.header_value(), "Bearer ya29.secret");
    }

    #[test]
    fn defaults_block_until_completion() {
        let config = WarehouseConfig::new(AccessToken::new("t"));
        assert!(config.job_timeout.is_none());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }
}
