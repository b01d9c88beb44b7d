//! Session configuration.
//!
//! The session file uses the descriptor line grammar:
//!
//! ```text
//! projectid=acme-prod
//! credentials=/secrets/bigquery.token
//! dataset=knit
//! location=EU
//! ```
//!
//! `credentials` names a file holding an OAuth2 bearer access token. The token
//! is handed to the warehouse client directly; the process environment is
//! never touched. A service-account JSON key in that file is rejected rather
//! than sent as a bearer token.

use std::fs;
use std::path::{Path, PathBuf};

use knit_core::descriptor;
use knit_warehouse::{AccessToken, WarehouseConfig};

use crate::error::{io_err, BuildError};
use crate::orchestrator::DEFAULT_DATASET;

/// Parsed session file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub project_id: Option<String>,
    pub credentials: Option<PathBuf>,
    pub dataset: String,
    pub location: Option<String>,
}

impl Session {
    pub fn parse(text: &str) -> Result<Self, BuildError> {
        let mut session = Session {
            project_id: None,
            credentials: None,
            dataset: DEFAULT_DATASET.to_string(),
            location: None,
        };
        for (_, key, value) in descriptor::pairs(text)? {
            match key {
                "projectid" => session.project_id = non_empty(value),
                "credentials" => session.credentials = non_empty(value).map(PathBuf::from),
                "dataset" => {
                    if let Some(v) = non_empty(value) {
                        session.dataset = v;
                    }
                }
                "location" => session.location = non_empty(value),
                other => tracing::debug!(key = other, "ignoring unknown session key"),
            }
        }
        Ok(session)
    }

    pub fn load(path: &Path) -> Result<Self, BuildError> {
        let text = fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        Self::parse(&text)
    }

    /// The billing/target project, required by `transform`.
    pub fn project_id(&self) -> Result<&str, BuildError> {
        self.project_id
            .as_deref()
            .ok_or_else(|| BuildError::Session("session has no 'projectid'".to_string()))
    }

    /// Read the bearer token named by `credentials`.
    pub fn access_token(&self) -> Result<AccessToken, BuildError> {
        let path = self
            .credentials
            .as_deref()
            .ok_or_else(|| BuildError::Session("session has no 'credentials'".to_string()))?;
        let raw = fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        let token = raw.trim();
        if token.is_empty() {
            return Err(BuildError::Session(format!(
                "credentials file {} is empty",
                path.display()
            )));
        }
        if token.starts_with('{') && token.contains("\"type\"") {
            return Err(BuildError::Session(
                "credentials file is a service-account key; expected an access token".to_string(),
            ));
        }
        Ok(AccessToken::new(token))
    }

    /// Warehouse client settings derived from this session.
    pub fn warehouse_config(&self) -> Result<WarehouseConfig, BuildError> {
        let mut config = WarehouseConfig::new(self.access_token()?);
        config.location = self.location.clone();
        Ok(config)
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
