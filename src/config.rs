use std::fmt;
use std::time::Duration;

use crate::defaults::*;
use crate::errors::{ControlPlaneError, Result};

/// API key for the controller. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Controller base URL for `environment`, unless `host` overrides it.
pub fn controller_url(environment: &str, host: Option<&str>) -> String {
    match host {
        Some(host) => host.trim_end_matches('/').to_string(),
        None => format!("https://controller.{}.pinecone.io", environment),
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub credential: Credential,
    pub environment: String,
    pub controller_host: Option<String>,
    pub request_timeout_ms: u64,
    pub poll_interval_ms: u64,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings through `lookup`. Only the credential is required.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credential = lookup(API_KEY_VAR)
            .map(Credential::new)
            .ok_or_else(|| ControlPlaneError::MissingCredential(API_KEY_VAR.to_string()))?;
        let environment = lookup(ENVIRONMENT_VAR)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());
        let controller_host = lookup(CONTROLLER_HOST_VAR).filter(|v| !v.is_empty());

        Ok(Self {
            credential,
            environment,
            controller_host,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        })
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    pub fn with_controller_host(mut self, host: impl Into<String>) -> Self {
        self.controller_host = Some(host.into());
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Controller base URL without a trailing slash.
    pub fn controller_url(&self) -> String {
        controller_url(&self.environment, self.controller_host.as_deref())
    }

    pub fn validate(&self) -> Result<()> {
        if self.environment.is_empty() {
            return Err(ControlPlaneError::InvalidConfig(
                "environment cannot be empty".to_string(),
            ));
        }
        let url = self.controller_url();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ControlPlaneError::InvalidConfig(format!(
                "controller host must be an http(s) URL, got '{}'",
                url
            )));
        }
        if self.request_timeout_ms == 0 {
            return Err(ControlPlaneError::InvalidConfig(
                "request timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
