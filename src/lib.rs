//! Quickstart Index
//!
//! Provisions an index on a hosted vector database through its controller API.

pub mod client;
pub mod config;
pub mod model;
pub mod provision;

pub use client::{Connector, ControlPlane, HttpConnector, HttpControlPlane};
pub use config::{Credential, Settings};
pub use model::*;
pub use provision::{run_quickstart, WaitPolicy};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration values
pub mod defaults {
    use crate::model::Metric;

    pub const API_KEY_VAR: &str = "PINECONE_API";
    pub const ENVIRONMENT_VAR: &str = "PINECONE_ENVIRONMENT";
    pub const CONTROLLER_HOST_VAR: &str = "PINECONE_CONTROLLER_HOST";

    pub const DEFAULT_ENVIRONMENT: &str = "gcp-starter";
    pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
    pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;

    pub const QUICKSTART_INDEX_NAME: &str = "quickstart2";
    pub const QUICKSTART_DIMENSION: u32 = 8;
    pub const QUICKSTART_METRIC: Metric = Metric::Euclidean;
}

/// Error types for the control plane client
pub mod errors {
    use std::time::Duration;

    pub type Result<T> = std::result::Result<T, ControlPlaneError>;

    #[derive(Debug, thiserror::Error)]
    pub enum ControlPlaneError {
        #[error("Environment variable {0} is not set")]
        MissingCredential(String),

        #[error("Invalid configuration: {0}")]
        InvalidConfig(String),

        #[error("Invalid index spec: {0}")]
        InvalidIndexSpec(String),

        #[error("Network error: {0}")]
        Network(#[from] reqwest::Error),

        #[error("Serialization error: {0}")]
        Serialization(#[from] serde_json::Error),

        #[error("Index already exists ({status}): {message}")]
        AlreadyExists { status: u16, message: String },

        #[error("Index not found ({status}): {message}")]
        NotFound { status: u16, message: String },

        #[error("Service error: {status} - {message}")]
        Service { status: u16, message: String },

        #[error("Index {index} not ready after {waited:?}")]
        WaitTimeout { index: String, waited: Duration },
    }

    impl ControlPlaneError {
        /// Map a non-success controller response onto an error, keeping the body verbatim.
        pub fn from_status(status: u16, message: String) -> Self {
            match status {
                409 => ControlPlaneError::AlreadyExists { status, message },
                404 => ControlPlaneError::NotFound { status, message },
                _ => ControlPlaneError::Service { status, message },
            }
        }

        pub fn is_already_exists(&self) -> bool {
            matches!(self, ControlPlaneError::AlreadyExists { .. })
        }

        pub fn status(&self) -> Option<u16> {
            match self {
                ControlPlaneError::AlreadyExists { status, .. }
                | ControlPlaneError::NotFound { status, .. }
                | ControlPlaneError::Service { status, .. } => Some(*status),
                ControlPlaneError::Network(e) => e.status().map(|s| s.as_u16()),
                _ => None,
            }
        }
    }

}
