use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::errors::{ControlPlaneError, Result};

pub const MAX_INDEX_NAME_LEN: usize = 45;

/// Distance metric an index is configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Euclidean,
    Cosine,
    Dotproduct,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Euclidean => "euclidean",
            Metric::Cosine => "cosine",
            Metric::Dotproduct => "dotproduct",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = ControlPlaneError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "euclidean" => Ok(Metric::Euclidean),
            "cosine" => Ok(Metric::Cosine),
            "dotproduct" => Ok(Metric::Dotproduct),
            other => Err(ControlPlaneError::InvalidIndexSpec(format!(
                "unknown metric '{}' (expected euclidean, cosine or dotproduct)",
                other
            ))),
        }
    }
}

/// Body of `POST /databases`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateIndex {
    pub name: String,
    pub dimension: u32,
    pub metric: Metric,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pods: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_type: Option<String>,
}

impl CreateIndex {
    pub fn new(name: impl Into<String>, dimension: u32, metric: Metric) -> Self {
        Self {
            name: name.into(),
            dimension,
            metric,
            pods: None,
            replicas: None,
            pod_type: None,
        }
    }

    /// The fixed index the quickstart run provisions.
    pub fn quickstart() -> Self {
        use crate::defaults::*;
        Self::new(QUICKSTART_INDEX_NAME, QUICKSTART_DIMENSION, QUICKSTART_METRIC)
    }

    pub fn pods(mut self, pods: u32) -> Self {
        self.pods = Some(pods);
        self
    }

    pub fn replicas(mut self, replicas: u32) -> Self {
        self.replicas = Some(replicas);
        self
    }

    pub fn pod_type(mut self, pod_type: impl Into<String>) -> Self {
        self.pod_type = Some(pod_type.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_index_name(&self.name)?;
        if self.dimension == 0 {
            return Err(ControlPlaneError::InvalidIndexSpec(
                "dimension must be greater than zero".to_string(),
            ));
        }
        if self.pods == Some(0) || self.replicas == Some(0) {
            return Err(ControlPlaneError::InvalidIndexSpec(
                "pods and replicas must be greater than zero when set".to_string(),
            ));
        }
        Ok(())
    }
}

fn index_name_pattern() -> &'static regex::Regex {
    static PATTERN: OnceLock<regex::Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        regex::Regex::new(r"^[a-z0-9]([a-z0-9-]*[a-z0-9])?$").expect("static index name pattern")
    })
}

pub fn validate_index_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > MAX_INDEX_NAME_LEN {
        return Err(ControlPlaneError::InvalidIndexSpec(format!(
            "index name must be 1-{} characters, got {}",
            MAX_INDEX_NAME_LEN,
            name.len()
        )));
    }
    if !index_name_pattern().is_match(name) {
        return Err(ControlPlaneError::InvalidIndexSpec(format!(
            "index name '{}' must consist of lowercase alphanumerics or '-' and start and end with an alphanumeric",
            name
        )));
    }
    Ok(())
}

/// Response of `GET /actions/whoami`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhoAmI {
    pub project_name: String,
    #[serde(default)]
    pub user_label: String,
    #[serde(default)]
    pub user_name: String,
}

/// Response of `GET /databases/{name}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDescription {
    pub database: IndexDatabase,
    pub status: IndexStatus,
}

impl IndexDescription {
    pub fn is_ready(&self) -> bool {
        self.status.ready
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDatabase {
    pub name: String,
    pub dimension: u32,
    pub metric: Metric,
    #[serde(default)]
    pub pods: Option<u32>,
    #[serde(default)]
    pub replicas: Option<u32>,
    #[serde(default)]
    pub shards: Option<u32>,
    #[serde(default)]
    pub pod_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexStatus {
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
}
