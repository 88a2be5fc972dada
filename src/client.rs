//! Controller API client
//!
//! `Connector::init` opens a session (one `whoami` round trip); the session then
//! exposes the index management calls. Both are traits so the provisioning flow
//! can run against a test double.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::{self, Credential, Settings};
use crate::errors::{ControlPlaneError, Result};
use crate::model::{CreateIndex, IndexDescription, WhoAmI};

const API_KEY_HEADER: &str = "Api-Key";

/// Index management calls available once a session is initialized.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    async fn create_index(&self, spec: &CreateIndex) -> Result<()>;

    async fn describe_index(&self, name: &str) -> Result<IndexDescription>;

    async fn list_indexes(&self) -> Result<Vec<String>>;

    async fn delete_index(&self, name: &str) -> Result<()>;
}

/// Opens a session against a deployment region.
#[async_trait]
pub trait Connector: Send + Sync {
    type Session: ControlPlane;

    async fn init(&self, credential: &Credential, environment: &str) -> Result<Self::Session>;
}

#[derive(Debug, Clone)]
pub struct HttpConnector {
    controller_host: Option<String>,
    request_timeout: Duration,
}

impl HttpConnector {
    pub fn new(controller_host: Option<String>, request_timeout: Duration) -> Self {
        Self {
            controller_host,
            request_timeout,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.controller_host.clone(), settings.request_timeout())
    }
}

#[async_trait]
impl Connector for HttpConnector {
    type Session = HttpControlPlane;

    async fn init(&self, credential: &Credential, environment: &str) -> Result<HttpControlPlane> {
        let base_url = config::controller_url(environment, self.controller_host.as_deref());
        let http = Client::builder().timeout(self.request_timeout).build()?;

        let mut session = HttpControlPlane {
            http,
            base_url,
            credential: credential.clone(),
            environment: environment.to_string(),
            project_name: String::new(),
        };

        let identity = session.whoami().await?;
        info!(
            environment = %environment,
            project = %identity.project_name,
            "Initialized controller session"
        );
        session.project_name = identity.project_name;

        Ok(session)
    }
}

/// Session against the controller REST API.
#[derive(Debug, Clone)]
pub struct HttpControlPlane {
    http: Client,
    base_url: String,
    credential: Credential,
    environment: String,
    project_name: String,
}

impl HttpControlPlane {
    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub async fn whoami(&self) -> Result<WhoAmI> {
        let url = format!("{}/actions/whoami", self.base_url);
        let response = self.authorized(self.http.get(&url)).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(API_KEY_HEADER, self.credential.expose())
    }
}

/// Pass successful responses through; turn anything else into an error with the body verbatim.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(ControlPlaneError::from_status(status.as_u16(), message))
}

#[async_trait]
impl ControlPlane for HttpControlPlane {
    async fn create_index(&self, spec: &CreateIndex) -> Result<()> {
        let url = format!("{}/databases", self.base_url);
        debug!(index = %spec.name, dimension = spec.dimension, metric = %spec.metric, "POST {}", url);

        let response = self.authorized(self.http.post(&url).json(spec)).send().await?;
        check_status(response).await?;
        Ok(())
    }

    async fn describe_index(&self, name: &str) -> Result<IndexDescription> {
        let url = format!("{}/databases/{}", self.base_url, name);
        let response = self.authorized(self.http.get(&url)).send().await?;
        let response = check_status(response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn list_indexes(&self) -> Result<Vec<String>> {
        let url = format!("{}/databases", self.base_url);
        let response = self.authorized(self.http.get(&url)).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn delete_index(&self, name: &str) -> Result<()> {
        let url = format!("{}/databases/{}", self.base_url, name);
        let response = self.authorized(self.http.delete(&url)).send().await?;
        check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connector_from_settings() {
        let settings = Settings::from_lookup(|key| match key {
            "PINECONE_API" => Some("secret".to_string()),
            "PINECONE_CONTROLLER_HOST" => Some("http://localhost:9000".to_string()),
            _ => None,
        })
        .unwrap();
        let connector = HttpConnector::from_settings(&settings);
        assert_eq!(connector.controller_host.as_deref(), Some("http://localhost:9000"));
        assert_eq!(connector.request_timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_init_unreachable_controller_fails() {
        // Nothing listens on port 1.
        let connector = HttpConnector::new(
            Some("http://127.0.0.1:1".to_string()),
            Duration::from_secs(2),
        );
        let result = connector.init(&Credential::new("secret"), "gcp-starter").await;
        assert!(matches!(result, Err(ControlPlaneError::Network(_))));
    }
}
