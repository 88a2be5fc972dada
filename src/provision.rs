use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::client::{Connector, ControlPlane};
use crate::config::Settings;
use crate::defaults::DEFAULT_ENVIRONMENT;
use crate::errors::{ControlPlaneError, Result};
use crate::model::{CreateIndex, IndexDescription};

/// How long `create_index` blocks for the new index to report ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitPolicy {
    NoWait,
    #[default]
    Indefinite,
    Timeout(Duration),
}

impl WaitPolicy {
    /// `None` waits indefinitely, a negative value returns immediately.
    pub fn from_timeout_secs(timeout: Option<i64>) -> Self {
        match timeout {
            None => WaitPolicy::Indefinite,
            Some(secs) if secs < 0 => WaitPolicy::NoWait,
            Some(secs) => WaitPolicy::Timeout(Duration::from_secs(secs as u64)),
        }
    }
}

/// Describe calls answered 404 right after create before the 404 is reported.
pub const NOT_FOUND_GRACE_POLLS: u32 = 3;

/// Initialize a session in the fixed quickstart region and create the fixed quickstart index.
///
/// The region is always `gcp-starter`; a configured environment only applies to other commands.
pub async fn run_quickstart<C: Connector>(
    connector: &C,
    settings: &Settings,
    wait: WaitPolicy,
) -> Result<Option<IndexDescription>> {
    if settings.environment != DEFAULT_ENVIRONMENT {
        warn!(
            configured = %settings.environment,
            environment = DEFAULT_ENVIRONMENT,
            "Ignoring configured environment for the quickstart index"
        );
    }
    provision_in(
        connector,
        settings,
        DEFAULT_ENVIRONMENT,
        &CreateIndex::quickstart(),
        wait,
    )
    .await
}

/// Initialize a session once in the configured environment, then create `spec` on it.
pub async fn provision<C: Connector>(
    connector: &C,
    settings: &Settings,
    spec: &CreateIndex,
    wait: WaitPolicy,
) -> Result<Option<IndexDescription>> {
    provision_in(connector, settings, &settings.environment, spec, wait).await
}

async fn provision_in<C: Connector>(
    connector: &C,
    settings: &Settings,
    environment: &str,
    spec: &CreateIndex,
    wait: WaitPolicy,
) -> Result<Option<IndexDescription>> {
    spec.validate()?;
    settings.validate()?;

    let session = connector.init(&settings.credential, environment).await?;
    create_index(&session, spec, wait, settings.poll_interval()).await
}

/// Issue the create call exactly once; errors from the service pass through untouched.
pub async fn create_index<P: ControlPlane + ?Sized>(
    plane: &P,
    spec: &CreateIndex,
    wait: WaitPolicy,
    poll_interval: Duration,
) -> Result<Option<IndexDescription>> {
    info!(
        index = %spec.name,
        dimension = spec.dimension,
        metric = %spec.metric,
        "Creating index"
    );
    plane.create_index(spec).await?;

    if wait == WaitPolicy::NoWait {
        info!(index = %spec.name, "Index creation requested");
        return Ok(None);
    }

    let description = wait_until_ready(plane, &spec.name, wait, poll_interval).await?;
    Ok(Some(description))
}

pub async fn wait_until_ready<P: ControlPlane + ?Sized>(
    plane: &P,
    name: &str,
    wait: WaitPolicy,
    poll_interval: Duration,
) -> Result<IndexDescription> {
    let started = Instant::now();
    let mut not_found_polls = 0;
    loop {
        match plane.describe_index(name).await {
            Ok(description) if description.is_ready() => {
                info!(
                    index = %name,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Index is ready"
                );
                return Ok(description);
            }
            Ok(description) => {
                debug!(index = %name, state = %description.status.state, "Index not ready yet");
            }
            // The controller may not list a freshly created index right away.
            Err(ControlPlaneError::NotFound { .. }) if not_found_polls < NOT_FOUND_GRACE_POLLS => {
                not_found_polls += 1;
                debug!(index = %name, attempt = not_found_polls, "Index not visible yet");
            }
            Err(e) => return Err(e),
        }

        if let WaitPolicy::Timeout(limit) = wait {
            if started.elapsed() >= limit {
                warn!(index = %name, waited_ms = limit.as_millis() as u64, "Gave up waiting for index");
                return Err(ControlPlaneError::WaitTimeout {
                    index: name.to_string(),
                    waited: limit,
                });
            }
        }
        tokio::time::sleep(poll_interval).await;
    }
}
