//! Readiness gate for the graph store.
//!
//! [`wait_ready`] polls a health probe at a fixed interval until it answers
//! or the context's deadline elapses. There is no attempt limit; the
//! deadline is the only bound.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use socialgraph_core::{Context, Interrupted};

#[derive(Debug, thiserror::Error)]
pub enum ReadyError {
    #[error("Graph store at {endpoint} not ready after {waited:?}")]
    Timeout { endpoint: String, waited: Duration },

    #[error("Readiness wait cancelled")]
    Cancelled,

    #[error("Failed to build readiness probe: {0}")]
    ClientBuild(String),
}

impl ReadyError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// A single lightweight health check.
#[async_trait]
pub trait Probe: Send + Sync {
    /// What is being probed, for logs and errors.
    fn target(&self) -> &str;

    /// `Ok` when the target is serving; `Err` carries the failure reason.
    async fn probe(&self) -> Result<(), String>;
}

/// Probe that GETs a health URL and treats any 2xx as ready.
pub struct HttpProbe {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpProbe {
    /// `attempt_timeout` bounds each individual probe request.
    pub fn new(endpoint: &str, attempt_timeout: Duration) -> Result<Self, ReadyError> {
        let client = reqwest::Client::builder()
            .timeout(attempt_timeout)
            .build()
            .map_err(|e| ReadyError::ClientBuild(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl Probe for HttpProbe {
    fn target(&self) -> &str {
        &self.endpoint
    }

    async fn probe(&self) -> Result<(), String> {
        let resp = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(format!("health endpoint returned {}", resp.status()))
        }
    }
}

/// Block until `probe` succeeds, retrying every `retry_interval`.
///
/// Returns [`ReadyError::Timeout`] (not the last probe failure) once the
/// deadline on `ctx` passes, and [`ReadyError::Cancelled`] as soon as `ctx`
/// is cancelled. The wait between attempts is interrupted by either.
pub async fn wait_ready<P>(probe: &P, retry_interval: Duration, ctx: &Context) -> Result<(), ReadyError>
where
    P: Probe + ?Sized,
{
    let start = Instant::now();
    let interrupted = |reason: Interrupted| match reason {
        Interrupted::Cancelled => ReadyError::Cancelled,
        Interrupted::DeadlineExceeded => ReadyError::Timeout {
            endpoint: probe.target().to_string(),
            waited: start.elapsed(),
        },
    };

    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match ctx.run(probe.probe()).await {
            Ok(Ok(())) => {
                tracing::info!(
                    endpoint = %probe.target(),
                    attempt,
                    waited_ms = start.elapsed().as_millis() as u64,
                    "Graph store ready"
                );
                return Ok(());
            }
            Ok(Err(reason)) => {
                tracing::debug!(endpoint = %probe.target(), attempt, reason = %reason, "Graph store not ready");
            }
            Err(reason) => return Err(interrupted(reason)),
        }

        ctx.sleep(retry_interval).await.map_err(interrupted)?;
    }
}

/// [`wait_ready`] against an HTTP health endpoint.
pub async fn wait_ready_http(
    endpoint: &str,
    retry_interval: Duration,
    ctx: &Context,
) -> Result<(), ReadyError> {
    let attempt_timeout = retry_interval.max(Duration::from_secs(1));
    let probe = HttpProbe::new(endpoint, attempt_timeout)?;
    wait_ready(&probe, retry_interval, ctx).await
}
