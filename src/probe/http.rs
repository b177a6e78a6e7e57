//! Single-request probe execution.
//!
//! The [`Prober`] owns one pooled HTTP client configured with the run's
//! timeout and redirect policy, and reduces every response to a
//! [`ProbeOutcome`]. TLS certificate validation is disabled on purpose: the
//! tool targets infrastructure that is routinely self-signed.

use std::sync::Arc;

use reqwest::header::LOCATION;
use reqwest::{redirect, Client};

use crate::probe::request;
use crate::stats::StatsCollector;
use crate::{ProbeOutcome, ScanConfig};

/// Prober construction failure.
#[derive(Debug, thiserror::Error)]
pub enum ProberError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Executes one HTTP request per candidate path. Stateless across calls and
/// safe to share between workers behind an `Arc`.
pub struct Prober {
    client: Client,
    config: Arc<ScanConfig>,
    stats: Arc<StatsCollector>,
}

impl Prober {
    /// Build a prober with the run's timeout, redirect policy, and insecure
    /// TLS settings applied to a single connection pool.
    pub fn new(config: Arc<ScanConfig>, stats: Arc<StatsCollector>) -> Result<Self, ProberError> {
        let redirects = if config.follow_redirects {
            redirect::Policy::limited(10)
        } else {
            redirect::Policy::none()
        };

        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(redirects)
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self {
            client,
            config,
            stats,
        })
    }

    /// Probe one candidate path.
    ///
    /// Transport failures increment the shared error counter and come back
    /// as `Failure`; they are never fatal here. The response body is always
    /// drained so the connection returns to the pool, whether or not the
    /// outcome ends up reportable.
    pub async fn probe(&self, word: &str) -> ProbeOutcome {
        let Some(req) = request::build(&self.client, &self.config, word) else {
            tracing::debug!(word, "request construction failed, skipping candidate");
            return ProbeOutcome::Skipped;
        };
        let url = req.url().to_string();
        self.stats.record_request();

        match self.client.execute(req).await {
            Ok(response) => {
                let status = response.status().as_u16();
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);

                // A positive Content-Length wins; otherwise the body is read
                // and measured. Either way the body is drained.
                let size = match response.content_length() {
                    Some(n) if n > 0 => {
                        let _ = response.bytes().await;
                        n
                    }
                    _ => response.bytes().await.map(|b| b.len() as u64).unwrap_or(0),
                };

                ProbeOutcome::Success {
                    url,
                    status,
                    size,
                    location,
                }
            }
            Err(e) => {
                self.stats.record_error();
                tracing::debug!(url = %url, error = %e, "probe transport failure");
                ProbeOutcome::Failure {
                    url,
                    error: e.to_string(),
                }
            }
        }
    }
}
