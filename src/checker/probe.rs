// src/checker/probe.rs
// =============================================================================
// Probes one bookmark URL with an HTTP GET and classifies what happened.
//
// Outcomes:
// - Success: a 2xx response
// - HttpStatus: any other status, including one carried by a transport error
// - Timeout: the request timed out or never got a response
// - Transport: anything else, described by the error message
//
// Every outcome is data: a bad link never fails the run. There are no
// retries; each URL gets exactly one attempt.
//
// The Prober trait is the seam between the validator and the network, so
// the validator can be driven by a scripted prober in tests.
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::Result;

/// Bucket key for probes that got no response in time
pub const TIMEOUT_KEY: &str = "Request Timeout";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Success(u16),
    HttpStatus(u16),
    Timeout,
    Transport(String),
}

impl ProbeOutcome {
    /// Builds the outcome for a response status.
    /// Only 2xx counts as success; 1xx and 3xx are reported like 4xx/5xx.
    pub fn from_status(status: u16) -> Self {
        if (200..=299).contains(&status) {
            ProbeOutcome::Success(status)
        } else {
            ProbeOutcome::HttpStatus(status)
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Success(_))
    }

    /// The invalid-link bucket this outcome belongs in, if any
    pub fn bucket_key(&self) -> Option<String> {
        match self {
            ProbeOutcome::Success(_) => None,
            ProbeOutcome::HttpStatus(code) => Some(code.to_string()),
            ProbeOutcome::Timeout => Some(TIMEOUT_KEY.to_string()),
            ProbeOutcome::Transport(message) => Some(message.clone()),
        }
    }
}

#[async_trait]
pub trait Prober: Send + Sync {
    /// Issues a single request for `url`. Never fails: errors are outcomes.
    async fn probe(&self, url: &str) -> ProbeOutcome;
}

/// Probes over HTTP with reqwest
#[derive(Debug, Clone)]
pub struct ReqwestProber {
    client: Client,
}

impl ReqwestProber {
    /// One client per run: connection pooling is shared across all probes
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Prober for ReqwestProber {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        match self.client.get(url).send().await {
            Ok(response) => ProbeOutcome::from_status(response.status().as_u16()),
            Err(e) => categorize_error(&e),
        }
    }
}

// A status attached to the error wins; then "no response" cases; the rest
// are described by their message
fn categorize_error(error: &reqwest::Error) -> ProbeOutcome {
    if let Some(status) = error.status() {
        return ProbeOutcome::from_status(status.as_u16());
    }

    if error.is_timeout() || error.is_connect() || error.is_request() {
        ProbeOutcome::Timeout
    } else {
        ProbeOutcome::Transport(error.to_string())
    }
}
