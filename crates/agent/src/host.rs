//! Host abstraction consumed by the agent.
//!
//! The policy logic never reaches for the network or the page runtime
//! directly; it goes through these traits so embedding hosts decide how
//! requests leave the process and tests can inject fakes.

use async_trait::async_trait;
use bytes::Bytes;
use liferaft_core::{Error, RequestKey};
use url::Url;

/// Response from a network fetch.
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers as name/value pairs.
    pub headers: Vec<(String, String)>,
    /// Response body bytes.
    pub body: Bytes,
    /// The final URL after redirects.
    pub final_url: Url,
    /// Time taken to fetch in milliseconds.
    pub fetch_ms: u64,
}

/// Outgoing network capability.
#[async_trait]
pub trait Network: Send + Sync {
    /// Issue the request unmodified.
    ///
    /// Non-2xx statuses are responses, not errors; only transport
    /// failures (offline, DNS, timeout, oversized body) are errors.
    async fn fetch(&self, request: &RequestKey) -> Result<FetchedResponse, Error>;
}

/// Lifecycle control signals toward the host runtime.
#[async_trait]
pub trait HostControl: Send + Sync {
    /// Ask the host to activate this agent version immediately,
    /// bypassing the wait-for-idle-clients behavior.
    async fn skip_waiting(&self);

    /// Ask the host to route requests from already-open pages through
    /// this agent immediately, rather than waiting for a reload.
    async fn claim_clients(&self);
}
