//! Offline cache agent lifecycle handlers.
//!
//! Three operations mirror the host lifecycle: [`OfflineAgent::install`]
//! seeds the version bucket, [`OfflineAgent::activate`] evicts buckets
//! left behind by older versions, and [`OfflineAgent::handle_fetch`]
//! serves intercepted requests network-first with the bucket as
//! fallback.
//!
//! Nothing here escalates errors to the caller: install and activate
//! swallow and log per-item failures, and `handle_fetch` degrades to
//! `None` when both the network and the bucket come up empty.

use std::sync::Arc;

use bytes::Bytes;
use futures::future::join_all;
use url::Url;

use liferaft_core::{AgentConfig, BucketStore, ConfigError, Error, RequestKey, StoredResponse};

use crate::host::{FetchedResponse, HostControl, Network};

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeSource {
    /// Fresh data from the network.
    Network,
    /// Network unreachable, served from the version bucket.
    CacheFallback,
}

/// Response handed back to the embedding host.
#[derive(Debug, Clone)]
pub struct ServedResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers as name/value pairs.
    pub headers: Vec<(String, String)>,
    /// Response body bytes.
    pub body: Bytes,
    /// Where the response came from.
    pub source: ServeSource,
}

impl ServedResponse {
    fn from_network(response: FetchedResponse) -> Self {
        Self {
            status: response.status,
            headers: response.headers,
            body: response.body,
            source: ServeSource::Network,
        }
    }

    fn from_cache(stored: StoredResponse) -> Self {
        Self {
            status: stored.status,
            headers: stored.headers,
            body: Bytes::from(stored.body),
            source: ServeSource::CacheFallback,
        }
    }
}

/// Summary of an install pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallReport {
    /// Seed entries fetched and stored.
    pub seeded: usize,
    /// Seed entries skipped after a fetch or store failure.
    pub failed: usize,
}

/// Summary of an activation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivationReport {
    /// Stale buckets removed.
    pub deleted: usize,
    /// Stale buckets that could not be removed.
    pub failed: usize,
}

/// The offline cache agent.
///
/// Generic over the bucket store, the network, and the host control
/// surface so embedding hosts wire in real implementations and tests
/// wire in fakes.
pub struct OfflineAgent<S, N, C> {
    config: AgentConfig,
    origin: Url,
    store: Arc<S>,
    net: Arc<N>,
    control: C,
}

impl<S, N, C> OfflineAgent<S, N, C>
where
    S: BucketStore + 'static,
    N: Network + 'static,
    C: HostControl,
{
    /// Build an agent from validated configuration and host capabilities.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration fails validation.
    pub fn new(config: AgentConfig, store: S, net: N, control: C) -> Result<Self, ConfigError> {
        config.validate()?;
        let origin = config.origin_url()?;
        Ok(Self { config, origin, store: Arc::new(store), net: Arc::new(net), control })
    }

    /// The version tag naming the current bucket.
    pub fn version_tag(&self) -> &str {
        &self.config.version_tag
    }

    /// Setup handler, run once when the agent is first registered.
    ///
    /// Opens the version bucket and pre-fetches every seed path into it.
    /// Seed failures are logged and skipped; partial seeding is
    /// tolerated and never retried. Always finishes by asking the host
    /// to activate this version immediately.
    pub async fn install(&self) -> InstallReport {
        let mut report = InstallReport::default();

        match self.store.open_bucket(&self.config.version_tag).await {
            Ok(()) => {
                for path in &self.config.seed_paths {
                    match self.seed_one(path).await {
                        Ok(()) => report.seeded += 1,
                        Err(e) => {
                            report.failed += 1;
                            tracing::warn!("seeding {path} failed: {e}");
                        }
                    }
                }
            }
            Err(e) => {
                tracing::warn!("failed to open bucket {}: {e}", self.config.version_tag);
            }
        }

        tracing::info!(
            bucket = %self.config.version_tag,
            seeded = report.seeded,
            failed = report.failed,
            "install complete"
        );
        self.control.skip_waiting().await;
        report
    }

    async fn seed_one(&self, path: &str) -> Result<(), Error> {
        let url = self
            .origin
            .join(path)
            .map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let request = RequestKey::get(url.as_str())?;
        let response = self.net.fetch(&request).await?;
        if response.status != 200 {
            return Err(Error::Http(format!("status {}", response.status)));
        }
        self.store
            .put(&self.config.version_tag, &request, snapshot(&response))
            .await
    }

    /// Version-transition handler, run when this version takes over.
    ///
    /// Deletes every bucket not named by the current version tag. The
    /// deletions run concurrently and a failed deletion does not stop
    /// the others; failures are logged and counted. Always finishes by
    /// asking the host to route open pages through this agent
    /// immediately.
    pub async fn activate(&self) -> ActivationReport {
        let mut report = ActivationReport::default();

        match self.store.list_buckets().await {
            Ok(names) => {
                let stale: Vec<String> = names
                    .into_iter()
                    .filter(|name| name != &self.config.version_tag)
                    .collect();

                let deletions = stale.into_iter().map(|name| {
                    let store = Arc::clone(&self.store);
                    async move {
                        let result = store.delete_bucket(&name).await;
                        (name, result)
                    }
                });

                for (name, result) in join_all(deletions).await {
                    match result {
                        Ok(_) => {
                            report.deleted += 1;
                            tracing::info!("removed stale bucket {name}");
                        }
                        Err(e) => {
                            report.failed += 1;
                            tracing::warn!("failed to delete stale bucket {name}: {e}");
                        }
                    }
                }
            }
            Err(e) => {
                tracing::warn!("failed to enumerate buckets: {e}");
            }
        }

        self.control.claim_clients().await;
        report
    }

    /// Request-interception handler: network-first, cache-fallback.
    ///
    /// A 200 same-origin response is snapshotted into the bucket by a
    /// detached task while the response itself is returned immediately.
    /// Non-200 responses pass through unmodified and are never cached.
    /// On a transport failure the bucket is consulted; `None` means
    /// neither the network nor the bucket had an answer, and the host
    /// should surface its generic network-error response.
    pub async fn handle_fetch(&self, request: &RequestKey) -> Option<ServedResponse> {
        match self.net.fetch(request).await {
            Ok(response) => {
                if response.status == 200 && request.same_origin(&self.origin) {
                    self.spawn_store(request.clone(), &response);
                }
                Some(ServedResponse::from_network(response))
            }
            Err(e) => {
                tracing::debug!("network failed for {}: {e}, falling back to cache", request.url);
                match self.store.match_entry(&self.config.version_tag, request).await {
                    Ok(Some(stored)) => Some(ServedResponse::from_cache(stored)),
                    Ok(None) => None,
                    Err(e) => {
                        tracing::warn!("cache lookup failed for {}: {e}", request.url);
                        None
                    }
                }
            }
        }
    }

    /// Store the response without delaying the response path.
    ///
    /// The write runs on a detached task with its own error handler; a
    /// failed write is logged and the entry is simply not refreshed.
    fn spawn_store(&self, request: RequestKey, response: &FetchedResponse) {
        let store = Arc::clone(&self.store);
        let bucket = self.config.version_tag.clone();
        let entry = snapshot(response);
        tokio::spawn(async move {
            if let Err(e) = store.put(&bucket, &request, entry).await {
                tracing::warn!("failed to store {} in bucket {bucket}: {e}", request.url);
            }
        });
    }
}

/// Duplicate a network response into a storable snapshot.
fn snapshot(response: &FetchedResponse) -> StoredResponse {
    StoredResponse::new(response.status, response.headers.clone(), response.body.to_vec())
}
