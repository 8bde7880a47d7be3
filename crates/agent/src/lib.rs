//! Offline cache agent for liferaft.
//!
//! This crate provides the network-first, cache-fallback policy engine:
//! a versioned bucket is seeded at install time, stale version buckets
//! are evicted at activation, and intercepted requests are served from
//! the network with the bucket as a fallback.
//!
//! The agent never talks to the page runtime directly. An embedding
//! host constructs an [`OfflineAgent`] from an [`AgentConfig`], a
//! bucket store, a [`Network`] implementation, and a [`HostControl`]
//! implementation, then calls [`OfflineAgent::install`] once on
//! registration, [`OfflineAgent::activate`] when this version takes
//! over, and routes intercepted requests through
//! [`OfflineAgent::handle_fetch`].

pub mod agent;
pub mod host;
pub mod net;

pub use liferaft_core::AgentConfig;

pub use agent::{ActivationReport, InstallReport, OfflineAgent, ServeSource, ServedResponse};
pub use host::{FetchedResponse, HostControl, Network};
pub use net::{HttpNetwork, NetConfig};
