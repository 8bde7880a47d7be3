//! Core types and shared functionality for liferaft.
//!
//! This crate provides:
//! - Versioned bucket storage with in-memory and SQLite backends
//! - Request identity and stored-response types
//! - Unified error types
//! - Configuration structures

pub mod bucket;
pub mod config;
pub mod error;

pub use bucket::{BucketStore, MemoryStore, RequestKey, SqliteStore, StoredResponse};
pub use config::{AgentConfig, ConfigError};
pub use error::Error;
