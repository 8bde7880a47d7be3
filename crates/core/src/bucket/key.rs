//! Request identity: method plus canonicalized URL.
//!
//! Two textual spellings of the same request must land on the same
//! bucket entry, so URLs are canonicalized before hashing.

use sha2::{Digest, Sha256};
use url::Url;

use crate::Error;

/// Canonicalize a URL string for consistent cache keys and origin checks.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Default scheme to https:// if missing
/// 3. Lowercase the host
/// 4. Remove fragment (#...)
/// 5. Keep query string intact (do not reorder)
pub fn canonicalize(input: &str) -> Result<Url, Error> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(Error::InvalidUrl("empty URL".to_string()));
    }

    let url_str = if trimmed.contains("://") { trimmed.to_string() } else { format!("https://{trimmed}") };

    let mut parsed = Url::parse(&url_str).map_err(|e| Error::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(Error::InvalidUrl(format!("unsupported scheme: {scheme}"))),
    }

    if let Some(host) = parsed.host_str() {
        let lowered = host.to_lowercase();
        parsed
            .set_host(Some(lowered.as_str()))
            .map_err(|e| Error::InvalidUrl(e.to_string()))?;
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// The lookup key into a bucket: method + canonicalized URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestKey {
    /// HTTP method, uppercased.
    pub method: String,
    /// Canonicalized request URL.
    pub url: Url,
}

impl RequestKey {
    /// Build a key from a method and a URL string.
    pub fn new(method: &str, url: &str) -> Result<Self, Error> {
        Ok(Self { method: method.to_uppercase(), url: canonicalize(url)? })
    }

    /// Build a GET key, the common case for intercepted requests.
    pub fn get(url: &str) -> Result<Self, Error> {
        Self::new("GET", url)
    }

    /// Storage key for this identity within a bucket.
    pub fn storage_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.method.as_bytes());
        hasher.update(b"\n");
        hasher.update(self.url.as_str().as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Whether this request targets the given origin.
    pub fn same_origin(&self, origin: &Url) -> bool {
        self.url.origin() == origin.origin()
    }
}
