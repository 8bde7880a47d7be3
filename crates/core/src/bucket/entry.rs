//! Stored response snapshots.

use serde::{Deserialize, Serialize};

/// An immutable snapshot of a prior network response.
///
/// One snapshot is associated with one request identity and is
/// overwritten, not versioned, on every successful same-origin fetch
/// for that identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResponse {
    /// HTTP status code at the time of capture.
    pub status: u16,
    /// Response headers as name/value pairs, capture order preserved.
    pub headers: Vec<(String, String)>,
    /// Response body bytes.
    pub body: Vec<u8>,
    /// RFC 3339 timestamp of when the snapshot was stored.
    pub stored_at: String,
}

impl StoredResponse {
    /// Snapshot a response captured now.
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        Self { status, headers, body, stored_at: chrono::Utc::now().to_rfc3339() }
    }

    /// First header value with the given name, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Content-Type header, if captured.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stamps_time() {
        let snapshot = StoredResponse::new(200, Vec::new(), b"ok".to_vec());
        let parsed = chrono::DateTime::parse_from_rfc3339(&snapshot.stored_at);
        assert!(parsed.is_ok());
    }

    #[test]
    fn test_header_lookup_case_insensitive() {
        let snapshot = StoredResponse::new(
            200,
            vec![("Content-Type".to_string(), "text/html".to_string())],
            Vec::new(),
        );
        assert_eq!(snapshot.header("content-type"), Some("text/html"));
        assert_eq!(snapshot.content_type(), Some("text/html"));
        assert_eq!(snapshot.header("etag"), None);
    }
}
