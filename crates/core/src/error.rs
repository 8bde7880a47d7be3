//! Unified error types for liferaft.

use tokio_rusqlite::rusqlite;

/// Unified error types for the liferaft workspace.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input (e.g., an unserializable header set).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// URL failed to parse or canonicalize.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Network transport failure (offline, DNS, timeout, ...).
    #[error("HTTP_ERROR: {0}")]
    Http(String),

    /// Response body exceeded the configured size limit.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// Operation addressed a bucket that does not exist.
    #[error("BUCKET_MISSING: {0}")]
    BucketMissing(String),

    /// Database operation failed.
    #[error("STORE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("STORE_ERROR: migration failed: {0}")]
    MigrationFailed(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::BucketMissing("v2".to_string());
        assert!(err.to_string().contains("BUCKET_MISSING"));
        assert!(err.to_string().contains("v2"));
    }

    #[test]
    fn test_http_error_display() {
        let err = Error::Http("connection refused".to_string());
        assert!(err.to_string().contains("HTTP_ERROR"));
        assert!(err.to_string().contains("connection refused"));
    }
}
