//! SQLite-backed bucket storage.
//!
//! Buckets live in a `buckets` table, entries in an `entries` table
//! keyed by (bucket, key) with ON DELETE CASCADE, so deleting a bucket
//! drops its entries in the same statement. The connection runs in WAL
//! mode on a background thread via tokio-rusqlite.

use std::path::Path;

use async_trait::async_trait;
use tokio_rusqlite::{Connection, params, rusqlite};

use super::{BucketStore, RequestKey, StoredResponse, migrations};
use crate::{AgentConfig, Error};

/// Persistent bucket store.
///
/// Wraps a tokio-rusqlite Connection that runs database operations
/// on a background thread.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a store at the specified path.
    ///
    /// Creates the file if it doesn't exist, applies performance pragmas,
    /// and runs any pending migrations.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        tracing::debug!("opening bucket store at {}", path.as_ref().display());
        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        Self::init(conn).await
    }

    /// Open the store at the path named by the agent configuration.
    pub async fn from_config(config: &AgentConfig) -> Result<Self, Error> {
        Self::open(&config.db_path).await
    }

    /// Open an in-memory store for testing.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, Error> {
        conn.call(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode=WAL;
                 PRAGMA synchronous=NORMAL;
                 PRAGMA temp_store=MEMORY;
                 PRAGMA foreign_keys=ON;",
            )?;
            Ok(())
        })
        .await
        .map_err(Error::Database)?;

        migrations::run(&conn).await?;

        Ok(Self { conn })
    }
}

#[async_trait]
impl BucketStore for SqliteStore {
    async fn open_bucket(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        let created_at = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO buckets (name, created_at) VALUES (?1, ?2)
                     ON CONFLICT(name) DO NOTHING",
                    params![name, created_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn list_buckets(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM buckets ORDER BY name")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<String>, rusqlite::Error>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    async fn delete_bucket(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM buckets WHERE name = ?1", params![name])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    async fn put(&self, bucket: &str, request: &RequestKey, response: StoredResponse) -> Result<(), Error> {
        let bucket = bucket.to_string();
        let key = request.storage_key();
        let method = request.method.clone();
        let url = request.url.to_string();
        let headers_json = serde_json::to_string(&response.headers)
            .map_err(|e| Error::InvalidInput(format!("failed to serialize headers: {e}")))?;

        self.conn
            .call(move |conn| -> Result<(), Error> {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM buckets WHERE name = ?1)",
                    params![bucket],
                    |row| row.get(0),
                )?;
                if !exists {
                    return Err(Error::BucketMissing(bucket));
                }

                conn.execute(
                    "INSERT INTO entries (
                        bucket, key, method, url, status, headers_json, body, stored_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                    ON CONFLICT(bucket, key) DO UPDATE SET
                        method = excluded.method,
                        url = excluded.url,
                        status = excluded.status,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![
                        bucket,
                        key,
                        method,
                        url,
                        response.status as i64,
                        headers_json,
                        response.body,
                        response.stored_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn match_entry(&self, bucket: &str, request: &RequestKey) -> Result<Option<StoredResponse>, Error> {
        let bucket = bucket.to_string();
        let key = request.storage_key();
        self.conn
            .call(move |conn| -> Result<Option<StoredResponse>, Error> {
                let result = conn.query_row(
                    "SELECT status, headers_json, body, stored_at
                     FROM entries WHERE bucket = ?1 AND key = ?2",
                    params![bucket, key],
                    |row| {
                        Ok((
                            row.get::<_, i64>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, Vec<u8>>(2)?,
                            row.get::<_, String>(3)?,
                        ))
                    },
                );

                match result {
                    Ok((status, headers_json, body, stored_at)) => {
                        let headers = serde_json::from_str(&headers_json)
                            .map_err(|e| Error::InvalidInput(format!("corrupt headers column: {e}")))?;
                        Ok(Some(StoredResponse { status: status as u16, headers, body, stored_at }))
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    async fn count_entries(&self, bucket: &str) -> Result<u64, Error> {
        let bucket = bucket.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM entries WHERE bucket = ?1",
                    params![bucket],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_response(body: &str) -> StoredResponse {
        StoredResponse::new(
            200,
            vec![("content-type".to_string(), "text/html".to_string())],
            body.as_bytes().to_vec(),
        )
    }

    #[tokio::test]
    async fn test_open_in_memory() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        assert!(store.list_buckets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_put_and_match() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let request = RequestKey::get("https://example.com/").unwrap();

        store.open_bucket("v1").await.unwrap();
        store.put("v1", &request, make_response("hello")).await.unwrap();

        let found = store.match_entry("v1", &request).await.unwrap().unwrap();
        assert_eq!(found.status, 200);
        assert_eq!(found.body, b"hello");
        assert_eq!(found.content_type(), Some("text/html"));
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let request = RequestKey::get("https://example.com/").unwrap();

        store.open_bucket("v1").await.unwrap();
        store.put("v1", &request, make_response("old")).await.unwrap();
        store.put("v1", &request, make_response("new")).await.unwrap();

        assert_eq!(store.count_entries("v1").await.unwrap(), 1);
        let found = store.match_entry("v1", &request).await.unwrap().unwrap();
        assert_eq!(found.body, b"new");
    }

    #[tokio::test]
    async fn test_put_missing_bucket() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let request = RequestKey::get("https://example.com/").unwrap();

        let result = store.put("nope", &request, make_response("x")).await;
        assert!(matches!(result, Err(Error::BucketMissing(_))));
    }

    #[tokio::test]
    async fn test_match_missing() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let request = RequestKey::get("https://example.com/").unwrap();
        assert!(store.match_entry("v1", &request).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_open_bucket_idempotent() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        store.open_bucket("v1").await.unwrap();
        store.open_bucket("v1").await.unwrap();
        assert_eq!(store.list_buckets().await.unwrap(), vec!["v1".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_bucket_cascades() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let request = RequestKey::get("https://example.com/").unwrap();

        store.open_bucket("v1").await.unwrap();
        store.put("v1", &request, make_response("hello")).await.unwrap();

        assert!(store.delete_bucket("v1").await.unwrap());
        assert!(!store.delete_bucket("v1").await.unwrap());

        store.open_bucket("v1").await.unwrap();
        assert_eq!(store.count_entries("v1").await.unwrap(), 0);
        assert!(store.match_entry("v1", &request).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_buckets_sorted() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        store.open_bucket("v2").await.unwrap();
        store.open_bucket("v1").await.unwrap();
        store.open_bucket("v3").await.unwrap();
        assert_eq!(
            store.list_buckets().await.unwrap(),
            vec!["v1".to_string(), "v2".to_string(), "v3".to_string()]
        );
    }
}
