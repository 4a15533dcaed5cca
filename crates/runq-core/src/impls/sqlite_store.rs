//! SqliteResultStore - ResultStore の SQLite 実装
//!
//! `results` テーブルが 1 つの bucket に相当する:
//! - `key`: JobKey（主キー）
//! - `run_id`: 書き込みフェンス用（put_if_current が比較する）
//! - `value`: JobResult の JSON

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use crate::domain::{JobKey, JobResult, StoreError};
use crate::ports::{ResultStore, WriteOutcome};

/// SQLite-based result store.
#[derive(Clone)]
pub struct SqliteResultStore {
    pool: SqlitePool,
}

impl SqliteResultStore {
    /// Wrap an existing pool. Call [`ensure_bucket`](Self::ensure_bucket) before use.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (or create) the database file and make sure the bucket exists.
    ///
    /// Opening is bounded by `open_timeout`; a locked or unreachable file is
    /// reported as [`StoreError::OpenTimeout`].
    pub async fn open(path: impl AsRef<Path>, open_timeout: Duration) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(open_timeout);

        let connect = SqlitePoolOptions::new()
            .max_connections(4)
            .acquire_timeout(open_timeout)
            .connect_with(options);

        let pool = tokio::time::timeout(open_timeout, connect)
            .await
            .map_err(|_| StoreError::OpenTimeout(open_timeout))??;

        let store = Self::new(pool);
        store.ensure_bucket().await?;
        Ok(store)
    }

    pub async fn ensure_bucket(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS results (
                key    TEXT PRIMARY KEY NOT NULL,
                run_id TEXT NOT NULL,
                value  BLOB NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    fn encode(result: &JobResult) -> Result<Vec<u8>, StoreError> {
        serde_json::to_vec(result).map_err(|source| StoreError::Encode {
            key: result.identifier.to_string(),
            source,
        })
    }
}

#[async_trait]
impl ResultStore for SqliteResultStore {
    async fn get(&self, key: &JobKey) -> Result<Option<JobResult>, StoreError> {
        let row: Option<(Vec<u8>,)> = sqlx::query_as(
            r#"
            SELECT value
            FROM results
            WHERE key = ?
            "#,
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let Some((value,)) = row else {
            return Ok(None);
        };

        serde_json::from_slice(&value)
            .map(Some)
            .map_err(|source| StoreError::Decode {
                key: key.to_string(),
                source,
            })
    }

    async fn put(&self, result: &JobResult) -> Result<(), StoreError> {
        let value = Self::encode(result)?;
        sqlx::query(
            r#"
            INSERT INTO results (key, run_id, value)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET run_id = excluded.run_id, value = excluded.value
            "#,
        )
        .bind(result.identifier.as_str())
        .bind(result.run_id.to_string())
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn put_if_current(&self, result: &JobResult) -> Result<WriteOutcome, StoreError> {
        let value = Self::encode(result)?;
        let done = sqlx::query(
            r#"
            INSERT INTO results (key, run_id, value)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            WHERE results.run_id = excluded.run_id
            "#,
        )
        .bind(result.identifier.as_str())
        .bind(result.run_id.to_string())
        .bind(value)
        .execute(&self.pool)
        .await?;

        if done.rows_affected() == 0 {
            Ok(WriteOutcome::Superseded)
        } else {
            Ok(WriteOutcome::Written)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RunId;
    use chrono::Utc;
    use ulid::Ulid;

    async fn open_temp() -> (tempfile::TempDir, SqliteResultStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteResultStore::open(dir.path().join("results.db"), Duration::from_secs(1))
            .await
            .unwrap();
        (dir, store)
    }

    fn placeholder(key: &str, run: u128) -> JobResult {
        JobResult::placeholder(
            JobKey::parse(key).unwrap(),
            RunId::from_ulid(Ulid::from_parts(1, run)),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn get_returns_none_for_unknown_key() {
        let (_dir, store) = open_temp().await;
        let got = store.get(&JobKey::parse("never-submitted").unwrap()).await.unwrap();
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn put_overwrites_the_whole_record() {
        let (_dir, store) = open_temp().await;

        let mut first = placeholder("alpha", 1);
        first.append(b"old output", Utc::now());
        first.mark_finished(Utc::now());
        store.put(&first).await.unwrap();

        let second = placeholder("alpha", 2);
        store.put(&second).await.unwrap();

        let got = store.get(&second.identifier).await.unwrap().unwrap();
        assert_eq!(got, second);
        assert!(!got.finished);
        assert!(got.output.is_empty());
    }

    #[tokio::test]
    async fn put_if_current_refuses_records_from_an_older_run() {
        let (_dir, store) = open_temp().await;

        let mut old_run = placeholder("gamma", 1);
        store.put(&old_run).await.unwrap();

        let new_run = placeholder("gamma", 2);
        store.put(&new_run).await.unwrap();

        old_run.append(b"late chunk", Utc::now());
        let outcome = store.put_if_current(&old_run).await.unwrap();
        assert_eq!(outcome, WriteOutcome::Superseded);

        let got = store.get(&new_run.identifier).await.unwrap().unwrap();
        assert_eq!(got.run_id, new_run.run_id);
        assert!(got.output.is_empty());
    }

    #[tokio::test]
    async fn put_if_current_writes_same_run_and_missing_records() {
        let (_dir, store) = open_temp().await;

        let mut run = placeholder("delta", 1);
        assert_eq!(store.put_if_current(&run).await.unwrap(), WriteOutcome::Written);

        run.append(b"chunk", Utc::now());
        assert_eq!(store.put_if_current(&run).await.unwrap(), WriteOutcome::Written);

        let got = store.get(&run.identifier).await.unwrap().unwrap();
        assert_eq!(got.output, b"chunk");
    }

    #[tokio::test]
    async fn records_survive_reopening_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.db");
        let record = placeholder("persisted", 9);
        {
            let store = SqliteResultStore::open(&path, Duration::from_secs(1)).await.unwrap();
            store.put(&record).await.unwrap();
            store.close().await;
        }

        let reopened = SqliteResultStore::open(&path, Duration::from_secs(1)).await.unwrap();
        let got = reopened.get(&record.identifier).await.unwrap();
        assert_eq!(got, Some(record));
    }

    #[tokio::test]
    async fn undecodable_value_is_a_decode_error() {
        let (_dir, store) = open_temp().await;
        sqlx::query("INSERT INTO results (key, run_id, value) VALUES ('broken', 'x', ?)")
            .bind(b"not json".to_vec())
            .execute(&store.pool)
            .await
            .unwrap();

        let err = store.get(&JobKey::parse("broken").unwrap()).await.unwrap_err();
        assert!(matches!(err, StoreError::Decode { .. }));
    }
}
