//! ResultStore port - JobKey -> JobResult の永続ストア
//!
//! # 実装
//! - **SqliteResultStore**: 本番用（`results` テーブルが bucket）
//! - **InMemoryResultStore**: テスト・開発用
//!
//! # 設計原則
//! - 操作はキー単位で atomic（複数キーのトランザクションは不要）
//! - put は常にレコード全体の上書き
//! - put_if_current は同じ run_id のレコードだけを上書きする（古い実行の書き込みを弾く）

use async_trait::async_trait;

use crate::domain::{JobKey, JobResult, StoreError};

/// Outcome of a fenced write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// A newer submission replaced the record; nothing was written.
    Superseded,
}

#[async_trait]
pub trait ResultStore: Send + Sync {
    /// `Ok(None)` when the identifier was never submitted.
    async fn get(&self, key: &JobKey) -> Result<Option<JobResult>, StoreError>;

    /// Unconditional full overwrite.
    async fn put(&self, result: &JobResult) -> Result<(), StoreError>;

    /// Full overwrite only if the stored record carries `result.run_id`.
    /// A missing record is written.
    async fn put_if_current(&self, result: &JobResult) -> Result<WriteOutcome, StoreError>;
}
