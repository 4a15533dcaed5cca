//! InMemoryResultStore - 開発・テスト用の ResultStore
//!
//! `fail_writes` を立てると put 系が `StoreError::Unavailable` を返す（永続化失敗の再現用）。
//! `fail_next_writes(n)` は次の n 回だけ失敗させる。

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{JobKey, JobResult, StoreError};
use crate::ports::{ResultStore, WriteOutcome};

#[derive(Default)]
pub struct InMemoryResultStore {
    records: RwLock<HashMap<JobKey, JobResult>>,
    fail_writes: AtomicBool,
    failures_left: AtomicUsize,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_next_writes(&self, count: usize) {
        self.failures_left.store(count, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        let injected = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected || self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ResultStore for InMemoryResultStore {
    async fn get(&self, key: &JobKey) -> Result<Option<JobResult>, StoreError> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn put(&self, result: &JobResult) -> Result<(), StoreError> {
        self.check_writable()?;
        self.records
            .write()
            .await
            .insert(result.identifier.clone(), result.clone());
        Ok(())
    }

    async fn put_if_current(&self, result: &JobResult) -> Result<WriteOutcome, StoreError> {
        self.check_writable()?;
        let mut records = self.records.write().await;
        match records.get(&result.identifier) {
            Some(stored) if stored.run_id != result.run_id => Ok(WriteOutcome::Superseded),
            _ => {
                records.insert(result.identifier.clone(), result.clone());
                Ok(WriteOutcome::Written)
            }
        }
    }
}
