//! Status - 読み取り専用のステータスクエリ
//!
//! ResultStore から最新のレコードを読むだけ。worker の進行とは独立しており、
//! 何度呼んでも副作用はない。

use std::sync::Arc;

use super::admission::AdmissionGate;
use crate::domain::{JobKey, JobStatus, StatusError};
use crate::observability::QueueStats;
use crate::ports::{JobQueue, ResultStore};

pub struct StatusService {
    store: Arc<dyn ResultStore>,
    queue: Arc<dyn JobQueue>,
    gate: AdmissionGate,
}

impl StatusService {
    pub fn new(store: Arc<dyn ResultStore>, queue: Arc<dyn JobQueue>, gate: AdmissionGate) -> Self {
        Self { store, queue, gate }
    }

    /// Latest persisted state for `raw`; `NotFound` if it was never submitted.
    pub async fn status(&self, raw: &str) -> Result<JobStatus, StatusError> {
        let key = JobKey::parse(raw).map_err(|_| StatusError::NotFound(raw.to_string()))?;
        match self.store.get(&key).await? {
            Some(result) => Ok(JobStatus::from(result)),
            None => Err(StatusError::NotFound(key.to_string())),
        }
    }

    pub async fn queue_stats(&self) -> QueueStats {
        let capacity = self.queue.capacity();
        QueueStats {
            depth: self.queue.depth().await,
            capacity,
            threshold: self.gate.threshold(capacity),
        }
    }
}
