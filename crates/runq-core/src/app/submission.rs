//! SubmissionService - validate → AdmissionGate → placeholder 保存 → enqueue
//!
//! check と enqueue の間に他の submit が割り込むと閾値を超えてしまうため、
//! この 3 ステップは `admission` ロックの中で直列に行う。
//! ゲート自体はサンプルした depth だけを見る純粋関数のまま。

use std::sync::Arc;

use tokio::sync::Mutex;

use super::admission::AdmissionGate;
use crate::domain::{JobKey, JobResult, RunId, SubmitError};
use crate::ports::{Clock, IdGenerator, JobQueue, ResultStore};

/// Reference handed back to the caller to locate the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub key: JobKey,
    pub run_id: RunId,
}

impl SubmitReceipt {
    /// Unencoded path of the result view, e.g. `/result/alpha`.
    pub fn result_path(&self) -> String {
        format!("/result/{}", self.key)
    }
}

pub struct SubmissionService {
    admission: Arc<Admission>,
}

impl SubmissionService {
    pub fn new(
        store: Arc<dyn ResultStore>,
        queue: Arc<dyn JobQueue>,
        gate: AdmissionGate,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            admission: Arc::new(Admission {
                store,
                queue,
                gate,
                clock,
                ids,
                lock: Mutex::new(()),
            }),
        }
    }

    /// Submit `raw` for execution.
    ///
    /// On success any previous record for the identifier has been replaced by a
    /// fresh placeholder and the identifier is in the queue. On error nothing
    /// was mutated.
    ///
    /// Once validated, the submission runs on its own task: dropping the
    /// returned future never leaves a placeholder without its queue entry.
    pub async fn submit(&self, raw: &str) -> Result<SubmitReceipt, SubmitError> {
        let key = JobKey::parse(raw)?;

        let admission = Arc::clone(&self.admission);
        match tokio::spawn(async move { admission.admit(key).await }).await {
            Ok(receipt) => receipt,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => Err(SubmitError::Interrupted),
        }
    }
}

struct Admission {
    store: Arc<dyn ResultStore>,
    queue: Arc<dyn JobQueue>,
    gate: AdmissionGate,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    lock: Mutex<()>,
}

impl Admission {
    async fn admit(&self, key: JobKey) -> Result<SubmitReceipt, SubmitError> {
        let _admission = self.lock.lock().await;

        let depth = self.queue.depth().await;
        let capacity = self.queue.capacity();
        if !self.gate.admit(depth, capacity) {
            tracing::warn!(job = %key, depth, capacity, "rejecting submission: server too busy");
            return Err(SubmitError::Capacity { depth, capacity });
        }

        let placeholder = JobResult::placeholder(key.clone(), self.ids.generate_run_id(), self.clock.now());
        self.store
            .put(&placeholder)
            .await
            .map_err(SubmitError::Persistence)?;

        // depth <= threshold < capacity なので、ここで待つことはない
        self.queue.enqueue(key.clone()).await;
        tracing::info!(job = %key, run = %placeholder.run_id, depth = depth + 1, "job queued");

        Ok(SubmitReceipt {
            key,
            run_id: placeholder.run_id,
        })
    }
}
