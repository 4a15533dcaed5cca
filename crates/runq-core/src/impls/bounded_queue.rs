//! BoundedJobQueue - JobQueue の in-process 実装
//!
//! # 実装詳細
//! - `Mutex<VecDeque<JobKey>>` で FIFO を保持
//! - `not_empty` / `not_full` の 2 つの Notify で待機を起こす
//! - ロックを握ったまま await しない（待機は必ずロック解放後）

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use crate::domain::JobKey;
use crate::ports::JobQueue;

/// Default capacity of the job queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

pub struct BoundedJobQueue {
    pending: Mutex<VecDeque<JobKey>>,
    capacity: usize,
    not_empty: Notify,
    not_full: Notify,
}

impl BoundedJobQueue {
    /// `capacity` must be non-zero; `AppBuilder` checks this before construction.
    pub fn new(capacity: usize) -> Self {
        Self {
            pending: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            not_empty: Notify::new(),
            not_full: Notify::new(),
        }
    }
}

impl Default for BoundedJobQueue {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

#[async_trait]
impl JobQueue for BoundedJobQueue {
    async fn enqueue(&self, key: JobKey) {
        loop {
            {
                let mut pending = self.pending.lock().await;
                if pending.len() < self.capacity {
                    pending.push_back(key);
                    drop(pending);
                    self.not_empty.notify_one();
                    return;
                }
            }
            // notify_one は待機者がいなければ permit を 1 つ残すので取りこぼさない
            self.not_full.notified().await;
        }
    }

    async fn dequeue(&self) -> JobKey {
        loop {
            {
                let mut pending = self.pending.lock().await;
                if let Some(key) = pending.pop_front() {
                    drop(pending);
                    self.not_full.notify_one();
                    return key;
                }
            }
            self.not_empty.notified().await;
        }
    }

    async fn depth(&self) -> usize {
        self.pending.lock().await.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}
