//! JobQueue port - 実行待ち JobKey の bounded FIFO
//!
//! # 設計原則
//! - JobKey のみを流す（状態・出力は ResultStore にある）
//! - enqueue は満杯なら待つ（捨てない）
//! - dequeue は空なら待つ
//! - depth はサンプル値（予約ではない）

use async_trait::async_trait;

use crate::domain::JobKey;

#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Push to the back; suspends while the queue is at capacity.
    async fn enqueue(&self, key: JobKey);

    /// Pop from the front; suspends while the queue is empty.
    ///
    /// Cancel-safe: an entry is removed only when the call returns it.
    async fn dequeue(&self) -> JobKey;

    /// Current number of pending entries.
    async fn depth(&self) -> usize;

    fn capacity(&self) -> usize;
}
