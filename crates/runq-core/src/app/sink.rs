//! IncrementalResultSink - 出力チャンクごとにレコード全体を保存し直す書き込み口
//!
//! - `append`: メモリ上のレコードに追記 → put_if_current（全体上書き）
//! - `finalize`: finished=true → もう一度保存（失敗したら数回リトライ）
//!
//! 保存に失敗してもジョブは止めない。次のチャンクか finalize で再度保存する。
//! 新しい submit でレコードが置き換えられた（Superseded）後は何も書かない。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{JobResult, RunId};
use crate::ports::{Clock, OutputSink, ResultStore, WriteOutcome};

const FINALIZE_ATTEMPTS: u32 = 3;
const FINALIZE_BACKOFF: Duration = Duration::from_millis(50);

pub struct IncrementalResultSink {
    store: Arc<dyn ResultStore>,
    clock: Arc<dyn Clock>,
    record: JobResult,
    fenced: bool,
    superseded: bool,
}

impl IncrementalResultSink {
    /// Writes only while the stored record still belongs to `record.run_id`.
    pub fn new(store: Arc<dyn ResultStore>, clock: Arc<dyn Clock>, record: JobResult) -> Self {
        Self {
            store,
            clock,
            record,
            fenced: true,
            superseded: false,
        }
    }

    /// Plain overwrites with no run check; used when the stored record could not be read.
    pub fn unfenced(store: Arc<dyn ResultStore>, clock: Arc<dyn Clock>, record: JobResult) -> Self {
        Self {
            fenced: false,
            ..Self::new(store, clock, record)
        }
    }

    pub fn run_id(&self) -> RunId {
        self.record.run_id
    }

    pub fn is_superseded(&self) -> bool {
        self.superseded
    }

    pub async fn append(&mut self, chunk: &[u8]) {
        if self.superseded || chunk.is_empty() {
            return;
        }
        self.record.append(chunk, self.clock.now());
        self.persist().await;
    }

    /// Mark finished and persist, retrying the final write a few times.
    pub async fn finalize(mut self) -> JobResult {
        if self.superseded {
            return self.record;
        }
        self.record.mark_finished(self.clock.now());

        for attempt in 1..=FINALIZE_ATTEMPTS {
            if self.persist().await {
                return self.record;
            }
            if attempt < FINALIZE_ATTEMPTS {
                tokio::time::sleep(FINALIZE_BACKOFF * attempt).await;
            }
        }
        tracing::error!(
            job = %self.record.identifier,
            run = %self.record.run_id,
            attempts = FINALIZE_ATTEMPTS,
            "giving up on persisting finished result; record stays unfinished"
        );
        self.record
    }

    /// `false` only when the write failed.
    async fn persist(&mut self) -> bool {
        let written = if self.fenced {
            self.store.put_if_current(&self.record).await
        } else {
            self.store.put(&self.record).await.map(|()| WriteOutcome::Written)
        };

        match written {
            Ok(WriteOutcome::Written) => true,
            Ok(WriteOutcome::Superseded) => {
                tracing::info!(
                    job = %self.record.identifier,
                    run = %self.record.run_id,
                    "result was resubmitted; dropping output from the older run"
                );
                self.superseded = true;
                true
            }
            Err(e) => {
                tracing::warn!(
                    job = %self.record.identifier,
                    run = %self.record.run_id,
                    error = %e,
                    "could not persist result; will retry on next write"
                );
                false
            }
        }
    }
}

#[async_trait]
impl OutputSink for IncrementalResultSink {
    async fn write_chunk(&mut self, chunk: &[u8]) {
        self.append(chunk).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{JobKey, RunId};
    use crate::impls::InMemoryResultStore;
    use crate::ports::SystemClock;
    use chrono::Utc;
    use ulid::Ulid;

    fn placeholder(run: u128) -> JobResult {
        JobResult::placeholder(
            JobKey::parse("delta").unwrap(),
            RunId::from_ulid(Ulid::from_parts(1, run)),
            Utc::now(),
        )
    }

    async fn stored(store: &InMemoryResultStore) -> JobResult {
        store
            .get(&JobKey::parse("delta").unwrap())
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn every_append_is_visible_in_the_store() {
        let store = Arc::new(InMemoryResultStore::new());
        let record = placeholder(1);
        store.put(&record).await.unwrap();
        let mut sink = IncrementalResultSink::new(store.clone(), Arc::new(SystemClock), record);

        sink.append(b"one ").await;
        assert_eq!(stored(&store).await.output, b"one ");
        sink.append(b"two").await;
        assert_eq!(stored(&store).await.output, b"one two");
        assert!(!stored(&store).await.finished);

        let done = sink.finalize().await;
        assert!(done.finished);
        assert_eq!(stored(&store).await, done);
    }

    #[tokio::test]
    async fn failed_write_is_retried_by_the_next_one() {
        let store = Arc::new(InMemoryResultStore::new());
        let record = placeholder(1);
        store.put(&record).await.unwrap();
        let mut sink = IncrementalResultSink::new(store.clone(), Arc::new(SystemClock), record);

        store.set_fail_writes(true);
        sink.append(b"lost? ").await;
        assert!(stored(&store).await.output.is_empty());

        store.set_fail_writes(false);
        sink.append(b"no").await;
        assert_eq!(stored(&store).await.output, b"lost? no");
    }

    #[tokio::test]
    async fn resubmission_fences_out_the_older_run() {
        let store = Arc::new(InMemoryResultStore::new());
        let old_run = placeholder(1);
        store.put(&old_run).await.unwrap();
        let mut sink = IncrementalResultSink::new(store.clone(), Arc::new(SystemClock), old_run);

        sink.append(b"old").await;
        let new_run = placeholder(2);
        store.put(&new_run).await.unwrap();

        sink.append(b" more").await;
        assert!(sink.is_superseded());
        let finished_old = sink.finalize().await;
        assert!(!finished_old.finished);

        let current = stored(&store).await;
        assert_eq!(current, new_run);
    }

    #[tokio::test]
    async fn unfenced_sink_overwrites_regardless_of_run() {
        let store = Arc::new(InMemoryResultStore::new());
        store.put(&placeholder(2)).await.unwrap();
        let mut sink =
            IncrementalResultSink::unfenced(store.clone(), Arc::new(SystemClock), placeholder(1));

        sink.append(b"x").await;
        let done = sink.finalize().await;

        assert!(done.finished);
        assert_eq!(stored(&store).await, done);
    }

    #[tokio::test]
    async fn failed_final_write_is_retried() {
        let store = Arc::new(InMemoryResultStore::new());
        let record = placeholder(1);
        store.put(&record).await.unwrap();
        let mut sink = IncrementalResultSink::new(store.clone(), Arc::new(SystemClock), record);
        sink.append(b"out").await;

        store.fail_next_writes(2);
        let done = sink.finalize().await;

        assert!(done.finished);
        assert_eq!(stored(&store).await, done);
    }

    #[tokio::test]
    async fn final_write_gives_up_after_bounded_attempts() {
        let store = Arc::new(InMemoryResultStore::new());
        let record = placeholder(1);
        store.put(&record).await.unwrap();
        let sink = IncrementalResultSink::new(store.clone(), Arc::new(SystemClock), record);

        store.fail_next_writes(FINALIZE_ATTEMPTS as usize);
        let done = sink.finalize().await;

        assert!(done.finished);
        assert!(!stored(&store).await.finished);
    }
}
