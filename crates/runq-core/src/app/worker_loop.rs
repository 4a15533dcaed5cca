//! WorkerLoop - ジョブを 1 件ずつ実行するループ
//!
//! # フロー
//! 1. JobQueue::dequeue() で JobKey を取得
//! 2. ResultStore から JobResult を取得（なければ作成）
//! 3. JobExecutor を実行し、出力チャンクを IncrementalResultSink に流す
//! 4. プロセス終了（exit code に関わらず）で finished=true を保存
//!
//! システム全体で worker は 1 本だけ。外部プロセスにタイムアウトはない。

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::sink::IncrementalResultSink;
use crate::domain::{JobKey, JobResult};
use crate::ports::{Clock, IdGenerator, JobExecutor, JobQueue, ResultStore};

/// What happened to one dequeued entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The executor ran and the record was finalized.
    Completed(JobResult),
    /// The record was already finished; a duplicate queue entry was dropped.
    Skipped,
}

pub struct WorkerLoop {
    queue: Arc<dyn JobQueue>,
    store: Arc<dyn ResultStore>,
    executor: Arc<dyn JobExecutor>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl WorkerLoop {
    pub fn new(
        queue: Arc<dyn JobQueue>,
        store: Arc<dyn ResultStore>,
        executor: Arc<dyn JobExecutor>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            queue,
            store,
            executor,
            clock,
            ids,
        }
    }

    /// Spawn the loop on the current tokio runtime.
    pub fn spawn(self) -> WorkerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(self.run(shutdown_rx));
        WorkerHandle { shutdown_tx, join }
    }

    /// Run until shutdown is requested (or the sender is dropped).
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        tracing::info!("starting worker");
        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            // dequeue は待つ可能性があるので shutdown と競合させる。
            // 両方 ready なら shutdown を優先する
            let key = tokio::select! {
                biased;
                changed = shutdown_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                key = self.queue.dequeue() => key,
            };

            self.process(key).await;
        }
        tracing::info!("worker stopped");
    }

    /// Execute one dequeued identifier to completion.
    pub async fn process(&self, key: JobKey) -> ProcessOutcome {
        let Some(mut sink) = self.open_sink(&key).await else {
            tracing::debug!(job = %key, "record already finished; skipping duplicate queue entry");
            return ProcessOutcome::Skipped;
        };

        tracing::info!(job = %key, run = %sink.run_id(), "running job");
        match self.executor.execute(&key, &mut sink).await {
            Ok(exit) if exit.success() => {
                tracing::info!(job = %key, "job process exited cleanly");
            }
            Ok(exit) => {
                tracing::info!(job = %key, exit_code = ?exit.code, "job process exited with non-zero status");
            }
            Err(e) => {
                tracing::error!(job = %key, error = %e, "error running job");
            }
        }

        let result = sink.finalize().await;
        tracing::info!(job = %key, output_bytes = result.output.len(), "finished");
        ProcessOutcome::Completed(result)
    }

    async fn open_sink(&self, key: &JobKey) -> Option<IncrementalResultSink> {
        let store = Arc::clone(&self.store);
        let clock = Arc::clone(&self.clock);

        match self.store.get(key).await {
            Ok(Some(record)) if record.finished => None,
            Ok(Some(record)) => Some(IncrementalResultSink::new(store, clock, record)),
            Ok(None) => {
                let record =
                    JobResult::placeholder(key.clone(), self.ids.generate_run_id(), self.clock.now());
                if let Err(e) = self.store.put(&record).await {
                    tracing::warn!(job = %key, error = %e, "could not create missing result record");
                }
                Some(IncrementalResultSink::new(store, clock, record))
            }
            Err(e) => {
                tracing::warn!(job = %key, error = %e, "could not load result; writing without run check");
                let record =
                    JobResult::placeholder(key.clone(), self.ids.generate_run_id(), self.clock.now());
                Some(IncrementalResultSink::unfenced(store, clock, record))
            }
        }
    }
}

/// Handle to the spawned worker.
/// - `shutdown_tx` を drop すると worker は止まる
/// - 実行中のジョブは中断しない（キャンセルは非対応）
pub struct WorkerHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl WorkerHandle {
    /// Stop taking new entries after the current job.
    pub fn request_shutdown(&self) {
        // ignore send error: the worker may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    /// Shutdown and wait for the in-flight job (if any) to finish.
    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        if let Err(e) = self.join.await {
            tracing::error!(error = %e, "worker task ended abnormally");
        }
    }
}
