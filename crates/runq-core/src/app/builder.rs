//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! - 起動時検証（Fail-fast）: store / executor の未設定、不正な容量・比率は build() で弾く
//! - queue は 1 つだけ作り、SubmissionService / StatusService / WorkerLoop で共有する

use std::sync::Arc;

use super::admission::AdmissionGate;
use super::status::StatusService;
use super::submission::{SubmissionService, SubmitReceipt};
use super::worker_loop::{WorkerHandle, WorkerLoop};
use crate::config::RunnerConfig;
use crate::domain::{JobStatus, StatusError, SubmitError};
use crate::impls::BoundedJobQueue;
use crate::observability::QueueStats;
use crate::ports::{Clock, IdGenerator, JobExecutor, JobQueue, ResultStore, SystemClock, UlidGenerator};

/// AppBuilder はアプリケーションを構築
///
/// # 使用例
/// ```ignore
/// let app = AppBuilder::new()
///     .store(store)
///     .executor(CommandExecutor::default())
///     .build()?;
/// let (service, worker) = app.start();
/// ```
pub struct AppBuilder {
    config: RunnerConfig,
    store: Option<Arc<dyn ResultStore>>,
    executor: Option<Arc<dyn JobExecutor>>,
    clock: Option<Arc<dyn Clock>>,
}

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("no result store configured")]
    MissingStore,

    #[error("no job executor configured")]
    MissingExecutor,

    #[error("queue capacity must be at least 1")]
    InvalidCapacity,

    #[error("admission ratio must be in (0, 1], got {0}")]
    InvalidAdmissionRatio(f64),

    #[error("admission ratio {ratio} admits a full queue of capacity {capacity}")]
    ThresholdReachesCapacity { ratio: f64, capacity: usize },
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            config: RunnerConfig::default(),
            store: None,
            executor: None,
            clock: None,
        }
    }

    pub fn config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(mut self, store: Arc<dyn ResultStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn executor(mut self, executor: Arc<dyn JobExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Override the clock (defaults to [`SystemClock`]).
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Result<App, BuildError> {
        let store = self.store.ok_or(BuildError::MissingStore)?;
        let executor = self.executor.ok_or(BuildError::MissingExecutor)?;
        if self.config.queue_capacity == 0 {
            return Err(BuildError::InvalidCapacity);
        }
        let ratio = self.config.admission_ratio;
        // NaN はどちらの比較も false になるのでここで弾かれる
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(BuildError::InvalidAdmissionRatio(ratio));
        }
        // 受付済みの enqueue が満杯で待たないよう、閾値は容量未満に収める
        if AdmissionGate::new(ratio).threshold(self.config.queue_capacity) >= self.config.queue_capacity {
            return Err(BuildError::ThresholdReachesCapacity {
                ratio,
                capacity: self.config.queue_capacity,
            });
        }

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let ids: Arc<dyn IdGenerator> = Arc::new(UlidGenerator::new(clock.clone()));
        let queue: Arc<dyn JobQueue> = Arc::new(BoundedJobQueue::new(self.config.queue_capacity));
        let gate = AdmissionGate::new(ratio);

        let service = JobService {
            submission: SubmissionService::new(
                store.clone(),
                queue.clone(),
                gate,
                clock.clone(),
                ids.clone(),
            ),
            status: StatusService::new(store.clone(), queue.clone(), gate),
        };
        let worker = WorkerLoop::new(queue, store, executor, clock, ids);

        Ok(App {
            service: Arc::new(service),
            worker,
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Request-facing half of the application, shared by every handler.
pub struct JobService {
    submission: SubmissionService,
    status: StatusService,
}

impl JobService {
    pub async fn submit(&self, raw: &str) -> Result<SubmitReceipt, SubmitError> {
        self.submission.submit(raw).await
    }

    pub async fn status(&self, raw: &str) -> Result<JobStatus, StatusError> {
        self.status.status(raw).await
    }

    pub async fn queue_stats(&self) -> QueueStats {
        self.status.queue_stats().await
    }
}

/// Wired application: the shared service plus the (not yet started) worker.
pub struct App {
    service: Arc<JobService>,
    worker: WorkerLoop,
}

impl App {
    pub fn service(&self) -> Arc<JobService> {
        Arc::clone(&self.service)
    }

    pub fn into_parts(self) -> (Arc<JobService>, WorkerLoop) {
        (self.service, self.worker)
    }

    /// Spawn the single worker and hand back the service.
    pub fn start(self) -> (Arc<JobService>, WorkerHandle) {
        let handle = self.worker.spawn();
        (self.service, handle)
    }
}
