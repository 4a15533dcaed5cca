//! runq-core
//!
//! Core building blocks for the runq job runner.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, result, errors）
//! - **ports**: 抽象化レイヤー（ResultStore, JobQueue, JobExecutor, Clock, IdGenerator）
//! - **app**: アプリケーションロジック（builder, admission, submission, status, worker_loop）
//! - **impls**: 実装（BoundedJobQueue, SqliteResultStore, CommandExecutor と開発・テスト用の in-memory 版）
//! - **config** / **observability**: 設定値とキューのスナップショット

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod observability;
pub mod ports;

pub use app::{App, AppBuilder, BuildError, JobService, SubmitReceipt, WorkerHandle};
pub use config::RunnerConfig;
pub use observability::QueueStats;
