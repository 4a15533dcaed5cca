//! Ports - 抽象化レイヤー
//!
//! 各 trait は外部システム（SQLite, 外部プロセス, 時計）へのインターフェースを提供し、
//! テストでは差し替えられるようにする。
//!
//! - ResultStore: ジョブ結果の正本（source of truth）
//! - JobQueue: submit と worker をつなぐ唯一の同期点
//! - JobExecutor / OutputSink: 外部処理と出力のストリーミング

pub mod clock;
pub mod executor;
pub mod id_generator;
pub mod job_queue;
pub mod result_store;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::executor::{ExitOutcome, JobExecutor, OutputSink};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::job_queue::JobQueue;
pub use self::result_store::{ResultStore, WriteOutcome};
