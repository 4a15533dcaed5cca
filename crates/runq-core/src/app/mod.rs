//! App - アプリケーション層
//!
//! ports を組み合わせてジョブ実行のロジックを実装する。
//!
//! # 主要コンポーネント
//! - **AppBuilder**: ワイヤリングと起動時検証
//! - **AdmissionGate**: キューの埋まり具合による受付判定
//! - **SubmissionService**: validate → gate → placeholder → enqueue
//! - **StatusService**: 読み取り専用のステータスクエリ
//! - **WorkerLoop**: dequeue → execute → 出力を逐次保存 → finished

pub mod admission;
pub mod builder;
pub mod sink;
pub mod status;
pub mod submission;
pub mod worker_loop;

pub use self::admission::AdmissionGate;
pub use self::builder::{App, AppBuilder, BuildError, JobService};
pub use self::sink::IncrementalResultSink;
pub use self::status::StatusService;
pub use self::submission::{SubmissionService, SubmitReceipt};
pub use self::worker_loop::{ProcessOutcome, WorkerHandle, WorkerLoop};
