//! Impls - ports の実装
//!
//! # 本番用
//! - **SqliteResultStore**: SQLite ファイル 1 つに結果を保存
//! - **BoundedJobQueue**: in-process の bounded FIFO
//! - **CommandExecutor**: 外部コマンドの実行
//!
//! # 開発・テスト用
//! - **InMemoryResultStore**: 書き込み失敗を注入できる ResultStore
//! - **ScriptedExecutor**: 固定出力・固定遅延の JobExecutor

pub mod bounded_queue;
pub mod command_executor;
pub mod inmem_store;
pub mod scripted_executor;
pub mod sqlite_store;

pub use self::bounded_queue::{BoundedJobQueue, DEFAULT_QUEUE_CAPACITY};
pub use self::command_executor::CommandExecutor;
pub use self::inmem_store::InMemoryResultStore;
pub use self::scripted_executor::ScriptedExecutor;
pub use self::sqlite_store::SqliteResultStore;
