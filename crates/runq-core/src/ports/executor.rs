//! JobExecutor port - ジョブ 1 件分の外部処理
//!
//! Executor は出力チャンクを到着順に OutputSink へ流し、終了ステータスを返す。
//!
//! # 実装
//! - **CommandExecutor**: 外部コマンド（tokio::process）
//! - **ScriptedExecutor**: テスト用（固定出力・固定遅延）

use std::process::ExitStatus;

use async_trait::async_trait;

use crate::domain::{ExecError, JobKey};

/// Receives output chunks while a job runs.
///
/// Errors are the sink's own business (logged, retried); the executor never
/// stops because a write failed.
#[async_trait]
pub trait OutputSink: Send {
    async fn write_chunk(&mut self, chunk: &[u8]);
}

/// How the external work ended. Non-zero exits are still completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl ExitOutcome {
    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for ExitOutcome {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

#[async_trait]
pub trait JobExecutor: Send + Sync {
    async fn execute(
        &self,
        key: &JobKey,
        sink: &mut dyn OutputSink,
    ) -> Result<ExitOutcome, ExecError>;
}
