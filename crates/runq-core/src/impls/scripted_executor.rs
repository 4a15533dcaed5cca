//! ScriptedExecutor - テスト用の決定的な JobExecutor
//!
//! 外部プロセスを起動せず、固定のチャンクを固定の間隔で OutputSink に流す。
//! 実行された JobKey を順番に記録するので FIFO の検証にも使える。

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{ExecError, JobKey};
use crate::ports::{ExitOutcome, JobExecutor, OutputSink};

pub struct ScriptedExecutor {
    chunks: Vec<Vec<u8>>,
    delay: Duration,
    exit_code: i32,
    fail_launch: bool,
    runs: Mutex<Vec<JobKey>>,
}

impl ScriptedExecutor {
    pub fn new<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<u8>>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
            delay: Duration::ZERO,
            exit_code: 0,
            fail_launch: false,
            runs: Mutex::new(Vec::new()),
        }
    }

    /// Sleep before every chunk.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }

    /// Every execution fails as if the program could not be started.
    pub fn failing_launch(mut self) -> Self {
        self.fail_launch = true;
        self
    }

    /// Identifiers in the order they were executed.
    pub fn runs(&self) -> Vec<JobKey> {
        self.runs.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl JobExecutor for ScriptedExecutor {
    async fn execute(
        &self,
        key: &JobKey,
        sink: &mut dyn OutputSink,
    ) -> Result<ExitOutcome, ExecError> {
        self.runs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(key.clone());

        if self.fail_launch {
            return Err(ExecError::Launch {
                program: "scripted".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "scripted launch failure"),
            });
        }

        for chunk in &self.chunks {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            sink.write_chunk(chunk).await;
        }

        Ok(ExitOutcome::from_code(self.exit_code))
    }
}
