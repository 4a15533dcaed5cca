//! CommandExecutor - 外部コマンドを起動して出力をストリーミングする JobExecutor
//!
//! # フロー
//! 1. `program args...` を spawn（引数中の `{id}` は JobKey に置換）
//! 2. stdout / stderr をそれぞれ別タスクで読み、到着順に 1 本の channel へ流す
//! 3. channel からチャンクを取り出して OutputSink に書く
//! 4. 両ストリームが閉じたら wait して終了ステータスを返す

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::mpsc;

use crate::domain::{ExecError, JobKey};
use crate::ports::{ExitOutcome, JobExecutor, OutputSink};

/// Placeholder replaced by the job identifier in command arguments.
pub const ID_PLACEHOLDER: &str = "{id}";

const READ_CHUNK_BYTES: usize = 8 * 1024;
const CHUNK_BACKLOG: usize = 64;

#[derive(Debug, Clone)]
pub struct CommandExecutor {
    program: String,
    args: Vec<String>,
}

impl CommandExecutor {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from `[program, args...]`; `None` when empty.
    pub fn from_command_line(parts: &[String]) -> Option<Self> {
        let (program, args) = parts.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn render_args(&self, key: &JobKey) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.replace(ID_PLACEHOLDER, key.as_str()))
            .collect()
    }
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new("vmstat", vec!["1".to_string(), "5".to_string()])
    }
}

#[async_trait]
impl JobExecutor for CommandExecutor {
    async fn execute(
        &self,
        key: &JobKey,
        sink: &mut dyn OutputSink,
    ) -> Result<ExitOutcome, ExecError> {
        let args = self.render_args(key);
        tracing::debug!(job = %key, program = %self.program, ?args, "spawning job process");

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ExecError::Launch {
                program: self.program.clone(),
                source,
            })?;

        let (tx, mut rx) = mpsc::channel::<Vec<u8>>(CHUNK_BACKLOG);
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(pump(stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(pump(stderr, tx.clone()));
        }
        drop(tx);

        while let Some(chunk) = rx.recv().await {
            sink.write_chunk(&chunk).await;
        }

        let status = child.wait().await?;
        Ok(ExitOutcome::from(status))
    }
}

/// Forward one output stream into the shared chunk channel until EOF.
async fn pump<R: AsyncRead + Unpin>(mut reader: R, tx: mpsc::Sender<Vec<u8>>) {
    let mut buf = vec![0u8; READ_CHUNK_BYTES];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "reading job output failed");
                break;
            }
        }
    }
}
