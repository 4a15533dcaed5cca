//! ServerConfig - コマンドライン引数と環境変数
//!
//! 全ての値に既定値があるので、引数なしで起動できる。
//! 末尾の `-- program args...` がジョブごとに実行されるコマンドになる。

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use runq_core::RunnerConfig;
use runq_core::app::AdmissionGate;
use runq_core::impls::{CommandExecutor, DEFAULT_QUEUE_CAPACITY};

/// runq - queue external jobs and stream their output over HTTP
#[derive(Debug, Clone, Parser)]
#[command(name = "runq-server")]
#[command(version, about, long_about = None)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "RUNQ_LISTEN", default_value = "0.0.0.0:80")]
    pub listen: SocketAddr,

    /// SQLite file holding job results
    #[arg(long, env = "RUNQ_DB", default_value = "results.db")]
    pub db: PathBuf,

    /// Give up opening the result store after this many seconds
    #[arg(long, env = "RUNQ_OPEN_TIMEOUT_SECS", default_value_t = 1)]
    pub open_timeout_secs: u64,

    /// Maximum number of queued jobs
    #[arg(long, env = "RUNQ_QUEUE_CAPACITY", default_value_t = DEFAULT_QUEUE_CAPACITY)]
    pub queue_capacity: usize,

    /// Reject submissions once queue depth exceeds this fraction of capacity
    #[arg(long, env = "RUNQ_ADMISSION_RATIO", default_value_t = AdmissionGate::DEFAULT_RATIO)]
    pub admission_ratio: f64,

    /// Directory served under /static
    #[arg(long, env = "RUNQ_STATIC_DIR", default_value = "static")]
    pub static_dir: PathBuf,

    /// Per-request timeout in seconds
    #[arg(long, env = "RUNQ_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Job command; `{id}` in arguments is replaced by the job identifier
    /// (default: vmstat 1 5)
    #[arg(last = true)]
    pub command: Vec<String>,
}

impl ServerConfig {
    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            queue_capacity: self.queue_capacity,
            admission_ratio: self.admission_ratio,
        }
    }

    pub fn executor(&self) -> CommandExecutor {
        CommandExecutor::from_command_line(&self.command).unwrap_or_default()
    }

    pub fn open_timeout(&self) -> Duration {
        Duration::from_secs(self.open_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
