//! Errors - エラー型と分類
//!
//! | 種類 | 発生源 | 呼び出し側への見え方 |
//! |------|--------|----------------------|
//! | ValidationError | submit の入力検証 | client error |
//! | SubmitError::Capacity | AdmissionGate | server busy |
//! | StoreError | encode/decode, sqlx | 書き込み: ログのみ / 読み出し: internal error |
//! | ExecError | 外部プロセス起動・I/O | ログのみ（ジョブは finished になる） |

use std::time::Duration;

use thiserror::Error;

/// Input rejected before any state is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("job identifier must not be empty")]
    EmptyKey,

    /// `.` / `..` segments are collapsed by URL normalisation, so the result
    /// view could not be addressed.
    #[error("job identifier must not contain '.' or '..' path segments")]
    DotSegment,
}

/// Result Store failures (serialization or storage I/O).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not encode result for {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not decode result for {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("result store I/O error: {0}")]
    Io(#[from] sqlx::Error),

    #[error("result store did not open within {0:?}")]
    OpenTimeout(Duration),

    /// Injected by in-memory stores (tests, dev runs).
    #[error("result store unavailable: {0}")]
    Unavailable(String),
}

/// Why a submission was refused.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("server too busy: queue depth {depth} is over the admission threshold for capacity {capacity}")]
    Capacity { depth: usize, capacity: usize },

    #[error("could not store placeholder result: {0}")]
    Persistence(#[source] StoreError),

    /// The runtime shut down before the submission completed.
    #[error("submission was interrupted")]
    Interrupted,
}

/// Why a status read produced no record.
#[derive(Debug, Error)]
pub enum StatusError {
    #[error("no result for {0}")]
    NotFound(String),

    #[error("could not read result: {0}")]
    Persistence(#[from] StoreError),
}

/// External process failures. A non-zero exit is not an error.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("could not launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error while running job: {0}")]
    Io(#[from] std::io::Error),
}
