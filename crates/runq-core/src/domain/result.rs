//! JobResult - ジョブ 1 件分の永続レコード
//!
//! 状態遷移:
//! - submit: placeholder（finished=false, output 空, 新しい run_id）で上書き
//! - worker: output に追記（finished は false のまま）
//! - worker: プロセス終了で finished=true
//!
//! 削除は存在しない。同じ JobKey の次の submit で丸ごと置き換わるだけ。

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{JobKey, RunId};

/// Persisted record for one identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobResult {
    pub identifier: JobKey,
    pub run_id: RunId,
    pub finished: bool,
    pub output: Vec<u8>,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobResult {
    /// Fresh record written synchronously by a submission.
    pub fn placeholder(identifier: JobKey, run_id: RunId, now: DateTime<Utc>) -> Self {
        Self {
            identifier,
            run_id,
            finished: false,
            output: Vec::new(),
            submitted_at: now,
            updated_at: now,
        }
    }

    /// Append a chunk of process output.
    pub fn append(&mut self, chunk: &[u8], now: DateTime<Utc>) {
        self.output.extend_from_slice(chunk);
        self.updated_at = now;
    }

    /// Mark as finished (false -> true only).
    pub fn mark_finished(&mut self, now: DateTime<Utc>) {
        self.finished = true;
        self.updated_at = now;
    }

    pub fn output_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.output)
    }
}

/// Read-only view returned by the status query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobStatus {
    pub identifier: JobKey,
    pub finished: bool,
    pub output: Vec<u8>,
}

impl JobStatus {
    pub fn output_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.output)
    }
}

impl From<JobResult> for JobStatus {
    fn from(result: JobResult) -> Self {
        Self {
            identifier: result.identifier,
            finished: result.finished,
            output: result.output,
        }
    }
}
