//! IdGenerator port - RunId 生成の抽象化
//!
//! # 実装
//! - **UlidGenerator**: Clock の時刻 + 乱数で ULID を作る

use std::sync::Arc;

use ulid::Ulid;

use crate::domain::RunId;
use crate::ports::Clock;

/// IdGenerator は submit ごとの RunId を発行
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数のリクエストタスクから呼ばれる）
pub trait IdGenerator: Send + Sync {
    fn generate_run_id(&self) -> RunId;
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// FixedClock を渡すと timestamp 部分が固定される（乱数部分は毎回変わる）。
pub struct UlidGenerator {
    clock: Arc<dyn Clock>,
}

impl UlidGenerator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl IdGenerator for UlidGenerator {
    fn generate_run_id(&self) -> RunId {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        RunId::from(Ulid::from_parts(timestamp_ms, rand::random()))
    }
}
