use serde::{Deserialize, Serialize};

/// Snapshot of queue occupancy. `depth` is sampled, not reserved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    pub depth: usize,
    pub capacity: usize,
    /// Highest depth at which a submission is still admitted.
    pub threshold: usize,
}
