//! Runner configuration.

use crate::app::admission::AdmissionGate;
use crate::impls::DEFAULT_QUEUE_CAPACITY;

#[derive(Debug, Clone, PartialEq)]
pub struct RunnerConfig {
    /// Hard capacity of the job queue; `enqueue` waits beyond this.
    pub queue_capacity: usize,
    /// Fraction of `queue_capacity` above which submissions are rejected.
    pub admission_ratio: f64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            admission_ratio: AdmissionGate::DEFAULT_RATIO,
        }
    }
}
