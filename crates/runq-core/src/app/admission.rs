//! AdmissionGate - キューの混雑度で submit を受け付けるか決める
//!
//! 状態を持たない純粋関数。depth はサンプル値なので「予約」ではない。

/// Accepts while `depth <= ratio * capacity`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdmissionGate {
    ratio: f64,
}

impl AdmissionGate {
    pub const DEFAULT_RATIO: f64 = 0.75;

    pub fn new(ratio: f64) -> Self {
        Self { ratio }
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn admit(&self, depth: usize, capacity: usize) -> bool {
        depth as f64 <= self.ratio * capacity as f64
    }

    /// Largest depth that is still admitted.
    pub fn threshold(&self, capacity: usize) -> usize {
        (self.ratio * capacity as f64).floor() as usize
    }
}

impl Default for AdmissionGate {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RATIO)
    }
}
