use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Number of operating points kept for the live overlay on the I-V chart.
pub const LIVE_HISTORY_CAPACITY: usize = 10;

/// A single measured (voltage, current) pair at the converter input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperatingPoint {
    pub voltage: f64,
    pub current: f64,
}

/// Rolling history of the most recent operating points, oldest first.
///
/// Never holds more than [`LIVE_HISTORY_CAPACITY`] points and never holds a
/// non-finite value.
#[derive(Debug, Clone, Default)]
pub struct LiveHistory {
    points: VecDeque<OperatingPoint>,
}

impl LiveHistory {
    pub fn new() -> Self {
        Self {
            points: VecDeque::with_capacity(LIVE_HISTORY_CAPACITY + 1),
        }
    }

    /// Record a new point, evicting the oldest once the history is full.
    ///
    /// A NaN or infinite `voltage` or `current` leaves the history untouched.
    pub fn record(&mut self, voltage: f64, current: f64) -> &Self {
        if !voltage.is_finite() || !current.is_finite() {
            return self;
        }

        self.points.push_back(OperatingPoint { voltage, current });
        while self.points.len() > LIVE_HISTORY_CAPACITY {
            self.points.pop_front();
        }
        self
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The most recently recorded point, highlighted on the chart.
    pub fn latest(&self) -> Option<OperatingPoint> {
        self.points.back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OperatingPoint> {
        self.points.iter()
    }

    /// Copy of the history in arrival order.
    pub fn points(&self) -> Vec<OperatingPoint> {
        self.points.iter().copied().collect()
    }
}
