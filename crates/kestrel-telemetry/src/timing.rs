// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Rolling window of cycle durations.

use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;

/// Aggregates over the current window, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TimingSummary {
    /// Samples in the window.
    pub samples: usize,
    /// Mean duration.
    pub average_ms: f64,
    /// Shortest duration.
    pub min_ms: f64,
    /// Longest duration.
    pub max_ms: f64,
}

/// Keeps the last `capacity` cycle durations.
#[derive(Debug, Clone)]
pub struct FrameTimings {
    capacity: usize,
    values: VecDeque<Duration>,
    total_recorded: u64,
}

impl FrameTimings {
    /// Creates an empty window holding at most `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
            total_recorded: 0,
        }
    }

    /// Adds a sample, evicting the oldest when full.
    pub fn add_value(&mut self, value: Duration) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
        self.total_recorded += 1;
    }

    /// Most recent sample.
    pub fn last(&self) -> Option<Duration> {
        self.values.back().copied()
    }

    /// Samples recorded since creation, including evicted ones.
    pub fn total_recorded(&self) -> u64 {
        self.total_recorded
    }

    /// Aggregates over the window.
    pub fn summary(&self) -> TimingSummary {
        if self.values.is_empty() {
            return TimingSummary::default();
        }
        let ms = |d: &Duration| d.as_secs_f64() * 1000.0;
        let sum: f64 = self.values.iter().map(ms).sum();
        TimingSummary {
            samples: self.values.len(),
            average_ms: sum / self.values.len() as f64,
            min_ms: self.values.iter().map(ms).fold(f64::INFINITY, f64::min),
            max_ms: self.values.iter().map(ms).fold(0.0, f64::max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_evicts_oldest() {
        let mut timings = FrameTimings::new(3);
        for ms in [10, 20, 30, 40] {
            timings.add_value(Duration::from_millis(ms));
        }
        let summary = timings.summary();
        assert_eq!(summary.samples, 3);
        assert!((summary.average_ms - 30.0).abs() < 1e-9);
        assert!((summary.min_ms - 20.0).abs() < 1e-9);
        assert!((summary.max_ms - 40.0).abs() < 1e-9);
        assert_eq!(timings.total_recorded(), 4);
        assert_eq!(timings.last(), Some(Duration::from_millis(40)));
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(FrameTimings::new(0).summary(), TimingSummary::default());
    }
}
