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

//! Events-per-second counter.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Counts events inside a sliding time window.
#[derive(Debug, Clone)]
pub struct RateCounter {
    window: Duration,
    events: VecDeque<Instant>,
    total: u64,
}

impl RateCounter {
    /// Creates a counter averaging over `window`.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            events: VecDeque::new(),
            total: 0,
        }
    }

    /// Records one event at `now`.
    pub fn tick(&mut self, now: Instant) {
        self.events.push_back(now);
        self.total += 1;
        self.evict(now);
    }

    /// Events per second over the window ending at `now`.
    pub fn rate(&mut self, now: Instant) -> f64 {
        self.evict(now);
        if self.window.is_zero() {
            return 0.0;
        }
        self.events.len() as f64 / self.window.as_secs_f64()
    }

    /// Events recorded since creation.
    pub fn total(&self) -> u64 {
        self.total
    }

    fn evict(&mut self, now: Instant) {
        while let Some(&oldest) = self.events.front() {
            if now.saturating_duration_since(oldest) > self.window {
                self.events.pop_front();
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_over_window() {
        let start = Instant::now();
        let mut counter = RateCounter::new(Duration::from_secs(1));
        for i in 0..30 {
            counter.tick(start + Duration::from_millis(i * 33));
        }
        let now = start + Duration::from_millis(990);
        assert!((counter.rate(now) - 30.0).abs() < 1e-9);

        let later = start + Duration::from_secs(5);
        assert_eq!(counter.rate(later), 0.0);
        assert_eq!(counter.total(), 30);
    }
}
