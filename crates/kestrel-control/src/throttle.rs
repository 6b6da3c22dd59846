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

//! Frame pacing against throttled output sinks.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Configuration of the [`ThrottleController`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    /// Frame rate a throttled sink is fed at, in Hz.
    pub throttled_frame_rate: u32,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            throttled_frame_rate: 15,
        }
    }
}

impl ThrottleConfig {
    /// Minimum time between two cycles for a throttled sink.
    ///
    /// Whole milliseconds, so 15 Hz gives 66 ms. A rate of zero is treated as 1 Hz.
    pub fn min_period(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.throttled_frame_rate.max(1)))
    }
}

/// Outcome of [`ThrottleController::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleDecision {
    /// The cycle may run.
    Run,
    /// The cycle must be skipped.
    Skip {
        /// Time left until the period has elapsed.
        remaining: Duration,
    },
}

impl ThrottleDecision {
    /// Returns `true` for [`ThrottleDecision::Run`].
    pub fn should_run(&self) -> bool {
        matches!(self, ThrottleDecision::Run)
    }
}

/// Decides whether a render cycle should run.
///
/// A cycle is skipped only when the sink reports itself throttled and less
/// than the minimum period has elapsed since the last cycle that ran. A sink
/// that is not throttled gets every cycle.
#[derive(Debug, Clone)]
pub struct ThrottleController {
    period: Duration,
    last_run: Option<Instant>,
}

impl ThrottleController {
    /// Creates a controller that has not run any cycle yet.
    pub fn new(config: &ThrottleConfig) -> Self {
        log::debug!(
            "Throttle controller at {} Hz ({:?} period)",
            config.throttled_frame_rate,
            config.min_period()
        );
        Self {
            period: config.min_period(),
            last_run: None,
        }
    }

    /// The minimum period between cycles for a throttled sink.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// When the last cycle ran.
    pub fn last_run(&self) -> Option<Instant> {
        self.last_run
    }

    /// Evaluates the skip/run decision at `now`.
    pub fn evaluate(&self, now: Instant, sink_throttled: bool) -> ThrottleDecision {
        if !sink_throttled {
            return ThrottleDecision::Run;
        }
        match self.last_run {
            Some(last) => {
                let elapsed = now.saturating_duration_since(last);
                if elapsed < self.period {
                    let remaining = self.period - elapsed;
                    log::trace!(
                        "Throttled: {elapsed:?} since last cycle, {remaining:?} left of {:?}",
                        self.period
                    );
                    ThrottleDecision::Skip { remaining }
                } else {
                    ThrottleDecision::Run
                }
            }
            None => ThrottleDecision::Run,
        }
    }

    /// Records that a cycle ran at `now`.
    pub fn record_run(&mut self, now: Instant) {
        self.last_run = Some(now);
    }
}
