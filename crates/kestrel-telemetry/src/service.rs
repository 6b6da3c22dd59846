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

//! Service collecting per-cycle statistics from the render thread.

use crate::details::{PublishedDetails, RenderDetailsStore};
use crate::rate::RateCounter;
use crate::timing::{FrameTimings, TimingSummary};
use kestrel_core::frame::FrameIndex;
use kestrel_core::job::RenderDetails;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Configuration of the telemetry service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Number of cycle durations kept for aggregates.
    pub timing_window: usize,
    /// Seconds between logged summaries. Zero disables periodic logging.
    pub summary_interval_secs: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            timing_window: 100,
            summary_interval_secs: 5,
        }
    }
}

/// Point-in-time view of the collected statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetrySummary {
    /// Cycles recorded since start.
    pub cycles: u64,
    /// Cycles per second over the last second.
    pub cycles_per_second: f64,
    /// Cycle duration aggregates.
    pub timing: TimingSummary,
    /// Statistics of the latest cycle.
    pub latest: Option<PublishedDetails>,
}

#[derive(Debug)]
struct Counters {
    timings: FrameTimings,
    rate: RateCounter,
    last_cycle: Option<Instant>,
    last_run: Option<Instant>,
    last_summary: Option<Instant>,
}

/// Collects cycle timings, cycle rate and render details.
///
/// Every method takes `&self`, so the service can be shared between the
/// render thread and its owner behind an `Arc`.
#[derive(Debug)]
pub struct TelemetryService {
    counters: Mutex<Counters>,
    details: RenderDetailsStore,
    summary_interval: Duration,
}

impl TelemetryService {
    /// Creates a service from `config`.
    pub fn new(config: &TelemetryConfig) -> Self {
        Self {
            counters: Mutex::new(Counters {
                timings: FrameTimings::new(config.timing_window),
                rate: RateCounter::new(Duration::from_secs(1)),
                last_cycle: None,
                last_run: None,
                last_summary: None,
            }),
            details: RenderDetailsStore::new(),
            summary_interval: Duration::from_secs(config.summary_interval_secs),
        }
    }

    /// Records that a cycle passed the in-flight gate at `now`, whether or not
    /// it goes on to render. This is the instant frame pacing counts from.
    pub fn record_run(&self, now: Instant) {
        self.lock().last_run = Some(now);
    }

    /// Records one completed render cycle.
    pub fn record_cycle(
        &self,
        frame_index: FrameIndex,
        duration: Duration,
        details: RenderDetails,
        now: Instant,
    ) {
        {
            let mut counters = self.lock();
            counters.timings.add_value(duration);
            counters.rate.tick(now);
            counters.last_cycle = Some(now);
        }
        log::trace!(
            "Cycle {} took {:.3} ms ({} drawn, {} culled)",
            frame_index,
            duration.as_secs_f64() * 1000.0,
            details.items_drawn,
            details.items_culled
        );
        self.details.publish(frame_index, details);
    }

    /// Logs and returns a summary when the summary interval has elapsed.
    pub fn tick(&self, now: Instant) -> Option<TelemetrySummary> {
        if self.summary_interval.is_zero() {
            return None;
        }
        {
            let mut counters = self.lock();
            let due = counters
                .last_summary
                .map_or(true, |last| now.saturating_duration_since(last) >= self.summary_interval);
            if !due {
                return None;
            }
            counters.last_summary = Some(now);
        }
        let summary = self.summary_at(now);
        match serde_json::to_string(&summary) {
            Ok(json) => log::info!("Render telemetry: {json}"),
            Err(e) => log::warn!("Failed to serialize telemetry summary: {e}"),
        }
        Some(summary)
    }

    /// Current statistics.
    pub fn summary(&self) -> TelemetrySummary {
        self.summary_at(Instant::now())
    }

    /// When the last cycle was recorded.
    pub fn last_cycle_at(&self) -> Option<Instant> {
        self.lock().last_cycle
    }

    /// When the last cycle passed the in-flight gate.
    pub fn last_run_at(&self) -> Option<Instant> {
        self.lock().last_run
    }

    /// Statistics of the latest cycle.
    pub fn latest_details(&self) -> Option<PublishedDetails> {
        self.details.latest()
    }

    fn summary_at(&self, now: Instant) -> TelemetrySummary {
        let mut counters = self.lock();
        TelemetrySummary {
            cycles: counters.rate.total(),
            cycles_per_second: counters.rate.rate(now),
            timing: counters.timings.summary(),
            latest: self.details.latest(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Counters> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for TelemetryService {
    fn default() -> Self {
        Self::new(&TelemetryConfig::default())
    }
}
