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

//! Statistics accumulated by jobs during one cycle.

use serde::Serialize;

/// Wall-clock time one job took.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobTiming {
    /// Job name.
    pub job: String,
    /// Duration in microseconds.
    pub micros: u64,
}

/// Per-cycle render statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderDetails {
    /// Items visited by view jobs.
    pub items_considered: u32,
    /// Items rejected by masks or the cull predicate.
    pub items_culled: u32,
    /// Items recorded as draws.
    pub items_drawn: u32,
    /// Scene transactions applied this cycle.
    pub transactions_applied: u32,
    /// Jobs that reported an error and were skipped.
    pub jobs_failed: u32,
    /// Durations of every job that ran, in execution order.
    pub job_timings: Vec<JobTiming>,
}

impl RenderDetails {
    /// Total time spent in jobs, in microseconds.
    pub fn total_job_micros(&self) -> u64 {
        self.job_timings.iter().map(|t| t.micros).sum()
    }
}
