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

//! Logging setup and render statistics.
//!
//! The render thread reports each completed cycle to a shared
//! [`TelemetryService`], which keeps a rolling window of cycle durations,
//! the cycle rate and the latest [`kestrel_core::job::RenderDetails`].

#![warn(missing_docs)]

pub mod details;
pub mod logging;
pub mod rate;
pub mod service;
pub mod timing;

pub use details::{PublishedDetails, RenderDetailsStore};
pub use logging::init_logging;
pub use rate::RateCounter;
pub use service::{TelemetryConfig, TelemetryService, TelemetrySummary};
pub use timing::{FrameTimings, TimingSummary};
