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

//! Pacing policy for the Kestrel render scheduler.
//!
//! The [`ThrottleController`] keeps the scheduler from producing frames faster
//! than a rate-limited output sink can display them.

#![warn(missing_docs)]

pub mod throttle;

pub use throttle::{ThrottleConfig, ThrottleController, ThrottleDecision};
