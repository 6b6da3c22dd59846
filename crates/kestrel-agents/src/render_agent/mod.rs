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

//! Drives the render pipeline.
//!
//! [`RenderLoop`] is the per-cycle algorithm: throttle, in-flight gate, sink
//! handshake, snapshot read, device frame, overlay pre-pass, job graph,
//! frame submission and timing. [`RenderScheduler`] runs it on a dedicated
//! thread that owns the device.

mod render_loop;
mod scheduler;

pub use render_loop::{CycleOutcome, RenderLoop, RenderLoopParts, SkipReason};
pub use scheduler::{RenderScheduler, SchedulerConfig, RENDER_THREAD_NAME};
