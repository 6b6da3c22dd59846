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

//! # Kestrel Core
//!
//! The foundational crate of the Kestrel frame pipeline.
//!
//! It defines the contracts every other crate builds on: the graphics device
//! and its per-frame lifecycle, the frame handed to output sinks, the job and
//! render-context abstractions, the scene and overlay collaborators, and the
//! cross-thread primitives (frame gate, snapshot exchange, task queue).
//!
//! This crate holds no threads and no concrete devices; those live in
//! `kestrel-agents` and `kestrel-infra`.

#![warn(missing_docs)]

pub mod device;
pub mod error;
pub mod event;
pub mod frame;
pub mod job;
pub mod math;
pub mod overlay;
pub mod scene;
pub mod sink;
pub mod snapshot;
pub mod sync;

pub use error::PipelineError;
pub use event::PipelineEvent;
pub use frame::{Frame, FrameIndex};
pub use snapshot::RenderArgsSnapshot;
