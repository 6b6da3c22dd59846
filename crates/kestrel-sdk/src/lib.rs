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

//! The public-facing API of the Kestrel frame pipeline.
//!
//! Applications build a [`GraphicsEngine`] from an [`EngineConfig`], hand it
//! a graphics device and an output sink, and drive it from their simulation
//! thread:
//!
//! ```rust,ignore
//! use kestrel_sdk::prelude::*;
//!
//! let sink = Arc::new(NullDisplay::new(false));
//! let mut engine = GraphicsEngine::new(EngineConfig::default(), sink, None)?;
//! engine.initialize_gpu(|size| {
//!     Ok(Box::new(HeadlessDevice::new(DeviceContextId(1), size)?) as Box<dyn DeviceContext>)
//! })?;
//! engine.initialize_render()?;
//! engine.startup()?;
//!
//! engine.edit_render_args(|args| args.timestamp = 0.016);
//! engine.request_frame();
//!
//! let report = engine.shutdown()?;
//! ```

#![warn(missing_docs)]

pub mod config;
mod engine;

pub use config::{ConfigError, EngineConfig};
pub use engine::{EngineState, GraphicsEngine, ShutdownReport};

/// The types most applications need.
pub mod prelude {
    pub use crate::config::{ConfigError, EngineConfig};
    pub use crate::engine::{EngineState, GraphicsEngine, ShutdownReport};
    pub use kestrel_core::device::{DeviceContext, DeviceContextId, DeviceError};
    pub use kestrel_core::math::{BoundingSphere, Extent2D, Mat4, Vec3};
    pub use kestrel_core::scene::{ItemId, ItemPayload, Scene, Transaction, TAG_BITS_0, TAG_BITS_1};
    pub use kestrel_core::sink::OutputSink;
    pub use kestrel_core::{PipelineError, PipelineEvent, RenderArgsSnapshot};
    pub use kestrel_infra::display::{NullDisplay, PresenterConfig, PresenterDisplay};
    pub use kestrel_infra::graphics::HeadlessDevice;
    pub use kestrel_lanes::render_lane::HudOverlayRenderer;
    pub use kestrel_telemetry::{init_logging, TelemetrySummary};
    pub use std::sync::Arc;
}
