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

//! The pluggable consumer of finished frames.

use crate::device::{FrameRecorder, TextureId};
use crate::frame::{Frame, FrameIndex};
use std::sync::Arc;

/// A post-process hook a sink injects into the main view, run after the scene
/// has been drawn and before the final blit. Receives the overlay texture
/// rendered this cycle, if any.
pub type HudOperator = Arc<dyn Fn(&mut FrameRecorder<'_>, Option<TextureId>) + Send + Sync>;

/// A display device abstraction receiving one [`Frame`] per render cycle.
///
/// Sinks are shared between the render scheduler and the owning application,
/// so every method takes `&self`.
pub trait OutputSink: Send + Sync {
    /// A human-readable name for logs.
    fn name(&self) -> &str;

    /// Called before any device work for cycle `index`.
    ///
    /// Returning `false` aborts the cycle and asks the application to
    /// reconfigure the output (device lost, mode change).
    fn begin_frame_render(&self, index: FrameIndex) -> bool;

    /// Takes ownership of a finished frame. The sink must eventually recycle
    /// or drop it.
    fn submit_frame(&self, frame: Frame);

    /// Whether the sink displays at a fixed, low refresh rate and wants
    /// frames rate-limited.
    fn is_throttled(&self) -> bool;

    /// The HUD post-process hook, if the sink has one.
    fn hud_operator(&self) -> Option<HudOperator> {
        None
    }

    /// Blocks until every submitted frame has been consumed.
    fn flush(&self) {}
}
