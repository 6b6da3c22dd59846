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

//! A minimal HUD overlay renderer.

use kestrel_core::device::{DeviceCommand, FrameRecorder, TextureId};
use kestrel_core::frame::FrameIndex;
use kestrel_core::math::{Mat4, Viewport};
use kestrel_core::overlay::OverlayRenderer;

/// Texture the HUD overlay is rendered into.
pub const HUD_OVERLAY_TEXTURE: TextureId = TextureId(0x0E7A);

/// Compositor information received for one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    /// Cycle index.
    pub index: FrameIndex,
    /// Eye-to-world transform.
    pub eye_to_world: Mat4,
    /// Sensor-to-world transform.
    pub sensor_to_world: Mat4,
}

/// Renders the HUD into a fixed texture covering the whole viewport.
#[derive(Debug, Default)]
pub struct HudOverlayRenderer {
    frames_rendered: u64,
    frame_info: Option<FrameInfo>,
}

impl HudOverlayRenderer {
    /// Creates the renderer.
    pub fn new() -> Self {
        Self::default()
    }

    /// How many overlays were rendered.
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// The last compositor information received.
    pub fn frame_info(&self) -> Option<FrameInfo> {
        self.frame_info
    }
}

impl OverlayRenderer for HudOverlayRenderer {
    fn render_overlay(
        &mut self,
        viewport: Viewport,
        recorder: &mut FrameRecorder<'_>,
    ) -> Option<TextureId> {
        if viewport.extent().is_empty() {
            return None;
        }
        recorder.submit(DeviceCommand::RenderOverlay {
            viewport,
            texture: HUD_OVERLAY_TEXTURE,
        });
        self.frames_rendered += 1;
        Some(HUD_OVERLAY_TEXTURE)
    }

    fn set_frame_info(&mut self, index: FrameIndex, eye_to_world: &Mat4, sensor_to_world: &Mat4) {
        self.frame_info = Some(FrameInfo {
            index,
            eye_to_world: *eye_to_world,
            sensor_to_world: *sensor_to_world,
        });
    }
}
