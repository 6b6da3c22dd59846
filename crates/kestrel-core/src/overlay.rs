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

//! Overlay pre-pass contract.

use crate::device::{FrameRecorder, TextureId};
use crate::frame::FrameIndex;
use crate::math::{Mat4, Viewport};

/// Renders the HUD overlay before the job graph runs.
pub trait OverlayRenderer: Send {
    /// Renders the overlay for `viewport` and returns the texture holding it.
    fn render_overlay(
        &mut self,
        viewport: Viewport,
        recorder: &mut FrameRecorder<'_>,
    ) -> Option<TextureId>;

    /// Receives the compositor information of the current cycle.
    fn set_frame_info(&mut self, _index: FrameIndex, _eye_to_world: &Mat4, _sensor_to_world: &Mat4) {}
}
