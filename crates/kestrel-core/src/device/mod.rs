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

//! Abstract contract of the graphics device driven by the render scheduler.
//!
//! The device is owned exclusively by the render scheduler thread. Other
//! threads only ever see a [`DeviceContextId`], a non-owning handle carried in
//! render snapshots so the scheduler can tell whether a snapshot was produced
//! for the device it currently owns.

use crate::math::{Extent2D, Mat4, Viewport};
use crate::scene::ItemId;
use std::fmt;

mod lifecycle;

pub use lifecycle::{DeviceFrameLifecycle, FrameState};

/// A non-owning handle identifying a device context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceContextId(pub u64);

/// An opaque handle to a framebuffer owned by a framebuffer pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FramebufferId(pub u64);

/// An opaque handle to a device texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u64);

/// One of the two eyes of a stereo view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eye {
    /// The left eye, index 0.
    Left,
    /// The right eye, index 1.
    Right,
}

impl Eye {
    /// Both eyes, in index order.
    pub const BOTH: [Eye; 2] = [Eye::Left, Eye::Right];

    /// The array index used for per-eye data.
    pub fn index(self) -> usize {
        match self {
            Eye::Left => 0,
            Eye::Right => 1,
        }
    }
}

/// Per-eye projection and view-offset pairs for stereo rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StereoState {
    /// Projection matrix of each eye.
    pub eye_projections: [Mat4; 2],
    /// View offset of each eye relative to the head.
    pub eye_views: [Mat4; 2],
}

/// The pass an item draw is recorded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderPass {
    /// Single forward-shaded pass.
    Forward,
    /// Geometry buffer fill of the deferred path.
    Deferred,
    /// Offscreen pass of the secondary camera.
    SecondaryCamera,
}

/// A command recorded into the device during an active frame.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    /// Pipeline stages were reset to their defaults.
    ResetStages,
    /// The active viewport changed.
    SetViewport(Viewport),
    /// The overlay was rendered into `texture`.
    RenderOverlay {
        /// Region the overlay covers.
        viewport: Viewport,
        /// Texture receiving the overlay.
        texture: TextureId,
    },
    /// A scene item was drawn.
    Draw {
        /// The item drawn.
        item: ItemId,
        /// The pass it was recorded into.
        pass: RenderPass,
    },
    /// Deferred lighting was resolved over the geometry buffer.
    ResolveLighting,
    /// The HUD was composited, optionally from an overlay texture.
    CompositeHud {
        /// Overlay texture composited, if any.
        texture: Option<TextureId>,
    },
    /// The frame was blitted into the final framebuffer.
    Blit {
        /// Destination framebuffer.
        target: FramebufferId,
    },
}

/// The commands recorded between one `begin_frame` / `end_frame` pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandBatch {
    /// Commands in recording order.
    pub commands: Vec<DeviceCommand>,
}

impl CommandBatch {
    /// Number of item draws in the batch.
    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DeviceCommand::Draw { .. }))
            .count()
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// An error raised while creating a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// No usable adapter or context could be created.
    Unavailable(String),
    /// The requested configuration is not valid for this device.
    InvalidDescriptor(String),
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::Unavailable(msg) => write!(f, "graphics device unavailable: {msg}"),
            DeviceError::InvalidDescriptor(msg) => {
                write!(f, "invalid graphics device descriptor: {msg}")
            }
        }
    }
}

impl std::error::Error for DeviceError {}

/// The graphics device contract.
///
/// Implementations are not required to validate call ordering; the
/// [`DeviceFrameLifecycle`] wrapper enforces that `begin_frame` / `end_frame`
/// pairs never overlap and that recording only happens inside a frame.
pub trait DeviceContext: Send + fmt::Debug {
    /// Returns the handle snapshots use to refer to this device.
    fn id(&self) -> DeviceContextId;

    /// Size of the device's output surface.
    fn device_size(&self) -> Extent2D;

    /// Opens a frame with the camera view and the head pose.
    fn begin_frame(&mut self, view: &Mat4, head_pose: &Mat4);

    /// Resets all pipeline stages to known defaults.
    fn reset_stages(&mut self);

    /// Records a command into the open frame.
    fn submit(&mut self, command: DeviceCommand);

    /// Closes the open frame and returns everything recorded since `begin_frame`.
    fn end_frame(&mut self) -> CommandBatch;

    /// Switches stereo rendering on or off.
    fn enable_stereo(&mut self, enabled: bool);

    /// Returns whether stereo rendering is on.
    fn is_stereo(&self) -> bool;

    /// Sets the per-eye projection matrices.
    fn set_stereo_projections(&mut self, projections: [Mat4; 2]);

    /// Sets the per-eye view offsets.
    fn set_stereo_views(&mut self, views: [Mat4; 2]);

    /// Releases every device resource. No call is valid afterwards.
    fn shutdown(&mut self);
}

/// A recording handle to a device with an open frame.
///
/// Jobs and overlay renderers receive a `FrameRecorder` instead of the device
/// itself, so they can record commands but cannot open or close frames.
pub struct FrameRecorder<'a> {
    device: &'a mut dyn DeviceContext,
}

impl<'a> FrameRecorder<'a> {
    pub(crate) fn new(device: &'a mut dyn DeviceContext) -> Self {
        Self { device }
    }

    /// Records a command into the open frame.
    pub fn submit(&mut self, command: DeviceCommand) {
        self.device.submit(command);
    }

    /// Size of the device's output surface.
    pub fn device_size(&self) -> Extent2D {
        self.device.device_size()
    }

    /// Returns whether the frame is being rendered in stereo.
    pub fn is_stereo(&self) -> bool {
        self.device.is_stereo()
    }
}

impl fmt::Debug for FrameRecorder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameRecorder")
            .field("device", &self.device.id())
            .finish()
    }
}
