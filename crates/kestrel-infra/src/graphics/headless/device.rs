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

//! A graphics device that records commands instead of talking to a GPU.

use bytemuck::{Pod, Zeroable};
use kestrel_core::device::{
    CommandBatch, DeviceCommand, DeviceContext, DeviceContextId, DeviceError, StereoState,
};
use kestrel_core::math::{Extent2D, Mat4};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Camera block uploaded at the start of every frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct CameraUniform {
    view: Mat4,
    head_pose: Mat4,
}

/// Counters shared between a [`HeadlessDevice`] and any observer.
///
/// The device itself moves to the render thread; the probe stays behind so
/// tests and the runtime can watch what happened to it.
#[derive(Debug, Default)]
pub struct DeviceProbe {
    frames_begun: AtomicU64,
    frames_ended: AtomicU64,
    commands_recorded: AtomicU64,
    uniform_bytes: AtomicU64,
    shut_down: AtomicBool,
}

impl DeviceProbe {
    /// Frames opened so far.
    pub fn frames_begun(&self) -> u64 {
        self.frames_begun.load(Ordering::Acquire)
    }

    /// Frames closed so far.
    pub fn frames_ended(&self) -> u64 {
        self.frames_ended.load(Ordering::Acquire)
    }

    /// Commands recorded across every frame.
    pub fn commands_recorded(&self) -> u64 {
        self.commands_recorded.load(Ordering::Acquire)
    }

    /// Bytes of camera uniforms uploaded.
    pub fn uniform_bytes(&self) -> u64 {
        self.uniform_bytes.load(Ordering::Acquire)
    }

    /// Whether the device has been shut down.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }
}

/// A [`DeviceContext`] backed by plain memory.
#[derive(Debug)]
pub struct HeadlessDevice {
    id: DeviceContextId,
    size: Extent2D,
    probe: Arc<DeviceProbe>,
    recording: Vec<DeviceCommand>,
    camera_staging: Vec<u8>,
    stereo: bool,
    stereo_state: StereoState,
}

impl HeadlessDevice {
    /// Creates a device with an output surface of `size`.
    ///
    /// # Errors
    ///
    /// [`DeviceError::InvalidDescriptor`] if `size` has a zero dimension.
    pub fn new(id: DeviceContextId, size: Extent2D) -> Result<Self, DeviceError> {
        if size.is_empty() {
            return Err(DeviceError::InvalidDescriptor(format!(
                "surface size {}x{} has a zero dimension",
                size.width, size.height
            )));
        }
        log::info!(
            "Headless graphics device {:?} created ({}x{})",
            id,
            size.width,
            size.height
        );
        Ok(Self {
            id,
            size,
            probe: Arc::new(DeviceProbe::default()),
            recording: Vec::new(),
            camera_staging: Vec::with_capacity(std::mem::size_of::<CameraUniform>()),
            stereo: false,
            stereo_state: StereoState {
                eye_projections: [Mat4::IDENTITY; 2],
                eye_views: [Mat4::IDENTITY; 2],
            },
        })
    }

    /// The counters of this device.
    pub fn probe(&self) -> Arc<DeviceProbe> {
        Arc::clone(&self.probe)
    }

    /// The per-eye matrices last set.
    pub fn stereo_state(&self) -> StereoState {
        self.stereo_state
    }
}

impl DeviceContext for HeadlessDevice {
    fn id(&self) -> DeviceContextId {
        self.id
    }

    fn device_size(&self) -> Extent2D {
        self.size
    }

    fn begin_frame(&mut self, view: &Mat4, head_pose: &Mat4) {
        let uniform = CameraUniform {
            view: *view,
            head_pose: *head_pose,
        };
        self.camera_staging.clear();
        self.camera_staging
            .extend_from_slice(bytemuck::bytes_of(&uniform));
        self.probe
            .uniform_bytes
            .fetch_add(self.camera_staging.len() as u64, Ordering::AcqRel);
        self.probe.frames_begun.fetch_add(1, Ordering::AcqRel);
    }

    fn reset_stages(&mut self) {
        self.submit(DeviceCommand::ResetStages);
    }

    fn submit(&mut self, command: DeviceCommand) {
        self.recording.push(command);
        self.probe.commands_recorded.fetch_add(1, Ordering::AcqRel);
    }

    fn end_frame(&mut self) -> CommandBatch {
        self.probe.frames_ended.fetch_add(1, Ordering::AcqRel);
        CommandBatch {
            commands: std::mem::take(&mut self.recording),
        }
    }

    fn enable_stereo(&mut self, enabled: bool) {
        self.stereo = enabled;
    }

    fn is_stereo(&self) -> bool {
        self.stereo
    }

    fn set_stereo_projections(&mut self, projections: [Mat4; 2]) {
        self.stereo_state.eye_projections = projections;
    }

    fn set_stereo_views(&mut self, views: [Mat4; 2]) {
        self.stereo_state.eye_views = views;
    }

    fn shutdown(&mut self) {
        self.recording.clear();
        self.camera_staging = Vec::new();
        self.probe.shut_down.store(true, Ordering::Release);
        log::info!("Headless graphics device {:?} shut down", self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_core::math::Viewport;

    #[test]
    fn test_zero_sized_surface_is_rejected() {
        let err = HeadlessDevice::new(DeviceContextId(1), Extent2D::new(0, 10)).unwrap_err();
        assert!(matches!(err, DeviceError::InvalidDescriptor(_)));
    }

    #[test]
    fn test_probe_tracks_frames_and_uploads() {
        let mut device = HeadlessDevice::new(DeviceContextId(1), Extent2D::new(4, 4)).unwrap();
        let probe = device.probe();

        device.begin_frame(&Mat4::IDENTITY, &Mat4::IDENTITY);
        device.reset_stages();
        device.submit(DeviceCommand::SetViewport(Viewport::default()));
        let batch = device.end_frame();

        assert_eq!(batch.commands.len(), 2);
        assert_eq!(probe.frames_begun(), 1);
        assert_eq!(probe.frames_ended(), 1);
        assert_eq!(probe.commands_recorded(), 2);
        assert_eq!(probe.uniform_bytes(), 2 * 16 * 4);

        device.shutdown();
        assert!(probe.is_shut_down());
    }

    #[test]
    fn test_stereo_matrices_are_kept() {
        let mut device = HeadlessDevice::new(DeviceContextId(1), Extent2D::new(4, 4)).unwrap();
        let left = Mat4::from_translation(kestrel_core::math::Vec3::X);
        device.enable_stereo(true);
        device.set_stereo_views([left, Mat4::IDENTITY]);
        assert!(device.is_stereo());
        assert_eq!(device.stereo_state().eye_views[0], left);
    }
}
