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

//! The begin/end state machine bounding device work for one cycle.

use super::{DeviceContext, DeviceContextId, FrameRecorder};
use crate::error::PipelineError;
use crate::frame::{Frame, FrameIndex, Framebuffer, FramebufferRecycler};
use crate::math::{Extent2D, Mat4};
use std::sync::Arc;

/// The state of a [`DeviceFrameLifecycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// No frame is open; `begin_frame` is valid.
    Idle,
    /// A frame is open; recording and `end_frame` are valid.
    FrameActive,
    /// The frame has been closed and is being packaged.
    FrameClosed,
}

/// Owns a [`DeviceContext`] and enforces its per-frame call ordering.
///
/// `begin_frame` is only accepted from [`FrameState::Idle`] and `end_frame`
/// only from [`FrameState::FrameActive`]. Violations are reported as fatal
/// [`PipelineError`]s: they mean the caller has lost track of device state.
#[derive(Debug)]
pub struct DeviceFrameLifecycle {
    device: Box<dyn DeviceContext>,
    state: FrameState,
    shut_down: bool,
}

impl DeviceFrameLifecycle {
    /// Takes ownership of a device.
    pub fn new(device: Box<dyn DeviceContext>) -> Self {
        Self {
            device,
            state: FrameState::Idle,
            shut_down: false,
        }
    }

    /// The current state.
    pub fn state(&self) -> FrameState {
        self.state
    }

    /// The id snapshots must carry to render against this device.
    pub fn device_id(&self) -> DeviceContextId {
        self.device.id()
    }

    /// Size of the device's output surface.
    pub fn device_size(&self) -> Extent2D {
        self.device.device_size()
    }

    /// Read-only access to the device, for one-time job setup.
    pub fn device(&self) -> &dyn DeviceContext {
        self.device.as_ref()
    }

    /// Returns `true` once [`shutdown`](Self::shutdown) has completed.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Opens a frame and resets every pipeline stage.
    ///
    /// # Errors
    ///
    /// [`PipelineError::ReentrantBeginFrame`] if a frame is already open.
    pub fn begin_frame(&mut self, view: &Mat4, head_pose: &Mat4) -> Result<(), PipelineError> {
        if self.shut_down {
            return Err(PipelineError::InvalidState("begin_frame on a shut down device"));
        }
        if self.state != FrameState::Idle {
            log::error!("begin_frame called in state {:?}", self.state);
            return Err(PipelineError::ReentrantBeginFrame);
        }
        self.device.begin_frame(view, head_pose);
        self.device.reset_stages();
        self.state = FrameState::FrameActive;
        Ok(())
    }

    /// Switches the open frame to stereo with the given per-eye matrices.
    pub fn enable_stereo(
        &mut self,
        projections: [Mat4; 2],
        views: [Mat4; 2],
    ) -> Result<(), PipelineError> {
        self.ensure_active()?;
        self.device.enable_stereo(true);
        self.device.set_stereo_projections(projections);
        self.device.set_stereo_views(views);
        Ok(())
    }

    /// Returns a recorder for the open frame.
    pub fn recorder(&mut self) -> Result<FrameRecorder<'_>, PipelineError> {
        self.ensure_active()?;
        Ok(FrameRecorder::new(self.device.as_mut()))
    }

    /// Closes the open frame and packages it with its framebuffer.
    ///
    /// Stereo is switched off again once the frame is produced, so the next
    /// cycle starts in mono unless it re-enables stereo.
    ///
    /// # Errors
    ///
    /// [`PipelineError::EndFrameWithoutBegin`] if no frame is open. The
    /// framebuffer is handed back to `recycler` in that case.
    pub fn end_frame(
        &mut self,
        index: FrameIndex,
        framebuffer: Framebuffer,
        recycler: Arc<dyn FramebufferRecycler>,
    ) -> Result<Frame, PipelineError> {
        if self.state != FrameState::FrameActive {
            log::error!("end_frame called in state {:?}", self.state);
            recycler.recycle(framebuffer);
            return Err(PipelineError::EndFrameWithoutBegin);
        }
        self.state = FrameState::FrameClosed;
        let stereo = self.device.is_stereo();
        let batch = self.device.end_frame();
        if stereo {
            self.device.enable_stereo(false);
        }
        let frame = Frame::new(index, framebuffer, batch, stereo, recycler);
        self.state = FrameState::Idle;
        Ok(frame)
    }

    /// Releases the device. Calling it again is a no-op.
    ///
    /// # Errors
    ///
    /// [`PipelineError::ShutdownWhileFrameActive`] if a frame is still open.
    pub fn shutdown(&mut self) -> Result<(), PipelineError> {
        if self.state == FrameState::FrameActive {
            log::error!("Refusing to shut down device {:?} with an open frame", self.device.id());
            return Err(PipelineError::ShutdownWhileFrameActive);
        }
        if !self.shut_down {
            log::info!("Shutting down graphics device {:?}", self.device.id());
            self.device.shutdown();
            self.shut_down = true;
        }
        Ok(())
    }

    fn ensure_active(&self) -> Result<(), PipelineError> {
        if self.state == FrameState::FrameActive {
            Ok(())
        } else {
            Err(PipelineError::DeviceNotActive)
        }
    }
}

impl Drop for DeviceFrameLifecycle {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::warn!("Device dropped without a clean shutdown: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{CommandBatch, DeviceCommand, FramebufferId};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct TestDevice {
        recorded: Vec<DeviceCommand>,
        stereo: bool,
        begun: usize,
        shutdowns: Arc<AtomicUsize>,
    }

    impl DeviceContext for TestDevice {
        fn id(&self) -> DeviceContextId {
            DeviceContextId(1)
        }
        fn device_size(&self) -> Extent2D {
            Extent2D::new(64, 32)
        }
        fn begin_frame(&mut self, _view: &Mat4, _head_pose: &Mat4) {
            self.begun += 1;
        }
        fn reset_stages(&mut self) {
            self.recorded.push(DeviceCommand::ResetStages);
        }
        fn submit(&mut self, command: DeviceCommand) {
            self.recorded.push(command);
        }
        fn end_frame(&mut self) -> CommandBatch {
            CommandBatch {
                commands: std::mem::take(&mut self.recorded),
            }
        }
        fn enable_stereo(&mut self, enabled: bool) {
            self.stereo = enabled;
        }
        fn is_stereo(&self) -> bool {
            self.stereo
        }
        fn set_stereo_projections(&mut self, _projections: [Mat4; 2]) {}
        fn set_stereo_views(&mut self, _views: [Mat4; 2]) {}
        fn shutdown(&mut self) {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct VecRecycler(Mutex<Vec<FramebufferId>>);

    impl FramebufferRecycler for VecRecycler {
        fn recycle(&self, framebuffer: Framebuffer) {
            self.0.lock().unwrap().push(framebuffer.id());
        }
    }

    fn framebuffer() -> Framebuffer {
        Framebuffer::new(FramebufferId(9), Extent2D::new(64, 32))
    }

    #[test]
    fn test_begin_end_cycle_returns_to_idle() {
        let mut lifecycle = DeviceFrameLifecycle::new(Box::new(TestDevice::default()));
        let recycler = Arc::new(VecRecycler::default());

        lifecycle.begin_frame(&Mat4::IDENTITY, &Mat4::IDENTITY).unwrap();
        assert_eq!(lifecycle.state(), FrameState::FrameActive);
        lifecycle
            .recorder()
            .unwrap()
            .submit(DeviceCommand::ResolveLighting);

        let frame = lifecycle.end_frame(5, framebuffer(), recycler.clone()).unwrap();
        assert_eq!(lifecycle.state(), FrameState::Idle);
        assert_eq!(frame.index(), 5);
        assert_eq!(
            frame.batch().commands,
            vec![DeviceCommand::ResetStages, DeviceCommand::ResolveLighting]
        );
        frame.recycle();
        assert_eq!(recycler.0.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_reentrant_begin_frame_is_fatal() {
        let mut lifecycle = DeviceFrameLifecycle::new(Box::new(TestDevice::default()));
        lifecycle.begin_frame(&Mat4::IDENTITY, &Mat4::IDENTITY).unwrap();
        assert_eq!(
            lifecycle.begin_frame(&Mat4::IDENTITY, &Mat4::IDENTITY),
            Err(PipelineError::ReentrantBeginFrame)
        );
        assert_eq!(lifecycle.state(), FrameState::FrameActive);
    }

    #[test]
    fn test_end_frame_without_begin_is_fatal_and_recycles() {
        let mut lifecycle = DeviceFrameLifecycle::new(Box::new(TestDevice::default()));
        let recycler = Arc::new(VecRecycler::default());
        let result = lifecycle.end_frame(0, framebuffer(), recycler.clone());
        assert!(matches!(result, Err(PipelineError::EndFrameWithoutBegin)));
        assert_eq!(*recycler.0.lock().unwrap(), vec![FramebufferId(9)]);
    }

    #[test]
    fn test_recorder_requires_active_frame() {
        let mut lifecycle = DeviceFrameLifecycle::new(Box::new(TestDevice::default()));
        assert!(matches!(
            lifecycle.recorder(),
            Err(PipelineError::DeviceNotActive)
        ));
        assert_eq!(
            lifecycle.enable_stereo([Mat4::IDENTITY; 2], [Mat4::IDENTITY; 2]),
            Err(PipelineError::DeviceNotActive)
        );
    }

    #[test]
    fn test_stereo_is_cleared_after_end_frame() {
        let mut lifecycle = DeviceFrameLifecycle::new(Box::new(TestDevice::default()));
        let recycler = Arc::new(VecRecycler::default());

        lifecycle.begin_frame(&Mat4::IDENTITY, &Mat4::IDENTITY).unwrap();
        lifecycle
            .enable_stereo([Mat4::IDENTITY; 2], [Mat4::IDENTITY; 2])
            .unwrap();
        assert!(lifecycle.recorder().unwrap().is_stereo());
        let frame = lifecycle.end_frame(1, framebuffer(), recycler.clone()).unwrap();
        assert!(frame.is_stereo());

        lifecycle.begin_frame(&Mat4::IDENTITY, &Mat4::IDENTITY).unwrap();
        assert!(!lifecycle.recorder().unwrap().is_stereo());
    }

    #[test]
    fn test_shutdown_refused_while_frame_active() {
        let shutdowns = Arc::new(AtomicUsize::new(0));
        let device = TestDevice {
            shutdowns: shutdowns.clone(),
            ..Default::default()
        };
        let mut lifecycle = DeviceFrameLifecycle::new(Box::new(device));
        let recycler = Arc::new(VecRecycler::default());

        lifecycle.begin_frame(&Mat4::IDENTITY, &Mat4::IDENTITY).unwrap();
        assert_eq!(lifecycle.shutdown(), Err(PipelineError::ShutdownWhileFrameActive));
        assert_eq!(shutdowns.load(Ordering::SeqCst), 0);

        lifecycle.end_frame(2, framebuffer(), recycler).unwrap();
        lifecycle.shutdown().unwrap();
        lifecycle.shutdown().unwrap();
        assert!(lifecycle.is_shut_down());
        drop(lifecycle);
        assert_eq!(shutdowns.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_begin_after_shutdown_is_rejected() {
        let mut lifecycle = DeviceFrameLifecycle::new(Box::new(TestDevice::default()));
        lifecycle.shutdown().unwrap();
        assert!(matches!(
            lifecycle.begin_frame(&Mat4::IDENTITY, &Mat4::IDENTITY),
            Err(PipelineError::InvalidState(_))
        ));
    }
}
