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

//! A display that consumes frames immediately.

use kestrel_core::frame::{Frame, FrameIndex};
use kestrel_core::sink::{HudOperator, OutputSink};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// An [`OutputSink`] that recycles every frame as soon as it is submitted.
///
/// Its throttle flag and its answer to `begin_frame_render` can be flipped at
/// runtime, which makes it the sink of choice for exercising the scheduler.
#[derive(Default)]
pub struct NullDisplay {
    throttled: AtomicBool,
    reject_begin: AtomicBool,
    frames_begun: AtomicU64,
    frames_rejected: AtomicU64,
    frames_submitted: AtomicU64,
    last_submitted: AtomicU64,
    hud_operator: Option<HudOperator>,
}

impl NullDisplay {
    /// Creates a display, throttled or not.
    pub fn new(throttled: bool) -> Self {
        Self {
            throttled: AtomicBool::new(throttled),
            ..Default::default()
        }
    }

    /// Installs a HUD operator handed to the main view.
    pub fn with_hud_operator(mut self, operator: HudOperator) -> Self {
        self.hud_operator = Some(operator);
        self
    }

    /// Changes the throttle flag.
    pub fn set_throttled(&self, throttled: bool) {
        self.throttled.store(throttled, Ordering::Release);
    }

    /// Makes `begin_frame_render` fail (`true`) or succeed (`false`).
    pub fn set_reject_begin(&self, reject: bool) {
        self.reject_begin.store(reject, Ordering::Release);
    }

    /// Number of `begin_frame_render` calls.
    pub fn frames_begun(&self) -> u64 {
        self.frames_begun.load(Ordering::Acquire)
    }

    /// Number of rejected frame starts.
    pub fn frames_rejected(&self) -> u64 {
        self.frames_rejected.load(Ordering::Acquire)
    }

    /// Number of frames received.
    pub fn frames_submitted(&self) -> u64 {
        self.frames_submitted.load(Ordering::Acquire)
    }

    /// Index of the last frame received.
    pub fn last_submitted(&self) -> Option<FrameIndex> {
        (self.frames_submitted() > 0).then(|| self.last_submitted.load(Ordering::Acquire))
    }
}

impl OutputSink for NullDisplay {
    fn name(&self) -> &str {
        "null"
    }

    fn begin_frame_render(&self, index: FrameIndex) -> bool {
        self.frames_begun.fetch_add(1, Ordering::AcqRel);
        if self.reject_begin.load(Ordering::Acquire) {
            log::debug!("Null display rejecting frame {index}");
            self.frames_rejected.fetch_add(1, Ordering::AcqRel);
            return false;
        }
        true
    }

    fn submit_frame(&self, frame: Frame) {
        self.last_submitted.store(frame.index(), Ordering::Release);
        self.frames_submitted.fetch_add(1, Ordering::AcqRel);
        frame.recycle();
    }

    fn is_throttled(&self) -> bool {
        self.throttled.load(Ordering::Acquire)
    }

    fn hud_operator(&self) -> Option<HudOperator> {
        self.hud_operator.clone()
    }
}

impl std::fmt::Debug for NullDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NullDisplay")
            .field("throttled", &self.is_throttled())
            .field("frames_submitted", &self.frames_submitted())
            .finish()
    }
}
