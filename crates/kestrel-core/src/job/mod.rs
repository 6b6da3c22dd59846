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

//! # Render Jobs
//!
//! A **Job** is a named unit of render work executed once per cycle by the
//! job graph. Jobs run strictly one after another and each receives the same
//! [`RenderContext`] by exclusive mutable access, so a job observes every
//! mutation made by the jobs before it.
//!
//! A job that meets a stale or invalid input (an item id that no longer
//! resolves, a missing blackboard entry) skips that input and carries on; an
//! error returned from [`Job::execute`] is logged by the graph, which then
//! continues with the next job.
//!
//! ```rust,ignore
//! use kestrel_core::job::{Job, JobError, RenderContext};
//!
//! struct CountItems;
//!
//! impl Job for CountItems {
//!     fn name(&self) -> &str { "CountItems" }
//!
//!     fn execute(&mut self, ctx: &mut RenderContext<'_>) -> Result<(), JobError> {
//!         let mut n = 0;
//!         ctx.scene.visit_items(&mut |_| n += 1);
//!         ctx.details.items_considered += n;
//!         Ok(())
//!     }
//! }
//! ```

use crate::device::{DeviceContext, FrameRecorder, FramebufferId, TextureId};
use crate::frame::FrameIndex;
use crate::math::Viewport;
use crate::scene::{Item, Scene};
use crate::sink::HudOperator;
use crate::snapshot::RenderArgsSnapshot;
use std::fmt;
use std::sync::Arc;

mod blackboard;
mod details;

pub use blackboard::Blackboard;
pub use details::{JobTiming, RenderDetails};

/// Visibility and level-of-detail predicate. Returns `true` to keep the item.
pub type CullFunctor = Arc<dyn Fn(&RenderArgsSnapshot, &Item) -> bool + Send + Sync>;

/// Error type for job operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    /// The job was handed an input it cannot use.
    InvalidInput(String),
    /// The job failed while recording its work.
    ExecutionFailed(String),
    /// The job could not build its device resources.
    SetupFailed(String),
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobError::InvalidInput(msg) => write!(f, "Invalid job input: {msg}"),
            JobError::ExecutionFailed(msg) => write!(f, "Job execution failed: {msg}"),
            JobError::SetupFailed(msg) => write!(f, "Job setup failed: {msg}"),
        }
    }
}

impl std::error::Error for JobError {}

/// A named unit of render work.
pub trait Job: Send {
    /// The name used in logs and timings.
    fn name(&self) -> &str;

    /// Builds device resources once, before the first cycle.
    fn setup(&mut self, _device: &dyn DeviceContext) -> Result<(), JobError> {
        Ok(())
    }

    /// Records this job's work for the current cycle.
    fn execute(&mut self, ctx: &mut RenderContext<'_>) -> Result<(), JobError>;
}

/// Mutable state threaded through every job of one cycle.
///
/// Built fresh for each cycle by the render loop. Jobs must not keep
/// references into it past their own `execute` call, which the borrow of the
/// `'a` lifetime enforces.
pub struct RenderContext<'a> {
    /// The snapshot this cycle renders.
    pub args: RenderArgsSnapshot,
    /// Index of the current cycle.
    pub frame_index: FrameIndex,
    /// The scene being rendered.
    pub scene: &'a dyn Scene,
    /// Recording access to the device.
    pub recorder: FrameRecorder<'a>,
    /// Main viewport of the cycle.
    pub viewport: Viewport,
    /// Visibility predicate shared by view jobs.
    pub cull: Option<CullFunctor>,
    /// HUD hook supplied by the output sink.
    pub hud_operator: Option<HudOperator>,
    /// Overlay texture produced by the pre-pass.
    pub overlay_texture: Option<TextureId>,
    /// Final framebuffer the main view blits into.
    pub blit_target: Option<FramebufferId>,
    /// Statistics accumulated by jobs.
    pub details: RenderDetails,
    /// Scratch values passed between jobs.
    pub blackboard: Blackboard,
}

impl<'a> RenderContext<'a> {
    /// Creates a context with no optional inputs set.
    pub fn new(
        args: RenderArgsSnapshot,
        frame_index: FrameIndex,
        scene: &'a dyn Scene,
        recorder: FrameRecorder<'a>,
        viewport: Viewport,
    ) -> Self {
        Self {
            args,
            frame_index,
            scene,
            recorder,
            viewport,
            cull: None,
            hud_operator: None,
            overlay_texture: None,
            blit_target: None,
            details: RenderDetails::default(),
            blackboard: Blackboard::new(),
        }
    }

    /// Runs the cull predicate on `item`; keeps everything when none is set.
    pub fn is_visible(&self, item: &Item) -> bool {
        self.cull.as_ref().map_or(true, |cull| cull(&self.args, item))
    }
}

impl fmt::Debug for RenderContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("frame_index", &self.frame_index)
            .field("viewport", &self.viewport)
            .field("has_cull", &self.cull.is_some())
            .field("overlay_texture", &self.overlay_texture)
            .field("blit_target", &self.blit_target)
            .field("details", &self.details)
            .finish()
    }
}
