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

//! Main view rendering: scene pass, HUD composition and final blit.

use super::visible_items;
use crate::render_lane::SecondaryCameraOutput;
use kestrel_core::device::{DeviceCommand, RenderPass};
use kestrel_core::job::{Job, JobError, RenderContext};
use kestrel_core::scene::TagBits;

/// Renders the main view.
///
/// Items whose tags intersect the mask and pass the context's cull predicate
/// are drawn, either into the geometry buffer followed by a lighting resolve
/// (deferred) or in a single forward pass. The sink's HUD operator then runs
/// over the overlay texture, and the result is blitted into the final
/// framebuffer.
#[derive(Debug)]
pub struct RenderViewJob {
    deferred: bool,
    tag_mask: TagBits,
}

impl RenderViewJob {
    /// Creates the main view job.
    pub fn new(deferred: bool, tag_mask: TagBits) -> Self {
        Self { deferred, tag_mask }
    }

    /// Whether the deferred path is used.
    pub fn is_deferred(&self) -> bool {
        self.deferred
    }
}

impl Job for RenderViewJob {
    fn name(&self) -> &str {
        "RenderMainView"
    }

    fn execute(&mut self, ctx: &mut RenderContext<'_>) -> Result<(), JobError> {
        ctx.recorder.submit(DeviceCommand::SetViewport(ctx.viewport));

        let pass = if self.deferred {
            RenderPass::Deferred
        } else {
            RenderPass::Forward
        };
        let items = visible_items(ctx, self.tag_mask);
        for item in &items {
            ctx.recorder.submit(DeviceCommand::Draw { item: *item, pass });
        }
        ctx.details.items_drawn += items.len() as u32;
        if self.deferred {
            ctx.recorder.submit(DeviceCommand::ResolveLighting);
        }

        if let Some(secondary) = ctx.blackboard.get::<SecondaryCameraOutput>() {
            log::trace!(
                "Main view composing secondary camera texture {:?} ({} items)",
                secondary.texture,
                secondary.items_drawn
            );
        }

        match (&ctx.hud_operator, ctx.overlay_texture) {
            (Some(hud), overlay) => hud(&mut ctx.recorder, overlay),
            (None, Some(texture)) => ctx.recorder.submit(DeviceCommand::CompositeHud {
                texture: Some(texture),
            }),
            (None, None) => {}
        }

        match ctx.blit_target {
            Some(target) => ctx.recorder.submit(DeviceCommand::Blit { target }),
            None => log::debug!("Frame {} has no blit target, skipping blit", ctx.frame_index),
        }
        Ok(())
    }
}
