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

//! Offscreen pass rendered from the optional secondary camera.

use super::visible_items;
use kestrel_core::device::{DeviceCommand, RenderPass, TextureId};
use kestrel_core::job::{Job, JobError, RenderContext};
use kestrel_core::math::Mat4;
use kestrel_core::scene::TagBits;

/// Texture the secondary camera renders into.
pub const SECONDARY_CAMERA_TEXTURE: TextureId = TextureId(0x5EC0);

/// What the secondary camera produced this cycle, left on the blackboard for
/// later jobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SecondaryCameraOutput {
    /// Texture holding the rendered view.
    pub texture: TextureId,
    /// View the pass was rendered from.
    pub view: Mat4,
    /// Number of items drawn.
    pub items_drawn: u32,
}

/// Renders the scene from `RenderArgsSnapshot::secondary_view` when one is set.
#[derive(Debug)]
pub struct SecondaryCameraJob {
    tag_mask: TagBits,
    texture: TextureId,
}

impl SecondaryCameraJob {
    /// Creates the job, rendering items matching `tag_mask` into `texture`.
    pub fn new(tag_mask: TagBits, texture: TextureId) -> Self {
        Self { tag_mask, texture }
    }
}

impl Job for SecondaryCameraJob {
    fn name(&self) -> &str {
        "SecondaryCamera"
    }

    fn execute(&mut self, ctx: &mut RenderContext<'_>) -> Result<(), JobError> {
        let Some(view) = ctx.args.secondary_view else {
            return Ok(());
        };
        let items = visible_items(ctx, self.tag_mask);
        for item in &items {
            ctx.recorder.submit(DeviceCommand::Draw {
                item: *item,
                pass: RenderPass::SecondaryCamera,
            });
        }
        ctx.details.items_drawn += items.len() as u32;
        ctx.blackboard.insert(SecondaryCameraOutput {
            texture: self.texture,
            view,
            items_drawn: items.len() as u32,
        });
        Ok(())
    }
}
