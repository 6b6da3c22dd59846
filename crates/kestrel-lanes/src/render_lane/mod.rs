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

//! Built-in render jobs and the declarative assembly of the render graph.

use crate::graph::JobGraph;
use crate::settings::{Platform, RenderSettings};
use kestrel_core::job::RenderContext;
use kestrel_core::scene::{ItemId, TagBits, TAG_BITS_ALL};

mod lod;
mod overlay;
mod render_view;
mod secondary_camera;
mod update_scene;

pub use lod::lod_cull;
pub use overlay::{FrameInfo, HudOverlayRenderer, HUD_OVERLAY_TEXTURE};
pub use render_view::RenderViewJob;
pub use secondary_camera::{SecondaryCameraJob, SecondaryCameraOutput, SECONDARY_CAMERA_TEXTURE};
pub use update_scene::UpdateSceneJob;

/// Assembles the render graph for `settings`.
///
/// The graph is `UpdateScene`, then `SecondaryCamera` (left out on
/// [`Platform::Mobile`]), then `RenderMainView`, with the LOD predicate as
/// the shared cull functor.
pub fn build_render_graph(settings: &RenderSettings) -> JobGraph {
    let graph = JobGraph::builder()
        .with_cull(lod_cull(settings.lod))
        .add_job(UpdateSceneJob::new())
        .add_job_if(settings.platform != Platform::Mobile, || {
            SecondaryCameraJob::new(TAG_BITS_ALL, SECONDARY_CAMERA_TEXTURE)
        })
        .add_job(RenderViewJob::new(!settings.disable_deferred, settings.tag_mask))
        .build();
    log::info!(
        "Render graph assembled for {:?} ({}): {:?}",
        settings.platform,
        if settings.disable_deferred { "forward" } else { "deferred" },
        graph.job_names()
    );
    graph
}

/// Ids of the items matching `tag_mask` that pass the context's cull
/// predicate. Updates the considered/culled counters.
pub(crate) fn visible_items(ctx: &mut RenderContext<'_>, tag_mask: TagBits) -> Vec<ItemId> {
    let args = ctx.args;
    let cull = ctx.cull.clone();
    let mut visible = Vec::new();
    let mut considered = 0u32;
    let mut culled = 0u32;
    ctx.scene.visit_items(&mut |item| {
        considered += 1;
        let keep = item.tags & tag_mask != 0 && cull.as_ref().map_or(true, |c| c(&args, item));
        if keep {
            visible.push(item.id);
        } else {
            culled += 1;
        }
    });
    ctx.details.items_considered += considered;
    ctx.details.items_culled += culled;
    visible
}
