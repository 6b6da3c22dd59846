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

//! Level-of-detail visibility predicate.

use crate::settings::LodConfig;
use kestrel_core::job::CullFunctor;
use kestrel_core::scene::Item;
use kestrel_core::snapshot::RenderArgsSnapshot;
use std::sync::Arc;

/// Builds a predicate that keeps items whose bound subtends at least
/// `config.min_angular_size` radians from the viewer. Empty bounds are culled.
pub fn lod_cull(config: LodConfig) -> CullFunctor {
    let min_angular_size = config.min_angular_size;
    Arc::new(move |args: &RenderArgsSnapshot, item: &Item| {
        !item.bound.is_empty() && item.bound.angular_size_from(args.eye_position()) >= min_angular_size
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_core::math::{BoundingSphere, Mat4, Vec3};
    use kestrel_core::scene::{ItemId, ItemPayload, TAG_BITS_0};

    fn item_at(distance: f32, radius: f32) -> Item {
        Item {
            id: ItemId::new(0),
            tags: TAG_BITS_0,
            bound: BoundingSphere::new(Vec3::new(0.0, 0.0, -distance), radius),
            payload: ItemPayload::WorldBox,
        }
    }

    #[test]
    fn test_far_small_items_are_culled() {
        let cull = lod_cull(LodConfig::default());
        let args = RenderArgsSnapshot::default();
        assert!(cull(&args, &item_at(10.0, 1.0)));
        assert!(!cull(&args, &item_at(10_000.0, 1.0)));
        assert!(!cull(&args, &item_at(1.0, 0.0)));
    }

    #[test]
    fn test_distance_is_measured_from_the_eye() {
        let cull = lod_cull(LodConfig::default());
        let args = RenderArgsSnapshot {
            eye_to_world: Mat4::from_translation(Vec3::new(0.0, 0.0, -9_990.0)),
            ..Default::default()
        };
        assert!(cull(&args, &item_at(10_000.0, 1.0)));
    }
}
