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

//! The item outlining the bounds of the world.

use kestrel_core::math::{BoundingSphere, Vec3};
use kestrel_core::scene::{ItemId, ItemPayload, Transaction, TAG_BITS_ALL};

/// Half the edge length of the world cube, in world units.
pub const WORLD_HALF_EXTENT: f32 = 1024.0;

/// Bound of the world box: the sphere circumscribing the world cube.
pub fn world_box_bound() -> BoundingSphere {
    BoundingSphere::new(Vec3::ZERO, WORLD_HALF_EXTENT * 3f32.sqrt())
}

/// Builds the transaction that (re)creates the world box under `id`.
pub fn world_box_transaction(id: ItemId) -> Transaction {
    let mut transaction = Transaction::new();
    transaction.reset_item(id, TAG_BITS_ALL, world_box_bound(), ItemPayload::WorldBox);
    transaction
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ItemScene;
    use kestrel_core::scene::Scene;

    #[test]
    fn test_world_box_contains_world_corners() {
        let bound = world_box_bound();
        let corner = Vec3::new(WORLD_HALF_EXTENT, WORLD_HALF_EXTENT, -WORLD_HALF_EXTENT);
        assert!(bound.contains(corner * 0.999));
    }

    #[test]
    fn test_world_box_transaction_creates_item() {
        let scene = ItemScene::new();
        let id = scene.allocate_id();
        scene.enqueue_transaction(world_box_transaction(id));
        scene.process_transaction_queue();
        let item = scene.item(id).unwrap();
        assert_eq!(item.payload, ItemPayload::WorldBox);
        assert_eq!(item.tags, TAG_BITS_ALL);
    }
}
