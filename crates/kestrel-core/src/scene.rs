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

//! The contract the frame pipeline uses to talk to the scene.
//!
//! The scene is shared between the simulation thread, which enqueues
//! transactions, and the render thread, which applies them and reads items.
//! Every method therefore takes `&self`.

use crate::math::BoundingSphere;

/// Tag bits an item carries; views render items whose tags intersect their mask.
pub type TagBits = u8;

/// The default tag set.
pub const TAG_BITS_0: TagBits = 1 << 0;
/// Second tag set, typically used for secondary-camera only content.
pub const TAG_BITS_1: TagBits = 1 << 1;
/// Every tag set.
pub const TAG_BITS_ALL: TagBits = TagBits::MAX;

/// An opaque identifier of a scene item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u32);

impl ItemId {
    /// The id that never names an item.
    pub const INVALID: ItemId = ItemId(u32::MAX);

    /// Wraps a raw slot index.
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// The raw slot index.
    pub fn index(self) -> u32 {
        self.0
    }

    /// Returns `false` for [`ItemId::INVALID`].
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::INVALID
    }
}

/// What an item renders as.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemPayload {
    /// The box outlining the world bounds.
    WorldBox,
    /// A mesh with the given triangle count.
    Mesh {
        /// Name of the mesh asset.
        name: String,
        /// Number of triangles drawn.
        triangles: u32,
    },
}

/// A renderable item.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    /// Identifier of the item.
    pub id: ItemId,
    /// Tag bits used by view masks.
    pub tags: TagBits,
    /// World-space bound.
    pub bound: BoundingSphere,
    /// What the item renders as.
    pub payload: ItemPayload,
}

/// One change to the scene.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionOp {
    /// Creates or replaces an item.
    Reset(Item),
    /// Removes an item.
    Remove(ItemId),
    /// Moves or resizes an item.
    UpdateBound(ItemId, BoundingSphere),
}

/// A batch of scene changes applied together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transaction {
    ops: Vec<TransactionOp>,
}

impl Transaction {
    /// Creates an empty transaction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates or replaces the item `id`.
    pub fn reset_item(
        &mut self,
        id: ItemId,
        tags: TagBits,
        bound: BoundingSphere,
        payload: ItemPayload,
    ) -> &mut Self {
        self.ops.push(TransactionOp::Reset(Item {
            id,
            tags,
            bound,
            payload,
        }));
        self
    }

    /// Removes the item `id`.
    pub fn remove_item(&mut self, id: ItemId) -> &mut Self {
        self.ops.push(TransactionOp::Remove(id));
        self
    }

    /// Replaces the bound of item `id`.
    pub fn update_bound(&mut self, id: ItemId, bound: BoundingSphere) -> &mut Self {
        self.ops.push(TransactionOp::UpdateBound(id, bound));
        self
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns `true` if the transaction holds no operations.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Consumes the transaction, yielding its operations in order.
    pub fn into_ops(self) -> Vec<TransactionOp> {
        self.ops
    }
}

/// The scene as seen by the frame pipeline.
pub trait Scene: Send + Sync {
    /// Reserves a fresh item id.
    fn allocate_id(&self) -> ItemId;

    /// Queues a transaction for the next [`process_transaction_queue`](Self::process_transaction_queue).
    fn enqueue_transaction(&self, transaction: Transaction);

    /// Applies every queued transaction in order and returns how many were applied.
    fn process_transaction_queue(&self) -> usize;

    /// Number of transactions waiting to be applied.
    fn pending_transactions(&self) -> usize;

    /// Returns a copy of item `id`, or `None` if it does not resolve.
    fn item(&self, id: ItemId) -> Option<Item>;

    /// Calls `visitor` for every live item.
    fn visit_items(&self, visitor: &mut dyn FnMut(&Item));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_item_id() {
        assert!(!ItemId::INVALID.is_valid());
        assert!(!ItemId::default().is_valid());
        assert!(ItemId::new(0).is_valid());
    }

    #[test]
    fn test_transaction_keeps_order() {
        let mut tx = Transaction::new();
        tx.reset_item(
            ItemId::new(1),
            TAG_BITS_0,
            BoundingSphere::default(),
            ItemPayload::WorldBox,
        )
        .remove_item(ItemId::new(1));
        assert_eq!(tx.len(), 2);
        let ops = tx.into_ops();
        assert!(matches!(ops[0], TransactionOp::Reset(_)));
        assert_eq!(ops[1], TransactionOp::Remove(ItemId::new(1)));
    }
}
