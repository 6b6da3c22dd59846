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

//! Slot-based in-memory scene.

use kestrel_core::scene::{Item, ItemId, Scene, Transaction, TransactionOp};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A [`Scene`] storing items in a slot vector indexed by [`ItemId`].
///
/// Ids are handed out by an atomic counter and never reused. Transactions are
/// queued by any thread and applied in submission order by
/// [`process_transaction_queue`](Scene::process_transaction_queue).
#[derive(Debug, Default)]
pub struct ItemScene {
    next_id: AtomicU32,
    queue: Mutex<Vec<Transaction>>,
    slots: Mutex<Vec<Option<Item>>>,
}

impl ItemScene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live items.
    pub fn item_count(&self) -> usize {
        lock(&self.slots).iter().filter(|s| s.is_some()).count()
    }

    /// Applies one operation. `allocated` is the number of ids handed out so
    /// far; resets beyond it are skipped.
    fn apply(slots: &mut Vec<Option<Item>>, allocated: u32, op: TransactionOp) {
        match op {
            TransactionOp::Reset(item) => {
                if !item.id.is_valid() {
                    log::warn!("Ignoring reset of an item with an invalid id");
                    return;
                }
                if item.id.index() >= allocated {
                    log::warn!("Ignoring reset of unallocated item {:?}", item.id);
                    return;
                }
                let index = item.id.index() as usize;
                if index >= slots.len() {
                    slots.resize_with(index + 1, || None);
                }
                slots[index] = Some(item);
            }
            TransactionOp::Remove(id) => match slot_mut(slots, id) {
                Some(slot) => *slot = None,
                None => log::debug!("Remove of unknown item {:?} skipped", id),
            },
            TransactionOp::UpdateBound(id, bound) => match slot_mut(slots, id).and_then(Option::as_mut) {
                Some(item) => item.bound = bound,
                None => log::debug!("Bound update of unknown item {:?} skipped", id),
            },
        }
    }
}

impl Scene for ItemScene {
    fn allocate_id(&self) -> ItemId {
        ItemId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn enqueue_transaction(&self, transaction: Transaction) {
        if transaction.is_empty() {
            return;
        }
        lock(&self.queue).push(transaction);
    }

    fn process_transaction_queue(&self) -> usize {
        let pending = std::mem::take(&mut *lock(&self.queue));
        if pending.is_empty() {
            return 0;
        }
        let count = pending.len();
        let allocated = self.next_id.load(Ordering::Relaxed);
        let mut slots = lock(&self.slots);
        for transaction in pending {
            for op in transaction.into_ops() {
                Self::apply(&mut slots, allocated, op);
            }
        }
        log::trace!("Applied {count} scene transactions");
        count
    }

    fn pending_transactions(&self) -> usize {
        lock(&self.queue).len()
    }

    fn item(&self, id: ItemId) -> Option<Item> {
        if !id.is_valid() {
            return None;
        }
        lock(&self.slots).get(id.index() as usize)?.clone()
    }

    fn visit_items(&self, visitor: &mut dyn FnMut(&Item)) {
        for item in lock(&self.slots).iter().flatten() {
            visitor(item);
        }
    }
}

fn slot_mut(slots: &mut [Option<Item>], id: ItemId) -> Option<&mut Option<Item>> {
    if !id.is_valid() {
        return None;
    }
    slots.get_mut(id.index() as usize)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_core::math::{BoundingSphere, Vec3};
    use kestrel_core::scene::{ItemPayload, TAG_BITS_0};

    fn mesh(triangles: u32) -> ItemPayload {
        ItemPayload::Mesh {
            name: "cube".into(),
            triangles,
        }
    }

    #[test]
    fn test_ids_are_unique_and_valid() {
        let scene = ItemScene::new();
        let a = scene.allocate_id();
        let b = scene.allocate_id();
        assert_ne!(a, b);
        assert!(a.is_valid() && b.is_valid());
    }

    #[test]
    fn test_transactions_apply_in_order() {
        let scene = ItemScene::new();
        let id = scene.allocate_id();

        let mut first = Transaction::new();
        first.reset_item(id, TAG_BITS_0, BoundingSphere::new(Vec3::ZERO, 1.0), mesh(12));
        let mut second = Transaction::new();
        second.update_bound(id, BoundingSphere::new(Vec3::X, 2.0));

        scene.enqueue_transaction(first);
        scene.enqueue_transaction(second);
        assert_eq!(scene.pending_transactions(), 2);
        assert!(scene.item(id).is_none());

        assert_eq!(scene.process_transaction_queue(), 2);
        assert_eq!(scene.pending_transactions(), 0);
        let item = scene.item(id).unwrap();
        assert_eq!(item.bound, BoundingSphere::new(Vec3::X, 2.0));
        assert_eq!(item.payload, mesh(12));
    }

    #[test]
    fn test_stale_ids_are_skipped() {
        let scene = ItemScene::new();
        let id = scene.allocate_id();
        let mut tx = Transaction::new();
        tx.reset_item(id, TAG_BITS_0, BoundingSphere::default(), mesh(1))
            .remove_item(id)
            .update_bound(id, BoundingSphere::default())
            .remove_item(ItemId::new(999))
            .remove_item(ItemId::INVALID)
            .reset_item(ItemId::new(u32::MAX - 1), TAG_BITS_0, BoundingSphere::default(), mesh(1))
            .reset_item(ItemId::new(id.index() + 1), TAG_BITS_0, BoundingSphere::default(), mesh(1));
        scene.enqueue_transaction(tx);

        assert_eq!(scene.process_transaction_queue(), 1);
        assert!(scene.item(id).is_none());
        assert!(scene.item(ItemId::INVALID).is_none());
        assert!(scene.item(ItemId::new(u32::MAX - 1)).is_none());
        assert_eq!(scene.item_count(), 0);
        assert_eq!(lock(&scene.slots).len(), 1);
    }

    #[test]
    fn test_empty_transactions_are_not_queued() {
        let scene = ItemScene::new();
        scene.enqueue_transaction(Transaction::new());
        assert_eq!(scene.pending_transactions(), 0);
        assert_eq!(scene.process_transaction_queue(), 0);
    }

    #[test]
    fn test_visit_items_in_id_order() {
        let scene = ItemScene::new();
        let mut tx = Transaction::new();
        let ids: Vec<_> = (0..3).map(|_| scene.allocate_id()).collect();
        for id in ids.iter().rev() {
            tx.reset_item(*id, TAG_BITS_0, BoundingSphere::default(), mesh(id.index()));
        }
        scene.enqueue_transaction(tx);
        scene.process_transaction_queue();

        let mut seen = Vec::new();
        scene.visit_items(&mut |item| seen.push(item.id));
        assert_eq!(seen, ids);
    }
}
