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

//! The opaque output of one completed render cycle.

use crate::device::{CommandBatch, FramebufferId};
use crate::math::Extent2D;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonically increasing index of a render cycle.
pub type FrameIndex = u64;

/// A framebuffer checked out of a [`FramebufferPool`].
///
/// Not `Clone`: exactly one owner holds a framebuffer at a time, and handing
/// it back to its recycler consumes it.
/// Handles can only be created by a [`FramebufferAllocator`].
#[derive(Debug, PartialEq, Eq)]
pub struct Framebuffer {
    id: FramebufferId,
    extent: Extent2D,
    owner: u64,
}

impl Framebuffer {
    #[cfg(test)]
    pub(crate) fn new(id: FramebufferId, extent: Extent2D) -> Self {
        Self {
            id,
            extent,
            owner: 0,
        }
    }

    /// The handle of this framebuffer.
    pub fn id(&self) -> FramebufferId {
        self.id
    }

    /// The size of this framebuffer.
    pub fn extent(&self) -> Extent2D {
        self.extent
    }
}

static NEXT_ALLOCATOR: AtomicU64 = AtomicU64::new(1);

/// Mints [`Framebuffer`] handles for one pool.
///
/// Every allocator carries a process-unique key stamped into the handles it
/// mints, so a pool can tell its own framebuffers from anyone else's.
#[derive(Debug)]
pub struct FramebufferAllocator {
    key: u64,
}

impl FramebufferAllocator {
    /// Creates an allocator with a fresh key.
    pub fn new() -> Self {
        Self {
            key: NEXT_ALLOCATOR.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Creates the handle of a framebuffer owned by this allocator.
    pub fn mint(&self, id: FramebufferId, extent: Extent2D) -> Framebuffer {
        Framebuffer {
            id,
            extent,
            owner: self.key,
        }
    }

    /// Returns `true` if `framebuffer` was minted by this allocator.
    pub fn owns(&self, framebuffer: &Framebuffer) -> bool {
        framebuffer.owner == self.key
    }
}

impl Default for FramebufferAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Receives framebuffers once their frame has been consumed.
pub trait FramebufferRecycler: Send + Sync {
    /// Returns a framebuffer to its owner.
    fn recycle(&self, framebuffer: Framebuffer);
}

/// A pool that hands out framebuffers and takes them back.
pub trait FramebufferPool: FramebufferRecycler {
    /// Checks out a framebuffer, creating one if the pool is empty.
    fn acquire(&self) -> Framebuffer;

    /// Number of framebuffers currently checked out.
    fn outstanding(&self) -> usize;
}

/// The result of one render cycle.
///
/// Ownership of a `Frame` moves to the output sink. The framebuffer goes back
/// to its recycler exactly once: either through [`Frame::recycle`] or, if the
/// frame is dropped without being recycled, from `Drop`.
pub struct Frame {
    index: FrameIndex,
    framebuffer_id: FramebufferId,
    framebuffer: Option<Framebuffer>,
    batch: CommandBatch,
    stereo: bool,
    recycler: Arc<dyn FramebufferRecycler>,
}

impl Frame {
    /// Assembles a frame from the pieces produced by one cycle.
    pub fn new(
        index: FrameIndex,
        framebuffer: Framebuffer,
        batch: CommandBatch,
        stereo: bool,
        recycler: Arc<dyn FramebufferRecycler>,
    ) -> Self {
        Self {
            index,
            framebuffer_id: framebuffer.id(),
            framebuffer: Some(framebuffer),
            batch,
            stereo,
            recycler,
        }
    }

    /// The cycle index this frame was produced by.
    pub fn index(&self) -> FrameIndex {
        self.index
    }

    /// The framebuffer holding the finished image.
    pub fn framebuffer(&self) -> FramebufferId {
        self.framebuffer_id
    }

    /// The commands recorded for this frame.
    pub fn batch(&self) -> &CommandBatch {
        &self.batch
    }

    /// Whether the frame was rendered in stereo.
    pub fn is_stereo(&self) -> bool {
        self.stereo
    }

    /// Hands the framebuffer back to its pool, consuming the frame.
    pub fn recycle(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(framebuffer) = self.framebuffer.take() {
            log::trace!("Recycling framebuffer {:?} of frame {}", framebuffer.id(), self.index);
            self.recycler.recycle(framebuffer);
        }
    }
}

impl Drop for Frame {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("index", &self.index)
            .field("framebuffer", &self.framebuffer_id)
            .field("commands", &self.batch.commands.len())
            .field("stereo", &self.stereo)
            .finish()
    }
}
