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

//! Pooled final framebuffers.

use kestrel_core::device::FramebufferId;
use kestrel_core::frame::{Framebuffer, FramebufferAllocator, FramebufferPool, FramebufferRecycler};
use kestrel_core::math::Extent2D;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Allocation statistics of a [`FramebufferCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FramebufferCacheStats {
    /// Framebuffers currently checked out.
    pub outstanding: usize,
    /// Framebuffers waiting in the pool.
    pub retained: usize,
    /// Framebuffers created over the cache's lifetime.
    pub allocated: u64,
    /// Framebuffers discarded on recycle because the pool was full or the
    /// size no longer matched.
    pub dropped_on_recycle: u64,
    /// Handles passed to `recycle` that this cache never handed out.
    pub rejected_foreign: u64,
}

#[derive(Debug)]
struct CacheState {
    allocator: FramebufferAllocator,
    free: Vec<Framebuffer>,
    stats: FramebufferCacheStats,
    next_id: u64,
}

/// A bounded pool of framebuffers of one size.
///
/// `acquire` never fails: when the pool is empty a new framebuffer is
/// created. At most `capacity` framebuffers are retained on recycle.
#[derive(Debug)]
pub struct FramebufferCache {
    extent: Extent2D,
    capacity: usize,
    state: Mutex<CacheState>,
}

impl FramebufferCache {
    /// Creates a cache and pre-allocates `capacity` framebuffers of `extent`.
    pub fn new(extent: Extent2D, capacity: usize) -> Self {
        let mut state = CacheState {
            allocator: FramebufferAllocator::new(),
            free: Vec::with_capacity(capacity),
            stats: FramebufferCacheStats::default(),
            next_id: 0,
        };
        for _ in 0..capacity {
            let framebuffer = Self::allocate(&mut state, extent);
            state.free.push(framebuffer);
        }
        state.stats.retained = state.free.len();
        Self {
            extent,
            capacity,
            state: Mutex::new(state),
        }
    }

    /// Size of the framebuffers handed out.
    pub fn extent(&self) -> Extent2D {
        self.extent
    }

    /// Current statistics.
    pub fn stats(&self) -> FramebufferCacheStats {
        self.lock().stats
    }

    fn allocate(state: &mut CacheState, extent: Extent2D) -> Framebuffer {
        let id = FramebufferId(state.next_id);
        state.next_id += 1;
        state.stats.allocated += 1;
        state.allocator.mint(id, extent)
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FramebufferRecycler for FramebufferCache {
    fn recycle(&self, framebuffer: Framebuffer) {
        let mut state = self.lock();
        if !state.allocator.owns(&framebuffer) {
            log::warn!("Ignoring recycle of foreign framebuffer {:?}", framebuffer.id());
            state.stats.rejected_foreign += 1;
            return;
        }
        state.stats.outstanding = state.stats.outstanding.saturating_sub(1);
        if framebuffer.extent() != self.extent || state.free.len() >= self.capacity {
            state.stats.dropped_on_recycle += 1;
            return;
        }
        state.free.push(framebuffer);
        state.stats.retained = state.free.len();
    }
}

impl FramebufferPool for FramebufferCache {
    fn acquire(&self) -> Framebuffer {
        let mut state = self.lock();
        let framebuffer = match state.free.pop() {
            Some(framebuffer) => framebuffer,
            None => {
                log::debug!("Framebuffer pool exhausted, allocating a new framebuffer");
                Self::allocate(&mut state, self.extent)
            }
        };
        state.stats.retained = state.free.len();
        state.stats.outstanding += 1;
        framebuffer
    }

    fn outstanding(&self) -> usize {
        self.lock().stats.outstanding
    }
}
