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

//! A lock-free single-outstanding-operation guard.

use std::sync::atomic::{AtomicBool, Ordering};

/// An atomic flag that at most one caller can hold at a time.
///
/// `try_acquire` performs a compare-and-swap from `false` to `true`; between
/// a successful acquire and the matching [`release`](FrameGate::release),
/// every other `try_acquire` fails. Contention never blocks and never queues:
/// a losing caller simply gets `false` back.
#[derive(Debug, Default)]
pub struct FrameGate {
    acquired: AtomicBool,
}

impl FrameGate {
    /// Creates an open gate.
    pub const fn new() -> Self {
        Self {
            acquired: AtomicBool::new(false),
        }
    }

    /// Tries to take the gate. Returns `true` if this call took it.
    pub fn try_acquire(&self) -> bool {
        self.acquired
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Opens the gate again.
    pub fn release(&self) {
        self.acquired.store(false, Ordering::Release);
    }

    /// Returns `true` while the gate is held.
    pub fn is_acquired(&self) -> bool {
        self.acquired.load(Ordering::Acquire)
    }

    /// Tries to take the gate, returning a guard that releases it on drop.
    pub fn try_enter(&self) -> Option<GatePass<'_>> {
        self.try_acquire().then(|| GatePass { gate: self })
    }
}

/// Holds a [`FrameGate`] until dropped.
#[derive(Debug)]
#[must_use = "the gate is released as soon as the pass is dropped"]
pub struct GatePass<'a> {
    gate: &'a FrameGate,
}

impl Drop for GatePass<'_> {
    fn drop(&mut self) {
        self.gate.release();
    }
}
