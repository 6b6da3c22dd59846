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

//! The lock-protected handoff of render snapshots between threads.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// A single shared value that is edited in place and read by copy.
///
/// Both operations take the same exclusive section, so a reader never sees a
/// value halfway through an edit. The value is plain data: a panic inside an
/// editor cannot leave it in an invalid state, so lock poisoning is ignored.
#[derive(Debug, Default)]
pub struct SnapshotExchange<T: Clone> {
    value: Mutex<T>,
}

impl<T: Clone> SnapshotExchange<T> {
    /// Creates an exchange holding `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            value: Mutex::new(initial),
        }
    }

    /// Applies `editor` to the shared value under the lock.
    pub fn edit<R>(&self, editor: impl FnOnce(&mut T) -> R) -> R {
        editor(&mut self.lock())
    }

    /// Returns a copy of the shared value.
    pub fn read(&self) -> T {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, T> {
        self.value.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Mat4, Vec3};
    use crate::snapshot::RenderArgsSnapshot;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_edit_then_read() {
        let exchange = SnapshotExchange::new(RenderArgsSnapshot::default());
        let ts = exchange.edit(|s| {
            s.timestamp = 2.5;
            s.timestamp
        });
        assert_eq!(ts, 2.5);
        assert_eq!(exchange.read().timestamp, 2.5);
    }

    #[test]
    fn test_reader_never_sees_torn_snapshot() {
        let exchange = Arc::new(SnapshotExchange::new(RenderArgsSnapshot::default()));
        let done = Arc::new(AtomicBool::new(false));

        let writer = {
            let exchange = exchange.clone();
            let done = done.clone();
            thread::spawn(move || {
                for i in 1..=20_000u32 {
                    let v = i as f32;
                    exchange.edit(|s| {
                        // Every field is written from the same counter value.
                        s.timestamp = v as f64;
                        s.view = Mat4::from_translation(Vec3::new(v, v, v));
                        s.is_stereo = i % 2 == 0;
                        s.eye_offsets[1] = Mat4::from_scale(Vec3::new(v, v, v));
                    });
                }
                done.store(true, Ordering::SeqCst);
            })
        };

        let mut reads = 0u64;
        while !done.load(Ordering::SeqCst) || reads == 0 {
            let s = exchange.read();
            let v = s.timestamp as f32;
            if v > 0.0 {
                assert_eq!(s.view.translation(), Vec3::new(v, v, v));
                assert_eq!(s.is_stereo, (v as u32) % 2 == 0);
                assert_eq!(s.eye_offsets[1].cols[0].x, v);
            }
            reads += 1;
        }
        writer.join().unwrap();
        assert_eq!(exchange.read().timestamp, 20_000.0);
    }

    #[test]
    fn test_panicking_editor_does_not_block_readers() {
        let exchange = Arc::new(SnapshotExchange::new(1u32));
        let cloned = exchange.clone();
        let _ = thread::spawn(move || {
            cloned.edit(|_| panic!("editor failure"));
        })
        .join();
        assert_eq!(exchange.read(), 1);
    }
}
