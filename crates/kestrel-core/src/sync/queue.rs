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

//! Single-producer, single-consumer task queue between two threads.
//!
//! Payloads move by value from the sender to the receiver. Neither end is
//! `Clone`, so each queue has exactly one producer and one consumer.

use std::time::Duration;

pub use flume::{RecvError, RecvTimeoutError, SendError, TryRecvError};

/// Creates a connected sender/receiver pair.
pub fn task_queue<T>() -> (TaskSender<T>, TaskReceiver<T>) {
    let (sender, receiver) = flume::unbounded();
    (TaskSender { sender }, TaskReceiver { receiver })
}

/// The producing end of a task queue.
#[derive(Debug)]
pub struct TaskSender<T> {
    sender: flume::Sender<T>,
}

impl<T> TaskSender<T> {
    /// Moves `task` into the queue. Fails only if the receiver is gone.
    pub fn send(&self, task: T) -> Result<(), SendError<T>> {
        self.sender.send(task)
    }

    /// Returns `true` if the receiver has been dropped.
    pub fn is_disconnected(&self) -> bool {
        self.sender.is_disconnected()
    }
}

/// The consuming end of a task queue.
#[derive(Debug)]
pub struct TaskReceiver<T> {
    receiver: flume::Receiver<T>,
}

impl<T> TaskReceiver<T> {
    /// Blocks until a task arrives or the sender is dropped.
    pub fn recv(&self) -> Result<T, RecvError> {
        self.receiver.recv()
    }

    /// Blocks for at most `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<T, RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Returns a task if one is ready.
    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Takes every task that is ready without blocking.
    pub fn drain(&self) -> Vec<T> {
        self.receiver.try_iter().collect()
    }

    /// Number of tasks waiting.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Returns `true` if no task is waiting.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}
