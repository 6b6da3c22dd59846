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

//! A display that presents frames on its own thread.

use anyhow::{Context, Result};
use crossbeam_channel::{Sender, TrySendError};
use kestrel_core::frame::{Frame, FrameIndex};
use kestrel_core::sink::OutputSink;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Configuration for a [`PresenterDisplay`].
#[derive(Debug, Clone)]
pub struct PresenterConfig {
    /// Name reported by the sink.
    pub name: String,
    /// Frames that may wait for presentation before new ones are dropped.
    pub queue_depth: usize,
    /// Simulated time one presentation takes.
    pub present_time: Duration,
    /// Whether the display wants frames rate-limited.
    pub throttled: bool,
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            name: "presenter".to_owned(),
            queue_depth: 2,
            present_time: Duration::from_millis(4),
            throttled: false,
        }
    }
}

/// Counters of a [`PresenterDisplay`].
#[derive(Debug, Default)]
pub struct PresenterStats {
    presented: AtomicU64,
    dropped: AtomicU64,
    last_presented: AtomicU64,
}

impl PresenterStats {
    /// Frames presented.
    pub fn presented(&self) -> u64 {
        self.presented.load(Ordering::Acquire)
    }

    /// Frames dropped because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Acquire)
    }

    /// Index of the last presented frame.
    pub fn last_presented(&self) -> Option<FrameIndex> {
        (self.presented() > 0).then(|| self.last_presented.load(Ordering::Acquire))
    }
}

enum PresenterMessage {
    Present(Frame),
    Flush(Sender<()>),
}

/// An [`OutputSink`] that hands frames to a presentation thread.
///
/// Submission never blocks the render thread: when `queue_depth` frames are
/// already waiting, the new frame is dropped and its framebuffer recycled.
pub struct PresenterDisplay {
    config: PresenterConfig,
    device_lost: AtomicBool,
    stats: Arc<PresenterStats>,
    sender: Option<Sender<PresenterMessage>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl PresenterDisplay {
    /// Starts the presentation thread.
    pub fn new(config: PresenterConfig) -> Result<Self> {
        let (sender, receiver) = crossbeam_channel::bounded(config.queue_depth.max(1));
        let stats = Arc::new(PresenterStats::default());
        let thread_stats = Arc::clone(&stats);
        let present_time = config.present_time;

        let handle = thread::Builder::new()
            .name(format!("{}-present", config.name))
            .spawn(move || {
                log::info!("Presenter thread started.");
                for message in receiver {
                    match message {
                        PresenterMessage::Present(frame) => {
                            if !present_time.is_zero() {
                                thread::sleep(present_time);
                            }
                            thread_stats
                                .last_presented
                                .store(frame.index(), Ordering::Release);
                            thread_stats.presented.fetch_add(1, Ordering::AcqRel);
                            frame.recycle();
                        }
                        PresenterMessage::Flush(ack) => {
                            let _ = ack.send(());
                        }
                    }
                }
                log::info!("Presenter thread stopped.");
            })
            .context("failed to spawn the presenter thread")?;

        Ok(Self {
            config,
            device_lost: AtomicBool::new(false),
            stats,
            sender: Some(sender),
            handle: Some(handle),
        })
    }

    /// The counters of this display.
    pub fn stats(&self) -> Arc<PresenterStats> {
        Arc::clone(&self.stats)
    }

    /// Simulates losing the output device: frame starts are rejected until
    /// [`reconfigure`](Self::reconfigure) is called.
    pub fn mark_device_lost(&self) {
        self.device_lost.store(true, Ordering::Release);
    }

    /// Restores the output after a loss.
    pub fn reconfigure(&self) {
        log::info!("Display '{}' reconfigured", self.config.name);
        self.device_lost.store(false, Ordering::Release);
    }

    /// Stops the presentation thread after it has drained its queue.
    pub fn stop(&mut self) {
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Presenter thread of '{}' panicked", self.config.name);
            }
        }
    }
}

impl OutputSink for PresenterDisplay {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn begin_frame_render(&self, index: FrameIndex) -> bool {
        if self.device_lost.load(Ordering::Acquire) {
            log::debug!("Display '{}' lost, rejecting frame {index}", self.config.name);
            return false;
        }
        true
    }

    fn submit_frame(&self, frame: Frame) {
        let Some(sender) = &self.sender else {
            return;
        };
        match sender.try_send(PresenterMessage::Present(frame)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                log::trace!("Presenter queue full, dropping frame");
                self.stats.dropped.fetch_add(1, Ordering::AcqRel);
            }
            Err(TrySendError::Disconnected(_)) => {
                log::warn!("Presenter thread of '{}' is gone", self.config.name);
            }
        }
    }

    fn is_throttled(&self) -> bool {
        self.config.throttled
    }

    fn flush(&self) {
        let Some(sender) = &self.sender else {
            return;
        };
        let (ack_tx, ack_rx) = crossbeam_channel::bounded(1);
        if sender.send(PresenterMessage::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }
}

impl Drop for PresenterDisplay {
    fn drop(&mut self) {
        self.stop();
    }
}
