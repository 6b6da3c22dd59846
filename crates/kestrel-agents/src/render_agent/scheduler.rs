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

//! The dedicated render thread.
//!
//! The scheduler owns a [`RenderLoop`] on its own thread and sleeps until it
//! is either triggered through [`RenderScheduler::request_frame`] or, when a
//! tick interval is configured, the interval elapses. It never spins.

use super::render_loop::RenderLoop;
use anyhow::{Context, Result};
use kestrel_core::sync::queue::RecvTimeoutError;
use kestrel_core::sync::{task_queue, FrameGate, TaskSender};
use kestrel_core::{PipelineError, PipelineEvent};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Name of the render thread.
pub const RENDER_THREAD_NAME: &str = "render-scheduler";

/// Configuration for the [`RenderScheduler`].
#[derive(Debug, Clone, Default)]
pub struct SchedulerConfig {
    /// When set, a cycle is also attempted every `tick_interval` without a
    /// trigger.
    pub tick_interval: Option<Duration>,
}

#[derive(Debug)]
enum SchedulerCommand {
    RenderFrame,
    Stop,
}

/// Handle to the render thread.
#[derive(Debug)]
pub struct RenderScheduler {
    commands: TaskSender<SchedulerCommand>,
    pending: Arc<FrameGate>,
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<RenderLoop>>,
}

impl RenderScheduler {
    /// Moves `render_loop` onto a new render thread.
    pub fn spawn(render_loop: RenderLoop, config: SchedulerConfig) -> Result<Self> {
        let (commands, receiver) = task_queue();
        let pending = Arc::new(FrameGate::new());
        let running = Arc::new(AtomicBool::new(true));

        let thread_pending = Arc::clone(&pending);
        let thread_running = Arc::clone(&running);
        let handle = thread::Builder::new()
            .name(RENDER_THREAD_NAME.to_owned())
            .spawn(move || {
                let mut render_loop = render_loop;
                log::info!("Render scheduler thread started.");

                loop {
                    let triggered = match config.tick_interval {
                        Some(tick) => match receiver.recv_timeout(tick) {
                            Ok(command) => Some(command),
                            Err(RecvTimeoutError::Timeout) => None,
                            Err(RecvTimeoutError::Disconnected) => break,
                        },
                        None => match receiver.recv() {
                            Ok(command) => Some(command),
                            Err(_) => break,
                        },
                    };

                    let result = match triggered {
                        Some(SchedulerCommand::Stop) => break,
                        Some(SchedulerCommand::RenderFrame) => {
                            let result = render_loop.run_cycle(Instant::now());
                            thread_pending.release();
                            result
                        }
                        None => render_loop.run_cycle(Instant::now()),
                    };

                    match result {
                        Ok(outcome) => log::trace!("Cycle outcome: {outcome:?}"),
                        Err(e) => {
                            log::error!("Render scheduler stopping on fatal error: {e}");
                            render_loop.notify(PipelineEvent::Fatal(e));
                            break;
                        }
                    }
                    render_loop.telemetry().tick(Instant::now());
                }

                thread_running.store(false, Ordering::SeqCst);
                log::info!(
                    "Render scheduler thread stopped after {} frames.",
                    render_loop.frames_rendered()
                );
                render_loop
            })
            .context("failed to spawn the render scheduler thread")?;

        Ok(Self {
            commands,
            pending,
            running,
            handle: Some(handle),
        })
    }

    /// Asks the render thread for a cycle.
    ///
    /// Returns `false` if a triggered cycle is already pending or running, in
    /// which case the request is coalesced into it, or if the scheduler has
    /// stopped.
    pub fn request_frame(&self) -> bool {
        if !self.is_running() {
            return false;
        }
        if !self.pending.try_acquire() {
            log::trace!("Frame request coalesced with the pending one");
            return false;
        }
        if self.commands.send(SchedulerCommand::RenderFrame).is_err() {
            self.pending.release();
            return false;
        }
        true
    }

    /// Returns `true` while the render thread accepts requests.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Returns `true` while a triggered cycle is queued or running.
    pub fn is_frame_pending(&self) -> bool {
        self.pending.is_acquired()
    }

    /// Stops the render thread and hands the loop back.
    ///
    /// Any cycle already running completes first. Requests made after this
    /// call are refused.
    ///
    /// # Errors
    ///
    /// [`PipelineError::SchedulerPanicked`] if the render thread panicked.
    pub fn stop(mut self) -> Result<RenderLoop, PipelineError> {
        self.shutdown_thread()
            .ok_or(PipelineError::InvalidState("render scheduler already stopped"))?
    }

    fn shutdown_thread(&mut self) -> Option<Result<RenderLoop, PipelineError>> {
        let handle = self.handle.take()?;
        self.running.store(false, Ordering::SeqCst);
        // Fails only if the thread already exited on its own.
        let _ = self.commands.send(SchedulerCommand::Stop);
        Some(handle.join().map_err(|_| {
            log::error!("Render scheduler thread panicked");
            PipelineError::SchedulerPanicked
        }))
    }
}

impl Drop for RenderScheduler {
    fn drop(&mut self) {
        if let Some(Err(e)) = self.shutdown_thread() {
            log::warn!("Render scheduler dropped after failure: {e}");
        }
    }
}
