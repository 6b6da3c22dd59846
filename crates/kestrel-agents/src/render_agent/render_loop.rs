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

//! The synchronous per-cycle render algorithm.

use kestrel_control::{ThrottleConfig, ThrottleController, ThrottleDecision};
use kestrel_core::device::DeviceFrameLifecycle;
use kestrel_core::frame::{FrameIndex, FramebufferPool, FramebufferRecycler};
use kestrel_core::job::RenderContext;
use kestrel_core::math::Viewport;
use kestrel_core::overlay::OverlayRenderer;
use kestrel_core::scene::{ItemId, Scene};
use kestrel_core::sink::OutputSink;
use kestrel_core::snapshot::RenderArgsSnapshot;
use kestrel_core::sync::{FrameGate, SnapshotExchange, TaskSender};
use kestrel_core::{PipelineError, PipelineEvent};
use kestrel_data::world_box::world_box_transaction;
use kestrel_lanes::JobGraph;
use kestrel_telemetry::TelemetryService;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Why a cycle did no device work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The sink is throttled and its minimum period has not elapsed.
    Throttled,
    /// Another cycle holds the in-flight gate.
    FrameInFlight,
    /// The sink refused to start the frame; a reconfiguration was requested.
    SinkRejected,
    /// The snapshot does not target this loop's device.
    NoDeviceContext,
}

/// Result of [`RenderLoop::run_cycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A frame was produced and handed to the sink.
    Rendered {
        /// Index of the submitted frame.
        index: FrameIndex,
    },
    /// The cycle was skipped.
    Skipped(SkipReason),
}

impl CycleOutcome {
    /// Returns `true` if a frame was submitted.
    pub fn is_rendered(&self) -> bool {
        matches!(self, CycleOutcome::Rendered { .. })
    }
}

/// Everything a [`RenderLoop`] needs, handed over at construction.
pub struct RenderLoopParts {
    /// The device, already initialised.
    pub lifecycle: DeviceFrameLifecycle,
    /// The job graph run each cycle.
    pub graph: JobGraph,
    /// The scene jobs render.
    pub scene: Arc<dyn Scene>,
    /// Receiver of finished frames.
    pub sink: Arc<dyn OutputSink>,
    /// Optional HUD overlay pre-pass.
    pub overlay: Option<Box<dyn OverlayRenderer>>,
    /// Snapshot written by the producer thread.
    pub exchange: Arc<SnapshotExchange<RenderArgsSnapshot>>,
    /// Source of final framebuffers.
    pub framebuffers: Arc<dyn FramebufferPool>,
    /// Where finished frames return their framebuffer. Normally the same
    /// object as `framebuffers`.
    pub recycler: Arc<dyn FramebufferRecycler>,
    /// Throttle policy.
    pub throttle: ThrottleConfig,
    /// Statistics sink.
    pub telemetry: Arc<TelemetryService>,
    /// Channel to the owning application.
    pub events: TaskSender<PipelineEvent>,
}

/// Runs render cycles on the thread that owns it.
///
/// The loop owns the device. Everything else it touches is either shared
/// read-only (`scene`, `sink`) or crosses threads by copy (`exchange`).
pub struct RenderLoop {
    lifecycle: DeviceFrameLifecycle,
    graph: JobGraph,
    scene: Arc<dyn Scene>,
    sink: Arc<dyn OutputSink>,
    overlay: Option<Box<dyn OverlayRenderer>>,
    exchange: Arc<SnapshotExchange<RenderArgsSnapshot>>,
    framebuffers: Arc<dyn FramebufferPool>,
    recycler: Arc<dyn FramebufferRecycler>,
    throttle: ThrottleController,
    telemetry: Arc<TelemetryService>,
    events: TaskSender<PipelineEvent>,
    in_flight: Arc<FrameGate>,
    frame_count: FrameIndex,
    frames_rendered: u64,
    world_box: ItemId,
}

impl RenderLoop {
    /// Assembles a loop. No device work happens until [`setup`](Self::setup).
    pub fn new(parts: RenderLoopParts) -> Self {
        Self {
            lifecycle: parts.lifecycle,
            graph: parts.graph,
            scene: parts.scene,
            sink: parts.sink,
            overlay: parts.overlay,
            exchange: parts.exchange,
            framebuffers: parts.framebuffers,
            recycler: parts.recycler,
            throttle: ThrottleController::new(&parts.throttle),
            telemetry: parts.telemetry,
            events: parts.events,
            in_flight: Arc::new(FrameGate::new()),
            frame_count: 0,
            frames_rendered: 0,
            world_box: ItemId::INVALID,
        }
    }

    /// Runs the one-time setup of every job against the device.
    pub fn setup(&mut self) -> Result<(), PipelineError> {
        self.graph.setup(self.lifecycle.device())?;
        log::info!(
            "Render loop ready on device {:?} with jobs {:?}",
            self.lifecycle.device_id(),
            self.graph.job_names()
        );
        Ok(())
    }

    /// Attempts one render cycle at `now`.
    ///
    /// Recoverable conditions come back as [`CycleOutcome::Skipped`]; only
    /// device state violations are errors.
    pub fn run_cycle(&mut self, now: Instant) -> Result<CycleOutcome, PipelineError> {
        if let ThrottleDecision::Skip { remaining } =
            self.throttle.evaluate(now, self.sink.is_throttled())
        {
            log::trace!("Cycle throttled, {remaining:?} left in period");
            return Ok(CycleOutcome::Skipped(SkipReason::Throttled));
        }

        let gate = Arc::clone(&self.in_flight);
        let Some(_pass) = gate.try_enter() else {
            log::debug!("Cycle skipped, a frame is already in flight");
            return Ok(CycleOutcome::Skipped(SkipReason::FrameInFlight));
        };
        self.throttle.record_run(now);
        self.telemetry.record_run(now);
        self.frame_count += 1;
        let index = self.frame_count;
        let cycle_start = Instant::now();

        if !self.sink.begin_frame_render(index) {
            log::warn!(
                "Sink '{}' rejected frame {index}, requesting output reconfiguration",
                self.sink.name()
            );
            self.notify(PipelineEvent::ReconfigureOutput { frame_index: index });
            return Ok(CycleOutcome::Skipped(SkipReason::SinkRejected));
        }

        let args = self.exchange.read();
        if !args.targets(self.lifecycle.device_id()) {
            log::trace!("Snapshot has no device context for frame {index}");
            return Ok(CycleOutcome::Skipped(SkipReason::NoDeviceContext));
        }

        self.lifecycle.begin_frame(&args.view, &args.head_pose)?;
        let viewport = Viewport::from_extent(self.lifecycle.device_size());

        let overlay_texture = match self.overlay.as_mut() {
            Some(overlay) => {
                let mut recorder = self.lifecycle.recorder()?;
                let texture = overlay.render_overlay(viewport, &mut recorder);
                overlay.set_frame_info(index, &args.eye_to_world, &args.sensor_to_world);
                texture
            }
            None => None,
        };

        if let Some(stereo) = args.stereo_state() {
            self.lifecycle
                .enable_stereo(stereo.eye_projections, stereo.eye_views)?;
        }

        if !self.world_box.is_valid() {
            self.world_box = self.scene.allocate_id();
            self.scene
                .enqueue_transaction(world_box_transaction(self.world_box));
            log::debug!("World box allocated as {:?}", self.world_box);
        }

        let framebuffer = self.framebuffers.acquire();
        let details = {
            let recorder = match self.lifecycle.recorder() {
                Ok(recorder) => recorder,
                Err(e) => {
                    self.recycler.recycle(framebuffer);
                    return Err(e);
                }
            };
            let mut ctx =
                RenderContext::new(args, index, self.scene.as_ref(), recorder, viewport);
            ctx.hud_operator = self.sink.hud_operator();
            ctx.overlay_texture = overlay_texture;
            ctx.blit_target = Some(framebuffer.id());
            self.graph.run(&mut ctx);
            ctx.details
        };

        let frame = self
            .lifecycle
            .end_frame(index, framebuffer, Arc::clone(&self.recycler))?;
        self.sink.submit_frame(frame);
        self.frames_rendered += 1;

        self.telemetry
            .record_cycle(index, cycle_start.elapsed(), details, now);
        Ok(CycleOutcome::Rendered { index })
    }

    /// Sends `event` to the owning application.
    pub fn notify(&self, event: PipelineEvent) {
        if self.events.send(event).is_err() {
            log::debug!("Pipeline event dropped, nobody is listening");
        }
    }

    /// Shuts the device down. The loop must not be running a cycle.
    pub fn shutdown(&mut self) -> Result<(), PipelineError> {
        self.lifecycle.shutdown()
    }

    /// Index of the last cycle that passed the in-flight gate.
    pub fn frame_count(&self) -> FrameIndex {
        self.frame_count
    }

    /// Frames submitted to the sink.
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// The gate held for the duration of each cycle.
    pub fn in_flight(&self) -> Arc<FrameGate> {
        Arc::clone(&self.in_flight)
    }

    /// The world box item, once the first rendered cycle allocated it.
    pub fn world_box(&self) -> ItemId {
        self.world_box
    }

    /// The device lifecycle.
    pub fn lifecycle(&self) -> &DeviceFrameLifecycle {
        &self.lifecycle
    }

    /// The shared telemetry service.
    pub fn telemetry(&self) -> &Arc<TelemetryService> {
        &self.telemetry
    }
}

impl fmt::Debug for RenderLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderLoop")
            .field("device", &self.lifecycle.device_id())
            .field("graph", &self.graph)
            .field("sink", &self.sink.name())
            .field("frame_count", &self.frame_count)
            .field("frames_rendered", &self.frames_rendered)
            .finish()
    }
}
