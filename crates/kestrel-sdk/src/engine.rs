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

//! The graphics engine facade.

use crate::config::{ConfigError, EngineConfig};
use anyhow::Context;
use kestrel_agents::{RenderLoop, RenderLoopParts, RenderScheduler};
use kestrel_control::ThrottleController;
use kestrel_core::device::{DeviceContext, DeviceContextId, DeviceError, DeviceFrameLifecycle};
use kestrel_core::frame::FramebufferPool;
use kestrel_core::math::Extent2D;
use kestrel_core::overlay::OverlayRenderer;
use kestrel_core::scene::Scene;
use kestrel_core::sink::OutputSink;
use kestrel_core::sync::{task_queue, SnapshotExchange, TaskReceiver, TaskSender};
use kestrel_core::{PipelineError, PipelineEvent, RenderArgsSnapshot};
use kestrel_data::ItemScene;
use kestrel_infra::framebuffer::FramebufferCache;
use kestrel_lanes::{build_render_graph, JobGraph};
use kestrel_telemetry::TelemetryService;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Where the engine is in its startup sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Constructed; no device yet.
    Created,
    /// The device is initialised.
    GpuReady,
    /// The render graph is built and set up.
    RenderReady,
    /// The render thread is running.
    Running,
    /// Shut down; the engine cannot be restarted.
    ShutDown,
}

/// What [`GraphicsEngine::shutdown`] observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ShutdownReport {
    /// Frames submitted to the sink over the engine's lifetime.
    pub frames_rendered: u64,
    /// Scene transactions applied by the shutdown flush.
    pub transactions_flushed: usize,
    /// Framebuffers still checked out after the sink was flushed.
    pub leaked_framebuffers: usize,
}

/// Owns the frame pipeline and exposes it to the simulation thread.
///
/// The startup sequence is [`initialize_gpu`](Self::initialize_gpu), then
/// [`initialize_render`](Self::initialize_render), then
/// [`startup`](Self::startup). From then on the simulation thread edits the
/// render arguments and requests frames; the device is only ever touched by
/// the render thread.
pub struct GraphicsEngine {
    config: EngineConfig,
    state: EngineState,
    sink: Arc<dyn OutputSink>,
    overlay: Option<Box<dyn OverlayRenderer>>,
    scene: Arc<ItemScene>,
    exchange: Arc<SnapshotExchange<RenderArgsSnapshot>>,
    framebuffers: Arc<FramebufferCache>,
    telemetry: Arc<TelemetryService>,
    events: TaskReceiver<PipelineEvent>,
    event_sender: Option<TaskSender<PipelineEvent>>,
    lifecycle: Option<DeviceFrameLifecycle>,
    graph: Option<JobGraph>,
    scheduler: Option<RenderScheduler>,
}

impl GraphicsEngine {
    /// Creates an engine presenting to `sink`.
    pub fn new(
        config: EngineConfig,
        sink: Arc<dyn OutputSink>,
        overlay: Option<Box<dyn OverlayRenderer>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let framebuffers = Arc::new(FramebufferCache::new(
            config.framebuffer.extent(),
            config.framebuffer.pool_capacity,
        ));
        let telemetry = Arc::new(TelemetryService::new(&config.telemetry));
        let (event_sender, events) = task_queue();
        log::info!("Graphics engine created for sink '{}'", sink.name());
        Ok(Self {
            config,
            state: EngineState::Created,
            sink,
            overlay,
            scene: Arc::new(ItemScene::new()),
            exchange: Arc::new(SnapshotExchange::new(RenderArgsSnapshot::default())),
            framebuffers,
            telemetry,
            events,
            event_sender: Some(event_sender),
            lifecycle: None,
            graph: None,
            scheduler: None,
        })
    }

    /// Creates the device through `factory`, which receives the configured
    /// framebuffer size, and attaches it to the render arguments.
    ///
    /// # Errors
    ///
    /// [`PipelineError::DeviceInitialization`] if the factory fails.
    pub fn initialize_gpu<F>(&mut self, factory: F) -> Result<DeviceContextId, PipelineError>
    where
        F: FnOnce(Extent2D) -> Result<Box<dyn DeviceContext>, DeviceError>,
    {
        self.expect_state(EngineState::Created, "initialize_gpu called twice")?;
        let device = factory(self.config.framebuffer.extent()).map_err(|e| {
            log::error!("Graphics device initialization failed: {e}");
            PipelineError::DeviceInitialization(e.to_string())
        })?;
        let id = device.id();
        self.lifecycle = Some(DeviceFrameLifecycle::new(device));
        self.exchange.edit(|args| args.device = Some(id));
        self.state = EngineState::GpuReady;
        log::info!("Graphics device {id:?} initialized");
        Ok(id)
    }

    /// Builds the render graph from the configuration and sets it up.
    pub fn initialize_render(&mut self) -> Result<(), PipelineError> {
        let graph = build_render_graph(&self.config.render);
        self.initialize_render_with(graph)
    }

    /// Sets up a caller-assembled render graph.
    ///
    /// # Errors
    ///
    /// [`PipelineError::JobSetupFailed`] naming the job that failed.
    pub fn initialize_render_with(&mut self, mut graph: JobGraph) -> Result<(), PipelineError> {
        self.expect_state(EngineState::GpuReady, "initialize_render requires a device")?;
        let lifecycle = self
            .lifecycle
            .as_ref()
            .ok_or(PipelineError::InvalidState("device missing"))?;
        graph.setup(lifecycle.device())?;
        self.graph = Some(graph);
        self.state = EngineState::RenderReady;
        Ok(())
    }

    /// Starts the render thread.
    pub fn startup(&mut self) -> anyhow::Result<()> {
        self.expect_state(EngineState::RenderReady, "startup requires initialize_render")?;
        let (Some(lifecycle), Some(graph), Some(events)) = (
            self.lifecycle.take(),
            self.graph.take(),
            self.event_sender.take(),
        ) else {
            return Err(PipelineError::InvalidState("engine parts missing").into());
        };

        let render_loop = RenderLoop::new(RenderLoopParts {
            lifecycle,
            graph,
            scene: self.scene.clone(),
            sink: Arc::clone(&self.sink),
            overlay: self.overlay.take(),
            exchange: Arc::clone(&self.exchange),
            framebuffers: self.framebuffers.clone(),
            recycler: self.framebuffers.clone(),
            throttle: self.config.throttle.clone(),
            telemetry: Arc::clone(&self.telemetry),
            events,
        });
        let scheduler =
            RenderScheduler::spawn(render_loop, self.config.scheduler.to_scheduler_config())
                .context("failed to start the render thread")?;
        self.scheduler = Some(scheduler);
        self.state = EngineState::Running;
        log::info!("Graphics engine started");
        Ok(())
    }

    /// Edits the render arguments under the exchange lock.
    ///
    /// Always applies, whether or not the render thread is skipping cycles.
    pub fn edit_render_args<R>(&self, editor: impl FnOnce(&mut RenderArgsSnapshot) -> R) -> R {
        self.exchange.edit(editor)
    }

    /// A copy of the current render arguments.
    pub fn render_args(&self) -> RenderArgsSnapshot {
        self.exchange.read()
    }

    /// Asks the render thread for a frame. Returns `false` if the request was
    /// coalesced into a pending one or the engine is not running.
    pub fn request_frame(&self) -> bool {
        self.scheduler
            .as_ref()
            .is_some_and(RenderScheduler::request_frame)
    }

    /// Whether a frame requested now would be rendered.
    ///
    /// Always `true` for an unthrottled sink; for a throttled one, `true`
    /// once the minimum period has elapsed since the last cycle that passed
    /// the in-flight gate, rendered or not.
    pub fn should_paint(&self) -> bool {
        self.should_paint_at(Instant::now())
    }

    /// [`should_paint`](Self::should_paint) evaluated at `now`.
    pub fn should_paint_at(&self, now: Instant) -> bool {
        let mut throttle = ThrottleController::new(&self.config.throttle);
        if let Some(last) = self.telemetry.last_run_at() {
            throttle.record_run(last);
        }
        throttle.evaluate(now, self.sink.is_throttled()).should_run()
    }

    /// Takes every event the render thread sent since the last call.
    pub fn poll_events(&self) -> Vec<PipelineEvent> {
        self.events.drain()
    }

    /// Shuts the pipeline down.
    ///
    /// Pending scene transactions are applied first, then the render thread
    /// is stopped after its current cycle, then the device is shut down, and
    /// finally the sink is flushed.
    ///
    /// # Errors
    ///
    /// [`PipelineError::InvalidState`] if the engine is already shut down;
    /// [`PipelineError::SchedulerPanicked`] if the render thread panicked.
    pub fn shutdown(&mut self) -> Result<ShutdownReport, PipelineError> {
        if self.state == EngineState::ShutDown {
            return Err(PipelineError::InvalidState("engine already shut down"));
        }
        log::info!("Graphics engine shutting down");
        let mut report = ShutdownReport {
            transactions_flushed: self.scene.process_transaction_queue(),
            ..Default::default()
        };
        self.state = EngineState::ShutDown;

        let mut lifecycle = self.lifecycle.take();
        if let Some(scheduler) = self.scheduler.take() {
            let mut render_loop = scheduler.stop()?;
            report.frames_rendered = render_loop.frames_rendered();
            render_loop.shutdown()?;
        }
        if let Some(lifecycle) = lifecycle.as_mut() {
            lifecycle.shutdown()?;
        }
        report.transactions_flushed += self.scene.process_transaction_queue();

        self.sink.flush();
        report.leaked_framebuffers = self.framebuffers.outstanding();
        if report.leaked_framebuffers > 0 {
            log::warn!(
                "{} framebuffers still checked out after shutdown",
                report.leaked_framebuffers
            );
        }
        log::info!("Graphics engine shut down: {report:?}");
        Ok(report)
    }

    /// The current startup state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Returns `true` while the render thread runs.
    pub fn is_running(&self) -> bool {
        self.scheduler
            .as_ref()
            .is_some_and(RenderScheduler::is_running)
    }

    /// The scene rendered by the pipeline.
    pub fn scene(&self) -> &Arc<ItemScene> {
        &self.scene
    }

    /// Render statistics.
    pub fn telemetry(&self) -> &Arc<TelemetryService> {
        &self.telemetry
    }

    /// The final framebuffer pool.
    pub fn framebuffers(&self) -> &Arc<FramebufferCache> {
        &self.framebuffers
    }

    /// The configuration the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn expect_state(&self, expected: EngineState, msg: &'static str) -> Result<(), PipelineError> {
        if self.state == expected {
            Ok(())
        } else {
            log::error!("{msg} (engine is {:?})", self.state);
            Err(PipelineError::InvalidState(msg))
        }
    }
}

impl Drop for GraphicsEngine {
    fn drop(&mut self) {
        if self.state != EngineState::ShutDown {
            if let Err(e) = self.shutdown() {
                log::warn!("Graphics engine dropped without a clean shutdown: {e}");
            }
        }
    }
}

impl std::fmt::Debug for GraphicsEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphicsEngine")
            .field("state", &self.state)
            .field("sink", &self.sink.name())
            .field("config", &self.config)
            .finish()
    }
}
