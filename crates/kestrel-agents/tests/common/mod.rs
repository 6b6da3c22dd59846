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

//! Shared fixtures for the render agent integration tests.

#![allow(dead_code)]

use kestrel_agents::{RenderLoop, RenderLoopParts};
use kestrel_control::ThrottleConfig;
use kestrel_core::device::{DeviceContextId, DeviceFrameLifecycle};
use kestrel_core::frame::Frame;
use kestrel_core::job::{Job, JobError, RenderContext};
use kestrel_core::math::Extent2D;
use kestrel_core::sink::OutputSink;
use kestrel_core::sync::{task_queue, SnapshotExchange, TaskReceiver};
use kestrel_core::{FrameIndex, PipelineEvent, RenderArgsSnapshot};
use kestrel_data::ItemScene;
use kestrel_infra::display::NullDisplay;
use kestrel_infra::framebuffer::FramebufferCache;
use kestrel_infra::graphics::{DeviceProbe, HeadlessDevice};
use kestrel_lanes::render_lane::HudOverlayRenderer;
use kestrel_lanes::{build_render_graph, JobGraph, Platform, RenderSettings};
use kestrel_telemetry::TelemetryService;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

pub const DEVICE: DeviceContextId = DeviceContextId(7);
pub const SIZE: Extent2D = Extent2D {
    width: 320,
    height: 180,
};
pub const POOL_CAPACITY: usize = 2;

pub struct Harness<S: OutputSink + 'static> {
    pub render_loop: RenderLoop,
    pub sink: Arc<S>,
    pub scene: Arc<ItemScene>,
    pub exchange: Arc<SnapshotExchange<RenderArgsSnapshot>>,
    pub pool: Arc<FramebufferCache>,
    pub probe: Arc<DeviceProbe>,
    pub events: TaskReceiver<PipelineEvent>,
    pub telemetry: Arc<TelemetryService>,
}

pub fn default_graph() -> JobGraph {
    build_render_graph(&RenderSettings {
        platform: Platform::Desktop,
        ..Default::default()
    })
}

pub fn harness<S: OutputSink + 'static>(sink: S, graph: JobGraph) -> Harness<S> {
    let device = HeadlessDevice::new(DEVICE, SIZE).unwrap();
    let probe = device.probe();
    let sink = Arc::new(sink);
    let scene = Arc::new(ItemScene::new());
    let exchange = Arc::new(SnapshotExchange::new(RenderArgsSnapshot {
        device: Some(DEVICE),
        ..Default::default()
    }));
    let pool = Arc::new(FramebufferCache::new(SIZE, POOL_CAPACITY));
    let telemetry = Arc::new(TelemetryService::default());
    let (events_tx, events) = task_queue();

    let mut render_loop = RenderLoop::new(RenderLoopParts {
        lifecycle: DeviceFrameLifecycle::new(Box::new(device)),
        graph,
        scene: scene.clone(),
        sink: sink.clone(),
        overlay: Some(Box::new(HudOverlayRenderer::new())),
        exchange: exchange.clone(),
        framebuffers: pool.clone(),
        recycler: pool.clone(),
        throttle: ThrottleConfig::default(),
        telemetry: telemetry.clone(),
        events: events_tx,
    });
    render_loop.setup().unwrap();

    Harness {
        render_loop,
        sink,
        scene,
        exchange,
        pool,
        probe,
        events,
        telemetry,
    }
}

pub fn null_harness(throttled: bool) -> Harness<NullDisplay> {
    harness(NullDisplay::new(throttled), default_graph())
}

/// A sink that keeps every frame it receives.
#[derive(Default)]
pub struct RecordingSink {
    frames: Mutex<Vec<Frame>>,
}

impl RecordingSink {
    pub fn take_frames(&self) -> Vec<Frame> {
        std::mem::take(&mut *self.frames.lock().unwrap())
    }
}

impl OutputSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    fn begin_frame_render(&self, _index: FrameIndex) -> bool {
        true
    }

    fn submit_frame(&self, frame: Frame) {
        self.frames.lock().unwrap().push(frame);
    }

    fn is_throttled(&self) -> bool {
        false
    }
}

/// A job that takes `delay` and records when it starts and finishes.
#[derive(Clone, Default)]
pub struct SlowJob {
    pub delay: Duration,
    pub started: Arc<AtomicBool>,
    pub finished: Arc<AtomicUsize>,
    pub thread_name: Arc<Mutex<Option<String>>>,
}

impl SlowJob {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }
}

impl Job for SlowJob {
    fn name(&self) -> &str {
        "Slow"
    }

    fn execute(&mut self, _ctx: &mut RenderContext<'_>) -> Result<(), JobError> {
        *self.thread_name.lock().unwrap() = thread::current().name().map(str::to_owned);
        self.started.store(true, Ordering::SeqCst);
        thread::sleep(self.delay);
        self.finished.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Polls `condition` until it holds or `timeout` elapses.
pub fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}
