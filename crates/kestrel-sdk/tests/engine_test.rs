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

//! End-to-end tests of the engine facade against the headless backend.

use kestrel_core::job::{Job, JobError, RenderContext};
use kestrel_core::math::BoundingSphere;
use kestrel_core::scene::{ItemPayload, Scene, Transaction, TAG_BITS_0};
use kestrel_infra::graphics::DeviceProbe;
use kestrel_lanes::JobGraph;
use kestrel_sdk::prelude::*;
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

const DEVICE: DeviceContextId = DeviceContextId(11);
const TIMEOUT: Duration = Duration::from_secs(5);

fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + TIMEOUT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}

fn small_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.framebuffer.width = 64;
    config.framebuffer.height = 64;
    config.framebuffer.pool_capacity = 2;
    config
}

/// Creates an engine with a headless device; returns the device probe.
fn engine_with(sink: Arc<NullDisplay>, config: EngineConfig) -> (GraphicsEngine, Arc<DeviceProbe>) {
    let mut engine = GraphicsEngine::new(
        config,
        sink,
        Some(Box::new(HudOverlayRenderer::new())),
    )
    .unwrap();
    let mut probe = None;
    engine
        .initialize_gpu(|size| {
            let device = HeadlessDevice::new(DEVICE, size)?;
            probe = Some(device.probe());
            Ok(Box::new(device) as Box<dyn DeviceContext>)
        })
        .unwrap();
    (engine, probe.unwrap())
}

struct SlowJob {
    started: Arc<AtomicBool>,
    finished: Arc<AtomicUsize>,
}

impl Job for SlowJob {
    fn name(&self) -> &str {
        "Slow"
    }

    fn execute(&mut self, _ctx: &mut RenderContext<'_>) -> Result<(), JobError> {
        self.started.store(true, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(150));
        self.finished.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FailingSetup;

impl Job for FailingSetup {
    fn name(&self) -> &str {
        "FailingSetup"
    }

    fn setup(&mut self, _device: &dyn DeviceContext) -> Result<(), JobError> {
        Err(JobError::SetupFailed("no shader".into()))
    }

    fn execute(&mut self, _ctx: &mut RenderContext<'_>) -> Result<(), JobError> {
        Ok(())
    }
}

#[test]
fn test_full_lifecycle_renders_and_shuts_down_cleanly() {
    let sink = Arc::new(NullDisplay::new(false));
    let (mut engine, probe) = engine_with(sink.clone(), small_config());
    assert_eq!(engine.render_args().device, Some(DEVICE));
    engine.initialize_render().unwrap();
    engine.startup().unwrap();
    assert_eq!(engine.state(), EngineState::Running);

    for i in 0..3u64 {
        engine.edit_render_args(|args| args.timestamp = i as f64 * 0.016);
        assert!(wait_until(|| engine.request_frame()));
        assert!(wait_until(|| sink.frames_submitted() == i + 1));
    }

    let report = engine.shutdown().unwrap();
    assert_eq!(report.frames_rendered, 3);
    assert_eq!(report.leaked_framebuffers, 0);
    assert!(probe.is_shut_down());
    assert!(!engine.is_running());
    assert!(matches!(
        engine.shutdown(),
        Err(PipelineError::InvalidState(_))
    ));
}

#[test]
fn test_shutdown_during_cycle_waits_and_leaks_nothing() {
    let sink = Arc::new(NullDisplay::new(false));
    let (mut engine, probe) = engine_with(sink.clone(), small_config());
    let started = Arc::new(AtomicBool::new(false));
    let finished = Arc::new(AtomicUsize::new(0));
    engine
        .initialize_render_with(
            JobGraph::builder()
                .add_job(SlowJob {
                    started: started.clone(),
                    finished: finished.clone(),
                })
                .build(),
        )
        .unwrap();
    engine.startup().unwrap();

    assert!(engine.request_frame());
    assert!(wait_until(|| started.load(Ordering::SeqCst)));

    let report = engine.shutdown().unwrap();
    assert_eq!(finished.load(Ordering::SeqCst), 1);
    assert_eq!(report.frames_rendered, 1);
    assert_eq!(report.leaked_framebuffers, 0);
    assert_eq!(probe.frames_begun(), probe.frames_ended());
    assert!(probe.is_shut_down());
}

#[test]
fn test_shutdown_flushes_pending_transactions() {
    let sink = Arc::new(NullDisplay::new(false));
    let (mut engine, _probe) = engine_with(sink, small_config());
    engine.initialize_render().unwrap();
    engine.startup().unwrap();

    let scene = engine.scene().clone();
    let id = scene.allocate_id();
    let mut transaction = Transaction::new();
    transaction.reset_item(
        id,
        TAG_BITS_0,
        BoundingSphere::new(Vec3::new(0.0, 0.0, -4.0), 1.0),
        ItemPayload::Mesh {
            name: "crate".into(),
            triangles: 12,
        },
    );
    scene.enqueue_transaction(transaction);

    let report = engine.shutdown().unwrap();
    assert_eq!(report.transactions_flushed, 1);
    assert_eq!(scene.pending_transactions(), 0);
    assert!(scene.item(id).is_some());
}

#[test]
fn test_rejected_frame_surfaces_reconfigure_event() {
    let sink = Arc::new(NullDisplay::new(false));
    sink.set_reject_begin(true);
    let (mut engine, _probe) = engine_with(sink.clone(), small_config());
    engine.initialize_render().unwrap();
    engine.startup().unwrap();

    assert!(engine.request_frame());
    let mut events = Vec::new();
    assert!(wait_until(|| {
        events.extend(engine.poll_events());
        !events.is_empty()
    }));
    assert_eq!(
        events[0],
        PipelineEvent::ReconfigureOutput { frame_index: 1 }
    );
    assert_eq!(sink.frames_submitted(), 0);
    engine.shutdown().unwrap();
}

#[test]
fn test_device_failure_is_fatal() {
    let mut engine =
        GraphicsEngine::new(small_config(), Arc::new(NullDisplay::new(false)), None).unwrap();
    let err = engine
        .initialize_gpu(|_| Err(DeviceError::Unavailable("no adapter".into())))
        .unwrap_err();
    assert!(matches!(err, PipelineError::DeviceInitialization(_)));
    assert_eq!(engine.state(), EngineState::Created);
    assert!(engine.initialize_render().is_err());
    assert!(engine.startup().is_err());
    assert!(!engine.request_frame());
}

#[test]
fn test_job_setup_failure_names_the_job() {
    let (mut engine, _probe) = engine_with(Arc::new(NullDisplay::new(false)), small_config());
    let err = engine
        .initialize_render_with(JobGraph::builder().add_job(FailingSetup).build())
        .unwrap_err();
    assert_eq!(
        err,
        PipelineError::JobSetupFailed {
            job: "FailingSetup".into(),
            reason: "Job setup failed: no shader".into(),
        }
    );
}

#[test]
fn test_should_paint_follows_sink_throttle() {
    let sink = Arc::new(NullDisplay::new(true));
    let (mut engine, _probe) = engine_with(sink.clone(), small_config());
    engine.initialize_render().unwrap();
    assert!(engine.should_paint());
    engine.startup().unwrap();

    assert!(engine.request_frame());
    assert!(wait_until(|| engine.telemetry().last_cycle_at().is_some()));
    let last = engine.telemetry().last_cycle_at().unwrap();
    assert!(!engine.should_paint_at(last + Duration::from_millis(10)));
    assert!(engine.should_paint_at(last + Duration::from_millis(66)));

    sink.set_throttled(false);
    assert!(engine.should_paint_at(last));
    engine.shutdown().unwrap();
}

#[test]
fn test_should_paint_counts_rejected_cycles() {
    let sink = Arc::new(NullDisplay::new(true));
    sink.set_reject_begin(true);
    let (mut engine, _probe) = engine_with(sink.clone(), small_config());
    engine.initialize_render().unwrap();
    engine.startup().unwrap();

    assert!(engine.request_frame());
    let mut events = Vec::new();
    assert!(wait_until(|| {
        events.extend(engine.poll_events());
        !events.is_empty()
    }));
    assert_eq!(engine.telemetry().last_cycle_at(), None);
    let last = engine.telemetry().last_run_at().unwrap();
    assert!(!engine.should_paint_at(last + Duration::from_millis(10)));
    assert!(engine.should_paint_at(last + Duration::from_millis(66)));
    engine.shutdown().unwrap();
}

#[test]
fn test_snapshot_edits_apply_while_throttled() {
    let sink = Arc::new(NullDisplay::new(true));
    let (mut engine, _probe) = engine_with(sink, small_config());
    engine.initialize_render().unwrap();
    engine.startup().unwrap();
    for i in 0..10 {
        engine.edit_render_args(|args| args.timestamp = f64::from(i));
        engine.request_frame();
    }
    assert_eq!(engine.render_args().timestamp, 9.0);
    engine.shutdown().unwrap();
}

#[test]
fn test_engine_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "(framebuffer: (width: 32, height: 16, pool_capacity: 1), render: (platform: Mobile))"
    )
    .unwrap();
    let config = EngineConfig::from_file(file.path()).unwrap();
    assert_eq!(config.framebuffer.extent(), Extent2D::new(32, 16));

    let sink = Arc::new(NullDisplay::new(false));
    let (mut engine, _probe) = engine_with(sink.clone(), config);
    engine.initialize_render().unwrap();
    engine.startup().unwrap();
    assert!(engine.request_frame());
    assert!(wait_until(|| sink.frames_submitted() == 1));
    assert_eq!(engine.framebuffers().extent(), Extent2D::new(32, 16));
    engine.shutdown().unwrap();
}

#[test]
fn test_missing_config_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = EngineConfig::from_file(dir.path().join("absent.ron")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}
