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

//! Headless runtime.
//!
//! Usage: `kestrel-runtime [config.ron] [updates]`
//!
//! Runs a simulated producer thread against the headless device and a
//! presenter display, then prints a JSON report on stdout.

use anyhow::{Context, Result};
use kestrel_sdk::prelude::*;
use serde::Serialize;
use std::f32::consts::TAU;
use std::thread;
use std::time::{Duration, Instant};

const DEVICE_ID: DeviceContextId = DeviceContextId(1);
const DEFAULT_UPDATES: u32 = 240;
const UPDATE_PERIOD: Duration = Duration::from_millis(8);
const ORBIT_RADIUS: f32 = 12.0;

#[derive(Debug, Serialize)]
struct RunReport {
    updates: u32,
    frames_requested: u32,
    reconfigure_requests: usize,
    elapsed_ms: u128,
    shutdown: ShutdownReport,
    presented: u64,
    dropped_by_presenter: u64,
    telemetry: TelemetrySummary,
}

fn load_config(path: Option<&str>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("failed to load configuration from {path}")),
        None => {
            log::info!("No configuration file given, using defaults");
            Ok(EngineConfig::default())
        }
    }
}

/// Fills the scene with a ring of cubes around the origin.
fn populate_scene(engine: &GraphicsEngine, count: u32) {
    let scene = engine.scene();
    let mut transaction = Transaction::new();
    for i in 0..count {
        let angle = TAU * i as f32 / count as f32;
        let center = Vec3::new(angle.cos() * 4.0, 0.0, angle.sin() * 4.0);
        let tags = if i % 2 == 0 { TAG_BITS_0 } else { TAG_BITS_1 };
        transaction.reset_item(
            scene.allocate_id(),
            tags,
            BoundingSphere::new(center, 0.9),
            ItemPayload::Mesh {
                name: format!("cube-{i}"),
                triangles: 12,
            },
        );
    }
    scene.enqueue_transaction(transaction);
}

/// Moves the camera along its orbit.
fn orbit_camera(args: &mut RenderArgsSnapshot, step: u32, aspect_ratio: f32) {
    let angle = step as f32 * 0.01;
    let eye = Vec3::new(angle.cos() * ORBIT_RADIUS, 3.0, angle.sin() * ORBIT_RADIUS);
    if let Some(view) = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y) {
        args.view = view;
    }
    args.projection = Mat4::perspective_rh_zo(60f32.to_radians(), aspect_ratio, 0.1, 1000.0);
    args.eye_to_world = Mat4::from_translation(eye);
    args.head_pose = args.eye_to_world;
    args.timestamp = f64::from(step) * UPDATE_PERIOD.as_secs_f64();
}

fn main() -> Result<()> {
    init_logging("info");

    let mut args = std::env::args().skip(1);
    let config = load_config(args.next().as_deref())?;
    let updates = match args.next() {
        Some(n) => n
            .parse()
            .with_context(|| format!("invalid update count '{n}'"))?,
        None => DEFAULT_UPDATES,
    };

    let presenter = Arc::new(
        PresenterDisplay::new(PresenterConfig::default()).context("failed to start presenter")?,
    );
    let presenter_stats = presenter.stats();
    let aspect_ratio = config.framebuffer.extent().aspect_ratio();

    let mut engine = GraphicsEngine::new(
        config,
        presenter,
        Some(Box::new(HudOverlayRenderer::new())),
    )?;
    engine.initialize_gpu(|size| {
        Ok(Box::new(HeadlessDevice::new(DEVICE_ID, size)?) as Box<dyn DeviceContext>)
    })?;
    engine.initialize_render()?;
    populate_scene(&engine, 16);
    engine.startup()?;

    let start = Instant::now();
    let mut frames_requested = 0;
    let mut reconfigure_requests = 0;
    for step in 0..updates {
        engine.edit_render_args(|args| orbit_camera(args, step, aspect_ratio));
        if engine.should_paint() && engine.request_frame() {
            frames_requested += 1;
        }
        for event in engine.poll_events() {
            match event {
                PipelineEvent::ReconfigureOutput { frame_index } => {
                    log::warn!("Output reconfiguration requested at frame {frame_index}");
                    reconfigure_requests += 1;
                }
                PipelineEvent::Fatal(e) => {
                    log::error!("Render pipeline stopped: {e}");
                    return Err(e.into());
                }
            }
        }
        thread::sleep(UPDATE_PERIOD);
    }
    let elapsed_ms = start.elapsed().as_millis();

    let shutdown = engine.shutdown()?;
    let report = RunReport {
        updates,
        frames_requested,
        reconfigure_requests,
        elapsed_ms,
        shutdown,
        presented: presenter_stats.presented(),
        dropped_by_presenter: presenter_stats.dropped(),
        telemetry: engine.telemetry().summary(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
