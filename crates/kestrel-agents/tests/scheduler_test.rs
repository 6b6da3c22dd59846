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

//! Integration tests for the render thread.

mod common;

use common::*;
use kestrel_agents::render_agent::RENDER_THREAD_NAME;
use kestrel_agents::{RenderScheduler, SchedulerConfig};
use kestrel_core::frame::FramebufferPool;
use kestrel_infra::display::NullDisplay;
use kestrel_lanes::JobGraph;
use std::sync::atomic::Ordering;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);

fn slow_harness(delay: Duration) -> (Harness<NullDisplay>, SlowJob) {
    let job = SlowJob::new(delay);
    let graph = JobGraph::builder().add_job(job.clone()).build();
    (harness(NullDisplay::new(false), graph), job)
}

#[test]
fn test_requested_frame_renders_on_render_thread() {
    let (h, job) = slow_harness(Duration::ZERO);
    let sink = h.sink.clone();
    let scheduler = RenderScheduler::spawn(h.render_loop, SchedulerConfig::default()).unwrap();

    assert!(scheduler.request_frame());
    assert!(wait_until(TIMEOUT, || sink.frames_submitted() == 1));
    assert_eq!(
        job.thread_name.lock().unwrap().as_deref(),
        Some(RENDER_THREAD_NAME)
    );

    let render_loop = scheduler.stop().unwrap();
    assert_eq!(render_loop.frames_rendered(), 1);
}

#[test]
fn test_requests_coalesce_while_a_frame_is_pending() {
    let (h, job) = slow_harness(Duration::from_millis(100));
    let sink = h.sink.clone();
    let scheduler = RenderScheduler::spawn(h.render_loop, SchedulerConfig::default()).unwrap();

    assert!(scheduler.request_frame());
    assert!(wait_until(TIMEOUT, || job.started.load(Ordering::SeqCst)));
    assert!(!scheduler.request_frame());
    assert!(!scheduler.request_frame());

    assert!(wait_until(TIMEOUT, || !scheduler.is_frame_pending()));
    assert_eq!(sink.frames_submitted(), 1);

    assert!(scheduler.request_frame());
    assert!(wait_until(TIMEOUT, || sink.frames_submitted() == 2));
    scheduler.stop().unwrap();
    assert_eq!(job.finished.load(Ordering::SeqCst), 2);
}

#[test]
fn test_shutdown_waits_for_cycle_in_progress() {
    let (h, job) = slow_harness(Duration::from_millis(150));
    let sink = h.sink.clone();
    let pool = h.pool.clone();
    let probe = h.probe.clone();
    let scheduler = RenderScheduler::spawn(h.render_loop, SchedulerConfig::default()).unwrap();

    assert!(scheduler.request_frame());
    assert!(wait_until(TIMEOUT, || job.started.load(Ordering::SeqCst)));

    let mut render_loop = scheduler.stop().unwrap();
    assert_eq!(job.finished.load(Ordering::SeqCst), 1);
    assert_eq!(sink.frames_submitted(), 1);
    assert!(!probe.is_shut_down());

    render_loop.shutdown().unwrap();
    assert!(probe.is_shut_down());
    assert_eq!(probe.frames_begun(), probe.frames_ended());
    assert_eq!(pool.outstanding(), 0);
}

#[test]
fn test_tick_interval_renders_without_requests() {
    let h = null_harness(false);
    let sink = h.sink.clone();
    let scheduler = RenderScheduler::spawn(
        h.render_loop,
        SchedulerConfig {
            tick_interval: Some(Duration::from_millis(2)),
        },
    )
    .unwrap();

    assert!(wait_until(TIMEOUT, || sink.frames_submitted() >= 3));
    scheduler.stop().unwrap();
}

#[test]
fn test_stopped_scheduler_refuses_requests() {
    let h = null_harness(false);
    let sink = h.sink.clone();
    let probe = h.probe.clone();
    let scheduler = RenderScheduler::spawn(h.render_loop, SchedulerConfig::default()).unwrap();
    assert!(scheduler.is_running());

    drop(scheduler);
    assert_eq!(sink.frames_submitted(), 0);
    // The loop went down with the thread, shutting its device.
    assert!(probe.is_shut_down());
}

#[test]
fn test_rejected_frame_reaches_event_queue_from_render_thread() {
    let h = null_harness(false);
    h.sink.set_reject_begin(true);
    let events = h.events;
    let scheduler = RenderScheduler::spawn(h.render_loop, SchedulerConfig::default()).unwrap();

    assert!(scheduler.request_frame());
    let event = events.recv_timeout(TIMEOUT).unwrap();
    assert_eq!(
        event,
        kestrel_core::PipelineEvent::ReconfigureOutput { frame_index: 1 }
    );
    scheduler.stop().unwrap();
}
