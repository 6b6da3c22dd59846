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

//! Defines the fatal error taxonomy of the frame pipeline.
//!
//! Recoverable conditions (throttling, a frame already in flight, a sink
//! rejecting a frame start, a snapshot without a device) are not errors: they
//! are reported as skipped cycles and never reach this type. Everything here
//! means the pipeline cannot safely continue and must be surfaced to the
//! owning application.

use std::fmt;

/// A fatal error raised by the frame pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// `begin_frame` was called while a device frame was already active.
    ReentrantBeginFrame,
    /// `end_frame` was called without a matching `begin_frame`.
    EndFrameWithoutBegin,
    /// A device-recording operation was attempted outside an active frame.
    DeviceNotActive,
    /// The graphics device could not be created or made current.
    DeviceInitialization(String),
    /// The device was asked to shut down while a frame was still active.
    ShutdownWhileFrameActive,
    /// A job failed its one-time setup against the device.
    JobSetupFailed {
        /// Name of the job that failed.
        job: String,
        /// Reason reported by the job.
        reason: String,
    },
    /// An engine operation was called in the wrong order.
    InvalidState(&'static str),
    /// The render scheduler thread panicked.
    SchedulerPanicked,
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::ReentrantBeginFrame => {
                write!(f, "begin_frame called while a device frame is already active")
            }
            PipelineError::EndFrameWithoutBegin => {
                write!(f, "end_frame called without a matching begin_frame")
            }
            PipelineError::DeviceNotActive => {
                write!(f, "device recording requested outside of an active frame")
            }
            PipelineError::DeviceInitialization(msg) => {
                write!(f, "graphics device initialization failed: {msg}")
            }
            PipelineError::ShutdownWhileFrameActive => {
                write!(f, "device shutdown requested while a frame is active")
            }
            PipelineError::JobSetupFailed { job, reason } => {
                write!(f, "setup of job '{job}' failed: {reason}")
            }
            PipelineError::InvalidState(msg) => write!(f, "invalid engine state: {msg}"),
            PipelineError::SchedulerPanicked => write!(f, "render scheduler thread panicked"),
        }
    }
}

impl std::error::Error for PipelineError {}
