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

//! The Job Graph Engine.
//!
//! A [`JobGraph`] is an ordered list of [`Job`]s assembled once through a
//! [`JobGraphBuilder`]. Conditional inclusion (platform gating, optional
//! passes) is decided while building; the resulting graph never changes shape.
//! At run time the jobs execute strictly in registration order on the calling
//! thread, each receiving the same [`RenderContext`].

use kestrel_core::device::DeviceContext;
use kestrel_core::job::{CullFunctor, Job, JobTiming, RenderContext};
use kestrel_core::PipelineError;
use std::fmt;
use std::time::Instant;

/// Assembles a [`JobGraph`].
#[derive(Default)]
pub struct JobGraphBuilder {
    jobs: Vec<Box<dyn Job>>,
    cull: Option<CullFunctor>,
}

impl JobGraphBuilder {
    /// Appends a job.
    pub fn add_job(mut self, job: impl Job + 'static) -> Self {
        self.jobs.push(Box::new(job));
        self
    }

    /// Appends an already boxed job.
    pub fn add_boxed(mut self, job: Box<dyn Job>) -> Self {
        self.jobs.push(job);
        self
    }

    /// Appends the job built by `make` only when `condition` holds.
    pub fn add_job_if<J, F>(self, condition: bool, make: F) -> Self
    where
        J: Job + 'static,
        F: FnOnce() -> J,
    {
        if condition {
            self.add_job(make())
        } else {
            self
        }
    }

    /// Sets the visibility predicate handed to every job through the context.
    pub fn with_cull(mut self, cull: CullFunctor) -> Self {
        self.cull = Some(cull);
        self
    }

    /// Freezes the job list.
    pub fn build(self) -> JobGraph {
        JobGraph {
            jobs: self.jobs,
            cull: self.cull,
        }
    }
}

/// An immutable, ordered sequence of jobs.
pub struct JobGraph {
    jobs: Vec<Box<dyn Job>>,
    cull: Option<CullFunctor>,
}

impl JobGraph {
    /// Starts assembling a graph.
    pub fn builder() -> JobGraphBuilder {
        JobGraphBuilder::default()
    }

    /// Names of the jobs, in execution order.
    pub fn job_names(&self) -> Vec<&str> {
        self.jobs.iter().map(|j| j.name()).collect()
    }

    /// Number of jobs.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Returns `true` if the graph has no job.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Runs every job's one-time setup against `device`.
    ///
    /// # Errors
    ///
    /// [`PipelineError::JobSetupFailed`] naming the first job that failed;
    /// later jobs are not set up.
    pub fn setup(&mut self, device: &dyn DeviceContext) -> Result<(), PipelineError> {
        for job in &mut self.jobs {
            job.setup(device).map_err(|e| {
                log::error!("Setup of job '{}' failed: {e}", job.name());
                PipelineError::JobSetupFailed {
                    job: job.name().to_owned(),
                    reason: e.to_string(),
                }
            })?;
            log::debug!("Job '{}' set up", job.name());
        }
        Ok(())
    }

    /// Executes one cycle.
    ///
    /// A job returning an error is logged and counted in
    /// `ctx.details.jobs_failed`; the remaining jobs still run.
    pub fn run(&mut self, ctx: &mut RenderContext<'_>) {
        if ctx.cull.is_none() {
            ctx.cull = self.cull.clone();
        }
        for job in &mut self.jobs {
            let start = Instant::now();
            if let Err(e) = job.execute(ctx) {
                log::warn!("Job '{}' failed on frame {}: {e}", job.name(), ctx.frame_index);
                ctx.details.jobs_failed += 1;
            }
            ctx.details.job_timings.push(JobTiming {
                job: job.name().to_owned(),
                micros: start.elapsed().as_micros() as u64,
            });
        }
    }
}

impl fmt::Debug for JobGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobGraph")
            .field("jobs", &self.job_names())
            .field("has_cull", &self.cull.is_some())
            .finish()
    }
}
