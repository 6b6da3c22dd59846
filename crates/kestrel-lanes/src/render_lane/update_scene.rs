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

//! Applies queued scene transactions at the start of every cycle.

use kestrel_core::job::{Job, JobError, RenderContext};

/// Drains the scene transaction queue so the views see this cycle's edits.
#[derive(Debug, Default)]
pub struct UpdateSceneJob;

impl UpdateSceneJob {
    /// Creates the job.
    pub fn new() -> Self {
        Self
    }
}

impl Job for UpdateSceneJob {
    fn name(&self) -> &str {
        "UpdateScene"
    }

    fn execute(&mut self, ctx: &mut RenderContext<'_>) -> Result<(), JobError> {
        let applied = ctx.scene.process_transaction_queue();
        ctx.details.transactions_applied += applied as u32;
        Ok(())
    }
}
