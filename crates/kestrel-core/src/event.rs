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

//! Notifications sent from the render scheduler to the owning application.

use crate::error::PipelineError;
use crate::frame::FrameIndex;

/// An event the application must react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// The output sink rejected cycle `frame_index`; the output must be reconfigured.
    ReconfigureOutput {
        /// Index of the rejected cycle.
        frame_index: FrameIndex,
    },
    /// The pipeline hit a fatal error and the scheduler stopped.
    Fatal(PipelineError),
}
