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

//! Latest render details published by the render thread.

use kestrel_core::frame::FrameIndex;
use kestrel_core::job::RenderDetails;
use serde::Serialize;
use std::sync::{Mutex, PoisonError};

/// Render details tagged with the cycle that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedDetails {
    /// Cycle index.
    pub frame_index: FrameIndex,
    /// Statistics of that cycle.
    pub details: RenderDetails,
}

/// Holds the most recent [`RenderDetails`].
#[derive(Debug, Default)]
pub struct RenderDetailsStore {
    latest: Mutex<Option<PublishedDetails>>,
}

impl RenderDetailsStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored details.
    pub fn publish(&self, frame_index: FrameIndex, details: RenderDetails) {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(PublishedDetails {
            frame_index,
            details,
        });
    }

    /// The most recent details, if any cycle completed.
    pub fn latest(&self) -> Option<PublishedDetails> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
