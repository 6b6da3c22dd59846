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

//! Build-time settings of the render graph.

use kestrel_core::scene::{TagBits, TAG_BITS_0};
use serde::{Deserialize, Serialize};

/// The class of device the engine runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    /// Desktop class GPU: every job is available.
    Desktop,
    /// Mobile class GPU: optional offscreen passes are left out.
    Mobile,
}

impl Platform {
    /// The platform of the current build target.
    pub fn current() -> Self {
        if cfg!(any(target_os = "android", target_os = "ios")) {
            Platform::Mobile
        } else {
            Platform::Desktop
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

/// Level-of-detail culling thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LodConfig {
    /// Items subtending a smaller half-angle than this, in radians, are culled.
    pub min_angular_size: f32,
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            min_angular_size: 0.002,
        }
    }
}

/// Settings resolved once when the render graph is assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Render the main view with a single forward pass instead of the
    /// deferred path.
    pub disable_deferred: bool,
    /// Platform gating of optional jobs.
    pub platform: Platform,
    /// Tag bits the main view renders.
    pub tag_mask: TagBits,
    /// LOD culling thresholds.
    pub lod: LodConfig,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            disable_deferred: false,
            platform: Platform::default(),
            tag_mask: TAG_BITS_0,
            lod: LodConfig::default(),
        }
    }
}
