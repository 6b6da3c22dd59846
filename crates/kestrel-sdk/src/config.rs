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

//! Engine configuration, loadable from RON.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```ron
//! (
//!     throttle: (throttled_frame_rate: 30),
//!     framebuffer: (width: 1920, height: 1080),
//! )
//! ```

use kestrel_agents::SchedulerConfig;
use kestrel_control::ThrottleConfig;
use kestrel_core::math::Extent2D;
use kestrel_lanes::RenderSettings;
use kestrel_telemetry::TelemetryConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Errors raised while loading an [`EngineConfig`].
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// The file that was read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The text is not valid RON for an [`EngineConfig`].
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Render thread wake-up policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    /// Period of the scheduler tick in milliseconds. `None` renders on
    /// request only.
    pub tick_interval_ms: Option<u64>,
}

impl SchedulerSettings {
    /// The scheduler configuration these settings describe.
    pub fn to_scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            tick_interval: self.tick_interval_ms.map(Duration::from_millis),
        }
    }
}

/// Final framebuffer pool settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FramebufferSettings {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Framebuffers kept in the pool.
    pub pool_capacity: usize,
}

impl Default for FramebufferSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            pool_capacity: 3,
        }
    }
}

impl FramebufferSettings {
    /// Size of the framebuffers.
    pub fn extent(&self) -> Extent2D {
        Extent2D::new(self.width, self.height)
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Frame pacing for throttled sinks.
    pub throttle: ThrottleConfig,
    /// Render thread wake-up policy.
    pub scheduler: SchedulerSettings,
    /// Render graph assembly.
    pub render: RenderSettings,
    /// Final framebuffer pool.
    pub framebuffer: FramebufferSettings,
    /// Statistics collection.
    pub telemetry: TelemetryConfig,
}

impl EngineConfig {
    /// Parses and validates RON text.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a RON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ron_str(&text)?;
        log::info!("Loaded engine configuration from {}", path.display());
        Ok(config)
    }

    /// Checks every value is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.throttle.throttled_frame_rate == 0 {
            return Err(ConfigError::Invalid(
                "throttle.throttled_frame_rate must be greater than zero".into(),
            ));
        }
        if self.framebuffer.extent().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "framebuffer size {}x{} has a zero dimension",
                self.framebuffer.width, self.framebuffer.height
            )));
        }
        if self.framebuffer.pool_capacity == 0 {
            return Err(ConfigError::Invalid(
                "framebuffer.pool_capacity must be greater than zero".into(),
            ));
        }
        if self.scheduler.tick_interval_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "scheduler.tick_interval_ms must be greater than zero when set".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_lanes::Platform;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.throttle.min_period(), Duration::from_millis(66));
        assert_eq!(config.framebuffer.extent(), Extent2D::new(1280, 720));
        assert_eq!(config.framebuffer.pool_capacity, 3);
        assert_eq!(config.scheduler.to_scheduler_config().tick_interval, None);
        assert_eq!(config.telemetry.timing_window, 100);
    }

    #[test]
    fn test_partial_ron_keeps_other_defaults() {
        let config = EngineConfig::from_ron_str(
            "(throttle: (throttled_frame_rate: 30), render: (platform: Mobile), scheduler: (tick_interval_ms: Some(16)))",
        )
        .unwrap();
        assert_eq!(config.throttle.throttled_frame_rate, 30);
        assert_eq!(config.render.platform, Platform::Mobile);
        assert!(!config.render.disable_deferred);
        assert_eq!(
            config.scheduler.to_scheduler_config().tick_interval,
            Some(Duration::from_millis(16))
        );
        assert_eq!(config.framebuffer, FramebufferSettings::default());
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        for text in [
            "(throttle: (throttled_frame_rate: 0))",
            "(framebuffer: (width: 0))",
            "(framebuffer: (pool_capacity: 0))",
            "(scheduler: (tick_interval_ms: Some(0)))",
        ] {
            assert!(
                matches!(EngineConfig::from_ron_str(text), Err(ConfigError::Invalid(_))),
                "{text} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            EngineConfig::from_ron_str("(throttle: oops"),
            Err(ConfigError::Parse(_))
        ));
    }
}
