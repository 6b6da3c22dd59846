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

//! The point-in-time render arguments handed from the simulation to the renderer.

use crate::device::{DeviceContextId, StereoState};
use crate::math::{Mat4, Vec3};

/// View, projection and pose state for one render cycle.
///
/// A plain `Copy` value: it crosses threads only by copy, through a
/// [`SnapshotExchange`](crate::sync::SnapshotExchange).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderArgsSnapshot {
    /// World-to-view transform of the main camera.
    pub view: Mat4,
    /// Projection of the main camera.
    pub projection: Mat4,
    /// Tracked head pose, handed to the device when a frame begins.
    pub head_pose: Mat4,
    /// Eye-to-world transform, forwarded to the overlay compositor.
    pub eye_to_world: Mat4,
    /// Sensor-to-world transform, forwarded to the overlay compositor.
    pub sensor_to_world: Mat4,
    /// Whether this cycle renders both eyes.
    pub is_stereo: bool,
    /// Per-eye view offsets, used when `is_stereo` is set.
    pub eye_offsets: [Mat4; 2],
    /// Per-eye projections, used when `is_stereo` is set.
    pub eye_projections: [Mat4; 2],
    /// View of the optional secondary camera.
    pub secondary_view: Option<Mat4>,
    /// Simulation time the snapshot was written at, in seconds.
    pub timestamp: f64,
    /// The device context this snapshot was produced for.
    pub device: Option<DeviceContextId>,
}

impl Default for RenderArgsSnapshot {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            head_pose: Mat4::IDENTITY,
            eye_to_world: Mat4::IDENTITY,
            sensor_to_world: Mat4::IDENTITY,
            is_stereo: false,
            eye_offsets: [Mat4::IDENTITY; 2],
            eye_projections: [Mat4::IDENTITY; 2],
            secondary_view: None,
            timestamp: 0.0,
            device: None,
        }
    }
}

impl RenderArgsSnapshot {
    /// World-space position of the viewer.
    pub fn eye_position(&self) -> Vec3 {
        self.eye_to_world.translation()
    }

    /// Returns `true` if the snapshot targets the device `id`.
    pub fn targets(&self, id: DeviceContextId) -> bool {
        self.device == Some(id)
    }

    /// The per-eye matrices, if this snapshot is stereo.
    pub fn stereo_state(&self) -> Option<StereoState> {
        self.is_stereo.then_some(StereoState {
            eye_projections: self.eye_projections,
            eye_views: self.eye_offsets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot_has_no_device() {
        let snapshot = RenderArgsSnapshot::default();
        assert!(!snapshot.targets(DeviceContextId(0)));
        assert!(snapshot.stereo_state().is_none());
    }

    #[test]
    fn test_eye_position_reads_translation() {
        let snapshot = RenderArgsSnapshot {
            eye_to_world: Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)),
            device: Some(DeviceContextId(4)),
            ..Default::default()
        };
        assert_eq!(snapshot.eye_position(), Vec3::new(1.0, 2.0, 3.0));
        assert!(snapshot.targets(DeviceContextId(4)));
    }
}
