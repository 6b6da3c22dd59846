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

//! Bounding volumes used by visibility predicates.

use super::Vec3;

/// A sphere enclosing a renderable item, in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingSphere {
    /// Center of the sphere.
    pub center: Vec3,
    /// Radius of the sphere. Negative radii are treated as empty.
    pub radius: f32,
}

impl BoundingSphere {
    /// Creates a new bounding sphere.
    pub const fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Returns `true` if the sphere has no volume.
    pub fn is_empty(&self) -> bool {
        self.radius <= 0.0
    }

    /// Returns `true` if `point` lies inside or on the sphere.
    pub fn contains(&self, point: Vec3) -> bool {
        self.center.distance(point) <= self.radius
    }

    /// Half-angle, in radians, subtended by the sphere when seen from `eye`.
    ///
    /// Returns `PI / 2` when the eye is inside the sphere.
    pub fn angular_size_from(&self, eye: Vec3) -> f32 {
        let distance = self.center.distance(eye);
        if distance <= self.radius {
            return std::f32::consts::FRAC_PI_2;
        }
        (self.radius / distance).asin()
    }
}
