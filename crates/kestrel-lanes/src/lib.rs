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

//! The Job Graph Engine and the built-in render jobs of Kestrel.
//!
//! A render cycle is a fixed, ordered list of jobs. [`graph::JobGraph`] runs
//! them; [`render_lane`] provides the jobs and assembles the default graph
//! from [`settings::RenderSettings`].

#![warn(missing_docs)]

pub mod graph;
pub mod render_lane;
pub mod settings;

pub use graph::{JobGraph, JobGraphBuilder};
pub use render_lane::build_render_graph;
pub use settings::{LodConfig, Platform, RenderSettings};
