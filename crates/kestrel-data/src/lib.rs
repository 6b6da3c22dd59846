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

//! Scene storage for the Kestrel frame pipeline.
//!
//! Provides [`ItemScene`], the in-memory implementation of the
//! [`Scene`](kestrel_core::scene::Scene) contract, and the world-box item the
//! render loop keeps in every scene.

#![warn(missing_docs)]

pub mod scene;
pub mod world_box;

pub use scene::ItemScene;
