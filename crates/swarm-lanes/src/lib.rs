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

//! # Swarm Lanes
//!
//! The hot path of the stress test. A lane owns the GPU-side state of one
//! rendering strategy and turns it into draw commands every frame; here there
//! is a single lane, [`render_lane::InstancedSphereLane`].

pub mod render_lane;
