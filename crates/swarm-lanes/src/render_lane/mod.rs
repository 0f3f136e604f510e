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

//! Rendering lane: instanced sphere swarm.
//!
//! Built bottom-up:
//! - [`shaders`]: the WGSL stages;
//! - [`ShaderPipeline`]: compile, link and uniform-location cache;
//! - [`GpuResources`]: mesh and instance buffers plus their vertex binding;
//! - [`Camera`]: fixed view with a viewport-driven projection;
//! - [`InstancedSphereLane`]: ties them together into one draw per frame.

pub mod animation;
mod camera;
mod gpu_resources;
mod instanced_sphere_lane;
mod pipeline;
pub mod shaders;

pub use camera::*;
pub use gpu_resources::*;
pub use instanced_sphere_lane::*;
pub use pipeline::*;
