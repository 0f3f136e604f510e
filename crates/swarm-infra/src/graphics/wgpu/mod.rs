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

//! The `wgpu` backend.
//!
//! Shader sources are parsed and validated with `naga` before they reach
//! `wgpu`, which turns compile errors into [`swarm_core::renderer::ShaderError`]s
//! and yields the uniform block layout used to resolve uniform names.

mod context;
mod conversions;
mod device;
mod reflection;
mod system;

pub use self::context::{check_adapter_capabilities, WgpuGraphicsContext, DEPTH_FORMAT};
pub use self::device::WgpuDevice;
pub use self::reflection::{reflect_wgsl, ReflectedShader, UniformBlockLayout, UniformMember};
pub use self::system::WgpuRenderSystem;
