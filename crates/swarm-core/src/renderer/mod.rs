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

//! Backend-agnostic rendering contracts.
//!
//! Resources are referenced by opaque ids. A backend (see `swarm-infra`)
//! implements [`GraphicsDevice`] for resource management and [`RenderSystem`]
//! for frame submission. Higher layers only ever talk to these traits.

pub mod api;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
pub mod traits;

pub use self::api::*;
pub use self::error::{PipelineError, RenderError, ResourceError, ShaderError};
pub use self::traits::{GraphicsDevice, RenderSystem};
