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

use std::sync::Arc;

use crate::renderer::error::RenderError;
use crate::renderer::{api::*, GraphicsDevice};

/// Trait representing a render system bound to one presentation surface.
///
/// A render system is created by the host once the surface exists and is
/// dropped after [`RenderSystem::shutdown`] when the surface goes away.
pub trait RenderSystem: std::fmt::Debug + Send {
    /// Resize the surface and its depth buffer. Zero sizes are ignored.
    fn resize(&mut self, new_width: u32, new_height: u32);

    /// Current surface size in physical pixels.
    fn surface_size(&self) -> (u32, u32);

    /// Record and present one frame.
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped; that is
    /// reported as `Ok` with unchanged stats rather than as an error.
    fn render(&mut self, frame: &FrameSubmission<'_>) -> Result<RenderStats, RenderError>;

    /// Get the adapter information of the rendering system.
    fn get_adapter_info(&self) -> Option<RendererAdapterInfo>;

    /// Returns an Arc to the underlying `GraphicsDevice` used by this `RenderSystem`.
    fn graphics_device(&self) -> Arc<dyn GraphicsDevice>;

    /// Wait for the GPU to go idle. Called after all resources were released and
    /// before the surface is dropped.
    fn shutdown(&mut self);
}
