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

use anyhow::anyhow;
use anyhow::Result;
use wgpu::{Adapter, Instance, Limits, ShaderModel};
use winit::dpi::PhysicalSize;

/// Format of the depth buffer attached to every frame.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Vertex attributes consumed by the instanced sphere shader.
const REQUIRED_VERTEX_ATTRIBUTES: u32 = 4;
/// Vertex buffer slots bound by the instanced sphere draw.
const REQUIRED_VERTEX_BUFFERS: u32 = 3;

/// Checks an adapter against the minimum capability level.
///
/// Per-instance vertex stepping and the WGSL programs need at least shader
/// model 4, which is the wgpu equivalent of an ES 3.0 class device.
///
/// ## Returns
/// The reason the adapter is rejected, if it is.
pub fn check_adapter_capabilities(shader_model: ShaderModel, limits: &Limits) -> Result<(), String> {
    if matches!(shader_model, ShaderModel::Sm2) {
        return Err(format!(
            "shader model {shader_model:?} is below the required Sm4"
        ));
    }
    if limits.max_vertex_attributes < REQUIRED_VERTEX_ATTRIBUTES {
        return Err(format!(
            "{} vertex attributes supported, {REQUIRED_VERTEX_ATTRIBUTES} required",
            limits.max_vertex_attributes
        ));
    }
    if limits.max_vertex_buffers < REQUIRED_VERTEX_BUFFERS {
        return Err(format!(
            "{} vertex buffers supported, {REQUIRED_VERTEX_BUFFERS} required",
            limits.max_vertex_buffers
        ));
    }
    Ok(())
}

/// Holds the core WGPU state objects required for rendering.
/// This structure manages the connection to the graphics API for a specific surface.
/// It is initialized with a pre-selected adapter, making it a passive component.
#[derive(Debug)]
pub struct WgpuGraphicsContext {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,

    // Configuration for the surface's swapchain behavior
    pub surface_config: wgpu::SurfaceConfiguration,

    // Store info for easy access
    pub adapter_info: wgpu::AdapterInfo,
}

impl WgpuGraphicsContext {
    /// Asynchronously initializes the graphics context for an existing surface.
    ///
    /// ## Arguments
    /// * `surface` - The window surface, created from the same instance as `adapter`.
    /// * `adapter` - The pre-selected and capability-checked `wgpu::Adapter`.
    /// * `window_size` - The initial physical size of the window surface.
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: Adapter,
        window_size: PhysicalSize<u32>,
    ) -> Result<Self> {
        log::info!("Initializing WGPU Graphics Context with pre-selected adapter...");

        let adapter_info = adapter.get_info();
        log::info!(
            "Using graphics adapter: \"{}\" (Backend: {:?})",
            adapter_info.name,
            adapter_info.backend
        );

        // --- 1. Create Logical Device and Command Queue from Adapter ---
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Swarm Logical Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::default(),
            })
            .await
            .map_err(|e| anyhow!("Failed to create logical device: {}", e))?;
        log::info!("Logical device and command queue created.");

        device.on_uncaptured_error(Box::new(|e| {
            log::error!("WGPU Uncaptured Error: {e:?}");
        }));
        log::debug!("Device limits: {:?}", device.limits());

        // --- 2. Configure Surface ---
        let surface_caps = surface.get_capabilities(&adapter);
        let fallback_format = surface_caps
            .formats
            .first()
            .copied()
            .ok_or_else(|| anyhow!("Surface reports no supported formats for this adapter"))?;
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(fallback_format);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: window_size.width.max(1),
            height: window_size.height.max(1),
            present_mode: surface_caps
                .present_modes
                .iter()
                .copied()
                .find(|m| *m == wgpu::PresentMode::Mailbox)
                .unwrap_or(wgpu::PresentMode::Fifo), // Fifo is guaranteed to be supported
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);
        log::info!(
            "Surface configured: {:?} {}x{} ({:?})",
            surface_config.format,
            surface_config.width,
            surface_config.height,
            surface_config.present_mode
        );

        Ok(WgpuGraphicsContext {
            surface,
            device,
            queue,
            surface_config,
            adapter_info,
        })
    }

    /// Reconfigures the underlying surface (swapchain) when the window is resized.
    ///
    /// ## Returns
    /// `true` when the surface was reconfigured, `false` for zero sizes.
    pub fn resize(&mut self, new_width: u32, new_height: u32) -> bool {
        if new_width > 0 && new_height > 0 {
            log::info!(
                "WgpuGraphicsContext: Resizing surface configuration to {new_width}x{new_height}"
            );
            self.surface_config.width = new_width;
            self.surface_config.height = new_height;
            self.surface.configure(&self.device, &self.surface_config);
            true
        } else {
            log::warn!(
                "WgpuGraphicsContext: Ignoring resize request to zero dimensions: {new_width}x{new_height}"
            );
            false
        }
    }

    /// Reapplies the current configuration after the surface was lost or outdated.
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Size of the swapchain in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits_with(attributes: u32, buffers: u32) -> Limits {
        Limits {
            max_vertex_attributes: attributes,
            max_vertex_buffers: buffers,
            ..Limits::downlevel_webgl2_defaults()
        }
    }

    #[test]
    fn downlevel_defaults_are_accepted() {
        assert_eq!(
            check_adapter_capabilities(ShaderModel::Sm5, &Limits::downlevel_defaults()),
            Ok(())
        );
        assert_eq!(
            check_adapter_capabilities(ShaderModel::Sm4, &limits_with(4, 3)),
            Ok(())
        );
    }

    #[test]
    fn shader_model_2_is_rejected() {
        let err = check_adapter_capabilities(ShaderModel::Sm2, &Limits::default()).unwrap_err();
        assert!(err.contains("Sm2"), "{err}");
    }

    #[test]
    fn too_few_vertex_slots_are_rejected() {
        let err = check_adapter_capabilities(ShaderModel::Sm5, &limits_with(3, 8)).unwrap_err();
        assert!(err.contains("vertex attributes"), "{err}");

        let err = check_adapter_capabilities(ShaderModel::Sm5, &limits_with(16, 2)).unwrap_err();
        assert!(err.contains("vertex buffers"), "{err}");
    }
}
