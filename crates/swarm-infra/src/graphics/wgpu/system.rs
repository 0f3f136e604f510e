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

use std::sync::{Arc, Mutex};

use swarm_core::renderer::{
    FrameSubmission, GraphicsDevice, RenderError, RenderStats, RenderSystem, RendererAdapterInfo,
    ResourceError,
};
use winit::dpi::PhysicalSize;

use super::context::{check_adapter_capabilities, WgpuGraphicsContext, DEPTH_FORMAT};
use super::conversions::IntoWgpu;
use super::device::WgpuDevice;
use crate::platform::window::WinitWindow;

/// The concrete, WGPU-based implementation of the [`RenderSystem`] trait.
///
/// One instance is bound to one window surface. It owns the depth buffer and
/// shares the graphics context with the [`WgpuDevice`] that manages resources.
#[derive(Debug)]
pub struct WgpuRenderSystem {
    graphics_context_shared: Arc<Mutex<WgpuGraphicsContext>>,
    wgpu_device: Arc<WgpuDevice>,
    depth_texture_view: wgpu::TextureView,
    current_width: u32,
    current_height: u32,
    frame_count: u64,
    last_frame_stats: RenderStats,
    is_shut_down: bool,
}

fn create_depth_texture_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Swarm Depth Texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

impl WgpuRenderSystem {
    /// Creates the surface, selects and checks an adapter, and builds the device.
    ///
    /// ## Errors
    /// * `RenderError::UnsupportedPlatform` - The adapter is below the minimum capability level.
    /// * `RenderError::InitializationFailed` - Any other setup failure.
    pub fn new(window: &WinitWindow) -> Result<Self, RenderError> {
        pollster::block_on(Self::initialize(window))
    }

    async fn initialize(window: &WinitWindow) -> Result<Self, RenderError> {
        log::info!("WgpuRenderSystem: Initializing...");
        let init_failed = |what: &str, e: &dyn std::fmt::Display| {
            RenderError::InitializationFailed(format!("{what}: {e}"))
        };

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| init_failed("Failed to create surface", &e))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                force_fallback_adapter: false,
                compatible_surface: Some(&surface),
            })
            .await
            .map_err(|e| init_failed("No suitable graphics adapter", &e))?;

        let shader_model = adapter.get_downlevel_capabilities().shader_model;
        if let Err(reason) = check_adapter_capabilities(shader_model, &adapter.limits()) {
            log::error!(
                "WgpuRenderSystem: adapter \"{}\" rejected: {reason}",
                adapter.get_info().name
            );
            return Err(RenderError::UnsupportedPlatform { reason });
        }

        let (width, height) = window.inner_size();
        let context = WgpuGraphicsContext::new(surface, adapter, PhysicalSize::new(width, height))
            .await
            .map_err(|e| init_failed("Graphics context", &e))?;

        let (current_width, current_height) = context.size();
        let depth_texture_view =
            create_depth_texture_view(&context.device, current_width, current_height);
        let context_arc = Arc::new(Mutex::new(context));
        let wgpu_device = Arc::new(WgpuDevice::new(context_arc.clone())?);

        log::info!(
            "WgpuRenderSystem: Ready on {} at {current_width}x{current_height}",
            wgpu_device.get_adapter_info()
        );
        Ok(Self {
            graphics_context_shared: context_arc,
            wgpu_device,
            depth_texture_view,
            current_width,
            current_height,
            frame_count: 0,
            last_frame_stats: RenderStats::default(),
            is_shut_down: false,
        })
    }
}

impl RenderSystem for WgpuRenderSystem {
    fn resize(&mut self, new_width: u32, new_height: u32) {
        let mut gc_guard = match self.graphics_context_shared.lock() {
            Ok(guard) => guard,
            Err(e) => {
                log::error!("WgpuRenderSystem: Mutex poisoned (context) on resize: {e}");
                return;
            }
        };
        if gc_guard.resize(new_width, new_height) {
            self.current_width = new_width;
            self.current_height = new_height;
            self.depth_texture_view =
                create_depth_texture_view(&gc_guard.device, new_width, new_height);
        }
    }

    fn surface_size(&self) -> (u32, u32) {
        (self.current_width, self.current_height)
    }

    fn render(&mut self, frame: &FrameSubmission<'_>) -> Result<RenderStats, RenderError> {
        if self.is_shut_down {
            return Err(RenderError::SurfaceAcquisitionFailed(
                "render system is shut down".to_string(),
            ));
        }

        // Resolve every draw before taking the context lock.
        let draws = frame
            .draws
            .iter()
            .map(|draw| self.wgpu_device.resolve_draw(draw))
            .collect::<Result<Vec<_>, ResourceError>>()?;

        let gc_guard = self.graphics_context_shared.lock().map_err(|e| {
            ResourceError::BackendError(format!("Mutex poisoned (context): {e}"))
        })?;

        // --- 1. Acquire Frame from Swap Chain ---
        let output_surface_texture = match gc_guard.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(e @ wgpu::SurfaceError::Lost) | Err(e @ wgpu::SurfaceError::Outdated) => {
                log::warn!(
                    "WgpuRenderSystem: Swapchain surface {e:?}, reconfiguring at {}x{} and skipping the frame",
                    self.current_width,
                    self.current_height
                );
                gc_guard.reconfigure();
                return Ok(self.last_frame_stats);
            }
            Err(e @ wgpu::SurfaceError::Timeout) => {
                log::warn!("WgpuRenderSystem: Swapchain Timeout acquiring frame. ({e:?})");
                return Err(RenderError::SurfaceAcquisitionFailed(format!(
                    "Timeout: {e:?}"
                )));
            }
            Err(e) => {
                log::error!("WgpuRenderSystem: Unexpected SurfaceError: {e:?}");
                return Err(RenderError::SurfaceAcquisitionFailed(format!("{e:?}")));
            }
        };

        let target_view = output_surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = gc_guard
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Swarm Main Command Encoder"),
            });

        // --- 2. Main Render Pass ---
        let mut stats = RenderStats::default();
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Swarm Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target_view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(frame.clear_color.into_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0), // Clear to far plane (1.0)
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for draw in &draws {
                render_pass.set_pipeline(&draw.pipeline);
                if let Some(bind_group) = &draw.bind_group {
                    render_pass.set_bind_group(0, &**bind_group, &[]);
                }
                for (slot, buffer) in draw.vertex_buffers.iter().enumerate() {
                    render_pass.set_vertex_buffer(slot as u32, buffer.slice(..));
                }
                render_pass.set_index_buffer(draw.index_buffer.slice(..), draw.index_format);
                render_pass.draw_indexed(0..draw.index_count, 0, 0..draw.instance_count);

                stats.draw_calls += 1;
                stats.triangles_rendered +=
                    u64::from(draw.index_count / 3) * u64::from(draw.instance_count);
            }
        }

        // --- 3. Submit and present ---
        gc_guard.queue.submit(std::iter::once(encoder.finish()));
        output_surface_texture.present();
        drop(gc_guard);

        self.frame_count += 1;
        stats.frame_number = self.frame_count;
        self.last_frame_stats = stats;
        Ok(stats)
    }

    fn get_adapter_info(&self) -> Option<RendererAdapterInfo> {
        Some(self.wgpu_device.get_adapter_info())
    }

    fn graphics_device(&self) -> Arc<dyn GraphicsDevice> {
        self.wgpu_device.clone()
    }

    fn shutdown(&mut self) {
        if self.is_shut_down {
            return;
        }
        log::info!("WgpuRenderSystem shutting down...");
        self.wgpu_device.poll_device_blocking();
        let leaked = self.wgpu_device.live_resource_count();
        if leaked > 0 {
            log::warn!("WgpuRenderSystem: {leaked} GPU resources still registered at shutdown");
        }
        self.is_shut_down = true;
        log::info!(
            "WgpuRenderSystem: shut down after {} frames",
            self.frame_count
        );
    }
}
