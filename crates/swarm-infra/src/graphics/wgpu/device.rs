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

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use wgpu::util::DeviceExt;

use swarm_core::renderer::{
    BufferDescriptor, BufferId, DrawCommand, GraphicsDevice, PipelineError, RenderPipelineDescriptor,
    RenderPipelineId, RendererAdapterInfo, ResourceError, ShaderError, ShaderModuleDescriptor,
    ShaderModuleId, ShaderSourceData, ShaderStage, UniformLocation, UniformValue,
    VertexBindingDescriptor, VertexBindingId,
};

use super::context::{WgpuGraphicsContext, DEPTH_FORMAT};
use super::conversions::{adapter_info_from_wgpu, IntoWgpu};
use super::reflection::{self, UniformBlockLayout, UNIFORM_BINDING};

#[derive(Debug)]
struct WgpuShaderModuleEntry {
    wgpu_module: Arc<wgpu::ShaderModule>,
    stage: ShaderStage,
    entry_point: String,
    uniforms: UniformBlockLayout,
}

#[derive(Debug)]
struct WgpuRenderPipelineEntry {
    wgpu_pipeline: Arc<wgpu::RenderPipeline>,
    /// `None` when neither stage declares a uniform block.
    uniform_buffer: Option<Arc<wgpu::Buffer>>,
    bind_group: Option<Arc<wgpu::BindGroup>>,
    uniforms: UniformBlockLayout,
}

#[derive(Debug)]
struct WgpuBufferEntry {
    wgpu_buffer: Arc<wgpu::Buffer>,
    size: u64,
}

#[derive(Debug)]
struct WgpuVertexBindingEntry {
    vertex_buffers: Vec<Arc<wgpu::Buffer>>,
    index_buffer: Arc<wgpu::Buffer>,
    index_format: wgpu::IndexFormat,
}

/// Everything a render pass needs for one [`DrawCommand`], resolved up front
/// so no registry lock is held while recording.
#[derive(Debug)]
pub(crate) struct ResolvedDraw {
    pub(crate) pipeline: Arc<wgpu::RenderPipeline>,
    pub(crate) bind_group: Option<Arc<wgpu::BindGroup>>,
    pub(crate) vertex_buffers: Vec<Arc<wgpu::Buffer>>,
    pub(crate) index_buffer: Arc<wgpu::Buffer>,
    pub(crate) index_format: wgpu::IndexFormat,
    pub(crate) index_count: u32,
    pub(crate) instance_count: u32,
}

/// The internal, non-clonable state of the WgpuDevice.
#[derive(Debug)]
pub struct WgpuDeviceInternal {
    context: Arc<Mutex<WgpuGraphicsContext>>,
    adapter_info: RendererAdapterInfo,
    shader_modules: Mutex<HashMap<ShaderModuleId, WgpuShaderModuleEntry>>,
    pipelines: Mutex<HashMap<RenderPipelineId, WgpuRenderPipelineEntry>>,
    buffers: Mutex<HashMap<BufferId, WgpuBufferEntry>>,
    vertex_bindings: Mutex<HashMap<VertexBindingId, WgpuVertexBindingEntry>>,

    next_shader_id: AtomicUsize,
    next_pipeline_id: AtomicUsize,
    next_buffer_id: AtomicUsize,
    next_binding_id: AtomicUsize,
}

/// A clonable, thread-safe handle to the WGPU graphics device.
/// It wraps the actual device state (`WgpuDeviceInternal`) in an Arc,
/// allowing it to be shared with the render system that owns the surface.
#[derive(Clone, Debug)]
pub struct WgpuDevice {
    internal: Arc<WgpuDeviceInternal>,
}

fn poisoned(what: &str, e: impl std::fmt::Display) -> ResourceError {
    ResourceError::BackendError(format!("Mutex poisoned ({what}): {e}"))
}

impl WgpuDevice {
    pub fn new(context: Arc<Mutex<WgpuGraphicsContext>>) -> Result<Self, ResourceError> {
        let adapter_info = {
            let guard = context.lock().map_err(|e| poisoned("context", e))?;
            adapter_info_from_wgpu(&guard.adapter_info)
        };
        Ok(Self {
            internal: Arc::new(WgpuDeviceInternal {
                context,
                adapter_info,
                shader_modules: Mutex::new(HashMap::new()),
                pipelines: Mutex::new(HashMap::new()),
                buffers: Mutex::new(HashMap::new()),
                vertex_bindings: Mutex::new(HashMap::new()),
                next_shader_id: AtomicUsize::new(0),
                next_pipeline_id: AtomicUsize::new(0),
                next_buffer_id: AtomicUsize::new(0),
                next_binding_id: AtomicUsize::new(0),
            }),
        })
    }

    // --- ID Generation Helpers ---

    fn generate_shader_id(&self) -> ShaderModuleId {
        ShaderModuleId(self.internal.next_shader_id.fetch_add(1, Ordering::Relaxed))
    }

    fn generate_pipeline_id(&self) -> RenderPipelineId {
        RenderPipelineId(
            self.internal
                .next_pipeline_id
                .fetch_add(1, Ordering::Relaxed),
        )
    }

    fn generate_buffer_id(&self) -> BufferId {
        BufferId(self.internal.next_buffer_id.fetch_add(1, Ordering::Relaxed))
    }

    fn generate_binding_id(&self) -> VertexBindingId {
        VertexBindingId(
            self.internal
                .next_binding_id
                .fetch_add(1, Ordering::Relaxed),
        )
    }

    /// Helper function to execute an operation with the graphics context locked.
    /// Returns a Result to propagate lock errors or operation errors.
    fn with_wgpu_context<F, R>(&self, operation: F) -> Result<R, ResourceError>
    where
        F: FnOnce(&WgpuGraphicsContext) -> Result<R, ResourceError>,
    {
        let context_guard = self.internal.context.lock().map_err(|e| {
            ResourceError::BackendError(format!("Failed to lock WgpuGraphicsContext: {e}"))
        })?;
        operation(&context_guard)
    }

    /// Resolves the pipeline, bind group and buffers of a draw.
    pub(crate) fn resolve_draw(&self, draw: &DrawCommand) -> Result<ResolvedDraw, ResourceError> {
        let (pipeline, bind_group) = {
            let pipelines = self
                .internal
                .pipelines
                .lock()
                .map_err(|e| poisoned("pipelines", e))?;
            let entry = pipelines.get(&draw.pipeline).ok_or(PipelineError::InvalidRenderPipeline {
                id: draw.pipeline,
            })?;
            (entry.wgpu_pipeline.clone(), entry.bind_group.clone())
        };

        let bindings = self
            .internal
            .vertex_bindings
            .lock()
            .map_err(|e| poisoned("vertex_bindings", e))?;
        let binding = bindings.get(&draw.binding).ok_or(ResourceError::NotFound)?;

        Ok(ResolvedDraw {
            pipeline,
            bind_group,
            vertex_buffers: binding.vertex_buffers.clone(),
            index_buffer: binding.index_buffer.clone(),
            index_format: binding.index_format,
            index_count: draw.index_count,
            instance_count: draw.instance_count,
        })
    }

    /// Blocks until all submitted GPU work has completed.
    pub fn poll_device_blocking(&self) {
        let result = self.with_wgpu_context(|context| {
            context
                .device
                .poll(wgpu::PollType::Wait)
                .map(|_| ())
                .map_err(|e| ResourceError::BackendError(format!("Device poll failed: {e}")))
        });
        if let Err(e) = result {
            log::warn!("WgpuDevice: {e}");
        }
    }

    /// Number of resources still registered on this device.
    pub fn live_resource_count(&self) -> usize {
        fn len_of<K, V>(map: &Mutex<HashMap<K, V>>) -> usize {
            map.lock().map(|m| m.len()).unwrap_or(0)
        }
        len_of(&self.internal.shader_modules)
            + len_of(&self.internal.pipelines)
            + len_of(&self.internal.buffers)
            + len_of(&self.internal.vertex_bindings)
    }

    fn module_for_pipeline(
        modules: &HashMap<ShaderModuleId, WgpuShaderModuleEntry>,
        id: ShaderModuleId,
        stage: ShaderStage,
    ) -> Result<(Arc<wgpu::ShaderModule>, String, UniformBlockLayout), ResourceError> {
        match modules.get(&id) {
            Some(entry) if entry.stage == stage => Ok((
                entry.wgpu_module.clone(),
                entry.entry_point.clone(),
                entry.uniforms.clone(),
            )),
            Some(entry) => {
                log::error!(
                    "WgpuDevice: module {id:?} is a {} stage, expected {stage}",
                    entry.stage
                );
                Err(PipelineError::InvalidShaderModule { id }.into())
            }
            None => Err(PipelineError::InvalidShaderModule { id }.into()),
        }
    }
}

impl GraphicsDevice for WgpuDevice {
    // --- Shader Module Operations ---

    fn create_shader_module(
        &self,
        descriptor: &ShaderModuleDescriptor,
    ) -> Result<ShaderModuleId, ResourceError> {
        let ShaderSourceData::Wgsl(source) = &descriptor.source;
        let label = descriptor.label;

        // Front-end checks first so the caller gets a stage-tagged diagnostic.
        let reflected = reflection::reflect_wgsl(
            label,
            source,
            descriptor.stage,
            descriptor.entry_point,
        )
        .inspect_err(|e| log::error!("WgpuDevice: {e}"))?;

        let wgpu_module = self.with_wgpu_context(|context| {
            log::debug!("WgpuDevice: Creating wgpu::ShaderModule with label: {label:?}");
            context.device.push_error_scope(wgpu::ErrorFilter::Validation);
            let module = context
                .device
                .create_shader_module(wgpu::ShaderModuleDescriptor {
                    label: Some(label),
                    source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(source.as_ref())),
                });
            match pollster::block_on(context.device.pop_error_scope()) {
                Some(err) => Err(ShaderError::CompilationFailed {
                    stage: descriptor.stage,
                    label: label.to_string(),
                    details: err.to_string(),
                }
                .into()),
                None => Ok(Arc::new(module)),
            }
        })?;

        let id = self.generate_shader_id();
        self.internal
            .shader_modules
            .lock()
            .map_err(|e| poisoned("shader_modules", e))?
            .insert(
                id,
                WgpuShaderModuleEntry {
                    wgpu_module,
                    stage: descriptor.stage,
                    entry_point: descriptor.entry_point.to_string(),
                    uniforms: reflected.uniforms,
                },
            );

        log::info!(
            "WgpuDevice: Successfully created {} shader module '{label}' with ID: {id:?}",
            descriptor.stage
        );
        Ok(id)
    }

    fn destroy_shader_module(&self, id: ShaderModuleId) -> Result<(), ResourceError> {
        let mut modules_guard = self
            .internal
            .shader_modules
            .lock()
            .map_err(|e| poisoned("shader_modules", e))?;

        if modules_guard.remove(&id).is_some() {
            log::debug!("WgpuDevice: Destroyed shader module with ID: {id:?}");
            Ok(())
        } else {
            Err(ShaderError::NotFound { id }.into())
        }
    }

    // -- Render Pipeline Operations ---

    fn create_render_pipeline(
        &self,
        descriptor: &RenderPipelineDescriptor,
    ) -> Result<RenderPipelineId, ResourceError> {
        let label = descriptor.label.as_deref();
        log::debug!("WgpuDevice: Creating render pipeline with label: {label:?}");

        // 1. Resolve both stages, then release the module registry.
        let ((vs_module, vs_entry, vs_uniforms), (fs_module, fs_entry, fs_uniforms)) = {
            let modules = self
                .internal
                .shader_modules
                .lock()
                .map_err(|e| poisoned("shader_modules", e))?;
            (
                Self::module_for_pipeline(&modules, descriptor.vertex_module, ShaderStage::Vertex)?,
                Self::module_for_pipeline(
                    &modules,
                    descriptor.fragment_module,
                    ShaderStage::Fragment,
                )?,
            )
        };

        let link_failed = |details: String| -> ResourceError {
            PipelineError::LinkFailed {
                label: label.map(String::from),
                details,
            }
            .into()
        };

        // 2. Both stages share one uniform block.
        let uniforms = vs_uniforms.merge(&fs_uniforms).map_err(link_failed)?;

        // 3. Convert vertex buffers layout
        let wgpu_vertex_attributes_storage: Vec<Vec<wgpu::VertexAttribute>> = descriptor
            .vertex_buffers
            .iter()
            .map(|vb_layout_desc| {
                vb_layout_desc
                    .attributes
                    .iter()
                    .map(|attr_desc| wgpu::VertexAttribute {
                        format: attr_desc.format.into_wgpu(),
                        offset: attr_desc.offset,
                        shader_location: attr_desc.shader_location,
                    })
                    .collect()
            })
            .collect();

        let wgpu_vertex_buffers_layouts: Vec<wgpu::VertexBufferLayout> = descriptor
            .vertex_buffers
            .iter()
            .zip(wgpu_vertex_attributes_storage.iter())
            .map(
                |(vb_layout_desc, attributes_for_this_layout)| wgpu::VertexBufferLayout {
                    array_stride: vb_layout_desc.array_stride,
                    step_mode: vb_layout_desc.step_mode.into_wgpu(),
                    attributes: attributes_for_this_layout,
                },
            )
            .collect();

        // 4. Link inside an error scope so validation failures come back as errors.
        let entry = self.with_wgpu_context(|context| {
            let device = &context.device;
            device.push_error_scope(wgpu::ErrorFilter::Validation);

            let uniform_resources = (!uniforms.is_empty()).then(|| {
                let bind_group_layout =
                    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                        label: Some("Swarm Uniforms Layout"),
                        entries: &[wgpu::BindGroupLayoutEntry {
                            binding: UNIFORM_BINDING,
                            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                            ty: wgpu::BindingType::Buffer {
                                ty: wgpu::BufferBindingType::Uniform,
                                has_dynamic_offset: false,
                                min_binding_size: None,
                            },
                            count: None,
                        }],
                    });
                // Uniform buffers are sized in multiples of 16 bytes.
                let size = u64::from(uniforms.size).next_multiple_of(16);
                let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("Swarm Uniforms"),
                    size,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("Swarm Uniforms Bind Group"),
                    layout: &bind_group_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: UNIFORM_BINDING,
                        resource: buffer.as_entire_binding(),
                    }],
                });
                (bind_group_layout, buffer, bind_group)
            });

            let bind_group_layouts: Vec<&wgpu::BindGroupLayout> = uniform_resources
                .iter()
                .map(|(layout, _, _)| layout)
                .collect();
            let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label,
                bind_group_layouts: &bind_group_layouts,
                push_constant_ranges: &[],
            });

            let color_target_states = [Some(wgpu::ColorTargetState {
                format: context.surface_config.format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })];

            // The pass always carries a depth attachment, so the pipeline
            // declares the format even with depth testing off.
            let depth_stencil = Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: descriptor.depth_test,
                depth_compare: if descriptor.depth_test {
                    wgpu::CompareFunction::Less
                } else {
                    wgpu::CompareFunction::Always
                },
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            });

            let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label,
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &vs_module,
                    entry_point: Some(&vs_entry),
                    buffers: &wgpu_vertex_buffers_layouts,
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &fs_module,
                    entry_point: Some(&fs_entry),
                    targets: &color_target_states,
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: descriptor.cull_mode.into_wgpu(),
                    unclipped_depth: false,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    conservative: false,
                },
                depth_stencil,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

            if let Some(err) = pollster::block_on(device.pop_error_scope()) {
                return Err(link_failed(err.to_string()));
            }

            let (uniform_buffer, bind_group) = match uniform_resources {
                Some((_, buffer, bind_group)) => (Some(Arc::new(buffer)), Some(Arc::new(bind_group))),
                None => (None, None),
            };
            Ok(WgpuRenderPipelineEntry {
                wgpu_pipeline: Arc::new(pipeline),
                uniform_buffer,
                bind_group,
                uniforms,
            })
        });

        let entry = entry.inspect_err(|e| log::error!("WgpuDevice: {e}"))?;
        let id = self.generate_pipeline_id();
        log::info!(
            "WgpuDevice: Successfully created render pipeline '{}' with ID: {id:?} ({} uniforms, {} bytes)",
            label.unwrap_or_default(),
            entry.uniforms.members.len(),
            entry.uniforms.size
        );
        self.internal
            .pipelines
            .lock()
            .map_err(|e| poisoned("pipelines", e))?
            .insert(id, entry);
        Ok(id)
    }

    fn destroy_render_pipeline(&self, id: RenderPipelineId) -> Result<(), ResourceError> {
        let mut pipelines_guard = self
            .internal
            .pipelines
            .lock()
            .map_err(|e| poisoned("pipelines", e))?;

        if pipelines_guard.remove(&id).is_some() {
            log::debug!("WgpuDevice: Destroyed render pipeline with ID: {id:?}");
            Ok(())
        } else {
            Err(PipelineError::InvalidRenderPipeline { id }.into())
        }
    }

    // --- Uniforms ---

    fn uniform_location(&self, pipeline: RenderPipelineId, name: &str) -> Option<UniformLocation> {
        let pipelines = match self.internal.pipelines.lock() {
            Ok(guard) => guard,
            Err(e) => {
                log::error!("WgpuDevice: {}", poisoned("pipelines", e));
                return None;
            }
        };
        pipelines
            .get(&pipeline)?
            .uniforms
            .member(name)
            .map(|member| UniformLocation(member.offset))
    }

    fn set_uniform(
        &self,
        pipeline: RenderPipelineId,
        location: UniformLocation,
        value: UniformValue,
    ) -> Result<(), ResourceError> {
        let bytes = value.as_bytes();
        let buffer = {
            let pipelines = self
                .internal
                .pipelines
                .lock()
                .map_err(|e| poisoned("pipelines", e))?;
            let entry = pipelines
                .get(&pipeline)
                .ok_or(PipelineError::InvalidRenderPipeline { id: pipeline })?;
            let end = u64::from(location.0) + bytes.len() as u64;
            match &entry.uniform_buffer {
                Some(buffer) if end <= u64::from(entry.uniforms.size) => buffer.clone(),
                _ => return Err(ResourceError::OutOfBounds),
            }
        };

        self.with_wgpu_context(|context| {
            context
                .queue
                .write_buffer(&buffer, u64::from(location.0), bytes);
            Ok(())
        })
    }

    // --- Buffer Operations ---

    fn create_buffer_with_data(
        &self,
        descriptor: &BufferDescriptor,
        data: &[u8],
    ) -> Result<BufferId, ResourceError> {
        let label = descriptor.label.as_deref();
        let wgpu_buffer = self.with_wgpu_context(|context| {
            Ok(context
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label,
                    contents: data,
                    usage: descriptor.usage.into_wgpu() | wgpu::BufferUsages::COPY_DST,
                }))
        })?;

        let id = self.generate_buffer_id();
        let size = data.len() as u64;
        self.internal
            .buffers
            .lock()
            .map_err(|e| poisoned("buffers", e))?
            .insert(
                id,
                WgpuBufferEntry {
                    wgpu_buffer: Arc::new(wgpu_buffer),
                    size,
                },
            );

        log::info!(
            "WgpuDevice: Created buffer '{}' with initial data. ID: {id:?}, size: {size} bytes",
            label.unwrap_or_default()
        );
        Ok(id)
    }

    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        let mut buffers = self
            .internal
            .buffers
            .lock()
            .map_err(|e| poisoned("buffers", e))?;

        if let Some(entry) = buffers.remove(&id) {
            log::debug!(
                "WgpuDevice: Destroyed buffer with ID: {id:?} ({} bytes)",
                entry.size
            );
            Ok(())
        } else {
            Err(ResourceError::NotFound)
        }
    }

    // --- Vertex Bindings ---

    fn create_vertex_binding(
        &self,
        descriptor: &VertexBindingDescriptor,
    ) -> Result<VertexBindingId, ResourceError> {
        let entry = {
            let buffers = self
                .internal
                .buffers
                .lock()
                .map_err(|e| poisoned("buffers", e))?;
            let lookup = |id: &BufferId| {
                buffers
                    .get(id)
                    .map(|entry| entry.wgpu_buffer.clone())
                    .ok_or(ResourceError::NotFound)
            };
            WgpuVertexBindingEntry {
                vertex_buffers: descriptor
                    .vertex_buffers
                    .iter()
                    .map(lookup)
                    .collect::<Result<_, _>>()?,
                index_buffer: lookup(&descriptor.index_buffer)?,
                index_format: descriptor.index_format.into_wgpu(),
            }
        };

        let id = self.generate_binding_id();
        self.internal
            .vertex_bindings
            .lock()
            .map_err(|e| poisoned("vertex_bindings", e))?
            .insert(id, entry);
        log::debug!(
            "WgpuDevice: Created vertex binding '{}' with ID: {id:?}",
            descriptor.label.as_deref().unwrap_or_default()
        );
        Ok(id)
    }

    fn destroy_vertex_binding(&self, id: VertexBindingId) -> Result<(), ResourceError> {
        let mut bindings = self
            .internal
            .vertex_bindings
            .lock()
            .map_err(|e| poisoned("vertex_bindings", e))?;

        if bindings.remove(&id).is_some() {
            log::debug!("WgpuDevice: Destroyed vertex binding with ID: {id:?}");
            Ok(())
        } else {
            Err(ResourceError::NotFound)
        }
    }

    fn get_adapter_info(&self) -> RendererAdapterInfo {
        self.internal.adapter_info.clone()
    }
}
