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

use swarm_core::geometry::Mesh;
use swarm_core::instancing::{InstanceRecord, InstanceSet};
use swarm_core::renderer::{
    BufferDescriptor, BufferId, BufferUsage, GraphicsDevice, IndexFormat, ResourceError,
    VertexAttributeDescriptor, VertexBindingDescriptor, VertexBindingId,
    VertexBufferLayoutDescriptor, VertexFormat, VertexStepMode,
};

const POSITION_STRIDE: u64 = 12;
const NORMAL_STRIDE: u64 = 12;

const POSITION_ATTRIBUTES: [VertexAttributeDescriptor; 1] = [VertexAttributeDescriptor {
    format: VertexFormat::Float32x3,
    offset: 0,
    shader_location: 0,
}];

const NORMAL_ATTRIBUTES: [VertexAttributeDescriptor; 1] = [VertexAttributeDescriptor {
    format: VertexFormat::Float32x3,
    offset: 0,
    shader_location: 1,
}];

const INSTANCE_ATTRIBUTES: [VertexAttributeDescriptor; 2] = [
    VertexAttributeDescriptor {
        format: VertexFormat::Float32x3,
        offset: 0,
        shader_location: 2,
    },
    VertexAttributeDescriptor {
        format: VertexFormat::Float32x3,
        offset: InstanceRecord::PARAMS_OFFSET,
        shader_location: 3,
    },
];

/// Vertex slots of the sphere pipeline: positions, normals, then the
/// interleaved per-instance records.
pub fn sphere_vertex_layouts() -> [VertexBufferLayoutDescriptor<'static>; 3] {
    [
        VertexBufferLayoutDescriptor {
            array_stride: POSITION_STRIDE,
            step_mode: VertexStepMode::Vertex,
            attributes: Cow::Borrowed(&POSITION_ATTRIBUTES),
        },
        VertexBufferLayoutDescriptor {
            array_stride: NORMAL_STRIDE,
            step_mode: VertexStepMode::Vertex,
            attributes: Cow::Borrowed(&NORMAL_ATTRIBUTES),
        },
        VertexBufferLayoutDescriptor {
            array_stride: InstanceRecord::STRIDE,
            step_mode: VertexStepMode::Instance,
            attributes: Cow::Borrowed(&INSTANCE_ATTRIBUTES),
        },
    ]
}

/// Device objects backing one uploaded swarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceHandle {
    /// Per-vertex positions.
    pub position_buffer: BufferId,
    /// Per-vertex normals.
    pub normal_buffer: BufferId,
    /// Triangle indices.
    pub index_buffer: BufferId,
    /// Interleaved instance records.
    pub instance_buffer: BufferId,
    /// The binding that plugs the three vertex buffers and the index buffer together.
    pub binding: VertexBindingId,
    /// Indices per instance.
    pub index_count: u32,
    /// Number of instances uploaded.
    pub instance_count: u32,
}

impl ResourceHandle {
    fn buffers(&self) -> [BufferId; 4] {
        [
            self.position_buffer,
            self.normal_buffer,
            self.index_buffer,
            self.instance_buffer,
        ]
    }
}

/// Owns the mesh and instance buffers on the device.
///
/// The resources are live between a successful [`GpuResources::upload`] and
/// the next [`GpuResources::release`]. Releasing is idempotent.
#[derive(Debug, Default)]
pub struct GpuResources {
    live: Option<ResourceHandle>,
}

impl GpuResources {
    /// Creates an empty manager. Nothing is allocated until `upload`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while device objects are allocated.
    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }

    /// Uploads the mesh and the instances and creates the vertex binding.
    ///
    /// Any previous upload is released first. On failure every object created
    /// by this call is destroyed again and the manager stays empty.
    pub fn upload(
        &mut self,
        device: &dyn GraphicsDevice,
        mesh: &Mesh,
        instances: &InstanceSet,
    ) -> Result<&ResourceHandle, ResourceError> {
        if self.is_live() {
            log::warn!("Uploading swarm resources over a live upload; releasing the old one");
            self.release(device);
        }

        let mut created = Vec::with_capacity(4);
        let handle = match Self::create_objects(device, mesh, instances, &mut created) {
            Ok(handle) => handle,
            Err(e) => {
                for id in created {
                    if let Err(cleanup) = device.destroy_buffer(id) {
                        log::warn!("Failed to clean up buffer {id:?}: {cleanup}");
                    }
                }
                return Err(e);
            }
        };

        log::info!(
            "Uploaded swarm: {} vertices, {} indices, {} instances",
            mesh.vertex_count(),
            handle.index_count,
            handle.instance_count
        );
        Ok(self.live.insert(handle))
    }

    fn create_objects(
        device: &dyn GraphicsDevice,
        mesh: &Mesh,
        instances: &InstanceSet,
        created: &mut Vec<BufferId>,
    ) -> Result<ResourceHandle, ResourceError> {
        let mut buffer = |label: &'static str, usage: BufferUsage, data: &[u8]| {
            let id = device.create_buffer_with_data(
                &BufferDescriptor {
                    label: Some(Cow::Borrowed(label)),
                    usage,
                },
                data,
            )?;
            created.push(id);
            Ok::<_, ResourceError>(id)
        };

        let position_buffer = buffer(
            "Sphere Positions",
            BufferUsage::Vertex,
            bytemuck::cast_slice(&mesh.positions),
        )?;
        let normal_buffer = buffer(
            "Sphere Normals",
            BufferUsage::Vertex,
            bytemuck::cast_slice(&mesh.normals),
        )?;
        let index_buffer = buffer(
            "Sphere Indices",
            BufferUsage::Index,
            bytemuck::cast_slice(&mesh.indices),
        )?;
        let instance_buffer = buffer("Swarm Instances", BufferUsage::Vertex, instances.as_bytes())?;

        let binding = device.create_vertex_binding(&VertexBindingDescriptor {
            label: Some(Cow::Borrowed("Swarm Binding")),
            vertex_buffers: Cow::Owned(vec![position_buffer, normal_buffer, instance_buffer]),
            index_buffer,
            index_format: IndexFormat::Uint16,
        })?;

        Ok(ResourceHandle {
            position_buffer,
            normal_buffer,
            index_buffer,
            instance_buffer,
            binding,
            index_count: mesh.index_count() as u32,
            instance_count: instances.len() as u32,
        })
    }

    /// The live handle, ready to draw with.
    ///
    /// Calling this after `release` is a logic error: it trips a debug
    /// assertion and returns `None` in release builds.
    pub fn bind(&self) -> Option<&ResourceHandle> {
        debug_assert!(self.live.is_some(), "swarm resources used after release");
        self.live.as_ref()
    }

    /// Destroys every device object exactly once. A no-op when nothing is live.
    pub fn release(&mut self, device: &dyn GraphicsDevice) {
        let Some(handle) = self.live.take() else {
            log::debug!("Swarm resources already released");
            return;
        };

        if let Err(e) = device.destroy_vertex_binding(handle.binding) {
            log::warn!("Failed to destroy vertex binding {:?}: {e}", handle.binding);
        }
        for id in handle.buffers() {
            if let Err(e) = device.destroy_buffer(id) {
                log::warn!("Failed to destroy buffer {id:?}: {e}");
            }
        }
        log::info!("Released swarm resources");
    }
}
