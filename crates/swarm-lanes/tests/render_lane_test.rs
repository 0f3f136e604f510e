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

//! Integration tests for the instanced sphere lane driven through the
//! in-memory renderer doubles.

use std::sync::Arc;

use swarm_core::renderer::testing::{RecordingDevice, RecordingRenderSystem};
use swarm_core::renderer::{UniformLocation, UniformValue};
use swarm_core::BenchmarkConfig;
use swarm_lanes::render_lane::{InstancedSphereLane, PipelineState, CAMERA_EYE};

fn config() -> BenchmarkConfig {
    BenchmarkConfig {
        instance_count: 10_000,
        sphere_segments: 12,
        ..Default::default()
    }
}

fn locations(writes: &[(swarm_core::renderer::RenderPipelineId, UniformLocation, UniformValue)]) -> Vec<u32> {
    writes.iter().map(|(_, location, _)| location.0).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Uniform updates
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_every_resolved_uniform_is_written_each_frame() {
    // --- 1. ARRANGE ---
    let device = Arc::new(RecordingDevice::new());
    let mut system = RecordingRenderSystem::new(device.clone(), 1280, 720);
    let mut lane = InstancedSphereLane::new(&config()).with_instance_seed(11);
    lane.on_gpu_init(device.as_ref()).unwrap();
    lane.resize(1280, 720);

    // --- 2. ACT ---
    lane.render(&mut system).unwrap();

    // --- 3. ASSERT ---
    let writes = device.uniform_writes();
    let mut written = locations(&writes);
    written.sort_unstable();
    assert_eq!(written, vec![0, 64, 76, 80]);

    let camera_pos = writes
        .iter()
        .find_map(|(_, location, value)| match (location.0, value) {
            (80, UniformValue::Vec3(v)) => Some(*v),
            _ => None,
        })
        .expect("camera_pos should be written");
    assert!((camera_pos - CAMERA_EYE).length() < 1e-3);

    let time = writes
        .iter()
        .find_map(|(_, _, value)| match value {
            UniformValue::Float(t) => Some(*t),
            _ => None,
        })
        .expect("time should be written");
    assert!((0.0..5.0).contains(&time), "unexpected frame time {time}");
}

#[test]
fn test_missing_uniform_is_skipped_and_others_still_written() {
    // --- 1. ARRANGE ---
    let device = Arc::new(RecordingDevice::new().without_uniform("light_pos"));
    let mut system = RecordingRenderSystem::new(device.clone(), 640, 480);
    let mut lane = InstancedSphereLane::new(&config());
    lane.on_gpu_init(device.as_ref()).unwrap();

    // --- 2. ACT ---
    lane.render(&mut system).unwrap();
    lane.render(&mut system).unwrap();

    // --- 3. ASSERT ---
    let written = locations(&device.uniform_writes());
    assert_eq!(written.len(), 6, "three uniforms per frame for two frames");
    assert!(!written.contains(&64), "light_pos must never be written");
    assert_eq!(system.log_handle().lock().unwrap().frames.len(), 2);
}

// ─────────────────────────────────────────────────────────────────────────────
// Camera caching
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_ticks_reuse_the_cached_view_projection() {
    // --- 1. ARRANGE ---
    let device = Arc::new(RecordingDevice::new());
    let mut system = RecordingRenderSystem::new(device.clone(), 1024, 768);
    let mut lane = InstancedSphereLane::new(&config());
    lane.on_gpu_init(device.as_ref()).unwrap();
    assert!(lane.resize(1024, 768));
    let revision = lane.camera().revision();

    // --- 2. ACT ---
    for _ in 0..5 {
        lane.render(&mut system).unwrap();
    }
    let ignored = lane.resize(0, 0);

    // --- 3. ASSERT ---
    assert!(!ignored);
    assert_eq!(lane.camera().revision(), revision);
    let matrices: Vec<_> = device
        .uniform_writes()
        .into_iter()
        .filter_map(|(_, _, value)| match value {
            UniformValue::Mat4(m) => Some(m),
            _ => None,
        })
        .collect();
    assert_eq!(matrices.len(), 5);
    assert!(matrices.windows(2).all(|pair| pair[0] == pair[1]));
}

// ─────────────────────────────────────────────────────────────────────────────
// Surface lifecycle
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_surface_recreation_rebuilds_from_scratch() {
    // --- 1. ARRANGE ---
    let device = Arc::new(RecordingDevice::new());
    let mut system = RecordingRenderSystem::new(device.clone(), 800, 600);
    let mut lane = InstancedSphereLane::new(&config());
    lane.on_gpu_init(device.as_ref()).unwrap();
    lane.render(&mut system).unwrap();

    // --- 2. ACT ---
    lane.on_gpu_shutdown(device.as_ref());
    let between = device.live_object_count();
    lane.on_gpu_init(device.as_ref()).unwrap();
    let stats = lane.render(&mut system).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(between, 0);
    assert!(matches!(lane.pipeline_state(), PipelineState::Linked(_)));
    assert!(stats.is_some());
    assert_eq!(lane.frames_submitted(), 1);
}

#[test]
fn test_skipped_frames_are_not_counted() {
    // --- 1. ARRANGE ---
    let device = Arc::new(RecordingDevice::new());
    let mut system = RecordingRenderSystem::new(device.clone(), 800, 600);
    let mut lane = InstancedSphereLane::new(&config());
    lane.on_gpu_init(device.as_ref()).unwrap();
    lane.render(&mut system).unwrap();

    // --- 2. ACT ---
    system.skip_frames(2);
    let skipped: Vec<_> = (0..2).map(|_| lane.render(&mut system).unwrap()).collect();
    let presented = lane.render(&mut system).unwrap();

    // --- 3. ASSERT ---
    assert!(skipped.iter().all(Option::is_none));
    assert_eq!(presented.map(|stats| stats.frame_number), Some(2));
    assert_eq!(lane.frames_submitted(), 2);
    assert_eq!(system.log_handle().lock().unwrap().frames.len(), 2);
}
