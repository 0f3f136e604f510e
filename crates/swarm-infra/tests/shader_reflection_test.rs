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

use swarm_core::renderer::{ShaderError, ShaderStage};
use swarm_infra::graphics::wgpu::reflect_wgsl;
use swarm_lanes::render_lane::shaders::{
    FRAGMENT_ENTRY_POINT, SPHERE_INSTANCED_WGSL, SPHERE_PHONG_WGSL, UNIFORM_NAMES,
    VERTEX_ENTRY_POINT,
};

// ─── Built-in sphere shaders ──────────────────────────────────────────────

#[test]
fn sphere_stages_validate_and_share_the_uniform_layout() {
    // --- 1. ARRANGE ---
    let expected = [
        ("view_projection", 0, 64),
        ("light_pos", 64, 12),
        ("time", 76, 4),
        ("camera_pos", 80, 12),
    ];

    // --- 2. ACT ---
    let vertex = reflect_wgsl(
        "sphere_instanced",
        SPHERE_INSTANCED_WGSL,
        ShaderStage::Vertex,
        VERTEX_ENTRY_POINT,
    )
    .expect("vertex stage should validate");
    let fragment = reflect_wgsl(
        "sphere_phong",
        SPHERE_PHONG_WGSL,
        ShaderStage::Fragment,
        FRAGMENT_ENTRY_POINT,
    )
    .expect("fragment stage should validate");
    let merged = vertex.uniforms.merge(&fragment.uniforms).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(merged.size, 96);
    for (name, offset, size) in expected {
        let member = merged.member(name).unwrap_or_else(|| panic!("missing {name}"));
        assert_eq!(member.offset, offset, "offset of {name}");
        assert_eq!(member.size, size, "size of {name}");
    }
    for name in UNIFORM_NAMES {
        assert!(merged.member(name).is_some());
    }
}

#[test]
fn vertex_source_is_not_a_fragment_stage() {
    // --- 1. ARRANGE & 2. ACT ---
    let err = reflect_wgsl(
        "sphere_instanced",
        SPHERE_INSTANCED_WGSL,
        ShaderStage::Fragment,
        FRAGMENT_ENTRY_POINT,
    )
    .unwrap_err();

    // --- 3. ASSERT ---
    assert!(matches!(err, ShaderError::InvalidEntryPoint { stage: ShaderStage::Fragment, .. }));
}

// ─── Broken sources ───────────────────────────────────────────────────────

#[test]
fn misspelled_identifier_reports_the_stage_and_label() {
    // --- 1. ARRANGE ---
    let broken = SPHERE_PHONG_WGSL.replace("uniforms.light_pos", "uniforms.lite_pos");

    // --- 2. ACT ---
    let err = reflect_wgsl("sphere_phong", &broken, ShaderStage::Fragment, FRAGMENT_ENTRY_POINT)
        .unwrap_err();

    // --- 3. ASSERT ---
    match err {
        ShaderError::CompilationFailed { stage, label, details } => {
            assert_eq!(stage, ShaderStage::Fragment);
            assert_eq!(label, "sphere_phong");
            assert!(details.contains("lite_pos"), "{details}");
        }
        other => panic!("expected a compilation failure, got {other:?}"),
    }
}
