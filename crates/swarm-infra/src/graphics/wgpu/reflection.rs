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

//! Front-end checks and uniform reflection for WGSL sources.

use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{AddressSpace, Module, TypeInner};
use swarm_core::renderer::{ShaderError, ShaderStage};

/// Bind group holding the per-pipeline uniform block.
pub const UNIFORM_GROUP: u32 = 0;
/// Binding of the uniform block inside [`UNIFORM_GROUP`].
pub const UNIFORM_BINDING: u32 = 0;

/// One member of a uniform block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformMember {
    pub name: String,
    pub offset: u32,
    pub size: u32,
}

/// Byte layout of the uniform struct bound at `@group(0) @binding(0)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniformBlockLayout {
    /// Total size of the struct, padding included.
    pub size: u32,
    pub members: Vec<UniformMember>,
}

impl UniformBlockLayout {
    /// Finds a member by name.
    pub fn member(&self, name: &str) -> Option<&UniformMember> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Combines the blocks declared by two stages of the same pipeline.
    ///
    /// A member present in both stages must sit at the same offset.
    pub fn merge(&self, other: &UniformBlockLayout) -> Result<UniformBlockLayout, String> {
        let mut merged = self.clone();
        merged.size = merged.size.max(other.size);
        for member in &other.members {
            match merged.member(&member.name) {
                Some(existing) if existing.offset != member.offset || existing.size != member.size => {
                    return Err(format!(
                        "uniform '{}' is declared at offset {} in one stage and {} in the other",
                        member.name, existing.offset, member.offset
                    ));
                }
                Some(_) => {}
                None => merged.members.push(member.clone()),
            }
        }
        Ok(merged)
    }
}

/// A WGSL stage that passed parsing and validation.
#[derive(Debug)]
pub struct ReflectedShader {
    pub uniforms: UniformBlockLayout,
}

/// Parses and validates one stage, then checks its entry point.
///
/// ## Errors
/// * `ShaderError::CompilationFailed` - Parse or validation failure, with the diagnostic.
/// * `ShaderError::InvalidEntryPoint` - No entry point with that name for `stage`.
pub fn reflect_wgsl(
    label: &str,
    source: &str,
    stage: ShaderStage,
    entry_point: &str,
) -> Result<ReflectedShader, ShaderError> {
    let compilation_failed = |details: String| ShaderError::CompilationFailed {
        stage,
        label: label.to_string(),
        details,
    };

    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| compilation_failed(e.emit_to_string(source)))?;

    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|e| compilation_failed(error_chain(e.as_inner())))?;

    let naga_stage = match stage {
        ShaderStage::Vertex => naga::ShaderStage::Vertex,
        ShaderStage::Fragment => naga::ShaderStage::Fragment,
    };
    if !module
        .entry_points
        .iter()
        .any(|ep| ep.name == entry_point && ep.stage == naga_stage)
    {
        return Err(ShaderError::InvalidEntryPoint {
            stage,
            entry_point: entry_point.to_string(),
        });
    }

    Ok(ReflectedShader {
        uniforms: uniform_block(&module),
    })
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

fn uniform_block(module: &Module) -> UniformBlockLayout {
    let Some(var) = module.global_variables.iter().map(|(_, var)| var).find(|var| {
        var.space == AddressSpace::Uniform
            && var
                .binding
                .as_ref()
                .is_some_and(|b| b.group == UNIFORM_GROUP && b.binding == UNIFORM_BINDING)
    }) else {
        return UniformBlockLayout::default();
    };

    let ctx = module.to_ctx();
    match &module.types[var.ty].inner {
        TypeInner::Struct { members, span } => UniformBlockLayout {
            size: *span,
            members: members
                .iter()
                .filter_map(|m| {
                    Some(UniformMember {
                        name: m.name.clone()?,
                        offset: m.offset,
                        size: module.types[m.ty].inner.size(ctx),
                    })
                })
                .collect(),
        },
        other => {
            log::warn!("Uniform binding is not a struct ({other:?}), no members reflected");
            UniformBlockLayout::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: &str = "
        struct Uniforms { scale: f32, offset: vec3<f32> }
        @group(0) @binding(0) var<uniform> u: Uniforms;
        @vertex fn vs_main(@location(0) p: vec3<f32>) -> @builtin(position) vec4<f32> {
            return vec4<f32>(p * u.scale + u.offset, 1.0);
        }";

    #[test]
    fn reflects_member_offsets() {
        let shader = reflect_wgsl("vs", VS, ShaderStage::Vertex, "vs_main").unwrap();
        let offset = shader.uniforms.member("offset").unwrap();
        assert_eq!(shader.uniforms.member("scale").unwrap().offset, 0);
        assert_eq!(offset.offset, 16);
        assert_eq!(offset.size, 12);
        assert_eq!(shader.uniforms.size, 32);
    }

    #[test]
    fn wrong_stage_is_invalid_entry_point() {
        let err = reflect_wgsl("vs", VS, ShaderStage::Fragment, "vs_main").unwrap_err();
        assert_eq!(
            err,
            ShaderError::InvalidEntryPoint {
                stage: ShaderStage::Fragment,
                entry_point: "vs_main".to_string(),
            }
        );
    }

    #[test]
    fn syntax_error_is_compilation_failure() {
        let err = reflect_wgsl("broken", "fn main( {", ShaderStage::Vertex, "main").unwrap_err();
        match err {
            ShaderError::CompilationFailed { stage, label, details } => {
                assert_eq!(stage, ShaderStage::Vertex);
                assert_eq!(label, "broken");
                assert!(!details.is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn type_error_is_compilation_failure() {
        let src = "@fragment fn fs_main() -> @location(0) vec4<f32> { return 1.0; }";
        let err = reflect_wgsl("fs", src, ShaderStage::Fragment, "fs_main").unwrap_err();
        assert!(matches!(err, ShaderError::CompilationFailed { .. }), "{err:?}");
    }

    #[test]
    fn shader_without_uniforms_has_empty_block() {
        let src = "@fragment fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }";
        let shader = reflect_wgsl("fs", src, ShaderStage::Fragment, "fs_main").unwrap();
        assert!(shader.uniforms.is_empty());
    }

    #[test]
    fn merge_rejects_conflicting_offsets() {
        let a = UniformBlockLayout {
            size: 16,
            members: vec![UniformMember { name: "time".into(), offset: 0, size: 4 }],
        };
        let b = UniformBlockLayout {
            size: 16,
            members: vec![UniformMember { name: "time".into(), offset: 4, size: 4 }],
        };
        assert!(a.merge(&b).is_err());

        let c = UniformBlockLayout {
            size: 32,
            members: vec![UniformMember { name: "light".into(), offset: 16, size: 12 }],
        };
        let merged = a.merge(&c).unwrap();
        assert_eq!(merged.size, 32);
        assert_eq!(merged.members.len(), 2);
    }
}
