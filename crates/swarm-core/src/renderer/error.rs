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

//! Defines the hierarchy of error types for the rendering subsystem.

use crate::renderer::api::{RenderPipelineId, ShaderModuleId, ShaderStage};
use std::fmt;

/// An error related to the compilation of a single shader stage.
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderError {
    /// The stage failed to parse or validate.
    CompilationFailed {
        /// Which stage failed.
        stage: ShaderStage,
        /// A descriptive label for the shader.
        label: String,
        /// Diagnostic text from the shader compiler.
        details: String,
    },
    /// The requested entry point does not exist for the stage.
    InvalidEntryPoint {
        /// Which stage was searched.
        stage: ShaderStage,
        /// The missing entry point name.
        entry_point: String,
    },
    /// The requested shader module could not be found.
    NotFound {
        /// The ID of the shader module that was not found.
        id: ShaderModuleId,
    },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::CompilationFailed {
                stage,
                label,
                details,
            } => {
                write!(f, "{stage} shader compilation failed for '{label}': {details}")
            }
            ShaderError::InvalidEntryPoint { stage, entry_point } => {
                write!(f, "{stage} entry point '{entry_point}' not found")
            }
            ShaderError::NotFound { id } => {
                write!(f, "Shader module not found for ID: {id:?}")
            }
        }
    }
}

impl std::error::Error for ShaderError {}

/// An error related to linking stages into a render pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// The backend rejected the combination of stages and fixed-function state.
    LinkFailed {
        /// A descriptive label for the pipeline, if available.
        label: Option<String>,
        /// Detailed error messages from the backend.
        details: String,
    },
    /// A shader module provided for the pipeline was invalid or missing.
    InvalidShaderModule {
        /// The ID of the invalid shader module.
        id: ShaderModuleId,
    },
    /// The specified render pipeline ID is not valid.
    InvalidRenderPipeline {
        /// The ID of the invalid render pipeline.
        id: RenderPipelineId,
    },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::LinkFailed { label, details } => {
                write!(
                    f,
                    "Pipeline link failed for '{}': {}",
                    label.as_deref().unwrap_or("Unknown"),
                    details
                )
            }
            PipelineError::InvalidShaderModule { id } => {
                write!(f, "Invalid shader module {id:?} for pipeline")
            }
            PipelineError::InvalidRenderPipeline { id } => {
                write!(f, "Invalid render pipeline ID: {id:?}")
            }
        }
    }
}

impl std::error::Error for PipelineError {}

/// An error related to the creation or use of a GPU resource.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// A shader-specific error occurred.
    Shader(ShaderError),
    /// A pipeline-specific error occurred.
    Pipeline(PipelineError),
    /// A generic resource could not be found.
    NotFound,
    /// An error originating from the specific graphics backend implementation.
    BackendError(String),
    /// An attempt was made to write outside a resource (e.g. past the end of a uniform block).
    OutOfBounds,
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::Shader(err) => write!(f, "Shader resource error: {err}"),
            ResourceError::Pipeline(err) => write!(f, "Pipeline resource error: {err}"),
            ResourceError::NotFound => write!(f, "Resource not found with ID."),
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
            ResourceError::OutOfBounds => write!(f, "Resource access out of bounds."),
        }
    }
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResourceError::Shader(err) => Some(err),
            ResourceError::Pipeline(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ShaderError> for ResourceError {
    fn from(err: ShaderError) -> Self {
        ResourceError::Shader(err)
    }
}

impl From<PipelineError> for ResourceError {
    fn from(err: PipelineError) -> Self {
        ResourceError::Pipeline(err)
    }
}

/// A high-level error from the render system.
#[derive(Debug)]
pub enum RenderError {
    /// The adapter is below the minimum capability level. Rendering is abandoned
    /// entirely; there is no degraded mode.
    UnsupportedPlatform {
        /// What requirement was not met.
        reason: String,
    },
    /// Backend initialization failed for another reason.
    InitializationFailed(String),
    /// The next swapchain image could not be acquired.
    SurfaceAcquisitionFailed(String),
    /// A resource-level failure surfaced during rendering.
    Resource(ResourceError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::UnsupportedPlatform { reason } => {
                write!(f, "Unsupported platform: {reason}")
            }
            RenderError::InitializationFailed(msg) => {
                write!(f, "Render system initialization failed: {msg}")
            }
            RenderError::SurfaceAcquisitionFailed(msg) => {
                write!(f, "Failed to acquire surface texture: {msg}")
            }
            RenderError::Resource(err) => write!(f, "Render resource error: {err}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Resource(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::Resource(err)
    }
}
