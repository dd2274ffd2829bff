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

use std::fmt;

/// An error related to looking up or using a shader program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderError {
    /// No program with this name is registered with the backend.
    NotFound {
        /// The requested program name.
        name: String,
    },
    /// The program exists but could not be activated.
    ActivationFailed {
        /// The program name.
        name: String,
        /// Backend-provided details.
        details: String,
    },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::NotFound { name } => write!(f, "Shader program '{name}' not found."),
            ShaderError::ActivationFailed { name, details } => {
                write!(f, "Failed to activate shader program '{name}': {details}")
            }
        }
    }
}

impl std::error::Error for ShaderError {}

/// An error related to the management of GPU resources like textures and render targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// A shader-specific error occurred.
    Shader(ShaderError),
    /// A generic resource could not be found.
    NotFound,
    /// The handle or ID used to reference a resource is invalid.
    InvalidHandle,
    /// Uploaded or expected data does not match the resource size.
    SizeMismatch {
        /// The size in bytes the resource requires.
        expected: usize,
        /// The size in bytes that was provided.
        actual: usize,
    },
    /// An error originating from the specific graphics backend implementation.
    BackendError(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::Shader(err) => write!(f, "Shader resource error: {err}"),
            ResourceError::NotFound => write!(f, "Resource not found with ID."),
            ResourceError::InvalidHandle => write!(f, "Invalid resource handle or ID."),
            ResourceError::SizeMismatch { expected, actual } => {
                write!(f, "Resource size mismatch: expected {expected} bytes, got {actual}.")
            }
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
        }
    }
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResourceError::Shader(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ShaderError> for ResourceError {
    fn from(err: ShaderError) -> Self {
        ResourceError::Shader(err)
    }
}

/// A high-level error that can occur within the frame pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// A stage was invoked before the resources it needs were created.
    NotInitialized,
    /// A rendering operation failed and the frame could not be completed.
    RenderingFailed(String),
    /// An error occurred while managing a GPU resource.
    ResourceError(ResourceError),
    /// An unexpected or internal error occurred.
    Internal(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::NotInitialized => {
                write!(f, "The rendering system is not initialized.")
            }
            RenderError::RenderingFailed(msg) => {
                write!(f, "A rendering operation failed: {msg}")
            }
            RenderError::ResourceError(err) => {
                write!(f, "Graphics resource operation failed: {err}")
            }
            RenderError::Internal(msg) => {
                write!(f, "An internal or unexpected error occurred: {msg}")
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::ResourceError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::ResourceError(err)
    }
}

impl From<ShaderError> for RenderError {
    fn from(err: ShaderError) -> Self {
        RenderError::ResourceError(ResourceError::Shader(err))
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn shader_error_display() {
        let err = ShaderError::NotFound {
            name: "deferred".to_string(),
        };
        assert_eq!(err.to_string(), "Shader program 'deferred' not found.");
    }

    #[test]
    fn render_error_keeps_resource_source() {
        let err: RenderError = ResourceError::SizeMismatch {
            expected: 4,
            actual: 2,
        }
        .into();
        assert!(err.source().is_some());
        assert!(err.to_string().contains("expected 4 bytes"));
    }

    #[test]
    fn shader_error_converts_through_resource_error() {
        let err: RenderError = ShaderError::NotFound {
            name: "flat".to_string(),
        }
        .into();
        assert!(matches!(
            err,
            RenderError::ResourceError(ResourceError::Shader(ShaderError::NotFound { .. }))
        ));
    }
}
