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

//! Defines the trait for creating and reading back GPU resources.

use crate::renderer::api::{
    CommandBufferId, RenderTarget, RenderTargetDescriptor, RenderTargetId, TextureDescriptor,
    TextureId,
};
use crate::renderer::error::ResourceError;
use crate::renderer::traits::CommandEncoder;
use std::fmt::Debug;

/// A graphics device owning textures, render targets and a command queue.
///
/// Methods take `&self`: implementations synchronize their own resource tables.
pub trait GraphicsDevice: Send + Sync + Debug + 'static {
    /// Creates a texture.
    /// ## Errors
    /// * `ResourceError` - If the backend cannot allocate the texture.
    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError>;

    /// Destroys a texture.
    /// ## Errors
    /// * `ResourceError::NotFound` - If the texture does not exist.
    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError>;

    /// Returns the descriptor a texture was created with.
    fn texture_descriptor(&self, id: TextureId) -> Option<TextureDescriptor<'static>>;

    /// Replaces the full contents of a texture.
    ///
    /// `data` is tightly packed, rows top-down, in the texture's format.
    /// ## Errors
    /// * `ResourceError::SizeMismatch` - If `data` does not cover the texture exactly.
    fn write_texture(&self, id: TextureId, data: &[u8]) -> Result<(), ResourceError>;

    /// Reads the full contents of a texture back to CPU memory.
    ///
    /// This blocks the calling thread until every submitted command writing the
    /// texture has completed. The layout matches [`GraphicsDevice::write_texture`].
    /// ## Errors
    /// * `ResourceError::NotFound` - If the texture does not exist.
    fn read_texture(&self, id: TextureId) -> Result<Vec<u8>, ResourceError>;

    /// Creates a render target and the textures backing its attachments.
    /// ## Errors
    /// * `ResourceError` - If any attachment cannot be allocated.
    fn create_render_target(
        &self,
        descriptor: &RenderTargetDescriptor,
    ) -> Result<RenderTarget, ResourceError>;

    /// Destroys a render target together with its attachment textures.
    /// ## Errors
    /// * `ResourceError::NotFound` - If the target does not exist.
    fn destroy_render_target(&self, id: RenderTargetId) -> Result<(), ResourceError>;

    /// Whether a program with this name can be activated.
    fn has_program(&self, name: &str) -> bool;

    /// Creates a new command encoder.
    fn create_command_encoder(&self, label: Option<&str>) -> Box<dyn CommandEncoder>;

    /// Executes a finished command buffer. Buffers execute in submission order.
    /// ## Errors
    /// * `ResourceError::InvalidHandle` - If the buffer was already submitted or never finished.
    fn submit_command_buffer(&self, id: CommandBufferId) -> Result<(), ResourceError>;
}
