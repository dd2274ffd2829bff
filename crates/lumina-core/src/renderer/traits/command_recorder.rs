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

//! Defines the trait for recording rendering commands.

use crate::renderer::api::{
    ClearValues, CommandBufferId, Mesh, RenderState, RenderTarget, TextureId, UniformValue,
    Viewport,
};
use crate::renderer::error::ShaderError;

/// Records an ordered stream of rendering commands.
///
/// Commands are executed in recording order once the finished buffer is
/// submitted to the [`GraphicsDevice`](super::GraphicsDevice). The encoder
/// models an immediate-style state machine: the bound target, viewport,
/// render state, active program and uniforms persist until changed.
pub trait CommandEncoder {
    /// Makes `target` the destination of subsequent clears and draws and
    /// sets the viewport to cover it.
    fn bind_render_target(&mut self, target: &RenderTarget);

    /// Returns to the default framebuffer and restores its full viewport.
    fn unbind_render_target(&mut self);

    /// Restricts subsequent draws to a rectangle of the bound target.
    fn set_viewport(&mut self, viewport: Viewport);

    /// Clears the attachments of the bound target.
    fn clear(&mut self, values: ClearValues);

    /// Replaces the fixed-function state used by subsequent draws.
    fn set_render_state(&mut self, state: RenderState);

    /// Activates the program registered under `name`.
    ///
    /// ## Errors
    /// * `ShaderError::NotFound` - No such program exists. The previously
    ///   active program is deactivated so stray draws are ignored.
    fn use_program(&mut self, name: &str) -> Result<(), ShaderError>;

    /// Binds a value to a named uniform of the active program.
    fn set_uniform(&mut self, name: &str, value: UniformValue);

    /// Draws `mesh` with the active program, state and uniforms.
    fn draw_mesh(&mut self, mesh: &Mesh);

    /// Copies the full contents of `source` into `destination`.
    fn copy_texture(&mut self, source: TextureId, destination: TextureId);

    /// Copies a depth texture into the depth attachment of the bound target.
    fn copy_depth_to_bound_target(&mut self, source: TextureId);

    /// Finalizes the command recording and returns a handle to the resulting command buffer.
    ///
    /// This method consumes the encoder. The returned [`CommandBufferId`] can then
    /// be submitted to the [`GraphicsDevice`](super::GraphicsDevice)'s queue.
    fn finish(self: Box<Self>) -> CommandBufferId;
}
