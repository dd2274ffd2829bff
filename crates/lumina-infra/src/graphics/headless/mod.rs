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
//! A CPU-side graphics backend.
//!
//! Draws are not rasterized: they are recorded together with a snapshot of the
//! pipeline state (program, render state, bound target, viewport and the
//! active program's uniforms) at the moment they execute. Clears, texture
//! copies, uploads and readbacks operate on real texel storage, so passes that
//! only move data around can be verified pixel by pixel.

mod device;
mod encoder;
mod storage;

pub use self::device::HeadlessDevice;
pub use self::encoder::HeadlessCommandEncoder;

use lumina_core::renderer::{
    ClearValues, RenderState, RenderTargetId, TextureId, UniformValue, Viewport,
};
use std::collections::BTreeMap;

/// A draw as seen by the device when it executed.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    /// The active program, `None` if the last activation failed.
    pub program: Option<String>,
    /// Fixed-function state of the draw.
    pub state: RenderState,
    /// Bound target, `None` for the default framebuffer.
    pub target: Option<RenderTargetId>,
    /// Active viewport.
    pub viewport: Viewport,
    /// Debug name of the mesh.
    pub mesh: String,
    /// Vertex count of the mesh.
    pub vertex_count: usize,
    /// Every uniform set on the active program so far.
    pub uniforms: BTreeMap<String, UniformValue>,
}

impl DrawRecord {
    pub(crate) fn pending(mesh: String, vertex_count: usize) -> Self {
        Self {
            program: None,
            state: RenderState::BASELINE,
            target: None,
            viewport: Viewport::default(),
            mesh,
            vertex_count,
            uniforms: BTreeMap::new(),
        }
    }

    /// Shorthand for a uniform of this draw.
    pub fn uniform(&self, name: &str) -> Option<&UniformValue> {
        self.uniforms.get(name)
    }
}

/// One command of a submitted command buffer, in execution order.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCommand {
    /// A render target was bound.
    BindRenderTarget(RenderTargetId),
    /// The default framebuffer was bound.
    UnbindRenderTarget,
    /// The viewport changed.
    SetViewport(Viewport),
    /// The bound target was cleared.
    Clear(ClearValues),
    /// The render state changed.
    SetRenderState(RenderState),
    /// A program was activated; `None` if it does not exist.
    UseProgram(Option<String>),
    /// A uniform of the active program was set.
    SetUniform {
        /// Uniform name.
        name: String,
        /// New value.
        value: UniformValue,
    },
    /// A mesh was drawn.
    Draw(DrawRecord),
    /// A texture was copied onto another.
    CopyTexture {
        /// Texture read.
        source: TextureId,
        /// Texture written.
        destination: TextureId,
    },
    /// A depth texture was copied into the bound target's depth attachment.
    CopyDepthToBoundTarget(TextureId),
}
