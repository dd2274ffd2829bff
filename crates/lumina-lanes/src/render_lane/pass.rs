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

//! Scoped acquisition of a render target.

use lumina_core::renderer::{CommandEncoder, RenderState, RenderTarget};
use std::ops::{Deref, DerefMut};

/// A render target bound for the lifetime of the guard.
///
/// Binding happens in [`TargetPass::begin`]. Dropping the guard restores
/// [`RenderState::BASELINE`] and unbinds the target, so whatever state a stage
/// touched never leaks into the next one. Commands are recorded through the
/// guard, which dereferences to the underlying encoder.
pub struct TargetPass<'e> {
    encoder: &'e mut dyn CommandEncoder,
}

impl<'e> TargetPass<'e> {
    /// Binds `target` and starts from the baseline state.
    pub fn begin(encoder: &'e mut dyn CommandEncoder, target: &RenderTarget) -> Self {
        encoder.bind_render_target(target);
        encoder.set_render_state(RenderState::BASELINE);
        Self { encoder }
    }

    /// Starts a pass on the default framebuffer.
    pub fn begin_screen(encoder: &'e mut dyn CommandEncoder) -> Self {
        encoder.unbind_render_target();
        encoder.set_render_state(RenderState::BASELINE);
        Self { encoder }
    }
}

impl<'e> Deref for TargetPass<'e> {
    type Target = dyn CommandEncoder + 'e;

    fn deref(&self) -> &Self::Target {
        self.encoder
    }
}

impl<'e> DerefMut for TargetPass<'e> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.encoder
    }
}

impl Drop for TargetPass<'_> {
    fn drop(&mut self) {
        self.encoder.set_render_state(RenderState::BASELINE);
        self.encoder.unbind_render_target();
    }
}
