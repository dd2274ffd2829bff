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
//! Command recording for the headless backend.

use super::{device::HeadlessDevice, DrawRecord, RecordedCommand};
use lumina_core::renderer::{
    ClearValues, CommandBufferId, CommandEncoder, GraphicsDevice, Mesh, RenderState, RenderTarget,
    ShaderError, TextureId, UniformValue, Viewport,
};

/// Records commands into a buffer the [`HeadlessDevice`] executes on submission.
#[derive(Debug)]
pub struct HeadlessCommandEncoder {
    device: HeadlessDevice,
    label: Option<String>,
    commands: Vec<RecordedCommand>,
}

impl HeadlessCommandEncoder {
    pub(crate) fn new(device: HeadlessDevice, label: Option<&str>) -> Self {
        Self {
            device,
            label: label.map(str::to_owned),
            commands: Vec::new(),
        }
    }

    /// The label given at creation.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Commands recorded so far.
    pub fn commands(&self) -> &[RecordedCommand] {
        &self.commands
    }
}

impl CommandEncoder for HeadlessCommandEncoder {
    fn bind_render_target(&mut self, target: &RenderTarget) {
        self.commands.push(RecordedCommand::BindRenderTarget(target.id));
    }

    fn unbind_render_target(&mut self) {
        self.commands.push(RecordedCommand::UnbindRenderTarget);
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.commands.push(RecordedCommand::SetViewport(viewport));
    }

    fn clear(&mut self, values: ClearValues) {
        self.commands.push(RecordedCommand::Clear(values));
    }

    fn set_render_state(&mut self, state: RenderState) {
        self.commands.push(RecordedCommand::SetRenderState(state));
    }

    fn use_program(&mut self, name: &str) -> Result<(), ShaderError> {
        if self.device.has_program(name) {
            self.commands
                .push(RecordedCommand::UseProgram(Some(name.to_owned())));
            Ok(())
        } else {
            self.commands.push(RecordedCommand::UseProgram(None));
            Err(ShaderError::NotFound {
                name: name.to_owned(),
            })
        }
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.commands.push(RecordedCommand::SetUniform {
            name: name.to_owned(),
            value,
        });
    }

    fn draw_mesh(&mut self, mesh: &Mesh) {
        self.commands.push(RecordedCommand::Draw(DrawRecord::pending(
            mesh.name.to_string(),
            mesh.vertex_count(),
        )));
    }

    fn copy_texture(&mut self, source: TextureId, destination: TextureId) {
        self.commands.push(RecordedCommand::CopyTexture {
            source,
            destination,
        });
    }

    fn copy_depth_to_bound_target(&mut self, source: TextureId) {
        self.commands
            .push(RecordedCommand::CopyDepthToBoundTarget(source));
    }

    fn finish(self: Box<Self>) -> CommandBufferId {
        if let Some(label) = &self.label {
            log::trace!(
                "HeadlessCommandEncoder: '{}' finished with {} commands",
                label,
                self.commands.len()
            );
        }
        let Self {
            device, commands, ..
        } = *self;
        device.register_command_buffer(commands)
    }
}
