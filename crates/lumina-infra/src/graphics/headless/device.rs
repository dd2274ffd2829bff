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
//! The headless implementation of [`GraphicsDevice`].

use super::{
    encoder::HeadlessCommandEncoder, storage::TextureStorage, DrawRecord, RecordedCommand,
};
use ahash::{AHashMap, AHashSet};
use lumina_core::renderer::{
    api::program, ClearValues, CommandBufferId, CommandEncoder, GraphicsDevice, RenderState,
    RenderTarget, RenderTargetDescriptor, RenderTargetId, ResourceError, TextureDescriptor,
    TextureFormat, TextureId, UniformValue, Viewport,
};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Size of the default framebuffer until [`HeadlessDevice::set_screen_size`] is called.
pub const DEFAULT_SCREEN_SIZE: (u32, u32) = (800, 600);

/// Pipeline state carried from one executed command to the next.
#[derive(Debug)]
struct PipelineState {
    target: Option<RenderTargetId>,
    viewport: Viewport,
    render_state: RenderState,
    program: Option<String>,
    /// Uniforms persist per program, as with GL program objects.
    uniforms: AHashMap<String, BTreeMap<String, UniformValue>>,
}

#[derive(Debug)]
struct HeadlessDeviceInternal {
    programs: AHashSet<String>,
    screen_size: Mutex<(u32, u32)>,
    textures: Mutex<AHashMap<TextureId, TextureStorage>>,
    render_targets: Mutex<AHashMap<RenderTargetId, RenderTarget>>,
    pipeline: Mutex<PipelineState>,

    next_texture_id: AtomicUsize,
    next_render_target_id: AtomicUsize,

    /// Command buffers that have been finished but not yet submitted.
    pending_command_buffers: Mutex<AHashMap<CommandBufferId, Vec<RecordedCommand>>>,
    command_buffer_id_counter: AtomicUsize,
    /// Every executed command, in execution order.
    command_log: Mutex<Vec<RecordedCommand>>,
}

/// A [`GraphicsDevice`] living entirely in CPU memory.
///
/// Cloning is cheap and every clone shares the same resources.
#[derive(Clone, Debug)]
pub struct HeadlessDevice {
    internal: Arc<HeadlessDeviceInternal>,
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl HeadlessDevice {
    /// Creates a device knowing every built-in program.
    pub fn new() -> Self {
        Self::with_programs(&program::ALL)
    }

    /// Creates a device knowing only `programs`.
    pub fn with_programs(programs: &[&str]) -> Self {
        let (width, height) = DEFAULT_SCREEN_SIZE;
        Self {
            internal: Arc::new(HeadlessDeviceInternal {
                programs: programs.iter().map(|p| p.to_string()).collect(),
                screen_size: Mutex::new(DEFAULT_SCREEN_SIZE),
                textures: Mutex::new(AHashMap::new()),
                render_targets: Mutex::new(AHashMap::new()),
                pipeline: Mutex::new(PipelineState {
                    target: None,
                    viewport: Viewport::new(0, 0, width, height),
                    render_state: RenderState::BASELINE,
                    program: None,
                    uniforms: AHashMap::new(),
                }),
                next_texture_id: AtomicUsize::new(0),
                next_render_target_id: AtomicUsize::new(0),
                pending_command_buffers: Mutex::new(AHashMap::new()),
                command_buffer_id_counter: AtomicUsize::new(0),
                command_log: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Resizes the default framebuffer.
    pub fn set_screen_size(&self, width: u32, height: u32) {
        *lock(&self.internal.screen_size) = (width, height);
    }

    /// Size of the default framebuffer.
    pub fn screen_size(&self) -> (u32, u32) {
        *lock(&self.internal.screen_size)
    }

    /// Every command executed so far, across all submitted buffers.
    pub fn command_log(&self) -> Vec<RecordedCommand> {
        lock(&self.internal.command_log).clone()
    }

    /// Only the draws of [`HeadlessDevice::command_log`].
    pub fn draws(&self) -> Vec<DrawRecord> {
        lock(&self.internal.command_log)
            .iter()
            .filter_map(|command| match command {
                RecordedCommand::Draw(draw) => Some(draw.clone()),
                _ => None,
            })
            .collect()
    }

    /// Forgets the executed commands. Resources and pipeline state are kept.
    pub fn clear_command_log(&self) {
        lock(&self.internal.command_log).clear();
    }

    /// Number of live render targets.
    pub fn render_target_count(&self) -> usize {
        lock(&self.internal.render_targets).len()
    }

    /// Number of live textures, attachments included.
    pub fn texture_count(&self) -> usize {
        lock(&self.internal.textures).len()
    }

    /// Reads a texture as raw `f32` channels, whatever its format.
    pub fn read_texels(&self, id: TextureId) -> Option<Vec<f32>> {
        lock(&self.internal.textures)
            .get(&id)
            .map(|storage| storage.texels().to_vec())
    }

    fn generate_texture_id(&self) -> TextureId {
        TextureId(self.internal.next_texture_id.fetch_add(1, Ordering::Relaxed))
    }

    fn generate_render_target_id(&self) -> RenderTargetId {
        RenderTargetId(
            self.internal
                .next_render_target_id
                .fetch_add(1, Ordering::Relaxed),
        )
    }

    /// (crate-internal) Stores a finished command list until it is submitted.
    pub(crate) fn register_command_buffer(
        &self,
        commands: Vec<RecordedCommand>,
    ) -> CommandBufferId {
        let id = CommandBufferId(
            self.internal
                .command_buffer_id_counter
                .fetch_add(1, Ordering::SeqCst),
        );
        lock(&self.internal.pending_command_buffers).insert(id, commands);
        id
    }

    fn execute(&self, command: &mut RecordedCommand) {
        let mut pipeline = lock(&self.internal.pipeline);
        match command {
            RecordedCommand::BindRenderTarget(id) => {
                match lock(&self.internal.render_targets).get(id) {
                    Some(target) => pipeline.viewport = target.viewport(),
                    None => log::warn!("HeadlessDevice: binding unknown render target {:?}", id),
                }
                pipeline.target = Some(*id);
            }
            RecordedCommand::UnbindRenderTarget => {
                let (width, height) = self.screen_size();
                pipeline.target = None;
                pipeline.viewport = Viewport::new(0, 0, width, height);
            }
            RecordedCommand::SetViewport(viewport) => pipeline.viewport = *viewport,
            RecordedCommand::Clear(values) => {
                if let Some(target) = pipeline.target {
                    self.clear_target(target, *values);
                }
            }
            RecordedCommand::SetRenderState(state) => pipeline.render_state = *state,
            RecordedCommand::UseProgram(program) => pipeline.program = program.clone(),
            RecordedCommand::SetUniform { name, value } => match pipeline.program.clone() {
                Some(program) => {
                    pipeline
                        .uniforms
                        .entry(program)
                        .or_default()
                        .insert(name.clone(), value.clone());
                }
                None => log::trace!("HeadlessDevice: uniform '{}' set without a program", name),
            },
            RecordedCommand::Draw(draw) => {
                draw.program = pipeline.program.clone();
                draw.state = pipeline.render_state;
                draw.target = pipeline.target;
                draw.viewport = pipeline.viewport;
                draw.uniforms = pipeline
                    .program
                    .as_ref()
                    .and_then(|p| pipeline.uniforms.get(p))
                    .cloned()
                    .unwrap_or_default();
            }
            RecordedCommand::CopyTexture {
                source,
                destination,
            } => self.copy_texture(*source, *destination),
            RecordedCommand::CopyDepthToBoundTarget(source) => {
                let depth = pipeline.target.and_then(|id| {
                    lock(&self.internal.render_targets)
                        .get(&id)
                        .and_then(|target| target.depth_texture)
                });
                match depth {
                    Some(destination) => self.copy_texture(*source, destination),
                    None => log::warn!("HeadlessDevice: bound target has no depth attachment"),
                }
            }
        }
    }

    fn clear_target(&self, id: RenderTargetId, values: ClearValues) {
        let Some(target) = lock(&self.internal.render_targets).get(&id).cloned() else {
            return;
        };
        let mut textures = lock(&self.internal.textures);
        if let Some(color) = values.color {
            for texture in &target.color_textures {
                if let Some(storage) = textures.get_mut(texture) {
                    storage.fill(color.to_array());
                }
            }
        }
        if let (Some(depth), Some(texture)) = (values.depth, target.depth_texture) {
            if let Some(storage) = textures.get_mut(&texture) {
                storage.fill([depth; 4]);
            }
        }
    }

    fn copy_texture(&self, source: TextureId, destination: TextureId) {
        let mut textures = lock(&self.internal.textures);
        let Some(from) = textures.get(&source).cloned() else {
            log::warn!("HeadlessDevice: copy from unknown texture {:?}", source);
            return;
        };
        let Some(to) = textures.get_mut(&destination) else {
            log::warn!("HeadlessDevice: copy to unknown texture {:?}", destination);
            return;
        };
        if !to.copy_from(from.texels(), &from.descriptor) {
            log::warn!(
                "HeadlessDevice: cannot copy {:?} onto {:?}, shapes differ",
                source,
                destination
            );
        }
    }
}

impl GraphicsDevice for HeadlessDevice {
    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError> {
        let descriptor = TextureDescriptor {
            label: descriptor
                .label
                .as_ref()
                .map(|label| Cow::Owned(label.to_string())),
            width: descriptor.width,
            height: descriptor.height,
            format: descriptor.format,
            mag_filter: descriptor.mag_filter,
            min_filter: descriptor.min_filter,
        };
        let id = self.generate_texture_id();
        lock(&self.internal.textures).insert(id, TextureStorage::new(descriptor));
        Ok(id)
    }

    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError> {
        lock(&self.internal.textures)
            .remove(&id)
            .map(|_| ())
            .ok_or(ResourceError::NotFound)
    }

    fn texture_descriptor(&self, id: TextureId) -> Option<TextureDescriptor<'static>> {
        lock(&self.internal.textures)
            .get(&id)
            .map(|storage| storage.descriptor.clone())
    }

    fn write_texture(&self, id: TextureId, data: &[u8]) -> Result<(), ResourceError> {
        lock(&self.internal.textures)
            .get_mut(&id)
            .ok_or(ResourceError::NotFound)?
            .write(data)
    }

    fn read_texture(&self, id: TextureId) -> Result<Vec<u8>, ResourceError> {
        lock(&self.internal.textures)
            .get(&id)
            .map(TextureStorage::read)
            .ok_or(ResourceError::NotFound)
    }

    fn create_render_target(
        &self,
        descriptor: &RenderTargetDescriptor,
    ) -> Result<RenderTarget, ResourceError> {
        let label = descriptor.label.as_deref().unwrap_or("render_target");
        let attachment = |suffix: String, format: TextureFormat| TextureDescriptor {
            label: Some(Cow::Owned(format!("{label}_{suffix}"))),
            width: descriptor.width,
            height: descriptor.height,
            format,
            mag_filter: Default::default(),
            min_filter: Default::default(),
        };

        let color_textures = descriptor
            .color_formats
            .iter()
            .enumerate()
            .map(|(i, format)| self.create_texture(&attachment(format!("color{i}"), *format)))
            .collect::<Result<Vec<_>, _>>()?;
        let depth_texture = if descriptor.with_depth {
            Some(self.create_texture(&attachment(
                "depth".to_string(),
                TextureFormat::Depth32Float,
            ))?)
        } else {
            None
        };

        let target = RenderTarget {
            id: self.generate_render_target_id(),
            color_textures,
            depth_texture,
            width: descriptor.width,
            height: descriptor.height,
        };
        lock(&self.internal.render_targets).insert(target.id, target.clone());
        Ok(target)
    }

    fn destroy_render_target(&self, id: RenderTargetId) -> Result<(), ResourceError> {
        let target = lock(&self.internal.render_targets)
            .remove(&id)
            .ok_or(ResourceError::NotFound)?;
        let mut textures = lock(&self.internal.textures);
        for texture in target.color_textures.iter().chain(&target.depth_texture) {
            textures.remove(texture);
        }
        Ok(())
    }

    fn has_program(&self, name: &str) -> bool {
        self.internal.programs.contains(name)
    }

    fn create_command_encoder(&self, label: Option<&str>) -> Box<dyn CommandEncoder> {
        Box::new(HeadlessCommandEncoder::new(self.clone(), label))
    }

    fn submit_command_buffer(&self, id: CommandBufferId) -> Result<(), ResourceError> {
        let commands = lock(&self.internal.pending_command_buffers)
            .remove(&id)
            .ok_or(ResourceError::InvalidHandle)?;
        let mut executed = Vec::with_capacity(commands.len());
        for mut command in commands {
            self.execute(&mut command);
            executed.push(command);
        }
        lock(&self.internal.command_log).extend(executed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumina_core::{
        math::LinearRgba,
        renderer::{FilterMode, Mesh, ShaderError},
    };

    fn target(device: &HeadlessDevice, formats: Vec<TextureFormat>) -> RenderTarget {
        device
            .create_render_target(&RenderTargetDescriptor {
                label: Some(Cow::Borrowed("test")),
                width: 4,
                height: 2,
                color_formats: formats,
                with_depth: true,
            })
            .unwrap()
    }

    fn submit(device: &HeadlessDevice, record: impl FnOnce(&mut dyn CommandEncoder)) {
        let mut encoder = device.create_command_encoder(Some("test"));
        record(encoder.as_mut());
        device.submit_command_buffer(encoder.finish()).unwrap();
    }

    #[test]
    fn test_texture_round_trip() {
        let device = HeadlessDevice::new();
        let id = device
            .create_texture(&TextureDescriptor {
                label: None,
                width: 2,
                height: 2,
                format: TextureFormat::Rgba8Unorm,
                mag_filter: FilterMode::Nearest,
                min_filter: FilterMode::Nearest,
            })
            .unwrap();
        let data: Vec<u8> = (0..16).collect();
        device.write_texture(id, &data).unwrap();
        assert_eq!(device.read_texture(id).unwrap(), data);
        device.destroy_texture(id).unwrap();
        assert_eq!(device.read_texture(id), Err(ResourceError::NotFound));
    }

    #[test]
    fn test_clear_executes_on_submit() {
        let device = HeadlessDevice::new();
        let target = target(&device, vec![TextureFormat::Rgba32Float]);
        let mut encoder = device.create_command_encoder(None);
        encoder.bind_render_target(&target);
        encoder.clear(ClearValues::color_and_depth(LinearRgba::new(0.5, 0.25, 1.0, 1.0)));
        let id = encoder.finish();

        let color = target.color(0).unwrap();
        assert!(device.read_texels(color).unwrap().iter().all(|v| *v == 0.0));
        device.submit_command_buffer(id).unwrap();
        assert_eq!(&device.read_texels(color).unwrap()[..4], &[0.5, 0.25, 1.0, 1.0]);
        let depth = device.read_texels(target.depth_texture.unwrap()).unwrap();
        assert!(depth.iter().all(|d| *d == 1.0));
    }

    #[test]
    fn test_double_submit_is_rejected() {
        let device = HeadlessDevice::new();
        let id = device.create_command_encoder(None).finish();
        device.submit_command_buffer(id).unwrap();
        assert_eq!(
            device.submit_command_buffer(id),
            Err(ResourceError::InvalidHandle)
        );
    }

    #[test]
    fn test_copies_move_texels() {
        let device = HeadlessDevice::new();
        let a = target(&device, vec![TextureFormat::R8Unorm]);
        let b = target(&device, vec![TextureFormat::R8Unorm]);
        submit(&device, |encoder| {
            encoder.bind_render_target(&a);
            encoder.clear(ClearValues {
                color: Some(LinearRgba::WHITE),
                depth: Some(0.25),
            });
            encoder.copy_texture(a.color(0).unwrap(), b.color(0).unwrap());
            encoder.bind_render_target(&b);
            encoder.copy_depth_to_bound_target(a.depth_texture.unwrap());
        });
        assert_eq!(device.read_texture(b.color(0).unwrap()).unwrap(), vec![255; 8]);
        let depth = device.read_texels(b.depth_texture.unwrap()).unwrap();
        assert!(depth.iter().all(|d| *d == 0.25));
    }

    #[test]
    fn test_draw_snapshots_program_uniforms() {
        let device = HeadlessDevice::new();
        let quad = Mesh::fullscreen_quad();
        submit(&device, |encoder| {
            encoder.use_program(program::FLAT).unwrap();
            encoder.set_uniform("u_model", 1.0_f32.into());
            encoder.use_program(program::DEPTH).unwrap();
            encoder.set_uniform("u_camera_nearfar", 2.0_f32.into());
            encoder.use_program(program::FLAT).unwrap();
            encoder.draw_mesh(&quad);
        });

        let draws = device.draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].program.as_deref(), Some(program::FLAT));
        assert_eq!(draws[0].uniform("u_model"), Some(&UniformValue::Float(1.0)));
        assert!(draws[0].uniform("u_camera_nearfar").is_none());
        assert_eq!(draws[0].vertex_count, quad.vertex_count());
        assert_eq!(draws[0].target, None);
        assert_eq!(draws[0].viewport, Viewport::new(0, 0, 800, 600));
    }

    #[test]
    fn test_unknown_program_deactivates() {
        let device = HeadlessDevice::with_programs(&[program::FLAT]);
        let quad = Mesh::fullscreen_quad();
        submit(&device, |encoder| {
            encoder.use_program(program::FLAT).unwrap();
            let err = encoder.use_program("missing").unwrap_err();
            assert_eq!(
                err,
                ShaderError::NotFound {
                    name: "missing".to_string()
                }
            );
            encoder.draw_mesh(&quad);
        });
        assert_eq!(device.draws()[0].program, None);
    }

    #[test]
    fn test_destroying_target_frees_attachments() {
        let device = HeadlessDevice::new();
        let target = target(&device, vec![TextureFormat::Rgba8Unorm; 3]);
        assert_eq!(device.texture_count(), 4);
        assert_eq!(device.render_target_count(), 1);
        device.destroy_render_target(target.id).unwrap();
        assert_eq!(device.texture_count(), 0);
        assert_eq!(device.render_target_count(), 0);
    }

    #[test]
    fn test_bound_target_sets_viewport() {
        let device = HeadlessDevice::new();
        device.set_screen_size(1024, 768);
        let target = target(&device, vec![TextureFormat::R8Unorm]);
        let quad = Mesh::fullscreen_quad();
        submit(&device, |encoder| {
            encoder.use_program(program::SCREEN).unwrap();
            encoder.bind_render_target(&target);
            encoder.draw_mesh(&quad);
            encoder.unbind_render_target();
            encoder.draw_mesh(&quad);
        });
        let draws = device.draws();
        assert_eq!(draws[0].target, Some(target.id));
        assert_eq!(draws[0].viewport, Viewport::new(0, 0, 4, 2));
        assert_eq!(draws[1].viewport, Viewport::new(0, 0, 1024, 768));
    }
}
