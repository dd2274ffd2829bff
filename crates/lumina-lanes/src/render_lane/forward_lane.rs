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

//! Implements the forward rendering lane.
//!
//! The `ForwardLane` shades every render call in a single geometry pass, with
//! lighting evaluated per fragment. It backs the forward pipeline mode, the
//! debug render modes and the probe-capture views.
//!
//! # Lighting Strategies
//!
//! - **Multi-pass**: one draw per light, later draws blended additively with
//!   ambient and emissive zeroed so they are counted once.
//! - **Single-pass**: up to [`MAX_SINGLE_PASS_LIGHTS`] lights packed into
//!   uniform arrays and shaded in one draw.

use super::{
    bind_ambient_only, bind_camera, bind_light, bind_material, material_render_state,
    ExtractedLight, FrameContext, RenderCall, TargetPass,
};
use lumina_core::{
    lane::{Lane, LaneKind},
    math::{LinearRgba, Mat4, Vec3},
    renderer::{
        api::program, BlendState, ClearValues, CommandEncoder, CompareFunction, DepthState,
        RenderMode, RenderState, RenderTarget,
    },
};

/// Maximum number of lights shaded by the single-pass program.
pub const MAX_SINGLE_PASS_LIGHTS: usize = 8;

/// Scale applied to the unit sphere the skybox is drawn on.
const SKYBOX_SCALE: f32 = 10.0;

/// Light parameters packed into the arrays of the single-pass program.
///
/// Lights beyond [`MAX_SINGLE_PASS_LIGHTS`] are dropped; [`SinglePassLights::dropped`]
/// reports how many.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SinglePassLights {
    types: Vec<i32>,
    colors: Vec<Vec3>,
    positions: Vec<Vec3>,
    vectors: Vec<Vec3>,
    intensities: Vec<f32>,
    max_distances: Vec<f32>,
    cosine_cutoffs: Vec<f32>,
    exponents: Vec<f32>,
    area_sizes: Vec<f32>,
    dropped: usize,
}

impl SinglePassLights {
    /// Packs the first [`MAX_SINGLE_PASS_LIGHTS`] of `lights`.
    pub fn pack(lights: &[ExtractedLight]) -> Self {
        let kept = &lights[..lights.len().min(MAX_SINGLE_PASS_LIGHTS)];
        let mut packed = Self {
            dropped: lights.len() - kept.len(),
            ..Self::default()
        };
        for light in kept {
            let params = &light.light;
            packed.types.push(params.kind.shader_code());
            packed.colors.push(params.color.to_vec3());
            packed.positions.push(light.position);
            packed.vectors.push(light.direction);
            packed.intensities.push(params.intensity);
            packed.max_distances.push(params.max_distance().unwrap_or(0.0));
            packed.cosine_cutoffs.push(params.spot_cosine_cutoff());
            packed.exponents.push(params.spot_exponent());
            packed.area_sizes.push(params.area_size);
        }
        packed
    }

    /// Number of packed lights.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no light was packed.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Number of lights beyond the cap.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Uploads the arrays and `u_num_lights`.
    pub fn bind(&self, encoder: &mut dyn CommandEncoder) {
        encoder.set_uniform("u_num_lights", (self.len() as i32).into());
        encoder.set_uniform("u_light_type", self.types.clone().into());
        encoder.set_uniform("u_light_color", self.colors.clone().into());
        encoder.set_uniform("u_light_position", self.positions.clone().into());
        encoder.set_uniform("u_light_vector", self.vectors.clone().into());
        encoder.set_uniform("u_light_intensity", self.intensities.clone().into());
        encoder.set_uniform("u_light_maxdist", self.max_distances.clone().into());
        encoder.set_uniform(
            "u_light_spotCosineCutoff",
            self.cosine_cutoffs.clone().into(),
        );
        encoder.set_uniform("u_light_spotExponent", self.exponents.clone().into());
        encoder.set_uniform("u_light_area_size", self.area_sizes.clone().into());
    }
}

/// The program and debug channel a render mode draws with.
pub fn forward_program(mode: RenderMode) -> (&'static str, Option<i32>) {
    match mode {
        RenderMode::Textured => (program::TEXTURE, None),
        RenderMode::SinglePass => (program::LIGHT_SINGLEPASS, None),
        RenderMode::MultiPass => (program::LIGHT_MULTIPASS, None),
        RenderMode::Normals => (program::SH2_DEBUG, Some(0)),
        RenderMode::Occlusion => (program::SH2_DEBUG, Some(1)),
        RenderMode::Uvs => (program::SH2_DEBUG, Some(2)),
        RenderMode::GBuffers => (program::GBUFFERS, None),
    }
}

/// A lane that shades geometry directly into the bound target.
#[derive(Debug, Default, Clone, Copy)]
pub struct ForwardLane;

impl ForwardLane {
    /// Creates a new `ForwardLane`.
    pub fn new() -> Self {
        Self
    }

    /// Binds `target`, clears it to `clear_color` and renders the view into it.
    pub fn render_to_target(
        &self,
        encoder: &mut dyn CommandEncoder,
        target: &RenderTarget,
        ctx: &FrameContext,
        mode: RenderMode,
        clear_color: LinearRgba,
    ) {
        let mut pass = TargetPass::begin(encoder, target);
        pass.clear(ClearValues::color_and_depth(clear_color));
        self.render(&mut *pass, ctx, mode);
    }

    /// Renders the skybox and every render call of the view into the bound target.
    pub fn render(&self, encoder: &mut dyn CommandEncoder, ctx: &FrameContext, mode: RenderMode) {
        if ctx.scene.environment.is_some() {
            self.render_skybox(encoder, ctx);
        }

        if mode == RenderMode::SinglePass && ctx.world.lights.len() > MAX_SINGLE_PASS_LIGHTS {
            log::debug!(
                "ForwardLane: {} lights exceed the single-pass cap, shading the first {}",
                ctx.world.lights.len(),
                MAX_SINGLE_PASS_LIGHTS
            );
        }
        let packed = (mode == RenderMode::SinglePass)
            .then(|| SinglePassLights::pack(&ctx.world.lights));

        for call in &ctx.world.render_calls {
            self.render_call(encoder, ctx, call, mode, packed.as_ref());
        }
    }

    fn render_skybox(&self, encoder: &mut dyn CommandEncoder, ctx: &FrameContext) {
        let Some(environment) = ctx.scene.environment else {
            return;
        };
        if encoder.use_program(program::SKYBOX).is_err() {
            log::debug!("ForwardLane: no skybox program, skipping the environment");
            return;
        }
        let model = Mat4::from_translation(ctx.camera.eye())
            * Mat4::from_scale(Vec3::splat(SKYBOX_SCALE));
        encoder.set_render_state(RenderState::fullscreen(None));
        encoder.set_uniform("u_model", model.into());
        bind_camera(encoder, ctx.camera);
        encoder.set_uniform("u_texture", environment.into());
        encoder.draw_mesh(&ctx.resources.sphere);
    }

    fn render_call(
        &self,
        encoder: &mut dyn CommandEncoder,
        ctx: &FrameContext,
        call: &RenderCall,
        mode: RenderMode,
        packed: Option<&SinglePassLights>,
    ) {
        if call.mesh.is_empty() {
            return;
        }
        let (name, texture_type) = forward_program(mode);
        if encoder.use_program(name).is_err() {
            log::debug!("ForwardLane: program '{}' is missing, skipping draw", name);
            return;
        }

        let state = material_render_state(&call.material);
        encoder.set_render_state(state);
        bind_camera(encoder, ctx.camera);
        encoder.set_uniform("u_model", call.transform.into());
        bind_material(encoder, &call.material, ctx.resources);
        encoder.set_uniform("u_ambient_light", ctx.scene.ambient_light.into());
        if let Some(texture_type) = texture_type {
            encoder.set_uniform("u_texture_type", texture_type.into());
        }
        if mode == RenderMode::GBuffers {
            encoder.set_uniform("u_use_dither", call.is_translucent().into());
        }

        match mode {
            RenderMode::MultiPass => self.draw_multipass(encoder, ctx, call, state),
            RenderMode::SinglePass => {
                if let Some(packed) = packed {
                    packed.bind(encoder);
                }
                encoder.draw_mesh(&call.mesh);
            }
            _ => encoder.draw_mesh(&call.mesh),
        }
    }

    fn draw_multipass(
        &self,
        encoder: &mut dyn CommandEncoder,
        ctx: &FrameContext,
        call: &RenderCall,
        state: RenderState,
    ) {
        if ctx.world.lights.is_empty() {
            bind_ambient_only(encoder);
            encoder.draw_mesh(&call.mesh);
            return;
        }

        let additive = state
            .with_blend(Some(BlendState::ADDITIVE))
            .with_depth(DepthState {
                compare: CompareFunction::LessEqual,
                ..state.depth
            });
        for (i, light) in ctx.world.lights.iter().enumerate() {
            // Translucent surfaces accumulate every light over what is behind them.
            if i == 1 || (i == 0 && call.is_translucent()) {
                encoder.set_render_state(additive);
            }
            if i == 1 {
                encoder.set_uniform("u_ambient_light", Vec3::ZERO.into());
                encoder.set_uniform("u_emissive_factor", Vec3::ZERO.into());
            }
            bind_light(encoder, light, ctx.shadow_maps.get(light.entity));
            encoder.draw_mesh(&call.mesh);
        }
    }
}

impl Lane for ForwardLane {
    fn strategy_name(&self) -> &'static str {
        "Forward"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Render
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_lane::{RenderCallCollector, ShadowMaps, SharedResources};
    use lumina_core::{
        asset::{AlphaMode, Material},
        renderer::{
            Camera, DirectionalLight, GraphicsDevice, Light, LightType, Mesh, PointLight,
            TextureId, UniformValue,
        },
        scene::{Entity, EntityId, Node, Prefab, Scene},
    };
    use lumina_infra::graphics::headless::{DrawRecord, HeadlessDevice, RecordedCommand};
    use std::sync::Arc;

    fn point_light(id: usize) -> ExtractedLight {
        ExtractedLight::new(
            EntityId(id),
            Light::new(LightType::Point(PointLight::default())),
            Mat4::from_translation(Vec3::new(id as f32, 0.0, 0.0)),
        )
    }

    fn scene(lights: usize, alpha_mode: AlphaMode) -> Scene {
        let material = Material {
            alpha_mode,
            emissive_factor: Vec3::new(0.5, 0.0, 0.0),
            ..Material::default()
        };
        let mut scene = Scene::new();
        scene.add_entity(Entity::prefab(
            "cube",
            Mat4::IDENTITY,
            Arc::new(Prefab::new(
                "cube",
                Node::with_mesh("cube", Arc::new(Mesh::unit_cube()), Arc::new(material)),
            )),
        ));
        for i in 0..lights {
            let kind = if i == 0 {
                LightType::Directional(DirectionalLight::default())
            } else {
                LightType::Point(PointLight::default())
            };
            scene.add_entity(Entity::light(
                format!("light_{i}"),
                Mat4::from_translation(Vec3::new(0.0, 2.0, 2.0)),
                Light::new(kind),
            ));
        }
        scene
    }

    fn draws(scene: &Scene, mode: RenderMode) -> Vec<DrawRecord> {
        let device = HeadlessDevice::new();
        let resources = SharedResources::new(&device).unwrap();
        let camera = Camera::perspective(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::ZERO,
            Vec3::Y,
            60.0,
            1.0,
            0.1,
            100.0,
        )
        .unwrap();
        let world = RenderCallCollector::new().collect(scene, Some(&camera));
        let shadow_maps = ShadowMaps::new();
        let ctx = FrameContext {
            scene,
            camera: &camera,
            world: &world,
            resources: &resources,
            shadow_maps: &shadow_maps,
        };

        let mut encoder = device.create_command_encoder(None);
        ForwardLane::new().render(encoder.as_mut(), &ctx, mode);
        device.submit_command_buffer(encoder.finish()).unwrap();
        device
            .command_log()
            .into_iter()
            .filter_map(|c| match c {
                RecordedCommand::Draw(draw) => Some(draw),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_single_pass_lights_cap() {
        let lights: Vec<_> = (0..11).map(point_light).collect();
        let packed = SinglePassLights::pack(&lights);
        assert_eq!(packed.len(), MAX_SINGLE_PASS_LIGHTS);
        assert_eq!(packed.dropped(), 3);
        assert_eq!(packed.positions[7], Vec3::new(7.0, 0.0, 0.0));

        let few = SinglePassLights::pack(&lights[..2]);
        assert_eq!(few.len(), 2);
        assert_eq!(few.dropped(), 0);
    }

    #[test]
    fn test_single_pass_shades_first_eight() {
        let draws = draws(&scene(11, AlphaMode::Opaque), RenderMode::SinglePass);
        assert_eq!(draws.len(), 1);
        let draw = &draws[0];
        assert_eq!(draw.program.as_deref(), Some(program::LIGHT_SINGLEPASS));
        assert_eq!(
            draw.uniforms.get("u_num_lights").and_then(UniformValue::as_int),
            Some(8)
        );
        match draw.uniforms.get("u_light_type") {
            Some(UniformValue::IntArray(types)) => {
                assert_eq!(types.len(), 8);
                assert_eq!(types[0], 3);
                assert!(types[1..].iter().all(|t| *t == 1));
            }
            other => panic!("unexpected light types {other:?}"),
        }
    }

    #[test]
    fn test_multipass_counts_ambient_once() {
        let draws = draws(&scene(3, AlphaMode::Opaque), RenderMode::MultiPass);
        assert_eq!(draws.len(), 3);

        assert_eq!(draws[0].state.blend, None);
        assert_eq!(
            draws[0].uniforms.get("u_emissive_factor").and_then(UniformValue::as_vec3),
            Some(Vec3::new(0.5, 0.0, 0.0))
        );
        for later in &draws[1..] {
            assert_eq!(later.state.blend, Some(BlendState::ADDITIVE));
            assert_eq!(later.state.depth.compare, CompareFunction::LessEqual);
            assert_eq!(
                later.uniforms.get("u_ambient_light").and_then(UniformValue::as_vec3),
                Some(Vec3::ZERO)
            );
            assert_eq!(
                later.uniforms.get("u_emissive_factor").and_then(UniformValue::as_vec3),
                Some(Vec3::ZERO)
            );
        }
    }

    #[test]
    fn test_multipass_without_lights_draws_ambient_only() {
        let draws = draws(&scene(0, AlphaMode::Opaque), RenderMode::MultiPass);
        assert_eq!(draws.len(), 1);
        assert_eq!(
            draws[0].uniforms.get("u_light_type").and_then(UniformValue::as_int),
            Some(0)
        );
    }

    #[test]
    fn test_debug_modes_select_channel() {
        for (mode, channel) in [
            (RenderMode::Normals, 0),
            (RenderMode::Occlusion, 1),
            (RenderMode::Uvs, 2),
        ] {
            let draws = draws(&scene(1, AlphaMode::Opaque), mode);
            assert_eq!(draws.len(), 1);
            assert_eq!(draws[0].program.as_deref(), Some(program::SH2_DEBUG));
            assert_eq!(
                draws[0].uniforms.get("u_texture_type").and_then(UniformValue::as_int),
                Some(channel)
            );
        }
    }

    #[test]
    fn test_translucent_material_blends() {
        let draws = draws(&scene(1, AlphaMode::Blend), RenderMode::Textured);
        assert_eq!(draws[0].state.blend, Some(BlendState::ALPHA));
    }

    #[test]
    fn test_skybox_drawn_first_when_environment_set() {
        let mut scene = scene(1, AlphaMode::Opaque);
        scene.environment = Some(TextureId(0));
        let draws = draws(&scene, RenderMode::Textured);
        assert_eq!(draws[0].program.as_deref(), Some(program::SKYBOX));
        assert!(!draws[0].state.depth.test_enabled);
        assert_eq!(draws.len(), 2);
    }
}
