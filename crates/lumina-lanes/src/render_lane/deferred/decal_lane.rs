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

//! Projects decals onto the G-buffer.

use super::bind_gbuffer_textures;
use crate::render_lane::{FrameContext, FrameTargets, TargetPass};
use lumina_core::{
    lane::{Lane, LaneKind},
    renderer::{
        api::program, BlendState, CommandEncoder, CullMode, RenderState, RenderTarget,
    },
};

/// A lane that injects decals into the G-buffer.
///
/// The G-buffer is cloned into the scratch target, each decal box is drawn
/// into the scratch target while sampling the untouched G-buffer, and the
/// result is copied back.
#[derive(Debug, Default, Clone, Copy)]
pub struct DecalLane;

impl DecalLane {
    /// Creates a new `DecalLane`.
    pub fn new() -> Self {
        Self
    }

    /// Projects every decal of the view. Does nothing without decals.
    ///
    /// # Returns
    ///
    /// The number of decals drawn.
    pub fn render(
        &self,
        encoder: &mut dyn CommandEncoder,
        ctx: &FrameContext,
        targets: &FrameTargets,
    ) -> usize {
        if ctx.world.decals.is_empty() {
            return 0;
        }

        copy_attachments(encoder, &targets.gbuffers, &targets.decals);

        let drawn = {
            let mut pass = TargetPass::begin(encoder, &targets.decals);
            if pass.use_program(program::DECAL).is_err() {
                log::warn!("DecalLane: program '{}' is missing", program::DECAL);
                return 0;
            }
            // The box is drawn from inside so decals covering the camera still apply.
            pass.set_render_state(
                RenderState::fullscreen(Some(BlendState::ALPHA)).with_cull_mode(CullMode::Front),
            );
            bind_gbuffer_textures(&mut *pass, targets);
            pass.set_uniform("u_viewprojection", ctx.camera.view_projection().into());
            pass.set_uniform(
                "u_inverse_viewprojection",
                ctx.camera.inverse_view_projection().into(),
            );

            for decal in &ctx.world.decals {
                let texture = decal
                    .decal
                    .texture
                    .unwrap_or(ctx.resources.white_texture);
                pass.set_uniform("u_model", decal.transform.into());
                pass.set_uniform("u_iModel", decal.inverse_transform.into());
                pass.set_uniform(
                    "u_decal_texture_type",
                    decal.decal.texture_type.shader_code().into(),
                );
                pass.set_uniform("u_decal_texture", texture.into());
                pass.draw_mesh(&ctx.resources.cube);
            }
            ctx.world.decals.len()
        };

        copy_attachments(encoder, &targets.decals, &targets.gbuffers);
        log::trace!("DecalLane: {} decals", drawn);
        drawn
    }
}

/// Copies every color attachment of `from` onto the same slot of `to`, then depth.
fn copy_attachments(encoder: &mut dyn CommandEncoder, from: &RenderTarget, to: &RenderTarget) {
    for (source, destination) in from.color_textures.iter().zip(&to.color_textures) {
        encoder.copy_texture(*source, *destination);
    }
    if let (Some(source), Some(destination)) = (from.depth_texture, to.depth_texture) {
        encoder.copy_texture(source, destination);
    }
}

impl Lane for DecalLane {
    fn strategy_name(&self) -> &'static str {
        "Decal"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Render
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_lane::{
        RenderCallCollector, RenderWorld, ShadowMaps, SharedResources, GBUFFER_ALBEDO,
    };
    use lumina_core::{
        math::{LinearRgba, Mat4, Vec3},
        renderer::{Camera, ClearValues, GraphicsDevice, UniformValue},
        scene::{Decal, DecalTextureType, Entity, Scene},
    };
    use lumina_infra::graphics::headless::{HeadlessDevice, RecordedCommand};

    fn camera() -> Camera {
        Camera::perspective(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y, 60.0, 1.0, 0.1, 100.0)
            .unwrap()
    }

    fn decal_scene() -> Scene {
        let mut scene = Scene::new();
        scene.add_entity(Entity::decal(
            "stain",
            Mat4::from_translation(Vec3::new(0.5, 0.0, 0.0)),
            Decal {
                texture: None,
                texture_type: DecalTextureType::Full,
            },
        ));
        scene
    }

    fn run(device: &HeadlessDevice, targets: &FrameTargets, world: &RenderWorld) -> usize {
        let resources = SharedResources::new(device).unwrap();
        let shadow_maps = ShadowMaps::new();
        let camera = camera();
        let scene = Scene::new();
        let ctx = FrameContext {
            scene: &scene,
            camera: &camera,
            world,
            resources: &resources,
            shadow_maps: &shadow_maps,
        };
        device.clear_command_log();
        let mut encoder = device.create_command_encoder(Some("decals"));
        let drawn = DecalLane::new().render(encoder.as_mut(), &ctx, targets);
        device.submit_command_buffer(encoder.finish()).unwrap();
        drawn
    }

    fn copies(from: &RenderTarget, to: &RenderTarget) -> Vec<RecordedCommand> {
        from.color_textures
            .iter()
            .zip(&to.color_textures)
            .map(|(s, d)| (*s, *d))
            .chain(from.depth_texture.zip(to.depth_texture))
            .map(|(source, destination)| RecordedCommand::CopyTexture {
                source,
                destination,
            })
            .collect()
    }

    #[test]
    fn test_decals_are_drawn_between_gbuffer_copies() {
        let device = HeadlessDevice::new();
        let targets = FrameTargets::new(&device, 8, 8, 4).unwrap();
        let scene = decal_scene();
        let world = RenderCallCollector::new().collect(&scene, Some(&camera()));
        assert_eq!(run(&device, &targets, &world), 1);

        let log = device.command_log();
        let forward = copies(&targets.gbuffers, &targets.decals);
        let back = copies(&targets.decals, &targets.gbuffers);
        assert_eq!(log[..forward.len()], forward[..]);
        assert_eq!(log[log.len() - back.len()..], back[..]);

        let draw_at = log
            .iter()
            .position(|c| matches!(c, RecordedCommand::Draw(_)))
            .unwrap();
        assert!(draw_at > forward.len());
        assert!(draw_at < log.len() - back.len());
        let RecordedCommand::Draw(draw) = &log[draw_at] else {
            unreachable!();
        };

        assert_eq!(draw.program.as_deref(), Some(program::DECAL));
        assert_eq!(draw.target, Some(targets.decals.id));
        assert!(!draw.state.depth.test_enabled);
        assert_eq!(draw.state.cull_mode, CullMode::Front);
        assert_eq!(draw.state.blend, Some(BlendState::ALPHA));

        let decal = &world.decals[0];
        assert_eq!(draw.uniform("u_model"), Some(&UniformValue::Mat4(decal.transform)));
        assert_eq!(
            draw.uniform("u_iModel"),
            Some(&UniformValue::Mat4(decal.inverse_transform))
        );
        assert_eq!(
            draw.uniform("u_decal_texture_type"),
            Some(&UniformValue::Int(DecalTextureType::Full.shader_code()))
        );
        assert!(matches!(
            draw.uniform("u_decal_texture"),
            Some(UniformValue::Texture(_))
        ));
        assert_eq!(
            draw.uniform("u_viewprojection"),
            Some(&UniformValue::Mat4(camera().view_projection()))
        );
    }

    #[test]
    fn test_gbuffer_texels_travel_through_the_scratch_target() {
        let device = HeadlessDevice::new();
        let targets = FrameTargets::new(&device, 4, 4, 4).unwrap();
        let gbuffer_color = LinearRgba::new(0.5, 0.25, 1.0, 1.0);

        let mut encoder = device.create_command_encoder(None);
        {
            let mut pass = TargetPass::begin(encoder.as_mut(), &targets.gbuffers);
            pass.clear(ClearValues::color_and_depth(gbuffer_color));
        }
        {
            let mut pass = TargetPass::begin(encoder.as_mut(), &targets.decals);
            pass.clear(ClearValues::color_and_depth(LinearRgba::new(0.0, 0.0, 0.0, 0.0)));
        }
        device.submit_command_buffer(encoder.finish()).unwrap();

        let albedo = targets.gbuffers.color(GBUFFER_ALBEDO).unwrap();
        let scratch = targets.decals.color(GBUFFER_ALBEDO).unwrap();
        let before = device.read_texels(albedo).unwrap();
        assert_ne!(device.read_texels(scratch).unwrap(), before);

        let scene = decal_scene();
        let world = RenderCallCollector::new().collect(&scene, Some(&camera()));
        run(&device, &targets, &world);

        assert_eq!(device.read_texels(scratch).unwrap(), before);
        assert_eq!(device.read_texels(albedo).unwrap(), before);
        assert_eq!(
            device.read_texels(targets.gbuffers.depth_texture.unwrap()),
            device.read_texels(targets.decals.depth_texture.unwrap())
        );
    }

    #[test]
    fn test_no_decals_issue_no_commands() {
        let device = HeadlessDevice::new();
        let targets = FrameTargets::new(&device, 8, 8, 4).unwrap();
        let world = RenderWorld::new();
        assert_eq!(run(&device, &targets, &world), 0);
        assert!(device.command_log().is_empty());
    }
}
