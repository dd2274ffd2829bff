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

//! Implements deferred light accumulation.
//!
//! The `LightingLane` shades the G-buffer once per light into the illumination
//! target. Directional lights cover the screen with a full-screen quad. Point
//! and spot lights draw a sphere bounding their influence, so only pixels
//! inside the volume are shaded.
//!
//! # Light Volumes
//!
//! The sphere is rasterized with its front faces culled and a `Greater` depth
//! test against the copied scene depth: a back face passes only where a surface
//! lies in front of it. This stays correct when the camera is inside the volume,
//! where the front faces would be clipped away.

use super::bind_gbuffer_textures;
use crate::render_lane::{bind_ambient_only, bind_light, FrameContext, FrameTargets, TargetPass};
use lumina_core::{
    lane::{Lane, LaneKind},
    math::{LinearRgba, Mat4, Vec3},
    renderer::{
        api::program, BlendState, ClearValues, CommandEncoder, CompareFunction, CullMode,
        DepthState, RenderState, TextureId,
    },
};

/// Render state of the full-screen pass adding a light on top of earlier ones.
pub const ADDITIVE_FULLSCREEN: RenderState = RenderState::fullscreen(Some(BlendState::ADDITIVE));

/// Render state of point and spot light volumes.
pub const LIGHT_VOLUME_STATE: RenderState = RenderState {
    blend: Some(BlendState::ADDITIVE),
    depth: DepthState::read_only(CompareFunction::Greater),
    cull_mode: CullMode::Front,
    color_writes: true,
};

/// Per-frame options of the lighting lane.
#[derive(Debug, Clone, Copy, Default)]
pub struct LightingOptions {
    /// The AO texture modulating the ambient term, if SSAO ran.
    pub ao_texture: Option<TextureId>,
    /// Outputs the AO factor instead of lighting, for inspection.
    pub show_ao: bool,
}

/// What the lighting lane drew.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LightingReport {
    /// Full-screen passes, including the ambient-only pass.
    pub fullscreen_passes: usize,
    /// Point and spot light volumes.
    pub volume_passes: usize,
}

/// A lane that accumulates lighting from the G-buffer.
#[derive(Debug, Default, Clone, Copy)]
pub struct LightingLane;

impl LightingLane {
    /// Creates a new `LightingLane`.
    pub fn new() -> Self {
        Self
    }

    /// Clears the illumination target and accumulates every light of the view.
    ///
    /// Ambient and emissive terms are applied exactly once: by the first
    /// directional pass, or by an ambient-only full-screen pass when the view
    /// has no directional light.
    pub fn render(
        &self,
        encoder: &mut dyn CommandEncoder,
        ctx: &FrameContext,
        targets: &FrameTargets,
        options: LightingOptions,
    ) -> LightingReport {
        let mut report = LightingReport::default();
        let mut pass = TargetPass::begin(encoder, &targets.illumination);
        pass.clear(ClearValues::color_and_depth(LinearRgba::TRANSPARENT));
        if let Some(depth) = targets.scene_depth() {
            pass.copy_depth_to_bound_target(depth);
        }

        if pass.use_program(program::DEFERRED).is_ok() {
            bind_gbuffer_textures(&mut *pass, targets);
            self.bind_view(&mut *pass, ctx, options);
            pass.set_uniform("u_ambient_light", ctx.scene.ambient_light.into());
            pass.set_uniform("u_emissive_enabled", true.into());
            pass.set_render_state(RenderState::fullscreen(None));

            let mut directional = ctx.world.directional_lights().peekable();
            if directional.peek().is_none() {
                bind_ambient_only(&mut *pass);
                pass.draw_mesh(&ctx.resources.quad);
                report.fullscreen_passes += 1;
            }
            for light in directional {
                if report.fullscreen_passes == 1 {
                    pass.set_render_state(ADDITIVE_FULLSCREEN);
                    pass.set_uniform("u_ambient_light", Vec3::ZERO.into());
                    pass.set_uniform("u_emissive_enabled", false.into());
                }
                bind_light(&mut *pass, light, ctx.shadow_maps.get(light.entity));
                pass.draw_mesh(&ctx.resources.quad);
                report.fullscreen_passes += 1;
            }
        } else {
            log::warn!("LightingLane: program '{}' is missing", program::DEFERRED);
        }

        if ctx.world.local_lights().next().is_none() {
            return report;
        }
        if pass.use_program(program::DEFERRED_WORLD_SPACE).is_err() {
            log::warn!(
                "LightingLane: program '{}' is missing",
                program::DEFERRED_WORLD_SPACE
            );
            return report;
        }
        pass.set_render_state(LIGHT_VOLUME_STATE);
        bind_gbuffer_textures(&mut *pass, targets);
        self.bind_view(&mut *pass, ctx, options);
        pass.set_uniform("u_viewprojection", ctx.camera.view_projection().into());
        pass.set_uniform("u_ambient_light", Vec3::ZERO.into());
        pass.set_uniform("u_emissive_enabled", false.into());

        for light in ctx.world.local_lights() {
            let radius = light.light.max_distance().unwrap_or(0.0);
            if radius <= 0.0 {
                continue;
            }
            let model = Mat4::from_translation(light.position) * Mat4::from_scale(Vec3::splat(radius));
            pass.set_uniform("u_model", model.into());
            bind_light(&mut *pass, light, ctx.shadow_maps.get(light.entity));
            pass.draw_mesh(&ctx.resources.sphere);
            report.volume_passes += 1;
        }

        log::trace!(
            "LightingLane: {} full-screen passes, {} light volumes",
            report.fullscreen_passes,
            report.volume_passes
        );
        report
    }

    fn bind_view(&self, encoder: &mut dyn CommandEncoder, ctx: &FrameContext, options: LightingOptions) {
        encoder.set_uniform(
            "u_inverse_viewprojection",
            ctx.camera.inverse_view_projection().into(),
        );
        encoder.set_uniform("u_camera_position", ctx.camera.eye().into());
        encoder.set_uniform(
            "u_ao_texture",
            options.ao_texture.unwrap_or(ctx.resources.white_texture).into(),
        );
        encoder.set_uniform("u_ao_show", options.show_ao.into());
    }
}

impl Lane for LightingLane {
    fn strategy_name(&self) -> &'static str {
        "DeferredLighting"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Lighting
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_volume_state() {
        assert_eq!(LIGHT_VOLUME_STATE.cull_mode, CullMode::Front);
        assert!(LIGHT_VOLUME_STATE.depth.test_enabled);
        assert!(!LIGHT_VOLUME_STATE.depth.write_enabled);
        assert_eq!(LIGHT_VOLUME_STATE.depth.compare, CompareFunction::Greater);
        assert_eq!(LIGHT_VOLUME_STATE.blend, Some(BlendState::ADDITIVE));
    }

    #[test]
    fn test_additive_fullscreen_ignores_depth() {
        assert!(!ADDITIVE_FULLSCREEN.depth.test_enabled);
        assert_eq!(ADDITIVE_FULLSCREEN.cull_mode, CullMode::None);
    }
}
