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
//! Single-scattering fog lit by directional lights.

use crate::render_lane::{bind_light, FrameContext, FrameTargets, TargetPass};
use lumina_core::{
    lane::{Lane, LaneKind},
    renderer::{api::program, BlendState, CommandEncoder, RenderState},
};

/// Render state of every scattering pass: `SRC_ALPHA, ONE` over the lit image.
pub const VOLUMETRIC_STATE: RenderState = RenderState::fullscreen(Some(BlendState::ALPHA_ADDITIVE));

/// A lane that ray-marches the participating medium once per directional light.
#[derive(Debug, Clone, Copy)]
pub struct VolumetricLane {
    /// Density of the medium, `u_air_density`.
    pub air_density: f32,
}

impl Default for VolumetricLane {
    fn default() -> Self {
        Self { air_density: 0.001 }
    }
}

impl VolumetricLane {
    /// Creates a lane with the given medium density.
    pub fn new(air_density: f32) -> Self {
        Self { air_density }
    }

    /// Adds in-scattered light to the illumination target.
    ///
    /// # Returns
    ///
    /// The number of lights marched.
    pub fn render(
        &self,
        encoder: &mut dyn CommandEncoder,
        ctx: &FrameContext,
        targets: &FrameTargets,
    ) -> usize {
        let mut directional = ctx.world.directional_lights().peekable();
        if directional.peek().is_none() {
            return 0;
        }

        let mut pass = TargetPass::begin(encoder, &targets.illumination);
        if pass.use_program(program::VOLUMETRIC).is_err() {
            log::warn!("VolumetricLane: program '{}' is missing", program::VOLUMETRIC);
            return 0;
        }
        pass.set_render_state(VOLUMETRIC_STATE);
        pass.set_uniform(
            "u_inverse_viewprojection",
            ctx.camera.inverse_view_projection().into(),
        );
        pass.set_uniform("u_iRes", targets.gbuffers.inverse_resolution().into());
        pass.set_uniform("u_camera_position", ctx.camera.eye().into());
        if let Some(depth) = targets.scene_depth() {
            pass.set_uniform("u_depth_texture", depth.into());
        }
        pass.set_uniform("u_air_density", self.air_density.into());

        let mut marched = 0;
        for light in directional {
            bind_light(&mut *pass, light, ctx.shadow_maps.get(light.entity));
            pass.draw_mesh(&ctx.resources.quad);
            marched += 1;
        }
        marched
    }
}

impl Lane for VolumetricLane {
    fn strategy_name(&self) -> &'static str {
        "Volumetric"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::PostProcess
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumina_core::renderer::BlendFactor;

    #[test]
    fn test_scattering_blends_source_alpha_onto_destination() {
        let blend = VOLUMETRIC_STATE.blend.unwrap();
        assert_eq!(blend.src_factor, BlendFactor::SrcAlpha);
        assert_eq!(blend.dst_factor, BlendFactor::One);
        assert!(!VOLUMETRIC_STATE.depth.test_enabled);
    }

    #[test]
    fn test_default_density() {
        assert_eq!(VolumetricLane::default().air_density, 0.001);
    }
}
