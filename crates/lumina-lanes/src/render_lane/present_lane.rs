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
//! Presentation of the lit image on the default framebuffer.

use crate::render_lane::{FrameContext, FrameTargets, TargetPass};
use lumina_core::{
    lane::{Lane, LaneKind},
    renderer::{api::program, ClearValues, CommandEncoder, RenderState, TextureId},
};

/// Draws `texture` over the current viewport with `program`.
///
/// Returns `false` without drawing if the program is missing.
pub fn draw_texture(
    encoder: &mut dyn CommandEncoder,
    ctx: &FrameContext,
    program: &str,
    texture: TextureId,
) -> bool {
    if encoder.use_program(program).is_err() {
        log::warn!("draw_texture: program '{}' is missing", program);
        return false;
    }
    encoder.set_render_state(RenderState::fullscreen(None));
    encoder.set_uniform("u_texture", texture.into());
    encoder.draw_mesh(&ctx.resources.quad);
    true
}

/// A lane that tone-maps the illumination target onto the screen.
#[derive(Debug, Default, Clone, Copy)]
pub struct PresentLane;

impl PresentLane {
    /// Creates a new `PresentLane`.
    pub fn new() -> Self {
        Self
    }

    /// Clears the screen and draws the illumination target through the HDR
    /// gamma program, falling back to a plain copy when it is missing.
    pub fn render(
        &self,
        encoder: &mut dyn CommandEncoder,
        ctx: &FrameContext,
        targets: &FrameTargets,
    ) -> bool {
        let Some(lit) = targets.illumination.color(0) else {
            return false;
        };
        let mut pass = TargetPass::begin_screen(encoder);
        pass.clear(ClearValues::color_and_depth(ctx.scene.background_color));
        draw_texture(&mut *pass, ctx, program::HDR_GAMMA, lit)
            || draw_texture(&mut *pass, ctx, program::SCREEN, lit)
    }
}

impl Lane for PresentLane {
    fn strategy_name(&self) -> &'static str {
        "Present"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::PostProcess
    }
}
