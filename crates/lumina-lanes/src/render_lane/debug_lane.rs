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
//! On-screen inspection views.
//!
//! Each view draws straight onto the default framebuffer after presentation,
//! restricting itself with viewports and restoring the full viewport when done.

use crate::render_lane::{
    draw_texture, FrameContext, FrameTargets, TargetPass, GBUFFER_ALBEDO, GBUFFER_EXTRA,
    GBUFFER_NORMAL,
};
use lumina_core::{
    lane::{Lane, LaneKind},
    math::Vec2,
    renderer::{api::program, CommandEncoder, TextureId, Viewport},
};

/// Fraction of the screen width each shadow-map square occupies.
pub const SHADOW_STRIP_FRACTION: f32 = 0.2;

/// A lane drawing the G-buffer, shadow maps and AO buffer on screen.
#[derive(Debug, Default, Clone, Copy)]
pub struct DebugLane;

impl DebugLane {
    /// Creates a new `DebugLane`.
    pub fn new() -> Self {
        Self
    }

    /// Splits the screen in four: albedo bottom-left, normal bottom-right,
    /// material top-right and linearized depth top-left.
    pub fn render_gbuffers(
        &self,
        encoder: &mut dyn CommandEncoder,
        ctx: &FrameContext,
        targets: &FrameTargets,
    ) {
        let (width, height) = (targets.width(), targets.height());
        let (half_w, half_h) = (width / 2, height / 2);
        let mut pass = TargetPass::begin_screen(encoder);

        for (channel, x, y) in [
            (GBUFFER_ALBEDO, 0, 0),
            (GBUFFER_NORMAL, half_w, 0),
            (GBUFFER_EXTRA, half_w, half_h),
        ] {
            if let Some(texture) = targets.gbuffers.color(channel) {
                pass.set_viewport(Viewport::new(x, y, half_w, half_h));
                draw_texture(&mut *pass, ctx, program::SCREEN, texture);
            }
        }
        if let Some(depth) = targets.scene_depth() {
            pass.set_viewport(Viewport::new(0, half_h, half_w, half_h));
            let (near, far) = ctx.camera.near_far();
            draw_depth(&mut *pass, ctx, depth, near, far);
        }
        pass.set_viewport(Viewport::new(0, 0, width, height));
    }

    /// Lays every shadow map along the bottom edge as squares of a fifth of
    /// the screen width, left to right.
    ///
    /// # Returns
    ///
    /// The number of maps drawn.
    pub fn render_shadow_maps(
        &self,
        encoder: &mut dyn CommandEncoder,
        ctx: &FrameContext,
        targets: &FrameTargets,
    ) -> usize {
        let (width, height) = (targets.width(), targets.height());
        let side = (width as f32 * SHADOW_STRIP_FRACTION) as u32;
        let mut pass = TargetPass::begin_screen(encoder);

        let mut drawn = 0;
        for (_, map) in ctx.shadow_maps.iter() {
            let Some(depth) = map.depth_texture() else {
                continue;
            };
            pass.set_viewport(Viewport::new(drawn * side, 0, side, side));
            let (near, far) = map.camera.near_far();
            if draw_depth(&mut *pass, ctx, depth, near, far) {
                drawn += 1;
            }
        }
        pass.set_viewport(Viewport::new(0, 0, width, height));
        drawn as usize
    }

    /// Replaces the image with the AO buffer.
    pub fn render_ao(
        &self,
        encoder: &mut dyn CommandEncoder,
        ctx: &FrameContext,
        targets: &FrameTargets,
    ) -> bool {
        let Some(ao) = targets.ao.color(0) else {
            return false;
        };
        let mut pass = TargetPass::begin_screen(encoder);
        pass.set_viewport(Viewport::new(0, 0, targets.width(), targets.height()));
        draw_texture(&mut *pass, ctx, program::SCREEN, ao)
    }
}

fn draw_depth(
    encoder: &mut dyn CommandEncoder,
    ctx: &FrameContext,
    depth: TextureId,
    near: f32,
    far: f32,
) -> bool {
    // Uniforms persist per program across the re-activation in draw_texture.
    if encoder.use_program(program::DEPTH).is_err() {
        log::warn!("DebugLane: program '{}' is missing", program::DEPTH);
        return false;
    }
    encoder.set_uniform("u_camera_nearfar", Vec2::new(near, far).into());
    draw_texture(encoder, ctx, program::DEPTH, depth)
}

impl Lane for DebugLane {
    fn strategy_name(&self) -> &'static str {
        "Debug"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Debug
    }
}
