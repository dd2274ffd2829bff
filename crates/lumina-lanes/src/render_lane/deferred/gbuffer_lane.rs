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

//! The geometry stage of the deferred pipeline.

use crate::render_lane::{
    bind_camera, bind_material, material_render_state, FrameContext, FrameTargets, TargetPass,
};
use lumina_core::{
    lane::{Lane, LaneKind},
    math::LinearRgba,
    renderer::{api::program, ClearValues, CommandEncoder},
};

/// A lane that rasterizes every render call into the G-buffer.
///
/// Translucent materials are written with screen-door dithering
/// (`u_use_dither`) and are therefore lit like opaque surfaces.
#[derive(Debug, Default, Clone, Copy)]
pub struct GBufferLane;

impl GBufferLane {
    /// Creates a new `GBufferLane`.
    pub fn new() -> Self {
        Self
    }

    /// Clears the G-buffer and fills it from the view.
    ///
    /// # Returns
    ///
    /// The number of draws issued.
    pub fn render(
        &self,
        encoder: &mut dyn CommandEncoder,
        ctx: &FrameContext,
        targets: &FrameTargets,
    ) -> usize {
        let mut pass = TargetPass::begin(encoder, &targets.gbuffers);
        pass.clear(ClearValues::color_and_depth(LinearRgba::TRANSPARENT));
        if pass.use_program(program::GBUFFERS).is_err() {
            log::warn!("GBufferLane: program '{}' is missing", program::GBUFFERS);
            return 0;
        }
        bind_camera(&mut *pass, ctx.camera);

        let mut draws = 0;
        for call in &ctx.world.render_calls {
            if call.mesh.is_empty() {
                continue;
            }
            // Channels store raw attributes; blending would mix them.
            pass.set_render_state(material_render_state(&call.material).with_blend(None));
            pass.set_uniform("u_model", call.transform.into());
            bind_material(&mut *pass, &call.material, ctx.resources);
            pass.set_uniform("u_use_dither", call.is_translucent().into());
            pass.draw_mesh(&call.mesh);
            draws += 1;
        }
        log::trace!("GBufferLane: {} draws", draws);
        draws
    }
}

impl Lane for GBufferLane {
    fn strategy_name(&self) -> &'static str {
        "GBuffer"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Render
    }
}
