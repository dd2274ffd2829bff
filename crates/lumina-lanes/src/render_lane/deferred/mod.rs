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

//! Deferred shading lanes.
//!
//! The stages run strictly in this order every deferred frame:
//!
//! 1. [`GBufferLane`]: geometry into albedo, normal and material channels plus depth.
//! 2. [`DecalLane`]: decals projected onto the G-buffer through a scratch copy.
//! 3. [`SsaoLane`]: screen-space ambient occlusion at half resolution.
//! 4. [`LightingLane`]: per-light accumulation into the illumination target.

mod decal_lane;
mod gbuffer_lane;
mod lighting_lane;
mod ssao_lane;

pub use decal_lane::*;
pub use gbuffer_lane::*;
pub use lighting_lane::*;
pub use ssao_lane::*;

use super::{FrameTargets, GBUFFER_ALBEDO, GBUFFER_EXTRA, GBUFFER_NORMAL};
use lumina_core::renderer::CommandEncoder;

/// Binds the G-buffer channels and depth as the textures full-screen passes read.
pub fn bind_gbuffer_textures(encoder: &mut dyn CommandEncoder, targets: &FrameTargets) {
    let gbuffers = &targets.gbuffers;
    for (name, channel) in [
        ("u_color_texture", GBUFFER_ALBEDO),
        ("u_normal_texture", GBUFFER_NORMAL),
        ("u_extra_texture", GBUFFER_EXTRA),
    ] {
        if let Some(texture) = gbuffers.color(channel) {
            encoder.set_uniform(name, texture.into());
        }
    }
    if let Some(depth) = targets.scene_depth() {
        encoder.set_uniform("u_depth_texture", depth.into());
    }
    encoder.set_uniform("u_iRes", gbuffers.inverse_resolution().into());
}
