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

//! Names of the shader programs the frame pipeline addresses.
//!
//! Programs are owned by the graphics backend; the renderer only refers to them
//! by these names and binds uniforms by name.

/// Unlit, textured forward rendering.
pub const TEXTURE: &str = "texture";
/// Forward lighting, one light per pass.
pub const LIGHT_MULTIPASS: &str = "light";
/// Forward lighting, all lights in one pass.
pub const LIGHT_SINGLEPASS: &str = "light_singlepass";
/// Normal, occlusion and UV visualization, selected by `u_texture_type`.
pub const SH2_DEBUG: &str = "sh2debug";
/// Geometry pass writing the G-buffer.
pub const GBUFFERS: &str = "gbuffers";
/// Full-screen deferred light accumulation.
pub const DEFERRED: &str = "deferred";
/// World-space light volume accumulation for point and spot lights.
pub const DEFERRED_WORLD_SPACE: &str = "deferred_ws";
/// Screen-space ambient occlusion.
pub const SSAO: &str = "ssao";
/// Irradiance reconstruction from the probe grid.
pub const IRRADIANCE_SH: &str = "irradiance_sh";
/// Decal projection into the G-buffer.
pub const DECAL: &str = "decal";
/// Depth-only rendering for shadow maps.
pub const FLAT: &str = "flat";
/// Linearized depth visualization.
pub const DEPTH: &str = "depth";
/// Environment sphere.
pub const SKYBOX: &str = "skybox";
/// Single-scattering volumetric light.
pub const VOLUMETRIC: &str = "volumetric_rendering";
/// Probe sphere visualization.
pub const PROBE: &str = "probe";
/// Tone mapping and gamma for presenting the illumination target.
pub const HDR_GAMMA: &str = "applyHDRgamma";
/// Plain texture blit to the viewport.
pub const SCREEN: &str = "screen";

/// Every program the pipeline may request.
pub const ALL: [&str; 17] = [
    TEXTURE,
    LIGHT_MULTIPASS,
    LIGHT_SINGLEPASS,
    SH2_DEBUG,
    GBUFFERS,
    DEFERRED,
    DEFERRED_WORLD_SPACE,
    SSAO,
    IRRADIANCE_SH,
    DECAL,
    FLAT,
    DEPTH,
    SKYBOX,
    VOLUMETRIC,
    PROBE,
    HDR_GAMMA,
    SCREEN,
];
