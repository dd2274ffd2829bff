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

//! Runtime settings for the frame pipeline.

use serde::{Deserialize, Serialize};

/// How surfaces are shaded when rendered through the forward pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RenderMode {
    /// Unlit, textured.
    Textured,
    /// All lights in one pass, capped at the single-pass light limit.
    SinglePass,
    /// One additive pass per light.
    #[default]
    MultiPass,
    /// Visualize normals.
    Normals,
    /// Visualize the occlusion texture.
    Occlusion,
    /// Visualize texture coordinates.
    Uvs,
    /// Visualize the G-buffer channels written by the geometry program.
    GBuffers,
}

/// Whether the main view is shaded forward or deferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PipelineMode {
    /// Forward shading straight into the illumination target.
    Forward,
    /// G-buffer fill, decals, SSAO and light accumulation.
    #[default]
    Deferred,
}

/// Runtime toggles and tunables of the frame pipeline.
///
/// Settings are read every frame. Missing fields fall back to their defaults
/// when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Forward shading mode, also used by probe capture.
    pub render_mode: RenderMode,
    /// Main view pipeline.
    pub pipeline_mode: PipelineMode,
    /// Draw every shadow map along the bottom of the screen.
    pub show_shadowmap: bool,
    /// Replace the final image with the four G-buffer channels.
    pub show_gbuffers: bool,
    /// Replace the final image with the ambient occlusion buffer.
    pub show_ao: bool,
    /// Multiply only the AO term into the lit image (`u_ao_show`).
    pub show_ao_deferred: bool,
    /// Run the volumetric scattering pass.
    pub volumetric_enabled: bool,
    /// Add the reconstructed probe irradiance to the lit image.
    pub irradiance_enabled: bool,
    /// Draw the probe grid as shaded spheres.
    pub show_probes: bool,
    /// Rebake the probe grid before the next frame.
    pub probes_need_rebake: bool,
    /// Edge length of every shadow map, in texels.
    pub shadow_map_resolution: u32,
    /// Edge length of the probe capture target, in texels.
    pub capture_resolution: u32,
    /// Number of hemisphere samples used by SSAO, never fewer than 200.
    pub ssao_sample_count: usize,
    /// Density of the participating medium for volumetric scattering.
    pub air_density: f32,
    /// Offset along the normal used when sampling probes, limiting light leaks.
    pub irradiance_normal_distance: f32,
    /// Radius of the spheres drawn for each probe.
    pub probe_display_size: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            render_mode: RenderMode::MultiPass,
            pipeline_mode: PipelineMode::Deferred,
            show_shadowmap: false,
            show_gbuffers: false,
            show_ao: false,
            show_ao_deferred: false,
            volumetric_enabled: true,
            irradiance_enabled: true,
            show_probes: false,
            probes_need_rebake: true,
            shadow_map_resolution: 1024,
            capture_resolution: 64,
            ssao_sample_count: 256,
            air_density: 0.001,
            irradiance_normal_distance: 10.0,
            probe_display_size: 10.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_the_viewer() {
        let settings = RenderSettings::default();
        assert_eq!(settings.render_mode, RenderMode::MultiPass);
        assert_eq!(settings.pipeline_mode, PipelineMode::Deferred);
        assert!(settings.volumetric_enabled && settings.irradiance_enabled);
        assert!(!settings.show_gbuffers && !settings.show_probes);
        assert!(settings.ssao_sample_count >= 200);
    }

    #[test]
    fn test_partial_ron_falls_back_to_defaults() {
        let settings: RenderSettings =
            ron::from_str("(pipeline_mode: Forward, show_probes: true)").unwrap();
        assert_eq!(settings.pipeline_mode, PipelineMode::Forward);
        assert!(settings.show_probes);
        assert_eq!(settings.capture_resolution, 64);
    }
}
