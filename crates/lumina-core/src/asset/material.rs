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

//! Material data consumed by the geometry and forward passes.

use crate::math::{LinearRgba, Vec3};
use crate::renderer::api::TextureId;

/// Specifies how a material handles transparency.
///
/// Translucency drives render-call ordering: `Blend` materials are drawn back
/// to front after everything else, are skipped by shadow passes and are
/// written to the G-buffer with screen-door dithering.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AlphaMode {
    /// Fully opaque.
    #[default]
    Opaque,
    /// Fragments with alpha below the cutoff are discarded.
    Mask(f32),
    /// Alpha blended over what is behind it.
    Blend,
}

impl AlphaMode {
    /// Whether the material is blended and must be sorted back to front.
    #[inline]
    pub fn is_translucent(&self) -> bool {
        matches!(self, AlphaMode::Blend)
    }

    /// The value bound to `u_alpha_cutoff`: the mask cutoff, or `0.0`.
    #[inline]
    pub fn alpha_cutoff(&self) -> f32 {
        match self {
            AlphaMode::Mask(cutoff) => *cutoff,
            _ => 0.0,
        }
    }
}

/// A surface material.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// A debug name.
    pub name: String,
    /// Base color factor.
    pub color: LinearRgba,
    /// Emissive color factor.
    pub emissive_factor: Vec3,
    /// Transparency handling.
    pub alpha_mode: AlphaMode,
    /// Disables back-face culling when set.
    pub two_sided: bool,
    /// Base color texture.
    pub color_texture: Option<TextureId>,
    /// Emissive texture.
    pub emissive_texture: Option<TextureId>,
    /// Metallic (B) and roughness (G) texture.
    pub metallic_roughness_texture: Option<TextureId>,
    /// Ambient occlusion texture.
    pub occlusion_texture: Option<TextureId>,
    /// Tangent-space normal map.
    pub normal_texture: Option<TextureId>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            color: LinearRgba::WHITE,
            emissive_factor: Vec3::ZERO,
            alpha_mode: AlphaMode::Opaque,
            two_sided: false,
            color_texture: None,
            emissive_texture: None,
            metallic_roughness_texture: None,
            occlusion_texture: None,
            normal_texture: None,
        }
    }
}

impl Material {
    /// Creates an untextured material of the given color.
    pub fn with_color(name: impl Into<String>, color: LinearRgba) -> Self {
        Self {
            name: name.into(),
            color,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_mode_default() {
        assert_eq!(AlphaMode::default(), AlphaMode::Opaque);
        assert!(!AlphaMode::Mask(0.5).is_translucent());
        assert!(AlphaMode::Blend.is_translucent());
    }

    #[test]
    fn test_alpha_cutoff_only_for_mask() {
        assert_eq!(AlphaMode::Mask(0.25).alpha_cutoff(), 0.25);
        assert_eq!(AlphaMode::Blend.alpha_cutoff(), 0.0);
    }
}
