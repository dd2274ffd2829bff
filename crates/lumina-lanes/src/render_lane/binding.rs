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

//! Uniform uploads shared by the lanes that shade geometry.

use super::{ExtractedLight, SharedResources, ShadowMap};
use lumina_core::{
    asset::Material,
    math::Vec3,
    renderer::{
        BlendState, Camera, CommandEncoder, CullMode, DepthState, RenderState,
        AMBIENT_ONLY_LIGHT_CODE,
    },
};

/// Uploads the view uniforms of `camera`.
pub fn bind_camera(encoder: &mut dyn CommandEncoder, camera: &Camera) {
    encoder.set_uniform("u_viewprojection", camera.view_projection().into());
    encoder.set_uniform("u_camera_position", camera.eye().into());
}

/// Uploads the parameters and textures of `material`.
///
/// Missing textures fall back to white for color, emissive and occlusion, and
/// to black for metallic-roughness and normal maps.
pub fn bind_material(
    encoder: &mut dyn CommandEncoder,
    material: &Material,
    resources: &SharedResources,
) {
    let white = resources.white_texture;
    let black = resources.black_texture;

    encoder.set_uniform("u_color", material.color.into());
    encoder.set_uniform("u_emissive_factor", material.emissive_factor.into());
    encoder.set_uniform("u_alpha_cutoff", material.alpha_mode.alpha_cutoff().into());
    encoder.set_uniform("u_texture", material.color_texture.unwrap_or(white).into());
    encoder.set_uniform(
        "u_emissive_texture",
        material.emissive_texture.unwrap_or(white).into(),
    );
    encoder.set_uniform(
        "u_occlusion_texture",
        material.occlusion_texture.unwrap_or(white).into(),
    );
    encoder.set_uniform(
        "u_metallic_roughness_texture",
        material.metallic_roughness_texture.unwrap_or(black).into(),
    );
    encoder.set_uniform(
        "u_normal_texture",
        material.normal_texture.unwrap_or(black).into(),
    );
}

/// The state a material is rasterized with in geometry passes.
pub fn material_render_state(material: &Material) -> RenderState {
    RenderState {
        blend: material
            .alpha_mode
            .is_translucent()
            .then_some(BlendState::ALPHA),
        depth: DepthState::LESS_WRITE,
        cull_mode: if material.two_sided {
            CullMode::None
        } else {
            CullMode::Back
        },
        color_writes: true,
    }
}

/// Uploads the parameters of one light, and its shadow map when it has one.
pub fn bind_light(
    encoder: &mut dyn CommandEncoder,
    light: &ExtractedLight,
    shadow: Option<&ShadowMap>,
) {
    let params = &light.light;
    encoder.set_uniform("u_light_type", params.kind.shader_code().into());
    encoder.set_uniform("u_light_color", params.color.to_vec3().into());
    encoder.set_uniform("u_light_intensity", params.intensity.into());
    encoder.set_uniform("u_light_position", light.position.into());
    encoder.set_uniform("u_light_vector", light.direction.into());
    encoder.set_uniform(
        "u_light_maxdist",
        params.max_distance().unwrap_or(0.0).into(),
    );
    encoder.set_uniform(
        "u_light_spotCosineCutoff",
        params.spot_cosine_cutoff().into(),
    );
    encoder.set_uniform("u_light_spotExponent", params.spot_exponent().into());
    encoder.set_uniform("u_light_area_size", params.area_size.into());

    match shadow.and_then(|s| s.depth_texture().map(|t| (s, t))) {
        Some((shadow, depth)) if params.cast_shadows => {
            encoder.set_uniform("u_light_cast_shadows", true.into());
            encoder.set_uniform("u_shadowmap", depth.into());
            encoder.set_uniform(
                "u_shadow_viewproj",
                shadow.camera.view_projection().into(),
            );
            encoder.set_uniform("u_shadow_bias", params.shadow_bias.into());
        }
        _ => encoder.set_uniform("u_light_cast_shadows", false.into()),
    }
}

/// Uploads a light-less pass that only contributes ambient and emissive terms.
pub fn bind_ambient_only(encoder: &mut dyn CommandEncoder) {
    encoder.set_uniform("u_light_type", AMBIENT_ONLY_LIGHT_CODE.into());
    encoder.set_uniform("u_light_color", Vec3::ZERO.into());
    encoder.set_uniform("u_light_intensity", 0.0_f32.into());
    encoder.set_uniform("u_light_cast_shadows", false.into());
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumina_core::asset::AlphaMode;

    #[test]
    fn test_material_render_state() {
        let opaque = Material::default();
        let state = material_render_state(&opaque);
        assert_eq!(state.blend, None);
        assert_eq!(state.cull_mode, CullMode::Back);
        assert!(state.depth.write_enabled);

        let glass = Material {
            alpha_mode: AlphaMode::Blend,
            two_sided: true,
            ..Material::default()
        };
        let state = material_render_state(&glass);
        assert_eq!(state.blend, Some(BlendState::ALPHA));
        assert_eq!(state.cull_mode, CullMode::None);
    }
}
