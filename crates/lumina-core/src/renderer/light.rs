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

//! Defines light types for the rendering system.
//!
//! A [`Light`] holds the parameters shared by every light and a [`LightType`]
//! carrying the type-specific ones. Position and direction come from the
//! transform of the entity owning the light.

use super::camera::{Camera, Projection};
use crate::math::{degrees_to_radians, LinearRgba, Mat4, Vec3};

/// A directional light source that illuminates from a uniform direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Depth range covered by the orthographic shadow camera.
    pub shadow_depth: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            shadow_depth: 1000.0,
        }
    }
}

/// A point light source that emits light in all directions from a single point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    /// The distance beyond which the light has no effect.
    pub max_distance: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            max_distance: 100.0,
        }
    }
}

/// A spot light source that emits light in a cone from a single point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    /// The distance beyond which the light has no effect.
    pub max_distance: f32,
    /// Half-angle of the cone, in degrees.
    pub cone_angle: f32,
    /// Exponent of the angular falloff inside the cone.
    pub spot_exponent: f32,
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            max_distance: 100.0,
            cone_angle: 30.0,
            spot_exponent: 10.0,
        }
    }
}

/// The kind of a light and its type-specific parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightType {
    /// An infinitely distant light.
    Directional(DirectionalLight),
    /// An omnidirectional local light.
    Point(PointLight),
    /// A cone-shaped local light.
    Spot(SpotLight),
}

impl LightType {
    /// The code read from `u_light_type` by the shading programs.
    pub fn shader_code(&self) -> i32 {
        match self {
            LightType::Point(_) => 1,
            LightType::Spot(_) => 2,
            LightType::Directional(_) => 3,
        }
    }

    /// Whether this is a directional light.
    pub fn is_directional(&self) -> bool {
        matches!(self, LightType::Directional(_))
    }
}

/// `u_light_type` value of a pass that applies only ambient and emissive light.
pub const AMBIENT_ONLY_LIGHT_CODE: i32 = 0;

/// A light source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    /// Type and type-specific parameters.
    pub kind: LightType,
    /// Color in linear space.
    pub color: LinearRgba,
    /// Intensity multiplier.
    pub intensity: f32,
    /// Size of the emitting area: softens shadows, and sets the half extent of
    /// the orthographic shadow box of directional lights.
    pub area_size: f32,
    /// Whether the light renders a shadow map.
    pub cast_shadows: bool,
    /// Depth bias applied when comparing against the shadow map.
    pub shadow_bias: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            kind: LightType::Point(PointLight::default()),
            color: LinearRgba::WHITE,
            intensity: 1.0,
            area_size: 1000.0,
            cast_shadows: false,
            shadow_bias: 0.001,
        }
    }
}

impl Light {
    /// Creates a light of the given type with default shared parameters.
    pub fn new(kind: LightType) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    /// The influence radius, or `None` for directional lights.
    pub fn max_distance(&self) -> Option<f32> {
        match self.kind {
            LightType::Directional(_) => None,
            LightType::Point(p) => Some(p.max_distance),
            LightType::Spot(s) => Some(s.max_distance),
        }
    }

    /// Cosine of the spot cone half-angle, `0.0` for other lights.
    pub fn spot_cosine_cutoff(&self) -> f32 {
        match self.kind {
            LightType::Spot(s) => degrees_to_radians(s.cone_angle).cos(),
            _ => 0.0,
        }
    }

    /// The spot falloff exponent, `0.0` for other lights.
    pub fn spot_exponent(&self) -> f32 {
        match self.kind {
            LightType::Spot(s) => s.spot_exponent,
            _ => 0.0,
        }
    }

    /// Builds the camera a shadow map is rendered from, given the light's world transform.
    ///
    /// # Returns
    ///
    /// `None` for point lights, which have no shadow camera, and for transforms
    /// that do not yield a valid view.
    pub fn shadow_camera(&self, transform: &Mat4) -> Option<Camera> {
        let position = transform.translation();
        let direction = transform.forward();
        let projection = match self.kind {
            LightType::Point(_) => return None,
            LightType::Spot(spot) => Projection::Perspective {
                fov_y_degrees: (spot.cone_angle * 2.0).min(179.0),
                aspect_ratio: 1.0,
                near: 0.1,
                far: spot.max_distance,
            },
            LightType::Directional(dir) => Projection::Orthographic {
                left: -self.area_size,
                right: self.area_size,
                bottom: -self.area_size,
                top: self.area_size,
                near: 0.1,
                far: dir.shadow_depth,
            },
        };
        let target = position + direction;
        Camera::look_at(position, target, transform.up(), projection)
            .or_else(|| Camera::look_at(position, target, Vec3::Z, projection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_point_light_has_no_shadow_camera() {
        let light = Light::new(LightType::Point(PointLight::default()));
        assert!(light.shadow_camera(&Mat4::IDENTITY).is_none());
    }

    #[test]
    fn test_spot_shadow_camera_looks_along_forward() {
        let light = Light::new(LightType::Spot(SpotLight {
            max_distance: 50.0,
            cone_angle: 45.0,
            spot_exponent: 1.0,
        }));
        let transform = Mat4::from_translation(Vec3::new(0.0, 10.0, 0.0)) * Mat4::from_rotation_x(-crate::math::FRAC_PI_2);
        let camera = light.shadow_camera(&transform).expect("spot lights have a shadow camera");
        assert_eq!(camera.eye(), Vec3::new(0.0, 10.0, 0.0));
        assert!(camera.center().y < 10.0);
        assert_eq!(camera.near_far(), (0.1, 50.0));
    }

    #[test]
    fn test_spot_cutoff_is_cosine_of_cone() {
        let light = Light::new(LightType::Spot(SpotLight {
            cone_angle: 60.0,
            ..Default::default()
        }));
        assert_relative_eq!(light.spot_cosine_cutoff(), 0.5, epsilon = 1e-6);
        assert_eq!(light.max_distance(), Some(100.0));
    }

    #[test]
    fn test_directional_shadow_camera_is_orthographic() {
        let light = Light::new(LightType::Directional(DirectionalLight::default()));
        let camera = light.shadow_camera(&Mat4::IDENTITY).unwrap();
        assert!(matches!(camera.projection(), Projection::Orthographic { .. }));
        assert!(light.max_distance().is_none());
    }
}
