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

//! Defines the intermediate `RenderWorld` and its associated data structures.
//!
//! The `RenderWorld` is a temporary, per-view representation of the scene,
//! flattened for consumption by the rendering lanes. It is populated by the
//! [`RenderCallCollector`](super::RenderCallCollector) and rebuilt every
//! collection pass.

use lumina_core::{
    asset::Material,
    math::{Aabb, Mat4, Vec3},
    renderer::{Light, LightType, Mesh},
    scene::{Decal, EntityId},
};
use std::sync::Arc;

/// A single draw instruction: one visible drawable node instance.
#[derive(Debug, Clone)]
pub struct RenderCall {
    /// The world matrix of the node.
    pub transform: Mat4,
    /// The geometry to draw.
    pub mesh: Arc<Mesh>,
    /// The material the geometry is shaded with.
    pub material: Arc<Material>,
    /// The world-space bounds of the mesh under `transform`.
    pub world_bounds: Aabb,
    /// Distance from the collecting camera to the center of `world_bounds`.
    /// Zero when collected without a camera.
    pub distance_to_camera: f32,
}

impl RenderCall {
    /// Whether the call must be blended back-to-front.
    pub fn is_translucent(&self) -> bool {
        self.material.alpha_mode.is_translucent()
    }
}

/// A light flattened with its world placement.
#[derive(Debug, Clone)]
pub struct ExtractedLight {
    /// The entity the light belongs to. Shadow maps are keyed by it.
    pub entity: EntityId,
    /// The light parameters.
    pub light: Light,
    /// The world matrix of the light entity.
    pub transform: Mat4,
    /// World position (translation of `transform`).
    pub position: Vec3,
    /// World direction (front axis of `transform`).
    pub direction: Vec3,
}

impl ExtractedLight {
    /// Builds the extracted form of `light` placed by `transform`.
    pub fn new(entity: EntityId, light: Light, transform: Mat4) -> Self {
        Self {
            entity,
            light,
            position: transform.translation(),
            direction: transform.forward(),
            transform,
        }
    }

    /// Whether the light affects the whole scene.
    pub fn is_directional(&self) -> bool {
        self.light.kind.is_directional()
    }
}

/// A decal flattened with its world placement.
#[derive(Debug, Clone)]
pub struct ExtractedDecal {
    /// The entity the decal belongs to.
    pub entity: EntityId,
    /// Projection parameters.
    pub decal: Decal,
    /// The world matrix of the projection box.
    pub transform: Mat4,
    /// The inverse of `transform`, used to reproject surfaces into decal space.
    pub inverse_transform: Mat4,
}

/// A collection of all data collected from the scene for one view.
#[derive(Debug, Default, Clone)]
pub struct RenderWorld {
    /// Draw instructions, ordered for the view when a camera was supplied.
    pub render_calls: Vec<RenderCall>,
    /// Lights influencing the view.
    pub lights: Vec<ExtractedLight>,
    /// Decals of the scene.
    pub decals: Vec<ExtractedDecal>,
}

impl RenderWorld {
    /// Creates a new, empty `RenderWorld`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all the data in the `RenderWorld`, preparing it for the next collection.
    pub fn clear(&mut self) {
        self.render_calls.clear();
        self.lights.clear();
        self.decals.clear();
    }

    /// Returns the directional lights, in collection order.
    pub fn directional_lights(&self) -> impl Iterator<Item = &ExtractedLight> {
        self.lights.iter().filter(|l| l.is_directional())
    }

    /// Returns the point and spot lights, in collection order.
    pub fn local_lights(&self) -> impl Iterator<Item = &ExtractedLight> {
        self.lights.iter().filter(|l| !l.is_directional())
    }

    /// Returns the number of directional lights.
    pub fn directional_light_count(&self) -> usize {
        self.directional_lights().count()
    }

    /// Returns the number of point lights.
    pub fn point_light_count(&self) -> usize {
        self.lights
            .iter()
            .filter(|l| matches!(l.light.kind, LightType::Point(_)))
            .count()
    }

    /// Returns the number of spot lights.
    pub fn spot_light_count(&self) -> usize {
        self.lights
            .iter()
            .filter(|l| matches!(l.light.kind, LightType::Spot(_)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumina_core::renderer::{DirectionalLight, PointLight, SpotLight};

    fn light(id: usize, kind: LightType) -> ExtractedLight {
        ExtractedLight::new(EntityId(id), Light::new(kind), Mat4::IDENTITY)
    }

    #[test]
    fn test_render_world_light_counts() {
        let mut world = RenderWorld::new();
        world
            .lights
            .push(light(0, LightType::Directional(DirectionalLight::default())));
        world.lights.push(light(1, LightType::Point(PointLight::default())));
        world.lights.push(light(2, LightType::Point(PointLight::default())));
        world.lights.push(light(3, LightType::Spot(SpotLight::default())));

        assert_eq!(world.directional_light_count(), 1);
        assert_eq!(world.point_light_count(), 2);
        assert_eq!(world.spot_light_count(), 1);
        assert_eq!(world.local_lights().count(), 3);
    }

    #[test]
    fn test_render_world_clear() {
        let mut world = RenderWorld::new();
        world.lights.push(light(0, LightType::Point(PointLight::default())));
        world.clear();
        assert!(world.lights.is_empty());
        assert!(world.render_calls.is_empty());
        assert!(world.decals.is_empty());
    }

    #[test]
    fn test_extracted_light_placement() {
        let transform = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let extracted = ExtractedLight::new(
            EntityId(7),
            Light::new(LightType::Spot(SpotLight::default())),
            transform,
        );
        assert_eq!(extracted.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(extracted.direction, Vec3::new(0.0, 0.0, -1.0));
        assert!(!extracted.is_directional());
    }
}
