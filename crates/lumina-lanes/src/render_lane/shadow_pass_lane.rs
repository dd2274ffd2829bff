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

//! Implements the shadow map generation lane.
//!
//! The `ShadowPassLane` renders the scene from each shadow-casting light into a
//! dedicated depth-only target. Maps are refreshed only when the lane is marked
//! dirty; between refreshes the lighting lanes sample the cached maps.
//!
//! # Supported Light Types
//!
//! - **Directional lights**: orthographic camera covering the light's area size.
//! - **Spot lights**: perspective camera matching the cone.
//! - **Point lights**: not shadowed.

use super::{ExtractedLight, RenderCallCollector, RenderWorld, SortPolicy, TargetPass};
use ahash::AHashMap;
use lumina_core::{
    lane::{Lane, LaneKind},
    renderer::{
        api::program, Camera, ClearValues, CommandEncoder, DepthState, GraphicsDevice, LightType,
        RenderState, RenderTarget, RenderTargetDescriptor, TextureId,
    },
    scene::{EntityId, Scene},
};
use std::borrow::Cow;

/// The depth map of one light and the camera it was rendered from.
#[derive(Debug, Clone)]
pub struct ShadowMap {
    /// The depth-only target.
    pub target: RenderTarget,
    /// The light's shadow camera at the last refresh.
    pub camera: Camera,
}

impl ShadowMap {
    /// The depth texture sampled by the lighting lanes.
    pub fn depth_texture(&self) -> Option<TextureId> {
        self.target.depth_texture
    }
}

/// The shadow maps of every shadow-casting light, keyed by light entity.
#[derive(Debug, Default)]
pub struct ShadowMaps {
    maps: AHashMap<EntityId, ShadowMap>,
}

impl ShadowMaps {
    /// An empty set, for views that do not sample shadows.
    pub fn new() -> Self {
        Self::default()
    }

    /// The map of a light, if it has one.
    pub fn get(&self, light: EntityId) -> Option<&ShadowMap> {
        self.maps.get(&light)
    }

    /// Iterates over the maps, ordered by light entity.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &ShadowMap)> {
        let mut entries: Vec<_> = self.maps.iter().map(|(id, map)| (*id, map)).collect();
        entries.sort_by_key(|(id, _)| *id);
        entries.into_iter()
    }

    /// Number of maps.
    pub fn len(&self) -> usize {
        self.maps.len()
    }

    /// Whether no light has a map.
    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

/// A lane that renders depth-only shadow maps.
#[derive(Debug)]
pub struct ShadowPassLane {
    resolution: u32,
    dirty: bool,
    maps: ShadowMaps,
}

impl ShadowPassLane {
    /// Creates a lane producing square maps of `resolution` texels. Starts dirty.
    pub fn new(resolution: u32) -> Self {
        Self {
            resolution: resolution.max(1),
            dirty: true,
            maps: ShadowMaps::new(),
        }
    }

    /// Requests a refresh on the next call to [`ShadowPassLane::refresh`].
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether the maps are stale.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The maps of the last refresh.
    pub fn shadow_maps(&self) -> &ShadowMaps {
        &self.maps
    }

    /// Changes the map resolution. Existing maps are recreated at the next refresh.
    pub fn set_resolution(&mut self, resolution: u32) {
        let resolution = resolution.max(1);
        if resolution != self.resolution {
            self.resolution = resolution;
            self.dirty = true;
        }
    }

    /// Re-renders every shadow map if the lane is dirty.
    ///
    /// # Arguments
    /// * `device`: Creates and releases the depth targets.
    /// * `encoder`: Receives the depth passes.
    /// * `scene`: Geometry is re-collected from each light's point of view.
    /// * `lights`: The candidate lights. Lights without `cast_shadows`, point
    ///   lights and lights without a valid shadow camera are skipped.
    ///
    /// # Returns
    ///
    /// The number of maps rendered.
    pub fn refresh(
        &mut self,
        device: &dyn GraphicsDevice,
        encoder: &mut dyn CommandEncoder,
        scene: &Scene,
        lights: &[ExtractedLight],
    ) -> usize {
        if !self.dirty {
            return 0;
        }
        if !device.has_program(program::FLAT) {
            log::warn!("ShadowPassLane: program '{}' is missing", program::FLAT);
            return 0;
        }

        let collector = RenderCallCollector::new();
        let mut geometry = RenderWorld::new();
        let mut refreshed = 0;
        let mut live = Vec::new();

        for light in lights {
            if !light.light.cast_shadows || matches!(light.light.kind, LightType::Point(_)) {
                continue;
            }
            let Some(camera) = light.light.shadow_camera(&light.transform) else {
                log::debug!(
                    "ShadowPassLane: light {:?} has no valid shadow camera",
                    light.entity
                );
                continue;
            };
            let Some(target) = self.acquire_target(device, light.entity) else {
                continue;
            };

            collector.collect_into(scene, Some(&camera), SortPolicy::Unsorted, &mut geometry);
            render_depth(encoder, &target, &camera, &geometry);

            self.maps
                .maps
                .insert(light.entity, ShadowMap { target, camera });
            live.push(light.entity);
            refreshed += 1;
        }

        self.release_stale(device, &live);
        self.dirty = false;
        log::trace!("ShadowPassLane: refreshed {} shadow maps", refreshed);
        refreshed
    }

    /// Releases every map.
    pub fn release(&mut self, device: &dyn GraphicsDevice) {
        self.release_stale(device, &[]);
    }

    /// Reuses the light's target if it matches the resolution, else recreates it.
    fn acquire_target(
        &mut self,
        device: &dyn GraphicsDevice,
        light: EntityId,
    ) -> Option<RenderTarget> {
        if let Some(existing) = self.maps.maps.get(&light) {
            if existing.target.width == self.resolution {
                return Some(existing.target.clone());
            }
        }
        if let Some(stale) = self.maps.maps.remove(&light) {
            destroy_target(device, &stale.target);
        }

        let descriptor = RenderTargetDescriptor {
            label: Some(Cow::Owned(format!("shadowmap_{}", light.0))),
            width: self.resolution,
            height: self.resolution,
            color_formats: Vec::new(),
            with_depth: true,
        };
        match device.create_render_target(&descriptor) {
            Ok(target) => Some(target),
            Err(e) => {
                log::warn!(
                    "ShadowPassLane: cannot create shadow target for {:?}: {}",
                    light,
                    e
                );
                None
            }
        }
    }

    fn release_stale(&mut self, device: &dyn GraphicsDevice, live: &[EntityId]) {
        self.maps.maps.retain(|id, map| {
            let keep = live.contains(id);
            if !keep {
                destroy_target(device, &map.target);
            }
            keep
        });
    }
}

fn destroy_target(device: &dyn GraphicsDevice, target: &RenderTarget) {
    if let Err(e) = device.destroy_render_target(target.id) {
        log::warn!("ShadowPassLane: failed to destroy {:?}: {}", target.id, e);
    }
}

fn render_depth(
    encoder: &mut dyn CommandEncoder,
    target: &RenderTarget,
    camera: &Camera,
    geometry: &RenderWorld,
) {
    let mut pass = TargetPass::begin(encoder, target);
    pass.set_render_state(
        RenderState::BASELINE
            .with_depth(DepthState::LESS_WRITE)
            .with_color_writes(false),
    );
    pass.clear(ClearValues::DEPTH_ONLY);
    if pass.use_program(program::FLAT).is_err() {
        return;
    }
    pass.set_uniform("u_viewprojection", camera.view_projection().into());

    for call in &geometry.render_calls {
        // Translucent geometry does not occlude light.
        if call.is_translucent() || call.mesh.is_empty() {
            continue;
        }
        pass.set_uniform("u_model", call.transform.into());
        pass.draw_mesh(&call.mesh);
    }
}

impl Lane for ShadowPassLane {
    fn strategy_name(&self) -> &'static str {
        "ShadowPass"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Shadow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumina_core::{
        asset::{AlphaMode, Material},
        math::{Mat4, Vec3},
        renderer::{DirectionalLight, Light, Mesh, PointLight, SpotLight},
        scene::{Entity, Node, Prefab},
    };
    use lumina_infra::graphics::headless::{HeadlessDevice, RecordedCommand};
    use std::sync::Arc;

    fn scene_with_floor(alpha_mode: AlphaMode) -> Scene {
        let material = Material {
            alpha_mode,
            ..Material::default()
        };
        let mut scene = Scene::new();
        scene.add_entity(Entity::prefab(
            "floor",
            Mat4::from_scale(Vec3::new(10.0, 0.1, 10.0)),
            Arc::new(Prefab::new(
                "floor",
                Node::with_mesh("floor", Arc::new(Mesh::unit_cube()), Arc::new(material)),
            )),
        ));
        scene
    }

    fn shadow_light(id: usize, kind: LightType) -> ExtractedLight {
        let mut light = Light::new(kind);
        light.cast_shadows = true;
        light.area_size = 20.0;
        let transform = Mat4::from_translation(Vec3::new(0.0, 20.0, 0.0))
            * Mat4::from_rotation_x(-std::f32::consts::FRAC_PI_2);
        ExtractedLight::new(EntityId(id), light, transform)
    }

    fn refresh(
        lane: &mut ShadowPassLane,
        device: &HeadlessDevice,
        scene: &Scene,
        lights: &[ExtractedLight],
    ) -> usize {
        let mut encoder = device.create_command_encoder(Some("shadows"));
        let count = lane.refresh(device, encoder.as_mut(), scene, lights);
        device.submit_command_buffer(encoder.finish()).unwrap();
        count
    }

    #[test]
    fn test_refresh_skips_point_and_non_casters() {
        let device = HeadlessDevice::new();
        let scene = scene_with_floor(AlphaMode::Opaque);
        let mut non_caster = shadow_light(3, LightType::Spot(SpotLight::default()));
        non_caster.light.cast_shadows = false;
        let lights = vec![
            shadow_light(1, LightType::Directional(DirectionalLight::default())),
            shadow_light(2, LightType::Point(PointLight::default())),
            non_caster,
            shadow_light(4, LightType::Spot(SpotLight::default())),
        ];

        let mut lane = ShadowPassLane::new(256);
        assert_eq!(refresh(&mut lane, &device, &scene, &lights), 2);
        assert!(!lane.is_dirty());
        assert!(lane.shadow_maps().get(EntityId(1)).is_some());
        assert!(lane.shadow_maps().get(EntityId(2)).is_none());
        assert!(lane.shadow_maps().get(EntityId(3)).is_none());
        assert!(lane.shadow_maps().get(EntityId(4)).is_some());

        // Clean lanes do nothing.
        assert_eq!(refresh(&mut lane, &device, &scene, &lights), 0);
    }

    #[test]
    fn test_refresh_draws_depth_only_and_restores_state() {
        let device = HeadlessDevice::new();
        let scene = scene_with_floor(AlphaMode::Opaque);
        let lights = vec![shadow_light(
            1,
            LightType::Directional(DirectionalLight::default()),
        )];
        let mut lane = ShadowPassLane::new(128);
        refresh(&mut lane, &device, &scene, &lights);

        let log = device.command_log();
        let draw = log
            .iter()
            .find_map(|c| match c {
                RecordedCommand::Draw(draw) => Some(draw),
                _ => None,
            })
            .expect("the floor is drawn");
        assert_eq!(draw.program.as_deref(), Some(program::FLAT));
        assert!(!draw.state.color_writes);
        assert!(matches!(
            log.last(),
            Some(RecordedCommand::UnbindRenderTarget)
        ));
        let last_state = log.iter().rev().find_map(|c| match c {
            RecordedCommand::SetRenderState(state) => Some(*state),
            _ => None,
        });
        assert_eq!(last_state, Some(RenderState::BASELINE));

        let depth = lane
            .shadow_maps()
            .get(EntityId(1))
            .and_then(ShadowMap::depth_texture)
            .unwrap();
        let cleared: Vec<f32> = bytemuck::pod_collect_to_vec(&device.read_texture(depth).unwrap());
        assert!(cleared.iter().all(|d| *d == 1.0));
    }

    #[test]
    fn test_translucent_geometry_casts_no_shadow() {
        let device = HeadlessDevice::new();
        let scene = scene_with_floor(AlphaMode::Blend);
        let lights = vec![shadow_light(
            1,
            LightType::Directional(DirectionalLight::default()),
        )];
        let mut lane = ShadowPassLane::new(64);
        refresh(&mut lane, &device, &scene, &lights);

        assert!(!device
            .command_log()
            .iter()
            .any(|c| matches!(c, RecordedCommand::Draw(_))));
    }

    #[test]
    fn test_removed_caster_releases_its_map() {
        let device = HeadlessDevice::new();
        let scene = scene_with_floor(AlphaMode::Opaque);
        let mut lights = vec![
            shadow_light(1, LightType::Directional(DirectionalLight::default())),
            shadow_light(2, LightType::Spot(SpotLight::default())),
        ];
        let mut lane = ShadowPassLane::new(64);
        refresh(&mut lane, &device, &scene, &lights);
        assert_eq!(lane.shadow_maps().len(), 2);

        lights.pop();
        lane.mark_dirty();
        refresh(&mut lane, &device, &scene, &lights);
        assert_eq!(lane.shadow_maps().len(), 1);
        assert_eq!(device.render_target_count(), 1);
    }

    #[test]
    fn test_missing_program_keeps_lane_dirty() {
        let device = HeadlessDevice::with_programs(&[program::DEPTH]);
        let scene = scene_with_floor(AlphaMode::Opaque);
        let lights = vec![shadow_light(
            1,
            LightType::Directional(DirectionalLight::default()),
        )];
        let mut lane = ShadowPassLane::new(64);
        assert_eq!(refresh(&mut lane, &device, &scene, &lights), 0);
        assert!(lane.is_dirty());
        assert!(lane.shadow_maps().is_empty());
    }
}
