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

//! Defines the lane that turns the scene graph into draw instructions.

use super::{ExtractedDecal, ExtractedLight, RenderCall, RenderWorld};
use lumina_core::{
    lane::{Lane, LaneKind},
    math::Mat4,
    renderer::Camera,
    scene::{EntityKind, Node, Scene},
};
use std::cmp::Ordering;

/// Whether collected calls are put in blending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortPolicy {
    /// Opaque calls front-to-back, then translucent calls back-to-front.
    /// Only applied when a camera is supplied.
    #[default]
    ByDistance,
    /// Traversal order. Used by depth-only views.
    Unsorted,
}

/// The total order in which render calls are issued.
///
/// Opaque calls come first, nearest first; translucent calls follow,
/// farthest first.
pub fn compare_render_calls(a: &RenderCall, b: &RenderCall) -> Ordering {
    match (a.is_translucent(), b.is_translucent()) {
        (true, true) => b.distance_to_camera.total_cmp(&a.distance_to_camera),
        (false, false) => a.distance_to_camera.total_cmp(&b.distance_to_camera),
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
    }
}

/// A lane that performs the collection phase of every view.
///
/// It walks each visible prefab depth-first, culls drawable nodes against the
/// camera frustum and separates lights and decals. It never mutates the scene.
#[derive(Debug, Default, Clone, Copy)]
pub struct RenderCallCollector;

impl RenderCallCollector {
    /// Creates a new `RenderCallCollector`.
    pub fn new() -> Self {
        Self
    }

    /// Collects a fresh [`RenderWorld`] sorted for the view.
    ///
    /// # Arguments
    /// * `scene`: The scene to walk.
    /// * `camera`: The culling camera. `None` emits every drawable node and every light.
    pub fn collect(&self, scene: &Scene, camera: Option<&Camera>) -> RenderWorld {
        let mut world = RenderWorld::new();
        self.collect_into(scene, camera, SortPolicy::ByDistance, &mut world);
        world
    }

    /// Collects into an existing [`RenderWorld`], reusing its allocations.
    pub fn collect_into(
        &self,
        scene: &Scene,
        camera: Option<&Camera>,
        sort: SortPolicy,
        world: &mut RenderWorld,
    ) {
        world.clear();

        for (id, entity) in scene.iter() {
            if !entity.visible {
                continue;
            }

            match &entity.kind {
                EntityKind::Prefab(prefab) => {
                    self.visit_node(&prefab.root, &entity.transform, camera, world);
                }
                EntityKind::Light(light) => {
                    let extracted = ExtractedLight::new(id, *light, entity.transform);
                    // Directional lights affect every pixel.
                    if let (Some(camera), Some(radius)) = (camera, light.max_distance()) {
                        if !camera.test_sphere_in_frustum(extracted.position, radius) {
                            continue;
                        }
                    }
                    world.lights.push(extracted);
                }
                EntityKind::Decal(decal) => match entity.transform.inverse() {
                    Some(inverse_transform) => world.decals.push(ExtractedDecal {
                        entity: id,
                        decal: *decal,
                        transform: entity.transform,
                        inverse_transform,
                    }),
                    None => {
                        log::debug!(
                            "RenderCallCollector: skipping decal '{}' with a singular transform",
                            entity.name
                        );
                    }
                },
            }
        }

        if camera.is_some() && sort == SortPolicy::ByDistance {
            world.render_calls.sort_by(compare_render_calls);
        }

        log::trace!(
            "RenderCallCollector: {} calls, {} lights, {} decals",
            world.render_calls.len(),
            world.lights.len(),
            world.decals.len()
        );
    }

    fn visit_node(
        &self,
        node: &Node,
        parent: &Mat4,
        camera: Option<&Camera>,
        world: &mut RenderWorld,
    ) {
        if !node.visible {
            return;
        }

        let transform = *parent * node.local_transform;

        if let (Some(mesh), Some(material)) = (&node.mesh, &node.material) {
            let world_bounds = mesh.bounding_box.transform(&transform);
            let in_view = camera.map_or(true, |c| c.test_box_in_frustum(&world_bounds));
            if in_view {
                world.render_calls.push(RenderCall {
                    transform,
                    mesh: mesh.clone(),
                    material: material.clone(),
                    distance_to_camera: camera
                        .map_or(0.0, |c| c.eye().distance(world_bounds.center())),
                    world_bounds,
                });
            }
        }

        for child in &node.children {
            self.visit_node(child, &transform, camera, world);
        }
    }
}

impl Lane for RenderCallCollector {
    fn strategy_name(&self) -> &'static str {
        "RenderCallCollector"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Extract
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumina_core::{
        asset::{AlphaMode, Material},
        math::{LinearRgba, Vec3},
        renderer::{DirectionalLight, Light, LightType, Mesh, PointLight},
        scene::{Decal, Entity, Prefab},
    };
    use std::sync::Arc;

    fn camera() -> Camera {
        Camera::perspective(
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::ZERO,
            Vec3::Y,
            60.0,
            1.0,
            0.1,
            1000.0,
        )
        .unwrap()
    }

    fn cube_prefab(name: &str, alpha_mode: AlphaMode) -> Arc<Prefab> {
        let material = Material {
            alpha_mode,
            ..Material::with_color(name, LinearRgba::WHITE)
        };
        Arc::new(Prefab::new(
            name,
            Node::with_mesh(name, Arc::new(Mesh::unit_cube()), Arc::new(material)),
        ))
    }

    fn add_cube(scene: &mut Scene, z: f32, alpha_mode: AlphaMode) {
        scene.add_entity(Entity::prefab(
            format!("cube_{z}"),
            Mat4::from_translation(Vec3::new(0.0, 0.0, z)),
            cube_prefab("cube", alpha_mode),
        ));
    }

    #[test]
    fn test_collect_orders_opaque_then_translucent() {
        let mut scene = Scene::new();
        for (z, mode) in [
            (-5.0, AlphaMode::Blend),
            (0.0, AlphaMode::Opaque),
            (-20.0, AlphaMode::Opaque),
            (2.0, AlphaMode::Blend),
            (-8.0, AlphaMode::Mask(0.5)),
            (-30.0, AlphaMode::Blend),
        ] {
            add_cube(&mut scene, z, mode);
        }

        let world = RenderCallCollector::new().collect(&scene, Some(&camera()));
        assert_eq!(world.render_calls.len(), 6);

        let first_translucent = world
            .render_calls
            .iter()
            .position(|c| c.is_translucent())
            .unwrap();
        let (opaque, translucent) = world.render_calls.split_at(first_translucent);
        assert!(opaque.iter().all(|c| !c.is_translucent()));
        assert!(translucent.iter().all(|c| c.is_translucent()));
        assert!(opaque
            .windows(2)
            .all(|w| w[0].distance_to_camera <= w[1].distance_to_camera));
        assert!(translucent
            .windows(2)
            .all(|w| w[0].distance_to_camera >= w[1].distance_to_camera));
    }

    #[test]
    fn test_collect_culls_outside_frustum() {
        let mut scene = Scene::new();
        add_cube(&mut scene, 0.0, AlphaMode::Opaque);
        // Behind the camera.
        add_cube(&mut scene, 50.0, AlphaMode::Opaque);

        let collector = RenderCallCollector::new();
        assert_eq!(collector.collect(&scene, Some(&camera())).render_calls.len(), 1);
        assert_eq!(collector.collect(&scene, None).render_calls.len(), 2);
    }

    #[test]
    fn test_collect_without_camera_keeps_traversal_order() {
        let mut scene = Scene::new();
        add_cube(&mut scene, -1.0, AlphaMode::Blend);
        add_cube(&mut scene, -2.0, AlphaMode::Opaque);

        let world = RenderCallCollector::new().collect(&scene, None);
        assert!(world.render_calls[0].is_translucent());
        assert_eq!(world.render_calls[0].distance_to_camera, 0.0);
    }

    #[test]
    fn test_collect_accumulates_node_transforms() {
        let material = Arc::new(Material::default());
        let mesh = Arc::new(Mesh::unit_cube());
        let root = Node::new("root")
            .transformed(Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)))
            .with_child(
                Node::with_mesh("child", mesh, material)
                    .transformed(Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0))),
            );
        let mut scene = Scene::new();
        scene.add_entity(Entity::prefab(
            "hierarchy",
            Mat4::from_translation(Vec3::new(0.0, 0.0, -3.0)),
            Arc::new(Prefab::new("hierarchy", root)),
        ));

        let world = RenderCallCollector::new().collect(&scene, None);
        assert_eq!(world.render_calls.len(), 1);
        assert_eq!(
            world.render_calls[0].transform.translation(),
            Vec3::new(1.0, 2.0, -3.0)
        );
    }

    #[test]
    fn test_collect_skips_invisible_and_incomplete_nodes() {
        let material = Arc::new(Material::default());
        let mesh = Arc::new(Mesh::unit_cube());
        let mut hidden = Node::with_mesh("hidden", mesh.clone(), material.clone());
        hidden.visible = false;
        hidden = hidden.with_child(Node::with_mesh("under_hidden", mesh.clone(), material));
        let mut no_material = Node::new("no_material");
        no_material.mesh = Some(mesh);
        let root = Node::new("root").with_child(hidden).with_child(no_material);

        let mut scene = Scene::new();
        scene.add_entity(Entity::prefab(
            "p",
            Mat4::IDENTITY,
            Arc::new(Prefab::new("p", root)),
        ));
        let mut invisible = Entity::prefab("q", Mat4::IDENTITY, cube_prefab("q", AlphaMode::Opaque));
        invisible.visible = false;
        scene.add_entity(invisible);

        let world = RenderCallCollector::new().collect(&scene, None);
        assert!(world.render_calls.is_empty());
    }

    #[test]
    fn test_collect_lights_and_decals() {
        let mut scene = Scene::new();
        scene.add_entity(Entity::light(
            "sun",
            Mat4::from_translation(Vec3::new(0.0, 0.0, 5000.0)),
            Light::new(LightType::Directional(DirectionalLight::default())),
        ));
        scene.add_entity(Entity::light(
            "near",
            Mat4::IDENTITY,
            Light::new(LightType::Point(PointLight { max_distance: 5.0 })),
        ));
        scene.add_entity(Entity::light(
            "far",
            Mat4::from_translation(Vec3::new(0.0, 0.0, 5000.0)),
            Light::new(LightType::Point(PointLight { max_distance: 5.0 })),
        ));
        scene.add_entity(Entity::decal("stain", Mat4::IDENTITY, Decal::default()));
        scene.add_entity(Entity::decal(
            "flat",
            Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0)),
            Decal::default(),
        ));

        let collector = RenderCallCollector::new();
        let culled = collector.collect(&scene, Some(&camera()));
        let names: Vec<_> = culled
            .lights
            .iter()
            .map(|l| scene.entity(l.entity).unwrap().name.as_str())
            .collect();
        assert_eq!(names, vec!["sun", "near"]);
        assert_eq!(culled.decals.len(), 1);

        let all = collector.collect(&scene, None);
        assert_eq!(all.lights.len(), 3);
    }

    #[test]
    fn test_compare_render_calls_is_stable_on_ties() {
        let mut scene = Scene::new();
        for _ in 0..3 {
            add_cube(&mut scene, -4.0, AlphaMode::Opaque);
        }
        let mut world = RenderWorld::new();
        RenderCallCollector::new().collect_into(
            &scene,
            Some(&camera()),
            SortPolicy::ByDistance,
            &mut world,
        );
        assert_eq!(world.render_calls.len(), 3);
        assert!(world
            .render_calls
            .windows(2)
            .all(|w| compare_render_calls(&w[0], &w[1]) == Ordering::Equal));
    }
}
