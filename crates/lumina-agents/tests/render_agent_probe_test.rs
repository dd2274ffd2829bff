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
//! Probe baking through the RenderAgent.

use approx::assert_relative_eq;
use lumina_agents::render_agent::RenderAgent;
use lumina_core::{
    math::{LinearRgba, Vec3},
    renderer::{Camera, RenderSettings},
    scene::Scene,
};
use lumina_infra::graphics::headless::HeadlessDevice;

fn camera() -> Camera {
    Camera::perspective(
        Vec3::new(0.0, 0.0, 10.0),
        Vec3::ZERO,
        Vec3::Y,
        60.0,
        1.0,
        0.1,
        100.0,
    )
    .unwrap()
}

fn agent(device: &HeadlessDevice) -> RenderAgent {
    let settings = RenderSettings {
        capture_resolution: 8,
        ssao_sample_count: 200,
        ..RenderSettings::default()
    };
    RenderAgent::new(device, 64, 64, settings).unwrap()
}

#[test]
fn test_bake_is_idempotent_for_a_static_scene() {
    let device = HeadlessDevice::new();
    let mut scene = Scene::new();
    scene.background_color = LinearRgba::rgb(0.2, 0.4, 0.6);

    let mut agent = agent(&device);
    agent
        .create_probe_grid([2, 1, 2], Vec3::splat(-5.0), Vec3::splat(5.0))
        .unwrap();
    let stats = agent.render(&device, &scene, &camera()).unwrap();
    assert_eq!(stats.probes_baked, 4);
    let first = agent.irradiance().read_back(&device).unwrap();
    assert_eq!(first.len(), 4);

    agent.mark_scene_dirty();
    agent.render(&device, &scene, &camera()).unwrap();
    let second = agent.irradiance().read_back(&device).unwrap();

    for (a, b) in first.iter().zip(&second) {
        for (ca, cb) in a.coeffs.iter().zip(&b.coeffs) {
            assert_relative_eq!(ca.x, cb.x, epsilon = 1e-5);
            assert_relative_eq!(ca.y, cb.y, epsilon = 1e-5);
            assert_relative_eq!(ca.z, cb.z, epsilon = 1e-5);
        }
    }
}

#[test]
fn test_uniform_background_bakes_into_the_dc_term() {
    let device = HeadlessDevice::new();
    let mut scene = Scene::new();
    scene.background_color = LinearRgba::rgb(0.2, 0.4, 0.6);

    let mut agent = agent(&device);
    agent
        .create_probe_grid([1, 1, 1], Vec3::ZERO, Vec3::ZERO)
        .unwrap();
    agent.render(&device, &scene, &camera()).unwrap();

    let baked = agent.irradiance().read_back(&device).unwrap();
    let dc = baked[0].coeffs[0];
    assert!(dc.x > 0.0);
    assert_relative_eq!(dc.y / dc.x, 2.0, epsilon = 1e-3);
    assert_relative_eq!(dc.z / dc.x, 3.0, epsilon = 1e-3);

    // Directional terms cancel out for a constant environment.
    for coeff in &baked[0].coeffs[1..] {
        assert!(coeff.length() < 1e-3 * dc.length().max(1.0));
    }
}

#[test]
fn test_no_grid_means_no_bake() {
    let device = HeadlessDevice::new();
    let mut agent = agent(&device);
    let stats = agent.render(&device, &Scene::new(), &camera()).unwrap();
    assert_eq!(stats.probes_baked, 0);
    assert!(agent.irradiance().texture().is_none());
    assert!(!agent.irradiance().needs_rebake());
}
