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
// Lumina Sandbox
// Renders a small scene on the headless device and logs frame statistics.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use lumina_agents::render_agent::{FrameStats, RenderAgent};
use lumina_core::{
    asset::{AlphaMode, Material},
    math::{LinearRgba, Mat4, Vec3},
    renderer::{
        Camera, DirectionalLight, Light, LightType, Mesh, PointLight, RenderSettings, SpotLight,
    },
    scene::{Entity, Node, Prefab, Scene},
};
use lumina_infra::graphics::headless::HeadlessDevice;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;
const FRAMES: usize = 3;
const DEFAULT_SETTINGS_PATH: &str = "sandbox/settings.ron";

fn load_settings(path: &Path) -> Result<RenderSettings> {
    if !path.exists() {
        log::info!("No settings at {}, using defaults", path.display());
        return Ok(RenderSettings::default());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let settings = ron::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    log::info!("Loaded settings from {}", path.display());
    Ok(settings)
}

fn prefab(name: &str, mesh: Arc<Mesh>, material: Material) -> Arc<Prefab> {
    Arc::new(Prefab::new(
        name,
        Node::with_mesh(name, mesh, Arc::new(material)),
    ))
}

fn build_scene() -> Scene {
    let cube = Arc::new(Mesh::unit_cube());
    let sphere = Arc::new(Mesh::unit_sphere(16, 32));

    let mut scene = Scene::new();
    scene.ambient_light = Vec3::splat(0.1);
    scene.background_color = LinearRgba::rgb(0.05, 0.07, 0.1);

    scene.add_entity(Entity::prefab(
        "floor",
        Mat4::from_translation(Vec3::new(0.0, -0.5, 0.0))
            * Mat4::from_scale(Vec3::new(20.0, 0.5, 20.0)),
        prefab(
            "floor",
            cube.clone(),
            Material::with_color("stone", LinearRgba::rgb(0.6, 0.6, 0.55)),
        ),
    ));
    for (i, color) in [
        LinearRgba::rgb(0.8, 0.2, 0.2),
        LinearRgba::rgb(0.2, 0.8, 0.2),
        LinearRgba::rgb(0.2, 0.2, 0.8),
    ]
    .into_iter()
    .enumerate()
    {
        scene.add_entity(Entity::prefab(
            format!("crate_{i}"),
            Mat4::from_translation(Vec3::new(i as f32 * 3.0 - 3.0, 1.0, 0.0)),
            prefab("crate", cube.clone(), Material::with_color("painted", color)),
        ));
    }
    scene.add_entity(Entity::prefab(
        "glass_ball",
        Mat4::from_translation(Vec3::new(0.0, 1.0, 3.0)),
        prefab(
            "glass_ball",
            sphere,
            Material {
                alpha_mode: AlphaMode::Blend,
                ..Material::with_color("glass", LinearRgba::new(0.7, 0.9, 1.0, 0.4))
            },
        ),
    ));

    let mut sun = Light::new(LightType::Directional(DirectionalLight::default()));
    sun.cast_shadows = true;
    sun.area_size = 25.0;
    sun.intensity = 0.8;
    scene.add_entity(Entity::light(
        "sun",
        Mat4::from_translation(Vec3::new(0.0, 30.0, 10.0))
            * Mat4::from_rotation_x(-1.2),
        sun,
    ));

    let mut lamp = Light::new(LightType::Point(PointLight { max_distance: 8.0 }));
    lamp.color = LinearRgba::rgb(1.0, 0.8, 0.5);
    scene.add_entity(Entity::light(
        "lamp",
        Mat4::from_translation(Vec3::new(-4.0, 2.5, 2.0)),
        lamp,
    ));

    let mut spot = Light::new(LightType::Spot(SpotLight::default()));
    spot.cast_shadows = true;
    spot.intensity = 2.0;
    scene.add_entity(Entity::light(
        "spot",
        Mat4::from_translation(Vec3::new(4.0, 6.0, 4.0)) * Mat4::from_rotation_x(-1.0),
        spot,
    ));

    scene
}

fn log_stats(frame: usize, stats: &FrameStats) {
    log::info!(
        "Frame {}: {} calls, {} lights, {} shadow maps, {} probes baked in {:?}",
        frame,
        stats.render_calls,
        stats.lights,
        stats.shadow_maps_refreshed,
        stats.probes_baked,
        stats.frame_time
    );
    for (lane, elapsed) in &stats.lane_timings {
        log::debug!("  {:<20} {:?}", lane, elapsed);
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SETTINGS_PATH.to_string());
    let settings = load_settings(Path::new(&settings_path))?;

    let device = HeadlessDevice::new();
    device.set_screen_size(WIDTH, HEIGHT);
    let scene = build_scene();
    let camera = Camera::perspective(
        Vec3::new(0.0, 6.0, 14.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::Y,
        45.0,
        WIDTH as f32 / HEIGHT as f32,
        0.1,
        200.0,
    )
    .context("the sandbox camera is degenerate")?;

    let mut agent = RenderAgent::new(&device, WIDTH, HEIGHT, settings)?;
    agent.create_probe_grid(
        [4, 2, 4],
        Vec3::new(-8.0, 0.5, -8.0),
        Vec3::new(8.0, 4.0, 8.0),
    )?;

    for frame in 0..FRAMES {
        let stats = agent.render(&device, &scene, &camera)?;
        log_stats(frame, &stats);
    }

    // Show the probes and regenerate shadows and probes once more.
    agent.settings_mut().show_probes = true;
    agent.mark_scene_dirty();
    let stats = agent.render(&device, &scene, &camera)?;
    log_stats(FRAMES, &stats);

    if let Some(irradiance) = agent
        .irradiance()
        .sample_irradiance(Vec3::new(0.0, 0.0, 0.0), Vec3::Y, 0.5)
    {
        log::info!("Irradiance above the floor center: {:?}", irradiance);
    }

    agent.release(&device);
    log::info!("Rendered {} frames", agent.frame_count());
    Ok(())
}
