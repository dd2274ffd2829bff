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
//! Defines the RenderAgent, the owner of the frame pipeline.

use super::FrameStats;
use lumina_core::{
    lane::Lane,
    math::Vec3,
    renderer::{
        Camera, CommandEncoder, GraphicsDevice, PipelineMode, RenderError, RenderSettings,
        ResourceError,
    },
    scene::Scene,
};
use lumina_lanes::render_lane::{
    deferred::{DecalLane, GBufferLane, LightingLane, LightingOptions, SsaoLane},
    irradiance::{CubemapProbeBaker, IrradianceVolume, ProbeGridError},
    DebugLane, ForwardLane, FrameContext, FrameTargets, PresentLane, RenderCallCollector,
    RenderWorld, ShadowMaps, ShadowPassLane, SharedResources, SortPolicy, TargetPass,
    VolumetricLane,
};
use std::time::{Duration, Instant};

/// The agent responsible for running the rendering lanes of a view.
///
/// It owns every offscreen target, the lanes and their dirty flags. Two agents
/// never share state, so several views can be rendered side by side.
pub struct RenderAgent {
    // Current pipeline options, read at the start of every frame.
    settings: RenderSettings,
    // G-buffer, decal, illumination, AO and capture targets.
    targets: FrameTargets,
    // Default textures and built-in meshes.
    resources: SharedResources,
    // Draw calls, lights and decals of the last collected view.
    render_world: RenderWorld,
    collector: RenderCallCollector,
    shadow_lane: ShadowPassLane,
    forward_lane: ForwardLane,
    gbuffer_lane: GBufferLane,
    decal_lane: DecalLane,
    ssao_lane: SsaoLane,
    lighting_lane: LightingLane,
    // Probe grid, baked coefficients and their texture.
    irradiance: IrradianceVolume,
    volumetric_lane: VolumetricLane,
    present_lane: PresentLane,
    debug_lane: DebugLane,
    // --- Performance Metrics ---
    // Duration of the last render() call.
    last_frame_time: Duration,
    // Total number of frames rendered since agent creation.
    frame_count: u64,
}

impl RenderAgent {
    /// Creates an agent rendering at `width` x `height`.
    ///
    /// # Errors
    /// * `RenderError::ResourceError` - If a target or a shared resource
    ///   cannot be allocated.
    pub fn new(
        device: &dyn GraphicsDevice,
        width: u32,
        height: u32,
        settings: RenderSettings,
    ) -> Result<Self, RenderError> {
        let resources = SharedResources::new(device)?;
        let targets =
            match FrameTargets::new(device, width, height, settings.capture_resolution) {
                Ok(targets) => targets,
                Err(e) => {
                    resources.destroy(device);
                    return Err(e.into());
                }
            };
        log::info!(
            "RenderAgent: created for {}x{} ({:?} pipeline)",
            width,
            height,
            settings.pipeline_mode
        );

        Ok(Self {
            targets,
            resources,
            render_world: RenderWorld::new(),
            collector: RenderCallCollector::new(),
            shadow_lane: ShadowPassLane::new(settings.shadow_map_resolution),
            forward_lane: ForwardLane::new(),
            gbuffer_lane: GBufferLane::new(),
            decal_lane: DecalLane::new(),
            ssao_lane: SsaoLane::new(settings.ssao_sample_count),
            lighting_lane: LightingLane::new(),
            irradiance: IrradianceVolume::new(),
            volumetric_lane: VolumetricLane::new(settings.air_density),
            present_lane: PresentLane::new(),
            debug_lane: DebugLane::new(),
            settings,
            last_frame_time: Duration::ZERO,
            frame_count: 0,
        })
    }

    /// Recreates the window-sized targets.
    ///
    /// # Errors
    /// * `ResourceError` - If allocation failed; the previous targets stay valid.
    pub fn resize(
        &mut self,
        device: &dyn GraphicsDevice,
        width: u32,
        height: u32,
    ) -> Result<(), ResourceError> {
        self.targets.resize(device, width, height)
    }

    /// The current settings.
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Mutable access to the settings. Changes apply on the next frame.
    pub fn settings_mut(&mut self) -> &mut RenderSettings {
        &mut self.settings
    }

    /// Flags the shadow maps and the probes for regeneration after the scene
    /// geometry or its lights changed.
    pub fn mark_scene_dirty(&mut self) {
        self.shadow_lane.mark_dirty();
        self.irradiance.mark_dirty();
    }

    /// Replaces the probe grid. It is baked at the start of the next frame.
    ///
    /// # Errors
    /// * `ProbeGridError` - If the corners are not finite.
    pub fn create_probe_grid(
        &mut self,
        dims: [u32; 3],
        start: Vec3,
        end: Vec3,
    ) -> Result<(), ProbeGridError> {
        self.irradiance.create_probe_grid(dims, start, end)
    }

    /// The offscreen targets.
    pub fn targets(&self) -> &FrameTargets {
        &self.targets
    }

    /// The view collected by the last frame.
    pub fn render_world(&self) -> &RenderWorld {
        &self.render_world
    }

    /// The shadow maps rendered so far.
    pub fn shadow_maps(&self) -> &ShadowMaps {
        self.shadow_lane.shadow_maps()
    }

    /// The irradiance probes.
    pub fn irradiance(&self) -> &IrradianceVolume {
        &self.irradiance
    }

    /// The SSAO kernel currently in use.
    pub fn ssao_lane(&self) -> &SsaoLane {
        &self.ssao_lane
    }

    /// Duration of the last frame.
    pub fn last_frame_time(&self) -> Duration {
        self.last_frame_time
    }

    /// Number of frames rendered.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Renders `scene` as seen by `camera`.
    ///
    /// The frame runs, in order: collection, shadow refresh, probe bake, the
    /// deferred or forward pipeline, irradiance reconstruction, volumetric
    /// scattering, presentation and the enabled debug views. Shadows and
    /// probes are only regenerated when flagged dirty.
    ///
    /// # Errors
    /// * `RenderError::ResourceError` - If a target could not be reallocated
    ///   or a command buffer could not be submitted. A failed probe bake is
    ///   logged and does not fail the frame.
    pub fn render(
        &mut self,
        device: &dyn GraphicsDevice,
        scene: &Scene,
        camera: &Camera,
    ) -> Result<FrameStats, RenderError> {
        let frame_start = Instant::now();
        let mut stats = FrameStats::default();

        // Step 1: Apply settings changed since the last frame.
        self.sync_settings(device)?;

        // Step 2: Collect the visible draw calls, lights and decals.
        let started = Instant::now();
        self.collector.collect_into(
            scene,
            Some(camera),
            SortPolicy::ByDistance,
            &mut self.render_world,
        );
        stats.record(self.collector.strategy_name(), started.elapsed());
        stats.render_calls = self.render_world.render_calls.len();
        stats.lights = self.render_world.lights.len();
        stats.decals = self.render_world.decals.len();

        // Step 3: Shadow maps see every light, not only the visible ones.
        if self.shadow_lane.is_dirty() {
            let started = Instant::now();
            let all_lights = self.collector.collect(scene, None).lights;
            let mut encoder = device.create_command_encoder(Some("shadow_maps"));
            stats.shadow_maps_refreshed =
                self.shadow_lane
                    .refresh(device, encoder.as_mut(), scene, &all_lights);
            device.submit_command_buffer(encoder.finish())?;
            stats.record(self.shadow_lane.strategy_name(), started.elapsed());
        }

        // Step 4: Bake the probes with the fresh shadow maps.
        if self.settings.probes_need_rebake || self.irradiance.needs_rebake() {
            let started = Instant::now();
            let mut baker = CubemapProbeBaker::new(
                scene,
                &self.resources,
                self.shadow_lane.shadow_maps(),
                &self.targets.capture,
            );
            match self.irradiance.bake(device, &mut baker) {
                Ok(baked) => stats.probes_baked = baked,
                Err(e) => log::error!("RenderAgent: probe bake failed: {}", e),
            }
            self.settings.probes_need_rebake = false;
            stats.record(self.irradiance.strategy_name(), started.elapsed());
        }

        // Step 5: Record the view.
        let ctx = FrameContext {
            scene,
            camera,
            world: &self.render_world,
            resources: &self.resources,
            shadow_maps: self.shadow_lane.shadow_maps(),
        };
        let deferred = self.settings.pipeline_mode == PipelineMode::Deferred;
        let mut encoder = device.create_command_encoder(Some("frame"));

        if deferred {
            let started = Instant::now();
            self.gbuffer_lane
                .render(encoder.as_mut(), &ctx, &self.targets);
            stats.record(self.gbuffer_lane.strategy_name(), started.elapsed());

            let started = Instant::now();
            self.decal_lane.render(encoder.as_mut(), &ctx, &self.targets);
            stats.record(self.decal_lane.strategy_name(), started.elapsed());

            let started = Instant::now();
            let ao_ready = self.ssao_lane.render(encoder.as_mut(), &ctx, &self.targets);
            stats.record(self.ssao_lane.strategy_name(), started.elapsed());

            let started = Instant::now();
            let options = LightingOptions {
                ao_texture: ao_ready.then(|| self.targets.ao.color(0)).flatten(),
                show_ao: self.settings.show_ao_deferred,
            };
            let report = self
                .lighting_lane
                .render(encoder.as_mut(), &ctx, &self.targets, options);
            stats.fullscreen_light_passes = report.fullscreen_passes;
            stats.light_volume_passes = report.volume_passes;
            stats.record(self.lighting_lane.strategy_name(), started.elapsed());
        } else {
            let started = Instant::now();
            self.forward_lane.render_to_target(
                encoder.as_mut(),
                &self.targets.illumination,
                &ctx,
                self.settings.render_mode,
                scene.background_color,
            );
            stats.record(self.forward_lane.strategy_name(), started.elapsed());
        }

        if deferred && self.settings.irradiance_enabled {
            let started = Instant::now();
            self.irradiance.render_reconstruction(
                encoder.as_mut(),
                &ctx,
                &self.targets,
                self.settings.irradiance_normal_distance,
            );
            stats.record(self.irradiance.strategy_name(), started.elapsed());
        }

        if deferred && self.settings.volumetric_enabled {
            let started = Instant::now();
            self.volumetric_lane
                .render(encoder.as_mut(), &ctx, &self.targets);
            stats.record(self.volumetric_lane.strategy_name(), started.elapsed());
        }

        // Step 6: Present, then overlay the debug views.
        let started = Instant::now();
        self.present_lane.render(encoder.as_mut(), &ctx, &self.targets);
        stats.record(self.present_lane.strategy_name(), started.elapsed());

        self.render_debug_views(encoder.as_mut(), &ctx, &mut stats);

        device.submit_command_buffer(encoder.finish())?;

        // Step 7: Record frame timing.
        self.last_frame_time = frame_start.elapsed();
        self.frame_count += 1;
        stats.frame_time = self.last_frame_time;
        log::trace!(
            "RenderAgent: frame {} with {} calls and {} lights in {:?}",
            self.frame_count,
            stats.render_calls,
            stats.lights,
            stats.frame_time
        );
        Ok(stats)
    }

    /// Releases every GPU resource owned by the agent.
    pub fn release(&mut self, device: &dyn GraphicsDevice) {
        self.shadow_lane.release(device);
        self.irradiance.release(device);
        self.targets.destroy(device);
        self.resources.destroy(device);
        log::debug!("RenderAgent: released after {} frames", self.frame_count);
    }

    fn sync_settings(&mut self, device: &dyn GraphicsDevice) -> Result<(), RenderError> {
        self.shadow_lane
            .set_resolution(self.settings.shadow_map_resolution);

        let capture = self.settings.capture_resolution.max(1);
        if self.targets.capture.width != capture {
            self.targets.set_capture_resolution(device, capture)?;
            self.irradiance.mark_dirty();
        }

        let kernel_size = SsaoLane::kernel_size(self.settings.ssao_sample_count);
        if self.ssao_lane.points().len() != kernel_size {
            log::debug!(
                "RenderAgent: regenerating the SSAO kernel with {} samples",
                kernel_size
            );
            self.ssao_lane = SsaoLane::new(self.settings.ssao_sample_count);
        }

        self.volumetric_lane.air_density = self.settings.air_density;
        Ok(())
    }

    fn render_debug_views(
        &self,
        encoder: &mut dyn CommandEncoder,
        ctx: &FrameContext,
        stats: &mut FrameStats,
    ) {
        let settings = &self.settings;
        if !(settings.show_gbuffers
            || settings.show_ao
            || settings.show_shadowmap
            || settings.show_probes)
        {
            return;
        }

        let started = Instant::now();
        if settings.show_gbuffers {
            self.debug_lane.render_gbuffers(encoder, ctx, &self.targets);
        }
        if settings.show_ao {
            self.debug_lane.render_ao(encoder, ctx, &self.targets);
        }
        if settings.show_shadowmap {
            self.debug_lane
                .render_shadow_maps(encoder, ctx, &self.targets);
        }
        if settings.show_probes {
            let mut pass = TargetPass::begin_screen(encoder);
            self.irradiance
                .render_probe_grid(&mut *pass, ctx, settings.probe_display_size);
        }
        stats.record(self.debug_lane.strategy_name(), started.elapsed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumina_core::renderer::{api::program, UniformValue};
    use lumina_infra::graphics::headless::HeadlessDevice;
    use lumina_lanes::render_lane::deferred::MIN_SSAO_SAMPLES;

    fn camera() -> Camera {
        Camera::perspective(
            Vec3::new(0.0, 5.0, 20.0),
            Vec3::ZERO,
            Vec3::Y,
            45.0,
            4.0 / 3.0,
            0.1,
            500.0,
        )
        .unwrap()
    }

    #[test]
    fn test_new_allocates_targets() {
        let device = HeadlessDevice::new();
        let agent = RenderAgent::new(&device, 320, 240, RenderSettings::default()).unwrap();
        assert_eq!(agent.targets().width(), 320);
        assert_eq!(agent.targets().height(), 240);
        assert_eq!(agent.frame_count(), 0);
    }

    #[test]
    fn test_ssao_kernel_follows_settings() {
        let device = HeadlessDevice::new();
        let mut agent = RenderAgent::new(&device, 64, 64, RenderSettings::default()).unwrap();
        assert_eq!(agent.ssao_lane().points().len(), 256);

        agent.settings_mut().ssao_sample_count = 300;
        agent.render(&device, &Scene::new(), &camera()).unwrap();
        assert_eq!(agent.ssao_lane().points().len(), 300);
    }

    #[test]
    fn test_low_ssao_setting_keeps_the_minimum_kernel() {
        let device = HeadlessDevice::new();
        let settings = RenderSettings {
            ssao_sample_count: 0,
            ..RenderSettings::default()
        };
        let mut agent = RenderAgent::new(&device, 64, 64, settings).unwrap();
        assert_eq!(agent.ssao_lane().points().len(), MIN_SSAO_SAMPLES);

        agent.settings_mut().ssao_sample_count = 32;
        agent.render(&device, &Scene::new(), &camera()).unwrap();
        assert_eq!(agent.ssao_lane().points().len(), MIN_SSAO_SAMPLES);

        let ssao = device
            .draws()
            .into_iter()
            .rev()
            .find(|d| d.program.as_deref() == Some(program::SSAO))
            .unwrap();
        let points = ssao.uniform("u_points").unwrap();
        assert_eq!(points, &UniformValue::Vec3Array(agent.ssao_lane().points().to_vec()));
    }

    #[test]
    fn test_capture_resolution_change_requests_a_bake() {
        let device = HeadlessDevice::new();
        let mut agent = RenderAgent::new(&device, 64, 64, RenderSettings::default()).unwrap();
        agent
            .create_probe_grid([1, 1, 1], Vec3::ZERO, Vec3::ZERO)
            .unwrap();
        agent.render(&device, &Scene::new(), &camera()).unwrap();
        assert!(!agent.irradiance().needs_rebake());

        agent.settings_mut().capture_resolution = 8;
        let stats = agent.render(&device, &Scene::new(), &camera()).unwrap();
        assert_eq!(agent.targets().capture.width, 8);
        assert_eq!(stats.probes_baked, 1);
    }

    #[test]
    fn test_rebake_flag_is_consumed() {
        let device = HeadlessDevice::new();
        let mut agent = RenderAgent::new(&device, 64, 64, RenderSettings::default()).unwrap();
        assert!(agent.settings().probes_need_rebake);
        agent.render(&device, &Scene::new(), &camera()).unwrap();
        assert!(!agent.settings().probes_need_rebake);
    }

    #[test]
    fn test_frame_counters_advance() {
        let device = HeadlessDevice::new();
        let mut agent = RenderAgent::new(&device, 64, 64, RenderSettings::default()).unwrap();
        for _ in 0..3 {
            agent.render(&device, &Scene::new(), &camera()).unwrap();
        }
        assert_eq!(agent.frame_count(), 3);
    }

    #[test]
    fn test_release_frees_everything() {
        let device = HeadlessDevice::new();
        let mut agent = RenderAgent::new(&device, 64, 64, RenderSettings::default()).unwrap();
        agent
            .create_probe_grid([2, 2, 2], Vec3::ZERO, Vec3::ONE)
            .unwrap();
        agent.render(&device, &Scene::new(), &camera()).unwrap();
        agent.release(&device);
        assert_eq!(device.render_target_count(), 0);
        assert_eq!(device.texture_count(), 0);
    }
}
