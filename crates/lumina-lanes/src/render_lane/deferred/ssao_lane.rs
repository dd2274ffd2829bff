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

//! Screen-space ambient occlusion.

use crate::render_lane::{FrameContext, FrameTargets, TargetPass, GBUFFER_NORMAL};
use lumina_core::{
    lane::{Lane, LaneKind},
    math::{LinearRgba, Vec2, Vec3, PI},
    renderer::{api::program, ClearValues, CommandEncoder, RenderState},
};
use rand::prelude::*;

/// Default number of hemisphere samples.
pub const DEFAULT_SSAO_SAMPLES: usize = 256;

/// Fewest hemisphere samples a kernel is built with.
pub const MIN_SSAO_SAMPLES: usize = 200;

/// Generates `count` points uniformly distributed on the unit hemisphere around +Z.
pub fn generate_hemisphere_points<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Vec3> {
    (0..count)
        .map(|_| {
            let u: f32 = rng.gen();
            let v: f32 = rng.gen();
            let theta = u * 2.0 * PI;
            // Uniform in cos(phi) over the sphere, then folded onto z >= 0.
            let cos_phi = (2.0 * v - 1.0).abs();
            let sin_phi = (1.0 - cos_phi * cos_phi).max(0.0).sqrt();
            Vec3::new(sin_phi * theta.cos(), sin_phi * theta.sin(), cos_phi)
        })
        .collect()
}

/// A lane that estimates ambient occlusion from depth and normals.
///
/// The sample kernel is generated once at construction.
#[derive(Debug, Clone)]
pub struct SsaoLane {
    points: Vec<Vec3>,
}

impl SsaoLane {
    /// Creates a lane with `sample_count` points from the thread RNG.
    ///
    /// Counts below [`MIN_SSAO_SAMPLES`] are raised to it.
    pub fn new(sample_count: usize) -> Self {
        Self::with_rng(sample_count, &mut rand::thread_rng())
    }

    /// Creates a lane drawing its kernel from `rng`.
    pub fn with_rng<R: Rng + ?Sized>(sample_count: usize, rng: &mut R) -> Self {
        Self {
            points: generate_hemisphere_points(Self::kernel_size(sample_count), rng),
        }
    }

    /// The number of points a kernel requested with `sample_count` holds.
    pub fn kernel_size(sample_count: usize) -> usize {
        sample_count.max(MIN_SSAO_SAMPLES)
    }

    /// The sample kernel.
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Writes the occlusion factor of every pixel into the AO target.
    ///
    /// # Returns
    ///
    /// `false` if the program is missing and the target was only cleared.
    pub fn render(
        &self,
        encoder: &mut dyn CommandEncoder,
        ctx: &FrameContext,
        targets: &FrameTargets,
    ) -> bool {
        let mut pass = TargetPass::begin(encoder, &targets.ao);
        pass.clear(ClearValues {
            color: Some(LinearRgba::TRANSPARENT),
            depth: None,
        });
        if pass.use_program(program::SSAO).is_err() {
            log::warn!("SsaoLane: program '{}' is missing", program::SSAO);
            return false;
        }
        pass.set_render_state(RenderState::fullscreen(None));
        pass.set_uniform("u_points", self.points.clone().into());
        if let Some(normal) = targets.gbuffers.color(GBUFFER_NORMAL) {
            pass.set_uniform("u_normal_texture", normal.into());
        }
        if let Some(depth) = targets.scene_depth() {
            pass.set_uniform("u_depth_texture", depth.into());
        }
        pass.set_uniform("u_viewprojection", ctx.camera.view_projection().into());
        pass.set_uniform(
            "u_inverse_viewprojection",
            ctx.camera.inverse_view_projection().into(),
        );
        pass.set_uniform("u_iRes", targets.gbuffers.inverse_resolution().into());
        let (near, far) = ctx.camera.near_far();
        pass.set_uniform("u_camera_nearfar", Vec2::new(near, far).into());
        pass.draw_mesh(&ctx.resources.quad);
        true
    }
}

impl Lane for SsaoLane {
    fn strategy_name(&self) -> &'static str {
        "Ssao"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Lighting
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;

    #[test]
    fn test_hemisphere_points_are_unit_and_upward() {
        let mut rng = StdRng::seed_from_u64(7);
        let points = generate_hemisphere_points(DEFAULT_SSAO_SAMPLES, &mut rng);
        assert_eq!(points.len(), DEFAULT_SSAO_SAMPLES);
        for p in &points {
            assert_relative_eq!(p.length(), 1.0, epsilon = 1e-4);
            assert!(p.z >= 0.0);
        }
    }

    #[test]
    fn test_hemisphere_points_cover_the_hemisphere() {
        let mut rng = StdRng::seed_from_u64(42);
        let points = generate_hemisphere_points(2048, &mut rng);
        let n = points.len() as f32;
        let mean = points.iter().fold(Vec3::ZERO, |acc, p| acc + *p) / n;
        // Uniform on the hemisphere: E[x] = E[y] = 0, E[z] = 1/2.
        assert!(mean.x.abs() < 0.05);
        assert!(mean.y.abs() < 0.05);
        assert_relative_eq!(mean.z, 0.5, epsilon = 0.05);
        assert!(points.iter().any(|p| p.x < -0.5));
        assert!(points.iter().any(|p| p.y > 0.5));
    }

    #[test]
    fn test_low_sample_counts_are_raised_to_the_minimum() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(SsaoLane::with_rng(0, &mut rng).points().len(), MIN_SSAO_SAMPLES);
        assert_eq!(SsaoLane::with_rng(32, &mut rng).points().len(), MIN_SSAO_SAMPLES);
        assert_eq!(SsaoLane::with_rng(300, &mut rng).points().len(), 300);
        assert_eq!(SsaoLane::kernel_size(64), MIN_SSAO_SAMPLES);
    }

    #[test]
    fn test_kernel_is_generated_once() {
        let lane = SsaoLane::with_rng(256, &mut StdRng::seed_from_u64(1));
        let first = lane.points().to_vec();
        assert_eq!(lane.points(), first.as_slice());
        assert!(lane.points().len() >= 200);
    }
}
