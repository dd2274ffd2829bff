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

//! Probe baking: rendering the incident radiance at a point into SH coefficients.

use crate::render_lane::{
    ForwardLane, FrameContext, RenderCallCollector, RenderWorld, ShadowMaps, SharedResources,
};
use image::Rgb32FImage;
use lumina_core::{
    math::{sh::CUBEMAP_FACE_AXES, SphericalHarmonics, Vec3},
    renderer::{Camera, GraphicsDevice, RenderError, RenderMode, RenderTarget, ResourceError},
    scene::Scene,
};

/// Field of view of every capture face, in degrees.
pub const CAPTURE_FOV_DEGREES: f32 = 90.0;
/// Near plane of the capture cameras.
pub const CAPTURE_NEAR: f32 = 0.1;
/// Far plane of the capture cameras.
pub const CAPTURE_FAR: f32 = 1000.0;

/// Computes the spherical-harmonics radiance seen from a point.
///
/// Implementations may block on the GPU; callers treat each call as an
/// expensive, synchronous operation.
pub trait ProbeBaker {
    /// Bakes the probe at `position`.
    ///
    /// # Errors
    /// * `RenderError` - If rendering or reading back the radiance failed.
    fn bake_probe(
        &mut self,
        device: &dyn GraphicsDevice,
        position: Vec3,
    ) -> Result<SphericalHarmonics, RenderError>;
}

/// The camera capturing cubemap face `face` from `position`.
pub fn capture_camera(position: Vec3, face: usize) -> Option<Camera> {
    let axes = CUBEMAP_FACE_AXES.get(face)?;
    Camera::perspective(
        position,
        position + axes.front,
        axes.up,
        CAPTURE_FOV_DEGREES,
        1.0,
        CAPTURE_NEAR,
        CAPTURE_FAR,
    )
}

/// Bakes probes by rendering six forward-shaded faces into the capture target
/// and reading them back.
///
/// The scene is collected once, without culling, when the baker is created.
pub struct CubemapProbeBaker<'a> {
    scene: &'a Scene,
    world: RenderWorld,
    resources: &'a SharedResources,
    shadow_maps: &'a ShadowMaps,
    capture: &'a RenderTarget,
    forward: ForwardLane,
}

impl<'a> CubemapProbeBaker<'a> {
    /// Prepares a bake of `scene` into `capture`.
    pub fn new(
        scene: &'a Scene,
        resources: &'a SharedResources,
        shadow_maps: &'a ShadowMaps,
        capture: &'a RenderTarget,
    ) -> Self {
        Self {
            scene,
            world: RenderCallCollector::new().collect(scene, None),
            resources,
            shadow_maps,
            capture,
            forward: ForwardLane::new(),
        }
    }

    /// Renders and reads back the six faces seen from `position`, in
    /// [`CUBEMAP_FACE_AXES`] order.
    ///
    /// # Errors
    /// * `RenderError::Internal` - If a capture camera is degenerate.
    /// * `RenderError::ResourceError` - If submission or readback failed.
    pub fn capture_faces(
        &self,
        device: &dyn GraphicsDevice,
        position: Vec3,
    ) -> Result<[Rgb32FImage; 6], RenderError> {
        let color = self.capture.color(0).ok_or(ResourceError::NotFound)?;
        let mut faces = Vec::with_capacity(CUBEMAP_FACE_AXES.len());

        for face in 0..CUBEMAP_FACE_AXES.len() {
            let camera = capture_camera(position, face).ok_or_else(|| {
                RenderError::Internal(format!("degenerate capture camera at {position:?}"))
            })?;
            let ctx = FrameContext {
                scene: self.scene,
                camera: &camera,
                world: &self.world,
                resources: self.resources,
                shadow_maps: self.shadow_maps,
            };

            let mut encoder = device.create_command_encoder(Some("probe_capture"));
            self.forward.render_to_target(
                encoder.as_mut(),
                self.capture,
                &ctx,
                RenderMode::MultiPass,
                self.scene.background_color,
            );
            device.submit_command_buffer(encoder.finish())?;

            let bytes = device.read_texture(color)?;
            let expected = self.capture.width as usize * self.capture.height as usize * 12;
            let actual = bytes.len();
            let image = Rgb32FImage::from_raw(
                self.capture.width,
                self.capture.height,
                bytemuck::pod_collect_to_vec(&bytes),
            )
            .ok_or(ResourceError::SizeMismatch { expected, actual })?;
            faces.push(image);
        }

        faces
            .try_into()
            .map_err(|_| RenderError::Internal("incomplete cubemap capture".to_string()))
    }
}

impl ProbeBaker for CubemapProbeBaker<'_> {
    fn bake_probe(
        &mut self,
        device: &dyn GraphicsDevice,
        position: Vec3,
    ) -> Result<SphericalHarmonics, RenderError> {
        let faces = self.capture_faces(device, position)?;
        Ok(SphericalHarmonics::from_cubemap_faces(&faces))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_capture_cameras_follow_face_axes() {
        let position = Vec3::new(1.0, 2.0, 3.0);
        for (face, axes) in CUBEMAP_FACE_AXES.iter().enumerate() {
            let camera = capture_camera(position, face).unwrap();
            assert_eq!(camera.eye(), position);
            let forward = (camera.center() - camera.eye()).normalize();
            assert_relative_eq!(forward.dot(axes.front), 1.0, epsilon = 1e-5);
        }
        assert!(capture_camera(position, 6).is_none());
    }
}
