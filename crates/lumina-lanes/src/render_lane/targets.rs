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

//! The render targets a frame is drawn through.

use lumina_core::renderer::{
    GraphicsDevice, RenderTarget, RenderTargetDescriptor, ResourceError, TextureFormat, TextureId,
};
use std::borrow::Cow;

/// G-buffer channel holding albedo and alpha.
pub const GBUFFER_ALBEDO: usize = 0;
/// G-buffer channel holding the encoded normal.
pub const GBUFFER_NORMAL: usize = 1;
/// G-buffer channel holding packed material and emissive data.
pub const GBUFFER_EXTRA: usize = 2;

const GBUFFER_FORMATS: [TextureFormat; 3] = [TextureFormat::Rgba8Unorm; 3];

/// The window-sized targets plus the fixed-size probe-capture target.
///
/// Owned by the render agent; recreated on resize. Each lane writes only the
/// targets of its own stage.
#[derive(Debug)]
pub struct FrameTargets {
    /// Albedo, normal and material channels plus depth.
    pub gbuffers: RenderTarget,
    /// Scratch copy of the G-buffer the decal stage draws into.
    pub decals: RenderTarget,
    /// HDR accumulation of every lighting contribution, with a depth copy.
    pub illumination: RenderTarget,
    /// Half-resolution ambient occlusion.
    pub ao: RenderTarget,
    /// Square HDR target every probe face is captured into.
    pub capture: RenderTarget,
}

impl FrameTargets {
    /// Creates every target.
    ///
    /// # Errors
    /// * `ResourceError` - If an attachment cannot be allocated. Targets created
    ///   before the failure are released.
    pub fn new(
        device: &dyn GraphicsDevice,
        width: u32,
        height: u32,
        capture_resolution: u32,
    ) -> Result<Self, ResourceError> {
        let mut created = TargetSet::new(device);
        let [gbuffers, decals, illumination, ao] = created.window_targets(width, height)?;
        let capture = created.capture_target(capture_resolution)?;
        created.keep();

        Ok(Self {
            gbuffers,
            decals,
            illumination,
            ao,
            capture,
        })
    }

    /// Recreates the window-sized targets. The capture target is kept.
    ///
    /// # Errors
    /// * `ResourceError` - If a new attachment cannot be allocated; the old
    ///   targets are kept in that case.
    pub fn resize(
        &mut self,
        device: &dyn GraphicsDevice,
        width: u32,
        height: u32,
    ) -> Result<(), ResourceError> {
        let mut created = TargetSet::new(device);
        let [gbuffers, decals, illumination, ao] = created.window_targets(width, height)?;
        created.keep();

        let old = [
            std::mem::replace(&mut self.gbuffers, gbuffers),
            std::mem::replace(&mut self.decals, decals),
            std::mem::replace(&mut self.illumination, illumination),
            std::mem::replace(&mut self.ao, ao),
        ];
        for target in &old {
            release(device, target);
        }
        log::debug!("FrameTargets: resized to {}x{}", width, height);
        Ok(())
    }

    /// Recreates the capture target at a new square resolution.
    pub fn set_capture_resolution(
        &mut self,
        device: &dyn GraphicsDevice,
        resolution: u32,
    ) -> Result<(), ResourceError> {
        if self.capture.width == resolution.max(1) {
            return Ok(());
        }
        let mut created = TargetSet::new(device);
        let capture = created.capture_target(resolution)?;
        created.keep();
        release(device, &std::mem::replace(&mut self.capture, capture));
        Ok(())
    }

    /// Width of the window-sized targets.
    pub fn width(&self) -> u32 {
        self.gbuffers.width
    }

    /// Height of the window-sized targets.
    pub fn height(&self) -> u32 {
        self.gbuffers.height
    }

    /// The scene depth written by the G-buffer stage.
    pub fn scene_depth(&self) -> Option<TextureId> {
        self.gbuffers.depth_texture
    }

    /// Releases every target.
    pub fn destroy(&self, device: &dyn GraphicsDevice) {
        for target in [
            &self.gbuffers,
            &self.decals,
            &self.illumination,
            &self.ao,
            &self.capture,
        ] {
            release(device, target);
        }
    }
}

fn release(device: &dyn GraphicsDevice, target: &RenderTarget) {
    if let Err(e) = device.destroy_render_target(target.id) {
        log::warn!("FrameTargets: failed to destroy {:?}: {}", target.id, e);
    }
}

/// Targets created so far; released on drop unless kept.
struct TargetSet<'a> {
    device: &'a dyn GraphicsDevice,
    created: Vec<RenderTarget>,
}

impl<'a> TargetSet<'a> {
    fn new(device: &'a dyn GraphicsDevice) -> Self {
        Self {
            device,
            created: Vec::new(),
        }
    }

    fn create(
        &mut self,
        label: &'static str,
        width: u32,
        height: u32,
        color_formats: &[TextureFormat],
        with_depth: bool,
    ) -> Result<RenderTarget, ResourceError> {
        let target = self.device.create_render_target(&RenderTargetDescriptor {
            label: Some(Cow::Borrowed(label)),
            width: width.max(1),
            height: height.max(1),
            color_formats: color_formats.to_vec(),
            with_depth,
        })?;
        self.created.push(target.clone());
        Ok(target)
    }

    fn window_targets(&mut self, width: u32, height: u32) -> Result<[RenderTarget; 4], ResourceError> {
        Ok([
            self.create("gbuffers", width, height, &GBUFFER_FORMATS, true)?,
            self.create("decals", width, height, &GBUFFER_FORMATS, true)?,
            self.create(
                "illumination",
                width,
                height,
                &[TextureFormat::Rgba32Float],
                true,
            )?,
            self.create("ao", width / 2, height / 2, &[TextureFormat::R8Unorm], false)?,
        ])
    }

    fn capture_target(&mut self, resolution: u32) -> Result<RenderTarget, ResourceError> {
        self.create(
            "probe_capture",
            resolution,
            resolution,
            &[TextureFormat::Rgb32Float],
            true,
        )
    }

    fn keep(mut self) {
        self.created.clear();
    }
}

impl Drop for TargetSet<'_> {
    fn drop(&mut self) {
        for target in &self.created {
            release(self.device, target);
        }
    }
}
