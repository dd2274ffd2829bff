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

//! The baked irradiance volume and its two passes.

use super::{ProbeBaker, ProbeGrid, ProbeGridError};
use crate::render_lane::{
    bind_camera, deferred::bind_gbuffer_textures, FrameContext, FrameTargets, TargetPass,
};
use lumina_core::{
    lane::{Lane, LaneKind},
    math::{Mat4, SphericalHarmonics, Vec3},
    renderer::{
        api::program, BlendState, CommandEncoder, FilterMode, GraphicsDevice, RenderError,
        RenderState, ResourceError, TextureDescriptor, TextureFormat, TextureId,
    },
};
use std::{borrow::Cow, time::Instant};

/// Texels per probe row of the coefficient texture, one per SH coefficient.
pub const PROBE_TEXTURE_WIDTH: u32 = 9;

/// A probe grid, its baked coefficients and their GPU copy.
///
/// The coefficient texture is `9 x N` `Rgb32Float`: row `i` holds the nine RGB
/// coefficients of probe `i`.
#[derive(Debug, Default)]
pub struct IrradianceVolume {
    grid: Option<ProbeGrid>,
    texture: Option<TextureId>,
    texture_rows: u32,
    // Whether the texture holds the coefficients of the current grid.
    texture_current: bool,
    needs_rebake: bool,
}

impl IrradianceVolume {
    /// Creates a volume without a grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the grid with a fresh one and flags it for baking.
    ///
    /// The coefficient texture stops being used until the new grid is baked.
    ///
    /// # Errors
    /// * `ProbeGridError::NonFiniteBounds` - If a corner is not finite. The
    ///   previous grid is kept.
    pub fn create_probe_grid(
        &mut self,
        dims: [u32; 3],
        start: Vec3,
        end: Vec3,
    ) -> Result<(), ProbeGridError> {
        let grid = ProbeGrid::new(dims, start, end)?;
        log::info!(
            "IrradianceVolume: grid {}x{}x{} from {:?} to {:?}",
            dims[0],
            dims[1],
            dims[2],
            start,
            end
        );
        self.grid = Some(grid);
        self.texture_current = false;
        self.needs_rebake = true;
        Ok(())
    }

    /// The current grid.
    pub fn grid(&self) -> Option<&ProbeGrid> {
        self.grid.as_ref()
    }

    /// The coefficient texture, once uploaded.
    pub fn texture(&self) -> Option<TextureId> {
        self.texture
    }

    /// Whether the texture holds one row per probe of the current grid.
    pub fn is_uploaded(&self) -> bool {
        self.uploaded_grid().is_some()
    }

    fn uploaded_grid(&self) -> Option<(&ProbeGrid, TextureId)> {
        let grid = self.grid.as_ref().filter(|g| !g.is_empty())?;
        let texture = self.texture.filter(|_| self.texture_current)?;
        (self.texture_rows as usize == grid.len()).then_some((grid, texture))
    }

    /// Whether the probes must be baked before their next use.
    pub fn needs_rebake(&self) -> bool {
        self.needs_rebake
    }

    /// Requests a bake before the next frame.
    pub fn mark_dirty(&mut self) {
        self.needs_rebake = true;
    }

    /// Bakes every probe, then uploads the coefficients.
    ///
    /// Coefficients are gathered into a scratch list and committed only when
    /// every probe succeeded, so a failed bake leaves the previous cache in
    /// place. The rebake flag is cleared either way.
    ///
    /// # Returns
    ///
    /// The number of probes baked.
    ///
    /// # Errors
    /// * `RenderError` - If a probe or the upload failed.
    pub fn bake(
        &mut self,
        device: &dyn GraphicsDevice,
        baker: &mut dyn ProbeBaker,
    ) -> Result<usize, RenderError> {
        self.needs_rebake = false;
        let Some(grid) = self.grid.as_mut() else {
            return Ok(0);
        };

        let started = Instant::now();
        let scratch = grid
            .probes()
            .iter()
            .map(|probe| baker.bake_probe(device, probe.position))
            .collect::<Result<Vec<_>, _>>()?;
        let count = scratch.len();
        grid.set_coefficients(scratch)
            .map_err(|e| RenderError::Internal(e.to_string()))?;

        self.upload(device)?;
        log::info!(
            "IrradianceVolume: baked {} probes in {:.2?}",
            count,
            started.elapsed()
        );
        Ok(count)
    }

    /// Writes the coefficients of every probe to the coefficient texture.
    ///
    /// The texture is recreated when the probe count changed. Does nothing for
    /// a missing or empty grid.
    ///
    /// # Returns
    ///
    /// Whether anything was uploaded.
    ///
    /// # Errors
    /// * `ResourceError` - If the texture cannot be created or written.
    pub fn upload(&mut self, device: &dyn GraphicsDevice) -> Result<bool, ResourceError> {
        let Some(grid) = self.grid.as_ref().filter(|g| !g.is_empty()) else {
            return Ok(false);
        };
        let rows = u32::try_from(grid.len())
            .map_err(|_| ResourceError::BackendError("too many probes".to_string()))?;

        let texture = match self.texture {
            Some(id) if self.texture_rows == rows => id,
            stale => {
                if let Some(id) = stale {
                    if let Err(e) = device.destroy_texture(id) {
                        log::warn!("IrradianceVolume: failed to destroy {:?}: {}", id, e);
                    }
                }
                self.texture = None;
                let id = device.create_texture(&TextureDescriptor {
                    label: Some(Cow::Borrowed("irradiance_probes")),
                    width: PROBE_TEXTURE_WIDTH,
                    height: rows,
                    format: TextureFormat::Rgb32Float,
                    mag_filter: FilterMode::Nearest,
                    min_filter: FilterMode::Nearest,
                })?;
                self.texture = Some(id);
                self.texture_rows = rows;
                id
            }
        };

        let data: Vec<f32> = grid.probes().iter().flat_map(|p| p.sh.to_floats()).collect();
        self.texture_current = false;
        device.write_texture(texture, bytemuck::cast_slice(&data))?;
        self.texture_current = true;
        Ok(true)
    }

    /// Reads the coefficient texture back, one set per row.
    ///
    /// Returns an empty list when nothing was uploaded yet.
    ///
    /// # Errors
    /// * `ResourceError` - If the readback failed or has an unexpected size.
    pub fn read_back(
        &self,
        device: &dyn GraphicsDevice,
    ) -> Result<Vec<SphericalHarmonics>, ResourceError> {
        let Some(texture) = self.texture else {
            return Ok(Vec::new());
        };
        let floats: Vec<f32> = bytemuck::pod_collect_to_vec(&device.read_texture(texture)?);
        let expected = self.texture_rows as usize * SphericalHarmonics::FLOAT_COUNT;
        if floats.len() != expected {
            return Err(ResourceError::SizeMismatch {
                expected: expected * 4,
                actual: floats.len() * 4,
            });
        }
        Ok(floats
            .chunks_exact(SphericalHarmonics::FLOAT_COUNT)
            .map(|row| {
                let mut packed = [0.0; SphericalHarmonics::FLOAT_COUNT];
                packed.copy_from_slice(row);
                SphericalHarmonics::from_floats(packed)
            })
            .collect())
    }

    /// CPU counterpart of the reconstruction pass.
    ///
    /// The lookup point is pushed `normal_distance` along `normal` before the
    /// trilinear blend, then the blended SH is evaluated in the normal direction.
    pub fn sample_irradiance(
        &self,
        position: Vec3,
        normal: Vec3,
        normal_distance: f32,
    ) -> Option<Vec3> {
        let normal = normal.normalize();
        let sh = self
            .grid
            .as_ref()?
            .interpolate(position + normal * normal_distance)?;
        Some(sh.evaluate(normal))
    }

    /// Adds the probe irradiance of every G-buffer pixel to the illumination target.
    ///
    /// # Returns
    ///
    /// `false` if nothing was drawn: the current grid is not uploaded, or the
    /// program is missing.
    pub fn render_reconstruction(
        &self,
        encoder: &mut dyn CommandEncoder,
        ctx: &FrameContext,
        targets: &FrameTargets,
        normal_distance: f32,
    ) -> bool {
        let Some((grid, texture)) = self.uploaded_grid() else {
            return false;
        };

        let mut pass = TargetPass::begin(encoder, &targets.illumination);
        if pass.use_program(program::IRRADIANCE_SH).is_err() {
            log::warn!(
                "IrradianceVolume: program '{}' is missing",
                program::IRRADIANCE_SH
            );
            return false;
        }
        pass.set_render_state(RenderState::fullscreen(Some(BlendState::ADDITIVE)));
        bind_gbuffer_textures(&mut *pass, targets);
        pass.set_uniform(
            "u_inverse_viewprojection",
            ctx.camera.inverse_view_projection().into(),
        );

        let [dx, dy, dz] = grid.dims();
        pass.set_uniform("u_irr_start", grid.start().into());
        pass.set_uniform("u_irr_end", grid.end().into());
        pass.set_uniform("u_irr_delta", grid.delta().into());
        pass.set_uniform(
            "u_irr_dims",
            Vec3::new(dx as f32, dy as f32, dz as f32).into(),
        );
        pass.set_uniform("u_irr_normal_distance", normal_distance.into());
        pass.set_uniform("u_num_probes", (grid.len() as f32).into());
        pass.set_uniform("u_probes_texture", texture.into());
        pass.draw_mesh(&ctx.resources.quad);
        true
    }

    /// Draws one sphere per probe, shaded by its coefficients, into the bound target.
    ///
    /// # Returns
    ///
    /// The number of probes drawn, zero until the current grid is uploaded.
    pub fn render_probe_grid(
        &self,
        encoder: &mut dyn CommandEncoder,
        ctx: &FrameContext,
        display_size: f32,
    ) -> usize {
        let Some((grid, _)) = self.uploaded_grid() else {
            return 0;
        };
        if encoder.use_program(program::PROBE).is_err() {
            log::warn!("IrradianceVolume: program '{}' is missing", program::PROBE);
            return 0;
        }
        encoder.set_render_state(RenderState::BASELINE);
        bind_camera(encoder, ctx.camera);

        let scale = Mat4::from_scale(Vec3::splat(display_size));
        for probe in grid.probes() {
            encoder.set_uniform("u_model", (Mat4::from_translation(probe.position) * scale).into());
            encoder.set_uniform("u_coeffs", probe.sh.coeffs.to_vec().into());
            encoder.draw_mesh(&ctx.resources.sphere);
        }
        grid.len()
    }

    /// Releases the coefficient texture.
    pub fn release(&mut self, device: &dyn GraphicsDevice) {
        if let Some(id) = self.texture.take() {
            if let Err(e) = device.destroy_texture(id) {
                log::warn!("IrradianceVolume: failed to destroy {:?}: {}", id, e);
            }
        }
        self.texture_rows = 0;
        self.texture_current = false;
    }
}

impl Lane for IrradianceVolume {
    fn strategy_name(&self) -> &'static str {
        "IrradianceVolume"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Lighting
    }
}
