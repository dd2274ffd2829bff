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

//! The regular grid of irradiance probes.

use lumina_core::math::{SphericalHarmonics, Vec3};
use thiserror::Error;

/// Errors raised while building or filling a [`ProbeGrid`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProbeGridError {
    /// A grid corner has a NaN or infinite component.
    #[error("probe grid corners must be finite, got {start:?} .. {end:?}")]
    NonFiniteBounds {
        /// The first corner.
        start: Vec3,
        /// The opposite corner.
        end: Vec3,
    },
    /// A coefficient set does not have one entry per probe.
    #[error("expected coefficients for {expected} probes, got {actual}")]
    CoefficientCountMismatch {
        /// Number of probes in the grid.
        expected: usize,
        /// Number of coefficient sets supplied.
        actual: usize,
    },
}

/// One sample point of the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probe {
    /// Integer coordinate inside the grid.
    pub local: [u32; 3],
    /// Linear index, `x + y * dim_x + z * dim_x * dim_y`. Also the texture row.
    pub index: usize,
    /// World position.
    pub position: Vec3,
    /// Incident radiance at `position`.
    pub sh: SphericalHarmonics,
}

/// Probes placed on a regular lattice spanning two corners.
///
/// Spacing per axis is `(end - start) / (dim - 1)`, so the extremal probes sit
/// on the corners. An axis with a single probe has zero spacing and places it
/// at `start`. Probes are stored x-fastest, then y, then z.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeGrid {
    dims: [u32; 3],
    start: Vec3,
    end: Vec3,
    delta: Vec3,
    probes: Vec<Probe>,
}

impl ProbeGrid {
    /// Places `dims[0] * dims[1] * dims[2]` probes between `start` and `end`.
    ///
    /// A zero dimension yields an empty grid.
    ///
    /// # Errors
    /// * `ProbeGridError::NonFiniteBounds` - If a corner is not finite.
    pub fn new(dims: [u32; 3], start: Vec3, end: Vec3) -> Result<Self, ProbeGridError> {
        let finite = |v: Vec3| v.x.is_finite() && v.y.is_finite() && v.z.is_finite();
        if !finite(start) || !finite(end) {
            return Err(ProbeGridError::NonFiniteBounds { start, end });
        }

        let spacing = |extent: f32, dim: u32| {
            if dim > 1 {
                extent / (dim - 1) as f32
            } else {
                0.0
            }
        };
        let extent = end - start;
        let delta = Vec3::new(
            spacing(extent.x, dims[0]),
            spacing(extent.y, dims[1]),
            spacing(extent.z, dims[2]),
        );

        let count = dims.iter().map(|d| *d as usize).product();
        let mut probes = Vec::with_capacity(count);
        for z in 0..dims[2] {
            for y in 0..dims[1] {
                for x in 0..dims[0] {
                    let local = Vec3::new(x as f32, y as f32, z as f32);
                    probes.push(Probe {
                        local: [x, y, z],
                        index: probes.len(),
                        position: start + delta * local,
                        sh: SphericalHarmonics::default(),
                    });
                }
            }
        }

        Ok(Self {
            dims,
            start,
            end,
            delta,
            probes,
        })
    }

    /// Probe count per axis.
    pub fn dims(&self) -> [u32; 3] {
        self.dims
    }

    /// The first corner.
    pub fn start(&self) -> Vec3 {
        self.start
    }

    /// The opposite corner.
    pub fn end(&self) -> Vec3 {
        self.end
    }

    /// Spacing between neighbouring probes per axis.
    pub fn delta(&self) -> Vec3 {
        self.delta
    }

    /// Number of probes.
    pub fn len(&self) -> usize {
        self.probes.len()
    }

    /// Whether the grid has no probe.
    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    /// All probes, in index order.
    pub fn probes(&self) -> &[Probe] {
        &self.probes
    }

    /// The linear index of a grid coordinate.
    pub fn index_of(&self, x: u32, y: u32, z: u32) -> Option<usize> {
        let [dx, dy, dz] = self.dims;
        (x < dx && y < dy && z < dz).then(|| {
            x as usize + y as usize * dx as usize + z as usize * dx as usize * dy as usize
        })
    }

    /// The probe at a grid coordinate.
    pub fn probe(&self, x: u32, y: u32, z: u32) -> Option<&Probe> {
        self.index_of(x, y, z).map(|i| &self.probes[i])
    }

    /// The coefficients of every probe, in index order.
    pub fn coefficients(&self) -> Vec<SphericalHarmonics> {
        self.probes.iter().map(|p| p.sh).collect()
    }

    /// Replaces the coefficients of every probe at once.
    ///
    /// # Errors
    /// * `ProbeGridError::CoefficientCountMismatch` - If `coefficients` does not
    ///   have exactly one entry per probe. The grid is left unchanged.
    pub fn set_coefficients(
        &mut self,
        coefficients: Vec<SphericalHarmonics>,
    ) -> Result<(), ProbeGridError> {
        if coefficients.len() != self.probes.len() {
            return Err(ProbeGridError::CoefficientCountMismatch {
                expected: self.probes.len(),
                actual: coefficients.len(),
            });
        }
        for (probe, sh) in self.probes.iter_mut().zip(coefficients) {
            probe.sh = sh;
        }
        Ok(())
    }

    /// Blends the SH of the 8 probes enclosing `position` trilinearly.
    ///
    /// Positions outside the grid are clamped onto it. Returns `None` for an empty grid.
    pub fn interpolate(&self, position: Vec3) -> Option<SphericalHarmonics> {
        if self.is_empty() {
            return None;
        }
        let local = (position - self.start).div_or_zero(self.delta);

        let mut base = [0u32; 3];
        let mut next = [0u32; 3];
        let mut t = [0.0f32; 3];
        for axis in 0..3 {
            let last = self.dims[axis] - 1;
            let coord = local[axis].clamp(0.0, last as f32);
            let lower = (coord.floor() as u32).min(last.saturating_sub(1));
            base[axis] = lower;
            next[axis] = (lower + 1).min(last);
            t[axis] = if next[axis] == lower {
                0.0
            } else {
                coord - lower as f32
            };
        }

        let corner = |ix: u32, iy: u32, iz: u32| -> SphericalHarmonics {
            self.probe(ix, iy, iz).map(|p| p.sh).unwrap_or_default()
        };
        let lerp_x = |y: u32, z: u32| {
            SphericalHarmonics::lerp(&corner(base[0], y, z), &corner(next[0], y, z), t[0])
        };
        let lerp_xy = |z: u32| {
            SphericalHarmonics::lerp(&lerp_x(base[1], z), &lerp_x(next[1], z), t[1])
        };
        Some(SphericalHarmonics::lerp(&lerp_xy(base[2]), &lerp_xy(next[2]), t[2]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_grid_2x2x2_spacing_and_order() {
        let grid = ProbeGrid::new([2, 2, 2], Vec3::ZERO, Vec3::splat(10.0)).unwrap();
        assert_eq!(grid.len(), 8);
        assert_eq!(grid.delta(), Vec3::splat(10.0));
        let locals: Vec<_> = grid.probes().iter().map(|p| p.local).collect();
        assert_eq!(
            locals,
            vec![
                [0, 0, 0],
                [1, 0, 0],
                [0, 1, 0],
                [1, 1, 0],
                [0, 0, 1],
                [1, 0, 1],
                [0, 1, 1],
                [1, 1, 1],
            ]
        );
        for (i, probe) in grid.probes().iter().enumerate() {
            assert_eq!(probe.index, i);
        }
    }

    #[test]
    fn test_grid_corners_sit_on_bounds() {
        let start = Vec3::new(-30.0, 2.5, 7.0);
        let end = Vec3::new(45.0, 80.0, -12.0);
        for dims in [[2, 3, 4], [5, 1, 2], [7, 7, 7]] {
            let grid = ProbeGrid::new(dims, start, end).unwrap();
            let first = grid.probe(0, 0, 0).unwrap().position;
            assert_eq!(first, start);

            let last = grid
                .probe(dims[0] - 1, dims[1] - 1, dims[2] - 1)
                .unwrap()
                .position;
            for axis in 0..3 {
                let expected = if dims[axis] > 1 { end[axis] } else { start[axis] };
                assert_relative_eq!(last[axis], expected, epsilon = 1e-3);
            }
        }
    }

    #[test]
    fn test_index_is_a_bijection() {
        let grid = ProbeGrid::new([3, 4, 5], Vec3::ZERO, Vec3::ONE).unwrap();
        let mut seen = vec![false; grid.len()];
        for z in 0..5 {
            for y in 0..4 {
                for x in 0..3 {
                    let i = grid.index_of(x, y, z).unwrap();
                    assert!(!seen[i]);
                    seen[i] = true;
                    assert_eq!(grid.probes()[i].local, [x, y, z]);
                }
            }
        }
        assert!(seen.iter().all(|s| *s));
        assert_eq!(grid.index_of(3, 0, 0), None);
    }

    #[test]
    fn test_zero_dimension_is_empty() {
        let grid = ProbeGrid::new([0, 4, 4], Vec3::ZERO, Vec3::ONE).unwrap();
        assert!(grid.is_empty());
        assert!(grid.interpolate(Vec3::ZERO).is_none());
    }

    #[test]
    fn test_non_finite_bounds_rejected() {
        let err = ProbeGrid::new([2, 2, 2], Vec3::new(f32::NAN, 0.0, 0.0), Vec3::ONE);
        assert!(matches!(err, Err(ProbeGridError::NonFiniteBounds { .. })));
    }

    #[test]
    fn test_set_coefficients_checks_count() {
        let mut grid = ProbeGrid::new([2, 1, 1], Vec3::ZERO, Vec3::ONE).unwrap();
        let err = grid.set_coefficients(vec![SphericalHarmonics::default()]);
        assert_eq!(
            err,
            Err(ProbeGridError::CoefficientCountMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_interpolate_blends_between_probes() {
        let mut grid = ProbeGrid::new([2, 1, 1], Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)).unwrap();
        let mut dark = SphericalHarmonics::default();
        dark.coeffs[0] = Vec3::ZERO;
        let mut bright = SphericalHarmonics::default();
        bright.coeffs[0] = Vec3::splat(1.0);
        grid.set_coefficients(vec![dark, bright]).unwrap();

        let mid = grid.interpolate(Vec3::new(2.5, 0.0, 0.0)).unwrap();
        assert_relative_eq!(mid.coeffs[0].x, 0.25, epsilon = 1e-5);

        let clamped = grid.interpolate(Vec3::new(50.0, 3.0, -3.0)).unwrap();
        assert_relative_eq!(clamped.coeffs[0].y, 1.0, epsilon = 1e-5);
    }
}
