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

//! Third-order (9 coefficient) spherical harmonics for RGB radiance.
//!
//! Radiance captured into the six faces of a cubemap is projected onto the
//! real SH basis; each texel contributes proportionally to the solid angle it
//! subtends on the unit sphere.

use super::{Vec3, PI};
use image::Rgb32FImage;

/// Number of coefficients of a third-order SH expansion.
pub const SH_COEFFICIENT_COUNT: usize = 9;

/// Orientation of one cubemap face: the camera basis used to render it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubemapFaceAxes {
    /// World direction of increasing image column.
    pub right: Vec3,
    /// World direction of decreasing image row.
    pub up: Vec3,
    /// World direction the face looks at.
    pub front: Vec3,
}

/// Face axes in +X, -X, +Y, -Y, +Z, -Z order, following the GL cubemap convention.
pub const CUBEMAP_FACE_AXES: [CubemapFaceAxes; 6] = [
    CubemapFaceAxes {
        right: Vec3::new(0.0, 0.0, -1.0),
        up: Vec3::new(0.0, -1.0, 0.0),
        front: Vec3::new(1.0, 0.0, 0.0),
    },
    CubemapFaceAxes {
        right: Vec3::new(0.0, 0.0, 1.0),
        up: Vec3::new(0.0, -1.0, 0.0),
        front: Vec3::new(-1.0, 0.0, 0.0),
    },
    CubemapFaceAxes {
        right: Vec3::new(1.0, 0.0, 0.0),
        up: Vec3::new(0.0, 0.0, 1.0),
        front: Vec3::new(0.0, 1.0, 0.0),
    },
    CubemapFaceAxes {
        right: Vec3::new(1.0, 0.0, 0.0),
        up: Vec3::new(0.0, 0.0, -1.0),
        front: Vec3::new(0.0, -1.0, 0.0),
    },
    CubemapFaceAxes {
        right: Vec3::new(1.0, 0.0, 0.0),
        up: Vec3::new(0.0, -1.0, 0.0),
        front: Vec3::new(0.0, 0.0, 1.0),
    },
    CubemapFaceAxes {
        right: Vec3::new(-1.0, 0.0, 0.0),
        up: Vec3::new(0.0, -1.0, 0.0),
        front: Vec3::new(0.0, 0.0, -1.0),
    },
];

/// Evaluates the 9 real SH basis functions for a unit direction.
#[inline]
pub fn sh_basis(dir: Vec3) -> [f32; SH_COEFFICIENT_COUNT] {
    let Vec3 { x, y, z } = dir;
    [
        0.282_095,
        0.488_603 * y,
        0.488_603 * z,
        0.488_603 * x,
        1.092_548 * x * y,
        1.092_548 * y * z,
        0.315_392 * (3.0 * z * z - 1.0),
        1.092_548 * x * z,
        0.546_274 * (x * x - y * y),
    ]
}

/// RGB radiance expressed as 9 spherical-harmonics coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct SphericalHarmonics {
    /// One RGB coefficient per basis function, in [`sh_basis`] order.
    pub coeffs: [Vec3; SH_COEFFICIENT_COUNT],
}

impl SphericalHarmonics {
    /// Number of scalars in a packed coefficient set.
    pub const FLOAT_COUNT: usize = SH_COEFFICIENT_COUNT * 3;

    /// Projects six cubemap faces onto the SH basis.
    ///
    /// Faces follow [`CUBEMAP_FACE_AXES`] order with rows stored top-down.
    /// Empty faces contribute nothing; if every face is empty the result is zero.
    pub fn from_cubemap_faces(faces: &[Rgb32FImage; 6]) -> Self {
        let mut sh = Self::default();
        let mut weight_sum = 0.0f32;

        for (face, axes) in faces.iter().zip(CUBEMAP_FACE_AXES.iter()) {
            let (width, height) = face.dimensions();
            for (px, py, texel) in face.enumerate_pixels() {
                let u = 2.0 * (px as f32 + 0.5) / width as f32 - 1.0;
                let v = 1.0 - 2.0 * (py as f32 + 0.5) / height as f32;
                let dir = (axes.front + axes.right * u + axes.up * v).normalize();

                // Differential solid angle of the texel, up to the constant du*dv factor.
                let falloff = 1.0 + u * u + v * v;
                let weight = 4.0 / (falloff * falloff.sqrt());
                weight_sum += weight;

                let radiance = Vec3::from(texel.0) * weight;
                for (coeff, basis) in sh.coeffs.iter_mut().zip(sh_basis(dir)) {
                    *coeff += radiance * basis;
                }
            }
        }

        if weight_sum > 0.0 {
            let normalization = 4.0 * PI / weight_sum;
            for coeff in sh.coeffs.iter_mut() {
                *coeff *= normalization;
            }
        }
        sh
    }

    /// Reconstructs the radiance in direction `dir`.
    pub fn evaluate(&self, dir: Vec3) -> Vec3 {
        self.coeffs
            .iter()
            .zip(sh_basis(dir.normalize()))
            .fold(Vec3::ZERO, |acc, (c, b)| acc + *c * b)
    }

    /// Returns the 27 coefficients as a flat `[r, g, b, r, g, b, ...]` array.
    #[inline]
    pub fn to_floats(&self) -> [f32; Self::FLOAT_COUNT] {
        bytemuck::cast(self.coeffs)
    }

    /// Rebuilds a coefficient set from 27 packed floats.
    #[inline]
    pub fn from_floats(floats: [f32; Self::FLOAT_COUNT]) -> Self {
        Self {
            coeffs: bytemuck::cast(floats),
        }
    }

    /// Returns a linear blend of two coefficient sets.
    pub fn lerp(a: &Self, b: &Self, t: f32) -> Self {
        let mut out = *a;
        for (o, (ca, cb)) in out.coeffs.iter_mut().zip(a.coeffs.iter().zip(b.coeffs.iter())) {
            *o = *ca + (*cb - *ca) * t;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use image::Rgb;

    fn uniform_faces(color: [f32; 3]) -> [Rgb32FImage; 6] {
        std::array::from_fn(|_| Rgb32FImage::from_pixel(8, 8, Rgb(color)))
    }

    #[test]
    fn test_face_axes_are_orthonormal_and_right_handed() {
        for axes in CUBEMAP_FACE_AXES {
            assert_abs_diff_eq!(axes.right.dot(axes.up), 0.0);
            assert_abs_diff_eq!(axes.front.dot(axes.up), 0.0);
            // Camera right is front x up for a right-handed look-at.
            assert_eq!(axes.front.cross(axes.up), axes.right);
        }
    }

    #[test]
    fn test_constant_radiance_projects_to_dc_term_only() {
        let sh = SphericalHarmonics::from_cubemap_faces(&uniform_faces([0.5, 1.0, 2.0]));
        let dc = 0.282_095 * 4.0 * PI;
        assert_abs_diff_eq!(sh.coeffs[0].x, 0.5 * dc, epsilon = 1e-3);
        assert_abs_diff_eq!(sh.coeffs[0].y, 1.0 * dc, epsilon = 1e-3);
        assert_abs_diff_eq!(sh.coeffs[0].z, 2.0 * dc, epsilon = 1e-3);
        for coeff in &sh.coeffs[1..] {
            assert_abs_diff_eq!(coeff.length(), 0.0, epsilon = 1e-3);
        }
        let back = sh.evaluate(Vec3::new(0.3, -0.2, 0.9));
        assert_abs_diff_eq!(back.y, 1.0, epsilon = 1e-2);
    }

    #[test]
    fn test_bright_ceiling_favours_up_direction() {
        let mut faces = uniform_faces([0.0, 0.0, 0.0]);
        faces[2] = Rgb32FImage::from_pixel(8, 8, Rgb([1.0, 1.0, 1.0]));
        let sh = SphericalHarmonics::from_cubemap_faces(&faces);
        assert!(sh.coeffs[1].x > 0.0);
        assert!(sh.evaluate(Vec3::Y).x > sh.evaluate(-Vec3::Y).x);
        assert_abs_diff_eq!(sh.coeffs[3].x, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_projection_is_deterministic() {
        let mut faces = uniform_faces([0.2, 0.2, 0.2]);
        faces[4] = Rgb32FImage::from_fn(8, 8, |x, y| Rgb([x as f32 / 8.0, y as f32 / 8.0, 0.5]));
        let a = SphericalHarmonics::from_cubemap_faces(&faces);
        let b = SphericalHarmonics::from_cubemap_faces(&faces);
        assert_eq!(a, b);
    }

    #[test]
    fn test_float_packing_preserves_order() {
        let mut sh = SphericalHarmonics::default();
        sh.coeffs[0] = Vec3::new(1.0, 2.0, 3.0);
        sh.coeffs[8] = Vec3::new(25.0, 26.0, 27.0);
        let floats = sh.to_floats();
        assert_eq!(&floats[..3], &[1.0, 2.0, 3.0]);
        assert_eq!(&floats[24..], &[25.0, 26.0, 27.0]);
        assert_eq!(SphericalHarmonics::from_floats(floats), sh);
    }
}
