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

//! Provides bounding volumes and the view frustum used for visibility culling.

use super::{Mat4, Vec3, Vec4};

/// Represents an Axis-Aligned Bounding Box (AABB).
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct Aabb {
    /// The corner of the box with the smallest coordinates on all axes.
    pub min: Vec3,
    /// The corner of the box with the largest coordinates on all axes.
    pub max: Vec3,
}

impl Aabb {
    /// Creates a new `Aabb` from two corner points, in any order.
    #[inline]
    pub fn from_min_max(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Creates a new `Aabb` from a center point and its half-extents.
    #[inline]
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        let half_extents = half_extents.abs();
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Creates an `Aabb` that tightly encloses a given set of points.
    ///
    /// # Returns
    ///
    /// Returns `Some(Aabb)` if the input slice is not empty, otherwise `None`.
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        Some(rest.iter().fold(
            Self {
                min: *first,
                max: *first,
            },
            |acc, p| Self {
                min: acc.min.min(*p),
                max: acc.max.max(*p),
            },
        ))
    }

    /// Calculates the center point of the `Aabb`.
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Calculates the half-extents (half the size on each axis) of the `Aabb`.
    #[inline]
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Checks if a point lies inside or on the boundary of the `Aabb`.
    #[inline]
    pub fn contains_point(&self, point: Vec3) -> bool {
        (point.x >= self.min.x && point.x <= self.max.x)
            && (point.y >= self.min.y && point.y <= self.max.y)
            && (point.z >= self.min.z && point.z <= self.max.z)
    }

    /// Returns the world-space box enclosing this box after `matrix` is applied.
    ///
    /// The center is transformed as a point and the half-extents are projected
    /// onto the absolute value of the matrix's linear part.
    pub fn transform(&self, matrix: &Mat4) -> Self {
        let center = matrix.transform_point(self.center());
        let h = self.half_extents();
        let axis = |i: usize| matrix.cols[i].truncate().abs();
        let half_extents = axis(0) * h.x + axis(1) * h.y + axis(2) * h.z;
        Self::from_center_half_extents(center, half_extents)
    }
}

/// A plane in Hessian normal form: points `p` with `normal.dot(p) + distance == 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// The unit normal, pointing to the inside half-space.
    pub normal: Vec3,
    /// The signed offset of the plane from the origin.
    pub distance: f32,
}

impl Plane {
    /// Builds a normalized plane from raw `(a, b, c, d)` coefficients.
    ///
    /// # Returns
    ///
    /// `None` if the normal part is degenerate.
    pub fn from_coefficients(v: Vec4) -> Option<Self> {
        let normal = v.truncate();
        let len = normal.length();
        if len == 0.0 || !len.is_finite() {
            return None;
        }
        Some(Self {
            normal: normal / len,
            distance: v.w / len,
        })
    }

    /// Signed distance from the plane to `point`, positive on the inside.
    #[inline]
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }
}

/// The six clipping planes of a view-projection matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    /// Left, right, bottom, top, near and far planes, normals pointing inwards.
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Extracts the frustum planes of a right-handed, zero-to-one depth
    /// view-projection matrix (Gribb/Hartmann).
    ///
    /// # Returns
    ///
    /// `None` if the matrix is degenerate and a plane cannot be normalized.
    pub fn from_view_projection(view_projection: &Mat4) -> Option<Self> {
        let r0 = view_projection.get_row(0);
        let r1 = view_projection.get_row(1);
        let r2 = view_projection.get_row(2);
        let r3 = view_projection.get_row(3);
        Some(Self {
            planes: [
                Plane::from_coefficients(r3 + r0)?,
                Plane::from_coefficients(r3 - r0)?,
                Plane::from_coefficients(r3 + r1)?,
                Plane::from_coefficients(r3 - r1)?,
                Plane::from_coefficients(r2)?,
                Plane::from_coefficients(r3 - r2)?,
            ],
        })
    }

    /// Returns `true` unless the box lies entirely outside one of the planes.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        let center = aabb.center();
        let h = aabb.half_extents();
        self.planes.iter().all(|plane| {
            let n = plane.normal.abs();
            let radius = n.x * h.x + n.y * h.y + n.z * h.z;
            plane.signed_distance(center) >= -radius
        })
    }

    /// Returns `true` unless the sphere lies entirely outside one of the planes.
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.signed_distance(center) >= -radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::FRAC_PI_2;

    fn looking_down_negative_z() -> Frustum {
        let proj = Mat4::perspective_rh_zo(FRAC_PI_2, 1.0, 0.1, 100.0);
        let view = Mat4::look_at_rh(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y).unwrap();
        Frustum::from_view_projection(&(proj * view)).unwrap()
    }

    #[test]
    fn test_aabb_transform_translates_and_scales() {
        let aabb = Aabb::from_min_max(Vec3::splat(-1.0), Vec3::splat(1.0));
        let m = Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0)) * Mat4::from_scale(Vec3::splat(2.0));
        let t = aabb.transform(&m);
        assert_eq!(t.center(), Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(t.half_extents(), Vec3::splat(2.0));
    }

    #[test]
    fn test_aabb_transform_rotation_grows_box() {
        let aabb = Aabb::from_min_max(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let t = aabb.transform(&Mat4::from_rotation_y(std::f32::consts::FRAC_PI_4));
        assert!(t.half_extents().x > 1.4 && t.half_extents().x < 1.42);
    }

    #[test]
    fn test_frustum_box_culling() {
        let frustum = looking_down_negative_z();
        let ahead = Aabb::from_center_half_extents(Vec3::new(0.0, 0.0, -10.0), Vec3::ONE);
        let behind = Aabb::from_center_half_extents(Vec3::new(0.0, 0.0, 10.0), Vec3::ONE);
        let beyond_far = Aabb::from_center_half_extents(Vec3::new(0.0, 0.0, -200.0), Vec3::ONE);
        let straddling_side = Aabb::from_center_half_extents(Vec3::new(10.5, 0.0, -10.0), Vec3::ONE);
        assert!(frustum.intersects_aabb(&ahead));
        assert!(!frustum.intersects_aabb(&behind));
        assert!(!frustum.intersects_aabb(&beyond_far));
        assert!(frustum.intersects_aabb(&straddling_side));
    }

    #[test]
    fn test_frustum_sphere_culling() {
        let frustum = looking_down_negative_z();
        assert!(frustum.intersects_sphere(Vec3::new(0.0, 0.0, 5.0), 6.0));
        assert!(!frustum.intersects_sphere(Vec3::new(0.0, 0.0, 5.0), 4.0));
        assert!(frustum.intersects_sphere(Vec3::new(0.0, 50.0, -10.0), 40.0));
    }
}
