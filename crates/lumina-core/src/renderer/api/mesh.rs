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

//! Defines CPU-side mesh data and the built-in primitives used by the pipeline.

use crate::math::{Aabb, Vec2, Vec3, PI, TAU};
use std::borrow::Cow;

/// A triangle mesh with optional per-vertex attributes.
///
/// The graphics backend uploads the geometry on first use; the renderer only
/// needs the bounding box and vertex count.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// A debug name.
    pub name: Cow<'static, str>,
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// Vertex normals.
    pub normals: Option<Vec<Vec3>>,
    /// Vertex texture coordinates.
    pub tex_coords: Option<Vec<Vec2>>,
    /// Triangle list indices; `None` for non-indexed geometry.
    pub indices: Option<Vec<u32>>,
    /// Local-space bounding box.
    pub bounding_box: Aabb,
}

impl Mesh {
    /// Creates a mesh and computes its bounding box from the positions.
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        positions: Vec<Vec3>,
        normals: Option<Vec<Vec3>>,
        tex_coords: Option<Vec<Vec2>>,
        indices: Option<Vec<u32>>,
    ) -> Self {
        let bounding_box = Aabb::from_points(&positions)
            .unwrap_or_else(|| Aabb::from_min_max(Vec3::ZERO, Vec3::ZERO));
        Self {
            name: name.into(),
            positions,
            normals,
            tex_coords,
            indices,
            bounding_box,
        }
    }

    /// Number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Whether a draw of this mesh would produce no primitives.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.as_ref().is_some_and(|i| i.is_empty())
    }

    /// A two-triangle quad covering clip space, used for full-screen passes.
    pub fn fullscreen_quad() -> Self {
        let positions = vec![
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(-1.0, 1.0, 0.0),
        ];
        let uvs = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        Self::new("quad", positions, None, Some(uvs), Some(vec![0, 1, 2, 0, 2, 3]))
    }

    /// An axis-aligned cube spanning `[-1, 1]` on every axis.
    pub fn unit_cube() -> Self {
        let mut positions = Vec::with_capacity(24);
        let mut normals = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        let axes = [Vec3::X, Vec3::Y, Vec3::Z];
        for (i, normal_axis) in axes.iter().enumerate() {
            let u = axes[(i + 1) % 3];
            let v = axes[(i + 2) % 3];
            for sign in [1.0f32, -1.0] {
                let n = *normal_axis * sign;
                let base = positions.len() as u32;
                for (a, b) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                    positions.push(n + u * a + v * b * sign);
                    normals.push(n);
                }
                indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
            }
        }
        Self::new("cube", positions, Some(normals), None, Some(indices))
    }

    /// A UV sphere of radius 1 centered at the origin.
    pub fn unit_sphere(rings: u32, sectors: u32) -> Self {
        let rings = rings.max(2);
        let sectors = sectors.max(3);
        let mut positions = Vec::new();
        let mut uvs = Vec::new();
        for r in 0..=rings {
            let v = r as f32 / rings as f32;
            let phi = v * PI;
            for s in 0..=sectors {
                let u = s as f32 / sectors as f32;
                let theta = u * TAU;
                positions.push(Vec3::new(
                    phi.sin() * theta.cos(),
                    phi.cos(),
                    phi.sin() * theta.sin(),
                ));
                uvs.push(Vec2::new(u, v));
            }
        }
        let stride = sectors + 1;
        let mut indices = Vec::new();
        for r in 0..rings {
            for s in 0..sectors {
                let a = r * stride + s;
                let b = a + stride;
                indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
            }
        }
        let normals = positions.clone();
        Self::new("sphere", positions, Some(normals), Some(uvs), Some(indices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_primitives_have_expected_bounds() {
        let cube = Mesh::unit_cube();
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.bounding_box.half_extents(), Vec3::ONE);
        let sphere = Mesh::unit_sphere(8, 16);
        assert!((sphere.bounding_box.half_extents().y - 1.0).abs() < 1e-5);
        assert_eq!(sphere.indices.as_ref().map(Vec::len), Some(8 * 16 * 6));
    }

    #[test]
    fn test_empty_mesh_detection() {
        let empty = Mesh::new("empty", Vec::new(), None, None, None);
        assert!(empty.is_empty());
        assert!(!Mesh::fullscreen_quad().is_empty());
    }
}
