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

//! A look-at camera with a perspective or orthographic projection.

use crate::math::{degrees_to_radians, Aabb, Frustum, Mat4, Vec3};

/// The projection a [`Camera`] applies after its view transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Perspective projection.
    Perspective {
        /// Vertical field of view in degrees.
        fov_y_degrees: f32,
        /// Width divided by height.
        aspect_ratio: f32,
        /// Near plane distance.
        near: f32,
        /// Far plane distance.
        far: f32,
    },
    /// Orthographic projection of a view-space box.
    Orthographic {
        /// Left edge of the box.
        left: f32,
        /// Right edge of the box.
        right: f32,
        /// Bottom edge of the box.
        bottom: f32,
        /// Top edge of the box.
        top: f32,
        /// Near plane distance.
        near: f32,
        /// Far plane distance.
        far: f32,
    },
}

impl Projection {
    /// Returns the projection matrix.
    pub fn matrix(&self) -> Mat4 {
        match *self {
            Projection::Perspective {
                fov_y_degrees,
                aspect_ratio,
                near,
                far,
            } => Mat4::perspective_rh_zo(degrees_to_radians(fov_y_degrees), aspect_ratio, near, far),
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => Mat4::orthographic_rh_zo(left, right, bottom, top, near, far),
        }
    }

    /// Returns the `(near, far)` plane distances.
    pub fn near_far(&self) -> (f32, f32) {
        match *self {
            Projection::Perspective { near, far, .. } | Projection::Orthographic { near, far, .. } => {
                (near, far)
            }
        }
    }
}

/// A camera with cached view, projection and frustum data.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    eye: Vec3,
    center: Vec3,
    up: Vec3,
    projection: Projection,
    view: Mat4,
    view_projection: Mat4,
    inverse_view_projection: Mat4,
    frustum: Frustum,
}

impl Camera {
    /// Creates a camera at `eye` looking at `center`.
    ///
    /// # Returns
    ///
    /// `None` if the view is degenerate (`eye == center`, or `up` parallel to the
    /// view direction) or the projection is not invertible.
    pub fn look_at(eye: Vec3, center: Vec3, up: Vec3, projection: Projection) -> Option<Self> {
        let view = Mat4::look_at_rh(eye, center, up)?;
        let view_projection = projection.matrix() * view;
        let inverse_view_projection = view_projection.inverse()?;
        let frustum = Frustum::from_view_projection(&view_projection)?;
        Some(Self {
            eye,
            center,
            up,
            projection,
            view,
            view_projection,
            inverse_view_projection,
            frustum,
        })
    }

    /// Creates a perspective camera.
    pub fn perspective(
        eye: Vec3,
        center: Vec3,
        up: Vec3,
        fov_y_degrees: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Option<Self> {
        Self::look_at(
            eye,
            center,
            up,
            Projection::Perspective {
                fov_y_degrees,
                aspect_ratio,
                near,
                far,
            },
        )
    }

    /// Returns a copy with a new aspect ratio, for perspective cameras after a resize.
    pub fn with_aspect_ratio(&self, aspect: f32) -> Option<Self> {
        let projection = match self.projection {
            Projection::Perspective {
                fov_y_degrees,
                near,
                far,
                ..
            } => Projection::Perspective {
                fov_y_degrees,
                aspect_ratio: aspect,
                near,
                far,
            },
            ortho => ortho,
        };
        Self::look_at(self.eye, self.center, self.up, projection)
    }

    /// The camera position.
    #[inline]
    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    /// The point the camera looks at.
    #[inline]
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// The projection parameters.
    #[inline]
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// The view matrix.
    #[inline]
    pub fn view(&self) -> Mat4 {
        self.view
    }

    /// The combined view-projection matrix.
    #[inline]
    pub fn view_projection(&self) -> Mat4 {
        self.view_projection
    }

    /// The inverse of the view-projection matrix, used to reconstruct world positions from depth.
    #[inline]
    pub fn inverse_view_projection(&self) -> Mat4 {
        self.inverse_view_projection
    }

    /// The `(near, far)` plane distances.
    #[inline]
    pub fn near_far(&self) -> (f32, f32) {
        self.projection.near_far()
    }

    /// The view frustum.
    #[inline]
    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    /// Whether a world-space box is at least partially inside the frustum.
    #[inline]
    pub fn test_box_in_frustum(&self, aabb: &Aabb) -> bool {
        self.frustum.intersects_aabb(aabb)
    }

    /// Whether a world-space sphere is at least partially inside the frustum.
    #[inline]
    pub fn test_sphere_in_frustum(&self, center: Vec3, radius: f32) -> bool {
        self.frustum.intersects_sphere(center, radius)
    }
}
