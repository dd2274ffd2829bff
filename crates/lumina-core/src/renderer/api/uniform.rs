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

//! Values bound to named program uniforms.

use super::resource::TextureId;
use crate::math::{LinearRgba, Mat4, Vec2, Vec3, Vec4};

/// A value bound to a named uniform of the active program.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    /// A boolean flag.
    Bool(bool),
    /// A signed integer.
    Int(i32),
    /// A float.
    Float(f32),
    /// A two-component vector.
    Vec2(Vec2),
    /// A three-component vector.
    Vec3(Vec3),
    /// A four-component vector.
    Vec4(Vec4),
    /// A 4x4 matrix.
    Mat4(Mat4),
    /// An array of integers.
    IntArray(Vec<i32>),
    /// An array of floats.
    FloatArray(Vec<f32>),
    /// An array of three-component vectors.
    Vec3Array(Vec<Vec3>),
    /// A texture bound to the sampler of that name.
    Texture(TextureId),
}

impl UniformValue {
    /// Returns the contained float, if this is a `Float`.
    pub fn as_float(&self) -> Option<f32> {
        match self {
            UniformValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the contained vector, if this is a `Vec3`.
    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            UniformValue::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the contained integer, if this is an `Int`.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            UniformValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the contained texture, if this is a `Texture`.
    pub fn as_texture(&self) -> Option<TextureId> {
        match self {
            UniformValue::Texture(t) => Some(*t),
            _ => None,
        }
    }
}

macro_rules! impl_from_uniform {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$ty> for UniformValue {
                fn from(value: $ty) -> Self {
                    UniformValue::$variant(value)
                }
            }
        )+
    };
}

impl_from_uniform!(
    bool => Bool,
    i32 => Int,
    f32 => Float,
    Vec2 => Vec2,
    Vec3 => Vec3,
    Vec4 => Vec4,
    Mat4 => Mat4,
    Vec<i32> => IntArray,
    Vec<f32> => FloatArray,
    Vec<Vec3> => Vec3Array,
    TextureId => Texture,
);

impl From<LinearRgba> for UniformValue {
    fn from(value: LinearRgba) -> Self {
        UniformValue::Vec4(value.to_vec4())
    }
}
