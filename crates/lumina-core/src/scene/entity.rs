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

//! Scene entities as a tagged union over prefabs, lights and decals.

use super::prefab::Prefab;
use crate::math::Mat4;
use crate::renderer::api::TextureId;
use crate::renderer::light::Light;
use std::sync::Arc;

/// Index of an entity within its [`Scene`](super::Scene).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub usize);

/// How the fragment stage interprets a decal texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DecalTextureType {
    /// The texture replaces surface albedo only.
    #[default]
    Albedo,
    /// The texture carries albedo and material data.
    Full,
}

impl DecalTextureType {
    /// The value bound to `u_decal_texture_type`.
    pub fn shader_code(&self) -> i32 {
        match self {
            DecalTextureType::Albedo => 0,
            DecalTextureType::Full => 1,
        }
    }
}

/// A texture projected onto the surfaces inside a unit cube.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Decal {
    /// The projected texture; decals without one project plain white.
    pub texture: Option<TextureId>,
    /// Interpretation of the texture.
    pub texture_type: DecalTextureType,
}

/// What an entity is.
#[derive(Debug, Clone)]
pub enum EntityKind {
    /// An instance of a prefab hierarchy.
    Prefab(Arc<Prefab>),
    /// A light source.
    Light(Light),
    /// A projected decal.
    Decal(Decal),
}

/// An object placed in the scene.
#[derive(Debug, Clone)]
pub struct Entity {
    /// A debug name.
    pub name: String,
    /// Invisible entities are ignored by every pass.
    pub visible: bool,
    /// World transform.
    pub transform: Mat4,
    /// Payload.
    pub kind: EntityKind,
}

impl Entity {
    /// Creates a visible entity.
    pub fn new(name: impl Into<String>, transform: Mat4, kind: EntityKind) -> Self {
        Self {
            name: name.into(),
            visible: true,
            transform,
            kind,
        }
    }

    /// Creates a visible prefab instance.
    pub fn prefab(name: impl Into<String>, transform: Mat4, prefab: Arc<Prefab>) -> Self {
        Self::new(name, transform, EntityKind::Prefab(prefab))
    }

    /// Creates a visible light.
    pub fn light(name: impl Into<String>, transform: Mat4, light: Light) -> Self {
        Self::new(name, transform, EntityKind::Light(light))
    }

    /// Creates a visible decal.
    pub fn decal(name: impl Into<String>, transform: Mat4, decal: Decal) -> Self {
        Self::new(name, transform, EntityKind::Decal(decal))
    }
}
