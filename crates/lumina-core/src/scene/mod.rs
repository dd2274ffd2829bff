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

//! The scene consumed by the frame pipeline.
//!
//! The renderer only reads the scene. Entities are stored in insertion order
//! and addressed by [`EntityId`].

mod entity;
mod prefab;

pub use self::entity::{Decal, DecalTextureType, Entity, EntityId, EntityKind};
pub use self::prefab::{Node, Prefab};

use crate::math::{LinearRgba, Vec3};
use crate::renderer::api::TextureId;

/// An ordered set of entities plus global lighting parameters.
#[derive(Debug, Clone)]
pub struct Scene {
    entities: Vec<Entity>,
    /// Ambient light applied once per pixel.
    pub ambient_light: Vec3,
    /// Color the illumination and capture targets are cleared to.
    pub background_color: LinearRgba,
    /// Environment texture drawn by the forward pass as a skybox.
    pub environment: Option<TextureId>,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
            ambient_light: Vec3::ZERO,
            background_color: LinearRgba::BLACK,
            environment: None,
        }
    }
}

impl Scene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entity and returns its id.
    pub fn add_entity(&mut self, entity: Entity) -> EntityId {
        self.entities.push(entity);
        EntityId(self.entities.len() - 1)
    }

    /// Returns an entity by id.
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.0)
    }

    /// Returns a mutable entity by id.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id.0)
    }

    /// Iterates over entities with their ids, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities.iter().enumerate().map(|(i, e)| (EntityId(i), e))
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the scene has no entities.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
