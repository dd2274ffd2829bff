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

//! Prefabs: trees of nodes carrying meshes and materials.

use crate::asset::Material;
use crate::math::Mat4;
use crate::renderer::api::Mesh;
use std::sync::Arc;

/// A node of a prefab hierarchy.
#[derive(Debug, Clone)]
pub struct Node {
    /// A debug name.
    pub name: String,
    /// Invisible nodes are skipped together with their whole subtree.
    pub visible: bool,
    /// Transform relative to the parent node.
    pub local_transform: Mat4,
    /// Geometry drawn by this node.
    pub mesh: Option<Arc<Mesh>>,
    /// Material applied to the geometry.
    pub material: Option<Arc<Material>>,
    /// Child nodes.
    pub children: Vec<Node>,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            name: String::new(),
            visible: true,
            local_transform: Mat4::IDENTITY,
            mesh: None,
            material: None,
            children: Vec::new(),
        }
    }
}

impl Node {
    /// Creates an empty, visible node.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Creates a visible node drawing `mesh` with `material`.
    pub fn with_mesh(name: impl Into<String>, mesh: Arc<Mesh>, material: Arc<Material>) -> Self {
        Self {
            name: name.into(),
            mesh: Some(mesh),
            material: Some(material),
            ..Default::default()
        }
    }

    /// Sets the local transform.
    pub fn transformed(mut self, local_transform: Mat4) -> Self {
        self.local_transform = local_transform;
        self
    }

    /// Appends a child node.
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }
}

/// A reusable hierarchy of nodes, instanced by prefab entities.
#[derive(Debug, Clone)]
pub struct Prefab {
    /// A debug name.
    pub name: String,
    /// The root of the hierarchy.
    pub root: Node,
}

impl Prefab {
    /// Creates a prefab from its root node.
    pub fn new(name: impl Into<String>, root: Node) -> Self {
        Self {
            name: name.into(),
            root,
        }
    }
}
