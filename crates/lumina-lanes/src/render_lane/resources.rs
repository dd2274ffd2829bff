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

//! Resources shared by every lane: fallback textures and built-in meshes.

use lumina_core::renderer::{
    FilterMode, GraphicsDevice, Mesh, ResourceError, TextureDescriptor, TextureFormat, TextureId,
};
use std::borrow::Cow;

/// Latitude and longitude subdivisions of the light-volume sphere.
const SPHERE_RINGS: u32 = 16;
const SPHERE_SECTORS: u32 = 24;

/// Fallback textures and primitives created once per pipeline.
#[derive(Debug)]
pub struct SharedResources {
    /// A 1×1 opaque white texture.
    pub white_texture: TextureId,
    /// A 1×1 opaque black texture.
    pub black_texture: TextureId,
    /// A quad covering clip space, for full-screen passes.
    pub quad: Mesh,
    /// A cube spanning [-1, 1], for decal boxes.
    pub cube: Mesh,
    /// A sphere of radius 1, for light volumes and probe markers.
    pub sphere: Mesh,
}

impl SharedResources {
    /// Creates the fallback textures on `device` and builds the primitives.
    ///
    /// # Errors
    /// * `ResourceError` - If a texture cannot be created or filled.
    pub fn new(device: &dyn GraphicsDevice) -> Result<Self, ResourceError> {
        let white_texture = create_solid_texture(device, "white", [255, 255, 255, 255])?;
        let black_texture = create_solid_texture(device, "black", [0, 0, 0, 255])?;

        Ok(Self {
            white_texture,
            black_texture,
            quad: Mesh::fullscreen_quad(),
            cube: Mesh::unit_cube(),
            sphere: Mesh::unit_sphere(SPHERE_RINGS, SPHERE_SECTORS),
        })
    }

    /// Releases the textures owned by these resources.
    pub fn destroy(&self, device: &dyn GraphicsDevice) {
        for id in [self.white_texture, self.black_texture] {
            if let Err(e) = device.destroy_texture(id) {
                log::warn!("SharedResources: failed to destroy {:?}: {}", id, e);
            }
        }
    }
}

fn create_solid_texture(
    device: &dyn GraphicsDevice,
    name: &'static str,
    texel: [u8; 4],
) -> Result<TextureId, ResourceError> {
    let id = device.create_texture(&TextureDescriptor {
        label: Some(Cow::Borrowed(name)),
        width: 1,
        height: 1,
        format: TextureFormat::Rgba8Unorm,
        mag_filter: FilterMode::Nearest,
        min_filter: FilterMode::Nearest,
    })?;
    device.write_texture(id, &texel)?;
    Ok(id)
}
