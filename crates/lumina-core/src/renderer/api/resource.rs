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

//! GPU resource handles and their descriptors.

use std::borrow::Cow;

/// An opaque handle to a texture owned by a [`GraphicsDevice`](crate::renderer::traits::GraphicsDevice).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub usize);

/// An opaque handle to a render target (a set of attachments bound together).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderTargetId(pub usize);

/// An opaque handle to a finished, not yet submitted, command buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandBufferId(pub usize);

/// Pixel formats understood by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// Four 8-bit normalized channels.
    Rgba8Unorm,
    /// One 8-bit normalized channel.
    R8Unorm,
    /// Three 32-bit float channels.
    Rgb32Float,
    /// Four 32-bit float channels.
    Rgba32Float,
    /// A single 32-bit float depth channel.
    Depth32Float,
}

impl TextureFormat {
    /// Number of channels per texel.
    pub fn channel_count(&self) -> usize {
        match self {
            TextureFormat::Rgba8Unorm | TextureFormat::Rgba32Float => 4,
            TextureFormat::Rgb32Float => 3,
            TextureFormat::R8Unorm | TextureFormat::Depth32Float => 1,
        }
    }

    /// Size in bytes of one channel.
    pub fn bytes_per_channel(&self) -> usize {
        match self {
            TextureFormat::Rgba8Unorm | TextureFormat::R8Unorm => 1,
            _ => 4,
        }
    }

    /// Size in bytes of one texel.
    pub fn bytes_per_pixel(&self) -> usize {
        self.channel_count() * self.bytes_per_channel()
    }

    /// Whether the format stores depth.
    pub fn is_depth(&self) -> bool {
        matches!(self, TextureFormat::Depth32Float)
    }
}

/// Texture sampling filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    /// Nearest texel, no interpolation.
    Nearest,
    /// Bilinear interpolation.
    #[default]
    Linear,
}

/// Describes a texture to be created.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureDescriptor<'a> {
    /// A debug label for the texture.
    pub label: Option<Cow<'a, str>>,
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Pixel format.
    pub format: TextureFormat,
    /// Magnification filter.
    pub mag_filter: FilterMode,
    /// Minification filter.
    pub min_filter: FilterMode,
}

impl TextureDescriptor<'_> {
    /// Number of bytes a full upload or readback of this texture occupies.
    pub fn byte_size(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel()
    }
}

/// Describes a render target: color attachments plus an optional depth attachment.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTargetDescriptor<'a> {
    /// A debug label for the target.
    pub label: Option<Cow<'a, str>>,
    /// Width of every attachment.
    pub width: u32,
    /// Height of every attachment.
    pub height: u32,
    /// One color attachment is created per entry.
    pub color_formats: Vec<TextureFormat>,
    /// Whether a `Depth32Float` attachment is created.
    pub with_depth: bool,
}

/// A created render target and the textures backing its attachments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderTarget {
    /// The handle used to bind the target.
    pub id: RenderTargetId,
    /// Color attachments, in descriptor order.
    pub color_textures: Vec<TextureId>,
    /// Depth attachment, if requested.
    pub depth_texture: Option<TextureId>,
    /// Width of every attachment.
    pub width: u32,
    /// Height of every attachment.
    pub height: u32,
}

impl RenderTarget {
    /// A viewport covering the whole target.
    pub fn viewport(&self) -> Viewport {
        Viewport::new(0, 0, self.width, self.height)
    }

    /// The reciprocal of the target size, as consumed by full-screen shaders.
    pub fn inverse_resolution(&self) -> crate::math::Vec2 {
        crate::math::Vec2::new(1.0 / self.width.max(1) as f32, 1.0 / self.height.max(1) as f32)
    }

    /// The color attachment at `index`, if present.
    pub fn color(&self, index: usize) -> Option<TextureId> {
        self.color_textures.get(index).copied()
    }
}

/// A rectangle of the bound target that draws are mapped to, origin at the bottom-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Viewport {
    /// Left edge in pixels.
    pub x: u32,
    /// Bottom edge in pixels.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Viewport {
    /// Creates a new viewport.
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}
