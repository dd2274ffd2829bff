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
//! Texel storage backing headless textures.

use lumina_core::renderer::{ResourceError, TextureDescriptor, TextureFormat};

/// The contents of one texture, kept as `f32` channels whatever the format.
#[derive(Debug, Clone)]
pub(crate) struct TextureStorage {
    pub(crate) descriptor: TextureDescriptor<'static>,
    texels: Vec<f32>,
}

impl TextureStorage {
    /// Zero-initialized storage for `descriptor`.
    pub(crate) fn new(descriptor: TextureDescriptor<'static>) -> Self {
        let len = descriptor.width as usize
            * descriptor.height as usize
            * descriptor.format.channel_count();
        Self {
            descriptor,
            texels: vec![0.0; len],
        }
    }

    fn is_normalized(&self) -> bool {
        matches!(
            self.descriptor.format,
            TextureFormat::Rgba8Unorm | TextureFormat::R8Unorm
        )
    }

    /// Decodes `data`, laid out in the texture's format, into the storage.
    pub(crate) fn write(&mut self, data: &[u8]) -> Result<(), ResourceError> {
        let expected = self.descriptor.byte_size();
        if data.len() != expected {
            return Err(ResourceError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        if self.is_normalized() {
            for (texel, byte) in self.texels.iter_mut().zip(data) {
                *texel = *byte as f32 / 255.0;
            }
        } else {
            self.texels = bytemuck::pod_collect_to_vec(data);
        }
        Ok(())
    }

    /// Encodes the storage in the texture's format.
    pub(crate) fn read(&self) -> Vec<u8> {
        if self.is_normalized() {
            self.texels
                .iter()
                .map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
                .collect()
        } else {
            bytemuck::cast_slice(&self.texels).to_vec()
        }
    }

    /// Sets every texel to the leading channels of `value`.
    pub(crate) fn fill(&mut self, value: [f32; 4]) {
        let channels = self.descriptor.format.channel_count();
        for texel in self.texels.chunks_exact_mut(channels) {
            texel.copy_from_slice(&value[..channels]);
        }
    }

    /// Replaces the contents with those of `source`.
    ///
    /// Returns `false` and leaves the storage untouched when sizes or channel
    /// counts differ.
    pub(crate) fn copy_from(&mut self, source: &[f32], source_descriptor: &TextureDescriptor) -> bool {
        let compatible = source_descriptor.width == self.descriptor.width
            && source_descriptor.height == self.descriptor.height
            && source_descriptor.format.channel_count() == self.descriptor.format.channel_count();
        if compatible {
            self.texels.copy_from_slice(source);
        }
        compatible
    }

    pub(crate) fn texels(&self) -> &[f32] {
        &self.texels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumina_core::renderer::FilterMode;

    fn descriptor(format: TextureFormat, width: u32, height: u32) -> TextureDescriptor<'static> {
        TextureDescriptor {
            label: None,
            width,
            height,
            format,
            mag_filter: FilterMode::Nearest,
            min_filter: FilterMode::Nearest,
        }
    }

    #[test]
    fn test_normalized_formats_round_trip_bytes() {
        let mut storage = TextureStorage::new(descriptor(TextureFormat::Rgba8Unorm, 2, 1));
        let data = [0, 64, 128, 255, 10, 20, 30, 40];
        storage.write(&data).unwrap();
        assert_eq!(storage.read(), data);
    }

    #[test]
    fn test_float_formats_keep_bits() {
        let mut storage = TextureStorage::new(descriptor(TextureFormat::Rgb32Float, 1, 2));
        let floats = [1.5f32, -2.0, 1e-3, 100.0, 0.0, 7.25];
        storage.write(bytemuck::cast_slice(&floats)).unwrap();
        let back: Vec<f32> = bytemuck::pod_collect_to_vec(&storage.read());
        assert_eq!(back, floats);
    }

    #[test]
    fn test_write_rejects_wrong_size() {
        let mut storage = TextureStorage::new(descriptor(TextureFormat::R8Unorm, 4, 4));
        assert_eq!(
            storage.write(&[0; 3]),
            Err(ResourceError::SizeMismatch {
                expected: 16,
                actual: 3
            })
        );
    }

    #[test]
    fn test_fill_uses_leading_channels() {
        let mut storage = TextureStorage::new(descriptor(TextureFormat::Rgb32Float, 2, 2));
        storage.fill([0.25, 0.5, 0.75, 1.0]);
        assert_eq!(&storage.texels()[..3], &[0.25, 0.5, 0.75]);
        assert_eq!(storage.texels().len(), 12);
    }

    #[test]
    fn test_copy_requires_matching_shape() {
        let mut small = TextureStorage::new(descriptor(TextureFormat::R8Unorm, 1, 1));
        let big = TextureStorage::new(descriptor(TextureFormat::R8Unorm, 2, 2));
        assert!(!small.copy_from(big.texels(), &big.descriptor));

        let mut source = TextureStorage::new(descriptor(TextureFormat::Depth32Float, 2, 2));
        source.fill([0.5, 0.0, 0.0, 0.0]);
        let mut destination = TextureStorage::new(descriptor(TextureFormat::Depth32Float, 2, 2));
        assert!(destination.copy_from(source.texels(), &source.descriptor));
        assert!(destination.texels().iter().all(|d| *d == 0.5));
    }
}
