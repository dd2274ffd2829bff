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
//! Indirect diffuse lighting from a grid of baked SH probes.
//!
//! Probes are baked on demand by rendering a cubemap around each of them
//! ([`CubemapProbeBaker`]), projected to 9 SH coefficients and uploaded as a
//! texture. Every frame, [`IrradianceVolume::render_reconstruction`] looks up
//! the 8 probes around each G-buffer pixel and adds their irradiance.

mod baker;
mod grid;
mod volume;

pub use baker::*;
pub use grid::*;
pub use volume::*;
