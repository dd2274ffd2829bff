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

//! Fixed-function render state: blending, depth testing, culling and color writes.
//!
//! Stages describe the state they need as a whole [`RenderState`] value and
//! hand it to the encoder; every stage returns to [`RenderState::BASELINE`]
//! when it releases its target.

/// Factor applied to a source or destination color during blending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    /// `0.0`
    Zero,
    /// `1.0`
    One,
    /// Source alpha.
    SrcAlpha,
    /// `1.0 - source alpha`
    OneMinusSrcAlpha,
}

/// A blend equation of the form `src * src_factor + dst * dst_factor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendState {
    /// Factor applied to the incoming fragment.
    pub src_factor: BlendFactor,
    /// Factor applied to the stored color.
    pub dst_factor: BlendFactor,
}

impl BlendState {
    /// Classic translucency: `SRC_ALPHA, ONE_MINUS_SRC_ALPHA`.
    pub const ALPHA: Self = Self {
        src_factor: BlendFactor::SrcAlpha,
        dst_factor: BlendFactor::OneMinusSrcAlpha,
    };
    /// Pure accumulation: `ONE, ONE`.
    pub const ADDITIVE: Self = Self {
        src_factor: BlendFactor::One,
        dst_factor: BlendFactor::One,
    };
    /// Alpha-weighted accumulation: `SRC_ALPHA, ONE`.
    pub const ALPHA_ADDITIVE: Self = Self {
        src_factor: BlendFactor::SrcAlpha,
        dst_factor: BlendFactor::One,
    };
}

/// Comparison used by the depth test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareFunction {
    /// Passes if the fragment is nearer than the stored depth.
    Less,
    /// Passes if the fragment is nearer than or as near as the stored depth.
    LessEqual,
    /// Passes if the fragment is farther than the stored depth.
    Greater,
    /// Always passes.
    Always,
}

/// Which polygon faces are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CullMode {
    /// No culling.
    None,
    /// Discard front-facing polygons (renders the inside of closed meshes).
    Front,
    /// Discard back-facing polygons.
    Back,
}

/// Depth test and depth write configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthState {
    /// Whether fragments are tested against the depth attachment.
    pub test_enabled: bool,
    /// The comparison applied when testing is enabled.
    pub compare: CompareFunction,
    /// Whether passing fragments update the depth attachment.
    pub write_enabled: bool,
}

impl DepthState {
    /// Depth testing and writing disabled.
    pub const DISABLED: Self = Self {
        test_enabled: false,
        compare: CompareFunction::Less,
        write_enabled: false,
    };

    /// Standard opaque geometry: test `Less`, write on.
    pub const LESS_WRITE: Self = Self {
        test_enabled: true,
        compare: CompareFunction::Less,
        write_enabled: true,
    };

    /// Test with `compare` without modifying the stored depth.
    pub const fn read_only(compare: CompareFunction) -> Self {
        Self {
            test_enabled: true,
            compare,
            write_enabled: false,
        }
    }
}

/// The complete fixed-function state used for subsequent draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderState {
    /// Blending, `None` to overwrite the target.
    pub blend: Option<BlendState>,
    /// Depth test and write.
    pub depth: DepthState,
    /// Face culling.
    pub cull_mode: CullMode,
    /// Whether color attachments are written.
    pub color_writes: bool,
}

impl Default for RenderState {
    fn default() -> Self {
        Self::BASELINE
    }
}

impl RenderState {
    /// The known state every stage starts from and restores on exit:
    /// no blending, no culling, depth test off with `Less` and writes on, color writes on.
    pub const BASELINE: Self = Self {
        blend: None,
        depth: DepthState {
            test_enabled: false,
            compare: CompareFunction::Less,
            write_enabled: true,
        },
        cull_mode: CullMode::None,
        color_writes: true,
    };

    /// Full-screen composition: no depth test, no culling, the given blending.
    pub const fn fullscreen(blend: Option<BlendState>) -> Self {
        Self {
            blend,
            depth: DepthState::DISABLED,
            cull_mode: CullMode::None,
            color_writes: true,
        }
    }

    /// Returns a copy with a different blend state.
    pub const fn with_blend(mut self, blend: Option<BlendState>) -> Self {
        self.blend = blend;
        self
    }

    /// Returns a copy with a different depth state.
    pub const fn with_depth(mut self, depth: DepthState) -> Self {
        self.depth = depth;
        self
    }

    /// Returns a copy with a different cull mode.
    pub const fn with_cull_mode(mut self, cull_mode: CullMode) -> Self {
        self.cull_mode = cull_mode;
        self
    }

    /// Returns a copy with color writes toggled.
    pub const fn with_color_writes(mut self, enabled: bool) -> Self {
        self.color_writes = enabled;
        self
    }
}

/// Values used to clear the bound target; `None` leaves that aspect untouched.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClearValues {
    /// Clear color for every color attachment.
    pub color: Option<crate::math::LinearRgba>,
    /// Clear value for the depth attachment.
    pub depth: Option<f32>,
}

impl ClearValues {
    /// Clears color and resets depth to the far plane.
    pub const fn color_and_depth(color: crate::math::LinearRgba) -> Self {
        Self {
            color: Some(color),
            depth: Some(1.0),
        }
    }

    /// Resets depth to the far plane only.
    pub const DEPTH_ONLY: Self = Self {
        color: None,
        depth: Some(1.0),
    };
}
