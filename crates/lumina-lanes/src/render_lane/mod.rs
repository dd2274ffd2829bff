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

//! Rendering lane - every pass of the frame pipeline

use lumina_core::{renderer::Camera, scene::Scene};

mod binding;
mod collect_lane;
mod debug_lane;
pub mod deferred;
mod forward_lane;
pub mod irradiance;
mod pass;
mod present_lane;
mod resources;
mod shadow_pass_lane;
mod targets;
mod volumetric_lane;
mod world;

pub use binding::*;
pub use collect_lane::*;
pub use debug_lane::*;
pub use forward_lane::*;
pub use pass::*;
pub use present_lane::*;
pub use resources::*;
pub use shadow_pass_lane::*;
pub use targets::*;
pub use volumetric_lane::*;
pub use world::*;

/// Everything a lane reads while recording the commands of one view.
///
/// The main view, every probe-capture face and every shadow camera build
/// their own context; lanes never keep references past the call.
#[derive(Clone, Copy)]
pub struct FrameContext<'a> {
    /// The scene being rendered.
    pub scene: &'a Scene,
    /// The camera of this view.
    pub camera: &'a Camera,
    /// The draw calls, lights and decals collected for this view.
    pub world: &'a RenderWorld,
    /// Default textures and built-in meshes.
    pub resources: &'a SharedResources,
    /// Shadow maps of the shadow-casting lights, looked up by entity.
    pub shadow_maps: &'a ShadowMaps,
}
