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

//! Backend-agnostic rendering API.
//!
//! - **[`resource`]**: texture and render-target handles and descriptors.
//! - **[`state`]**: blend, depth, cull and clear state.
//! - **[`uniform`]**: values bound to named program uniforms.
//! - **[`program`]**: names of the programs the pipeline requests.
//! - **[`mesh`]**: CPU mesh data and built-in primitives.
//! - **[`settings`]**: runtime toggles.

pub mod mesh;
pub mod program;
pub mod resource;
pub mod settings;
pub mod state;
pub mod uniform;

pub use self::mesh::Mesh;
pub use self::resource::*;
pub use self::settings::{PipelineMode, RenderMode, RenderSettings};
pub use self::state::*;
pub use self::uniform::UniformValue;
