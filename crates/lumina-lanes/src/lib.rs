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

//! The rendering stages of the Lumina frame pipeline.
//!
//! Each pass of a frame is a lane: a small, stateless or lightly stateful
//! strategy that records commands into a [`CommandEncoder`] for one stage.
//! Lanes never own the frame; the render agent owns targets, flags and
//! ordering and hands each lane a [`FrameContext`] for the duration of a frame.
//!
//! [`CommandEncoder`]: lumina_core::renderer::CommandEncoder
//! [`FrameContext`]: render_lane::FrameContext

#![warn(missing_docs)]

pub mod render_lane;
