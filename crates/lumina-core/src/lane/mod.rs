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

//! # Lane Abstraction
//!
//! A **Lane** is one processing strategy driven by an agent. In the renderer
//! every pass of the frame (collection, shadows, G-buffer, lighting...) is a
//! lane; the render agent runs them in order and reports per-lane timings
//! keyed by [`Lane::strategy_name`].

use std::fmt;

/// Classification of lane types, used for routing and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaneKind {
    /// Extraction of draw data from the scene.
    Extract,
    /// Shadow map generation.
    Shadow,
    /// Geometry rasterization (forward or G-buffer).
    Render,
    /// Screen-space lighting and indirect illumination.
    Lighting,
    /// Composition on top of the lit image.
    PostProcess,
    /// Debug visualizations.
    Debug,
}

impl fmt::Display for LaneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaneKind::Extract => write!(f, "Extract"),
            LaneKind::Shadow => write!(f, "Shadow"),
            LaneKind::Render => write!(f, "Render"),
            LaneKind::Lighting => write!(f, "Lighting"),
            LaneKind::PostProcess => write!(f, "PostProcess"),
            LaneKind::Debug => write!(f, "Debug"),
        }
    }
}

/// The common interface shared by all lanes.
pub trait Lane: Send + Sync {
    /// A stable, human-readable name for this strategy.
    fn strategy_name(&self) -> &'static str;

    /// The kind of work this lane performs.
    fn lane_kind(&self) -> LaneKind;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe;

    impl Lane for Probe {
        fn strategy_name(&self) -> &'static str {
            "Probe"
        }

        fn lane_kind(&self) -> LaneKind {
            LaneKind::Debug
        }
    }

    #[test]
    fn test_lane_identity() {
        let lane: Box<dyn Lane> = Box::new(Probe);
        assert_eq!(lane.strategy_name(), "Probe");
        assert_eq!(lane.lane_kind().to_string(), "Debug");
    }
}
