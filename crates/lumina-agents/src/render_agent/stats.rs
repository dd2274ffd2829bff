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
//! Per-frame statistics.

use std::time::Duration;

/// What a frame drew and how long recording each stage took.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStats {
    /// Render calls that survived culling.
    pub render_calls: usize,
    /// Lights that affect the view.
    pub lights: usize,
    /// Decals that affect the view.
    pub decals: usize,
    /// Shadow maps re-rendered this frame.
    pub shadow_maps_refreshed: usize,
    /// Probes baked this frame.
    pub probes_baked: usize,
    /// Full-screen lighting passes, ambient-only pass included.
    pub fullscreen_light_passes: usize,
    /// Point and spot light volumes.
    pub light_volume_passes: usize,
    /// CPU time per lane, in execution order.
    pub lane_timings: Vec<(&'static str, Duration)>,
    /// CPU time of the whole frame.
    pub frame_time: Duration,
}

impl FrameStats {
    /// Appends the timing of a lane.
    pub fn record(&mut self, lane: &'static str, elapsed: Duration) {
        self.lane_timings.push((lane, elapsed));
    }

    /// The time spent in `lane`, if it ran.
    pub fn lane_time(&self, lane: &str) -> Option<Duration> {
        self.lane_timings
            .iter()
            .find(|(name, _)| *name == lane)
            .map(|(_, elapsed)| *elapsed)
    }

    /// Names of the lanes that ran, in order.
    pub fn lanes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.lane_timings.iter().map(|(name, _)| *name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_time_lookup() {
        let mut stats = FrameStats::default();
        stats.record("GBuffer", Duration::from_millis(2));
        stats.record("Present", Duration::from_micros(40));
        assert_eq!(stats.lane_time("GBuffer"), Some(Duration::from_millis(2)));
        assert_eq!(stats.lane_time("Ssao"), None);
        assert_eq!(stats.lanes().collect::<Vec<_>>(), vec!["GBuffer", "Present"]);
    }
}
