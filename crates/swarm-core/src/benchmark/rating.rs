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

use std::fmt;

/// Qualitative bucket for an average frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PerformanceRating {
    /// Below 10 FPS.
    Poor,
    /// 10 FPS and above.
    BelowAverage,
    /// 20 FPS and above.
    Average,
    /// 30 FPS and above.
    Good,
    /// 45 FPS and above.
    Excellent,
    /// 60 FPS and above.
    Outstanding,
}

impl PerformanceRating {
    /// Lower FPS bound of each rating, best first.
    const THRESHOLDS: [(f32, PerformanceRating); 5] = [
        (60.0, PerformanceRating::Outstanding),
        (45.0, PerformanceRating::Excellent),
        (30.0, PerformanceRating::Good),
        (20.0, PerformanceRating::Average),
        (10.0, PerformanceRating::BelowAverage),
    ];

    /// Maps an average FPS to its rating. Bounds are inclusive.
    pub fn from_fps(fps: f32) -> Self {
        Self::THRESHOLDS
            .iter()
            .find(|(min, _)| fps >= *min)
            .map(|(_, rating)| *rating)
            .unwrap_or(PerformanceRating::Poor)
    }

    /// Human-readable label shown to the user.
    pub fn label(&self) -> &'static str {
        match self {
            PerformanceRating::Outstanding => "Outstanding",
            PerformanceRating::Excellent => "Excellent",
            PerformanceRating::Good => "Good",
            PerformanceRating::Average => "Average",
            PerformanceRating::BelowAverage => "Below Average",
            PerformanceRating::Poor => "Poor",
        }
    }
}

impl fmt::Display for PerformanceRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_scenarios() {
        assert_eq!(PerformanceRating::from_fps(60.0).label(), "Outstanding");
        assert_eq!(PerformanceRating::from_fps(59.9).label(), "Excellent");
        assert_eq!(PerformanceRating::from_fps(45.0).label(), "Excellent");
        assert_eq!(PerformanceRating::from_fps(29.9).label(), "Average");
        assert_eq!(PerformanceRating::from_fps(9.9).label(), "Poor");
    }

    #[test]
    fn every_bucket_reachable() {
        let cases = [
            (144.0, PerformanceRating::Outstanding),
            (50.0, PerformanceRating::Excellent),
            (30.0, PerformanceRating::Good),
            (20.0, PerformanceRating::Average),
            (19.99, PerformanceRating::BelowAverage),
            (10.0, PerformanceRating::BelowAverage),
            (0.0, PerformanceRating::Poor),
        ];
        for (fps, expected) in cases {
            assert_eq!(PerformanceRating::from_fps(fps), expected, "fps = {fps}");
        }
    }

    #[test]
    fn nan_is_poor() {
        assert_eq!(PerformanceRating::from_fps(f32::NAN), PerformanceRating::Poor);
    }

    #[test]
    fn ordering_follows_quality() {
        assert!(PerformanceRating::Outstanding > PerformanceRating::Good);
        assert!(PerformanceRating::Poor < PerformanceRating::BelowAverage);
        assert_eq!(PerformanceRating::BelowAverage.to_string(), "Below Average");
    }
}
