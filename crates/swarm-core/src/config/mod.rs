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

//! Benchmark configuration, read once when the surface is created.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{MAX_SPHERE_SEGMENTS, MIN_SPHERE_SEGMENTS};

/// Smallest accepted instance count.
pub const MIN_INSTANCE_COUNT: u32 = 10_000;
/// Largest accepted instance count.
pub const MAX_INSTANCE_COUNT: u32 = 500_000;
/// Instance count used when none is configured.
pub const DEFAULT_INSTANCE_COUNT: u32 = 100_000;
/// Default benchmark window.
pub const DEFAULT_SAMPLE_WINDOW_MS: u64 = 5_000;
/// Default sphere tessellation.
pub const DEFAULT_SPHERE_SEGMENTS: u32 = 16;
/// Default sphere radius.
pub const DEFAULT_SPHERE_RADIUS: f32 = 0.2;
/// Default live FPS reporting interval.
pub const DEFAULT_FPS_REPORT_INTERVAL_MS: u64 = 1_000;

/// Errors raised while loading or saving a [`BenchmarkConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid RON for a config.
    #[error("failed to parse config: {0}")]
    Parse(String),
    /// The config could not be encoded.
    #[error("failed to serialize config: {0}")]
    Serialize(String),
}

/// Tunables of a benchmark session.
///
/// Missing fields take their defaults when deserialized. Values are not
/// validated on load; call [`BenchmarkConfig::sanitized`] before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Number of sphere instances, clamped to `[10_000, 500_000]`.
    pub instance_count: u32,
    /// Benchmark window in milliseconds, at least 1.
    pub sample_window_ms: u64,
    /// Sphere tessellation, clamped to `[3, 255]`.
    pub sphere_segments: u32,
    /// Sphere radius; non-positive values fall back to the default.
    pub sphere_radius: f32,
    /// Start a benchmark run as soon as the surface exists.
    pub auto_start_benchmark: bool,
    /// Interval between live FPS reports in milliseconds, at least 1.
    pub fps_report_interval_ms: u64,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            instance_count: DEFAULT_INSTANCE_COUNT,
            sample_window_ms: DEFAULT_SAMPLE_WINDOW_MS,
            sphere_segments: DEFAULT_SPHERE_SEGMENTS,
            sphere_radius: DEFAULT_SPHERE_RADIUS,
            auto_start_benchmark: true,
            fps_report_interval_ms: DEFAULT_FPS_REPORT_INTERVAL_MS,
        }
    }
}

impl BenchmarkConfig {
    /// Returns a copy with every field forced into its valid range.
    /// Each corrected field is logged at `warn`.
    pub fn sanitized(&self) -> Self {
        let mut out = self.clone();

        let instances = self
            .instance_count
            .clamp(MIN_INSTANCE_COUNT, MAX_INSTANCE_COUNT);
        if instances != self.instance_count {
            log::warn!(
                "instance_count {} out of range, clamped to {instances}",
                self.instance_count
            );
            out.instance_count = instances;
        }

        if self.sample_window_ms == 0 {
            log::warn!("sample_window_ms must be at least 1, using 1");
            out.sample_window_ms = 1;
        }

        let segments = self
            .sphere_segments
            .clamp(MIN_SPHERE_SEGMENTS, MAX_SPHERE_SEGMENTS);
        if segments != self.sphere_segments {
            log::warn!(
                "sphere_segments {} out of range, clamped to {segments}",
                self.sphere_segments
            );
            out.sphere_segments = segments;
        }

        // `!(r > 0)` also rejects NaN.
        if !(self.sphere_radius > 0.0) || !self.sphere_radius.is_finite() {
            log::warn!(
                "sphere_radius {} is not positive, using {DEFAULT_SPHERE_RADIUS}",
                self.sphere_radius
            );
            out.sphere_radius = DEFAULT_SPHERE_RADIUS;
        }

        if self.fps_report_interval_ms == 0 {
            log::warn!("fps_report_interval_ms must be at least 1, using 1");
            out.fps_report_interval_ms = 1;
        }

        out
    }

    /// The benchmark window as a [`Duration`].
    pub fn sample_window(&self) -> Duration {
        Duration::from_millis(self.sample_window_ms)
    }

    /// The live FPS interval as a [`Duration`].
    pub fn fps_report_interval(&self) -> Duration {
        Duration::from_millis(self.fps_report_interval_ms)
    }

    /// Parses a config from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        ron::de::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Encodes the config as pretty-printed RON.
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::default().indentor("  ".to_string());
        ron::ser::to_string_pretty(self, pretty).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Reads a RON config file.
    ///
    /// ## Arguments
    /// * `path` - Location of the `.ron` file.
    ///
    /// ## Returns
    /// The parsed config, unsanitized.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_ron_str(&text)?;
        log::info!("Loaded benchmark config from {}", path.display());
        Ok(config)
    }

    /// Writes the config as RON, replacing any existing file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_ron_string()?)?;
        log::info!("Saved benchmark config to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn defaults() {
        let config = BenchmarkConfig::default();
        assert_eq!(config.instance_count, 100_000);
        assert_eq!(config.sample_window(), Duration::from_secs(5));
        assert_eq!(config.sphere_segments, 16);
        assert_relative_eq!(config.sphere_radius, 0.2);
        assert!(config.auto_start_benchmark);
        assert_eq!(config.fps_report_interval(), Duration::from_secs(1));
        assert_eq!(config.sanitized(), config);
    }

    #[test]
    fn sanitize_clamps_out_of_range_values() {
        let config = BenchmarkConfig {
            instance_count: 5,
            sample_window_ms: 0,
            sphere_segments: 1000,
            sphere_radius: -1.0,
            auto_start_benchmark: false,
            fps_report_interval_ms: 0,
        }
        .sanitized();

        assert_eq!(config.instance_count, MIN_INSTANCE_COUNT);
        assert_eq!(config.sample_window_ms, 1);
        assert_eq!(config.sphere_segments, MAX_SPHERE_SEGMENTS);
        assert_relative_eq!(config.sphere_radius, DEFAULT_SPHERE_RADIUS);
        assert!(!config.auto_start_benchmark);
        assert_eq!(config.fps_report_interval_ms, 1);
    }

    #[test]
    fn sanitize_upper_instance_bound_and_low_segments() {
        let config = BenchmarkConfig {
            instance_count: 2_000_000,
            sphere_segments: 2,
            sphere_radius: f32::NAN,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(config.instance_count, MAX_INSTANCE_COUNT);
        assert_eq!(config.sphere_segments, MIN_SPHERE_SEGMENTS);
        assert_relative_eq!(config.sphere_radius, DEFAULT_SPHERE_RADIUS);
    }

    #[test]
    fn partial_ron_uses_defaults_for_missing_fields() {
        let config = BenchmarkConfig::from_ron_str("(instance_count: 250000)").unwrap();
        assert_eq!(config.instance_count, 250_000);
        assert_eq!(config.sample_window_ms, DEFAULT_SAMPLE_WINDOW_MS);
        assert_eq!(config.sphere_segments, DEFAULT_SPHERE_SEGMENTS);
    }

    #[test]
    fn malformed_ron_is_a_parse_error() {
        let err = BenchmarkConfig::from_ron_str("(instance_count: \"many\")").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "got {err:?}");
    }

    #[test]
    fn save_then_load_through_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.ron");
        let config = BenchmarkConfig {
            instance_count: 42_000,
            sphere_segments: 24,
            auto_start_benchmark: false,
            ..Default::default()
        };

        config.save_to_file(&path).unwrap();
        let loaded = BenchmarkConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn error_messages_name_the_failing_step() {
        let parse = BenchmarkConfig::from_ron_str("(").unwrap_err();
        assert!(parse.to_string().starts_with("failed to parse config"));
        let encode = ConfigError::Serialize("unsupported value".to_string());
        assert_eq!(encode.to_string(), "failed to serialize config: unsupported value");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = BenchmarkConfig::load_from_file(dir.path().join("absent.ron")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
        assert!(err.to_string().starts_with("config I/O error"));
    }
}
