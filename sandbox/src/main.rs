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


// Swarm Sandbox
// Opens a window, renders the sphere swarm and prints the benchmark rating.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use swarm_sdk::{BenchmarkConfig, Engine};

/// Instanced sphere GPU stress test.
#[derive(Debug, Parser)]
#[command(name = "sandbox", version, about)]
struct Cli {
    /// RON file to start from; flags below override its fields.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Number of sphere instances (10000..=500000).
    #[arg(short, long)]
    instances: Option<u32>,

    /// Benchmark window in milliseconds.
    #[arg(short, long, value_name = "MS")]
    window_ms: Option<u64>,

    /// Sphere tessellation (3..=255).
    #[arg(short, long)]
    segments: Option<u32>,

    /// Sphere radius.
    #[arg(short, long)]
    radius: Option<f32>,

    /// Live FPS reporting interval in milliseconds.
    #[arg(long, value_name = "MS")]
    fps_interval_ms: Option<u64>,

    /// Do not start a benchmark run when the window opens.
    #[arg(long)]
    no_auto_start: bool,

    /// Write the effective config to this file and exit.
    #[arg(long, value_name = "PATH")]
    dump_config: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> Result<(BenchmarkConfig, Option<PathBuf>)> {
        let mut config = match &self.config {
            Some(path) => BenchmarkConfig::load_from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => BenchmarkConfig::default(),
        };

        if let Some(instances) = self.instances {
            config.instance_count = instances;
        }
        if let Some(window_ms) = self.window_ms {
            config.sample_window_ms = window_ms;
        }
        if let Some(segments) = self.segments {
            config.sphere_segments = segments;
        }
        if let Some(radius) = self.radius {
            config.sphere_radius = radius;
        }
        if let Some(interval) = self.fps_interval_ms {
            config.fps_report_interval_ms = interval;
        }
        if self.no_auto_start {
            config.auto_start_benchmark = false;
        }
        Ok((config, self.dump_config))
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .filter_module("wgpu_core", log::LevelFilter::Warn)
        .filter_module("wgpu_hal", log::LevelFilter::Error)
        .filter_module("naga", log::LevelFilter::Warn)
        .init();

    let (config, dump_path) = Cli::parse().into_config()?;

    if let Some(path) = dump_path {
        config.sanitized().save_to_file(&path)?;
        return Ok(());
    }

    log::info!(
        "Starting swarm: {} instances, {} segments, {} ms window",
        config.instance_count,
        config.sphere_segments,
        config.sample_window_ms
    );
    Engine::run(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from(["sandbox", "-i", "250000", "--segments", "8", "--no-auto-start"]);
        let (config, dump) = cli.into_config().unwrap();
        assert_eq!(config.instance_count, 250_000);
        assert_eq!(config.sphere_segments, 8);
        assert!(!config.auto_start_benchmark);
        assert_eq!(config.sample_window_ms, BenchmarkConfig::default().sample_window_ms);
        assert!(dump.is_none());
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let cli = Cli::parse_from(["sandbox", "--config", "/nonexistent/swarm.ron"]);
        let err = cli.into_config().unwrap_err();
        assert!(err.to_string().contains("loading"));
    }
}
