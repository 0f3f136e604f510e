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

//! # Swarm SDK
//!
//! The benchmark engine and its desktop host. [`BenchEngine`] holds the
//! render-thread lifecycle, [`StatsMonitor`] the timer-side statistics, and
//! [`Engine::run`] wires both to a `winit` window with a `wgpu` surface.

mod app;
pub mod engine;
pub mod monitor;
pub mod render_queue;
pub mod timer;

pub use engine::BenchEngine;
pub use monitor::StatsMonitor;
pub use render_queue::{RenderOp, RenderOpQueue};
pub use swarm_core::BenchmarkConfig;
pub use timer::RepeatingTimer;

use anyhow::{anyhow, Result};
use winit::event_loop::{ControlFlow, EventLoop};

/// The public entry point of the benchmark host.
pub struct Engine;

impl Engine {
    /// Opens a window and runs the benchmark until the window is closed.
    ///
    /// Blocks the calling thread, which becomes the render thread.
    ///
    /// ## Errors
    /// Event loop failures, and any fatal rendering error (an unsupported
    /// adapter, a shader that fails to build) that ended the run.
    pub fn run(config: BenchmarkConfig) -> Result<()> {
        log::info!("Swarm SDK: Starting...");
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = app::SwarmApp::new(config);
        event_loop.run_app(&mut app)?;

        match app.fatal_error() {
            Some(message) => Err(anyhow!("rendering abandoned: {message}")),
            None => Ok(()),
        }
    }
}
