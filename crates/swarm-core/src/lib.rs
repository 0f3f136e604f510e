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

//! # Swarm Core
//!
//! Foundational crate of the Swarm GPU stress test. It holds the backend-agnostic
//! pieces: math primitives, procedural geometry, instance synthesis, the benchmark
//! policy, configuration, and the renderer contracts (`GraphicsDevice`,
//! `RenderSystem`) that concrete backends implement.

#![warn(missing_docs)]

pub mod benchmark;
pub mod config;
pub mod event;
pub mod geometry;
pub mod instancing;
pub mod math;
pub mod renderer;
pub mod utils;

pub use config::BenchmarkConfig;
pub use utils::timer::Stopwatch;
