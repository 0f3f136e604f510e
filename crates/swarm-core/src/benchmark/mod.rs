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

//! Frame-rate measurement and the performance rating policy.
//!
//! The render thread only ever touches [`FrameCounters`], a handful of atomics.
//! Everything that interprets those counters ([`BenchmarkController`],
//! [`FpsCounter`]) runs on the host timer side and works from snapshots, so
//! measuring never blocks or borrows anything the render thread owns.

mod controller;
mod counters;
mod fps_counter;
mod rating;

pub use self::controller::{BenchmarkController, BenchmarkReport, BenchmarkSample, BenchmarkState};
pub use self::counters::{CounterSnapshot, FrameCounters};
pub use self::fps_counter::{live_fps_text, FpsCounter};
pub use self::rating::PerformanceRating;
