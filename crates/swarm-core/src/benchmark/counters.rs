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

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Frame counters shared between the render thread (writer) and the host
/// timer (reader).
#[derive(Debug, Default)]
pub struct FrameCounters {
    total_frames: AtomicU64,
    benchmark_frames: AtomicU64,
    benchmark_active: AtomicBool,
}

/// A point-in-time copy of [`FrameCounters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// Frames rendered since the counters were created.
    pub total_frames: u64,
    /// Frames rendered since the current benchmark run started.
    pub benchmark_frames: u64,
    /// Whether a benchmark run is counting.
    pub benchmark_active: bool,
}

impl FrameCounters {
    /// Fresh counters, all zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Called by the render thread after every submitted frame.
    #[inline]
    pub fn record_frame(&self) {
        self.total_frames.fetch_add(1, Ordering::Relaxed);
        if self.benchmark_active.load(Ordering::Acquire) {
            self.benchmark_frames.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Resets the benchmark counter and starts counting.
    pub fn begin_benchmark(&self) {
        self.benchmark_frames.store(0, Ordering::Relaxed);
        self.benchmark_active.store(true, Ordering::Release);
    }

    /// Stops counting and returns the frames counted since [`FrameCounters::begin_benchmark`].
    pub fn end_benchmark(&self) -> u64 {
        self.benchmark_active.store(false, Ordering::Release);
        self.benchmark_frames.load(Ordering::Relaxed)
    }

    /// Reads all counters.
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            total_frames: self.total_frames.load(Ordering::Relaxed),
            benchmark_frames: self.benchmark_frames.load(Ordering::Relaxed),
            benchmark_active: self.benchmark_active.load(Ordering::Acquire),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn benchmark_frames_only_count_while_active() {
        let counters = FrameCounters::new();
        counters.record_frame();
        counters.begin_benchmark();
        counters.record_frame();
        counters.record_frame();
        assert_eq!(counters.end_benchmark(), 2);
        counters.record_frame();

        let snap = counters.snapshot();
        assert_eq!(snap.total_frames, 4);
        assert_eq!(snap.benchmark_frames, 2);
        assert!(!snap.benchmark_active);
    }

    #[test]
    fn begin_resets_previous_run() {
        let counters = FrameCounters::new();
        counters.begin_benchmark();
        counters.record_frame();
        counters.end_benchmark();
        counters.begin_benchmark();
        assert_eq!(counters.snapshot().benchmark_frames, 0);
    }

    #[test]
    fn concurrent_writer_and_reader() {
        let counters = Arc::new(FrameCounters::new());
        let writer = {
            let counters = Arc::clone(&counters);
            thread::spawn(move || {
                for _ in 0..10_000 {
                    counters.record_frame();
                }
            })
        };
        let mut last = 0;
        for _ in 0..100 {
            let now = counters.snapshot().total_frames;
            assert!(now >= last, "counter went backwards");
            last = now;
        }
        writer.join().unwrap();
        assert_eq!(counters.snapshot().total_frames, 10_000);
    }
}
