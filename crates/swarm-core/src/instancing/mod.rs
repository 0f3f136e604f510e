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

//! Synthetic per-instance animation data.
//!
//! Every instance gets a random base position inside a 200-unit cube and three
//! animation scalars. The records are uploaded once and never read back; all
//! motion is computed on the GPU from these values plus a global time.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::Range;

/// Half extent of the cube that base positions are drawn from.
pub const POSITION_EXTENT: f32 = 100.0;
/// Range of the translation speed multiplier.
pub const SPEED_RANGE: Range<f32> = 0.1..0.5;
/// Range of the spin speed multiplier.
pub const ROTATION_SPEED_RANGE: Range<f32> = 0.5..1.5;
/// Range of the per-instance phase offset.
pub const PHASE_OFFSET_RANGE: Range<f32> = 0.0..10.0;

/// GPU-side layout of one instance: `[x, y, z]` then `[speed, rotation_speed, phase_offset]`.
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct InstanceRecord {
    /// Resting position the animation orbits around.
    pub base_position: [f32; 3],
    /// Packed `[speed, rotation_speed, phase_offset]`.
    pub params: [f32; 3],
}

impl InstanceRecord {
    /// Size in bytes of one record in the instance buffer.
    pub const STRIDE: u64 = std::mem::size_of::<Self>() as u64;
    /// Byte offset of [`InstanceRecord::params`] inside a record.
    pub const PARAMS_OFFSET: u64 = 12;

    /// Translation speed multiplier.
    #[inline]
    pub fn speed(&self) -> f32 {
        self.params[0]
    }

    /// Spin speed around the Y-axis.
    #[inline]
    pub fn rotation_speed(&self) -> f32 {
        self.params[1]
    }

    /// Phase offset decorrelating this instance from its neighbours.
    #[inline]
    pub fn phase_offset(&self) -> f32 {
        self.params[2]
    }
}

/// A fixed-size collection of instance records, generated at surface creation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstanceSet {
    records: Vec<InstanceRecord>,
}

impl InstanceSet {
    /// Number of instances.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the set holds no instance.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The records, in upload order.
    #[inline]
    pub fn records(&self) -> &[InstanceRecord] {
        &self.records
    }

    /// The packed instance buffer contents.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.records)
    }
}

/// Generates [`InstanceSet`]s from a uniform random source.
///
/// [`InstanceSynthesizer::new`] seeds from OS entropy so every session looks
/// different. Tests inject a fixed seed through [`InstanceSynthesizer::from_seed`].
#[derive(Debug)]
pub struct InstanceSynthesizer<R: Rng = StdRng> {
    rng: R,
}

impl InstanceSynthesizer<StdRng> {
    /// Creates a synthesizer seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a reproducible synthesizer.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for InstanceSynthesizer<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> InstanceSynthesizer<R> {
    /// Wraps an arbitrary random source.
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Generates `count` independent records.
    pub fn generate(&mut self, count: usize) -> InstanceSet {
        let records: Vec<InstanceRecord> = (0..count).map(|_| self.next_record()).collect();
        log::info!(
            "Synthesized {} instances ({} bytes)",
            records.len(),
            records.len() as u64 * InstanceRecord::STRIDE
        );
        InstanceSet { records }
    }

    fn next_record(&mut self) -> InstanceRecord {
        let extent = 2.0 * POSITION_EXTENT;
        let base_position = [
            (self.rng.gen::<f32>() - 0.5) * extent,
            (self.rng.gen::<f32>() - 0.5) * extent,
            (self.rng.gen::<f32>() - 0.5) * extent,
        ];
        let params = [
            lerp(SPEED_RANGE, self.rng.gen()),
            lerp(ROTATION_SPEED_RANGE, self.rng.gen()),
            lerp(PHASE_OFFSET_RANGE, self.rng.gen()),
        ];
        InstanceRecord {
            base_position,
            params,
        }
    }
}

#[inline]
fn lerp(range: Range<f32>, t: f32) -> f32 {
    range.start + t * (range.end - range.start)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_in_bounds(record: &InstanceRecord) {
        for c in record.base_position {
            assert!((-POSITION_EXTENT..=POSITION_EXTENT).contains(&c), "{c}");
        }
        assert!((0.1..=0.5).contains(&record.speed()));
        assert!((0.5..=1.5).contains(&record.rotation_speed()));
        assert!((0.0..=10.0).contains(&record.phase_offset()));
    }

    #[test]
    fn record_layout_is_24_bytes() {
        assert_eq!(InstanceRecord::STRIDE, 24);
        assert_eq!(std::mem::offset_of!(InstanceRecord, params) as u64, InstanceRecord::PARAMS_OFFSET);
    }

    #[test]
    fn generates_exact_count_within_bounds() {
        let mut synth = InstanceSynthesizer::from_seed(7);
        for count in [10_000usize, 100_000] {
            let set = synth.generate(count);
            assert_eq!(set.len(), count);
            set.records().iter().for_each(assert_in_bounds);
            assert_eq!(set.as_bytes().len(), count * 24);
        }
    }

    #[test]
    fn upper_bound_count() {
        let set = InstanceSynthesizer::from_seed(1).generate(500_000);
        assert_eq!(set.len(), 500_000);
        set.records().iter().for_each(assert_in_bounds);
    }

    #[test]
    fn same_seed_is_reproducible() {
        let a = InstanceSynthesizer::from_seed(42).generate(64);
        let b = InstanceSynthesizer::from_seed(42).generate(64);
        let c = InstanceSynthesizer::from_seed(43).generate(64);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn samples_spread_over_the_ranges() {
        let set = InstanceSynthesizer::from_seed(3).generate(10_000);
        let mean_x: f32 =
            set.records().iter().map(|r| r.base_position[0]).sum::<f32>() / set.len() as f32;
        let min_speed = set.records().iter().map(|r| r.speed()).fold(f32::MAX, f32::min);
        let max_speed = set.records().iter().map(|r| r.speed()).fold(f32::MIN, f32::max);
        assert!(mean_x.abs() < 5.0, "mean x = {mean_x}");
        assert!(min_speed < 0.11 && max_speed > 0.49);
    }

    #[test]
    fn bytes_match_record_fields() {
        let set = InstanceSynthesizer::from_seed(9).generate(2);
        let floats: &[f32] = bytemuck::cast_slice(set.as_bytes());
        let second = set.records()[1];
        assert_eq!(&floats[6..9], &second.base_position);
        assert_eq!(&floats[9..12], &second.params);
    }
}
