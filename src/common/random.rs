// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Shared random utilities for sketches.

/// Splitmix-based random generator for deterministic parameter derivation.
///
/// The output sequence is a pure function of the seed and is stable across
/// platforms and releases. Sketches rebuilt from the same seed must hash
/// identically, so this generator accepts every seed value, including zero.
#[derive(Debug, Clone, Copy)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    /// Creates a new generator using the provided seed.
    pub fn seeded(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Returns the next random 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    /// Returns a uniformly distributed value in `[lower, upper]`, both ends
    /// included.
    ///
    /// Out-of-range raw draws are rejected and redrawn, so every value in
    /// the range is selected with equal probability.
    pub fn next_in_range(&mut self, lower: u64, upper: u64) -> u64 {
        debug_assert!(lower <= upper, "empty range");
        // A span of 0 means the range covers all of u64.
        let span = upper.wrapping_sub(lower).wrapping_add(1);
        if span == 0 {
            return self.next_u64();
        }
        // Largest draw below the last (possibly partial) multiple of span.
        let rem = (u64::MAX % span + 1) % span;
        let max_accepted = u64::MAX - rem;
        loop {
            let x = self.next_u64();
            if x <= max_accepted {
                return lower + x % span;
            }
        }
    }
}
