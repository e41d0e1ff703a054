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

//! Counter table storage for count-based sketches.

use std::fmt;

use crate::common::SplitMix64;
use crate::error::Error;
use crate::error::ErrorKind;

/// Fixed-shape grid of signed counters plus the running stream weight.
///
/// Rows are hash functions, columns are buckets. The grid is stored
/// row-major and its shape never changes after construction. The seed is
/// kept here because every derived hash parameter must be reproducible
/// from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountingTable {
    num_hashes: u8,
    num_buckets: u32,
    seed: u64,
    counters: Vec<i64>,
    total_weight: i64,
}

impl CountingTable {
    pub fn new(num_hashes: u8, num_buckets: u32, seed: u64) -> Result<Self, Error> {
        if num_hashes == 0 {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                "num_hashes must be at least 1",
            ));
        }
        if num_buckets == 0 {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                "num_buckets must be at least 1",
            ));
        }
        let num_cells = num_hashes as usize * num_buckets as usize;
        Ok(Self {
            num_hashes,
            num_buckets,
            seed,
            counters: vec![0; num_cells],
            total_weight: 0,
        })
    }

    pub fn num_hashes(&self) -> u8 {
        self.num_hashes
    }

    pub fn num_buckets(&self) -> u32 {
        self.num_buckets
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn shape(&self) -> (u8, u32) {
        (self.num_hashes, self.num_buckets)
    }

    pub fn total_weight(&self) -> i64 {
        self.total_weight
    }

    pub fn add_weight(&mut self, weight: i64) {
        self.total_weight += weight;
    }

    pub fn cell(&self, row: usize, col: usize) -> i64 {
        self.counters[row * self.num_buckets as usize + col]
    }

    pub fn add_to_cell(&mut self, row: usize, col: usize, weight: i64) {
        self.counters[row * self.num_buckets as usize + col] += weight;
    }

    /// Returns a deep copy of the grid, one inner vector per row.
    pub fn snapshot(&self) -> Vec<Vec<i64>> {
        self.counters
            .chunks(self.num_buckets as usize)
            .map(|row| row.to_vec())
            .collect()
    }

    /// Draws `count` uniform integers in `[lower, upper]` from a generator
    /// seeded with this table's seed.
    ///
    /// The draw sequence depends only on the seed, so repeated calls and
    /// tables built with the same seed produce identical output.
    pub fn derive_uniform_ints(&self, count: usize, lower: u64, upper: u64) -> Vec<u64> {
        let mut rng = SplitMix64::seeded(self.seed);
        (0..count).map(|_| rng.next_in_range(lower, upper)).collect()
    }

    /// Adds another table's counters and stream weight into this one.
    ///
    /// Callers must have already checked that both tables share the same
    /// shape and seed.
    pub fn merge_from(&mut self, other: &CountingTable) {
        for (cell, other_cell) in self.counters.iter_mut().zip(&other.counters) {
            *cell += *other_cell;
        }
        self.total_weight += other.total_weight;
    }
}

impl fmt::Display for CountingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.counters.chunks(self.num_buckets as usize) {
            let line = row
                .iter()
                .map(|cell| cell.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_zero_initializes_all_cells() {
        let table = CountingTable::new(3, 7, 42).unwrap();
        assert_eq!(table.shape(), (3, 7));
        assert_eq!(table.seed(), 42);
        assert_eq!(table.total_weight(), 0);
        for row in 0..3 {
            for col in 0..7 {
                assert_eq!(table.cell(row, col), 0);
            }
        }
    }

    #[test]
    fn test_new_rejects_zero_hashes() {
        let err = CountingTable::new(0, 7, 42).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.message(), "num_hashes must be at least 1");
    }

    #[test]
    fn test_new_rejects_zero_buckets() {
        let err = CountingTable::new(3, 0, 42).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.message(), "num_buckets must be at least 1");
    }

    #[test]
    fn test_cells_are_row_major() {
        let mut table = CountingTable::new(2, 3, 0).unwrap();
        table.add_to_cell(0, 2, 5);
        table.add_to_cell(1, 0, 7);
        let rows = table.snapshot();
        assert_eq!(rows, vec![vec![0, 0, 5], vec![7, 0, 0]]);
    }

    #[test]
    fn test_add_to_cell_accumulates_signed_weight() {
        let mut table = CountingTable::new(1, 2, 0).unwrap();
        table.add_to_cell(0, 1, 5);
        table.add_to_cell(0, 1, -2);
        assert_eq!(table.cell(0, 1), 3);
    }

    #[test]
    fn test_snapshot_is_a_deep_copy() {
        let mut table = CountingTable::new(1, 2, 0).unwrap();
        let before = table.snapshot();
        table.add_to_cell(0, 0, 9);
        assert_eq!(before, vec![vec![0, 0]]);
        assert_eq!(table.snapshot(), vec![vec![9, 0]]);
    }

    #[test]
    fn test_derive_uniform_ints_is_repeatable() {
        let table = CountingTable::new(2, 5, 1234).unwrap();
        let first = table.derive_uniform_ints(8, 0, 1000);
        let second = table.derive_uniform_ints(8, 0, 1000);
        assert_eq!(first, second);
        assert!(first.iter().all(|&x| x <= 1000));

        let same_seed = CountingTable::new(7, 99, 1234).unwrap();
        assert_eq!(same_seed.derive_uniform_ints(8, 0, 1000), first);
    }

    #[test]
    fn test_derive_uniform_ints_depends_on_seed() {
        let table_a = CountingTable::new(2, 5, 1).unwrap();
        let table_b = CountingTable::new(2, 5, 2).unwrap();
        assert_ne!(
            table_a.derive_uniform_ints(8, 0, u64::MAX - 1),
            table_b.derive_uniform_ints(8, 0, u64::MAX - 1)
        );
    }

    #[test]
    fn test_merge_from_adds_counters_and_weight() {
        let mut left = CountingTable::new(2, 2, 0).unwrap();
        left.add_to_cell(0, 0, 1);
        left.add_to_cell(1, 1, 2);
        left.add_weight(3);

        let mut right = CountingTable::new(2, 2, 0).unwrap();
        right.add_to_cell(0, 0, 10);
        right.add_to_cell(1, 0, 20);
        right.add_weight(30);

        left.merge_from(&right);
        assert_eq!(left.snapshot(), vec![vec![11, 0], vec![20, 2]]);
        assert_eq!(left.total_weight(), 33);
        // The source table is untouched.
        assert_eq!(right.snapshot(), vec![vec![10, 0], vec![20, 0]]);
        assert_eq!(right.total_weight(), 30);
    }

    #[test]
    fn test_display_writes_one_line_per_row() {
        let mut table = CountingTable::new(2, 3, 0).unwrap();
        table.add_to_cell(0, 0, 1);
        table.add_to_cell(0, 1, 2);
        table.add_to_cell(0, 2, 3);
        table.add_to_cell(1, 0, -4);
        assert_eq!(table.to_string(), "1 2 3\n-4 0 0\n");
    }
}
