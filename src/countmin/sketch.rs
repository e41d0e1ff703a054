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

use std::fmt;

use crate::countmin::table::CountingTable;
use crate::error::Error;
use crate::error::ErrorKind;

/// Modulus of the bucket hash family: the Mersenne prime 2^61 - 1. Large
/// enough that `(a * item + b) mod P mod num_buckets` is unbiased for any
/// `u32` bucket count, and small enough that the product fits in u128.
const HASH_PRIME: u64 = (1u64 << 61) - 1;

/// A Count-Min sketch for approximate frequency estimation.
///
/// Tracks how often each nonnegative 64-bit item appears in a stream using
/// a fixed grid of counters:
/// - Estimates never undercount the true frequency
/// - The overcount stays below `epsilon * total_weight` with probability at
///   least `1 - delta`, where `epsilon = e / num_buckets` and
///   `delta = exp(-num_hashes)`
/// - Space usage is fixed at construction
///
/// Update weights may be negative, which compensates earlier insertions of
/// the same item; the items themselves must be nonnegative.
///
/// Two sketches can be merged only if they agree on `num_hashes`,
/// `num_buckets`, and `seed`, because only then do they hash items to the
/// same cells.
#[derive(Debug, Clone)]
pub struct CountMinSketch {
    table: CountingTable,
    hash_a: Vec<u64>,
    hash_b: Vec<u64>,
    epsilon: f64,
    delta: f64,
}

impl CountMinSketch {
    /// Creates a sketch with `num_hashes` rows of `num_buckets` counters.
    ///
    /// The per-row hash parameters are derived deterministically from
    /// `seed`, so sketches built with the same configuration hash items
    /// identically on every platform.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument)
    /// if `num_hashes` or `num_buckets` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use linearsketches::countmin::CountMinSketch;
    ///
    /// let sketch = CountMinSketch::new(3, 32, 9001).unwrap();
    /// assert!(sketch.is_empty());
    /// ```
    pub fn new(num_hashes: u8, num_buckets: u32, seed: u64) -> Result<Self, Error> {
        let table = CountingTable::new(num_hashes, num_buckets, seed)?;
        // One block of draws: the first num_hashes values are the
        // multipliers, the remaining num_hashes values are the offsets.
        let draws = table.derive_uniform_ints(2 * num_hashes as usize, 0, HASH_PRIME - 1);
        let (hash_a, hash_b) = draws.split_at(num_hashes as usize);
        Ok(Self {
            table,
            hash_a: hash_a.to_vec(),
            hash_b: hash_b.to_vec(),
            epsilon: std::f64::consts::E / num_buckets as f64,
            delta: (-(num_hashes as f64)).exp(),
        })
    }

    /// Updates the sketch with a weight of one.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument)
    /// if `item` is negative.
    pub fn update(&mut self, item: i64) -> Result<(), Error> {
        self.update_with_weight(item, 1)
    }

    /// Updates the sketch with an item and weight.
    ///
    /// Negative weights are accepted and subtract from the item's counters,
    /// which compensates earlier insertions. On error the sketch is
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument)
    /// if `item` is negative.
    pub fn update_with_weight(&mut self, item: i64, weight: i64) -> Result<(), Error> {
        if item < 0 {
            return Err(
                Error::new(ErrorKind::InvalidArgument, "item must be nonnegative")
                    .with_context("item", item),
            );
        }
        for row in 0..self.hash_a.len() {
            let col = self.bucket_index(row, item);
            self.table.add_to_cell(row, col, weight);
        }
        self.table.add_weight(weight);
        Ok(())
    }

    /// Returns the estimated frequency for an item.
    ///
    /// The estimate is the minimum over all rows of the item's counter, so
    /// it never undercounts a stream of nonnegative weights.
    pub fn get_estimate(&self, item: i64) -> i64 {
        let mut min_count = i64::MAX;
        for row in 0..self.hash_a.len() {
            let col = self.bucket_index(row, item);
            min_count = min_count.min(self.table.cell(row, col));
        }
        min_count
    }

    /// Returns the upper bound for an item's frequency.
    pub fn get_upper_bound(&self, item: i64) -> i64 {
        self.get_estimate(item)
    }

    /// Returns the lower bound for an item's frequency.
    pub fn get_lower_bound(&self, item: i64) -> i64 {
        self.get_estimate(item) - (self.epsilon * self.table.total_weight() as f64) as i64
    }

    /// Returns the number of hash functions (rows).
    pub fn get_num_hashes(&self) -> u8 {
        self.table.num_hashes()
    }

    /// Returns the number of buckets per row (columns).
    pub fn get_num_buckets(&self) -> u32 {
        self.table.num_buckets()
    }

    /// Returns the seed the hash parameters were derived from.
    pub fn get_seed(&self) -> u64 {
        self.table.seed()
    }

    /// Returns the relative error bound, `e / num_buckets`.
    pub fn get_epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Returns the error probability, `exp(-num_hashes)`.
    pub fn get_delta(&self) -> f64 {
        self.delta
    }

    /// Returns the full configuration as `(num_hashes, num_buckets, seed)`.
    ///
    /// Two sketches can be merged exactly when their configurations are
    /// equal.
    pub fn get_config(&self) -> (u8, u32, u64) {
        (
            self.table.num_hashes(),
            self.table.num_buckets(),
            self.table.seed(),
        )
    }

    /// Returns the counter grid shape as `(num_hashes, num_buckets)`.
    pub fn get_table_shape(&self) -> (u8, u32) {
        self.table.shape()
    }

    /// Returns a deep copy of the counter grid, one inner vector per row.
    pub fn get_table(&self) -> Vec<Vec<i64>> {
        self.table.snapshot()
    }

    /// Returns the total weight of the stream.
    pub fn get_total_weight(&self) -> i64 {
        self.table.total_weight()
    }

    /// Returns true if no weight has been retained by the sketch.
    pub fn is_empty(&self) -> bool {
        self.table.total_weight() == 0
    }

    /// Merges another sketch into this one.
    ///
    /// Merging adds the other sketch's counters and stream weight cell by
    /// cell, so the result estimates the concatenation of both streams. On
    /// error this sketch is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument)
    /// if the sketches differ in `num_hashes`, `num_buckets`, or `seed`.
    ///
    /// # Examples
    ///
    /// ```
    /// use linearsketches::countmin::CountMinSketch;
    ///
    /// let mut left = CountMinSketch::new(3, 32, 9001).unwrap();
    /// let mut right = CountMinSketch::new(3, 32, 9001).unwrap();
    ///
    /// left.update(1).unwrap();
    /// right.update_with_weight(2, 4).unwrap();
    ///
    /// left.merge(&right).unwrap();
    /// assert_eq!(left.get_total_weight(), 5);
    /// assert!(left.get_estimate(2) >= 4);
    /// ```
    pub fn merge(&mut self, other: &Self) -> Result<(), Error> {
        if self.get_config() != other.get_config() {
            return Err(
                Error::new(ErrorKind::InvalidArgument, "incompatible sketch config")
                    .with_context("expected", format!("{:?}", self.get_config()))
                    .with_context("got", format!("{:?}", other.get_config())),
            );
        }
        self.table.merge_from(&other.table);
        Ok(())
    }

    /// Suggests the number of buckets for a target relative error.
    ///
    /// Formula: `ceil(e / relative_error)`. Estimates overcount by at most
    /// `relative_error * total_weight`, with probability depending on the
    /// number of hashes.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument)
    /// if `relative_error` is negative.
    ///
    /// # Examples
    ///
    /// ```
    /// use linearsketches::countmin::CountMinSketch;
    ///
    /// assert_eq!(CountMinSketch::suggest_num_buckets(0.1).unwrap(), 28);
    /// assert_eq!(CountMinSketch::suggest_num_buckets(0.01).unwrap(), 272);
    /// ```
    pub fn suggest_num_buckets(relative_error: f64) -> Result<u32, Error> {
        if relative_error < 0.0 {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                "relative_error must be nonnegative",
            )
            .with_context("relative_error", relative_error));
        }
        Ok((std::f64::consts::E / relative_error).ceil() as u32)
    }

    /// Suggests the number of hashes for a target confidence level.
    ///
    /// Formula: `ceil(ln(1 / (1 - confidence)))`. The estimate error bound
    /// holds with probability at least `confidence`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument)
    /// if `confidence` is outside `[0.0, 1.0]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use linearsketches::countmin::CountMinSketch;
    ///
    /// // Two-sided normal coverage at 1, 2, and 3 standard deviations.
    /// assert_eq!(CountMinSketch::suggest_num_hashes(0.682689492).unwrap(), 2);
    /// assert_eq!(CountMinSketch::suggest_num_hashes(0.954499736).unwrap(), 4);
    /// assert_eq!(CountMinSketch::suggest_num_hashes(0.997300204).unwrap(), 6);
    /// ```
    pub fn suggest_num_hashes(confidence: f64) -> Result<u8, Error> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                "confidence must be between 0.0 and 1.0 (inclusive)",
            )
            .with_context("confidence", confidence));
        }
        Ok((1.0 / (1.0 - confidence)).ln().ceil() as u8)
    }

    /// Selects the bucket (column) for an item in the given row.
    ///
    /// `h = ((a * item + b) mod P) mod num_buckets`, computed in 128-bit
    /// arithmetic so the product is exact for any parameter and item.
    fn bucket_index(&self, row: usize, item: i64) -> usize {
        let a = u128::from(self.hash_a[row]);
        let b = u128::from(self.hash_b[row]);
        let x = u128::from(item as u64);
        let hashed = (a * x + b) % u128::from(HASH_PRIME);
        (hashed % u128::from(self.table.num_buckets())) as usize
    }
}

impl fmt::Display for CountMinSketch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_parameters_split_into_a_then_b() {
        let sketch = CountMinSketch::new(3, 10, 77).unwrap();
        let reference = CountingTable::new(3, 10, 77)
            .unwrap()
            .derive_uniform_ints(6, 0, HASH_PRIME - 1);
        assert_eq!(sketch.hash_a, reference[..3]);
        assert_eq!(sketch.hash_b, reference[3..]);
        assert!(sketch.hash_a.iter().all(|&a| a < HASH_PRIME));
        assert!(sketch.hash_b.iter().all(|&b| b < HASH_PRIME));
    }

    #[test]
    fn test_hash_parameters_are_reproducible() {
        let first = CountMinSketch::new(4, 16, 9001).unwrap();
        let second = CountMinSketch::new(4, 16, 9001).unwrap();
        assert_eq!(first.hash_a, second.hash_a);
        assert_eq!(first.hash_b, second.hash_b);

        let other_seed = CountMinSketch::new(4, 16, 9002).unwrap();
        assert_ne!(
            (first.hash_a, first.hash_b),
            (other_seed.hash_a, other_seed.hash_b)
        );
    }

    #[test]
    fn test_epsilon_and_delta_derive_from_shape() {
        let sketch = CountMinSketch::new(2, 5, 1).unwrap();
        assert_eq!(sketch.get_epsilon(), std::f64::consts::E / 5.0);
        assert_eq!(sketch.get_delta(), (-2.0f64).exp());
    }

    #[test]
    fn test_bucket_index_stays_in_range() {
        let sketch = CountMinSketch::new(4, 9, 3).unwrap();
        for item in [0, 1, 5, 1 << 40, i64::MAX] {
            for row in 0..4 {
                assert!(sketch.bucket_index(row, item) < 9);
            }
        }
    }

    #[test]
    fn test_update_rejects_negative_item_without_mutation() {
        let mut sketch = CountMinSketch::new(2, 5, 1).unwrap();
        let before = sketch.get_table();

        let err = sketch.update_with_weight(-5, 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.message(), "item must be nonnegative");

        assert_eq!(sketch.get_table(), before);
        assert_eq!(sketch.get_total_weight(), 0);
    }

    #[test]
    fn test_estimate_accepts_negative_items() {
        let sketch = CountMinSketch::new(2, 5, 1).unwrap();
        assert_eq!(sketch.get_estimate(-3), 0);
    }

    #[test]
    fn test_display_renders_the_counter_grid() {
        let sketch = CountMinSketch::new(2, 3, 1).unwrap();
        assert_eq!(sketch.to_string(), "0 0 0\n0 0 0\n");
    }
}
