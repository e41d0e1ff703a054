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

//! A library of linear streaming sketches.
//!
//! Sketches summarize large data streams in a small, fixed amount of memory
//! and answer queries approximately, with explicit error guarantees. The
//! [`countmin`] module provides a Count-Min sketch for item frequency
//! estimation.
//!
//! ```rust
//! use linearsketches::countmin::CountMinSketch;
//!
//! let mut sketch = CountMinSketch::new(5, 64, 1).unwrap();
//! for item in [3, 3, 3, 9] {
//!     sketch.update(item).unwrap();
//! }
//! assert!(sketch.get_estimate(3) >= 3);
//! ```

pub mod countmin;
pub mod error;

mod common;
