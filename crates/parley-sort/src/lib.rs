//! Adaptive comparison sorting for Parley.
//!
//! [`smart_sort`] picks an algorithm from the input size unless one is
//! requested, sorts stably in either direction, and reports which algorithm
//! ran. Keys only need `PartialOrd`; keys that are not comparable with
//! themselves are rejected up front.
//!
//! ```
//! use parley_sort::{Algorithm, SortOptions, smart_sort};
//!
//! let sorted = smart_sort(&[64, 34, 25, 12], &SortOptions::new().with_descending(true))?;
//! assert_eq!(sorted.items, vec![64, 34, 25, 12]);
//! assert_eq!(sorted.algorithm, Algorithm::Insertion);
//! # Ok::<(), parley_sort::SortError>(())
//! ```

mod benchmark;
mod error;
mod sort;

pub use benchmark::{AlgorithmTiming, BenchmarkReport, INSERTION_LIMIT, SizeReport, benchmark};
pub use error::{Result, SortError};
pub use sort::{
    Algorithm, NEARLY_SORTED_THRESHOLD, SMALL_INPUT, SortOptions, Sorted, is_nearly_sorted,
    smart_sort, smart_sort_by_key,
};
