//! Adaptive sorting over any `PartialOrd` key.
//!
//! All algorithms sort a permutation of indices and are stable in both
//! directions: items with equal keys keep their input order.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SortError};

/// Below this many items `Auto` picks insertion sort.
pub const SMALL_INPUT: usize = 10;

/// At or above this many items `Auto` inspects presortedness.
const PRESORTED_CHECK: usize = 50;

/// Default fraction of ascending neighbours for [`is_nearly_sorted`].
pub const NEARLY_SORTED_THRESHOLD: f64 = 0.8;

/// Sorting strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Pick by input size.
    #[default]
    Auto,
    /// The standard library's stable sort.
    Builtin,
    Insertion,
    /// Three-way partitioning quicksort.
    Quicksort,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::Auto,
        Algorithm::Builtin,
        Algorithm::Insertion,
        Algorithm::Quicksort,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Builtin => "builtin",
            Self::Insertion => "insertion",
            Self::Quicksort => "quicksort",
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "builtin" | "std" | "timsort" => Ok(Self::Builtin),
            "insertion" => Ok(Self::Insertion),
            "quicksort" | "quick" => Ok(Self::Quicksort),
            _ => Err(SortError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Options for [`smart_sort`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortOptions {
    pub descending: bool,
    pub algorithm: Algorithm,
}

impl SortOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_descending(mut self, descending: bool) -> Self {
        self.descending = descending;
        self
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }
}

/// Sorted output plus the algorithm that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sorted<T> {
    pub items: Vec<T>,
    /// Never [`Algorithm::Auto`].
    pub algorithm: Algorithm,
}

// ─────────────────────────────────────────────────────────────────────────────
// Entry Points
// ─────────────────────────────────────────────────────────────────────────────

/// Sort a copy of `items` by their natural order.
///
/// Fails with [`SortError::Incomparable`] before sorting if any item is not
/// comparable with itself.
pub fn smart_sort<T>(items: &[T], options: &SortOptions) -> Result<Sorted<T>>
where
    T: PartialOrd + Clone,
{
    let (order, algorithm) = sort_order(items, options)?;
    Ok(Sorted {
        items: order.into_iter().map(|i| items[i].clone()).collect(),
        algorithm,
    })
}

/// Sort a copy of `items` by an extracted key. The key is computed once per item.
pub fn smart_sort_by_key<T, K, F>(items: &[T], options: &SortOptions, key: F) -> Result<Sorted<T>>
where
    T: Clone,
    K: PartialOrd,
    F: Fn(&T) -> K,
{
    let keys: Vec<K> = items.iter().map(key).collect();
    let (order, algorithm) = sort_order(&keys, options)?;
    Ok(Sorted {
        items: order.into_iter().map(|i| items[i].clone()).collect(),
        algorithm,
    })
}

/// Whether at least `threshold` of adjacent pairs are already ascending.
pub fn is_nearly_sorted<K: PartialOrd>(keys: &[K], threshold: f64) -> bool {
    if keys.len() < 2 {
        return true;
    }
    let ascending = keys.windows(2).filter(|pair| pair[0] <= pair[1]).count();
    ascending as f64 / (keys.len() - 1) as f64 >= threshold
}

// ─────────────────────────────────────────────────────────────────────────────
// Algorithms
// ─────────────────────────────────────────────────────────────────────────────

fn sort_order<K: PartialOrd>(keys: &[K], options: &SortOptions) -> Result<(Vec<usize>, Algorithm)> {
    if let Some(index) = keys
        .iter()
        .position(|k| k.partial_cmp(k) != Some(Ordering::Equal))
    {
        return Err(SortError::Incomparable { index });
    }

    let algorithm = resolve(keys, options.algorithm);
    let cmp = |a: usize, b: usize| {
        let (x, y) = if options.descending { (b, a) } else { (a, b) };
        keys[x].partial_cmp(&keys[y]).unwrap_or(Ordering::Equal)
    };

    let mut order: Vec<usize> = (0..keys.len()).collect();
    match algorithm {
        Algorithm::Insertion => insertion_sort(&mut order, &cmp),
        Algorithm::Quicksort => order = quicksort(order, &cmp),
        Algorithm::Builtin | Algorithm::Auto => order.sort_by(|&a, &b| cmp(a, b)),
    }

    debug!(
        len = keys.len(),
        %algorithm,
        descending = options.descending,
        "Sorted"
    );
    Ok((order, algorithm))
}

fn resolve<K: PartialOrd>(keys: &[K], requested: Algorithm) -> Algorithm {
    match requested {
        Algorithm::Auto if keys.len() < SMALL_INPUT => Algorithm::Insertion,
        Algorithm::Auto => {
            if keys.len() >= PRESORTED_CHECK {
                let nearly = is_nearly_sorted(keys, NEARLY_SORTED_THRESHOLD);
                debug!(len = keys.len(), nearly_sorted = nearly, "Inspected input order");
            }
            Algorithm::Builtin
        }
        other => other,
    }
}

fn insertion_sort<F>(order: &mut [usize], cmp: &F)
where
    F: Fn(usize, usize) -> Ordering,
{
    for i in 1..order.len() {
        let current = order[i];
        let mut j = i;
        while j > 0 && cmp(order[j - 1], current) == Ordering::Greater {
            order[j] = order[j - 1];
            j -= 1;
        }
        order[j] = current;
    }
}

fn quicksort<F>(order: Vec<usize>, cmp: &F) -> Vec<usize>
where
    F: Fn(usize, usize) -> Ordering,
{
    if order.len() <= 1 {
        return order;
    }

    let pivot = order[order.len() / 2];
    let mut less = Vec::new();
    let mut equal = Vec::new();
    let mut greater = Vec::new();
    for index in order {
        match cmp(index, pivot) {
            Ordering::Less => less.push(index),
            Ordering::Equal => equal.push(index),
            Ordering::Greater => greater.push(index),
        }
    }

    let mut sorted = quicksort(less, cmp);
    sorted.extend(equal);
    sorted.extend(quicksort(greater, cmp));
    sorted
}
