//! Timing harness comparing the sort algorithms on random data.

use std::time::Instant;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::sort::{Algorithm, SortOptions, smart_sort};

/// Insertion sort is skipped for inputs larger than this.
pub const INSERTION_LIMIT: usize = 1000;

/// Benchmark values are drawn from `1..=VALUE_RANGE`.
const VALUE_RANGE: i64 = 1000;

/// Averages for one algorithm at one input size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmTiming {
    pub algorithm: Algorithm,
    pub avg_ms: f64,
    pub trials: usize,
    /// Every trial matched the standard library sort.
    pub verified: bool,
}

/// All timings for one input size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeReport {
    pub size: usize,
    pub timings: Vec<AlgorithmTiming>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub trials: usize,
    pub sizes: Vec<SizeReport>,
}

/// Time every algorithm on `trials` fresh random inputs per size.
pub fn benchmark(sizes: &[usize], trials: usize) -> BenchmarkReport {
    let mut rng = rand::rng();
    let mut reports = Vec::with_capacity(sizes.len());

    for &size in sizes {
        let algorithms: Vec<Algorithm> = Algorithm::ALL
            .into_iter()
            .filter(|a| *a != Algorithm::Insertion || size <= INSERTION_LIMIT)
            .collect();
        let mut totals = vec![0.0f64; algorithms.len()];
        let mut verified = vec![true; algorithms.len()];

        for _ in 0..trials {
            let data: Vec<i64> = (0..size).map(|_| rng.random_range(1..=VALUE_RANGE)).collect();
            let mut expected = data.clone();
            expected.sort();

            for (slot, algorithm) in algorithms.iter().enumerate() {
                let options = SortOptions::new().with_algorithm(*algorithm);
                let start = Instant::now();
                let result = smart_sort(&data, &options);
                totals[slot] += start.elapsed().as_secs_f64() * 1000.0;

                match result {
                    Ok(sorted) if sorted.items == expected => {}
                    Ok(_) => {
                        warn!(%algorithm, size, "Benchmark result differs from builtin sort");
                        verified[slot] = false;
                    }
                    Err(e) => {
                        warn!(%algorithm, size, error = %e, "Benchmark sort failed");
                        verified[slot] = false;
                    }
                }
            }
        }

        let timings = algorithms
            .into_iter()
            .enumerate()
            .map(|(slot, algorithm)| AlgorithmTiming {
                algorithm,
                avg_ms: if trials == 0 { 0.0 } else { totals[slot] / trials as f64 },
                trials,
                verified: verified[slot],
            })
            .collect::<Vec<_>>();

        for timing in &timings {
            info!(size, algorithm = %timing.algorithm, avg_ms = timing.avg_ms, "Benchmark");
        }
        reports.push(SizeReport { size, timings });
    }

    BenchmarkReport {
        trials,
        sizes: reports,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_benchmark_verifies_all_algorithms() {
        let report = benchmark(&[0, 25, 200], 2);
        assert_eq!(report.sizes.len(), 3);
        for size in &report.sizes {
            assert_eq!(size.timings.len(), 4);
            assert!(size.timings.iter().all(|t| t.verified && t.trials == 2));
        }
    }

    #[test]
    fn test_insertion_skipped_for_large_inputs() {
        let report = benchmark(&[INSERTION_LIMIT + 1], 1);
        let algorithms: Vec<Algorithm> = report.sizes[0]
            .timings
            .iter()
            .map(|t| t.algorithm)
            .collect();
        assert_eq!(
            algorithms,
            vec![Algorithm::Auto, Algorithm::Builtin, Algorithm::Quicksort]
        );
    }

    #[test]
    fn test_report_serializes() {
        let report = benchmark(&[5], 1);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["sizes"][0]["timings"][0]["algorithm"], "auto");
    }
}
