//! # Querybench Comparator
//!
//! The unbiased judge of the benchmark: it takes the measurements the runner
//! produced, relates every strategy's memory cost to the cheapest one, and
//! fixes a deterministic display order. It is a pure, stateless calculation
//! with no knowledge of the store or the runner.

use core_types::Measurement;
use serde::Serialize;

pub mod error;

pub use error::CompareError;

/// One strategy's metrics together with its memory cost relative to the
/// cheapest strategy in the set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedMeasurement {
    pub measurement: Measurement,
    /// `memory / min(memory)`, both clamped at zero. The cheapest strategy
    /// reads 1.0.
    pub memory_ratio: f64,
}

/// The comparator's output, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Sorted ascending by query count, then by clamped memory delta. That is
    /// a total order, so equal inputs always render identically.
    pub entries: Vec<RankedMeasurement>,
    /// The divisor the ratios were computed against.
    pub baseline_bytes: i64,
    /// True when every measurement reported zero (or negative) memory delta
    /// and 1 byte was substituted as the divisor. Ratios are then formal
    /// rather than meaningful, and the rendering layer should say so.
    pub baseline_substituted: bool,
}

/// Ranks a set of measurements.
///
/// Fails with [`CompareError::EmptyInput`] when given nothing to compare. A
/// minimum memory delta of exactly zero would make every ratio a division by
/// zero, so 1 byte is substituted and flagged instead.
pub fn compare(measurements: &[Measurement]) -> Result<Report, CompareError> {
    if measurements.is_empty() {
        return Err(CompareError::EmptyInput);
    }

    let min_bytes = measurements
        .iter()
        .map(Measurement::comparable_memory_bytes)
        .min()
        .unwrap_or(0);

    let baseline_substituted = min_bytes == 0;
    let baseline_bytes = if baseline_substituted { 1 } else { min_bytes };

    let mut entries: Vec<RankedMeasurement> = measurements
        .iter()
        .map(|m| RankedMeasurement {
            measurement: m.clone(),
            memory_ratio: m.comparable_memory_bytes() as f64 / baseline_bytes as f64,
        })
        .collect();

    entries.sort_by(|a, b| {
        a.measurement
            .query_count
            .cmp(&b.measurement.query_count)
            .then_with(|| {
                a.measurement
                    .comparable_memory_bytes()
                    .cmp(&b.measurement.comparable_memory_bytes())
            })
    });

    tracing::debug!(
        entries = entries.len(),
        baseline_bytes,
        baseline_substituted,
        "measurements ranked"
    );

    Ok(Report {
        entries,
        baseline_bytes,
        baseline_substituted,
    })
}

/// Convenience for callers that only need the winner.
pub fn best(report: &Report) -> Option<&RankedMeasurement> {
    report.entries.first()
}
