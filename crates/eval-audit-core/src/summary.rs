//! Per-system aggregate statistics
//!
//! Reduces the full case collection to one summary per system: arithmetic
//! mean score (fatal entries included, no weighting) and fatal count.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::aggregate::EvaluationCase;

/// Aggregate statistics for one system across all cases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSummary {
    /// System-under-test identifier
    pub system_name: String,
    /// Simple arithmetic mean of the system's scores across all cases
    pub mean_score: f64,
    /// Number of cases where the system's result is fatal
    pub fatal_count: usize,
    /// Number of occurrences the mean is taken over
    pub case_count: usize,
}

/// Summarize every system appearing in any case's results, in result
/// order. Systems with zero occurrences are absent from the output rather
/// than producing an undefined mean.
#[must_use]
pub fn summarize(cases: &[EvaluationCase]) -> Vec<SystemSummary> {
    let mut order: Vec<String> = Vec::new();
    let mut tallies: HashMap<String, (f64, usize, usize)> = HashMap::new();

    for case in cases {
        for result in &case.results {
            if !tallies.contains_key(&result.system_name) {
                order.push(result.system_name.clone());
            }
            let entry = tallies
                .entry(result.system_name.clone())
                .or_insert((0.0, 0, 0));
            entry.0 += result.score;
            if result.is_fatal {
                entry.1 += 1;
            }
            entry.2 += 1;
        }
    }

    order
        .into_iter()
        .filter_map(|name| {
            let &(sum, fatal_count, case_count) = tallies.get(&name)?;
            if case_count == 0 {
                return None;
            }
            Some(SystemSummary {
                system_name: name,
                mean_score: sum / case_count as f64,
                fatal_count,
                case_count,
            })
        })
        .collect()
}
