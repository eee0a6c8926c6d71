//! Case aggregation
//!
//! Turns the normalized row sequence into one `EvaluationCase` per case id,
//! each carrying one `SystemResult` per system observed anywhere in the
//! table. The system set is computed once over the whole table (not per
//! case) so every case's result sequence has identical length and ordering;
//! the presentation layer depends on that for column alignment.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::loader::Row;

/// Raw response recorded when a system has no row for a case
pub const MISSING_RESPONSE: &str = "[missing data for this system]";
/// Audit reasoning recorded when a system has no row for a case
pub const MISSING_REASONING: &str = "N/A";

/// One system's judged output for a single case. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemResult {
    /// System-under-test identifier
    pub system_name: String,
    /// Pre-computed score, expected 0-100+ but never clamped
    pub score: f64,
    /// Whether the answer carries a disqualifying defect
    pub is_fatal: bool,
    /// Raw model output
    pub raw_response: String,
    /// Auditor's reasoning for the score
    pub audit_reasoning: String,
    /// Reason for the fatal flag, empty when not fatal
    pub fatal_reason: String,
}

impl SystemResult {
    fn from_row(row: &Row) -> Result<Self> {
        let score = row.total_score.trim().parse::<f64>().map_err(|e| {
            Error::Value(format!(
                "Invalid TOTAL_SCORE '{}' for system '{}' in case '{}': {e}",
                row.total_score, row.system, row.case_id
            ))
        })?;

        Ok(Self {
            system_name: row.system.clone(),
            score,
            is_fatal: row.fatal_flag.trim().eq_ignore_ascii_case("YES"),
            raw_response: row.model_output.clone(),
            audit_reasoning: row.audit_reasoning.clone(),
            fatal_reason: row.fatal_reason.clone(),
        })
    }

    /// Placeholder for a (case, system) pair with no source row. Missing
    /// rows are a tolerated condition, not an error.
    #[must_use]
    pub fn placeholder(system_name: impl Into<String>) -> Self {
        Self {
            system_name: system_name.into(),
            score: 0.0,
            is_fatal: false,
            raw_response: MISSING_RESPONSE.to_string(),
            audit_reasoning: MISSING_REASONING.to_string(),
            fatal_reason: String::new(),
        }
    }
}

/// One evaluation question with its ground truth and every system's result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationCase {
    /// Unique case identifier
    pub case_id: u32,
    /// Question text, taken from the first row of the group
    pub question_text: String,
    /// Citation rule, taken from the first row of the group
    pub citation_rule: String,
    /// Ground-truth answer, taken from the first row of the group
    pub ground_truth: String,
    /// Source file, taken from the first row of the group
    pub source_file: String,
    /// One result per known system, in global first-seen order
    pub results: Vec<SystemResult>,
}

impl EvaluationCase {
    /// Whether any system's result for this case is fatal
    #[must_use]
    pub fn has_fatal(&self) -> bool {
        self.results.iter().any(|r| r.is_fatal)
    }
}

/// Counters for tolerated irregularities in the input
///
/// Duplicate (case, system) rows are collapsed first-wins and absent pairs
/// are filled with placeholders; both happen silently in the case model, so
/// these counters make the tolerance observable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadDiagnostics {
    /// Rows discarded because an earlier row already covered the same
    /// (case, system) pair
    pub duplicate_rows: usize,
    /// Placeholder results synthesized for (case, system) pairs with no row
    pub synthesized_results: usize,
}

/// Result of a full load: the sorted case collection plus diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadOutcome {
    /// Cases sorted ascending by case id
    pub cases: Vec<EvaluationCase>,
    /// Tolerated-irregularity counters
    pub diagnostics: LoadDiagnostics,
}

/// Build the sorted case collection from normalized rows.
///
/// Two passes: the first collects distinct system names in first-seen order
/// over the whole table, the second partitions rows by case id and builds
/// one result per known system for every case.
///
/// # Errors
///
/// Returns `Error::Value` if a case id or score fails to parse. The error
/// propagates and aborts the whole load; a partially aggregated audit table
/// would be misleading.
pub fn aggregate(rows: &[Row]) -> Result<LoadOutcome> {
    let all_systems = distinct_systems(rows);

    // BTreeMap keys give the ascending case_id output order for free.
    let mut groups: BTreeMap<u32, Vec<&Row>> = BTreeMap::new();
    for row in rows {
        groups.entry(parse_case_id(&row.case_id)?).or_default().push(row);
    }

    let mut diagnostics = LoadDiagnostics::default();
    let mut cases = Vec::with_capacity(groups.len());

    for (case_id, group) in &groups {
        let first = group[0];
        let mut results = Vec::with_capacity(all_systems.len());

        for system in &all_systems {
            let mut matches = group.iter().filter(|r| &r.system == system);
            match matches.next() {
                Some(row) => {
                    diagnostics.duplicate_rows += matches.count();
                    results.push(SystemResult::from_row(row)?);
                }
                None => {
                    diagnostics.synthesized_results += 1;
                    results.push(SystemResult::placeholder(system.clone()));
                }
            }
        }

        cases.push(EvaluationCase {
            case_id: *case_id,
            question_text: first.question.clone(),
            citation_rule: first.citation_rule.clone(),
            ground_truth: first.ground_truth.clone(),
            source_file: first.source_file.clone(),
            results,
        });
    }

    Ok(LoadOutcome { cases, diagnostics })
}

/// Distinct system names in first-seen order over the whole table
fn distinct_systems(rows: &[Row]) -> Vec<String> {
    let mut systems: Vec<String> = Vec::new();
    for row in rows {
        if !systems.iter().any(|s| *s == row.system) {
            systems.push(row.system.clone());
        }
    }
    systems
}

fn parse_case_id(raw: &str) -> Result<u32> {
    let trimmed = raw.trim();
    // Spreadsheet numeric cells may surface integral ids as floats.
    if let Ok(id) = trimmed.parse::<u32>() {
        return Ok(id);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && f.fract() == 0.0 && *f >= 0.0)
        .map(|f| f as u32)
        .ok_or_else(|| Error::Value(format!("Invalid CASE_ID '{raw}'")))
}
