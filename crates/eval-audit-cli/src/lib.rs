//! Evaluation Audit CLI Library
//!
//! Source resolution and plain-text rendering for the audit console. The
//! core pipeline stays presentation-free; everything user-facing lives
//! here.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_const_for_fn)]
// Allow common patterns in test code
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use eval_audit_core::{Badge, EvaluationCase, SystemSummary, latest_report};

/// Where the input report came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSource {
    /// Path to the report file
    pub path: PathBuf,
    /// True when the path was discovered rather than supplied
    pub auto_discovered: bool,
}

/// Resolve the input source: an explicitly supplied file always wins,
/// otherwise the newest matching report in `dir` is used. `None` means
/// there is nothing to load.
#[must_use]
pub fn resolve_source(explicit: Option<PathBuf>, dir: &Path) -> Option<ReportSource> {
    if let Some(path) = explicit {
        return Some(ReportSource {
            path,
            auto_discovered: false,
        });
    }
    latest_report(dir).map(|path| ReportSource {
        path,
        auto_discovered: true,
    })
}

/// Render per-system summary statistics as a console table
#[must_use]
pub fn render_summary(summaries: &[SystemSummary]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== System Summary ===\n");
    let _ = writeln!(
        out,
        "{:<24} {:>10} {:>8} {:>8}",
        "System", "Mean", "Fatal", "Cases"
    );
    let _ = writeln!(out, "{}", "-".repeat(54));
    for summary in summaries {
        let _ = writeln!(
            out,
            "{:<24} {:>10.1} {:>8} {:>8}",
            summary.system_name, summary.mean_score, summary.fatal_count, summary.case_count
        );
    }
    out
}

/// Render the case collection as console text, one block per case with a
/// badge line per system. `fatal_only` keeps only cases carrying at least
/// one fatal result, mirroring the console's fatal filter.
#[must_use]
pub fn render_cases(cases: &[EvaluationCase], fatal_only: bool) -> String {
    let shown: Vec<&EvaluationCase> = cases
        .iter()
        .filter(|c| !fatal_only || c.has_fatal())
        .collect();

    let mut out = String::new();
    let _ = writeln!(out, "Showing {} / {} case(s)\n", shown.len(), cases.len());

    for case in shown {
        let _ = writeln!(out, "=== Case {} ===", case.case_id);
        let _ = writeln!(out, "Question:     {}", case.question_text);
        let _ = writeln!(out, "Ground truth: {}", case.ground_truth);
        let _ = writeln!(out, "Rule:         {}", case.citation_rule);
        let _ = writeln!(out, "Source:       {}", case.source_file);

        for result in &case.results {
            let badge = Badge::classify(result.score, result.is_fatal);
            let _ = writeln!(
                out,
                "  {:<24} {:<10} {:>6.1}",
                result.system_name, badge, result.score
            );
            if result.is_fatal {
                let reason = if result.fatal_reason.is_empty() {
                    "no reason given"
                } else {
                    result.fatal_reason.as_str()
                };
                let _ = writeln!(out, "    fatal: {reason}");
            }
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use eval_audit_core::SystemResult;

    fn case(case_id: u32, results: Vec<SystemResult>) -> EvaluationCase {
        EvaluationCase {
            case_id,
            question_text: "What is 2+2?".to_string(),
            citation_rule: "rule A".to_string(),
            ground_truth: "4".to_string(),
            source_file: "batch1.xlsx".to_string(),
            results,
        }
    }

    fn result(name: &str, score: f64, is_fatal: bool) -> SystemResult {
        SystemResult {
            system_name: name.to_string(),
            score,
            is_fatal,
            raw_response: "4".to_string(),
            audit_reasoning: "ok".to_string(),
            fatal_reason: if is_fatal {
                "fabricated".to_string()
            } else {
                String::new()
            },
        }
    }

    #[test]
    fn test_explicit_source_wins_over_discovery() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Evaluation_Report_auto.csv"), "x").unwrap();

        let source = resolve_source(Some(PathBuf::from("manual.csv")), dir.path()).unwrap();
        assert_eq!(source.path, PathBuf::from("manual.csv"));
        assert!(!source.auto_discovered);
    }

    #[test]
    fn test_discovery_used_when_nothing_supplied() {
        let dir = tempfile::tempdir().unwrap();
        let report = dir.path().join("Evaluation_Report_auto.csv");
        std::fs::write(&report, "x").unwrap();

        let source = resolve_source(None, dir.path()).unwrap();
        assert_eq!(source.path, report);
        assert!(source.auto_discovered);
    }

    #[test]
    fn test_no_source_at_all() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve_source(None, dir.path()), None);
    }

    #[test]
    fn test_render_summary_lists_every_system() {
        let summaries = vec![
            SystemSummary {
                system_name: "dify".to_string(),
                mean_score: 94.3,
                fatal_count: 0,
                case_count: 3,
            },
            SystemSummary {
                system_name: "fast".to_string(),
                mean_score: 51.7,
                fatal_count: 1,
                case_count: 3,
            },
        ];
        let text = render_summary(&summaries);
        assert!(text.contains("dify"));
        assert!(text.contains("fast"));
        assert!(text.contains("94.3"));
    }

    #[test]
    fn test_render_cases_includes_badges() {
        let cases = vec![case(
            1,
            vec![result("dify", 95.0, false), result("fast", 100.0, true)],
        )];
        let text = render_cases(&cases, false);
        assert!(text.contains("Case 1"));
        assert!(text.contains("EXCELLENT"));
        // fatal overrides the perfect score
        assert!(text.contains("FATAL"));
        assert!(text.contains("fatal: fabricated"));
        assert!(text.contains("Showing 1 / 1"));
    }

    #[test]
    fn test_fatal_only_filter() {
        let cases = vec![
            case(1, vec![result("dify", 95.0, false)]),
            case(2, vec![result("dify", 20.0, true)]),
        ];
        let text = render_cases(&cases, true);
        assert!(!text.contains("Case 1"));
        assert!(text.contains("Case 2"));
        assert!(text.contains("Showing 1 / 2"));
    }
}
