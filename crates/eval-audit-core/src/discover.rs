//! Report file discovery
//!
//! When no file is supplied explicitly, the newest report matching the
//! fixed naming pattern in a directory is used. Explicit paths always take
//! precedence over discovery; that policy lives with the caller.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Filename prefix a report must carry to be auto-discovered
pub const REPORT_PREFIX: &str = "Evaluation_Report";

/// Find the most recently modified report file in `dir`.
///
/// A candidate's name must start with [`REPORT_PREFIX`] and end in `.xlsx`
/// or `.csv`. Returns `None` when nothing matches or the directory cannot
/// be read; unreadable candidates are skipped.
#[must_use]
pub fn latest_report(dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    let mut newest: Option<(SystemTime, PathBuf)> = None;

    for entry in entries.flatten() {
        let path = entry.path();
        if !is_report_name(&path) {
            continue;
        }
        let Ok(modified) = entry.metadata().and_then(|m| m.modified()) else {
            continue;
        };
        if newest.as_ref().map_or(true, |(t, _)| modified > *t) {
            newest = Some((modified, path));
        }
    }

    newest.map(|(_, path)| path)
}

fn is_report_name(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if !name.starts_with(REPORT_PREFIX) {
        return false;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xlsx") || e.eq_ignore_ascii_case("csv"))
}
