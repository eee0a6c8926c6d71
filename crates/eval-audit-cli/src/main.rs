//! Evaluation Audit CLI
//!
//! Console front end for reviewing tabular AI evaluation reports: loads a
//! report (explicit path or the newest `Evaluation_Report*` file in the
//! working directory), aggregates it, and prints per-case badge tables and
//! per-system summaries.

#![allow(clippy::doc_markdown)]

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};
use eval_audit_cli::{ReportSource, render_cases, render_summary, resolve_source};
use eval_audit_core::{LoadOutcome, load_and_aggregate, summarize};

#[derive(Parser)]
#[command(name = "eval-audit")]
#[command(about = "AI evaluation audit console", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show cases with per-system badges
    Show {
        /// Report file (.csv or .xlsx); newest Evaluation_Report* in the
        /// working directory when omitted
        #[arg(value_name = "REPORT")]
        report: Option<PathBuf>,

        /// Only show cases carrying at least one fatal result
        #[arg(long)]
        fatal_only: bool,

        /// Emit the case collection as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show per-system summary statistics
    Summary {
        /// Report file (.csv or .xlsx); newest Evaluation_Report* in the
        /// working directory when omitted
        #[arg(value_name = "REPORT")]
        report: Option<PathBuf>,

        /// Emit the summaries as JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Show {
            report,
            fatal_only,
            json,
        } => {
            let outcome = load_from(report);
            if json {
                print_json(&outcome.cases);
            } else {
                print!("{}", render_cases(&outcome.cases, fatal_only));
            }
            report_diagnostics(&outcome);
        }
        Commands::Summary { report, json } => {
            let outcome = load_from(report);
            let summaries = summarize(&outcome.cases);
            if json {
                print_json(&summaries);
            } else {
                print!("{}", render_summary(&summaries));
            }
            report_diagnostics(&outcome);
        }
    }
}

fn load_from(explicit: Option<PathBuf>) -> LoadOutcome {
    let Some(source) = resolve_source(explicit, Path::new(".")) else {
        eprintln!("No report found: supply a path or place an Evaluation_Report*.xlsx");
        eprintln!("or Evaluation_Report*.csv in the working directory.");
        std::process::exit(1);
    };

    announce_source(&source);

    match load_and_aggregate(&source.path) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

/// Banner for auto-discovered reports, with the file's modification time.
fn announce_source(source: &ReportSource) {
    if !source.auto_discovered {
        return;
    }
    println!("Auto-loaded report: {}", source.path.display());
    if let Ok(modified) = std::fs::metadata(&source.path).and_then(|m| m.modified()) {
        let stamp: DateTime<Local> = modified.into();
        println!("  Modified: {}", stamp.format("%Y-%m-%d %H:%M:%S"));
    }
    println!();
}

fn report_diagnostics(outcome: &LoadOutcome) {
    let diag = outcome.diagnostics;
    if diag.duplicate_rows > 0 {
        eprintln!(
            "Warning: {} duplicate (case, system) row(s) collapsed, first occurrence kept",
            diag.duplicate_rows
        );
    }
    if diag.synthesized_results > 0 {
        eprintln!(
            "Warning: {} missing (case, system) pair(s) filled with placeholders",
            diag.synthesized_results
        );
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error serializing output: {e}");
            std::process::exit(1);
        }
    }
}
