use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use serde::Serialize;

use solvcase::testcase::{job2str, ReadOptions, ReadOutcome, TestcaseReader};
use solvcase::{Diagnostic, Pool};

use super::EXIT_SKIPPED;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the testcase script
    pub testcase: PathBuf,

    /// Accept an additional feature name (repeatable)
    #[arg(long = "feature", value_name = "NAME")]
    pub features: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub format_json: bool,
}

#[derive(Serialize)]
struct PassReport {
    pass: usize,
    jobs: Vec<String>,
    solver_flags: String,
    result_flags: Vec<&'static str>,
    has_result: bool,
    reuse_solver: bool,
    diagnostics: Vec<DiagnosticReport>,
}

#[derive(Serialize)]
struct DiagnosticReport {
    line: usize,
    message: String,
}

impl From<&Diagnostic> for DiagnosticReport {
    fn from(d: &Diagnostic) -> Self {
        Self {
            line: d.line,
            message: d.error.to_string(),
        }
    }
}

#[derive(Serialize)]
struct CheckReport {
    repos: usize,
    packages: usize,
    passes: Vec<PassReport>,
    missing_features: Vec<String>,
}

pub fn execute(args: CheckArgs) -> Result<i32> {
    let options = args
        .features
        .iter()
        .fold(ReadOptions::new(), |options, name| options.feature(name.as_str()));
    let mut reader = TestcaseReader::open(&args.testcase)
        .with_context(|| format!("Failed to open {}", args.testcase.display()))?
        .with_options(options);

    let mut pool = Pool::new();
    let mut passes = Vec::new();
    let mut missing_features = Vec::new();
    let mut skip_diagnostics = Vec::new();

    while !reader.is_finished() {
        match reader.read(&mut pool)? {
            ReadOutcome::Ready(testcase) => {
                passes.push(PassReport {
                    pass: passes.len() + 1,
                    jobs: testcase.jobs.iter().map(|job| job2str(&pool, job)).collect(),
                    solver_flags: testcase.solver_flags.to_string(),
                    result_flags: testcase.result_flags.names(),
                    has_result: testcase.result.is_some(),
                    reuse_solver: testcase.reuse_solver,
                    diagnostics: testcase.diagnostics.iter().map(DiagnosticReport::from).collect(),
                });
            }
            ReadOutcome::Skip { missing, diagnostics } => {
                missing_features = missing;
                skip_diagnostics = diagnostics.iter().map(DiagnosticReport::from).collect();
                break;
            }
        }
    }

    let report = CheckReport {
        repos: pool.repo_ids().count(),
        packages: pool.solvable_ids().count(),
        passes,
        missing_features,
    };
    let diagnostic_count = skip_diagnostics.len()
        + report.passes.iter().map(|p| p.diagnostics.len()).sum::<usize>();

    if args.format_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, &skip_diagnostics);
    }

    if !report.missing_features.is_empty() {
        return Ok(EXIT_SKIPPED);
    }
    Ok(if diagnostic_count > 0 { 1 } else { 0 })
}

fn print_report(report: &CheckReport, skip_diagnostics: &[DiagnosticReport]) {
    println!(
        "{} repos, {} packages",
        style(report.repos).cyan(),
        style(report.packages).cyan()
    );

    for pass in &report.passes {
        println!("{}", style(format!("pass {}", pass.pass)).bold());
        for job in &pass.jobs {
            println!("  job {}", job);
        }
        if !pass.solver_flags.is_empty() {
            println!("  solverflags {}", pass.solver_flags);
        }
        if !pass.result_flags.is_empty() {
            let source = if pass.has_result { "" } else { " (no expected result)" };
            println!("  result {}{}", pass.result_flags.join(","), source);
        }
        if pass.reuse_solver {
            println!("  reuses solver");
        }
        print_diagnostics(&pass.diagnostics);
    }

    if !report.missing_features.is_empty() {
        println!(
            "{} missing features: {}",
            style("Skipped:").yellow().bold(),
            report.missing_features.join(", ")
        );
        print_diagnostics(skip_diagnostics);
    }
}

fn print_diagnostics(diagnostics: &[DiagnosticReport]) {
    for d in diagnostics {
        if d.line > 0 {
            println!("  {} line {}: {}", style("warning").yellow(), d.line, d.message);
        } else {
            println!("  {} {}", style("warning").yellow(), d.message);
        }
    }
}
