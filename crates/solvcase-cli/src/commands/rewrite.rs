use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use console::style;

use solvcase::solver::SolverSnapshot;
use solvcase::testcase::{write_testcase, ReadOutcome, ResultFlags, TestcaseReader, WriteOptions};
use solvcase::Pool;

use super::EXIT_SKIPPED;

#[derive(Args, Debug)]
pub struct RewriteArgs {
    /// Path to the testcase script
    pub testcase: PathBuf,

    /// Directory to write the new bundle to
    pub outdir: PathBuf,

    /// Include the job list as a result facet
    #[arg(long)]
    pub jobs: bool,

    /// Put the result into the script instead of a side file
    #[arg(long)]
    pub inline: bool,

    /// Gzip the repo files
    #[arg(long)]
    pub compress: bool,
}

pub fn execute(args: RewriteArgs) -> Result<i32> {
    let mut reader = TestcaseReader::open(&args.testcase)
        .with_context(|| format!("Failed to open {}", args.testcase.display()))?;
    let mut pool = Pool::new();

    let testcase = match reader.read(&mut pool)? {
        ReadOutcome::Ready(testcase) => testcase,
        ReadOutcome::Skip { missing, .. } => {
            eprintln!(
                "{} missing features: {}",
                style("Skipped:").yellow().bold(),
                missing.join(", ")
            );
            return Ok(EXIT_SKIPPED);
        }
    };

    for d in &testcase.diagnostics {
        log::warn!("line {}: {}", d.line, d.error);
    }
    if !reader.is_finished() {
        log::info!("only the first pass is rewritten");
    }

    let mut options = WriteOptions::new().compress_repos(args.compress);
    if args.inline {
        if !args.jobs {
            bail!("--inline needs a result facet, pass --jobs as well");
        }
        options = options.inline_result();
    }

    let flags = if args.jobs {
        ResultFlags::JOBS
    } else {
        ResultFlags::empty()
    };

    let snapshot = SolverSnapshot::new(testcase.jobs, testcase.solver_flags);
    write_testcase(&mut pool, &snapshot, &args.outdir, flags, &options)
        .with_context(|| format!("Failed to write {}", args.outdir.display()))?;

    println!(
        "{} {}",
        style("Wrote").green().bold(),
        args.outdir.display()
    );
    Ok(0)
}
