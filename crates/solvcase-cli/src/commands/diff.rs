use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use console::style;

use solvcase::testcase::result_diff;

#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Recorded result
    pub expected: PathBuf,

    /// Freshly produced result
    pub actual: PathBuf,
}

pub fn execute(args: DiffArgs) -> Result<i32> {
    let expected = std::fs::read_to_string(&args.expected)
        .with_context(|| format!("Failed to read {}", args.expected.display()))?;
    let actual = std::fs::read_to_string(&args.actual)
        .with_context(|| format!("Failed to read {}", args.actual.display()))?;

    let Some(diff) = result_diff(&expected, &actual) else {
        return Ok(0);
    };

    for line in diff.lines() {
        if line.starts_with('-') {
            println!("{}", style(line).red());
        } else if line.starts_with('+') {
            println!("{}", style(line).green());
        } else {
            println!("{}", line);
        }
    }
    Ok(1)
}
