//! `solvcase`: inspect, rewrite and compare solver testcases.

mod commands;

use clap::{Parser, Subcommand};
use console::style;

use commands::{CheckArgs, DiffArgs, RewriteArgs};

#[derive(Parser, Debug)]
#[command(name = "solvcase", version, about = "Solver testcase tools")]
struct Cli {
    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Read a testcase and report diagnostics for every pass
    Check(CheckArgs),

    /// Compare two result dumps line by line
    Diff(DiffArgs),

    /// Read a testcase and write it back out as a fresh bundle
    Rewrite(RewriteArgs),
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Check(args) => commands::check::execute(args),
        Commands::Diff(args) => commands::diff::execute(args),
        Commands::Rewrite(args) => commands::rewrite::execute(args),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    }
}
