//! Reproducible text testcases for dependency solver runs.
//!
//! A testcase captures everything a solver run consumed (repositories,
//! architecture and policy flags, the job queue) and everything it produced
//! (transaction, problems, proofs, rule dumps, alternatives, ordering and
//! decision reasons) as plain, sortable, diffable text.
//!
//! # Architecture
//!
//! - [`pool`]: string and relation interning, repos, solvables, the provider
//!   index and the selection engine
//! - [`job`]: solver directives (operation, selector, flags)
//! - [`solver`]: the [`Solver`](solver::Solver) seam the result dumper reads
//!   from, plus a recorded [`SolverSnapshot`](solver::SolverSnapshot)
//! - [`repo`]: pluggable repository file formats
//! - [`testcase`]: the line grammar, stable ids, result dumper, writer,
//!   reader and diff engine
//!
//! # Example
//!
//! ```ignore
//! use solvcase::pool::Pool;
//! use solvcase::testcase::{TestcaseReader, ReadOutcome};
//!
//! let mut pool = Pool::new();
//! let mut reader = TestcaseReader::open("bug-1234/testcase.t")?;
//! if let ReadOutcome::Ready(testcase) = reader.read(&mut pool)? {
//!     println!("{} jobs", testcase.jobs.len());
//! }
//! ```

pub mod error;
pub mod flags;
pub mod job;
pub mod pool;
pub mod repo;
pub mod solver;
pub mod testcase;

pub use error::{Diagnostic, Diagnostics, ParseError, Result, TestcaseError};
pub use flags::{PoolFlags, SolverFlags};
pub use job::{Job, JobFlags, JobOp, Selector};
pub use pool::Pool;
