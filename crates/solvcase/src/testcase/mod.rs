//! The testcase text protocol.
//!
//! [`write_testcase`] turns a pool and a finished solver run into a
//! directory holding a `testcase.t` script, one repo file per repository and
//! optionally the expected result. [`TestcaseReader`] reads such a script
//! back, pass by pass, and [`result_diff`] compares a fresh
//! [`solver_result`] dump against the recorded one.
//!
//! Everything is plain text: packages are named by [`solvable2str`], jobs by
//! [`job2str`], and rules, problems, solutions and alternatives by content
//! hashes that do not change when the solver renumbers things.

mod diff;
mod escape;
mod grammar;
mod ident;
mod line_set;
mod reader;
mod result;
mod stable_id;
mod writer;

pub use diff::result_diff;
pub use escape::{escape, unescape};
pub use grammar::{add_selection_job, job2str, str2job, str2namespace, str2select, SelectionKind};
pub use ident::{repo2str, solvable2str, str2repo, str2solvable};
pub use line_set::LineSet;
pub use reader::{Indexing, ReadOptions, ReadOutcome, Testcase, TestcaseReader};
pub use result::{
    alternative2str, problem_rule_info2str, select2str, solver_result, ResultFlags, RESULT_FLAG_NAMES,
};
pub use stable_id::{alternative_id, problem_id, rule_id, solution_id};
pub use writer::{write_testcase, WriteOptions, DEFAULT_RESULT_NAME, DEFAULT_TESTCASE_NAME};
