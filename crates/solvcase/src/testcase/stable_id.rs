//! Content derived ids for rules, problems, solutions and alternatives.
//!
//! Numeric ids change whenever the solver adds or reorders rules, so dumps
//! name these objects by an MD5 over a canonical text form of their content.
//! Problem, solution and alternative ids keep only the first 4 digest bytes.

use md5::{Digest, Md5};

use super::grammar::job2str;
use super::ident::solvable2str;
use super::line_set::LineSet;
use crate::pool::Pool;
use crate::solver::{AlternativeKind, ProblemId, RuleId, SolutionId, SolutionOrigin, Solver};

const SHORT_ID_BYTES: usize = 4;

/// Hash each part followed by a NUL byte
fn digest<'a>(parts: impl IntoIterator<Item = &'a str>) -> Vec<u8> {
    let mut hasher = Md5::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    hasher.finalize().to_vec()
}

fn short_hex(digest: &[u8]) -> String {
    hex::encode(&digest[..SHORT_ID_BYTES])
}

/// Full hex MD5 over the sorted, deduplicated literals of a rule.
///
/// Negated literals are prefixed with `!`.
pub fn rule_id(pool: &Pool, solver: &dyn Solver, rule: RuleId) -> String {
    let mut lits = LineSet::new();
    for lit in solver.rule_literals(rule) {
        let name = solvable2str(pool, lit.abs());
        if lit < 0 {
            lits.push_joined("!", &name, "");
        } else {
            lits.push(name);
        }
    }
    lits.sort_unique();
    hex::encode(digest(lits.iter()))
}

/// Short hash over the ids of all rules involved in a problem
pub fn problem_id(pool: &Pool, solver: &dyn Solver, problem: ProblemId) -> String {
    let mut ids = LineSet::new();
    for rule in solver.problem_rules(problem) {
        ids.push(rule_id(pool, solver, rule));
    }
    ids.sort_unique();
    short_hex(&digest(ids.iter()))
}

/// Short hash over what a solution came from: a job line or a rule id
pub fn solution_id(pool: &Pool, solver: &dyn Solver, problem: ProblemId, solution: SolutionId) -> String {
    let origin = match solver.solution_origin(problem, solution) {
        SolutionOrigin::Job(index) => solver
            .jobs()
            .get(index)
            .map(|job| job2str(pool, job))
            .unwrap_or_default(),
        SolutionOrigin::Rule(rule) => rule_id(pool, solver, rule),
    };
    short_hex(&digest([origin.as_str()]))
}

pub fn alternative_id(pool: &Pool, solver: &dyn Solver, kind: &AlternativeKind) -> String {
    let hash = match kind {
        AlternativeKind::Recommends { from, dep } => {
            let from = solvable2str(pool, *from);
            let dep = pool.dep2str(*dep);
            digest([from.as_str(), dep.as_str()])
        }
        AlternativeKind::Rule(rule) => digest([rule_id(pool, solver, *rule).as_str()]),
    };
    short_hex(&hash)
}
