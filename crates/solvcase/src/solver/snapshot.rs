use std::collections::HashMap;

use super::{
    Alternative, DecisionReason, Literal, ProblemId, ProofStep, RuleClass, RuleId, RuleInfo,
    SolutionElement, SolutionId, SolutionOrigin, Solver, Transaction, WeakDepReason,
};
use crate::flags::SolverFlags;
use crate::job::Job;
use crate::pool::{SolvableId, StrId};

/// A recorded rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleRecord {
    pub class: Option<RuleClass>,
    pub literals: Vec<Literal>,
    pub info: RuleInfo,
    /// Package rule this rule was derived from, for choice and recommends rules
    pub origin: Option<RuleId>,
    /// Derivation of a learnt rule
    pub decisions: Vec<ProofStep>,
}

impl RuleRecord {
    pub fn new(class: RuleClass, literals: Vec<Literal>) -> Self {
        Self {
            class: Some(class),
            literals,
            info: RuleInfo::Unknown,
            origin: None,
            decisions: Vec::new(),
        }
    }

    pub fn with_info(mut self, info: RuleInfo) -> Self {
        self.info = info;
        self
    }

    pub fn with_decisions(mut self, decisions: Vec<ProofStep>) -> Self {
        self.decisions = decisions;
        self
    }
}

/// A recorded problem solution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionRecord {
    pub origin: SolutionOrigin,
    pub elements: Vec<SolutionElement>,
}

/// A recorded problem
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProblemRecord {
    /// The rule that describes the problem
    pub rule: Option<RuleId>,
    /// All rules involved in the problem
    pub rules: Vec<RuleId>,
    pub solutions: Vec<SolutionRecord>,
    pub decisions: Vec<ProofStep>,
}

/// A solver run captured as plain data.
///
/// Fields are public so that tests and tools can fill in whatever facets
/// they care about; everything else stays empty.
#[derive(Debug, Clone, Default)]
pub struct SolverSnapshot {
    pub jobs: Vec<Job>,
    pub flags: SolverFlags,
    /// Rules indexed by `id - 1`
    pub rules: Vec<RuleRecord>,
    /// Problems indexed by `id - 1`
    pub problems: Vec<ProblemRecord>,
    pub transaction: Transaction,
    pub orphaned: Vec<SolvableId>,
    pub recommended: Vec<SolvableId>,
    pub suggested: Vec<SolvableId>,
    pub unneeded: Vec<SolvableId>,
    pub unneeded_filtered: Vec<SolvableId>,
    pub userinstalled: Vec<SolvableId>,
    pub autoinstalled: Vec<StrId>,
    pub alternatives: Vec<Alternative>,
    pub decisions: HashMap<SolvableId, (DecisionReason, Option<RuleId>)>,
    pub weakdeps: HashMap<SolvableId, Vec<WeakDepReason>>,
    pub cleandeps: Vec<SolvableId>,
}

impl SolverSnapshot {
    pub fn new(jobs: Vec<Job>, flags: SolverFlags) -> Self {
        Self {
            jobs,
            flags,
            ..Default::default()
        }
    }

    /// Record a rule and return its id
    pub fn add_rule(&mut self, rule: RuleRecord) -> RuleId {
        self.rules.push(rule);
        self.rules.len() as RuleId
    }

    /// Record a problem and return its id
    pub fn add_problem(&mut self, problem: ProblemRecord) -> ProblemId {
        self.problems.push(problem);
        self.problems.len()
    }

    pub fn decide(&mut self, p: SolvableId, reason: DecisionReason, rule: Option<RuleId>) {
        self.decisions.insert(p, (reason, rule));
    }

    fn rule(&self, rule: RuleId) -> Option<&RuleRecord> {
        (rule as usize)
            .checked_sub(1)
            .and_then(|i| self.rules.get(i))
    }

    fn problem(&self, problem: ProblemId) -> Option<&ProblemRecord> {
        problem.checked_sub(1).and_then(|i| self.problems.get(i))
    }

    fn solution(&self, problem: ProblemId, solution: SolutionId) -> Option<&SolutionRecord> {
        self.problem(problem)
            .and_then(|p| solution.checked_sub(1).and_then(|i| p.solutions.get(i)))
    }
}

impl Solver for SolverSnapshot {
    fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    fn flags(&self) -> &SolverFlags {
        &self.flags
    }

    fn rule_count(&self) -> RuleId {
        self.rules.len() as RuleId
    }

    fn rule_class(&self, rule: RuleId) -> Option<RuleClass> {
        self.rule(rule).and_then(|r| r.class)
    }

    fn rule_literals(&self, rule: RuleId) -> Vec<Literal> {
        self.rule(rule).map(|r| r.literals.clone()).unwrap_or_default()
    }

    fn rule_info(&self, rule: RuleId) -> RuleInfo {
        self.rule(rule).map(|r| r.info.clone()).unwrap_or(RuleInfo::Unknown)
    }

    fn origin_pkg_rule(&self, rule: RuleId) -> RuleId {
        self.rule(rule).and_then(|r| r.origin).unwrap_or(rule)
    }

    fn problem_count(&self) -> usize {
        self.problems.len()
    }

    fn problem_rule(&self, problem: ProblemId) -> Option<RuleId> {
        self.problem(problem).and_then(|p| p.rule)
    }

    fn problem_rules(&self, problem: ProblemId) -> Vec<RuleId> {
        self.problem(problem).map(|p| p.rules.clone()).unwrap_or_default()
    }

    fn solution_count(&self, problem: ProblemId) -> usize {
        self.problem(problem).map(|p| p.solutions.len()).unwrap_or(0)
    }

    fn solution_origin(&self, problem: ProblemId, solution: SolutionId) -> SolutionOrigin {
        self.solution(problem, solution)
            .map(|s| s.origin)
            .unwrap_or(SolutionOrigin::Rule(0))
    }

    fn solution_elements(&self, problem: ProblemId, solution: SolutionId) -> Vec<SolutionElement> {
        self.solution(problem, solution)
            .map(|s| s.elements.clone())
            .unwrap_or_default()
    }

    fn problem_decisions(&self, problem: ProblemId) -> Vec<ProofStep> {
        self.problem(problem).map(|p| p.decisions.clone()).unwrap_or_default()
    }

    fn learnt_rule_decisions(&self, rule: RuleId) -> Vec<ProofStep> {
        self.rule(rule).map(|r| r.decisions.clone()).unwrap_or_default()
    }

    fn transaction(&self) -> Transaction {
        self.transaction.clone()
    }

    fn orphaned(&self) -> Vec<SolvableId> {
        self.orphaned.clone()
    }

    fn recommendations(&self) -> (Vec<SolvableId>, Vec<SolvableId>) {
        (self.recommended.clone(), self.suggested.clone())
    }

    fn unneeded(&self, filtered: bool) -> Vec<SolvableId> {
        if filtered {
            self.unneeded_filtered.clone()
        } else {
            self.unneeded.clone()
        }
    }

    fn userinstalled(&self) -> Vec<SolvableId> {
        self.userinstalled.clone()
    }

    fn autoinstalled_names(&self) -> Vec<StrId> {
        self.autoinstalled.clone()
    }

    fn alternatives(&self) -> Vec<Alternative> {
        self.alternatives.clone()
    }

    fn describe_decision(&self, p: SolvableId) -> (DecisionReason, Option<RuleId>) {
        self.decisions
            .get(&p)
            .copied()
            .unwrap_or((DecisionReason::Unrelated, None))
    }

    fn describe_weakdep_decision(&self, p: SolvableId) -> Vec<WeakDepReason> {
        self.weakdeps.get(&p).cloned().unwrap_or_default()
    }

    fn cleandeps(&self) -> Vec<SolvableId> {
        self.cleandeps.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_ids_are_one_based() {
        let mut snap = SolverSnapshot::default();
        let r1 = snap.add_rule(RuleRecord::new(RuleClass::Pkg, vec![-2, 3]));
        let r2 = snap.add_rule(RuleRecord::new(RuleClass::Job, vec![2]));
        assert_eq!((r1, r2), (1, 2));
        assert_eq!(snap.rule_count(), 2);
        assert_eq!(snap.rule_class(2), Some(RuleClass::Job));
        assert_eq!(snap.rule_class(3), None);
        assert_eq!(snap.rule_literals(1), vec![-2, 3]);
        assert!(snap.rule_literals(0).is_empty());
        assert_eq!(snap.origin_pkg_rule(2), 2);
    }

    #[test]
    fn test_problem_lookups() {
        let mut snap = SolverSnapshot::default();
        let rule = snap.add_rule(RuleRecord::new(RuleClass::Job, vec![2]));
        let pid = snap.add_problem(ProblemRecord {
            rule: Some(rule),
            rules: vec![rule],
            solutions: vec![SolutionRecord {
                origin: SolutionOrigin::Job(0),
                elements: vec![SolutionElement::DeleteJob(0)],
            }],
            decisions: vec![ProofStep::premise(2, rule)],
        });
        assert_eq!(pid, 1);
        assert_eq!(snap.problem_count(), 1);
        assert_eq!(snap.problem_rule(1), Some(rule));
        assert_eq!(snap.solution_count(1), 1);
        assert_eq!(snap.solution_origin(1, 1), SolutionOrigin::Job(0));
        assert_eq!(snap.solution_elements(1, 2), vec![]);
        assert_eq!(snap.problem_decisions(1).len(), 1);
    }

    #[test]
    fn test_undecided_is_unrelated() {
        let mut snap = SolverSnapshot::default();
        snap.decide(2, DecisionReason::ResolveJob, Some(1));
        assert_eq!(snap.describe_decision(2), (DecisionReason::ResolveJob, Some(1)));
        assert_eq!(snap.describe_decision(3), (DecisionReason::Unrelated, None));
    }
}
