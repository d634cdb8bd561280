//! The solver seam.
//!
//! The result dumper never runs a solver itself. It reads a finished run
//! through the [`Solver`] trait, which exposes rules, problems, solutions,
//! decisions, the transaction and the various package lists in terms of
//! pool ids. [`SolverSnapshot`] implements the trait from recorded data.

mod snapshot;

use std::collections::HashMap;

pub use snapshot::{ProblemRecord, RuleRecord, SolutionRecord, SolverSnapshot};

use crate::flags::SolverFlags;
use crate::job::{Job, Selector};
use crate::pool::{DepId, SolvableId, StrId};

/// 1-based rule id
pub type RuleId = u32;

/// 1-based problem id
pub type ProblemId = usize;

/// 1-based solution id within a problem
pub type SolutionId = usize;

/// Signed solvable id: positive means install, negative means do not install
pub type Literal = SolvableId;

/// Rule classes with their dump names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleClass {
    Pkg,
    Update,
    Feature,
    Job,
    DistUpgrade,
    InfArch,
    Choice,
    Learnt,
    Best,
    YumObs,
    Black,
    Recommends,
    StrictRepoPriority,
}

const RULE_CLASSES: &[(RuleClass, &str)] = &[
    (RuleClass::Pkg, "pkg"),
    (RuleClass::Update, "update"),
    (RuleClass::Feature, "feature"),
    (RuleClass::Job, "job"),
    (RuleClass::DistUpgrade, "distupgrade"),
    (RuleClass::InfArch, "infarch"),
    (RuleClass::Choice, "choice"),
    (RuleClass::Learnt, "learnt"),
    (RuleClass::Best, "best"),
    (RuleClass::YumObs, "yumobs"),
    (RuleClass::Black, "black"),
    (RuleClass::Recommends, "recommends"),
    (RuleClass::StrictRepoPriority, "strictrepoprio"),
];

impl RuleClass {
    pub fn name(self) -> &'static str {
        RULE_CLASSES
            .iter()
            .find(|(c, _)| *c == self)
            .map(|(_, name)| *name)
            .unwrap_or("unknown")
    }
}

/// Name of an optional rule class; `unknown` when absent
pub fn rule_class_name(class: Option<RuleClass>) -> &'static str {
    class.map(RuleClass::name).unwrap_or("unknown")
}

/// Why a rule exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleInfo {
    Unknown,
    DistUpgrade { from: SolvableId },
    InfArch { from: SolvableId },
    Update { from: SolvableId },
    /// A job rule; the selector of the originating job if known
    Job { select: Option<Selector> },
    JobUnsupported,
    JobNothingProvidesDep { dep: DepId },
    JobUnknownPackage { dep: DepId },
    JobProvidedBySystem { dep: DepId },
    Pkg,
    Best { from: Option<SolvableId> },
    PkgNotInstallable { from: SolvableId },
    PkgNothingProvidesDep { from: SolvableId, dep: DepId },
    PkgSameName { from: SolvableId, to: SolvableId },
    PkgConflicts { from: SolvableId, to: SolvableId, dep: DepId },
    PkgObsoletes { from: SolvableId, to: SolvableId, dep: DepId },
    PkgInstalledObsoletes { from: SolvableId, to: SolvableId, dep: DepId },
    PkgImplicitObsoletes { from: SolvableId, to: SolvableId, dep: DepId },
    PkgRequires { from: SolvableId, dep: DepId },
    PkgSelfConflict { from: SolvableId, dep: DepId },
    PkgConstrains { from: SolvableId, to: SolvableId, dep: DepId },
    YumObs { from: SolvableId, to: SolvableId, dep: DepId },
    Black { from: SolvableId },
    StrictRepoPriority { from: SolvableId },
}

/// One element of a problem solution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolutionElement {
    /// Remove the job at this index of [`Solver::jobs`]
    DeleteJob(usize),
    Erase(SolvableId),
    Replace(SolvableId, SolvableId),
    Allow(SolvableId),
    Unknown,
}

/// What a solution was derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionOrigin {
    /// Index into [`Solver::jobs`]
    Job(usize),
    Rule(RuleId),
}

/// One step of a problem or learnt-rule proof
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofStep {
    /// The literal that became true
    pub literal: Literal,
    /// The rule that forced it
    pub rule: RuleId,
    /// The step is an assumption rather than a propagation
    pub premise: bool,
}

impl ProofStep {
    pub fn premise(literal: Literal, rule: RuleId) -> Self {
        Self {
            literal,
            rule,
            premise: true,
        }
    }

    pub fn derived(literal: Literal, rule: RuleId) -> Self {
        Self {
            literal,
            rule,
            premise: false,
        }
    }
}

/// Transaction step classes in dump order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionClass {
    Erase,
    Install,
    Reinstall,
    Downgrade,
    Change,
    Upgrade,
    Obsolete,
    MultiInstall,
    MultiReinstall,
}

pub const TRANSACTION_CLASSES: &[(TransactionClass, &str)] = &[
    (TransactionClass::Erase, "erase"),
    (TransactionClass::Install, "install"),
    (TransactionClass::Reinstall, "reinstall"),
    (TransactionClass::Downgrade, "downgrade"),
    (TransactionClass::Change, "change"),
    (TransactionClass::Upgrade, "upgrade"),
    (TransactionClass::Obsolete, "obsolete"),
    (TransactionClass::MultiInstall, "multiinstall"),
    (TransactionClass::MultiReinstall, "multireinstall"),
];

/// A computed transaction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    pub classes: HashMap<TransactionClass, Vec<SolvableId>>,
    /// Installed package -> package that replaces it
    pub obsoleted_by: HashMap<SolvableId, SolvableId>,
    /// Ordered steps
    pub steps: Vec<SolvableId>,
    /// Ordering edges per step: (target, edge type)
    pub edges: HashMap<SolvableId, Vec<(SolvableId, u32)>>,
}

impl Transaction {
    pub fn classify(&self, class: TransactionClass) -> &[SolvableId] {
        self.classes.get(&class).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn obs_pkg(&self, p: SolvableId) -> Option<SolvableId> {
        self.obsoleted_by.get(&p).copied()
    }

    pub fn order_edges(&self, p: SolvableId) -> &[(SolvableId, u32)] {
        self.edges.get(&p).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Decision reasons with their dump names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecisionReason {
    Unrelated,
    UnitRule,
    KeepInstalled,
    ResolveJob,
    UpdateInstalled,
    CleandepsErase,
    Resolve,
    WeakDep,
    ResolveOrphan,
    Recommended,
    Supplemented,
    Premise,
}

const DECISION_REASONS: &[(DecisionReason, &str)] = &[
    (DecisionReason::Unrelated, "unrelated"),
    (DecisionReason::UnitRule, "unit"),
    (DecisionReason::KeepInstalled, "keep"),
    (DecisionReason::ResolveJob, "job"),
    (DecisionReason::UpdateInstalled, "update"),
    (DecisionReason::CleandepsErase, "cleandeps"),
    (DecisionReason::Resolve, "resolve"),
    (DecisionReason::WeakDep, "weakdep"),
    (DecisionReason::ResolveOrphan, "orphan"),
    (DecisionReason::Recommended, "recommended"),
    (DecisionReason::Supplemented, "supplemented"),
];

impl DecisionReason {
    /// Dump name; reasons without one print as `?`
    pub fn name(self) -> &'static str {
        DECISION_REASONS
            .iter()
            .find(|(r, _)| *r == self)
            .map(|(_, name)| *name)
            .unwrap_or("?")
    }
}

/// A weak dependency that explains a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeakDepReason {
    pub reason: DecisionReason,
    /// The package carrying the dependency, if any
    pub from: Option<SolvableId>,
    pub dep: DepId,
}

/// What an alternative chose between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlternativeKind {
    /// Providers of a dependency recommended by a package
    Recommends { from: SolvableId, dep: DepId },
    /// Literals of a rule
    Rule(RuleId),
}

/// A point where the solver picked one of several packages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternative {
    pub kind: AlternativeKind,
    pub chosen: SolvableId,
    pub choices: Vec<Literal>,
}

/// Read access to a finished solver run.
///
/// Everything beyond jobs, flags and rules has an empty default so that
/// solvers only implement what they produce.
pub trait Solver {
    fn jobs(&self) -> &[Job];

    fn flags(&self) -> &SolverFlags;

    /// Number of rules; valid ids are `1..=rule_count()`
    fn rule_count(&self) -> RuleId;

    fn rule_class(&self, rule: RuleId) -> Option<RuleClass>;

    fn rule_literals(&self, rule: RuleId) -> Vec<Literal>;

    fn rule_info(&self, _rule: RuleId) -> RuleInfo {
        RuleInfo::Unknown
    }

    /// The package rule a choice or recommends rule was derived from
    fn origin_pkg_rule(&self, rule: RuleId) -> RuleId {
        rule
    }

    fn problem_count(&self) -> usize {
        0
    }

    /// The rule chosen to describe a problem
    fn problem_rule(&self, _problem: ProblemId) -> Option<RuleId> {
        None
    }

    /// All rules that justify a problem
    fn problem_rules(&self, _problem: ProblemId) -> Vec<RuleId> {
        Vec::new()
    }

    fn solution_count(&self, _problem: ProblemId) -> usize {
        0
    }

    fn solution_origin(&self, problem: ProblemId, solution: SolutionId) -> SolutionOrigin;

    fn solution_elements(&self, _problem: ProblemId, _solution: SolutionId) -> Vec<SolutionElement> {
        Vec::new()
    }

    /// Decisions that lead to a problem
    fn problem_decisions(&self, _problem: ProblemId) -> Vec<ProofStep> {
        Vec::new()
    }

    /// Decisions that derive a learnt rule
    fn learnt_rule_decisions(&self, _rule: RuleId) -> Vec<ProofStep> {
        Vec::new()
    }

    fn transaction(&self) -> Transaction {
        Transaction::default()
    }

    fn orphaned(&self) -> Vec<SolvableId> {
        Vec::new()
    }

    /// Recommended and suggested packages
    fn recommendations(&self) -> (Vec<SolvableId>, Vec<SolvableId>) {
        (Vec::new(), Vec::new())
    }

    /// Unneeded installed packages; with `filtered` only the subset that is
    /// not needed by other unneeded packages
    fn unneeded(&self, _filtered: bool) -> Vec<SolvableId> {
        Vec::new()
    }

    fn userinstalled(&self) -> Vec<SolvableId> {
        Vec::new()
    }

    /// Names of installed packages that were not installed by the user
    fn autoinstalled_names(&self) -> Vec<StrId> {
        Vec::new()
    }

    fn alternatives(&self) -> Vec<Alternative> {
        Vec::new()
    }

    fn describe_decision(&self, _p: SolvableId) -> (DecisionReason, Option<RuleId>) {
        (DecisionReason::Unrelated, None)
    }

    fn describe_weakdep_decision(&self, _p: SolvableId) -> Vec<WeakDepReason> {
        Vec::new()
    }

    fn cleandeps(&self) -> Vec<SolvableId> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(RuleClass::StrictRepoPriority.name(), "strictrepoprio");
        assert_eq!(rule_class_name(None), "unknown");
        assert_eq!(DecisionReason::WeakDep.name(), "weakdep");
        assert_eq!(DecisionReason::Premise.name(), "?");
    }

    #[test]
    fn test_transaction_lookups() {
        let mut trans = Transaction::default();
        trans.classes.insert(TransactionClass::Upgrade, vec![3]);
        trans.obsoleted_by.insert(3, 5);
        assert_eq!(trans.classify(TransactionClass::Upgrade), &[3]);
        assert!(trans.classify(TransactionClass::Erase).is_empty());
        assert_eq!(trans.obs_pkg(3), Some(5));
        assert!(trans.order_edges(3).is_empty());
    }
}
