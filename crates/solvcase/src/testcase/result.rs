//! Rendering a finished solver run as sorted fact lines.
//!
//! Every facet of [`ResultFlags`] contributes lines of its own grammar:
//!
//! ```text
//! install A-2-1.noarch@available A-1-1.noarch@system
//! problem 1f3c2a90 info nothing provides B needed by A-1-1.noarch
//! problem 1f3c2a90 solution 77aa0c4e deljob install name A
//! rule pkg 0b7d...  -A-1-1.noarch@available
//! reason A-2-1.noarch@available job 5e1c...
//! ```
//!
//! All lines are sorted together, so the output does not depend on the
//! order in which the solver reports things.

use bitflags::bitflags;

use super::grammar::job2str;
use super::ident::solvable2str;
use super::line_set::LineSet;
use super::stable_id::{alternative_id, problem_id, rule_id, solution_id};
use crate::error::{Diagnostics, ParseError};
use crate::job::Selector;
use crate::pool::{DepExpr, DepId, Pool, SolvableId};
use crate::solver::{
    rule_class_name, Alternative, AlternativeKind, DecisionReason, RuleClass, RuleId, RuleInfo,
    SolutionElement, Solver, TRANSACTION_CLASSES,
};

bitflags! {
    /// Result facets to dump
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ResultFlags: u32 {
        const TRANSACTION = 1 << 0;
        const PROBLEMS = 1 << 1;
        const ORPHANED = 1 << 2;
        const RECOMMENDED = 1 << 3;
        const UNNEEDED = 1 << 4;
        const ALTERNATIVES = 1 << 5;
        const RULES = 1 << 6;
        const GENID = 1 << 7;
        const REASON = 1 << 8;
        const CLEANDEPS = 1 << 9;
        const JOBS = 1 << 10;
        const USERINSTALLED = 1 << 11;
        const ORDER = 1 << 12;
        const ORDEREDGES = 1 << 13;
        const PROOF = 1 << 14;
    }
}

/// Facet names in canonical order
pub const RESULT_FLAG_NAMES: &[(ResultFlags, &str)] = &[
    (ResultFlags::TRANSACTION, "transaction"),
    (ResultFlags::PROBLEMS, "problems"),
    (ResultFlags::ORPHANED, "orphaned"),
    (ResultFlags::RECOMMENDED, "recommended"),
    (ResultFlags::UNNEEDED, "unneeded"),
    (ResultFlags::ALTERNATIVES, "alternatives"),
    (ResultFlags::RULES, "rules"),
    (ResultFlags::GENID, "genid"),
    (ResultFlags::REASON, "reason"),
    (ResultFlags::CLEANDEPS, "cleandeps"),
    (ResultFlags::JOBS, "jobs"),
    (ResultFlags::USERINSTALLED, "userinstalled"),
    (ResultFlags::ORDER, "order"),
    (ResultFlags::ORDEREDGES, "orderedges"),
    (ResultFlags::PROOF, "proof"),
];

impl ResultFlags {
    pub fn from_token(name: &str) -> Option<Self> {
        RESULT_FLAG_NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(flag, _)| *flag)
    }

    pub fn names(self) -> Vec<&'static str> {
        RESULT_FLAG_NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }

    /// Parse a comma separated facet list, reporting unknown names
    pub fn parse(text: &str, diag: &mut Diagnostics) -> Self {
        let mut flags = ResultFlags::empty();
        for name in text.split(',') {
            match ResultFlags::from_token(name) {
                Some(flag) => flags |= flag,
                None => diag.report(ParseError::UnknownResultFlag(name.to_string())),
            }
        }
        flags
    }
}

/// Describe the rule that caused a problem
pub fn problem_rule_info2str(pool: &Pool, info: &RuleInfo) -> String {
    let s = |p: SolvableId| pool.solvable2str(p);
    let d = |dep: DepId| pool.dep2str(dep);
    match info {
        RuleInfo::DistUpgrade { from } => {
            format!("{} does not belong to a distupgrade repository", s(*from))
        }
        RuleInfo::InfArch { from } => format!("{} has inferior architecture", s(*from)),
        RuleInfo::Update { from } => format!("problem with installed package {}", s(*from)),
        RuleInfo::Job { .. } => "conflicting requests".to_string(),
        RuleInfo::JobUnsupported => "unsupported request".to_string(),
        RuleInfo::JobNothingProvidesDep { dep } => format!("nothing provides requested {}", d(*dep)),
        RuleInfo::JobUnknownPackage { dep } => format!("package {} does not exist", d(*dep)),
        RuleInfo::JobProvidedBySystem { dep } => format!("{} is provided by the system", d(*dep)),
        RuleInfo::Pkg => "some dependency problem".to_string(),
        RuleInfo::Best { from: Some(from) } => {
            format!("cannot install the best update candidate for package {}", s(*from))
        }
        RuleInfo::Best { from: None } => "cannot install the best candidate for the job".to_string(),
        RuleInfo::PkgNotInstallable { from } => format!("package {} is not installable", s(*from)),
        RuleInfo::PkgNothingProvidesDep { from, dep } => {
            format!("nothing provides {} needed by {}", d(*dep), s(*from))
        }
        RuleInfo::PkgSameName { from, to } => format!("cannot install both {} and {}", s(*from), s(*to)),
        RuleInfo::PkgConflicts { from, to, dep } => format!(
            "package {} conflicts with {} provided by {}",
            s(*from),
            d(*dep),
            s(*to)
        ),
        RuleInfo::PkgObsoletes { from, to, dep } => format!(
            "package {} obsoletes {} provided by {}",
            s(*from),
            d(*dep),
            s(*to)
        ),
        RuleInfo::PkgInstalledObsoletes { from, to, dep } => format!(
            "installed package {} obsoletes {} provided by {}",
            s(*from),
            d(*dep),
            s(*to)
        ),
        RuleInfo::PkgImplicitObsoletes { from, to, dep } => format!(
            "package {} implicitly obsoletes {} provided by {}",
            s(*from),
            d(*dep),
            s(*to)
        ),
        RuleInfo::PkgRequires { from, dep } => format!(
            "package {} requires {}, but none of the providers can be installed",
            s(*from),
            d(*dep)
        ),
        RuleInfo::PkgSelfConflict { from, dep } => {
            format!("package {} conflicts with {} provided by itself", s(*from), d(*dep))
        }
        RuleInfo::PkgConstrains { from, to, dep } => format!(
            "package {} has constraint {} conflicting with {}",
            s(*from),
            d(*dep),
            s(*to)
        ),
        RuleInfo::YumObs { from, to, dep } => format!(
            "both package {} and {} obsolete {}",
            s(*from),
            s(*to),
            d(*dep)
        ),
        RuleInfo::Black { from } => {
            format!("package {} can only be installed by a direct request", s(*from))
        }
        RuleInfo::StrictRepoPriority { from } => {
            format!("package {} is excluded by strict repo priority", s(*from))
        }
        RuleInfo::Unknown => "bad problem rule type".to_string(),
    }
}

/// Human readable form of a job selector
pub fn select2str(pool: &Pool, select: &Selector) -> String {
    match select {
        Selector::Solvable(p) => pool.solvable2str(*p),
        Selector::Name(dep) => pool.dep2str(*dep),
        Selector::Provides(dep) => format!("package providing {}", pool.dep2str(*dep)),
        Selector::OneOf(list) if list.is_empty() => "nothing".to_string(),
        Selector::OneOf(list) => list
            .iter()
            .map(|&p| pool.solvable2str(p))
            .collect::<Vec<_>>()
            .join(", "),
        Selector::Repo(repo) => match pool.repo(*repo).and_then(|r| r.name.as_deref()) {
            Some(name) => format!("repo {}", name),
            None => format!("repo #{}", repo),
        },
        Selector::All => "all packages".to_string(),
        Selector::Unknown => "unknown job select".to_string(),
    }
}

/// Describe what an alternative chose between
pub fn alternative2str(pool: &Pool, solver: &dyn Solver, alt: &Alternative) -> String {
    match alt.kind {
        AlternativeKind::Recommends { from, dep } => {
            format!("{}, recommended by {}", pool.dep2str(dep), pool.solvable2str(from))
        }
        AlternativeKind::Rule(mut rule) => {
            if matches!(
                solver.rule_class(rule),
                Some(RuleClass::Choice | RuleClass::Recommends)
            ) {
                rule = solver.origin_pkg_rule(rule);
            }
            match solver.rule_info(rule) {
                RuleInfo::Job {
                    select: Some(Selector::Provides(dep)),
                } => pool.dep2str(dep),
                RuleInfo::Job { select: Some(select) } => select2str(pool, &select),
                RuleInfo::Job { select: None } => "unknown job select".to_string(),
                RuleInfo::PkgRequires { from, dep } => {
                    format!("{}, required by {}", pool.dep2str(dep), pool.solvable2str(from))
                }
                _ => format!("Rule #{}", rule),
            }
        }
    }
}

/// Push the post-order walk of a dependency tree; returns the next counter
fn dump_genid(out: &mut LineSet, expr: &DepExpr, mut cnt: usize) -> usize {
    let line = match expr {
        DepExpr::Rel(name, op, evr) => {
            cnt = dump_genid(out, name, cnt);
            cnt = dump_genid(out, evr, cnt);
            format!("genid {:2}: genid op {}", cnt, op.name())
        }
        DepExpr::Lit(s) => format!("genid {:2}: genid lit {}", cnt, s),
        DepExpr::Null => format!("genid {:2}: genid null", cnt),
    };
    out.push(line);
    cnt + 1
}

struct Dumper<'a> {
    pool: &'a Pool,
    solver: &'a dyn Solver,
    out: LineSet,
}

impl Dumper<'_> {
    fn name(&self, p: SolvableId) -> String {
        solvable2str(self.pool, p)
    }

    fn rule_id(&self, rule: RuleId) -> String {
        rule_id(self.pool, self.solver, rule)
    }

    fn transaction(&mut self) {
        let trans = self.solver.transaction();
        for (class, class_name) in TRANSACTION_CLASSES {
            for &p in trans.classify(*class) {
                let mut line = format!("{} {}", class_name, self.name(p));
                if self.pool.is_installed(p) {
                    if let Some(obs) = trans.obs_pkg(p) {
                        line.push(' ');
                        line.push_str(&self.name(obs));
                    }
                }
                self.out.push(line);
            }
        }
    }

    fn problems(&mut self) {
        for problem in 1..=self.solver.problem_count() {
            let pid = problem_id(self.pool, self.solver, problem);
            let info = self
                .solver
                .problem_rule(problem)
                .map(|rule| self.solver.rule_info(rule))
                .unwrap_or(RuleInfo::Unknown);
            self.out.push(format!(
                "problem {} info {}",
                pid,
                problem_rule_info2str(self.pool, &info)
            ));
            for solution in 1..=self.solver.solution_count(problem) {
                let prefix = format!(
                    "problem {} solution {}",
                    pid,
                    solution_id(self.pool, self.solver, problem, solution)
                );
                for element in self.solver.solution_elements(problem, solution) {
                    let text = match element {
                        SolutionElement::DeleteJob(index) => match self.solver.jobs().get(index) {
                            Some(job) => format!("deljob {}", job2str(self.pool, job)),
                            None => "unknown".to_string(),
                        },
                        SolutionElement::Erase(p) => format!("erase {}", self.name(p)),
                        SolutionElement::Replace(p, q) => {
                            format!("replace {} {}", self.name(p), self.name(q))
                        }
                        SolutionElement::Allow(p) => format!("allow {}", self.name(p)),
                        SolutionElement::Unknown => "unknown".to_string(),
                    };
                    self.out.push_joined(&prefix, " ", &text);
                }
            }
        }
    }

    fn proof(&mut self) {
        let problems = self.solver.problem_count();
        let mut learnt: Vec<RuleId> = Vec::new();
        let mut block = 1;
        while block <= problems + learnt.len() {
            let (id, steps) = if block <= problems {
                (
                    problem_id(self.pool, self.solver, block),
                    self.solver.problem_decisions(block),
                )
            } else {
                let rule = learnt[block - problems - 1];
                (self.rule_id(rule), self.solver.learnt_rule_decisions(rule))
            };
            for (n, step) in steps.iter().enumerate() {
                let class = self.solver.rule_class(step.rule);
                if class == Some(RuleClass::Learnt) && !learnt.contains(&step.rule) {
                    learnt.push(step.rule);
                }
                let header = format!("proof {} {:3}", id, n);
                let literals = if step.premise {
                    self.out.push(format!("{} premise", header));
                    vec![step.literal]
                } else {
                    self.out.push(format!(
                        "{} {} {}",
                        header,
                        rule_class_name(class),
                        self.rule_id(step.rule)
                    ));
                    self.solver.rule_literals(step.rule)
                };
                for lit in literals {
                    let marker = if lit == step.literal { "-->" } else { "   " };
                    let sign = if lit < 0 { " -" } else { "  " };
                    self.out
                        .push(format!("{}: {}{}{}", header, marker, sign, self.name(lit.abs())));
                }
            }
            block += 1;
        }
    }

    fn package_list(&mut self, prefix: &str, packages: Vec<SolvableId>) {
        for p in packages {
            let name = self.name(p);
            self.out.push_joined(prefix, " ", &name);
        }
    }

    fn unneeded(&mut self) {
        let all = self.solver.unneeded(false);
        let filtered = self.solver.unneeded(true);
        let mut j = 0;
        for p in all {
            // the filtered list is an ordered subset of the full one
            let prefix = if filtered.get(j) == Some(&p) {
                j += 1;
                "unneeded_filtered"
            } else {
                "unneeded"
            };
            let name = self.name(p);
            self.out.push_joined(prefix, " ", &name);
        }
    }

    fn userinstalled(&mut self) {
        self.package_list("userinstalled pkg", self.solver.userinstalled());
        for name in self.solver.autoinstalled_names() {
            self.out.push_joined("autoinst name ", self.pool.id2str(name), "");
        }
    }

    fn order(&mut self) {
        let trans = self.solver.transaction();
        for (i, &p) in trans.steps.iter().enumerate() {
            let action = if self.pool.is_installed(p) { "erase" } else { "install" };
            self.out
                .push(format!("order {:4} {} {}", i + 1, action, self.name(p)));
        }
    }

    fn orderedges(&mut self) {
        let trans = self.solver.transaction();
        for &p in &trans.steps {
            for &(p2, kind) in trans.order_edges(p) {
                self.out.push(format!(
                    "orderedge {} -{:x}-> {}",
                    self.name(p),
                    kind,
                    self.name(p2)
                ));
            }
        }
    }

    fn alternatives(&mut self) {
        for alt in self.solver.alternatives() {
            let prefix = format!("alternative {} ", alternative_id(self.pool, self.solver, &alt.kind));
            self.out.push(format!(
                "{} 0 {}",
                prefix,
                alternative2str(self.pool, self.solver, &alt)
            ));
            for (i, &p) in alt.choices.iter().enumerate() {
                let mark = if -p == alt.chosen {
                    "+ "
                } else if p < 0 {
                    "- "
                } else {
                    "  "
                };
                self.out
                    .push(format!("{}{:2} {}{}", prefix, i + 1, mark, self.name(p.abs())));
            }
        }
    }

    fn rules(&mut self) {
        for rule in 1..=self.solver.rule_count() {
            let Some(class) = self.solver.rule_class(rule) else {
                break;
            };
            let literals = self.solver.rule_literals(rule);
            if class == RuleClass::Feature && literals == [-crate::pool::SYSTEM_SOLVABLE] {
                continue;
            }
            let prefix = format!("rule {} {}", class.name(), self.rule_id(rule));
            for lit in literals {
                let sign = if lit < 0 { " -" } else { "  " };
                let name = self.name(lit.abs());
                self.out.push_joined(&prefix, sign, &name);
            }
        }
    }

    fn genid(&mut self) {
        for job in self.solver.jobs() {
            let &Selector::Provides(dep) = &job.select else {
                continue;
            };
            if job.op != crate::job::JobOp::Noop || !job.flags.is_empty() {
                continue;
            }
            let text = self.pool.dep2str(dep);
            let expr = self.pool.dep_expr(dep);
            self.out.push_joined("genid dep ", &text, "");
            let reparsed = DepExpr::parse(&text).unwrap_or(DepExpr::Null);
            if reparsed != expr {
                self.out
                    .push(format!("genid roundtrip error: {}", reparsed));
            }
            dump_genid(&mut self.out, &expr, 1);
        }
    }

    fn reason(&mut self) {
        for p in self.pool.solvable_ids() {
            let (reason, info) = self.solver.describe_decision(p);
            if reason == DecisionReason::Unrelated {
                continue;
            }
            if reason == DecisionReason::WeakDep {
                let why = self.solver.describe_weakdep_decision(p);
                if !why.is_empty() {
                    for w in why {
                        let mut line = format!(
                            "reason {} {} {}",
                            self.name(p),
                            w.reason.name(),
                            self.pool.dep2str(w.dep)
                        );
                        if let Some(from) = w.from {
                            line.push(' ');
                            line.push_str(&self.name(from));
                        }
                        self.out.push(line);
                    }
                    continue;
                }
            }
            let mut line = format!("reason {} {}", self.name(p), reason.name());
            if let Some(rule) = info {
                line.push(' ');
                line.push_str(&self.rule_id(rule));
            }
            self.out.push(line);
        }
    }

    fn jobs(&mut self) {
        for job in self.solver.jobs() {
            let text = job2str(self.pool, job);
            self.out.push_joined("job ", &text, "");
        }
    }
}

/// Dump the requested facets of a solver run as sorted, newline terminated lines
pub fn solver_result(pool: &Pool, solver: &dyn Solver, flags: ResultFlags) -> String {
    let mut dumper = Dumper {
        pool,
        solver,
        out: LineSet::new(),
    };
    if flags.contains(ResultFlags::TRANSACTION) {
        dumper.transaction();
    }
    if flags.contains(ResultFlags::PROBLEMS) {
        dumper.problems();
    }
    if flags.contains(ResultFlags::PROOF) {
        dumper.proof();
    }
    if flags.contains(ResultFlags::ORPHANED) {
        dumper.package_list("orphaned", solver.orphaned());
    }
    if flags.contains(ResultFlags::RECOMMENDED) {
        let (recommended, suggested) = solver.recommendations();
        dumper.package_list("recommended", recommended);
        dumper.package_list("suggested", suggested);
    }
    if flags.contains(ResultFlags::UNNEEDED) {
        dumper.unneeded();
    }
    if flags.contains(ResultFlags::USERINSTALLED) {
        dumper.userinstalled();
    }
    if flags.contains(ResultFlags::ORDER) {
        dumper.order();
    }
    if flags.contains(ResultFlags::ORDEREDGES) {
        dumper.orderedges();
    }
    if flags.contains(ResultFlags::ALTERNATIVES) {
        dumper.alternatives();
    }
    if flags.contains(ResultFlags::RULES) {
        dumper.rules();
    }
    if flags.contains(ResultFlags::GENID) {
        dumper.genid();
    }
    if flags.contains(ResultFlags::REASON) {
        dumper.reason();
    }
    if flags.contains(ResultFlags::CLEANDEPS) {
        dumper.package_list("cleandeps", solver.cleandeps());
    }
    if flags.contains(ResultFlags::JOBS) {
        dumper.jobs();
    }
    dumper.out.sort();
    dumper.out.join()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{Job, JobFlags, JobOp};
    use crate::pool::{DepKind, RelOp, RepoId};
    use crate::solver::{
        ProblemRecord, ProofStep, RuleRecord, SolutionOrigin, SolutionRecord, SolverSnapshot,
        Transaction, TransactionClass, WeakDepReason,
    };

    fn pkg(pool: &mut Pool, repo: RepoId, name: &str, evr: &str) -> SolvableId {
        let mut s = pool.new_solvable(name, evr, Some("noarch"));
        let provide = pool.rel2id(DepId::Str(s.name), DepId::Str(s.evr), RelOp::Eq);
        s.add_dep(DepKind::Provides, provide);
        pool.add_solvable(repo, s)
    }

    struct Fixture {
        pool: Pool,
        old: SolvableId,
        new: SolvableId,
        b: SolvableId,
    }

    fn fixture() -> Fixture {
        let mut pool = Pool::new();
        let system = pool.add_repo(Some("system"));
        let avail = pool.add_repo(Some("available"));
        let old = pkg(&mut pool, system, "A", "1-1");
        let new = pkg(&mut pool, avail, "A", "2-1");
        let b = pkg(&mut pool, avail, "B", "1-1");
        pool.set_installed(Some(system));
        pool.create_whatprovides();
        Fixture { pool, old, new, b }
    }

    #[test]
    fn test_flag_names() {
        let mut diag = Diagnostics::new();
        let flags = ResultFlags::parse("transaction,problems,bogus", &mut diag);
        assert_eq!(flags, ResultFlags::TRANSACTION | ResultFlags::PROBLEMS);
        assert_eq!(diag.len(), 1);
        assert_eq!(
            (ResultFlags::PROOF | ResultFlags::TRANSACTION).names(),
            vec!["transaction", "proof"]
        );
    }

    #[test]
    fn test_transaction_and_order() {
        let f = fixture();
        let mut snap = SolverSnapshot::default();
        let mut trans = Transaction::default();
        trans.classes.insert(TransactionClass::Upgrade, vec![f.old]);
        trans.classes.insert(TransactionClass::Install, vec![f.b]);
        trans.obsoleted_by.insert(f.old, f.new);
        trans.steps = vec![f.old, f.new, f.b];
        trans.edges.insert(f.new, vec![(f.b, 0x10)]);
        snap.transaction = trans;

        let out = solver_result(
            &f.pool,
            &snap,
            ResultFlags::TRANSACTION | ResultFlags::ORDER | ResultFlags::ORDEREDGES,
        );
        assert_eq!(
            out,
            "install B-1-1.noarch@available\n\
             order    1 erase A-1-1.noarch@system\n\
             order    2 install A-2-1.noarch@available\n\
             order    3 install B-1-1.noarch@available\n\
             orderedge A-2-1.noarch@available -10-> B-1-1.noarch@available\n\
             upgrade A-1-1.noarch@system A-2-1.noarch@available\n"
        );
    }

    #[test]
    fn test_problems() {
        let mut f = fixture();
        let c = f.pool.str2id("C");
        let missing = DepId::Str(c);
        let mut snap = SolverSnapshot::default();
        snap.jobs = vec![Job::new(JobOp::Install, Selector::Solvable(f.b))];
        let rule = snap.add_rule(
            RuleRecord::new(RuleClass::Pkg, vec![-f.b]).with_info(RuleInfo::PkgNothingProvidesDep {
                from: f.b,
                dep: missing,
            }),
        );
        snap.add_problem(ProblemRecord {
            rule: Some(rule),
            rules: vec![rule],
            solutions: vec![SolutionRecord {
                origin: SolutionOrigin::Job(0),
                elements: vec![SolutionElement::DeleteJob(0)],
            }],
            decisions: vec![],
        });
        let out = solver_result(&f.pool, &snap, ResultFlags::PROBLEMS);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        let pid = problem_id(&f.pool, &snap, 1);
        let sid = solution_id(&f.pool, &snap, 1, 1);
        assert_eq!(
            lines[0],
            format!("problem {} info nothing provides C needed by B-1-1.noarch", pid)
        );
        assert_eq!(
            lines[1],
            format!("problem {} solution {} deljob install pkg B-1-1.noarch@available", pid, sid)
        );
    }

    #[test]
    fn test_proof_follows_learnt_rules() {
        let f = fixture();
        let mut snap = SolverSnapshot::default();
        let job = snap.add_rule(RuleRecord::new(RuleClass::Job, vec![f.b]));
        let learnt = snap.add_rule(
            RuleRecord::new(RuleClass::Learnt, vec![-f.b]).with_decisions(vec![ProofStep::premise(f.b, job)]),
        );
        snap.add_problem(ProblemRecord {
            rule: Some(job),
            rules: vec![job, learnt],
            solutions: vec![],
            decisions: vec![ProofStep::premise(f.b, job), ProofStep::derived(-f.b, learnt)],
        });
        let out = solver_result(&f.pool, &snap, ResultFlags::PROOF);
        let pid = problem_id(&f.pool, &snap, 1);
        let lid = rule_id(&f.pool, &snap, learnt);
        assert!(out.contains(&format!("proof {}   0 premise\n", pid)));
        assert!(out.contains(&format!("proof {}   0: -->  B-1-1.noarch@available\n", pid)));
        assert!(out.contains(&format!("proof {}   1 learnt {}\n", pid, lid)));
        assert!(out.contains(&format!("proof {}   1: --> -B-1-1.noarch@available\n", pid)));
        assert!(out.contains(&format!("proof {}   0 premise\n", lid)));
    }

    #[test]
    fn test_rules_skip_system_feature_rule() {
        let f = fixture();
        let mut snap = SolverSnapshot::default();
        snap.add_rule(RuleRecord::new(RuleClass::Feature, vec![-1]));
        let pkg_rule = snap.add_rule(RuleRecord::new(RuleClass::Pkg, vec![-f.new, f.b]));
        let out = solver_result(&f.pool, &snap, ResultFlags::RULES);
        let rid = rule_id(&f.pool, &snap, pkg_rule);
        assert_eq!(
            out,
            format!(
                "rule pkg {rid}  B-1-1.noarch@available\nrule pkg {rid} -A-2-1.noarch@available\n"
            )
        );
    }

    #[test]
    fn test_genid() {
        let mut f = fixture();
        let dep = f.pool.parse_dep("A > 1 | B").unwrap();
        let mut snap = SolverSnapshot::default();
        snap.jobs = vec![
            Job::new(JobOp::Noop, Selector::Provides(dep)),
            Job::new(JobOp::Noop, Selector::Provides(dep)).with_flags(JobFlags::WEAK),
        ];
        let out = solver_result(&f.pool, &snap, ResultFlags::GENID);
        assert_eq!(
            out,
            "genid  1: genid lit A\n\
             genid  2: genid lit 1\n\
             genid  3: genid op >\n\
             genid  4: genid lit B\n\
             genid  5: genid op |\n\
             genid dep A > 1 | B\n"
        );
    }

    #[test]
    fn test_genid_arch_roundtrip_error() {
        let mut f = fixture();
        let name = f.pool.str2id("A");
        let arch = f.pool.str2id("noarch");
        let dep = f.pool.rel2id(DepId::Str(name), DepId::Str(arch), RelOp::Arch);
        let mut snap = SolverSnapshot::default();
        snap.jobs = vec![Job::new(JobOp::Noop, Selector::Provides(dep))];
        let out = solver_result(&f.pool, &snap, ResultFlags::GENID);
        assert!(out.contains("genid dep A.noarch\n"));
        assert!(out.contains("genid roundtrip error: A.noarch\n"));
        assert!(out.contains("genid  3: genid op .\n"));
    }

    #[test]
    fn test_reason_and_weakdeps() {
        let f = fixture();
        let mut snap = SolverSnapshot::default();
        let rule = snap.add_rule(RuleRecord::new(RuleClass::Job, vec![f.new]));
        snap.decide(f.new, DecisionReason::ResolveJob, Some(rule));
        snap.decide(f.b, DecisionReason::WeakDep, None);
        snap.weakdeps.insert(
            f.b,
            vec![WeakDepReason {
                reason: DecisionReason::Recommended,
                from: Some(f.new),
                dep: DepId::Str(f.pool.lookup_str("B").unwrap()),
            }],
        );
        let out = solver_result(&f.pool, &snap, ResultFlags::REASON);
        let rid = rule_id(&f.pool, &snap, rule);
        assert_eq!(
            out,
            format!(
                "reason A-2-1.noarch@available job {rid}\n\
                 reason B-1-1.noarch@available recommended B A-2-1.noarch@available\n"
            )
        );
    }

    #[test]
    fn test_alternatives() {
        let f = fixture();
        let mut snap = SolverSnapshot::default();
        let dep = DepId::Str(f.pool.lookup_str("B").unwrap());
        let kind = AlternativeKind::Recommends { from: f.new, dep };
        snap.alternatives = vec![Alternative {
            kind,
            chosen: f.b,
            choices: vec![-f.b, f.old],
        }];
        let out = solver_result(&f.pool, &snap, ResultFlags::ALTERNATIVES);
        let aid = alternative_id(&f.pool, &snap, &kind);
        assert_eq!(
            out,
            format!(
                "alternative {aid}  0 B, recommended by A-2-1.noarch\n\
                 alternative {aid}  1 + B-1-1.noarch@available\n\
                 alternative {aid}  2   A-1-1.noarch@system\n"
            )
        );
    }

    #[test]
    fn test_unneeded_filtered_subset() {
        let f = fixture();
        let mut snap = SolverSnapshot::default();
        snap.unneeded = vec![f.old, f.b];
        snap.unneeded_filtered = vec![f.b];
        let out = solver_result(&f.pool, &snap, ResultFlags::UNNEEDED);
        assert_eq!(
            out,
            "unneeded A-1-1.noarch@system\nunneeded_filtered B-1-1.noarch@available\n"
        );
    }
}
