//! Reading a testcase script back into a pool and a job queue.
//!
//! A script is a sequence of directives, one per line:
//!
//! ```text
//! repo system 0 testtags system.repo
//! repo available 0 testtags <inline>
//! #>=Pkg: A 2 1 noarch
//! system x86_64 rpm system
//! job install name A
//! result transaction,problems solver.result
//! nextjob
//! ```
//!
//! Each call to [`TestcaseReader::read`] consumes one pass, up to the next
//! `nextjob` line or the end of input. Malformed directives are reported as
//! [`Diagnostic`]s and skipped.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Cursor};
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;

use super::escape::unescape;
use super::grammar::{add_selection_job, str2job, str2namespace, str2select, SelectionKind};
use super::ident::{str2repo, str2solvable};
use super::result::ResultFlags;
use crate::error::{Diagnostic, Diagnostics, ParseError, Result, TestcaseError};
use crate::flags::SolverFlags;
use crate::job::{Job, JobOp, Selector};
use crate::pool::{evrcmp, ArchPolicy, DepId, DistType, EvrMode, Pool, RelOp, StrId};
use crate::repo::{open_repo_file, RepoFormats};

/// Features every reader supports
const BUILTIN_FEATURES: &[&str] = &["complex_deps"];

const INLINE: &str = "<inline>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Directive {
    Repo,
    System,
    Job,
    VendorClass,
    Namespace,
    PoolFlags,
    SolverFlags,
    Disable,
    Result,
    GenId,
    AutoInst,
    EvrCmp,
    Feature,
    NextJob,
}

/// Piece count limits, the directive name included
struct Arity {
    min: usize,
    max: Option<usize>,
}

lazy_static! {
    static ref DIRECTIVES: HashMap<&'static str, (Directive, Arity)> = {
        let table = [
            ("repo", Directive::Repo, 4, None),
            ("system", Directive::System, 3, None),
            ("job", Directive::Job, 2, None),
            ("vendorclass", Directive::VendorClass, 2, None),
            ("namespace", Directive::Namespace, 2, None),
            ("poolflags", Directive::PoolFlags, 1, None),
            ("solverflags", Directive::SolverFlags, 2, None),
            ("disable", Directive::Disable, 3, Some(3)),
            ("result", Directive::Result, 2, None),
            ("genid", Directive::GenId, 2, None),
            ("autoinst", Directive::AutoInst, 3, None),
            ("evrcmp", Directive::EvrCmp, 3, Some(3)),
            ("feature", Directive::Feature, 1, None),
            ("nextjob", Directive::NextJob, 1, None),
        ];
        table
            .into_iter()
            .map(|(name, directive, min, max)| (name, (directive, Arity { min, max })))
            .collect()
    };
}

fn lookup_directive(pieces: &[&str]) -> Option<Directive> {
    let (directive, arity) = DIRECTIVES.get(*pieces.first()?)?;
    let fits = pieces.len() >= arity.min && arity.max.map_or(true, |max| pieces.len() <= max);
    fits.then_some(*directive)
}

/// State of the provider index during a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Indexing {
    /// Not built since the last repo or system change
    #[default]
    Unindexed,
    Indexed,
    /// Packages were disabled after indexing
    Disabled,
}

/// Reader configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Feature names accepted in addition to the built-in ones
    pub features: Vec<String>,
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feature(mut self, name: impl Into<String>) -> Self {
        self.features.push(name.into());
        self
    }

    pub fn supports(&self, feature: &str) -> bool {
        BUILTIN_FEATURES.contains(&feature) || self.features.iter().any(|f| f == feature)
    }
}

/// Everything one pass of a script produced
#[derive(Debug, Clone)]
pub struct Testcase {
    pub jobs: Vec<Job>,
    pub solver_flags: SolverFlags,
    /// Expected result text, if the script names one
    pub result: Option<String>,
    pub result_flags: ResultFlags,
    /// The pass ended with `nextjob reusesolver`
    pub reuse_solver: bool,
    pub indexing: Indexing,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone)]
pub enum ReadOutcome {
    Ready(Testcase),
    /// The script needs features this reader lacks
    Skip {
        missing: Vec<String>,
        diagnostics: Vec<Diagnostic>,
    },
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    EndPass,
    Stop,
}

#[derive(Default)]
struct Pass {
    indexing: Indexing,
    solver_flags: Option<SolverFlags>,
    poolflags_reset: bool,
    jobs: Vec<Job>,
    genid: Vec<DepId>,
    autoinst: Vec<StrId>,
    result: Option<String>,
    result_flags: ResultFlags,
    reuse_solver: bool,
    missing: Vec<String>,
    diag: Diagnostics,
}

impl Pass {
    fn ensure_indexed(&mut self, pool: &mut Pool) {
        if self.indexing != Indexing::Indexed {
            pool.create_whatprovides();
            self.indexing = Indexing::Indexed;
        }
    }

    fn reset_pool_flags(&mut self, pool: &mut Pool) {
        if !self.poolflags_reset {
            self.poolflags_reset = true;
            pool.flags.reset();
        }
    }
}

/// C `atoi`: optional sign and leading digits, 0 if there are none
fn atoi(s: &str) -> i32 {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
    digits[..end].parse::<i32>().map(|n| sign * n).unwrap_or(0)
}

fn parse_priority(text: &str) -> (i32, i32) {
    if let Some((prio, sub)) = text.split_once('.') {
        if let (Ok(prio), Ok(sub)) = (prio.parse(), sub.parse()) {
            return (prio, sub);
        }
    }
    (atoi(text), 0)
}

/// Reads testcase scripts pass by pass
pub struct TestcaseReader {
    input: Box<dyn BufRead>,
    dir: PathBuf,
    line_no: usize,
    pushback: Option<String>,
    eof: bool,
    formats: RepoFormats,
    options: ReadOptions,
}

impl std::fmt::Debug for TestcaseReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestcaseReader")
            .field("dir", &self.dir)
            .field("line_no", &self.line_no)
            .field("eof", &self.eof)
            .field("formats", &self.formats)
            .field("options", &self.options)
            .finish()
    }
}

impl TestcaseReader {
    /// Open a script; side files are resolved relative to its directory
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| TestcaseError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(Self::from_reader(BufReader::new(file), dir))
    }

    pub fn from_reader(input: impl BufRead + 'static, dir: impl Into<PathBuf>) -> Self {
        Self {
            input: Box::new(input),
            dir: dir.into(),
            line_no: 0,
            pushback: None,
            eof: false,
            formats: RepoFormats::default(),
            options: ReadOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ReadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_formats(mut self, formats: RepoFormats) -> Self {
        self.formats = formats;
        self
    }

    /// Whether the whole input has been consumed
    pub fn is_finished(&self) -> bool {
        self.eof && self.pushback.is_none()
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        if let Some(line) = self.pushback.take() {
            return Ok(Some(line));
        }
        if self.eof {
            return Ok(None);
        }
        let mut buf = Vec::new();
        let n = self
            .input
            .read_until(b'\n', &mut buf)
            .map_err(|source| TestcaseError::Read {
                path: self.dir.clone(),
                source,
            })?;
        if n == 0 {
            self.eof = true;
            return Ok(None);
        }
        self.line_no += 1;
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }

    /// Collect `#>` lines; the first other line is pushed back
    fn read_inline(&mut self) -> Result<String> {
        let mut out = String::new();
        while let Some(line) = self.next_line()? {
            match line.strip_prefix("#>") {
                Some(content) => {
                    out.push_str(content);
                    out.push('\n');
                }
                None => {
                    self.pushback = Some(line);
                    break;
                }
            }
        }
        Ok(out)
    }

    /// Read one pass into `pool`
    pub fn read(&mut self, pool: &mut Pool) -> Result<ReadOutcome> {
        let mut pass = Pass::default();
        while let Some(line) = self.next_line()? {
            let trimmed = line.trim_start_matches([' ', '\t']);
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let pieces: Vec<&str> = trimmed.split([' ', '\t']).filter(|p| !p.is_empty()).collect();
            pass.diag.set_line(self.line_no);
            let Some(directive) = lookup_directive(&pieces) else {
                pass.diag
                    .report(ParseError::UnknownCommand(pieces[0].to_string()));
                continue;
            };
            log::debug!("line {}: {:?}", self.line_no, directive);
            match self.directive(pool, &mut pass, directive, &pieces)? {
                Flow::Continue => {}
                Flow::EndPass | Flow::Stop => break,
            }
        }
        pass.diag.set_line(0);
        Ok(self.finish_pass(pool, pass))
    }

    fn finish_pass(&self, pool: &mut Pool, mut pass: Pass) -> ReadOutcome {
        while let Some(dep) = pass.genid.pop() {
            pass.jobs.push(Job::new(JobOp::Noop, Selector::Provides(dep)));
        }
        if !pass.autoinst.is_empty() {
            add_userinstalled_jobs(pool, &pass.autoinst, &mut pass.jobs);
        }
        if pass.indexing == Indexing::Unindexed {
            pool.create_whatprovides();
            pass.indexing = Indexing::Indexed;
        }
        let diagnostics = pass.diag.take();
        if !pass.missing.is_empty() {
            return ReadOutcome::Skip {
                missing: pass.missing,
                diagnostics,
            };
        }
        ReadOutcome::Ready(Testcase {
            jobs: pass.jobs,
            solver_flags: pass.solver_flags.unwrap_or_default(),
            result: pass.result,
            result_flags: pass.result_flags,
            reuse_solver: pass.reuse_solver,
            indexing: pass.indexing,
            diagnostics,
        })
    }

    fn directive(&mut self, pool: &mut Pool, pass: &mut Pass, directive: Directive, pieces: &[&str]) -> Result<Flow> {
        match directive {
            Directive::Repo => self.repo(pool, pass, pieces)?,
            Directive::System => system(pool, pass, pieces),
            Directive::Job => job(pool, pass, pieces),
            Directive::VendorClass => {
                let class = pieces[1..].iter().map(|t| unescape(t).into_owned()).collect();
                pool.add_vendor_class(class);
            }
            Directive::Namespace => namespace(pool, pass, pieces),
            Directive::PoolFlags => {
                pass.reset_pool_flags(pool);
                for piece in &pieces[1..] {
                    for name in pool.flags.apply(piece) {
                        pass.diag.report(ParseError::UnknownPoolFlag(name));
                    }
                }
            }
            Directive::SolverFlags => {
                let flags = pass.solver_flags.get_or_insert_with(SolverFlags::default);
                for piece in &pieces[1..] {
                    for name in flags.apply(piece) {
                        pass.diag.report(ParseError::UnknownSolverFlag(name));
                    }
                }
            }
            Directive::Disable => disable(pool, pass, pieces),
            Directive::Result => self.result(pass, pieces)?,
            Directive::GenId => genid(pool, pass, pieces),
            Directive::AutoInst => {
                if pieces[1] == "name" {
                    pass.autoinst.push(pool.str2id(pieces[2]));
                } else {
                    pass.diag
                        .report(ParseError::directive("autoinst", "illegal mode"));
                }
            }
            Directive::EvrCmp => {
                let order = evrcmp(pieces[1], pieces[2], EvrMode::Compare);
                let op = match order {
                    std::cmp::Ordering::Less => RelOp::Lt,
                    std::cmp::Ordering::Equal => RelOp::Eq,
                    std::cmp::Ordering::Greater => RelOp::Gt,
                };
                let evr1 = DepId::Str(pool.str2id(pieces[1]));
                let evr2 = DepId::Str(pool.str2id(pieces[2]));
                let dep = pool.rel2id(evr1, evr2, op);
                pass.jobs.push(Job::new(JobOp::Noop, Selector::Provides(dep)));
            }
            Directive::Feature => {
                for feature in &pieces[1..] {
                    if !self.options.supports(feature) {
                        pass.diag
                            .report(ParseError::MissingFeature(feature.to_string()));
                        pass.missing.push(feature.to_string());
                    }
                }
                if !pass.missing.is_empty() {
                    return Ok(Flow::Stop);
                }
            }
            Directive::NextJob => {
                if pieces.len() == 2 && pieces[1] == "reusesolver" {
                    pass.reuse_solver = true;
                }
                return Ok(Flow::EndPass);
            }
        }
        Ok(Flow::Continue)
    }

    fn repo(&mut self, pool: &mut Pool, pass: &mut Pass, pieces: &[&str]) -> Result<()> {
        let rejected = if pool.has_considered_map() {
            Some("cannot add repos after packages were disabled")
        } else if pass.solver_flags.is_some() {
            Some("cannot add repos after the solver was created")
        } else if !pass.jobs.is_empty() {
            Some("cannot add repos after jobs have been created")
        } else {
            None
        };
        if let Some(message) = rejected {
            pass.diag.report(ParseError::directive("repo", message));
            return Ok(());
        }
        pass.indexing = Indexing::Unindexed;
        pass.reset_pool_flags(pool);

        let repo = pool.add_repo(Some(pieces[1]));
        let (priority, subpriority) = parse_priority(pieces[2]);
        if let Some(r) = pool.repo_mut(repo) {
            r.priority = priority;
            r.subpriority = subpriority;
        }

        let kind = pieces[3];
        if kind == "empty" || pieces.len() <= 4 {
            return Ok(());
        }
        let mut input: Box<dyn BufRead> = if pieces[4] == INLINE {
            Box::new(Cursor::new(self.read_inline()?))
        } else {
            match open_repo_file(&self.dir.join(pieces[4])) {
                Ok(input) => input,
                Err(e) => {
                    pass.diag.report(ParseError::directive("repo", e.to_string()));
                    return Ok(());
                }
            }
        };
        match self.formats.get(kind) {
            Some(format) => {
                if let Err(e) = format.load(pool, repo, &mut input) {
                    pass.diag.report(ParseError::directive("repo", e.to_string()));
                }
            }
            None => pass
                .diag
                .report(ParseError::UnknownRepoFormat(kind.to_string())),
        }
        Ok(())
    }

    fn result(&mut self, pass: &mut Pass, pieces: &[&str]) -> Result<()> {
        pass.result_flags = ResultFlags::parse(pieces[1], &mut pass.diag);
        pass.result = None;
        if let Some(&target) = pieces.get(2) {
            if target == INLINE {
                pass.result = Some(self.read_inline()?);
            } else {
                let path = self.dir.join(target);
                match fs::read_to_string(&path) {
                    Ok(text) => pass.result = Some(text),
                    Err(e) => pass.diag.report(ParseError::directive(
                        "result",
                        format!("could not open '{}': {}", path.display(), e),
                    )),
                }
            }
        }
        Ok(())
    }
}

fn system(pool: &mut Pool, pass: &mut Pass, pieces: &[&str]) {
    if !pass.jobs.is_empty() {
        pass.diag.report(ParseError::directive(
            "system",
            "cannot change the system after jobs have been created",
        ));
        return;
    }
    pass.indexing = Indexing::Unindexed;
    if pieces[2] != "*" {
        match pieces[2].split(',').find_map(DistType::from_name) {
            Some(disttype) => pool.set_disttype(disttype),
            None => {
                pass.diag
                    .report(ParseError::UnsupportedDistType(pieces[2].to_string()));
                pass.missing.push(pieces[2].to_string());
            }
        }
    }
    match pieces[1] {
        "unset" | "-" => pool.set_arch(None),
        arch => match arch.strip_prefix(':') {
            Some(policy) => pool.set_arch_policy(Some(ArchPolicy::from_policy(policy))),
            None => pool.set_arch(Some(arch)),
        },
    }
    if let Some(&name) = pieces.get(3) {
        match str2repo(pool, name) {
            Some(repo) => pool.set_installed(Some(repo)),
            None => pass.diag.report(ParseError::UnknownRepo(name.to_string())),
        }
    }
}

fn job(pool: &mut Pool, pass: &mut Pass, pieces: &[&str]) {
    pass.ensure_indexed(pool);
    let keyword = pieces.get(2).copied().unwrap_or("");
    let keyname = pieces.get(3).copied();
    let outcome = match SelectionKind::from_keyword(keyword, keyname) {
        Some(Ok(SelectionKind::Pattern)) => {
            add_selection_job(pool, &pieces[1..], SelectionKind::Pattern, &mut pass.jobs, &mut pass.diag)
        }
        Some(_) if pieces.len() < 4 => Err(ParseError::BadLine(pieces[1..].join(" "))),
        Some(Ok(kind)) => {
            let mut rest: Vec<&str> = pieces[2..].to_vec();
            rest[0] = pieces[1];
            add_selection_job(pool, &rest, kind, &mut pass.jobs, &mut pass.diag)
        }
        Some(Err(e)) => Err(e),
        None => str2job(pool, &pieces[1..].join(" "), &mut pass.diag).map(|job| pass.jobs.push(job)),
    };
    if let Err(e) = outcome {
        pass.diag.report(e);
    }
}

fn namespace(pool: &mut Pool, pass: &mut Pass, pieces: &[&str]) {
    let Some(DepId::Rel(rel)) = str2namespace(pool, pieces[1]) else {
        pass.diag.report(ParseError::directive(
            "namespace",
            format!("bad namespace '{}'", pieces[1]),
        ));
        return;
    };
    let mut providers = Vec::new();
    for target in &pieces[2..] {
        match str2solvable(pool, target) {
            Some(p) => providers.push(p),
            None => pass
                .diag
                .report(ParseError::UnknownPackage(target.to_string())),
        }
    }
    pass.ensure_indexed(pool);
    pool.set_namespace_providers(rel, providers);
}

fn disable(pool: &mut Pool, pass: &mut Pass, pieces: &[&str]) {
    if pass.indexing == Indexing::Unindexed {
        pool.create_whatprovides();
    }
    pass.indexing = Indexing::Disabled;
    pool.ensure_considered_map();
    let select = match str2select(pool, &pieces[1..]) {
        Ok(select) => select,
        Err(e) => {
            pass.diag.report(e);
            return;
        }
    };
    for p in pool.select_solvables(&select) {
        pool.set_considered(p, false);
    }
}

fn genid(pool: &mut Pool, pass: &mut Pass, pieces: &[&str]) {
    let arg = pieces[2..].join(" ");
    let dep = match pieces[1] {
        "op" if pieces.len() > 2 => {
            let Some(op) = RelOp::from_prefix(&arg) else {
                pass.diag
                    .report(ParseError::directive("genid", format!("unknown op '{}'", arg)));
                return;
            };
            if pass.genid.len() < 2 {
                pass.diag.report(ParseError::directive("genid", "out of stack"));
                return;
            }
            let evr = pass.genid.pop().unwrap_or_default();
            let name = pass.genid.pop().unwrap_or_default();
            pool.rel2id(name, evr, op)
        }
        "lit" => DepId::Str(pool.str2id(&arg)),
        "null" => DepId::Null,
        "dep" => match pool.parse_dep(&arg) {
            Some(dep) => dep,
            None => {
                pass.diag.report(ParseError::BadDependency(arg));
                return;
            }
        },
        other => {
            pass.diag
                .report(ParseError::directive("genid", format!("unknown command '{}'", other)));
            return;
        }
    };
    pass.genid.push(dep);
}

/// `userinstalled name` jobs for every installed name that was not auto-installed
fn add_userinstalled_jobs(pool: &Pool, autoinst: &[StrId], jobs: &mut Vec<Job>) {
    let Some(installed) = pool.installed() else {
        return;
    };
    let mut names: Vec<StrId> = pool
        .repo_solvables(installed)
        .into_iter()
        .filter_map(|p| pool.solvable(p).map(|s| s.name))
        .filter(|name| !autoinst.contains(name))
        .collect();
    names.sort_by(|a, b| pool.id2str(*a).cmp(pool.id2str(*b)));
    names.dedup();
    for name in names {
        jobs.push(Job::new(JobOp::UserInstalled, Selector::Name(DepId::Str(name))));
    }
}
