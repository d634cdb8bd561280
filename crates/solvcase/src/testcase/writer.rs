//! Writing a pool, a solver run and its result as a testcase directory.

use std::fs;
use std::io;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use super::escape::escape;
use super::grammar::job2str;
use super::ident::{repo2str, solvable2str};
use super::line_set::LineSet;
use super::result::{solver_result, ResultFlags};
use crate::error::{Result, TestcaseError};
use crate::pool::{DepId, Pool, RelOp, RepoId, SolvableId, StrId};
use crate::repo::{write_repo_file, TestTags};
use crate::solver::Solver;

pub const DEFAULT_TESTCASE_NAME: &str = "testcase.t";
pub const DEFAULT_RESULT_NAME: &str = "solver.result";

/// Internal namespaces that are never written out
const SKIPPED_NAMESPACES: &[&str] = &["namespace:otherproviders", "namespace:splitprovides"];

/// Where and how to write a testcase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    pub testcase_name: String,
    /// Result file name; `None` embeds the result in the script
    pub result_name: Option<String>,
    pub compress_repos: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            testcase_name: DEFAULT_TESTCASE_NAME.to_string(),
            result_name: Some(DEFAULT_RESULT_NAME.to_string()),
            compress_repos: false,
        }
    }
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn testcase_name(mut self, name: impl Into<String>) -> Self {
        self.testcase_name = name.into();
        self
    }

    pub fn result_name(mut self, name: impl Into<String>) -> Self {
        self.result_name = Some(name.into());
        self
    }

    pub fn inline_result(mut self) -> Self {
        self.result_name = None;
        self
    }

    pub fn compress_repos(mut self, compress: bool) -> Self {
        self.compress_repos = compress;
        self
    }
}

/// Temporarily renames every repo to a unique, file-safe name.
///
/// The original names come back when the guard is dropped.
struct RepoNames<'a> {
    pool: &'a mut Pool,
    saved: Vec<(RepoId, Option<String>)>,
}

impl<'a> RepoNames<'a> {
    fn install(pool: &'a mut Pool) -> Self {
        let mut assigned: Vec<String> = Vec::new();
        let mut counter = 0;
        let mut saved = Vec::new();
        for id in pool.repo_ids().collect::<Vec<_>>() {
            let base = match pool.repo(id).and_then(|r| r.name.as_deref()) {
                Some(name) if !name.is_empty() => name.replace([' ', '\t', '/'], "_"),
                _ => format!("#{}", id),
            };
            let mut name = base.clone();
            while assigned.contains(&name) {
                counter += 1;
                name = format!("{}_{}", base, counter);
            }
            if let Some(repo) = pool.repo_mut(id) {
                saved.push((id, repo.name.replace(name.clone())));
            }
            assigned.push(name);
        }
        Self { pool, saved }
    }
}

impl Deref for RepoNames<'_> {
    type Target = Pool;

    fn deref(&self) -> &Pool {
        self.pool
    }
}

impl Drop for RepoNames<'_> {
    fn drop(&mut self) {
        for (id, name) in self.saved.drain(..) {
            if let Some(repo) = self.pool.repo_mut(id) {
                repo.name = name;
            }
        }
    }
}

fn write_file(path: PathBuf, contents: &str) -> Result<()> {
    fs::write(&path, contents).map_err(|source| TestcaseError::Write { path, source })
}

fn create_dir(dir: &Path) -> Result<()> {
    match fs::create_dir(dir) {
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        other => other.map_err(|source| TestcaseError::CreateDir {
            path: dir.to_path_buf(),
            source,
        }),
    }
}

/// Vendors in the order of the first package that carries them
fn distinct_vendors(pool: &Pool) -> Vec<(StrId, SolvableId)> {
    let mut vendors: Vec<(StrId, SolvableId)> = Vec::new();
    for p in pool.solvable_ids() {
        if let Some(vendor) = pool.solvable(p).and_then(|s| s.vendor) {
            if !vendors.iter().any(|(v, _)| *v == vendor) {
                vendors.push((vendor, p));
            }
        }
    }
    vendors
}

fn vendor_lines(pool: &Pool, out: &mut LineSet) {
    if pool.has_vendor_check() {
        let vendors = distinct_vendors(pool);
        for (i, &(v1, p1)) in vendors.iter().enumerate() {
            for &(v2, p2) in &vendors[i + 1..] {
                if !pool.vendor_change_forbidden(p1, p2) && !pool.vendor_change_forbidden(p2, p1) {
                    out.push(format!(
                        "vendorclass {} {}",
                        escape(pool.id2str(v1)),
                        escape(pool.id2str(v2))
                    ));
                }
            }
        }
    } else {
        for class in pool.vendor_classes() {
            let tokens: Vec<String> = class.iter().map(|v| escape(v).into_owned()).collect();
            out.push(format!("vendorclass {}", tokens.join(" ")));
        }
    }
}

fn namespace_lines(pool: &Pool, out: &mut LineSet) {
    for rel in pool.rel_ids() {
        let rd = pool.reldep(rel);
        if rd.op != RelOp::Namespace {
            continue;
        }
        let DepId::Str(name) = rd.name else {
            continue;
        };
        let name = pool.id2str(name);
        if SKIPPED_NAMESPACES.contains(&name) {
            continue;
        }
        let providers = pool.what_provides(DepId::Rel(rel));
        if providers.is_empty() {
            continue;
        }
        let mut line = format!("namespace {}({})", name, pool.dep2str(rd.evr));
        for p in providers {
            line.push(' ');
            line.push_str(&solvable2str(pool, p));
        }
        out.push(line);
    }
}

/// Write a complete testcase bundle to `dir`.
///
/// Every repo is dumped as a `testtags` side file, the script goes to
/// `options.testcase_name` and, if any facet is requested, the result to
/// `options.result_name` or inline. Repo names are made unique for the
/// duration of the write and restored afterwards.
pub fn write_testcase(
    pool: &mut Pool,
    solver: &dyn Solver,
    dir: &Path,
    result_flags: ResultFlags,
    options: &WriteOptions,
) -> Result<()> {
    create_dir(dir)?;
    let names = RepoNames::install(pool);
    let pool: &Pool = &names;
    let mut out = LineSet::new();

    for repo in pool.repo_ids() {
        let name = repo2str(pool, repo);
        let file = format!(
            "{}.repo{}",
            name,
            if options.compress_repos { ".gz" } else { "" }
        );
        write_repo_file(&dir.join(&file), &TestTags, pool, repo)?;
        let (priority, subpriority) = pool
            .repo(repo)
            .map(|r| (r.priority, r.subpriority))
            .unwrap_or_default();
        let priority = if subpriority != 0 {
            format!("{}.{}", priority, subpriority)
        } else {
            priority.to_string()
        };
        out.push(format!("repo {} {} testtags {}", name, priority, file));
    }

    let arch = pool.arch_policy().and_then(|p| p.primary()).unwrap_or("-");
    let mut system = format!("system {} {}", arch, pool.disttype().name());
    if let Some(installed) = pool.installed() {
        system.push(' ');
        system.push_str(&repo2str(pool, installed));
    }
    out.push(system);

    if !pool.flags.is_default() {
        out.push(format!("poolflags {}", pool.flags));
    }
    vendor_lines(pool, &mut out);

    if pool.has_considered_map() {
        for p in pool.solvable_ids() {
            if !pool.is_considered(p) {
                let name = solvable2str(pool, p);
                out.push_joined("disable pkg ", &name, "");
            }
        }
    }

    if !solver.flags().is_default() {
        out.push(format!("solverflags {}", solver.flags()));
    }
    if pool.has_namespace_support() {
        namespace_lines(pool, &mut out);
    }
    for job in solver.jobs() {
        let text = job2str(pool, job);
        out.push_joined("job ", &text, "");
    }

    if !result_flags.is_empty() {
        let names = result_flags.names().join(",");
        let result = solver_result(pool, solver, result_flags);
        match &options.result_name {
            Some(result_name) => {
                out.push(format!("result {} {}", names, result_name));
                write_file(dir.join(result_name), &result)?;
            }
            None => {
                out.push(format!("result {} <inline>", names));
                for line in LineSet::split(&result).iter() {
                    out.push_joined("#>", line, "");
                }
            }
        }
    }

    write_file(dir.join(&options.testcase_name), &out.join())?;
    log::debug!("wrote testcase to {}", dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{Job, JobOp, Selector};
    use crate::pool::DepKind;
    use crate::solver::{SolverSnapshot, TransactionClass};

    fn pkg(pool: &mut Pool, repo: RepoId, name: &str, evr: &str) -> SolvableId {
        let mut s = pool.new_solvable(name, evr, Some("noarch"));
        let provide = pool.rel2id(DepId::Str(s.name), DepId::Str(s.evr), RelOp::Eq);
        s.add_dep(DepKind::Provides, provide);
        pool.add_solvable(repo, s)
    }

    fn read(dir: &Path, name: &str) -> String {
        fs::read_to_string(dir.join(name)).unwrap()
    }

    #[test]
    fn test_write_bundle() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("case");

        let mut pool = Pool::new();
        let system = pool.add_repo(Some("system"));
        let spaced = pool.add_repo(Some("a b"));
        let clash = pool.add_repo(Some("a_b"));
        pkg(&mut pool, system, "A", "1-1");
        pkg(&mut pool, spaced, "A", "2-1");
        let b = pkg(&mut pool, clash, "B", "1-1");
        pool.repo_mut(clash).unwrap().priority = 99;
        pool.repo_mut(clash).unwrap().subpriority = 2;
        pool.set_installed(Some(system));
        pool.set_arch(Some("x86_64"));
        pool.create_whatprovides();

        let name = pool.lookup_str("A").unwrap();
        let mut snap = SolverSnapshot::default();
        snap.jobs = vec![Job::new(JobOp::Install, Selector::Name(DepId::Str(name)))];
        snap.transaction.classes.insert(TransactionClass::Install, vec![b]);

        let options = WriteOptions::new().inline_result();
        write_testcase(&mut pool, &snap, &dir, ResultFlags::TRANSACTION, &options).unwrap();

        assert_eq!(
            read(&dir, "testcase.t"),
            "repo system 0 testtags system.repo\n\
             repo a_b 0 testtags a_b.repo\n\
             repo a_b_1 99.2 testtags a_b_1.repo\n\
             system x86_64 rpm system\n\
             job install name A\n\
             result transaction <inline>\n\
             #>install B-1-1.noarch@a_b_1\n"
        );
        assert!(read(&dir, "a_b_1.repo").contains("=Pkg: B 1 1 noarch"));
        assert_eq!(pool.repo(spaced).unwrap().name.as_deref(), Some("a b"));
        assert_eq!(pool.repo(clash).unwrap().name.as_deref(), Some("a_b"));
    }

    #[test]
    fn test_result_file_and_flags() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();

        let mut pool = Pool::new();
        let repo = pool.add_repo(None);
        let a = pkg(&mut pool, repo, "A", "1");
        pool.set_considered(a, false);
        pool.flags.set("implicitobsoleteusesprovides", true);
        pool.add_vendor_class(vec!["SUSE".to_string(), "openSUSE Build Service".to_string()]);

        let mut snap = SolverSnapshot::default();
        snap.flags.set("allowuninstall", true);
        snap.transaction.classes.insert(TransactionClass::Erase, vec![a]);

        let options = WriteOptions::new().compress_repos(true);
        write_testcase(&mut pool, &snap, dir, ResultFlags::TRANSACTION, &options).unwrap();

        let script = read(dir, "testcase.t");
        assert_eq!(
            script,
            "repo #1 0 testtags #1.repo.gz\n\
             system - rpm\n\
             poolflags implicitobsoleteusesprovides\n\
             vendorclass SUSE openSUSE\\20Build\\20Service\n\
             disable pkg A-1.noarch@#1\n\
             solverflags allowuninstall\n\
             result transaction solver.result\n"
        );
        assert_eq!(read(dir, "solver.result"), "erase A-1.noarch@#1\n");
        assert!(dir.join("#1.repo.gz").exists());
        assert_eq!(pool.repo(repo).unwrap().name, None);
    }

    #[test]
    fn test_custom_vendor_check_pairs() {
        let mut pool = Pool::new();
        let repo = pool.add_repo(Some("test"));
        for (name, vendor) in [("A", "v1"), ("B", "v2"), ("C", "v3")] {
            let p = pkg(&mut pool, repo, name, "1");
            let vendor = pool.str2id(vendor);
            pool.solvable_mut(p).unwrap().vendor = Some(vendor);
        }
        // v3 may not be changed into or from anything
        pool.set_vendor_check(|pool, p1, p2| {
            let is_v3 = |p| pool.solvable(p).and_then(|s| s.vendor) == pool.lookup_str("v3");
            is_v3(p1) || is_v3(p2)
        });
        let mut out = LineSet::new();
        vendor_lines(&pool, &mut out);
        assert_eq!(out.join(), "vendorclass v1 v2\n");
    }

    #[test]
    fn test_existing_file_is_not_a_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("plain");
        fs::write(&file, "x").unwrap();
        let mut pool = Pool::new();
        let snap = SolverSnapshot::default();
        let err = write_testcase(&mut pool, &snap, &file, ResultFlags::empty(), &WriteOptions::new())
            .unwrap_err();
        assert!(matches!(err, TestcaseError::CreateDir { .. }));
    }
}
