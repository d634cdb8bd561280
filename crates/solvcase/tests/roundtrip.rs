use std::fs;

use solvcase::pool::{DepId, DepKind, RelOp, RepoId, SolvableId};
use solvcase::solver::{SolverSnapshot, TransactionClass};
use solvcase::testcase::{
    job2str, result_diff, solvable2str, solver_result, str2solvable, write_testcase, ReadOutcome,
    ResultFlags, Testcase, TestcaseReader, WriteOptions,
};
use solvcase::{Job, JobOp, Pool, Selector};

fn pkg(pool: &mut Pool, repo: RepoId, name: &str, evr: &str, requires: Option<&str>) -> SolvableId {
    let mut s = pool.new_solvable(name, evr, Some("x86_64"));
    let provide = pool.rel2id(DepId::Str(s.name), DepId::Str(s.evr), RelOp::Eq);
    s.add_dep(DepKind::Provides, provide);
    if let Some(dep) = requires.and_then(|text| pool.parse_dep(text)) {
        s.add_dep(DepKind::Requires, dep);
    }
    pool.add_solvable(repo, s)
}

fn sample() -> (Pool, SolverSnapshot) {
    let mut pool = Pool::new();
    let system = pool.add_repo(Some("system"));
    let available = pool.add_repo(Some("available"));
    pkg(&mut pool, system, "A", "1-1", None);
    pkg(&mut pool, available, "A", "2-1", None);
    let b = pkg(&mut pool, available, "B", "1-1", Some("A >= 2"));
    pool.set_installed(Some(system));
    pool.set_arch(Some("x86_64"));
    pool.create_whatprovides();

    let name = pool.lookup_str("B").unwrap();
    let mut snap = SolverSnapshot::default();
    snap.jobs = vec![Job::new(JobOp::Install, Selector::Name(DepId::Str(name)))];
    snap.transaction.classes.insert(TransactionClass::Install, vec![b]);
    (pool, snap)
}

fn ready(outcome: ReadOutcome) -> Testcase {
    match outcome {
        ReadOutcome::Ready(testcase) => testcase,
        ReadOutcome::Skip { missing, .. } => panic!("unexpected skip: {:?}", missing),
    }
}

fn packages(pool: &Pool) -> Vec<String> {
    let mut names: Vec<String> = pool.solvable_ids().map(|p| solvable2str(pool, p)).collect();
    names.sort();
    names
}

#[test]
fn test_written_bundle_reads_back() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("bug");
    let (mut pool, snap) = sample();
    let flags = ResultFlags::TRANSACTION | ResultFlags::JOBS;
    write_testcase(&mut pool, &snap, &dir, flags, &WriteOptions::new()).unwrap();

    let mut reread = Pool::new();
    let mut reader = TestcaseReader::open(dir.join("testcase.t")).unwrap();
    let testcase = ready(reader.read(&mut reread).unwrap());
    assert!(reader.is_finished());
    assert!(testcase.diagnostics.is_empty());
    assert_eq!(testcase.result_flags, flags);

    assert_eq!(packages(&reread), packages(&pool));
    assert_eq!(reread.installed().and_then(|r| reread.repo(r)?.name.clone()).as_deref(), Some("system"));
    let b = str2solvable(&reread, "B-1-1.x86_64@available").unwrap();
    let requires: Vec<String> = reread
        .solvable(b)
        .unwrap()
        .deps(DepKind::Requires)
        .iter()
        .map(|dep| reread.dep2str(*dep))
        .collect();
    assert_eq!(requires, vec!["A >= 2"]);

    let jobs: Vec<String> = testcase.jobs.iter().map(|job| job2str(&reread, job)).collect();
    assert_eq!(jobs, vec!["install name B"]);

    let mut replay = SolverSnapshot::new(testcase.jobs.clone(), testcase.solver_flags);
    replay.transaction.classes.insert(TransactionClass::Install, vec![b]);
    let expected = testcase.result.as_deref().unwrap();
    let actual = solver_result(&reread, &replay, testcase.result_flags);
    assert_eq!(result_diff(expected, &actual), None);
}

#[test]
fn test_changed_result_shows_in_diff() {
    let tmp = tempfile::tempdir().unwrap();
    let (mut pool, snap) = sample();
    let options = WriteOptions::new().inline_result().compress_repos(true);
    write_testcase(&mut pool, &snap, tmp.path(), ResultFlags::TRANSACTION, &options).unwrap();
    assert!(tmp.path().join("available.repo.gz").exists());

    let mut reread = Pool::new();
    let testcase = ready(
        TestcaseReader::open(tmp.path().join("testcase.t"))
            .unwrap()
            .read(&mut reread)
            .unwrap(),
    );
    let a2 = str2solvable(&reread, "A-2-1.x86_64@available").unwrap();
    let mut replay = SolverSnapshot::new(testcase.jobs.clone(), testcase.solver_flags);
    replay.transaction.classes.insert(TransactionClass::Install, vec![a2]);
    let actual = solver_result(&reread, &replay, testcase.result_flags);

    let diff = result_diff(testcase.result.as_deref().unwrap(), &actual).unwrap();
    assert_eq!(
        diff,
        "+install A-2-1.x86_64@available\n-install B-1-1.x86_64@available\n"
    );
}

#[test]
fn test_multi_pass_script() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(
        tmp.path().join("avail.repo"),
        "=Ver: 3.0\n=Pkg: A 1 1 noarch\n=Prv: A = 1-1\n=Pkg: B 1 1 noarch\n",
    )
    .unwrap();
    let script = tmp.path().join("testcase.t");
    fs::write(
        &script,
        "repo avail 0 testtags avail.repo\n\
         system i686 rpm\n\
         job install name A\n\
         nextjob reusesolver\n\
         job erase name B\n\
         job frobnicate name B\n\
         nextjob\n\
         feature no_such_feature\n",
    )
    .unwrap();

    let mut pool = Pool::new();
    let mut reader = TestcaseReader::open(&script).unwrap();

    let first = ready(reader.read(&mut pool).unwrap());
    assert!(first.reuse_solver);
    assert_eq!(first.jobs.len(), 1);

    let second = ready(reader.read(&mut pool).unwrap());
    assert!(!second.reuse_solver);
    assert_eq!(second.jobs.len(), 1);
    assert_eq!(second.diagnostics.len(), 1);
    assert_eq!(second.diagnostics[0].line, 6);

    match reader.read(&mut pool).unwrap() {
        ReadOutcome::Skip { missing, .. } => assert_eq!(missing, vec!["no_such_feature"]),
        ReadOutcome::Ready(_) => panic!("expected skip"),
    }
    assert_eq!(packages(&pool), vec!["A-1-1.noarch@avail", "B-1-1.noarch@avail"]);
}
