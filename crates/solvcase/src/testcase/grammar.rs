//! One-line encoding of solver jobs.
//!
//! ```text
//! install pkg foo-1.0.noarch@test [weak]
//! erase name bar
//! noop provides namespace:language(de)
//! lock oneof A-1-1.noarch@test B-2.x86_64@test
//! distupgrade repo updates
//! verify all packages
//! ```

use crate::error::{Diagnostics, ParseError};
use crate::job::{Job, JobFlags, JobOp, Selector};
use crate::pool::{DepId, DepKind, Pool, RelOp, Selection, SelectionFlags};

use super::ident::{repo2str, solvable2str, str2repo, str2solvable};

pub fn job2str(pool: &Pool, job: &Job) -> String {
    let target = match &job.select {
        Selector::Solvable(p) => format!("pkg {}", solvable2str(pool, *p)),
        Selector::Name(dep) => format!("name {}", pool.dep2str(*dep)),
        Selector::Provides(dep) => format!("provides {}", pool.dep2str(*dep)),
        Selector::OneOf(list) if list.is_empty() => "oneof nothing".to_string(),
        Selector::OneOf(list) => {
            let refs: Vec<String> = list.iter().map(|&p| solvable2str(pool, p)).collect();
            format!("oneof {}", refs.join(" "))
        }
        Selector::Repo(repo) => format!("repo {}", repo2str(pool, *repo)),
        Selector::All => "all packages".to_string(),
        Selector::Unknown => "unknown unknown".to_string(),
    };
    let mut out = format!("{} {}", job.op.name(), target);
    let flags = job.flags.names();
    if !flags.is_empty() {
        out.push_str(" [");
        out.push_str(&flags.join(","));
        out.push(']');
    }
    out
}

/// Parse the comma separated contents of a `[...]` flag token
fn parse_job_flags(text: &str, diag: &mut Diagnostics) -> JobFlags {
    let mut flags = JobFlags::empty();
    for name in text.split(',') {
        match JobFlags::from_token(name) {
            Some(flag) => flags |= flag,
            None => diag.report(ParseError::UnknownJobFlag(name.to_string())),
        }
    }
    flags
}

fn parse_selection_flags(text: &str, diag: &mut Diagnostics) -> SelectionFlags {
    let mut flags = SelectionFlags::empty();
    for name in text.split(',') {
        match SelectionFlags::from_token(name) {
            Some(flag) => flags |= flag,
            None => diag.report(ParseError::UnknownSelectionFlag(name.to_string())),
        }
    }
    flags
}

/// Pop a trailing `[flag,...]` token when more than `keep` tokens remain
fn split_job_flags(pieces: &mut &[&str], keep: usize, diag: &mut Diagnostics) -> JobFlags {
    let all = *pieces;
    if all.len() > keep {
        if let Some(inner) = all[all.len() - 1]
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
        {
            *pieces = &all[..all.len() - 1];
            return parse_job_flags(inner, diag);
        }
    }
    JobFlags::empty()
}

/// `namespace:NAME(ARG)` as a namespace relation; `<NULL>` means no argument
pub fn str2namespace(pool: &mut Pool, text: &str) -> Option<DepId> {
    let open = text.find('(')?;
    let arg = text[open + 1..].strip_suffix(')')?;
    let evr = if arg == "<NULL>" {
        DepId::Null
    } else {
        pool.parse_dep(arg).unwrap_or(DepId::Null)
    };
    let name = pool.str2id(&text[..open]);
    Some(pool.rel2id(DepId::Str(name), evr, RelOp::Namespace))
}

/// Decode a selector from its keyword and target tokens
pub fn str2select(pool: &mut Pool, pieces: &[&str]) -> Result<Selector, ParseError> {
    match pieces {
        ["pkg", target] => str2solvable(pool, target)
            .map(Selector::Solvable)
            .ok_or_else(|| ParseError::UnknownPackage(target.to_string())),
        [keyword @ ("name" | "provides"), rest @ ..] if !rest.is_empty() => {
            let text = rest.join(" ");
            let mut dep = None;
            if *keyword == "provides" && text.starts_with("namespace:") {
                dep = str2namespace(pool, &text);
            }
            let dep = match dep {
                Some(dep) => dep,
                None => pool
                    .parse_dep(&text)
                    .ok_or_else(|| ParseError::BadDependency(text.clone()))?,
            };
            Ok(if *keyword == "name" {
                Selector::Name(dep)
            } else {
                Selector::Provides(dep)
            })
        }
        ["oneof", rest @ ..] => {
            let mut list = Vec::new();
            if rest.first() != Some(&"nothing") {
                for target in rest {
                    let p = str2solvable(pool, target)
                        .ok_or_else(|| ParseError::UnknownPackage(target.to_string()))?;
                    list.push(p);
                }
            }
            Ok(Selector::OneOf(list))
        }
        ["repo", target] => str2repo(pool, target)
            .map(Selector::Repo)
            .ok_or_else(|| ParseError::UnknownRepo(target.to_string())),
        ["all", "packages"] => Ok(Selector::All),
        _ => Err(ParseError::BadLine(pieces.join(" "))),
    }
}

/// Decode a job line such as `install pkg A-1-1.noarch@test [weak]`.
///
/// Unknown flag names are reported to `diag` and skipped.
pub fn str2job(pool: &mut Pool, line: &str, diag: &mut Diagnostics) -> Result<Job, ParseError> {
    let tokens: Vec<&str> = line.split([' ', '\t']).filter(|t| !t.is_empty()).collect();
    if tokens.len() < 3 {
        return Err(ParseError::BadLine(line.to_string()));
    }
    let op = JobOp::from_name(tokens[0]).ok_or_else(|| ParseError::UnknownJob(line.to_string()))?;
    let mut pieces: &[&str] = &tokens;
    let flags = split_job_flags(&mut pieces, 3, diag);
    let select = str2select(pool, &pieces[1..])?;
    Ok(Job { op, select, flags })
}

/// How the pattern of a selection job line is matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
    /// `selection`: names, provides, canonical forms
    Pattern,
    /// `selection_matchdeps <keyname>`
    MatchDeps(DepKind),
    /// `selection_matchdepid <keyname>`
    MatchDepId(DepKind),
    /// `selection_matchsolvable <keyname>`
    MatchSolvable(DepKind),
}

impl SelectionKind {
    /// Resolve the selection keyword of a job line
    pub fn from_keyword(keyword: &str, keyname: Option<&str>) -> Option<Result<Self, ParseError>> {
        let kind = || {
            let keyname = keyname.unwrap_or("");
            DepKind::from_keyname(keyname)
                .ok_or_else(|| ParseError::directive("job", format!("unknown keyname '{}'", keyname)))
        };
        match keyword {
            "selection" => Some(Ok(SelectionKind::Pattern)),
            "selection_matchdeps" => Some(kind().map(SelectionKind::MatchDeps)),
            "selection_matchdepid" => Some(kind().map(SelectionKind::MatchDepId)),
            "selection_matchsolvable" => Some(kind().map(SelectionKind::MatchSolvable)),
            _ => None,
        }
    }
}

/// Expand `<op> <keyword> <pattern...> <selflags>[ [flags]]` into jobs.
///
/// `pieces[1]` is the selection keyword (or keyname) and is skipped. With
/// `add`, `subtract` or `filter` the jobs in `jobs` are taken over and
/// replaced by the combined selection.
pub fn add_selection_job(
    pool: &mut Pool,
    pieces: &[&str],
    kind: SelectionKind,
    jobs: &mut Vec<Job>,
    diag: &mut Diagnostics,
) -> Result<(), ParseError> {
    let op = pieces
        .first()
        .and_then(|name| JobOp::from_name(name))
        .ok_or_else(|| ParseError::UnknownJob(pieces.first().unwrap_or(&"").to_string()))?;
    let mut pieces = pieces;
    let flags = split_job_flags(&mut pieces, 3, diag);
    if pieces.len() < 4 {
        return Err(ParseError::NoSelectionFlags);
    }
    let selflags = parse_selection_flags(pieces[pieces.len() - 1], diag);
    let pattern = pieces[2..pieces.len() - 1].join(" ");

    let base = if selflags.intersects(SelectionFlags::SETOPS) {
        Some(Selection::from_jobs(&std::mem::take(jobs)))
    } else {
        None
    };

    let sel = match kind {
        SelectionKind::Pattern => pool.select(&pattern, selflags),
        SelectionKind::MatchDeps(key) => pool.select_matchdeps(&pattern, selflags, key),
        SelectionKind::MatchDepId(key) => match pool.parse_dep(&pattern) {
            Some(dep) => pool.select_matchdepid(dep, selflags, key),
            None => Selection::new(),
        },
        SelectionKind::MatchSolvable(key) => match str2solvable(pool, &pattern) {
            Some(p) => pool.select_matchsolvable(&[p], selflags, key),
            None => Selection::new(),
        },
    };
    let sel = match base {
        Some(base) => pool.combine_selection(base, sel, selflags),
        None => sel,
    };
    log::debug!("selection '{}' produced {} entries", pattern, sel.len());
    jobs.extend(sel.into_jobs(op, flags));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pkg(pool: &mut Pool, repo: usize, name: &str, evr: &str, arch: &str) -> i32 {
        let mut s = pool.new_solvable(name, evr, Some(arch));
        let provide = pool.rel2id(DepId::Str(s.name), DepId::Str(s.evr), RelOp::Eq);
        s.add_dep(DepKind::Provides, provide);
        pool.add_solvable(repo, s)
    }

    fn setup() -> (Pool, i32, i32) {
        let mut pool = Pool::new();
        let repo = pool.add_repo(Some("test"));
        let foo = pkg(&mut pool, repo, "foo", "1.0", "noarch");
        let bar = pkg(&mut pool, repo, "bar", "2-1", "x86_64");
        pool.create_whatprovides();
        (pool, foo, bar)
    }

    #[test]
    fn test_encode_pkg_with_flag() {
        let (pool, foo, _) = setup();
        let job = Job::new(JobOp::Install, Selector::Solvable(foo)).with_flags(JobFlags::WEAK);
        assert_eq!(job2str(&pool, &job), "install pkg foo-1.0.noarch@test [weak]");
    }

    #[test]
    fn test_job_roundtrip() {
        let (mut pool, foo, bar) = setup();
        let dep = pool.parse_dep("foo >= 1").unwrap();
        let jobs = vec![
            Job::new(JobOp::Install, Selector::Solvable(foo)).with_flags(JobFlags::WEAK),
            Job::new(JobOp::Erase, Selector::Name(dep))
                .with_flags(JobFlags::CLEANDEPS | JobFlags::SETEVR),
            Job::new(JobOp::Lock, Selector::OneOf(vec![foo, bar])),
            Job::new(JobOp::Lock, Selector::OneOf(vec![])),
            Job::new(JobOp::DistUpgrade, Selector::Repo(1)),
            Job::new(JobOp::Verify, Selector::All),
        ];
        let mut diag = Diagnostics::new();
        for job in jobs {
            let line = job2str(&pool, &job);
            assert_eq!(str2job(&mut pool, &line, &mut diag).unwrap(), job, "{}", line);
        }
        assert!(diag.is_empty());
    }

    #[test]
    fn test_flag_order_is_canonical() {
        let (mut pool, foo, _) = setup();
        let mut diag = Diagnostics::new();
        let job = str2job(&mut pool, "install pkg foo-1.0.noarch@test [setarch,weak]", &mut diag).unwrap();
        assert_eq!(job.select, Selector::Solvable(foo));
        assert_eq!(job2str(&pool, &job), "install pkg foo-1.0.noarch@test [weak,setarch]");
    }

    #[test]
    fn test_unknown_flag_reported() {
        let (mut pool, _, _) = setup();
        let mut diag = Diagnostics::new();
        let job = str2job(&mut pool, "erase name foo [bogus,weak]", &mut diag).unwrap();
        assert_eq!(job.flags, JobFlags::WEAK);
        assert_eq!(diag.entries()[0].error, ParseError::UnknownJobFlag("bogus".into()));
    }

    #[test]
    fn test_decode_errors() {
        let (mut pool, _, _) = setup();
        let mut diag = Diagnostics::new();
        assert!(matches!(str2job(&mut pool, "install pkg", &mut diag), Err(ParseError::BadLine(_))));
        assert!(matches!(str2job(&mut pool, "frob pkg foo", &mut diag), Err(ParseError::UnknownJob(_))));
        assert!(matches!(
            str2job(&mut pool, "install pkg nope-1.noarch", &mut diag),
            Err(ParseError::UnknownPackage(_))
        ));
        assert!(matches!(
            str2job(&mut pool, "install repo nowhere", &mut diag),
            Err(ParseError::UnknownRepo(_))
        ));
        assert_eq!(
            str2job(&mut pool, "install whatever foo", &mut diag),
            Err(ParseError::BadLine("whatever foo".into()))
        );
    }

    #[test]
    fn test_namespace_provides() {
        let (mut pool, _, _) = setup();
        let mut diag = Diagnostics::new();
        let job = str2job(&mut pool, "noop provides namespace:language(de)", &mut diag).unwrap();
        let Selector::Provides(DepId::Rel(rel)) = job.select else {
            panic!("expected a namespace relation");
        };
        assert_eq!(pool.reldep(rel).op, RelOp::Namespace);
        assert_eq!(job2str(&pool, &job), "noop provides namespace:language(de)");

        let job = str2job(&mut pool, "noop provides namespace:modalias(<NULL>)", &mut diag).unwrap();
        let Selector::Provides(DepId::Rel(rel)) = job.select else {
            panic!("expected a namespace relation");
        };
        assert_eq!(pool.reldep(rel).evr, DepId::Null);
    }

    #[test]
    fn test_selection_job() {
        let (mut pool, foo, _) = setup();
        let mut diag = Diagnostics::new();
        let mut jobs = Vec::new();
        add_selection_job(
            &mut pool,
            &["install", "selection", "foo", "name", "[weak]"],
            SelectionKind::Pattern,
            &mut jobs,
            &mut diag,
        )
        .unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].op, JobOp::Install);
        assert_eq!(jobs[0].flags, JobFlags::WEAK);
        assert_eq!(pool.select_solvables(&jobs[0].select), vec![foo]);

        let err = add_selection_job(&mut pool, &["install", "selection", "foo"], SelectionKind::Pattern, &mut jobs, &mut diag);
        assert_eq!(err, Err(ParseError::NoSelectionFlags));
    }

    #[test]
    fn test_selection_add_takes_over_jobs() {
        let (mut pool, foo, bar) = setup();
        let mut diag = Diagnostics::new();
        let mut jobs = vec![Job::new(JobOp::Lock, Selector::Solvable(foo)).with_flags(JobFlags::WEAK | JobFlags::SETARCH)];
        add_selection_job(
            &mut pool,
            &["erase", "selection", "bar", "name,add"],
            SelectionKind::Pattern,
            &mut jobs,
            &mut diag,
        )
        .unwrap();
        assert_eq!(jobs.len(), 2);
        assert!(jobs.iter().all(|j| j.op == JobOp::Erase));
        assert_eq!(jobs[0].flags, JobFlags::SETARCH);
        assert_eq!(pool.select_solvables(&jobs[1].select), vec![bar]);
    }

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(SelectionKind::from_keyword("selection", None), Some(Ok(SelectionKind::Pattern)));
        assert_eq!(
            SelectionKind::from_keyword("selection_matchdeps", Some("solvable:requires")),
            Some(Ok(SelectionKind::MatchDeps(DepKind::Requires)))
        );
        assert!(matches!(SelectionKind::from_keyword("selection_matchdepid", Some("bogus")), Some(Err(_))));
        assert_eq!(SelectionKind::from_keyword("pkg", None), None);
    }
}
