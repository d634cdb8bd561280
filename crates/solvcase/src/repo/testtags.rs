//! The line-oriented `testtags` repository format.
//!
//! ```text
//! =Ver: 3.0
//! =Pkg: A 1 1 noarch
//! =Vnd: SUSE
//! +Req:
//! B >= 2
//! C
//! -Req:
//! =Prv: virtual-a
//! ```
//!
//! Every non-source package without an explicit `name = evr` provide gets one
//! when loaded; dumps leave it out.

use std::io::{BufRead, Write};

use super::RepoFormat;
use crate::error::{Result, TestcaseError};
use crate::pool::{is_source_arch, DepId, DepKind, Pool, RelOp, RepoId, Solvable};

const DEP_TAGS: &[(&str, DepKind)] = &[
    ("Prv", DepKind::Provides),
    ("Req", DepKind::Requires),
    ("Con", DepKind::Conflicts),
    ("Obs", DepKind::Obsoletes),
    ("Rec", DepKind::Recommends),
    ("Sug", DepKind::Suggests),
    ("Sup", DepKind::Supplements),
    ("Enh", DepKind::Enhances),
];

fn dep_tag(tag: &str) -> Option<DepKind> {
    DEP_TAGS.iter().find(|(t, _)| *t == tag).map(|(_, k)| *k)
}

fn format_error(message: impl Into<String>) -> TestcaseError {
    TestcaseError::Format {
        format: "testtags".to_string(),
        message: message.into(),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TestTags;

impl TestTags {
    fn finish(pool: &mut Pool, repo: RepoId, mut solvable: Solvable) {
        let arch_is_source = solvable
            .arch
            .map(|a| is_source_arch(pool.id2str(a)))
            .unwrap_or(false);
        if !arch_is_source {
            let self_provide = pool.rel2id(
                DepId::Str(solvable.name),
                DepId::Str(solvable.evr),
                RelOp::Eq,
            );
            solvable.add_dep(DepKind::Provides, self_provide);
        }
        pool.add_solvable(repo, solvable);
    }

    fn parse_pkg(pool: &mut Pool, value: &str) -> Result<Solvable> {
        let fields: Vec<&str> = value.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(format_error(format!("bad package line '{}'", value)));
        }
        let evr = if fields[2] == "-" {
            fields[1].to_string()
        } else {
            format!("{}-{}", fields[1], fields[2])
        };
        let arch = (fields[3] != "-").then_some(fields[3]);
        Ok(pool.new_solvable(fields[0], &evr, arch))
    }

    fn add_dep(pool: &mut Pool, solvable: &mut Solvable, kind: DepKind, text: &str) -> Result<()> {
        let dep = pool
            .parse_dep(text)
            .ok_or_else(|| format_error(format!("bad dependency '{}'", text)))?;
        solvable.add_dep(kind, dep);
        Ok(())
    }

    fn write_deps(pool: &Pool, out: &mut dyn Write, tag: &str, deps: &[DepId]) -> std::io::Result<()> {
        match deps {
            [] => Ok(()),
            [dep] => writeln!(out, "={}: {}", tag, pool.dep2str(*dep)),
            deps => {
                writeln!(out, "+{}:", tag)?;
                for dep in deps {
                    writeln!(out, "{}", pool.dep2str(*dep))?;
                }
                writeln!(out, "-{}:", tag)
            }
        }
    }

    fn dump_solvable(pool: &Pool, s: &Solvable, out: &mut dyn Write) -> std::io::Result<()> {
        let evr = pool.id2str(s.evr);
        let (version, release) = match evr.rfind('-') {
            Some(pos) => (&evr[..pos], &evr[pos + 1..]),
            None => (evr, "-"),
        };
        let arch = s.arch.map(|a| pool.id2str(a)).unwrap_or("-");
        writeln!(
            out,
            "=Pkg: {} {} {} {}",
            pool.id2str(s.name),
            version,
            release,
            arch
        )?;
        if let Some(vendor) = s.vendor {
            writeln!(out, "=Vnd: {}", pool.id2str(vendor))?;
        }
        for flavor in &s.flavors {
            writeln!(out, "=Flv: {}", pool.id2str(*flavor))?;
        }
        let self_provide = pool.lookup_rel(DepId::Str(s.name), DepId::Str(s.evr), RelOp::Eq);
        for (tag, kind) in DEP_TAGS {
            let deps: Vec<DepId> = s
                .deps(*kind)
                .iter()
                .copied()
                .filter(|d| *kind != DepKind::Provides || Some(*d) != self_provide)
                .collect();
            Self::write_deps(pool, out, tag, &deps)?;
        }
        Ok(())
    }
}

impl RepoFormat for TestTags {
    fn name(&self) -> &'static str {
        "testtags"
    }

    fn load(&self, pool: &mut Pool, repo: RepoId, input: &mut dyn BufRead) -> Result<()> {
        let mut current: Option<Solvable> = None;
        let mut block: Option<DepKind> = None;
        let mut count = 0usize;

        for line in input.lines() {
            let line = line.map_err(|source| format_error(format!("read error: {}", source)))?;
            let line = line.trim_end();

            if let Some(kind) = block {
                if line.starts_with('-') && line.ends_with(':') && dep_tag(&line[1..line.len() - 1]).is_some() {
                    block = None;
                } else if !line.is_empty() {
                    if let Some(s) = current.as_mut() {
                        Self::add_dep(pool, s, kind, line)?;
                    }
                }
                continue;
            }

            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some(marker) = line.chars().next().filter(|c| matches!(c, '=' | '+' | '-')) else {
                continue;
            };
            let Some(colon) = line.find(':') else {
                continue;
            };
            let tag = &line[1..colon];
            let value = line[colon + 1..].trim();

            match (marker, tag) {
                ('=', "Ver") => {}
                ('=', "Pkg") => {
                    if let Some(done) = current.take() {
                        Self::finish(pool, repo, done);
                        count += 1;
                    }
                    current = Some(Self::parse_pkg(pool, value)?);
                }
                ('=', "Vnd") => {
                    let vendor = pool.str2id(value);
                    if let Some(s) = current.as_mut() {
                        s.vendor = Some(vendor);
                    }
                }
                ('=', "Flv") => {
                    let flavor = pool.str2id(value);
                    if let Some(s) = current.as_mut() {
                        s.flavors.push(flavor);
                    }
                }
                ('=', tag) => {
                    if let (Some(kind), Some(s)) = (dep_tag(tag), current.as_mut()) {
                        Self::add_dep(pool, s, kind, value)?;
                    }
                }
                ('+', tag) => {
                    if let Some(kind) = dep_tag(tag) {
                        block = Some(kind);
                    }
                }
                // unknown tags are skipped
                _ => {}
            }
        }
        if let Some(done) = current.take() {
            Self::finish(pool, repo, done);
            count += 1;
        }
        log::debug!("loaded {} packages into repo {}", count, repo);
        Ok(())
    }

    fn dump(&self, pool: &Pool, repo: RepoId, out: &mut dyn Write) -> Result<()> {
        let io_err = |source: std::io::Error| format_error(format!("write error: {}", source));
        writeln!(out, "=Ver: 3.0").map_err(io_err)?;
        for p in pool.repo_solvables(repo) {
            if let Some(s) = pool.solvable(p) {
                Self::dump_solvable(pool, s, out).map_err(io_err)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPO: &str = "\
=Ver: 3.0
=Pkg: A 1 1 noarch
=Vnd: SUSE
+Req:
B >= 2
C
-Req:
=Prv: virtual-a
=Pkg: B 2 - x86_64
=Flv: python3
=Con: A < 1
=Pkg: A 1 1 src
";

    fn load(pool: &mut Pool, text: &str) -> RepoId {
        let repo = pool.add_repo(Some("test"));
        let mut input = text.as_bytes();
        TestTags.load(pool, repo, &mut input).unwrap();
        repo
    }

    #[test]
    fn test_load() {
        let mut pool = Pool::new();
        let repo = load(&mut pool, REPO);
        let ids = pool.repo_solvables(repo);
        assert_eq!(ids.len(), 3);

        let a = pool.solvable(ids[0]).unwrap();
        assert_eq!(pool.id2str(a.evr), "1-1");
        assert_eq!(a.vendor.map(|v| pool.id2str(v)), Some("SUSE"));
        let requires: Vec<String> = a.requires.iter().map(|d| pool.dep2str(*d)).collect();
        assert_eq!(requires, vec!["B >= 2", "C"]);
        let provides: Vec<String> = a.provides.iter().map(|d| pool.dep2str(*d)).collect();
        assert_eq!(provides, vec!["virtual-a", "A = 1-1"]);

        let b = pool.solvable(ids[1]).unwrap();
        assert_eq!(pool.id2str(b.evr), "2");
        assert_eq!(b.flavors.len(), 1);

        let src = pool.solvable(ids[2]).unwrap();
        assert!(src.provides.is_empty());
    }

    #[test]
    fn test_dump_reload_is_stable() {
        let mut pool = Pool::new();
        let repo = load(&mut pool, REPO);
        let mut first = Vec::new();
        TestTags.dump(&pool, repo, &mut first).unwrap();

        let mut other = Pool::new();
        let repo2 = load(&mut other, std::str::from_utf8(&first).unwrap());
        let mut second = Vec::new();
        TestTags.dump(&other, repo2, &mut second).unwrap();

        assert_eq!(first, second);
        let text = String::from_utf8(first).unwrap();
        assert!(text.contains("=Pkg: A 1 1 noarch\n"));
        assert!(text.contains("+Req:\nB >= 2\nC\n-Req:\n"));
        assert!(!text.contains("A = 1-1"));
    }

    #[test]
    fn test_lines_without_tag_marker_are_ignored() {
        let mut pool = Pool::new();
        let repo = load(&mut pool, "=Ver: 3.0\n:x\nä: x\nPkg: B 1 1 noarch\n=Pkg: A 1 1 noarch\n");
        let ids = pool.repo_solvables(repo);
        assert_eq!(ids.len(), 1);
        assert_eq!(pool.solvable2str(ids[0]), "A-1-1.noarch");
    }

    #[test]
    fn test_bad_pkg_line() {
        let mut pool = Pool::new();
        let repo = pool.add_repo(None);
        let mut input = "=Pkg: A 1\n".as_bytes();
        assert!(TestTags.load(&mut pool, repo, &mut input).is_err());
    }
}
