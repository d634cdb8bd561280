//! Stable text names for repositories and packages.
//!
//! Repos encode as their name with blanks turned into `_`, or `#<id>` when
//! unnamed; an empty name is still a name. Packages encode as
//! `name-evr[-flavor...][.arch]@repo`; the system solvable is `@SYSTEM`.

use crate::pool::{Pool, RepoId, Solvable, SolvableId, StrId, SYSTEM_SOLVABLE};

fn mangle_blanks(name: &str) -> String {
    name.replace([' ', '\t'], "_")
}

pub fn repo2str(pool: &Pool, repo: RepoId) -> String {
    match pool.repo(repo).and_then(|r| r.name.as_deref()) {
        Some(name) => mangle_blanks(name),
        None => format!("#{}", repo),
    }
}

/// Resolve `#<id>` or a mangled repo name
pub fn str2repo(pool: &Pool, s: &str) -> Option<RepoId> {
    if let Some(digits) = s.strip_prefix('#') {
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(id) = digits.parse::<RepoId>() {
                if id > 0 && id < pool.repo_count() && pool.repo(id).is_some() {
                    return Some(id);
                }
            }
        }
    }
    pool.repo_ids().find(|&id| {
        pool.repo(id)
            .and_then(|r| r.name.as_deref())
            .is_some_and(|name| mangle_blanks(name) == s)
    })
}

pub fn solvable2str(pool: &Pool, p: SolvableId) -> String {
    if p == SYSTEM_SOLVABLE {
        return "@SYSTEM".to_string();
    }
    let Some(s) = pool.solvable(p) else {
        return format!("#{}", p);
    };
    let mut out = format!("{}-{}", pool.id2str(s.name), pool.id2str(s.evr));
    for flavor in &s.flavors {
        out.push('-');
        out.push_str(pool.id2str(*flavor));
    }
    if let Some(arch) = s.arch {
        out.push('.');
        out.push_str(pool.id2str(arch));
    }
    out.push('@');
    if let Some(repo) = s.repo {
        out.push_str(&repo2str(pool, repo));
    }
    out
}

/// Whether `text` is exactly the evr of `s` followed by its flavors
fn evr_matches(pool: &Pool, s: &Solvable, text: &str, evr: Option<StrId>) -> bool {
    if s.flavors.is_empty() {
        return evr == Some(s.evr);
    }
    let mut rest = text;
    let parts = std::iter::once(s.evr).chain(s.flavors.iter().copied());
    for (i, part) in parts.enumerate() {
        if i > 0 {
            match rest.strip_prefix('-') {
                Some(r) => rest = r,
                None => return false,
            }
        }
        match rest.strip_prefix(pool.id2str(part)) {
            Some(r) => rest = r,
            None => return false,
        }
    }
    rest.is_empty()
}

/// Resolve a package reference produced by [`solvable2str`].
///
/// Only already interned strings are looked up, so a failed decode leaves
/// the pool untouched. Candidates from the provider index are tried before
/// a linear scan, which also finds packages that are not installable.
pub fn str2solvable(pool: &Pool, s: &str) -> Option<SolvableId> {
    if s.is_empty() {
        return None;
    }
    if s == "@SYSTEM" {
        return Some(SYSTEM_SOLVABLE);
    }

    let mut end = s.len();
    let mut repo = None;
    for (pos, _) in s.match_indices('@').collect::<Vec<_>>().into_iter().rev() {
        if let Some(id) = str2repo(pool, &s[pos + 1..]) {
            repo = Some(id);
            end = pos;
            break;
        }
    }

    let mut arch = None;
    if let Some(dot) = s[..end].rfind('.') {
        if dot > 0 {
            arch = pool.lookup_str(&s[dot + 1..end]);
            if arch.is_some() {
                end = dot;
            }
        }
    }

    let matches = |p: SolvableId, name: StrId, text: &str, evr: Option<StrId>| {
        pool.solvable(p).is_some_and(|sv| {
            sv.name == name
                && (repo.is_none() || sv.repo == repo)
                && (arch.is_none() || sv.arch == arch)
                && evr_matches(pool, sv, text, evr)
        })
    };

    let head = &s[..end];
    for (dash, _) in head.match_indices('-').collect::<Vec<_>>().into_iter().rev() {
        if dash == 0 {
            continue;
        }
        let Some(name) = pool.lookup_str(&head[..dash]) else {
            continue;
        };
        let text = &head[dash + 1..];
        let evr = pool.lookup_str(text);

        let indexed = pool
            .what_provides(crate::pool::DepId::Str(name))
            .into_iter()
            .find(|&p| matches(p, name, text, evr));
        if indexed.is_some() {
            return indexed;
        }

        let scanned = match repo {
            Some(repo) => pool
                .repo_solvables(repo)
                .into_iter()
                .find(|&p| matches(p, name, text, evr)),
            None => pool.solvable_ids().find(|&p| matches(p, name, text, evr)),
        };
        if scanned.is_some() {
            return scanned;
        }
    }
    None
}
