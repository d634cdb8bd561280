//! Pattern based package selection.
//!
//! A [`Selection`] is a list of job selectors with the `set*` flags they
//! imply. It is what `job <op> selection ...` lines expand to.

use bitflags::bitflags;
use glob::{MatchOptions, Pattern};

use super::{DepId, DepKind, Pool, RelOp, SolvableId, StrId};
use crate::job::{Job, JobFlags, JobOp, Selector};

bitflags! {
    /// How a selection pattern is interpreted
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SelectionFlags: u32 {
        const NAME = 1 << 0;
        const PROVIDES = 1 << 1;
        const FILELIST = 1 << 2;
        const CANON = 1 << 3;
        const DOTARCH = 1 << 4;
        const REL = 1 << 5;
        const INSTALLED_ONLY = 1 << 6;
        const GLOB = 1 << 7;
        const FLAT = 1 << 8;
        const NOCASE = 1 << 9;
        const SOURCE_ONLY = 1 << 10;
        const WITH_SOURCE = 1 << 11;
        const SKIP_KIND = 1 << 12;
        const MATCH_DEPSTR = 1 << 13;
        const WITH_DISABLED = 1 << 14;
        const WITH_BADARCH = 1 << 15;
        const ADD = 1 << 16;
        const SUBTRACT = 1 << 17;
        const FILTER = 1 << 18;

        /// Set operations against an existing selection
        const SETOPS = Self::ADD.bits() | Self::SUBTRACT.bits() | Self::FILTER.bits();
    }
}

/// Selection flag names in canonical order
pub const SELECTION_FLAG_NAMES: &[(SelectionFlags, &str)] = &[
    (SelectionFlags::NAME, "name"),
    (SelectionFlags::PROVIDES, "provides"),
    (SelectionFlags::FILELIST, "filelist"),
    (SelectionFlags::CANON, "canon"),
    (SelectionFlags::DOTARCH, "dotarch"),
    (SelectionFlags::REL, "rel"),
    (SelectionFlags::INSTALLED_ONLY, "installedonly"),
    (SelectionFlags::GLOB, "glob"),
    (SelectionFlags::FLAT, "flat"),
    (SelectionFlags::NOCASE, "nocase"),
    (SelectionFlags::SOURCE_ONLY, "sourceonly"),
    (SelectionFlags::WITH_SOURCE, "withsource"),
    (SelectionFlags::SKIP_KIND, "skipkind"),
    (SelectionFlags::MATCH_DEPSTR, "depstr"),
    (SelectionFlags::WITH_DISABLED, "withdisabled"),
    (SelectionFlags::WITH_BADARCH, "withbadarch"),
    (SelectionFlags::ADD, "add"),
    (SelectionFlags::SUBTRACT, "subtract"),
    (SelectionFlags::FILTER, "filter"),
];

impl SelectionFlags {
    pub fn from_token(name: &str) -> Option<Self> {
        SELECTION_FLAG_NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(flag, _)| *flag)
    }
}

/// Selectors with the job flags they carry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub entries: Vec<(Selector, JobFlags)>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn push(&mut self, select: Selector, flags: JobFlags) {
        self.entries.push((select, flags));
    }

    /// Reuse the selectors of existing jobs, keeping only their `set*` flags
    pub fn from_jobs(jobs: &[Job]) -> Self {
        Self {
            entries: jobs
                .iter()
                .map(|job| (job.select.clone(), job.flags & JobFlags::SETMASK))
                .collect(),
        }
    }

    /// Turn every entry into a job with the given operation and extra flags
    pub fn into_jobs(self, op: JobOp, flags: JobFlags) -> Vec<Job> {
        self.entries
            .into_iter()
            .map(|(select, setflags)| Job {
                op,
                select,
                flags: setflags | flags,
            })
            .collect()
    }
}

fn has_glob_chars(s: &str) -> bool {
    s.contains(['*', '?', '['])
}

/// Name matcher honoring `glob` and `nocase`
struct Matcher {
    literal: String,
    pattern: Option<Pattern>,
    nocase: bool,
}

impl Matcher {
    fn new(text: &str, flags: SelectionFlags) -> Self {
        let pattern = if flags.contains(SelectionFlags::GLOB) && has_glob_chars(text) {
            Pattern::new(text).ok()
        } else {
            None
        };
        Self {
            literal: text.to_string(),
            pattern,
            nocase: flags.contains(SelectionFlags::NOCASE),
        }
    }

    fn is_literal(&self) -> bool {
        self.pattern.is_none() && !self.nocase
    }

    fn matches(&self, candidate: &str) -> bool {
        match &self.pattern {
            Some(pattern) => pattern.matches_with(
                candidate,
                MatchOptions {
                    case_sensitive: !self.nocase,
                    require_literal_separator: false,
                    require_literal_leading_dot: false,
                },
            ),
            None if self.nocase => self.literal.eq_ignore_ascii_case(candidate),
            None => self.literal == candidate,
        }
    }
}

impl Pool {
    /// Whether a package may show up in a selection made with `flags`
    fn selectable(&self, p: SolvableId, flags: SelectionFlags) -> bool {
        let Some(s) = self.solvable(p) else {
            return false;
        };
        let is_source = s
            .arch
            .map(|a| super::is_source_arch(self.id2str(a)))
            .unwrap_or(false);
        if flags.contains(SelectionFlags::SOURCE_ONLY) && !is_source {
            return false;
        }
        if is_source
            && !flags.intersects(SelectionFlags::SOURCE_ONLY | SelectionFlags::WITH_SOURCE)
        {
            return false;
        }
        if flags.contains(SelectionFlags::INSTALLED_ONLY) && !self.is_installed(p) {
            return false;
        }
        if !self.is_installed(p) {
            if !flags.contains(SelectionFlags::WITH_DISABLED) && !self.is_considered(p) {
                return false;
            }
            if !is_source
                && !flags.contains(SelectionFlags::WITH_BADARCH)
                && !self.is_arch_installable(p)
            {
                return false;
            }
        }
        true
    }

    fn selectable_ids(&self, flags: SelectionFlags) -> Vec<SolvableId> {
        self.solvable_ids()
            .filter(|&p| self.selectable(p, flags))
            .collect()
    }

    /// Names (or provided names) of selectable packages that match, in id order
    fn matching_names(&self, matcher: &Matcher, flags: SelectionFlags, provides: bool) -> Vec<StrId> {
        let mut names: Vec<StrId> = Vec::new();
        for p in self.selectable_ids(flags) {
            let Some(s) = self.solvable(p) else { continue };
            let candidates: Vec<StrId> = if provides {
                s.provides.iter().filter_map(|&d| self.dep_name(d)).collect()
            } else {
                vec![s.name]
            };
            for name in candidates {
                if !names.contains(&name) && matcher.matches(self.id2str(name)) {
                    names.push(name);
                }
            }
        }
        names.sort();
        names
    }

    fn select_by_name(&self, text: &str, flags: SelectionFlags, provides: bool) -> Selection {
        let matcher = Matcher::new(text, flags);
        let mut sel = Selection::new();
        let names = if matcher.is_literal() {
            self.lookup_str(text).into_iter().collect()
        } else {
            self.matching_names(&matcher, flags, provides)
        };
        for name in names {
            let dep = DepId::Str(name);
            let select = if provides {
                Selector::Provides(dep)
            } else {
                Selector::Name(dep)
            };
            if self.selection_packages(&select, flags).is_empty() {
                continue;
            }
            sel.push(select, JobFlags::empty());
        }
        sel
    }

    /// Packages a selector addresses after applying the selection filters
    fn selection_packages(&self, select: &Selector, flags: SelectionFlags) -> Vec<SolvableId> {
        let candidates = match select {
            Selector::Name(dep) | Selector::Provides(dep)
                if flags.intersects(SelectionFlags::WITH_DISABLED | SelectionFlags::WITH_BADARCH | SelectionFlags::WITH_SOURCE | SelectionFlags::SOURCE_ONLY) =>
            {
                let by_name = matches!(select, Selector::Name(_));
                self.solvable_ids()
                    .filter(|&p| {
                        if by_name {
                            self.match_nevr(p, *dep)
                        } else {
                            self.solvable(p).is_some_and(|s| {
                                s.provides.iter().any(|&d| self.dep_name(d) == self.dep_name(*dep))
                            })
                        }
                    })
                    .collect()
            }
            _ => self.select_solvables(select),
        };
        candidates
            .into_iter()
            .filter(|&p| self.selectable(p, flags))
            .collect()
    }

    fn find_relop(text: &str) -> Option<(usize, &'static str)> {
        // longest operators first
        for op in ["<=>", "<=", ">=", "<>", "=", "<", ">"] {
            if let Some(pos) = text.find(op) {
                return Some((pos, op));
            }
        }
        None
    }

    /// Select packages matching a pattern.
    ///
    /// The pattern is tried as a name, a provided name, `name.arch`,
    /// `name <op> evr` and `name-evr[.arch]`, as allowed by `flags`.
    pub fn select(&mut self, pattern: &str, flags: SelectionFlags) -> Selection {
        let mut sel = Selection::new();
        if flags.contains(SelectionFlags::NAME) {
            sel = self.select_by_name(pattern, flags, false);
        }
        if sel.is_empty() && flags.contains(SelectionFlags::PROVIDES) {
            sel = self.select_by_name(pattern, flags, true);
        }
        if sel.is_empty() && flags.contains(SelectionFlags::DOTARCH) {
            sel = self.select_dotarch(pattern, flags);
        }
        if sel.is_empty() && flags.contains(SelectionFlags::REL) {
            sel = self.select_rel(pattern, flags);
        }
        if sel.is_empty() && flags.contains(SelectionFlags::CANON) {
            sel = self.select_canon(pattern, flags);
        }
        self.finish_selection(sel, flags)
    }

    fn select_dotarch(&mut self, pattern: &str, flags: SelectionFlags) -> Selection {
        let Some(pos) = pattern.rfind('.') else {
            return Selection::new();
        };
        let Some(arch) = self.lookup_str(&pattern[pos + 1..]) else {
            return Selection::new();
        };
        let inner = self.select_by_name(&pattern[..pos], flags, false);
        self.add_rel_to_selection(inner, DepId::Str(arch), RelOp::Arch, JobFlags::SETARCH, flags)
    }

    fn select_rel(&mut self, pattern: &str, flags: SelectionFlags) -> Selection {
        let Some((pos, op_text)) = Self::find_relop(pattern) else {
            return Selection::new();
        };
        let name = pattern[..pos].trim();
        let evr = pattern[pos + op_text.len()..].trim();
        let Some(op) = RelOp::from_name(op_text) else {
            return Selection::new();
        };
        if name.is_empty() || evr.is_empty() {
            return Selection::new();
        }
        let mut name_flags = flags;
        name_flags.remove(SelectionFlags::REL);
        let mut inner = self.select_by_name(name, name_flags, false);
        if inner.is_empty() && flags.contains(SelectionFlags::PROVIDES) {
            inner = self.select_by_name(name, name_flags, true);
        }
        let setflags = if op == RelOp::Eq {
            if evr.contains('-') {
                JobFlags::SETEVR
            } else {
                JobFlags::SETEV
            }
        } else {
            JobFlags::empty()
        };
        let evr = self.str2id(evr);
        self.add_rel_to_selection(inner, DepId::Str(evr), op, setflags, flags)
    }

    fn select_canon(&mut self, pattern: &str, flags: SelectionFlags) -> Selection {
        let mut rest = pattern;
        let mut arch = None;
        if let Some(pos) = rest.rfind('.') {
            if let Some(id) = self.lookup_str(&rest[pos + 1..]) {
                arch = Some(id);
                rest = &rest[..pos];
            }
        }
        // name-version-release first, then name-version
        let mut splits = Vec::new();
        if let Some(rel_pos) = rest.rfind('-') {
            if let Some(ver_pos) = rest[..rel_pos].rfind('-') {
                splits.push(ver_pos);
            }
            splits.push(rel_pos);
        }
        for pos in splits {
            let (name, evr) = (&rest[..pos], &rest[pos + 1..]);
            let inner = self.select_by_name(name, flags, false);
            if inner.is_empty() {
                continue;
            }
            let evr_id = self.str2id(evr);
            let setflags = if evr.contains('-') {
                JobFlags::SETEVR
            } else {
                JobFlags::SETEV
            };
            let mut sel = self.add_rel_to_selection(inner, DepId::Str(evr_id), RelOp::Eq, setflags, flags);
            if let Some(arch) = arch {
                sel = self.add_rel_to_selection(sel, DepId::Str(arch), RelOp::Arch, JobFlags::SETARCH, flags);
            }
            if !sel.is_empty() {
                return sel;
            }
        }
        Selection::new()
    }

    /// Narrow name/provides entries by wrapping their dependency in a relation
    fn add_rel_to_selection(
        &mut self,
        sel: Selection,
        evr: DepId,
        op: RelOp,
        setflags: JobFlags,
        flags: SelectionFlags,
    ) -> Selection {
        let mut out = Selection::new();
        for (select, entry_flags) in sel.entries {
            let narrowed = match select {
                Selector::Name(dep) => Selector::Name(self.rel2id(dep, evr, op)),
                Selector::Provides(dep) => Selector::Provides(self.rel2id(dep, evr, op)),
                other => other,
            };
            if self.selection_packages(&narrowed, flags).is_empty() {
                continue;
            }
            out.push(narrowed, entry_flags | setflags);
        }
        out
    }

    /// Apply `installedonly` and `flat` to a finished selection
    fn finish_selection(&self, sel: Selection, flags: SelectionFlags) -> Selection {
        let mut out = Selection::new();
        let restricted = flags.contains(SelectionFlags::INSTALLED_ONLY);
        for (select, entry_flags) in sel.entries {
            if restricted {
                let packages = self.selection_packages(&select, flags);
                if packages.is_empty() {
                    continue;
                }
                if packages != self.select_solvables(&select) {
                    out.push(Selector::OneOf(packages), entry_flags);
                    continue;
                }
            }
            out.push(select, entry_flags);
        }
        if flags.contains(SelectionFlags::FLAT) {
            return self.flatten_selection(out, flags);
        }
        out
    }

    fn flatten_selection(&self, sel: Selection, flags: SelectionFlags) -> Selection {
        if sel.len() <= 1
            && sel
                .entries
                .first()
                .map_or(true, |(s, _)| matches!(s, Selector::OneOf(_)))
        {
            return sel;
        }
        let mut packages: Vec<SolvableId> = Vec::new();
        for (select, _) in &sel.entries {
            for p in self.selection_packages(select, flags) {
                if !packages.contains(&p) {
                    packages.push(p);
                }
            }
        }
        packages.sort_unstable();
        let mut out = Selection::new();
        if !packages.is_empty() {
            out.push(Selector::OneOf(packages), JobFlags::empty());
        }
        out
    }

    fn dep_matches_text(&self, dep: DepId, matcher: &Matcher, flags: SelectionFlags) -> bool {
        if flags.contains(SelectionFlags::MATCH_DEPSTR) {
            return matcher.matches(&self.dep2str(dep));
        }
        match self.dep_name(dep) {
            Some(name) => matcher.matches(self.id2str(name)),
            None => matcher.matches(&self.dep2str(dep)),
        }
    }

    fn one_of(packages: Vec<SolvableId>) -> Selection {
        let mut sel = Selection::new();
        if !packages.is_empty() {
            sel.push(Selector::OneOf(packages), JobFlags::empty());
        }
        sel
    }

    /// Packages with a dependency of `kind` whose name (or text with
    /// `depstr`) matches the pattern
    pub fn select_matchdeps(&self, pattern: &str, flags: SelectionFlags, kind: DepKind) -> Selection {
        let matcher = Matcher::new(pattern, flags);
        let packages = self
            .selectable_ids(flags)
            .into_iter()
            .filter(|&p| {
                self.solvable(p).is_some_and(|s| {
                    s.deps(kind)
                        .iter()
                        .any(|&d| self.dep_matches_text(d, &matcher, flags))
                })
            })
            .collect();
        Self::one_of(packages)
    }

    /// Whether two dependencies can be satisfied by the same provide
    pub fn deps_intersect(&self, a: DepId, b: DepId) -> bool {
        if a == b {
            return true;
        }
        let (Some(name_a), Some(name_b)) = (self.dep_name(a), self.dep_name(b)) else {
            return false;
        };
        if name_a != name_b {
            return false;
        }
        let version = |d: DepId| match d {
            DepId::Rel(id) => {
                let rd = self.reldep(id);
                match (rd.op.version_mask(), rd.evr) {
                    (Some(mask), DepId::Str(evr)) => Some((mask, self.id2str(evr))),
                    _ => None,
                }
            }
            _ => None,
        };
        match (version(a), version(b)) {
            (Some((ma, ea)), Some((mb, eb))) => super::intersect_evrs(ma, ea, mb, eb, self.evr_mode()),
            _ => true,
        }
    }

    /// Packages with a dependency of `kind` that intersects `dep`
    pub fn select_matchdepid(&self, dep: DepId, flags: SelectionFlags, kind: DepKind) -> Selection {
        let packages = self
            .selectable_ids(flags)
            .into_iter()
            .filter(|&p| {
                self.solvable(p)
                    .is_some_and(|s| s.deps(kind).iter().any(|&d| self.deps_intersect(d, dep)))
            })
            .collect();
        Self::one_of(packages)
    }

    /// Packages with a dependency of `kind` that one of `targets` satisfies
    pub fn select_matchsolvable(
        &self,
        targets: &[SolvableId],
        flags: SelectionFlags,
        kind: DepKind,
    ) -> Selection {
        let packages = self
            .selectable_ids(flags)
            .into_iter()
            .filter(|&p| {
                self.solvable(p).is_some_and(|s| {
                    s.deps(kind).iter().any(|&d| {
                        self.what_provides(d)
                            .iter()
                            .any(|provider| targets.contains(provider))
                    })
                })
            })
            .collect();
        Self::one_of(packages)
    }

    /// Packages of a whole selection, in id order
    pub fn selection_solvables(&self, sel: &Selection) -> Vec<SolvableId> {
        let mut packages: Vec<SolvableId> = Vec::new();
        for (select, _) in &sel.entries {
            for p in self.select_solvables(select) {
                if !packages.contains(&p) {
                    packages.push(p);
                }
            }
        }
        packages.sort_unstable();
        packages
    }

    /// Combine `new` into `base` as requested by the set-operation flags.
    ///
    /// `add` appends. `subtract` and `filter` work per package; an entry
    /// that loses some of its packages becomes a `oneof` of the rest.
    pub fn combine_selection(&self, base: Selection, new: Selection, flags: SelectionFlags) -> Selection {
        if flags.contains(SelectionFlags::ADD) {
            let mut out = base;
            out.entries.extend(new.entries);
            return out;
        }
        let subtract = flags.contains(SelectionFlags::SUBTRACT);
        if !subtract && !flags.contains(SelectionFlags::FILTER) {
            return new;
        }
        let other = self.selection_solvables(&new);
        let mut out = Selection::new();
        for (select, entry_flags) in base.entries {
            let packages = self.select_solvables(&select);
            let kept: Vec<SolvableId> = packages
                .iter()
                .copied()
                .filter(|p| other.contains(p) != subtract)
                .collect();
            if kept.is_empty() {
                continue;
            }
            if kept.len() == packages.len() {
                out.push(select, entry_flags);
            } else {
                out.push(Selector::OneOf(kept), entry_flags);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_pkg(pool: &mut Pool, repo: usize, name: &str, evr: &str, arch: &str) -> SolvableId {
        let mut s = pool.new_solvable(name, evr, Some(arch));
        let n = pool.str2id(name);
        let e = pool.str2id(evr);
        let provide = pool.rel2id(DepId::Str(n), DepId::Str(e), RelOp::Eq);
        s.add_dep(DepKind::Provides, provide);
        pool.add_solvable(repo, s)
    }

    fn setup() -> (Pool, Vec<SolvableId>) {
        let mut pool = Pool::new();
        let repo = pool.add_repo(Some("test"));
        let ids = vec![
            add_pkg(&mut pool, repo, "libfoo", "1.0-1", "x86_64"),
            add_pkg(&mut pool, repo, "libfoo", "2.0-1", "i686"),
            add_pkg(&mut pool, repo, "libbar", "1.0-1", "x86_64"),
            add_pkg(&mut pool, repo, "Editor", "3-1", "noarch"),
        ];
        pool.create_whatprovides();
        (pool, ids)
    }

    #[test]
    fn test_flag_tokens_are_lowercase_names() {
        assert_eq!(SelectionFlags::from_token("depstr"), Some(SelectionFlags::MATCH_DEPSTR));
        assert_eq!(SelectionFlags::from_token("filter"), Some(SelectionFlags::FILTER));
        assert_eq!(SelectionFlags::from_token("MATCH_DEPSTR"), None);
    }

    #[test]
    fn test_select_name() {
        let (mut pool, ids) = setup();
        let sel = pool.select("libfoo", SelectionFlags::NAME);
        assert_eq!(sel.len(), 1);
        assert_eq!(pool.selection_solvables(&sel), vec![ids[0], ids[1]]);
        assert!(pool.select("nothere", SelectionFlags::NAME).is_empty());
    }

    #[test]
    fn test_select_glob_and_nocase() {
        let (mut pool, ids) = setup();
        let sel = pool.select("lib*", SelectionFlags::NAME | SelectionFlags::GLOB);
        assert_eq!(sel.len(), 2);
        assert_eq!(pool.selection_solvables(&sel), vec![ids[0], ids[1], ids[2]]);

        let sel = pool.select("editor", SelectionFlags::NAME | SelectionFlags::NOCASE);
        assert_eq!(pool.selection_solvables(&sel), vec![ids[3]]);

        let sel = pool.select(
            "lib*",
            SelectionFlags::NAME | SelectionFlags::GLOB | SelectionFlags::FLAT,
        );
        assert_eq!(sel.entries, vec![(Selector::OneOf(vec![ids[0], ids[1], ids[2]]), JobFlags::empty())]);
    }

    #[test]
    fn test_select_dotarch_and_canon() {
        let (mut pool, ids) = setup();
        let sel = pool.select("libfoo.i686", SelectionFlags::NAME | SelectionFlags::DOTARCH);
        assert_eq!(pool.selection_solvables(&sel), vec![ids[1]]);
        assert_eq!(sel.entries[0].1, JobFlags::SETARCH);

        let sel = pool.select("libfoo-1.0-1.x86_64", SelectionFlags::CANON);
        assert_eq!(pool.selection_solvables(&sel), vec![ids[0]]);
        assert!(sel.entries[0].1.contains(JobFlags::SETEVR | JobFlags::SETARCH));
    }

    #[test]
    fn test_select_rel() {
        let (mut pool, ids) = setup();
        let sel = pool.select("libfoo >= 2", SelectionFlags::NAME | SelectionFlags::REL);
        assert_eq!(pool.selection_solvables(&sel), vec![ids[1]]);
    }

    #[test]
    fn test_setops() {
        let (mut pool, ids) = setup();
        let base = pool.select("libfoo", SelectionFlags::NAME);
        let arch_only = pool.select("libfoo.x86_64", SelectionFlags::DOTARCH);

        let filtered = pool.combine_selection(base.clone(), arch_only.clone(), SelectionFlags::FILTER);
        assert_eq!(filtered.entries[0].0, Selector::OneOf(vec![ids[0]]));

        let subtracted = pool.combine_selection(base.clone(), arch_only.clone(), SelectionFlags::SUBTRACT);
        assert_eq!(subtracted.entries[0].0, Selector::OneOf(vec![ids[1]]));

        let added = pool.combine_selection(base, arch_only, SelectionFlags::ADD);
        assert_eq!(added.len(), 2);
    }

    #[test]
    fn test_matchdeps() {
        let (mut pool, ids) = setup();
        let dep = pool.parse_dep("libfoo >= 1.0").unwrap();
        pool.solvable_mut(ids[3]).unwrap().add_dep(DepKind::Requires, dep);
        pool.create_whatprovides();

        let sel = pool.select_matchdeps("libf*", SelectionFlags::GLOB, DepKind::Requires);
        assert_eq!(sel.entries[0].0, Selector::OneOf(vec![ids[3]]));

        let sel = pool.select_matchdeps("libfoo >= 1.0", SelectionFlags::MATCH_DEPSTR, DepKind::Requires);
        assert_eq!(sel.entries[0].0, Selector::OneOf(vec![ids[3]]));

        let want = pool.parse_dep("libfoo = 2.0").unwrap();
        let sel = pool.select_matchdepid(want, SelectionFlags::empty(), DepKind::Requires);
        assert_eq!(pool.selection_solvables(&sel), vec![ids[3]]);

        let sel = pool.select_matchsolvable(&[ids[1]], SelectionFlags::empty(), DepKind::Requires);
        assert_eq!(pool.selection_solvables(&sel), vec![ids[3]]);
        let sel = pool.select_matchsolvable(&[ids[2]], SelectionFlags::empty(), DepKind::Requires);
        assert!(sel.is_empty());
    }

    #[test]
    fn test_selection_into_jobs_keeps_setflags() {
        let jobs = vec![Job::new(JobOp::Install, Selector::All)
            .with_flags(JobFlags::WEAK | JobFlags::SETARCH)];
        let sel = Selection::from_jobs(&jobs);
        let jobs = sel.into_jobs(JobOp::Erase, JobFlags::CLEANDEPS);
        assert_eq!(jobs[0].op, JobOp::Erase);
        assert_eq!(jobs[0].flags, JobFlags::SETARCH | JobFlags::CLEANDEPS);
    }
}
