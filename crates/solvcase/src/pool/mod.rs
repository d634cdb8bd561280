//! Package pool for testcase replay.
//!
//! The pool owns everything a testcase describes apart from the job queue:
//! interned strings and relations, repositories, solvables, the architecture
//! policy, vendor classes, namespace providers and the set of packages that
//! are considered at all.
//!
//! # Identity
//!
//! - Strings are interned into [`StrId`]s; relations between dependencies
//!   into [`RelId`]s. A dependency is a [`DepId`].
//! - Repositories are numbered from 1.
//! - Solvables are numbered from 1; id 1 is the system sentinel and real
//!   packages start at 2. Literals in rules are signed solvable ids.
//!
//! # Providers
//!
//! [`Pool::create_whatprovides`] builds a name index over installable,
//! considered packages (installed packages are always indexed). Until the
//! index exists, [`Pool::what_provides`] scans linearly.

mod arch;
mod dep;
mod evr;
mod selection;

use std::collections::HashMap;
use std::fmt;

pub use arch::{is_source_arch, ArchPolicy, TRIVIAL_SCORE};
pub use dep::{DepExpr, RelOp};
pub use evr::{evrcmp, intersect_evrs, vercmp, Evr, EvrMode};
pub use selection::{Selection, SelectionFlags, SELECTION_FLAG_NAMES};

use crate::job::Selector;

/// Signed solvable id; negative values are negated literals
pub type SolvableId = i32;

/// 1-based repository id
pub type RepoId = usize;

/// The system sentinel solvable
pub const SYSTEM_SOLVABLE: SolvableId = 1;

/// Interned string handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct StrId(u32);

impl StrId {
    /// The empty string, interned at creation
    pub const EMPTY: StrId = StrId(0);
}

/// Interned relation handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelId(u32);

/// A dependency: nothing, a plain name, or a relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum DepId {
    #[default]
    Null,
    Str(StrId),
    Rel(RelId),
}

/// `name <op> evr`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reldep {
    pub name: DepId,
    pub evr: DepId,
    pub op: RelOp,
}

/// Distribution flavor of the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DistType {
    #[default]
    Rpm,
    Deb,
    Arch,
    Haiku,
    Conda,
    Apk,
}

const DIST_TYPES: &[(DistType, &str)] = &[
    (DistType::Rpm, "rpm"),
    (DistType::Deb, "deb"),
    (DistType::Arch, "arch"),
    (DistType::Haiku, "haiku"),
    (DistType::Conda, "conda"),
    (DistType::Apk, "apk"),
];

impl DistType {
    pub fn name(self) -> &'static str {
        DIST_TYPES
            .iter()
            .find(|(t, _)| *t == self)
            .map(|(_, name)| *name)
            .unwrap_or("unknown")
    }

    pub fn from_name(name: &str) -> Option<Self> {
        DIST_TYPES.iter().find(|(_, n)| *n == name).map(|(t, _)| *t)
    }
}

/// Dependency arrays of a solvable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepKind {
    Provides,
    Requires,
    Conflicts,
    Obsoletes,
    Recommends,
    Suggests,
    Supplements,
    Enhances,
}

const DEP_KINDS: &[(DepKind, &str)] = &[
    (DepKind::Provides, "provides"),
    (DepKind::Requires, "requires"),
    (DepKind::Conflicts, "conflicts"),
    (DepKind::Obsoletes, "obsoletes"),
    (DepKind::Recommends, "recommends"),
    (DepKind::Suggests, "suggests"),
    (DepKind::Supplements, "supplements"),
    (DepKind::Enhances, "enhances"),
];

impl DepKind {
    pub fn name(self) -> &'static str {
        DEP_KINDS
            .iter()
            .find(|(k, _)| *k == self)
            .map(|(_, name)| *name)
            .unwrap_or("unknown")
    }

    /// Resolve a key name; both `requires` and `solvable:requires` are accepted
    pub fn from_keyname(name: &str) -> Option<Self> {
        let name = name.strip_prefix("solvable:").unwrap_or(name);
        DEP_KINDS.iter().find(|(_, n)| *n == name).map(|(k, _)| *k)
    }
}

/// A package
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Solvable {
    pub name: StrId,
    pub evr: StrId,
    pub arch: Option<StrId>,
    pub vendor: Option<StrId>,
    pub repo: Option<RepoId>,
    /// Build flavors, rendered as `-flavor` segments after the evr
    pub flavors: Vec<StrId>,
    pub provides: Vec<DepId>,
    pub requires: Vec<DepId>,
    pub conflicts: Vec<DepId>,
    pub obsoletes: Vec<DepId>,
    pub recommends: Vec<DepId>,
    pub suggests: Vec<DepId>,
    pub supplements: Vec<DepId>,
    pub enhances: Vec<DepId>,
}

impl Solvable {
    pub fn deps(&self, kind: DepKind) -> &[DepId] {
        match kind {
            DepKind::Provides => &self.provides,
            DepKind::Requires => &self.requires,
            DepKind::Conflicts => &self.conflicts,
            DepKind::Obsoletes => &self.obsoletes,
            DepKind::Recommends => &self.recommends,
            DepKind::Suggests => &self.suggests,
            DepKind::Supplements => &self.supplements,
            DepKind::Enhances => &self.enhances,
        }
    }

    pub fn deps_mut(&mut self, kind: DepKind) -> &mut Vec<DepId> {
        match kind {
            DepKind::Provides => &mut self.provides,
            DepKind::Requires => &mut self.requires,
            DepKind::Conflicts => &mut self.conflicts,
            DepKind::Obsoletes => &mut self.obsoletes,
            DepKind::Recommends => &mut self.recommends,
            DepKind::Suggests => &mut self.suggests,
            DepKind::Supplements => &mut self.supplements,
            DepKind::Enhances => &mut self.enhances,
        }
    }

    /// Append a dependency unless it is already present
    pub fn add_dep(&mut self, kind: DepKind, dep: DepId) {
        let deps = self.deps_mut(kind);
        if !deps.contains(&dep) {
            deps.push(dep);
        }
    }
}

/// A repository
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Repo {
    pub name: Option<String>,
    pub priority: i32,
    pub subpriority: i32,
}

/// Returns true when a vendor change from the first to the second package is forbidden
pub type VendorCheck = Box<dyn Fn(&Pool, SolvableId, SolvableId) -> bool>;

/// Computes the providers of `namespace:NAME(ARG)`
pub type NamespaceCallback = Box<dyn Fn(&Pool, StrId, DepId) -> Vec<SolvableId>>;

pub struct Pool {
    strings: Vec<String>,
    string_ids: HashMap<String, StrId>,

    rels: Vec<Reldep>,
    rel_ids: HashMap<Reldep, RelId>,

    /// Solvables indexed by id; 0 is a placeholder, 1 the system solvable
    solvables: Vec<Solvable>,

    /// Repositories indexed by id; 0 is a placeholder
    repos: Vec<Repo>,

    installed: Option<RepoId>,
    disttype: DistType,
    arch_policy: Option<ArchPolicy>,
    pub flags: crate::flags::PoolFlags,

    vendor_classes: Vec<Vec<String>>,
    vendor_check: Option<VendorCheck>,

    namespace_callback: Option<NamespaceCallback>,
    namespace_providers: HashMap<RelId, Vec<SolvableId>>,

    /// Packages still considered; `None` means all of them
    considered: Option<Vec<bool>>,

    /// Name -> providers, built by `create_whatprovides`
    whatprovides: Option<HashMap<StrId, Vec<SolvableId>>>,
}

impl fmt::Debug for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("strings", &self.strings.len())
            .field("rels", &self.rels.len())
            .field("solvables", &self.solvables)
            .field("repos", &self.repos)
            .field("installed", &self.installed)
            .field("disttype", &self.disttype)
            .field("arch_policy", &self.arch_policy)
            .field("flags", &self.flags)
            .field("vendor_classes", &self.vendor_classes)
            .field("vendor_check", &self.vendor_check.is_some())
            .field("namespace_callback", &self.namespace_callback.is_some())
            .field("namespace_providers", &self.namespace_providers)
            .field("considered", &self.considered)
            .finish()
    }
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

impl Pool {
    /// Create a new empty pool
    pub fn new() -> Self {
        let mut pool = Self {
            strings: Vec::new(),
            string_ids: HashMap::new(),
            rels: Vec::new(),
            rel_ids: HashMap::new(),
            solvables: Vec::new(),
            repos: vec![Repo::default()],
            installed: None,
            disttype: DistType::default(),
            arch_policy: None,
            flags: Default::default(),
            vendor_classes: Vec::new(),
            vendor_check: None,
            namespace_callback: None,
            namespace_providers: HashMap::new(),
            considered: None,
            whatprovides: None,
        };
        pool.str2id("");
        let system = Solvable {
            name: pool.str2id("system:system"),
            arch: Some(pool.str2id("noarch")),
            ..Default::default()
        };
        pool.solvables.push(Solvable::default());
        pool.solvables.push(system);
        pool
    }

    // ---- strings and relations ----

    /// Intern a string
    pub fn str2id(&mut self, s: &str) -> StrId {
        if let Some(&id) = self.string_ids.get(s) {
            return id;
        }
        let id = StrId(self.strings.len() as u32);
        self.strings.push(s.to_string());
        self.string_ids.insert(s.to_string(), id);
        id
    }

    /// Look up an already interned string
    pub fn lookup_str(&self, s: &str) -> Option<StrId> {
        self.string_ids.get(s).copied()
    }

    pub fn id2str(&self, id: StrId) -> &str {
        self.strings
            .get(id.0 as usize)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Intern a relation
    pub fn rel2id(&mut self, name: DepId, evr: DepId, op: RelOp) -> DepId {
        let rd = Reldep { name, evr, op };
        if let Some(&id) = self.rel_ids.get(&rd) {
            return DepId::Rel(id);
        }
        let id = RelId(self.rels.len() as u32);
        self.rels.push(rd);
        self.rel_ids.insert(rd, id);
        DepId::Rel(id)
    }

    pub fn lookup_rel(&self, name: DepId, evr: DepId, op: RelOp) -> Option<DepId> {
        self.rel_ids
            .get(&Reldep { name, evr, op })
            .map(|&id| DepId::Rel(id))
    }

    pub fn reldep(&self, id: RelId) -> Reldep {
        self.rels[id.0 as usize]
    }

    /// All interned relations in creation order
    pub fn rel_ids(&self) -> impl Iterator<Item = RelId> {
        (0..self.rels.len() as u32).map(RelId)
    }

    /// Intern a dependency tree
    pub fn intern_dep(&mut self, expr: &DepExpr) -> DepId {
        match expr {
            DepExpr::Null => DepId::Null,
            DepExpr::Lit(s) => DepId::Str(self.str2id(s)),
            DepExpr::Rel(name, op, evr) => {
                let name = self.intern_dep(name);
                let evr = self.intern_dep(evr);
                self.rel2id(name, evr, *op)
            }
        }
    }

    /// Find a dependency tree without interning anything
    pub fn lookup_dep(&self, expr: &DepExpr) -> Option<DepId> {
        match expr {
            DepExpr::Null => Some(DepId::Null),
            DepExpr::Lit(s) => self.lookup_str(s).map(DepId::Str),
            DepExpr::Rel(name, op, evr) => {
                let name = self.lookup_dep(name)?;
                let evr = self.lookup_dep(evr)?;
                self.lookup_rel(name, evr, *op)
            }
        }
    }

    /// Expand an id into its tree form
    pub fn dep_expr(&self, dep: DepId) -> DepExpr {
        match dep {
            DepId::Null => DepExpr::Null,
            DepId::Str(id) => DepExpr::Lit(self.id2str(id).to_string()),
            DepId::Rel(id) => {
                let rd = self.reldep(id);
                DepExpr::rel(self.dep_expr(rd.name), rd.op, self.dep_expr(rd.evr))
            }
        }
    }

    pub fn dep2str(&self, dep: DepId) -> String {
        self.dep_expr(dep).to_string()
    }

    /// Parse and intern dependency text
    pub fn parse_dep(&mut self, text: &str) -> Option<DepId> {
        DepExpr::parse(text).map(|expr| self.intern_dep(&expr))
    }

    /// The name a plain or versioned dependency refers to
    pub fn dep_name(&self, dep: DepId) -> Option<StrId> {
        match dep {
            DepId::Str(id) => Some(id),
            DepId::Rel(id) => {
                let rd = self.reldep(id);
                match rd.name {
                    DepId::Str(name) if rd.op.version_mask().is_some() => Some(name),
                    _ => None,
                }
            }
            DepId::Null => None,
        }
    }

    // ---- repos ----

    pub fn add_repo(&mut self, name: Option<&str>) -> RepoId {
        self.repos.push(Repo {
            name: name.map(str::to_string),
            ..Default::default()
        });
        self.repos.len() - 1
    }

    pub fn repo(&self, id: RepoId) -> Option<&Repo> {
        if id == 0 {
            return None;
        }
        self.repos.get(id)
    }

    pub fn repo_mut(&mut self, id: RepoId) -> Option<&mut Repo> {
        if id == 0 {
            return None;
        }
        self.repos.get_mut(id)
    }

    /// One past the highest repo id
    pub fn repo_count(&self) -> usize {
        self.repos.len()
    }

    pub fn repo_ids(&self) -> impl Iterator<Item = RepoId> {
        1..self.repos.len()
    }

    /// Packages of a repository in id order
    pub fn repo_solvables(&self, repo: RepoId) -> Vec<SolvableId> {
        self.solvable_ids()
            .filter(|&p| self.solvables[p as usize].repo == Some(repo))
            .collect()
    }

    pub fn installed(&self) -> Option<RepoId> {
        self.installed
    }

    pub fn set_installed(&mut self, repo: Option<RepoId>) {
        self.installed = repo;
        self.whatprovides = None;
    }

    pub fn is_installed(&self, p: SolvableId) -> bool {
        self.installed.is_some()
            && self.solvable(p).and_then(|s| s.repo) == self.installed
    }

    // ---- solvables ----

    /// Build a solvable from strings, interning them
    pub fn new_solvable(&mut self, name: &str, evr: &str, arch: Option<&str>) -> Solvable {
        Solvable {
            name: self.str2id(name),
            evr: self.str2id(evr),
            arch: arch.map(|a| self.str2id(a)),
            ..Default::default()
        }
    }

    /// Add a solvable to a repository
    pub fn add_solvable(&mut self, repo: RepoId, mut solvable: Solvable) -> SolvableId {
        solvable.repo = Some(repo);
        let id = self.solvables.len() as SolvableId;
        self.solvables.push(solvable);
        if let Some(map) = self.considered.as_mut() {
            map.push(true);
        }
        self.whatprovides = None;
        id
    }

    pub fn solvable(&self, p: SolvableId) -> Option<&Solvable> {
        if p <= 0 {
            return None;
        }
        self.solvables.get(p as usize)
    }

    pub fn solvable_mut(&mut self, p: SolvableId) -> Option<&mut Solvable> {
        if p <= 0 {
            return None;
        }
        self.whatprovides = None;
        self.solvables.get_mut(p as usize)
    }

    /// One past the highest solvable id
    pub fn solvable_count(&self) -> SolvableId {
        self.solvables.len() as SolvableId
    }

    /// Ids of all packages that belong to a repository
    pub fn solvable_ids(&self) -> impl Iterator<Item = SolvableId> + '_ {
        (2..self.solvables.len())
            .filter(|&p| self.solvables[p].repo.is_some())
            .map(|p| p as SolvableId)
    }

    /// Short display form `name-evr.arch`, used in messages
    pub fn solvable2str(&self, p: SolvableId) -> String {
        if p == SYSTEM_SOLVABLE {
            return "@SYSTEM".to_string();
        }
        match self.solvable(p) {
            Some(s) => {
                let mut out = format!("{}-{}", self.id2str(s.name), self.id2str(s.evr));
                if let Some(arch) = s.arch {
                    out.push('.');
                    out.push_str(self.id2str(arch));
                }
                out
            }
            None => format!("#{}", p),
        }
    }

    // ---- dist type and architecture ----

    pub fn disttype(&self) -> DistType {
        self.disttype
    }

    pub fn set_disttype(&mut self, disttype: DistType) {
        self.disttype = disttype;
    }

    pub fn evr_mode(&self) -> EvrMode {
        match self.disttype {
            DistType::Deb => EvrMode::Compare,
            _ => EvrMode::MatchRelease,
        }
    }

    pub fn arch_policy(&self) -> Option<&ArchPolicy> {
        self.arch_policy.as_ref()
    }

    /// Set the machine architecture; `None` removes any policy
    pub fn set_arch(&mut self, arch: Option<&str>) {
        self.set_arch_policy(arch.map(ArchPolicy::for_arch));
    }

    pub fn set_arch_policy(&mut self, policy: Option<ArchPolicy>) {
        self.arch_policy = policy;
        self.whatprovides = None;
    }

    /// Whether the package architecture fits the policy
    pub fn is_arch_installable(&self, p: SolvableId) -> bool {
        let Some(s) = self.solvable(p) else {
            return false;
        };
        let arch = s.arch.map(|a| self.id2str(a));
        if arch.is_some_and(is_source_arch) {
            return false;
        }
        match (&self.arch_policy, arch) {
            (None, _) => true,
            (Some(policy), Some(arch)) => policy.is_installable(arch),
            (Some(_), None) => false,
        }
    }

    // ---- considered map ----

    pub fn is_considered(&self, p: SolvableId) -> bool {
        match &self.considered {
            Some(map) => map.get(p as usize).copied().unwrap_or(true),
            None => true,
        }
    }

    pub fn has_considered_map(&self) -> bool {
        self.considered.is_some()
    }

    /// Create the considered map with every package enabled, if missing
    pub fn ensure_considered_map(&mut self) {
        if self.considered.is_none() {
            self.considered = Some(vec![true; self.solvables.len()]);
        }
    }

    pub fn set_considered(&mut self, p: SolvableId, value: bool) {
        self.ensure_considered_map();
        if let Some(slot) = self
            .considered
            .as_mut()
            .and_then(|map| map.get_mut(p as usize))
        {
            *slot = value;
        }
        self.whatprovides = None;
    }

    pub fn clear_considered_map(&mut self) {
        self.considered = None;
        self.whatprovides = None;
    }

    // ---- vendors ----

    pub fn add_vendor_class(&mut self, vendors: Vec<String>) {
        self.vendor_classes.push(vendors);
    }

    pub fn vendor_classes(&self) -> &[Vec<String>] {
        &self.vendor_classes
    }

    pub fn set_vendor_check<F>(&mut self, check: F)
    where
        F: Fn(&Pool, SolvableId, SolvableId) -> bool + 'static,
    {
        self.vendor_check = Some(Box::new(check));
    }

    pub fn has_vendor_check(&self) -> bool {
        self.vendor_check.is_some()
    }

    /// Whether replacing `p1` by `p2` is a forbidden vendor change
    pub fn vendor_change_forbidden(&self, p1: SolvableId, p2: SolvableId) -> bool {
        if let Some(check) = &self.vendor_check {
            return check(self, p1, p2);
        }
        let vendor = |p| {
            self.solvable(p)
                .and_then(|s| s.vendor)
                .map(|v| self.id2str(v))
                .unwrap_or("")
        };
        let (v1, v2) = (vendor(p1), vendor(p2));
        if v1 == v2 {
            return false;
        }
        !self.vendor_classes.iter().any(|class| {
            class.iter().any(|v| v == v1) && class.iter().any(|v| v == v2)
        })
    }

    // ---- namespaces ----

    pub fn set_namespace_callback<F>(&mut self, callback: F)
    where
        F: Fn(&Pool, StrId, DepId) -> Vec<SolvableId> + 'static,
    {
        self.namespace_callback = Some(Box::new(callback));
    }

    /// Fix the providers of a namespace relation
    pub fn set_namespace_providers(&mut self, rel: RelId, providers: Vec<SolvableId>) {
        self.namespace_providers.insert(rel, providers);
    }

    pub fn has_namespace_support(&self) -> bool {
        self.namespace_callback.is_some() || !self.namespace_providers.is_empty()
    }

    // ---- provider index ----

    /// Whether a package takes part in the provider index
    fn in_provider_index(&self, p: SolvableId) -> bool {
        if self.is_installed(p) {
            return true;
        }
        if !self.is_arch_installable(p) {
            return false;
        }
        self.is_considered(p) || self.flags.get("whatprovideswithdisabled") == Some(true)
    }

    fn provides_name(&self, s: &Solvable, name: StrId) -> bool {
        s.provides.iter().any(|&d| self.dep_name(d) == Some(name))
    }

    /// Build the name -> providers index
    pub fn create_whatprovides(&mut self) {
        let mut index: HashMap<StrId, Vec<SolvableId>> = HashMap::new();
        for p in self.solvable_ids() {
            if !self.in_provider_index(p) {
                continue;
            }
            let s = &self.solvables[p as usize];
            for &dep in &s.provides {
                if let Some(name) = self.dep_name(dep) {
                    let providers = index.entry(name).or_default();
                    if providers.last() != Some(&p) {
                        providers.push(p);
                    }
                }
            }
        }
        log::debug!("created provider index for {} names", index.len());
        self.whatprovides = Some(index);
    }

    pub fn has_whatprovides(&self) -> bool {
        self.whatprovides.is_some()
    }

    fn name_providers(&self, name: StrId) -> Vec<SolvableId> {
        match &self.whatprovides {
            Some(index) => index.get(&name).cloned().unwrap_or_default(),
            None => self
                .solvable_ids()
                .filter(|&p| {
                    self.in_provider_index(p)
                        && self.provides_name(&self.solvables[p as usize], name)
                })
                .collect(),
        }
    }

    fn provides_version(&self, p: SolvableId, name: StrId, mask: u8, evr: &str) -> bool {
        let Some(s) = self.solvable(p) else {
            return false;
        };
        let mode = self.evr_mode();
        s.provides.iter().any(|&dep| match dep {
            DepId::Str(n) => n == name,
            DepId::Rel(id) => {
                let rd = self.reldep(id);
                match (rd.name, rd.evr, rd.op.version_mask()) {
                    (DepId::Str(n), DepId::Str(e), Some(m)) if n == name => {
                        intersect_evrs(m, self.id2str(e), mask, evr, mode)
                    }
                    _ => false,
                }
            }
            DepId::Null => false,
        })
    }

    /// Packages that provide a dependency, in id order
    pub fn what_provides(&self, dep: DepId) -> Vec<SolvableId> {
        match dep {
            DepId::Null => Vec::new(),
            DepId::Str(name) => self.name_providers(name),
            DepId::Rel(id) => self.rel_providers(id),
        }
    }

    fn rel_providers(&self, id: RelId) -> Vec<SolvableId> {
        let rd = self.reldep(id);
        if let Some(mask) = rd.op.version_mask() {
            let (DepId::Str(name), DepId::Str(evr)) = (rd.name, rd.evr) else {
                return Vec::new();
            };
            let evr = self.id2str(evr);
            return self
                .name_providers(name)
                .into_iter()
                .filter(|&p| self.provides_version(p, name, mask, evr))
                .collect();
        }
        match rd.op {
            RelOp::And | RelOp::With => {
                let right = self.what_provides(rd.evr);
                self.what_provides(rd.name)
                    .into_iter()
                    .filter(|p| right.contains(p))
                    .collect()
            }
            RelOp::Or => {
                let mut providers = self.what_provides(rd.name);
                for p in self.what_provides(rd.evr) {
                    if !providers.contains(&p) {
                        providers.push(p);
                    }
                }
                providers.sort_unstable();
                providers
            }
            RelOp::Without => {
                let right = self.what_provides(rd.evr);
                self.what_provides(rd.name)
                    .into_iter()
                    .filter(|p| !right.contains(p))
                    .collect()
            }
            RelOp::Namespace => {
                if let Some(providers) = self.namespace_providers.get(&id) {
                    return providers.clone();
                }
                match (&self.namespace_callback, rd.name) {
                    (Some(callback), DepId::Str(name)) => callback(self, name, rd.evr),
                    _ => Vec::new(),
                }
            }
            RelOp::Arch => {
                let DepId::Str(arch) = rd.evr else {
                    return Vec::new();
                };
                self.what_provides(rd.name)
                    .into_iter()
                    .filter(|&p| self.solvable(p).and_then(|s| s.arch) == Some(arch))
                    .collect()
            }
            RelOp::Cond | RelOp::Unless | RelOp::Else => self.what_provides(rd.name),
            _ => Vec::new(),
        }
    }

    /// Whether a package's own name and version match a dependency
    pub fn match_nevr(&self, p: SolvableId, dep: DepId) -> bool {
        let Some(s) = self.solvable(p) else {
            return false;
        };
        match dep {
            DepId::Null => false,
            DepId::Str(name) => s.name == name,
            DepId::Rel(id) => {
                let rd = self.reldep(id);
                if let Some(mask) = rd.op.version_mask() {
                    return match (rd.name, rd.evr) {
                        (DepId::Str(name), DepId::Str(evr)) => {
                            s.name == name
                                && intersect_evrs(
                                    2,
                                    self.id2str(s.evr),
                                    mask,
                                    self.id2str(evr),
                                    self.evr_mode(),
                                )
                        }
                        _ => false,
                    };
                }
                match rd.op {
                    RelOp::Arch => {
                        self.match_nevr(p, rd.name)
                            && matches!(rd.evr, DepId::Str(a) if s.arch == Some(a))
                    }
                    RelOp::Or => self.match_nevr(p, rd.name) || self.match_nevr(p, rd.evr),
                    RelOp::And | RelOp::With => {
                        self.match_nevr(p, rd.name) && self.match_nevr(p, rd.evr)
                    }
                    RelOp::Without => {
                        self.match_nevr(p, rd.name) && !self.match_nevr(p, rd.evr)
                    }
                    _ => false,
                }
            }
        }
    }

    /// Expand a job selector into the packages it addresses
    pub fn select_solvables(&self, select: &Selector) -> Vec<SolvableId> {
        match select {
            Selector::Solvable(p) => vec![*p],
            Selector::Name(dep) => self
                .what_provides(*dep)
                .into_iter()
                .filter(|&p| self.match_nevr(p, *dep))
                .collect(),
            Selector::Provides(dep) => self.what_provides(*dep),
            Selector::OneOf(list) => list.clone(),
            Selector::Repo(repo) => self.repo_solvables(*repo),
            Selector::All => self.solvable_ids().collect(),
            Selector::Unknown => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_pkg(pool: &mut Pool, repo: RepoId, name: &str, evr: &str, arch: &str) -> SolvableId {
        let mut s = pool.new_solvable(name, evr, Some(arch));
        let n = pool.str2id(name);
        let e = pool.str2id(evr);
        let self_provide = pool.rel2id(DepId::Str(n), DepId::Str(e), RelOp::Eq);
        s.add_dep(DepKind::Provides, self_provide);
        pool.add_solvable(repo, s)
    }

    #[test]
    fn test_interning() {
        let mut pool = Pool::new();
        let a = pool.str2id("A");
        assert_eq!(pool.str2id("A"), a);
        assert_eq!(pool.lookup_str("A"), Some(a));
        assert_eq!(pool.lookup_str("B"), None);
        assert_eq!(pool.id2str(a), "A");

        let dep = pool.parse_dep("A >= 1").unwrap();
        assert_eq!(pool.dep2str(dep), "A >= 1");
        assert_eq!(pool.lookup_dep(&DepExpr::parse("A >= 1").unwrap()), Some(dep));
        assert_eq!(pool.lookup_dep(&DepExpr::parse("A >= 2").unwrap()), None);
    }

    #[test]
    fn test_what_provides_versioned() {
        let mut pool = Pool::new();
        let repo = pool.add_repo(Some("test"));
        let a1 = add_pkg(&mut pool, repo, "A", "1-1", "noarch");
        let a2 = add_pkg(&mut pool, repo, "A", "2-1", "noarch");
        pool.create_whatprovides();

        let any = pool.parse_dep("A").unwrap();
        assert_eq!(pool.what_provides(any), vec![a1, a2]);

        let newer = pool.parse_dep("A > 1").unwrap();
        assert_eq!(pool.what_provides(newer), vec![a2]);

        let either = pool.parse_dep("A = 1 | A = 2").unwrap();
        assert_eq!(pool.what_provides(either), vec![a1, a2]);
    }

    #[test]
    fn test_linear_scan_without_index() {
        let mut pool = Pool::new();
        let repo = pool.add_repo(Some("test"));
        let a = add_pkg(&mut pool, repo, "A", "1-1", "noarch");
        assert!(!pool.has_whatprovides());
        let dep = pool.parse_dep("A").unwrap();
        assert_eq!(pool.what_provides(dep), vec![a]);
    }

    #[test]
    fn test_disabled_and_badarch_not_indexed() {
        let mut pool = Pool::new();
        let repo = pool.add_repo(Some("test"));
        let a = add_pkg(&mut pool, repo, "A", "1-1", "x86_64");
        let b = add_pkg(&mut pool, repo, "B", "1-1", "aarch64");
        let c = add_pkg(&mut pool, repo, "C", "1-1", "noarch");
        pool.set_arch(Some("x86_64"));
        pool.set_considered(c, false);
        pool.create_whatprovides();

        let dep_a = pool.parse_dep("A").unwrap();
        let dep_b = pool.parse_dep("B").unwrap();
        let dep_c = pool.parse_dep("C").unwrap();
        assert_eq!(pool.what_provides(dep_a), vec![a]);
        assert!(pool.what_provides(dep_b).is_empty());
        assert!(pool.what_provides(dep_c).is_empty());
        assert!(!pool.is_considered(c));
        assert!(pool.is_considered(b));
    }

    #[test]
    fn test_installed_always_indexed() {
        let mut pool = Pool::new();
        let system = pool.add_repo(Some("system"));
        let a = add_pkg(&mut pool, system, "A", "1-1", "sparc");
        pool.set_installed(Some(system));
        pool.set_arch(Some("x86_64"));
        pool.create_whatprovides();
        let dep = pool.parse_dep("A").unwrap();
        assert_eq!(pool.what_provides(dep), vec![a]);
        assert!(pool.is_installed(a));
    }

    #[test]
    fn test_namespace_providers() {
        let mut pool = Pool::new();
        let repo = pool.add_repo(Some("test"));
        let a = add_pkg(&mut pool, repo, "A", "1-1", "noarch");
        let name = pool.str2id("namespace:language");
        let arg = pool.str2id("de");
        let dep = pool.rel2id(DepId::Str(name), DepId::Str(arg), RelOp::Namespace);
        assert!(pool.what_provides(dep).is_empty());

        pool.set_namespace_callback(move |_, _, _| vec![a]);
        assert_eq!(pool.what_provides(dep), vec![a]);

        let DepId::Rel(rel) = dep else { unreachable!() };
        pool.set_namespace_providers(rel, vec![SYSTEM_SOLVABLE]);
        assert_eq!(pool.what_provides(dep), vec![SYSTEM_SOLVABLE]);
    }

    #[test]
    fn test_select_name_and_repo() {
        let mut pool = Pool::new();
        let repo = pool.add_repo(Some("test"));
        let a = add_pkg(&mut pool, repo, "A", "1-1", "noarch");
        let b = add_pkg(&mut pool, repo, "B", "1-1", "noarch");
        let bdep = {
            let name = pool.str2id("A");
            DepId::Str(name)
        };
        pool.solvable_mut(b).unwrap().add_dep(DepKind::Provides, bdep);
        pool.create_whatprovides();

        let name_a = pool.parse_dep("A").unwrap();
        assert_eq!(pool.select_solvables(&Selector::Name(name_a)), vec![a]);
        assert_eq!(pool.select_solvables(&Selector::Provides(name_a)), vec![a, b]);
        assert_eq!(pool.select_solvables(&Selector::Repo(repo)), vec![a, b]);
        assert_eq!(pool.select_solvables(&Selector::All), vec![a, b]);
    }

    #[test]
    fn test_vendor_classes() {
        let mut pool = Pool::new();
        let repo = pool.add_repo(Some("test"));
        let a = add_pkg(&mut pool, repo, "A", "1-1", "noarch");
        let b = add_pkg(&mut pool, repo, "A", "2-1", "noarch");
        let suse = pool.str2id("SUSE");
        let obs = pool.str2id("openSUSE Build Service");
        pool.solvable_mut(a).unwrap().vendor = Some(suse);
        pool.solvable_mut(b).unwrap().vendor = Some(obs);
        assert!(pool.vendor_change_forbidden(a, b));

        pool.add_vendor_class(vec!["SUSE".to_string(), "openSUSE Build Service".to_string()]);
        assert!(!pool.vendor_change_forbidden(a, b));
    }
}
