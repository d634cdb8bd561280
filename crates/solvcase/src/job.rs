//! Solver directives: what to do, to which packages, and how.

use bitflags::bitflags;

use crate::pool::{DepId, RepoId, SolvableId};

/// The action a job asks the solver to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JobOp {
    Noop,
    Install,
    Erase,
    Update,
    WeakenDeps,
    Multiversion,
    Lock,
    DistUpgrade,
    Verify,
    DropOrphaned,
    UserInstalled,
    AllowUninstall,
    Favor,
    Disfavor,
    Blacklist,
    ExcludeFromWeak,
}

/// Operation names; the first entry for an operation is used when encoding.
const JOB_OPS: &[(JobOp, &str)] = &[
    (JobOp::Noop, "noop"),
    (JobOp::Install, "install"),
    (JobOp::Erase, "erase"),
    (JobOp::Update, "update"),
    (JobOp::WeakenDeps, "weakendeps"),
    (JobOp::Multiversion, "multiversion"),
    (JobOp::Multiversion, "noobsoletes"),
    (JobOp::Lock, "lock"),
    (JobOp::DistUpgrade, "distupgrade"),
    (JobOp::Verify, "verify"),
    (JobOp::DropOrphaned, "droporphaned"),
    (JobOp::UserInstalled, "userinstalled"),
    (JobOp::AllowUninstall, "allowuninstall"),
    (JobOp::Favor, "favor"),
    (JobOp::Disfavor, "disfavor"),
    (JobOp::Blacklist, "blacklist"),
    (JobOp::ExcludeFromWeak, "excludefromweak"),
];

impl JobOp {
    pub fn name(self) -> &'static str {
        JOB_OPS
            .iter()
            .find(|(op, _)| *op == self)
            .map(|(_, name)| *name)
            .unwrap_or("unknown")
    }

    /// Look up an operation by name, accepting the `noobsoletes` alias
    pub fn from_name(name: &str) -> Option<Self> {
        JOB_OPS.iter().find(|(_, n)| *n == name).map(|(op, _)| *op)
    }
}

/// Which packages a job applies to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// One specific package
    Solvable(SolvableId),
    /// Packages whose name matches a dependency
    Name(DepId),
    /// Packages providing a dependency
    Provides(DepId),
    /// An explicit list of packages
    OneOf(Vec<SolvableId>),
    /// All packages of a repository
    Repo(RepoId),
    /// Every package in the pool
    All,
    /// A selector this crate cannot represent
    Unknown,
}

bitflags! {
    /// Modifiers attached to a job
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct JobFlags: u32 {
        const WEAK = 1 << 0;
        const ESSENTIAL = 1 << 1;
        const CLEANDEPS = 1 << 2;
        const ORUPDATE = 1 << 3;
        const FORCEBEST = 1 << 4;
        const TARGETED = 1 << 5;
        const NOTBYUSER = 1 << 6;
        const SETEV = 1 << 7;
        const SETEVR = 1 << 8;
        const SETARCH = 1 << 9;
        const SETVENDOR = 1 << 10;
        const SETREPO = 1 << 11;
        const NOAUTOSET = 1 << 12;

        /// Flags that describe the selection rather than the request
        const SETMASK = Self::SETEV.bits()
            | Self::SETEVR.bits()
            | Self::SETARCH.bits()
            | Self::SETVENDOR.bits()
            | Self::SETREPO.bits()
            | Self::NOAUTOSET.bits();
    }
}

/// Job flag names in canonical output order
pub const JOB_FLAG_NAMES: &[(JobFlags, &str)] = &[
    (JobFlags::WEAK, "weak"),
    (JobFlags::ESSENTIAL, "essential"),
    (JobFlags::CLEANDEPS, "cleandeps"),
    (JobFlags::ORUPDATE, "orupdate"),
    (JobFlags::FORCEBEST, "forcebest"),
    (JobFlags::TARGETED, "targeted"),
    (JobFlags::NOTBYUSER, "notbyuser"),
    (JobFlags::SETEV, "setev"),
    (JobFlags::SETEVR, "setevr"),
    (JobFlags::SETARCH, "setarch"),
    (JobFlags::SETVENDOR, "setvendor"),
    (JobFlags::SETREPO, "setrepo"),
    (JobFlags::NOAUTOSET, "noautoset"),
];

impl JobFlags {
    pub fn from_token(name: &str) -> Option<Self> {
        JOB_FLAG_NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(flag, _)| *flag)
    }

    /// Names of the set flags in canonical order
    pub fn names(self) -> Vec<&'static str> {
        JOB_FLAG_NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

/// A single solver directive
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Job {
    pub op: JobOp,
    pub select: Selector,
    pub flags: JobFlags,
}

impl Job {
    pub fn new(op: JobOp, select: Selector) -> Self {
        Self {
            op,
            select,
            flags: JobFlags::empty(),
        }
    }

    pub fn with_flags(mut self, flags: JobFlags) -> Self {
        self.flags = flags;
        self
    }
}
