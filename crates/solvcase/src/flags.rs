//! Named boolean flag sets for the pool and the solver.
//!
//! Both sets are plain owned values. A testcase read starts from
//! [`Flags::default`] and applies the `poolflags`/`solverflags` directives on
//! top, so nothing leaks from one read into the next.

use std::fmt;
use std::marker::PhantomData;

/// One entry of a flag table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagDef {
    pub name: &'static str,
    pub default: bool,
}

const fn flag(name: &'static str, default: bool) -> FlagDef {
    FlagDef { name, default }
}

/// A static table of flag names with their default values.
pub trait FlagTable {
    const FLAGS: &'static [FlagDef];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverFlagTable {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolFlagTable {}

impl FlagTable for SolverFlagTable {
    const FLAGS: &'static [FlagDef] = &[
        flag("allowdowngrade", false),
        flag("allownamechange", true),
        flag("allowarchchange", false),
        flag("allowvendorchange", false),
        flag("allowuninstall", false),
        flag("noupdateprovide", false),
        flag("splitprovides", false),
        flag("ignorerecommended", false),
        flag("addalreadyrecommended", false),
        flag("noinfarchcheck", false),
        flag("keepexplicitobsoletes", false),
        flag("bestobeypolicy", false),
        flag("noautotarget", false),
        flag("dupallowdowngrade", true),
        flag("dupallowarchchange", true),
        flag("dupallowvendorchange", true),
        flag("dupallownamechange", true),
        flag("keeporphans", false),
        flag("breakorphans", false),
        flag("focusinstalled", false),
        flag("yumobsoletes", false),
        flag("needupdateprovide", false),
        flag("urpmreorder", false),
        flag("focusbest", false),
        flag("strongrecommends", false),
        flag("installalsoupdates", false),
        flag("onlynamespacerecommended", false),
        flag("strictrepopriority", false),
        flag("focusnew", false),
    ];
}

impl FlagTable for PoolFlagTable {
    const FLAGS: &'static [FlagDef] = &[
        flag("promoteepoch", false),
        flag("forbidselfconflicts", false),
        flag("obsoleteusesprovides", false),
        flag("implicitobsoleteusesprovides", false),
        flag("obsoleteusescolors", false),
        flag("implicitobsoleteusescolors", false),
        flag("noinstalledobsoletes", false),
        flag("havedistepoch", false),
        flag("noobsoletesmultiversion", false),
        flag("addfileprovidesfiltered", false),
        flag("nowhatprovidesaux", false),
        flag("whatprovideswithdisabled", false),
    ];
}

/// Solver policy flags (`solverflags` directive)
pub type SolverFlags = Flags<SolverFlagTable>;

/// Pool behavior flags (`poolflags` directive)
pub type PoolFlags = Flags<PoolFlagTable>;

/// A set of named boolean flags backed by a static table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flags<T: FlagTable> {
    bits: u64,
    _table: PhantomData<T>,
}

impl<T: FlagTable> Default for Flags<T> {
    fn default() -> Self {
        let bits = T::FLAGS
            .iter()
            .enumerate()
            .filter(|(_, def)| def.default)
            .fold(0u64, |bits, (i, _)| bits | (1 << i));
        Self {
            bits,
            _table: PhantomData,
        }
    }
}

impl<T: FlagTable> Flags<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn index(name: &str) -> Option<usize> {
        T::FLAGS.iter().position(|def| def.name == name)
    }

    /// Get a flag by name, `None` for unknown names
    pub fn get(&self, name: &str) -> Option<bool> {
        Self::index(name).map(|i| self.bits & (1 << i) != 0)
    }

    /// Set a flag by name. Returns false for unknown names.
    pub fn set(&mut self, name: &str, value: bool) -> bool {
        match Self::index(name) {
            Some(i) => {
                if value {
                    self.bits |= 1 << i;
                } else {
                    self.bits &= !(1 << i);
                }
                true
            }
            None => false,
        }
    }

    /// Builder-style variant of [`Flags::set`]; unknown names are ignored
    pub fn with(mut self, name: &str, value: bool) -> Self {
        self.set(name, value);
        self
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_default(&self) -> bool {
        self.bits == Self::default().bits
    }

    /// Apply a flag list such as `allowuninstall !allownamechange`.
    ///
    /// Tokens are separated by spaces, tabs or commas. A leading `!` clears
    /// the flag. Unknown names are returned and otherwise ignored.
    pub fn apply(&mut self, text: &str) -> Vec<String> {
        let mut unknown = Vec::new();
        for token in text.split([' ', '\t', ',']).filter(|t| !t.is_empty()) {
            let (name, value) = match token.strip_prefix('!') {
                Some(rest) => (rest, false),
                None => (token, true),
            };
            if !self.set(name, value) {
                unknown.push(name.to_string());
            }
        }
        unknown
    }

    /// Flags that differ from their defaults, in table order
    pub fn changed(&self) -> impl Iterator<Item = (&'static str, bool)> + '_ {
        T::FLAGS.iter().enumerate().filter_map(move |(i, def)| {
            let value = self.bits & (1 << i) != 0;
            (value != def.default).then_some((def.name, value))
        })
    }
}

/// Space separated list of the changed flags; disabled defaults get a `!`.
impl<T: FlagTable> fmt::Display for Flags<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in self.changed() {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            if !value {
                f.write_str("!")?;
            }
            f.write_str(name)?;
        }
        Ok(())
    }
}
