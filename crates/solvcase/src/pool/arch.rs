//! Architecture compatibility policy.

/// Score given to architecture-independent packages
pub const TRIVIAL_SCORE: u32 = 1;

const TRIVIAL_ARCHES: &[&str] = &["noarch", "all", "any"];

/// Built-in compatibility chains, best architecture first.
const POLICIES: &[(&str, &str)] = &[
    ("x86_64_v4", "x86_64_v4:x86_64_v3:x86_64_v2:x86_64:i686:i586:i486:i386"),
    ("x86_64_v3", "x86_64_v3:x86_64_v2:x86_64:i686:i586:i486:i386"),
    ("x86_64_v2", "x86_64_v2:x86_64:i686:i586:i486:i386"),
    ("x86_64", "x86_64:i686:i586:i486:i386"),
    ("amd64", "amd64:i686:i586:i486:i386"),
    ("i686", "i686:i586:i486:i386"),
    ("i586", "i586:i486:i386"),
    ("i486", "i486:i386"),
    ("i386", "i386"),
    ("aarch64", "aarch64"),
    ("armv7hl", "armv7hl:armv7l:armv6l:armv5tel"),
    ("armv7l", "armv7l:armv6l:armv5tel"),
    ("ppc64le", "ppc64le"),
    ("ppc64", "ppc64:ppc"),
    ("ppc", "ppc"),
    ("s390x", "s390x:s390"),
    ("s390", "s390"),
    ("riscv64", "riscv64"),
];

/// Ranked list of installable architectures.
///
/// Ranks are encoded so that every real architecture scores above `0x10000`
/// and lower scores are better; architecture-independent packages score
/// [`TRIVIAL_SCORE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchPolicy {
    scores: Vec<(String, u32)>,
}

impl ArchPolicy {
    /// Policy for a machine architecture, using the built-in table.
    ///
    /// Unknown architectures get a single-entry policy.
    pub fn for_arch(arch: &str) -> Self {
        let chain = POLICIES
            .iter()
            .find(|(name, _)| *name == arch)
            .map(|(_, chain)| *chain)
            .unwrap_or(arch);
        Self::from_policy(chain)
    }

    /// Parse a policy string such as `x86_64:i686` or `armv7hl=armv7l:armv6l`.
    ///
    /// `:` and `>` separate ranks, `=` joins architectures of equal rank.
    pub fn from_policy(policy: &str) -> Self {
        let mut scores: Vec<(String, u32)> = Vec::new();
        let mut rank = 0u32;
        let mut current = String::new();
        fn flush(current: &mut String, rank: u32, scores: &mut Vec<(String, u32)>) {
            if !current.is_empty() && !scores.iter().any(|(a, _)| a == current) {
                scores.push((std::mem::take(current), ((rank + 1) << 16) | 1));
            }
            current.clear();
        }
        for c in policy.chars() {
            match c {
                ':' | '>' => {
                    flush(&mut current, rank, &mut scores);
                    rank += 1;
                }
                '=' => flush(&mut current, rank, &mut scores),
                c => current.push(c),
            }
        }
        flush(&mut current, rank, &mut scores);

        for arch in TRIVIAL_ARCHES {
            if !scores.iter().any(|(a, _)| a == arch) {
                scores.push((arch.to_string(), TRIVIAL_SCORE));
            }
        }
        Self { scores }
    }

    /// Score of an architecture; 0 means not installable
    pub fn score(&self, arch: &str) -> u32 {
        self.scores
            .iter()
            .find(|(a, _)| a == arch)
            .map(|(_, score)| *score)
            .unwrap_or(0)
    }

    pub fn is_installable(&self, arch: &str) -> bool {
        self.score(arch) > 0
    }

    /// All scored architectures in policy order
    pub fn scores(&self) -> &[(String, u32)] {
        &self.scores
    }

    /// The architecture this policy was built for.
    ///
    /// That is the best-ranked real architecture; a policy of only
    /// architecture-independent entries reports its first one.
    pub fn primary(&self) -> Option<&str> {
        self.scores
            .iter()
            .filter(|(_, score)| *score > 0x10000)
            .min_by_key(|(_, score)| *score)
            .or_else(|| self.scores.iter().find(|(_, score)| *score == TRIVIAL_SCORE))
            .map(|(arch, _)| arch.as_str())
    }
}

/// Source packages are never installable
pub fn is_source_arch(arch: &str) -> bool {
    arch == "src" || arch == "nosrc"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_policy() {
        let policy = ArchPolicy::for_arch("x86_64");
        assert!(policy.is_installable("i586"));
        assert!(policy.is_installable("noarch"));
        assert!(!policy.is_installable("aarch64"));
        assert!(policy.score("x86_64") < policy.score("i686"));
        assert_eq!(policy.score("noarch"), TRIVIAL_SCORE);
        assert_eq!(policy.primary(), Some("x86_64"));
    }

    #[test]
    fn test_custom_policy() {
        let policy = ArchPolicy::from_policy("armv7hl=armv7l:armv6l");
        assert_eq!(policy.score("armv7hl"), policy.score("armv7l"));
        assert!(policy.score("armv7l") < policy.score("armv6l"));
        assert_eq!(policy.primary(), Some("armv7hl"));
    }

    #[test]
    fn test_unknown_arch_is_its_own_policy() {
        let policy = ArchPolicy::for_arch("mips");
        assert!(policy.is_installable("mips"));
        assert!(!policy.is_installable("x86_64"));
    }

    #[test]
    fn test_trivial_only() {
        let policy = ArchPolicy::from_policy("noarch");
        assert_eq!(policy.primary(), Some("noarch"));
    }
}
