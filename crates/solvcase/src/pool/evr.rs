//! Version comparison for `epoch:version-release` strings.

use std::cmp::Ordering;

/// Compare two version segments the way rpm does.
///
/// Strings are split into alternating runs of digits and letters; other
/// characters separate runs. Numeric runs compare numerically and beat
/// alphabetic ones. `~` sorts before everything, including the end of the
/// string.
pub fn vercmp(a: &str, b: &str) -> Ordering {
    let a = a.as_bytes();
    let b = b.as_bytes();
    let (mut i, mut j) = (0, 0);

    loop {
        while i < a.len() && !a[i].is_ascii_alphanumeric() && a[i] != b'~' {
            i += 1;
        }
        while j < b.len() && !b[j].is_ascii_alphanumeric() && b[j] != b'~' {
            j += 1;
        }

        let a_tilde = a.get(i) == Some(&b'~');
        let b_tilde = b.get(j) == Some(&b'~');
        if a_tilde || b_tilde {
            if !a_tilde {
                return Ordering::Greater;
            }
            if !b_tilde {
                return Ordering::Less;
            }
            i += 1;
            j += 1;
            continue;
        }

        if i >= a.len() || j >= b.len() {
            break;
        }

        let numeric = a[i].is_ascii_digit();
        let run = |s: &[u8], start: usize| {
            let mut end = start;
            while end < s.len()
                && if numeric {
                    s[end].is_ascii_digit()
                } else {
                    s[end].is_ascii_alphabetic()
                }
            {
                end += 1;
            }
            end
        };
        let a_end = run(a, i);
        let b_end = run(b, j);

        if b_end == j {
            // segment types differ; numbers are newer
            return if numeric {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }

        let mut sa = &a[i..a_end];
        let mut sb = &b[j..b_end];
        if numeric {
            while sa.len() > 1 && sa[0] == b'0' {
                sa = &sa[1..];
            }
            while sb.len() > 1 && sb[0] == b'0' {
                sb = &sb[1..];
            }
            match sa.len().cmp(&sb.len()) {
                Ordering::Equal => {}
                other => return other,
            }
        }
        match sa.cmp(sb) {
            Ordering::Equal => {}
            other => return other,
        }
        i = a_end;
        j = b_end;
    }

    match (i >= a.len(), j >= b.len()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        _ => Ordering::Greater,
    }
}

/// An `epoch:version-release` string split into its parts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evr<'a> {
    pub epoch: Option<&'a str>,
    pub version: &'a str,
    pub release: Option<&'a str>,
}

impl<'a> Evr<'a> {
    pub fn split(evr: &'a str) -> Self {
        let (epoch, rest) = match evr.find(':') {
            Some(pos) if evr[..pos].bytes().all(|b| b.is_ascii_digit()) && pos > 0 => {
                (Some(&evr[..pos]), &evr[pos + 1..])
            }
            _ => (None, evr),
        };
        let (version, release) = match rest.rfind('-') {
            Some(pos) => (&rest[..pos], Some(&rest[pos + 1..])),
            None => (rest, None),
        };
        Self {
            epoch,
            version,
            release,
        }
    }
}

/// How releases take part in a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvrMode {
    /// Compare every part
    Compare,
    /// A missing release on either side matches any release
    MatchRelease,
}

fn epoch_value(epoch: Option<&str>) -> u64 {
    epoch.and_then(|e| e.parse().ok()).unwrap_or(0)
}

/// Compare two full evr strings
pub fn evrcmp(a: &str, b: &str, mode: EvrMode) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    let ea = Evr::split(a);
    let eb = Evr::split(b);

    match epoch_value(ea.epoch).cmp(&epoch_value(eb.epoch)) {
        Ordering::Equal => {}
        other => return other,
    }
    match vercmp(ea.version, eb.version) {
        Ordering::Equal => {}
        other => return other,
    }
    match (ea.release, eb.release) {
        (Some(ra), Some(rb)) => vercmp(ra, rb),
        (None, None) => Ordering::Equal,
        _ if mode == EvrMode::MatchRelease => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
    }
}

/// Check whether two version ranges overlap.
///
/// `mask1`/`mask2` are relation bits (GT=1, EQ=2, LT=4) as returned by
/// [`RelOp::version_mask`](super::RelOp::version_mask).
pub fn intersect_evrs(mask1: u8, evr1: &str, mask2: u8, evr2: &str, mode: EvrMode) -> bool {
    const GT: u8 = 1;
    const EQ: u8 = 2;
    const LT: u8 = 4;

    if mask1 == 0 || mask2 == 0 || mask1 > 7 || mask2 > 7 {
        return false;
    }
    if mask1 == 7 || mask2 == 7 {
        return true;
    }
    if mask1 & mask2 & (LT | GT) != 0 {
        return true;
    }
    match evrcmp(evr1, evr2, mode) {
        Ordering::Less => mask2 & LT != 0 || mask1 & GT != 0,
        Ordering::Equal => mask1 & mask2 & EQ != 0,
        Ordering::Greater => mask2 & GT != 0 || mask1 & LT != 0,
    }
}
