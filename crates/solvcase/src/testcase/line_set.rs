use std::cmp::Ordering;

/// An ordered collection of text lines that can act as a set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineSet {
    lines: Vec<String>,
}

impl LineSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Push the concatenation of three pieces
    pub fn push_joined(&mut self, a: &str, b: &str, c: &str) {
        let mut line = String::with_capacity(a.len() + b.len() + c.len());
        line.push_str(a);
        line.push_str(b);
        line.push_str(c);
        self.lines.push(line);
    }

    pub fn sort(&mut self) {
        self.lines.sort_unstable();
    }

    /// Sort and drop duplicate lines
    pub fn sort_unique(&mut self) {
        self.sort();
        self.lines.dedup();
    }

    /// Concatenate all lines, each followed by a newline
    pub fn join(&self) -> String {
        let mut out = String::with_capacity(self.lines.iter().map(|l| l.len() + 1).sum());
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// Inverse of [`LineSet::join`]; a final unterminated line is kept
    pub fn split(text: &str) -> Self {
        let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
        if text.is_empty() || text.ends_with('\n') {
            lines.pop();
        }
        Self { lines }
    }

    /// Lines only in `self` prefixed with `-`, lines only in `other` with `+`.
    ///
    /// Both sets must already be sorted.
    pub fn diff(&self, other: &LineSet) -> LineSet {
        let mut out = LineSet::new();
        let (mut i, mut j) = (0, 0);
        while i < self.lines.len() || j < other.lines.len() {
            let order = match (self.lines.get(i), other.lines.get(j)) {
                (Some(a), Some(b)) => a.cmp(b),
                (Some(_), None) => Ordering::Less,
                _ => Ordering::Greater,
            };
            match order {
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
                Ordering::Less => {
                    out.push_joined("-", &self.lines[i], "");
                    i += 1;
                }
                Ordering::Greater => {
                    out.push_joined("+", &other.lines[j], "");
                    j += 1;
                }
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for LineSet {
    fn from(lines: Vec<String>) -> Self {
        Self { lines }
    }
}

impl<S: Into<String>> Extend<S> for LineSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.lines.extend(iter.into_iter().map(Into::into));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_split() {
        let mut set = LineSet::new();
        set.push("a");
        set.push("");
        set.push_joined("b", " ", "c");
        let text = set.join();
        assert_eq!(text, "a\n\nb c\n");
        assert_eq!(LineSet::split(&text), set);
    }

    #[test]
    fn test_split_unterminated() {
        let set = LineSet::split("a\nb");
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(LineSet::split("").is_empty());
    }

    #[test]
    fn test_sort_unique_idempotent() {
        let mut set = LineSet::split("b\na\nb\nc\na\n");
        set.sort_unique();
        assert_eq!(set.join(), "a\nb\nc\n");
        let again = {
            let mut s = set.clone();
            s.sort_unique();
            s
        };
        assert_eq!(again, set);
    }

    #[test]
    fn test_diff() {
        let a = LineSet::split("a\nb\n");
        let b = LineSet::split("a\nc\n");
        let d = a.diff(&b);
        assert_eq!(d.join(), "-b\n+c\n");
        assert!(a.diff(&a).is_empty());
    }
}
