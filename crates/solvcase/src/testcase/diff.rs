//! Comparing two result dumps line by line.

use super::line_set::LineSet;

/// Lines only in `expected` as `-line`, lines only in `actual` as `+line`.
///
/// Line order does not matter; `None` means the results agree.
pub fn result_diff(expected: &str, actual: &str) -> Option<String> {
    let mut a = LineSet::split(expected);
    let mut b = LineSet::split(actual);
    a.sort();
    b.sort();
    let diff = a.diff(&b);
    (!diff.is_empty()).then(|| diff.join())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_in_any_order() {
        let a = "install A-2-1.noarch@available\nerase B-1-1.noarch@system\n";
        let b = "erase B-1-1.noarch@system\ninstall A-2-1.noarch@available\n";
        assert_eq!(result_diff(a, b), None);
        assert_eq!(result_diff("", ""), None);
    }

    #[test]
    fn test_added_and_removed() {
        let expected = "install A-2-1.noarch@available\nerase B-1-1.noarch@system\n";
        let actual = "install A-3-1.noarch@available\nerase B-1-1.noarch@system";
        assert_eq!(
            result_diff(expected, actual).as_deref(),
            Some("-install A-2-1.noarch@available\n+install A-3-1.noarch@available\n")
        );
    }

    #[test]
    fn test_swapped_inputs_flip_prefixes() {
        let a = "job install name A\ninstall A-1-1.noarch@test\nerase C-1-1.noarch@system\n";
        let b = "erase C-1-1.noarch@system\ninstall A-2-1.noarch@test\njob install name A\nproblem 1a2b3c4d info nothing provides X\n";
        let forward = result_diff(a, b).unwrap();
        let backward = result_diff(b, a).unwrap();
        let flipped: String = forward
            .lines()
            .map(|line| match line.split_at(1) {
                ("-", rest) => format!("+{}\n", rest),
                ("+", rest) => format!("-{}\n", rest),
                _ => panic!("unprefixed diff line {:?}", line),
            })
            .collect();
        assert_eq!(backward, flipped);
    }

    #[test]
    fn test_duplicates_count() {
        assert_eq!(
            result_diff("job a\njob a\n", "job a\n").as_deref(),
            Some("-job a\n")
        );
    }
}
