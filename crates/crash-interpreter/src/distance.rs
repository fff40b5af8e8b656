//! Levenshtein distance for "did you mean" suggestions

use std::collections::HashMap;

/// Minimum number of single-character insertions, deletions or
/// substitutions that turn `a` into `b`
#[must_use]
pub fn distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut memo = HashMap::new();
    suffix_distance(&a, &b, a.len(), b.len(), &mut memo)
}

// Distance between the first `i` chars of `a` and the first `j` chars of `b`.
// The memo lives for a single comparison.
fn suffix_distance(
    a: &[char],
    b: &[char],
    i: usize,
    j: usize,
    memo: &mut HashMap<(usize, usize), usize>,
) -> usize {
    if i == 0 {
        return j;
    }
    if j == 0 {
        return i;
    }
    if let Some(&known) = memo.get(&(i, j)) {
        return known;
    }

    let result = if a[i - 1] == b[j - 1] {
        suffix_distance(a, b, i - 1, j - 1, memo)
    } else {
        let inserts = suffix_distance(a, b, i, j - 1, memo);
        let removes = suffix_distance(a, b, i - 1, j, memo);
        let replaces = suffix_distance(a, b, i - 1, j - 1, memo);
        1 + inserts.min(removes).min(replaces)
    };

    memo.insert((i, j), result);
    result
}

/// Whichever of `s1` and `s2` is closer to `target`. Ties go to `s2`.
#[must_use]
pub fn closer<'a>(target: &str, s1: &'a str, s2: &'a str) -> &'a str {
    if distance(target, s1) < distance(target, s2) {
        s1
    } else {
        s2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_distances() {
        assert_eq!(distance("kitten", "sitting"), 3);
        assert_eq!(distance("flaw", "lawn"), 2);
        assert_eq!(distance("ls", "ls"), 0);
        assert_eq!(distance("gti", "git"), 2);
    }

    #[test]
    fn test_empty_strings() {
        assert_eq!(distance("", ""), 0);
        assert_eq!(distance("", "grep"), 4);
        assert_eq!(distance("grep", ""), 4);
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        assert_eq!(distance("héllo", "hello"), 1);
    }

    #[test]
    fn test_closer_prefers_smaller_distance() {
        assert_eq!(closer("grep", "grpe", "cat"), "grpe");
        assert_eq!(closer("grep", "cat", "grpe"), "grpe");
    }

    #[test]
    fn test_closer_tie_goes_to_second() {
        assert_eq!(closer("ab", "ax", "xb"), "xb");
    }

    proptest! {
        #[test]
        fn prop_symmetric(a in "[a-d]{0,8}", b in "[a-d]{0,8}") {
            prop_assert_eq!(distance(&a, &b), distance(&b, &a));
        }

        #[test]
        fn prop_identity(a in "[a-z]{0,12}") {
            prop_assert_eq!(distance(&a, &a), 0);
        }

        #[test]
        fn prop_empty_is_length(s in "[a-z]{0,12}") {
            prop_assert_eq!(distance("", &s), s.chars().count());
        }

        #[test]
        fn prop_bounded_by_longer_length(a in "[a-d]{0,8}", b in "[a-d]{0,8}") {
            prop_assert!(distance(&a, &b) <= a.len().max(b.len()));
        }
    }
}
