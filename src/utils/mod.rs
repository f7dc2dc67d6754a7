//! Small shared helpers: whitespace normalisation and natural ordering.

use std::cmp::Ordering;

/// Collapse every run of whitespace in `input` to a single space and trim
/// the ends.
///
/// Applied to all human-readable text the renderer emits, so the
/// presentation layer never sees embedded newlines or padding from the
/// remote payload.
#[must_use]
pub fn condense_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Natural, case-insensitive string comparison with an ordinal tie-break.
///
/// Digit runs compare numerically ("List 2" sorts before "List 10"), other
/// characters compare case-insensitively. Strings that are equal under
/// those rules fall back to a plain ordinal comparison so the ordering is
/// total and deterministic.
#[must_use]
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => break,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(lc), Some(rc)) => {
                if lc.is_ascii_digit() && rc.is_ascii_digit() {
                    let ln = take_digits(&mut left);
                    let rn = take_digits(&mut right);
                    match compare_numeric(&ln, &rn) {
                        Ordering::Equal => {}
                        other => return other,
                    }
                } else {
                    left.next();
                    right.next();
                    match lc.to_lowercase().cmp(rc.to_lowercase()) {
                        Ordering::Equal => {}
                        other => return other,
                    }
                }
            }
        }
    }

    // Ordinal tie-break keeps the ordering total when names differ only
    // in case or leading zeros.
    a.cmp(b)
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.peek() {
        if c.is_ascii_digit() {
            run.push(*c);
            chars.next();
        } else {
            break;
        }
    }
    run
}

/// Compare two digit runs of arbitrary length as numbers.
fn compare_numeric(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condense_collapses_runs_and_trims() {
        assert_eq!(condense_whitespace("  a \n\t b   c "), "a b c");
        assert_eq!(condense_whitespace(""), "");
        assert_eq!(condense_whitespace("plain"), "plain");
    }

    #[test]
    fn natural_ordering_treats_digit_runs_numerically() {
        assert_eq!(natural_cmp("List 2", "List 10"), Ordering::Less);
        assert_eq!(natural_cmp("List 10", "List 2"), Ordering::Greater);
        assert_eq!(natural_cmp("Week 1", "Week 1"), Ordering::Equal);
    }

    #[test]
    fn natural_ordering_is_case_insensitive_with_ordinal_tiebreak() {
        // "WEEK" and "week" are equal case-insensitively; the ordinal
        // tie-break makes the uppercase variant sort first.
        assert_eq!(natural_cmp("WEEK 1", "week 1"), Ordering::Less);
        assert_eq!(natural_cmp("alpha", "Beta"), Ordering::Less);
    }

    #[test]
    fn leading_zeros_compare_equal_numerically() {
        // Numerically equal, so the ordinal tie-break decides.
        assert_eq!(natural_cmp("List 002", "List 2"), Ordering::Less);
        assert_eq!(natural_cmp("List 2", "List 002"), Ordering::Greater);
    }
}
