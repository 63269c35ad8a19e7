//! House-number recognition and matching.
//!
//! House numbers are compared as sequences of digit and letter groups, so
//! spelling variations with spaces, dashes and slashes ("12a", "12 a",
//! "12-a") are all equivalent.

/// Splits a candidate house number into digit and letter groups, dropping
/// separators. Returns `None` when the string contains anything that cannot
/// appear in a house number.
fn house_number_groups(s: &str) -> Option<Vec<String>> {
    let mut groups: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_is_digit = false;
    for c in s.chars() {
        if c.is_ascii_digit() || c.is_alphabetic() {
            let is_digit = c.is_ascii_digit();
            if !current.is_empty() && is_digit != current_is_digit {
                groups.push(std::mem::take(&mut current));
            }
            current_is_digit = is_digit;
            current.extend(c.to_lowercase());
        } else if matches!(c, ' ' | '-' | '/' | '\\' | ',' | '.') {
            if !current.is_empty() {
                groups.push(std::mem::take(&mut current));
            }
        } else {
            return None;
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }
    if groups.is_empty() { None } else { Some(groups) }
}

fn is_digit_group(group: &str) -> bool {
    group.chars().all(|c| c.is_ascii_digit())
}

/// Letter suffixes stay short ("a", "b") or are one of the common ordinal
/// words ("12 bis").
fn is_suffix_group(group: &str, is_prefix: bool) -> bool {
    if group.len() <= 2 || matches!(group, "bis" | "ter" | "quater") {
        return true;
    }
    // A prefix query may end in a suffix still being typed.
    is_prefix && group.len() <= 4
}

/// Accepts strings of the form digits optionally followed by a short
/// alphanumeric suffix or a range: "13", "13a", "13 a", "12-14", "221b",
/// "12 bis". With `is_prefix`, the trailing group may be incomplete.
pub fn looks_like_house_number(s: &str, is_prefix: bool) -> bool {
    let Some(groups) = house_number_groups(s) else {
        return false;
    };
    if groups.len() > 3 {
        return false;
    }
    if !is_digit_group(&groups[0]) {
        return false;
    }
    groups.iter().enumerate().all(|(i, group)| {
        let last = i + 1 == groups.len();
        if is_digit_group(group) {
            group.len() <= 6
        } else {
            is_suffix_group(group, is_prefix && last)
        }
    })
}

fn canonical_groups(s: &str) -> Option<Vec<String>> {
    let groups = house_number_groups(s)?;
    Some(
        groups
            .into_iter()
            .map(|g| {
                if is_digit_group(&g) {
                    let trimmed = g.trim_start_matches('0');
                    if trimmed.is_empty() {
                        "0".to_owned()
                    } else {
                        trimmed.to_owned()
                    }
                } else {
                    g
                }
            })
            .collect(),
    )
}

/// Equivalence modulo common spelling variations: spacing, dashes, slashes
/// and leading zeros. With `query_is_prefix`, the query may stop short of
/// the reference ("12" matches "12a").
pub fn house_numbers_match(reference: &str, query: &str, query_is_prefix: bool) -> bool {
    let (Some(reference), Some(query)) = (canonical_groups(reference), canonical_groups(query))
    else {
        return false;
    };
    if query_is_prefix {
        reference.starts_with(&query[..])
    } else {
        reference == query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_numbers_look_like_house_numbers() {
        for s in ["1", "42", "221", "999999"] {
            assert!(looks_like_house_number(s, false), "{s:?}");
        }
    }

    #[test]
    fn suffixed_and_ranged_numbers_are_accepted() {
        for s in ["13a", "13 a", "221b", "12-14", "12/3", "12 bis", "7 ter"] {
            assert!(looks_like_house_number(s, false), "{s:?}");
        }
    }

    #[test]
    fn words_and_word_leading_strings_are_rejected() {
        for s in ["", "paris", "a12", "rue 12", "12 paris", "one", "12 3 4 5"] {
            assert!(!looks_like_house_number(s, false), "{s:?}");
        }
    }

    #[test]
    fn overlong_groups_are_rejected() {
        assert!(!looks_like_house_number("1234567", false));
        assert!(!looks_like_house_number("12 quinquies", false));
    }

    #[test]
    fn matching_ignores_separator_style() {
        assert!(house_numbers_match("12a", "12 a", false));
        assert!(house_numbers_match("12 a", "12-a", false));
        assert!(house_numbers_match("12/3", "12 3", false));
        assert!(house_numbers_match("012", "12", false));
        assert!(house_numbers_match("1", "1", false));
    }

    #[test]
    fn matching_is_exact_on_groups() {
        assert!(!house_numbers_match("12a", "12", false));
        assert!(!house_numbers_match("12", "12a", false));
        assert!(!house_numbers_match("12", "13", false));
        assert!(!house_numbers_match("12", "", false));
    }

    #[test]
    fn prefix_matching_stops_short() {
        assert!(house_numbers_match("12a", "12", true));
        assert!(house_numbers_match("12 bis", "12", true));
        assert!(!house_numbers_match("12", "12a", true));
    }
}
