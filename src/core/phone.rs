//! Phone number normalization shared by every resolution pass.

use regex::Regex;
use std::sync::LazyLock;

/// First maximal run of ASCII digits
static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("digit-run pattern is valid"));

/// Canonical `+<digits>` form of a raw number or line URI.
///
/// Takes the first maximal digit run, so `tel:+1 984 555 1234` keeps only
/// `+1`, while `tel:+19845551234;ext=22` yields `+19845551234`. Input with
/// no digits returns `None`.
pub fn normalize_number(raw: &str) -> Option<String> {
    DIGIT_RUN
        .find(raw)
        .map(|m| format!("+{}", m.as_str()))
}

/// Digits of a number without any prefix; used for filters and file names.
pub fn digits(number: &str) -> String {
    number
        .chars()
        .filter(char::is_ascii_digit)
        .collect()
}

/// True when the number matches any of the substring filters.
/// Filters compare on digits so `+1 984` and `1984` select the same numbers;
/// a filter with no digits matches the raw text instead.
pub fn matches_filter(number: &str, filters: &[String]) -> bool {
    if filters.is_empty() {
        return true;
    }

    let number_digits = digits(number);
    filters.iter().any(|f| {
        let wanted = digits(f);
        if wanted.is_empty() {
            number.contains(f.trim())
        } else {
            number_digits.contains(&wanted)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_uri_normalizes() {
        assert_eq!(normalize_number("tel:+19845551234").as_deref(), Some("+19845551234"));
        assert_eq!(normalize_number("+19845551234").as_deref(), Some("+19845551234"));
        assert_eq!(
            normalize_number("tel:+19845551234;ext=1234").as_deref(),
            Some("+19845551234")
        );
    }

    #[test]
    fn test_first_digit_run_wins() {
        assert_eq!(normalize_number("tel:+1 984 555 1234").as_deref(), Some("+1"));
    }

    #[test]
    fn test_no_digits_is_dropped() {
        assert_eq!(normalize_number("tel:"), None);
        assert_eq!(normalize_number(""), None);
    }

    #[test]
    fn test_filters_compare_digits() {
        let filters = vec!["984 555".to_string()];
        assert!(matches_filter("+19845551234", &filters));
        assert!(!matches_filter("+18005551111", &filters));
        assert!(matches_filter("+18005551111", &[]));
    }
}
