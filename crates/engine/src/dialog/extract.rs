//! Heuristic field extraction for voicemail collection.
//!
//! These are deliberately not NLU. Name extraction strips a fixed set of
//! carrier phrases and accepts a short remainder; phone extraction scans
//! for a formatted number first and then falls back to digit stripping.
//! Anything else is a parse failure, which drives a re-prompt upstream.

/// Carrier phrases stripped before reading a name. Checked longest-first
/// against the case-folded utterance.
const NAME_PREFIXES: &[&str] = &[
    "my name is",
    "the name is",
    "this is",
    "name's",
    "i am",
    "i'm",
    "it's",
    "its",
];

/// Extract a caller name: strip one carrier phrase, accept a 1–3 token
/// remainder, titlecased. More tokens than that reads like a sentence,
/// not a name.
pub fn extract_name(utterance: &str) -> Option<String> {
    let folded = utterance.trim().to_lowercase();
    if folded.is_empty() {
        return None;
    }

    let mut remainder = folded.as_str();
    for prefix in NAME_PREFIXES {
        if let Some(rest) = remainder.strip_prefix(prefix) {
            remainder = rest;
            break;
        }
    }

    let tokens: Vec<&str> = remainder
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'' && c != '-'))
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.is_empty() || tokens.len() > 3 {
        return None;
    }
    if tokens.iter().any(|t| t.chars().any(|c| c.is_ascii_digit())) {
        return None;
    }

    Some(tokens.iter().map(|t| titlecase(t)).collect::<Vec<_>>().join(" "))
}

fn titlecase(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Extract a US phone number and render it canonically:
/// `(503) 555-0199`.
///
/// Tries a formatted run first (digits with `-`, `.`, `(`, `)`, spaces),
/// then strips every digit from the utterance. Exactly 10 digits pass;
/// 11 pass when the first is the country code `1`, which is dropped.
/// Any other digit count is a parse failure.
pub fn extract_phone(utterance: &str) -> Option<String> {
    // Pass 1: maximal runs of number-ish characters.
    for run in number_runs(utterance) {
        if let Some(digits) = normalize_digits(&run) {
            return Some(format_phone(&digits));
        }
    }

    // Pass 2: every digit in the utterance.
    let all: String = utterance.chars().filter(|c| c.is_ascii_digit()).collect();
    normalize_digits(&all).map(|d| format_phone(&d))
}

/// Split the utterance into maximal runs of phone-number characters.
fn number_runs(utterance: &str) -> Vec<String> {
    let mut runs = Vec::new();
    let mut current = String::new();
    for c in utterance.chars() {
        if c.is_ascii_digit() || matches!(c, '-' | '.' | '(' | ')' | ' ' | '+') {
            current.push(c);
        } else {
            if current.chars().any(|c| c.is_ascii_digit()) {
                runs.push(std::mem::take(&mut current));
            } else {
                current.clear();
            }
        }
    }
    if current.chars().any(|c| c.is_ascii_digit()) {
        runs.push(current);
    }
    runs
}

/// Accept exactly 10 digits, or 11 with a leading `1` (dropped).
fn normalize_digits(s: &str) -> Option<String> {
    let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.len() {
        10 => Some(digits),
        11 if digits.starts_with('1') => Some(digits[1..].to_string()),
        _ => None,
    }
}

fn format_phone(digits: &str) -> String {
    debug_assert_eq!(digits.len(), 10);
    format!("({}) {}-{}", &digits[0..3], &digits[3..6], &digits[6..10])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_with_carrier_phrase() {
        assert_eq!(extract_name("my name is John Smith").as_deref(), Some("John Smith"));
        assert_eq!(extract_name("this is sarah").as_deref(), Some("Sarah"));
        assert_eq!(extract_name("I'm mary anne walker").as_deref(), Some("Mary Anne Walker"));
    }

    #[test]
    fn bare_name_without_prefix() {
        assert_eq!(extract_name("John Smith").as_deref(), Some("John Smith"));
        assert_eq!(extract_name("o'brien").as_deref(), Some("O'brien"));
    }

    #[test]
    fn name_rejects_long_remainders() {
        // Four tokens after stripping exceeds the 1–3 token cap.
        assert!(extract_name("my name is john jacob jingleheimer schmidt").is_none());
        assert!(extract_name("").is_none());
        assert!(extract_name("   ").is_none());
    }

    #[test]
    fn name_rejects_digit_tokens() {
        assert!(extract_name("my name is 503 555").is_none());
    }

    #[test]
    fn phone_formatted_pattern() {
        assert_eq!(
            extract_phone("call me at 503-555-0199").as_deref(),
            Some("(503) 555-0199")
        );
        assert_eq!(
            extract_phone("it's (503) 555-0199 thanks").as_deref(),
            Some("(503) 555-0199")
        );
        assert_eq!(
            extract_phone("503.555.0199").as_deref(),
            Some("(503) 555-0199")
        );
    }

    #[test]
    fn phone_digit_stripping() {
        assert_eq!(extract_phone("5035550199").as_deref(), Some("(503) 555-0199"));
        assert_eq!(extract_phone("15035550199").as_deref(), Some("(503) 555-0199"));
        assert_eq!(extract_phone("+1 503 555 0199").as_deref(), Some("(503) 555-0199"));
    }

    #[test]
    fn phone_wrong_digit_count_fails() {
        assert!(extract_phone("12345").is_none());
        assert!(extract_phone("503-555-019").is_none());
        assert!(extract_phone("25035550199").is_none()); // 11 digits, no leading 1
        assert!(extract_phone("no number here").is_none());
    }
}
