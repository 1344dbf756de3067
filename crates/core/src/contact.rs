//! Phone number and email helpers for the personal-info step.
//!
//! Phone numbers are US-format: exactly ten digits once punctuation is
//! stripped. Formatting is progressive so a partially typed number renders
//! the same way it will once complete.

use std::sync::LazyLock;

use regex::Regex;

/// Number of digits in a valid phone number.
pub const PHONE_DIGITS: usize = 10;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

fn digits_of(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Format a phone number as `(555) 123-4567`.
///
/// Non-digits are dropped and input beyond ten digits is ignored.
///
/// ```
/// use ym_core::contact::format_phone_number;
/// assert_eq!(format_phone_number("5551234567"), "(555) 123-4567");
/// assert_eq!(format_phone_number("55512"), "(555) 12");
/// assert_eq!(format_phone_number("abc"), "");
/// ```
pub fn format_phone_number(value: &str) -> String {
    let digits: String = digits_of(value).chars().take(PHONE_DIGITS).collect();

    match digits.len() {
        0 => String::new(),
        1..=3 => format!("({digits}"),
        4..=6 => format!("({}) {}", &digits[..3], &digits[3..]),
        _ => format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..]),
    }
}

/// Check that a phone number has exactly ten digits.
pub fn is_valid_phone(phone: &str) -> bool {
    digits_of(phone).len() == PHONE_DIGITS
}

/// Basic email shape check: something, `@`, a domain with a dot.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Case-insensitive check that `email` belongs to `domain`.
pub fn email_in_domain(email: &str, domain: &str) -> bool {
    let suffix = format!("@{}", domain.to_ascii_lowercase());
    email.to_ascii_lowercase().ends_with(&suffix)
}
