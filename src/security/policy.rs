//! Password-strength and email-syntax predicates.
//!
//! Both checks are pure. The password rules are exact cut-offs: 12..=50 bytes, at least three
//! lowercase, three uppercase and three digits, and at least one punctuation or symbol
//! character. Any character outside those four classes (spaces, caseless letters, combining
//! marks, control and format characters) makes the password invalid.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_general_category::{get_general_category, GeneralCategory};

use crate::error::{AccessError, AccessResult};

pub const PASSWORD_MIN_LEN: usize = 12;
pub const PASSWORD_MAX_LEN: usize = 50;
pub const EMAIL_MAX_LEN: usize = 254;

const MIN_LOWER: usize = 3;
const MIN_UPPER: usize = 3;
const MIN_DIGITS: usize = 3;
const MIN_SPECIAL: usize = 1;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+",
        r"@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?",
        r"(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    ))
    .expect("email pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass { Lower, Upper, Digit, Special }

// Classes follow the Unicode general category: Ll, Lu, any N*, any P* or S*.
fn classify(c: char) -> Option<CharClass> {
    use GeneralCategory::*;
    match get_general_category(c) {
        LowercaseLetter => Some(CharClass::Lower),
        UppercaseLetter => Some(CharClass::Upper),
        DecimalNumber | LetterNumber | OtherNumber => Some(CharClass::Digit),
        ConnectorPunctuation | DashPunctuation | OpenPunctuation | ClosePunctuation
        | InitialPunctuation | FinalPunctuation | OtherPunctuation
        | MathSymbol | CurrencySymbol | ModifierSymbol | OtherSymbol => Some(CharClass::Special),
        _ => None,
    }
}

/// Per-class character counts of a password, or `None` on an illegal character.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CharCounts {
    pub lower: usize,
    pub upper: usize,
    pub digits: usize,
    pub special: usize,
}

pub fn count_classes(password: &str) -> Option<CharCounts> {
    let mut counts = CharCounts::default();
    for c in password.chars() {
        match classify(c)? {
            CharClass::Lower => counts.lower += 1,
            CharClass::Upper => counts.upper += 1,
            CharClass::Digit => counts.digits += 1,
            CharClass::Special => counts.special += 1,
        }
    }
    Some(counts)
}

pub fn validate_password(password: &str) -> bool {
    let len = password.len();
    if !(PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&len) {
        return false;
    }
    let Some(c) = count_classes(password) else { return false; };
    c.lower >= MIN_LOWER && c.upper >= MIN_UPPER && c.digits >= MIN_DIGITS && c.special >= MIN_SPECIAL
}

pub fn validate_email(email: &str) -> bool {
    email.len() <= EMAIL_MAX_LEN && EMAIL_RE.is_match(email)
}

pub fn check_password(password: &str) -> AccessResult<()> {
    if validate_password(password) { Ok(()) } else { Err(AccessError::InvalidPassword) }
}

pub fn check_email(email: &str) -> AccessResult<()> {
    if validate_email(email) { Ok(()) } else { Err(AccessError::InvalidEmail) }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod policy_tests;
