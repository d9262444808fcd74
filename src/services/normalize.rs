use std::fmt;

use unicode_normalization::UnicodeNormalization;

/// A 10-digit phone number, or the empty string when the input could not be
/// read as one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NormalizedPhone(String);

impl NormalizedPhone {
    /// Keeps the digits, drops a leading country code when there are more
    /// than ten, and accepts the result only if exactly ten remain.
    pub fn parse(raw: &str) -> Self {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        let tail = if digits.len() > 10 {
            &digits[digits.len() - 10..]
        } else {
            digits.as_str()
        };
        if tail.len() == 10 {
            Self(tail.to_string())
        } else {
            Self::default()
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn masked(&self) -> String {
        mask_phone(&self.0)
    }
}

impl fmt::Display for NormalizedPhone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn normalize_phone(raw: &str) -> String {
    NormalizedPhone::parse(raw).0
}

/// `***-***-NNNN` from the last four digits of `raw`.
pub fn mask_phone(raw: &str) -> String {
    let digits: Vec<char> = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 4 {
        return "***-***-****".to_string();
    }
    let last4: String = digits[digits.len() - 4..].iter().collect();
    format!("***-***-{last4}")
}

/// Folds a name for matching: lowercase, diacritics stripped, only letters
/// and single spaces left. Not for display.
pub fn normalize_name(raw: &str) -> String {
    let folded: String = raw
        .to_lowercase()
        .nfd()
        .filter(|c| c.is_ascii_lowercase() || c.is_whitespace())
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}
