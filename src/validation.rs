use std::fmt;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

pub const MIN_LENGTH: usize = 4;
pub const MAX_LENGTH: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LengthError {
    #[error("Length is required")]
    Missing,
    #[error("Length must be a whole number, got \"{0}\"")]
    NotANumber(String),
    #[error("Length should be at least {}", MIN_LENGTH)]
    TooShort(usize),
    #[error("Length should be at most {}", MAX_LENGTH)]
    TooLong(usize),
    #[error("Length should be at most {}", MAX_LENGTH)]
    Overflow,
}

/// Password length already checked against [`MIN_LENGTH`]..=[`MAX_LENGTH`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PasswordLength(usize);

impl PasswordLength {
    pub fn new(length: usize) -> Result<Self, LengthError> {
        if length < MIN_LENGTH {
            return Err(LengthError::TooShort(length));
        }
        if length > MAX_LENGTH {
            return Err(LengthError::TooLong(length));
        }
        Ok(Self(length))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for PasswordLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<usize> for PasswordLength {
    type Error = LengthError;

    fn try_from(length: usize) -> Result<Self, Self::Error> {
        Self::new(length)
    }
}

/// Parses the text of a length field.
///
/// Input is NFKC-normalized before parsing so that full-width digits typed
/// on some keyboards are accepted.
pub fn validate_length(input: &str) -> Result<PasswordLength, LengthError> {
    let normalized: String = input.nfkc().collect();
    let trimmed = normalized.trim();

    if trimmed.is_empty() {
        return Err(LengthError::Missing);
    }

    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LengthError::NotANumber(trimmed.to_string()));
    }

    // all digits, so the only parse failure left is overflow
    let length = digits.parse::<usize>().map_err(|_| LengthError::Overflow)?;

    PasswordLength::new(length)
}
