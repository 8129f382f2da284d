// Copyright (c) 2025 - Cowboy AI, Inc.
//! Fabric Code Value Object

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Input validation failure, naming the violated rule
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("fabric code must be between 2 and 30 characters: got {0}")]
    CodeLength(usize),

    #[error("fabric code must contain only uppercase letters and digits: {0}")]
    CodePattern(String),

    #[error("fabric name must be between 1 and 250 characters: got {0}")]
    NameLength(usize),
}

/// Immutable identity of a fabric
///
/// Invariants:
/// - 2 to 30 characters
/// - Only `A-Z` and `0-9`
///
/// # Examples
///
/// ```rust
/// use fabric_sync::domain::FabricCode;
///
/// let code = FabricCode::new("FAB1").unwrap();
/// assert_eq!(code.as_str(), "FAB1");
///
/// assert!(FabricCode::new("F").is_err());     // Too short
/// assert!(FabricCode::new("fab1").is_err());  // Lowercase
/// assert!(FabricCode::new("FAB-1").is_err()); // Punctuation
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FabricCode(String);

impl FabricCode {
    /// Minimum code length
    pub const MIN_LENGTH: usize = 2;

    /// Maximum code length
    pub const MAX_LENGTH: usize = 30;

    /// Create a new fabric code with validation
    pub fn new(code: impl Into<String>) -> Result<Self, ValidationError> {
        let code = code.into();

        // Invariant 1: Length bounds
        let length = code.chars().count();
        if !(Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&length) {
            return Err(ValidationError::CodeLength(length));
        }

        // Invariant 2: Uppercase alphanumeric only
        if !code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        {
            return Err(ValidationError::CodePattern(code));
        }

        Ok(Self(code))
    }

    /// Get the code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the inner string
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for FabricCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for FabricCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for FabricCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for FabricCode {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FabricCode> for String {
    fn from(code: FabricCode) -> Self {
        code.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("FAB1" ; "letters and digits")]
    #[test_case("AB" ; "minimum length")]
    #[test_case("123456789012345678901234567890" ; "maximum length")]
    #[test_case("COTTON" ; "letters only")]
    fn test_valid_codes(input: &str) {
        let code = FabricCode::new(input).unwrap();
        assert_eq!(code.as_str(), input);
    }

    #[test_case("", 0 ; "empty")]
    #[test_case("A", 1 ; "one character")]
    #[test_case("1234567890123456789012345678901", 31 ; "one over maximum")]
    fn test_invalid_length(input: &str, length: usize) {
        assert_eq!(
            FabricCode::new(input),
            Err(ValidationError::CodeLength(length))
        );
    }

    #[test_case("fab1" ; "lowercase")]
    #[test_case("FAB 1" ; "space")]
    #[test_case("FAB-1" ; "hyphen")]
    #[test_case("FÄB1" ; "non ascii letter")]
    fn test_invalid_pattern(input: &str) {
        assert!(matches!(
            FabricCode::new(input),
            Err(ValidationError::CodePattern(_))
        ));
    }

    #[test]
    fn test_length_checked_before_pattern() {
        assert_eq!(FabricCode::new("a"), Err(ValidationError::CodeLength(1)));
    }

    #[test]
    fn test_serde_rejects_invalid_code() {
        let parsed: Result<FabricCode, _> = serde_json::from_str("\"bad code\"");
        assert!(parsed.is_err());

        let parsed: FabricCode = serde_json::from_str("\"FAB1\"").unwrap();
        assert_eq!(parsed.to_string(), "FAB1");
    }
}
