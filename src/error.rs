//! Error types for the bankident library.

use std::io;
use thiserror::Error;

use crate::country::Country;
use crate::IdentifierKind;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while parsing or building identifiers.
///
/// The identifier variants are listed in the order the checks run: a
/// malformed input is reported before an unknown country, which is reported
/// before a structural mismatch, and so on.
#[derive(Debug, Error)]
pub enum Error {
    /// Length or character set does not match the identifier grammar.
    #[error("'{input}' is not a well-formed {kind}")]
    NotWellFormed { kind: IdentifierKind, input: String },

    /// Country code is not an ISO 3166-1 alpha-2 code.
    #[error("'{input}' is not a valid {kind}: unknown country code '{code}'")]
    UnknownCountry {
        kind: IdentifierKind,
        input: String,
        code: String,
    },

    /// Country is known but does not use this identifier scheme.
    #[error("'{input}' is not a valid {kind}: {kind} is not used in {country}")]
    UnsupportedCountry {
        kind: IdentifierKind,
        input: String,
        country: Country,
    },

    /// National part does not match the country's structure.
    #[error("'{input}' is not a valid {kind}: national part does not match the expected structure")]
    InvalidStructure { kind: IdentifierKind, input: String },

    /// Check digits are incorrect.
    #[error("'{input}' is not a valid {kind}: incorrect check digit")]
    InvalidCheckDigit { kind: IdentifierKind, input: String },

    /// Pattern expression cannot be compiled.
    #[error("invalid pattern expression '{expression}': {reason}")]
    PatternSyntax { expression: String, reason: String },

    /// Input cannot be fed to the check digit calculation.
    #[error("cannot calculate check digit of '{input}': {reason}")]
    CheckDigitInput { input: String, reason: String },

    /// Unknown identifier kind name.
    #[error("Invalid identifier kind: {0}")]
    InvalidKind(String),

    /// I/O error occurred during read or write operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error writing the CSV report.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Logging could not be initialised.
    #[error("Logging error: {0}")]
    Logging(String),
}

impl Error {
    /// The offending input of an identifier validation failure.
    pub fn input(&self) -> Option<&str> {
        match self {
            Error::NotWellFormed { input, .. }
            | Error::UnknownCountry { input, .. }
            | Error::UnsupportedCountry { input, .. }
            | Error::InvalidStructure { input, .. }
            | Error::InvalidCheckDigit { input, .. }
            | Error::CheckDigitInput { input, .. } => Some(input),
            Error::PatternSyntax { expression, .. } => Some(expression),
            _ => None,
        }
    }

    /// The identifier kind an identifier validation failure refers to.
    pub fn kind(&self) -> Option<IdentifierKind> {
        match self {
            Error::NotWellFormed { kind, .. }
            | Error::UnknownCountry { kind, .. }
            | Error::UnsupportedCountry { kind, .. }
            | Error::InvalidStructure { kind, .. }
            | Error::InvalidCheckDigit { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_messages() {
        let err = Error::NotWellFormed {
            kind: IdentifierKind::Iban,
            input: "XX".into(),
        };
        assert_eq!(err.to_string(), "'XX' is not a well-formed IBAN");

        let country = Country::from_alpha2("US").unwrap();
        let err = Error::UnsupportedCountry {
            kind: IdentifierKind::Iban,
            input: "US12345".into(),
            country,
        };
        assert_eq!(
            err.to_string(),
            "'US12345' is not a valid IBAN: IBAN is not used in United States of America (US)"
        );
    }

    #[test]
    fn test_error_accessors() {
        let err = Error::InvalidCheckDigit {
            kind: IdentifierKind::Bic,
            input: "abc".into(),
        };
        assert_eq!(err.input(), Some("abc"));
        assert_eq!(err.kind(), Some(IdentifierKind::Bic));
        assert_eq!(Error::InvalidKind("x".into()).input(), None);
        assert_eq!(Error::InvalidKind("x".into()).kind(), None);
    }
}
