//! Bank Identifier Library
//!
//! Validation, parsing and construction of bank identifiers defined by
//! international standards.
//!
//! # Supported Identifiers
//!
//! - **IBAN**: International Bank Account Number (ISO 13616)
//! - **BIC**: Business Identifier Code (ISO 9362)
//! - **Creditor Identifier**: SEPA Direct Debit creditor identifier
//!
//! # Features
//!
//! - Normalised, immutable value types: a value exists only if it is valid
//! - Typed errors telling why an input was rejected
//! - Per-country structures compiled from compact pattern expressions
//! - ISO 7064 MOD 97-10 check digits
//! - Random generation of valid identifiers
//!
//! Validation checks format only: it cannot tell whether an account exists.
//!
//! # Examples
//!
//! ## Parsing an IBAN
//!
//! ```rust
//! use bankident::Iban;
//!
//! let iban: Iban = " fr1420041010050500013m02606 ".parse()?;
//! assert_eq!(iban.as_str(), "FR1420041010050500013M02606");
//! assert_eq!(iban.bank_identifier(), "20041");
//! assert!(!Iban::is_valid("GB72MIDLA0051539024150"));
//! # Ok::<(), bankident::Error>(())
//! ```
//!
//! ## Building an IBAN from its parts
//!
//! ```rust
//! use bankident::{Country, Iban};
//!
//! let gb = Country::from_alpha2("GB").unwrap();
//! let iban = Iban::from_parts(gb, "NWBK60161331926819")?;
//! assert_eq!(iban.to_printable_string(), "GB29 NWBK 6016 1331 9268 19");
//! # Ok::<(), bankident::Error>(())
//! ```
//!
//! ## Telling why an input is invalid
//!
//! ```rust
//! use bankident::{Bic, Error};
//!
//! match "PSSTZZPP".parse::<Bic>() {
//!     Err(Error::UnknownCountry { code, .. }) => assert_eq!(code, "ZZ"),
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```

pub mod batch;
pub mod bic;
pub mod check_digit;
pub mod country;
pub mod creditor;
pub mod error;
pub mod iban;
pub mod logging;
pub mod pattern;
pub mod random;
pub mod registry;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

// Re-export commonly used types
pub use bic::Bic;
pub use country::Country;
pub use creditor::CreditorIdentifier;
pub use error::{Error, Result};
pub use iban::Iban;
pub use pattern::{CharacterClass, Pattern, PatternGroup};

/// Supported identifier kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierKind {
    /// International Bank Account Number
    Iban,
    /// Business Identifier Code
    Bic,
    /// SEPA creditor identifier
    #[serde(rename = "ci")]
    CreditorIdentifier,
}

impl FromStr for IdentifierKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "iban" => Ok(IdentifierKind::Iban),
            "bic" | "swift" => Ok(IdentifierKind::Bic),
            "ci" | "creditor" | "sepa-ci" => Ok(IdentifierKind::CreditorIdentifier),
            _ => Err(Error::InvalidKind(s.to_string())),
        }
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IdentifierKind::Iban => "IBAN",
            IdentifierKind::Bic => "BIC",
            IdentifierKind::CreditorIdentifier => "creditor identifier",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_str() {
        assert_eq!("iban".parse::<IdentifierKind>().unwrap(), IdentifierKind::Iban);
        assert_eq!("IBAN".parse::<IdentifierKind>().unwrap(), IdentifierKind::Iban);
        assert_eq!("swift".parse::<IdentifierKind>().unwrap(), IdentifierKind::Bic);
        assert_eq!(
            "sepa-ci".parse::<IdentifierKind>().unwrap(),
            IdentifierKind::CreditorIdentifier
        );
        assert!(matches!(
            "unknown".parse::<IdentifierKind>(),
            Err(Error::InvalidKind(_))
        ));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(IdentifierKind::Iban.to_string(), "IBAN");
        assert_eq!(IdentifierKind::Bic.to_string(), "BIC");
        assert_eq!(IdentifierKind::CreditorIdentifier.to_string(), "creditor identifier");
    }
}
