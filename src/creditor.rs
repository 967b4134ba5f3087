//! SEPA Creditor Identifier.
//!
//! Layout: country code (2), check digits (2), creditor business code (3)
//! and a national identifier of 1 to 28 letters and digits. The business
//! code is chosen freely by the creditor and is left out of the check digit
//! computation, so a creditor keeps the same check digits whatever business
//! code it uses. Only countries in the SEPA scope issue creditor
//! identifiers (see [`Country::is_sepa`]).

use std::fmt;
use std::ops::{Range, RangeInclusive};
use std::str::FromStr;

use crate::check_digit;
use crate::country::Country;
use crate::error::{Error, Result};
use crate::IdentifierKind;

/// Coarse pre-filter for normalised creditor identifiers.
///
/// Looser than [`CreditorIdentifier::is_valid`]: neither the country nor
/// the check digits are verified.
pub const REGEX: &str = "[A-Z]{2}[0-9]{2}[A-Z0-9]{3}[A-Z0-9]{1,28}";

/// Business code used when the creditor does not distinguish business lines.
pub const DEFAULT_BUSINESS_CODE: &str = "ZZZ";

/// Allowed length of the national identifier.
pub const NATIONAL_ID_LENGTH: RangeInclusive<usize> = 1..=28;

const BUSINESS_CODE: Range<usize> = 4..7;

/// A valid SEPA creditor identifier in normalised form.
///
/// # Examples
///
/// ```rust
/// use bankident::CreditorIdentifier;
///
/// let ci: CreditorIdentifier = "fr72zzz123456".parse()?;
/// assert_eq!(ci.to_string(), "FR72ZZZ123456");
/// assert_eq!(ci.business_code(), "ZZZ");
/// assert_eq!(ci.national_identifier(), "123456");
/// # Ok::<(), bankident::Error>(())
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CreditorIdentifier {
    value: String,
    country: Country,
}

impl CreditorIdentifier {
    /// Build a creditor identifier from its parts, computing the check digits.
    ///
    /// # Errors
    ///
    /// [`Error::NotWellFormed`] if `business_code` is not 3 letters or digits
    /// or `national_id` is not 1 to 28 letters or digits,
    /// [`Error::UnsupportedCountry`] if `country` is outside the SEPA scope.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bankident::{Country, CreditorIdentifier};
    ///
    /// let france = Country::from_alpha2("FR").unwrap();
    /// let ci = CreditorIdentifier::from_parts(france, "ZZZ", "123456")?;
    /// assert_eq!(ci.as_str(), "FR72ZZZ123456");
    /// # Ok::<(), bankident::Error>(())
    /// ```
    pub fn from_parts(country: Country, business_code: &str, national_id: &str) -> Result<Self> {
        let input = || format!("{}{}{}", country.alpha2_code(), business_code, national_id);
        let normalized_code = business_code.trim().to_ascii_uppercase();
        let normalized_id = national_id.trim().to_ascii_uppercase();

        if normalized_code.len() != BUSINESS_CODE.len()
            || !is_upper_alphanumeric(&normalized_code)
            || !NATIONAL_ID_LENGTH.contains(&normalized_id.len())
            || !is_upper_alphanumeric(&normalized_id)
        {
            return Err(Error::NotWellFormed {
                kind: IdentifierKind::CreditorIdentifier,
                input: input(),
            });
        }

        if !country.is_sepa() {
            return Err(Error::UnsupportedCountry {
                kind: IdentifierKind::CreditorIdentifier,
                input: input(),
                country,
            });
        }

        let placeholder = format!("{}00{}", country.alpha2_code(), normalized_id);
        let check_digits = check_digit::calculate(&placeholder)?;
        Ok(CreditorIdentifier {
            value: format!(
                "{}{}{}{}",
                country.alpha2_code(),
                check_digits,
                normalized_code,
                normalized_id
            ),
            country,
        })
    }

    /// Whether `s` is a valid creditor identifier. Never panics.
    pub fn is_valid(s: &str) -> bool {
        s.parse::<CreditorIdentifier>().is_ok()
    }

    /// Normalised string form.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Country of the creditor.
    pub fn country(&self) -> Country {
        self.country
    }

    /// Two letter country code.
    pub fn country_code(&self) -> &str {
        &self.value[..2]
    }

    /// Two check digits.
    pub fn check_digit(&self) -> &str {
        &self.value[2..4]
    }

    /// Creditor business code.
    pub fn business_code(&self) -> &str {
        &self.value[BUSINESS_CODE]
    }

    /// National identifier of the creditor.
    pub fn national_identifier(&self) -> &str {
        &self.value[BUSINESS_CODE.end..]
    }
}

impl FromStr for CreditorIdentifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim().to_ascii_uppercase();

        if !is_well_formed(&value) {
            return Err(Error::NotWellFormed {
                kind: IdentifierKind::CreditorIdentifier,
                input: s.to_string(),
            });
        }

        let code = &value[..2];
        let country = Country::from_alpha2(code).ok_or_else(|| Error::UnknownCountry {
            kind: IdentifierKind::CreditorIdentifier,
            input: s.to_string(),
            code: code.to_string(),
        })?;

        if !country.is_sepa() {
            return Err(Error::UnsupportedCountry {
                kind: IdentifierKind::CreditorIdentifier,
                input: s.to_string(),
                country,
            });
        }

        let checked = format!("{}{}", &value[..BUSINESS_CODE.start], &value[BUSINESS_CODE.end..]);
        if !check_digit::validate(&checked) {
            return Err(Error::InvalidCheckDigit {
                kind: IdentifierKind::CreditorIdentifier,
                input: s.to_string(),
            });
        }

        Ok(CreditorIdentifier { value, country })
    }
}

/// Length and character set check against [`REGEX`].
fn is_well_formed(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() > BUSINESS_CODE.end
        && NATIONAL_ID_LENGTH.contains(&(bytes.len() - BUSINESS_CODE.end))
        && bytes[..2].iter().all(u8::is_ascii_uppercase)
        && bytes[2..4].iter().all(u8::is_ascii_digit)
        && is_upper_alphanumeric(&value[4..])
}

fn is_upper_alphanumeric(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

impl TryFrom<&str> for CreditorIdentifier {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        s.parse()
    }
}

impl fmt::Display for CreditorIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl fmt::Debug for CreditorIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CreditorIdentifier").field(&self.value).finish()
    }
}

impl AsRef<str> for CreditorIdentifier {
    fn as_ref(&self) -> &str {
        &self.value
    }
}
