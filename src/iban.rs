//! International Bank Account Number (ISO 13616).
//!
//! An IBAN is a two letter country code, two check digits and a country
//! specific Basic Bank Account Number (BBAN) of fixed length. The BBAN
//! structure and the position of its fields come from [`bban_registry`].

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Range;
use std::str::FromStr;

use crate::check_digit;
use crate::country::Country;
use crate::error::{Error, Result};
use crate::registry::{bban_registry, StructureEntry};
use crate::IdentifierKind;

/// Coarse pre-filter for normalised IBANs.
///
/// Looser than [`Iban::is_valid`]: neither the country, the BBAN structure
/// nor the check digits are verified.
pub const REGEX: &str = "[A-Z]{2}[0-9]{2}[A-Z0-9]{1,30}";

const MIN_LENGTH: usize = 5;
const MAX_LENGTH: usize = 34;

/// A valid IBAN in normalised form: upper-case, no separators.
///
/// # Examples
///
/// ```rust
/// use bankident::Iban;
///
/// let iban: Iban = "fr1420041010050500013m02606".parse()?;
/// assert_eq!(iban.to_string(), "FR1420041010050500013M02606");
/// assert_eq!(iban.bank_identifier(), "20041");
/// assert_eq!(iban.branch_identifier(), Some("01005"));
/// assert_eq!(iban.account_number(), "0500013M026");
/// assert_eq!(iban.national_check_digit(), Some("06"));
/// assert_eq!(iban.to_printable_string(), "FR14 2004 1010 0505 0001 3M02 606");
/// # Ok::<(), bankident::Error>(())
/// ```
#[derive(Clone)]
pub struct Iban {
    value: String,
    country: Country,
    structure: &'static StructureEntry,
}

impl Iban {
    /// Build an IBAN from a country and a BBAN, computing the check digits.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedCountry`] if `country` has no IBAN format,
    /// [`Error::InvalidStructure`] if `bban` does not match it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bankident::{Country, Iban};
    ///
    /// let germany = Country::from_alpha2("DE").unwrap();
    /// let iban = Iban::from_parts(germany, "370400440532013000")?;
    /// assert_eq!(iban.as_str(), "DE89370400440532013000");
    /// # Ok::<(), bankident::Error>(())
    /// ```
    pub fn from_parts(country: Country, bban: &str) -> Result<Self> {
        let input = || format!("{}{}", country.alpha2_code(), bban);
        let normalized = bban.trim().to_ascii_uppercase();

        let structure =
            bban_registry()
                .for_country(country)
                .ok_or_else(|| Error::UnsupportedCountry {
                    kind: IdentifierKind::Iban,
                    input: input(),
                    country,
                })?;
        if !structure.is_body_valid(&normalized) {
            return Err(Error::InvalidStructure {
                kind: IdentifierKind::Iban,
                input: input(),
            });
        }

        let placeholder = format!("{}00{}", country.alpha2_code(), normalized);
        let check_digits = check_digit::calculate(&placeholder)?;
        Ok(Iban {
            value: format!("{}{}{}", country.alpha2_code(), check_digits, normalized),
            country,
            structure,
        })
    }

    /// Whether `s` is a valid IBAN. Never panics.
    pub fn is_valid(s: &str) -> bool {
        s.parse::<Iban>().is_ok()
    }

    /// Expected total IBAN length for `country`, if it issues IBANs.
    pub fn length_for(country: Country) -> Option<usize> {
        bban_registry()
            .for_country(country)
            .map(|structure| structure.pattern().length() + 4)
    }

    /// Normalised string form.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Country of the IBAN, possibly a subdivision of the BBAN's owner.
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

    /// Basic Bank Account Number.
    pub fn bban(&self) -> &str {
        &self.value[4..]
    }

    /// Bank identifier; empty when the national layout has none.
    pub fn bank_identifier(&self) -> &str {
        self.bban_field(self.structure.bank_identifier())
            .unwrap_or_default()
    }

    /// Branch identifier, if the national layout has one.
    pub fn branch_identifier(&self) -> Option<&str> {
        self.bban_field(self.structure.branch_identifier())
    }

    /// National check digit, if the national layout has one.
    pub fn national_check_digit(&self) -> Option<&str> {
        self.bban_field(self.structure.national_check_digit())
    }

    /// Account number; empty when the national layout has none.
    pub fn account_number(&self) -> &str {
        self.bban_field(self.structure.account_number())
            .unwrap_or_default()
    }

    /// Normalised form split in blocks of four characters.
    pub fn to_printable_string(&self) -> String {
        let mut printable = String::with_capacity(self.value.len() + self.value.len() / 4);
        for (i, c) in self.value.chars().enumerate() {
            if i > 0 && i % 4 == 0 {
                printable.push(' ');
            }
            printable.push(c);
        }
        printable
    }

    fn bban_field(&self, range: Option<Range<usize>>) -> Option<&str> {
        range.and_then(|range| self.bban().get(range))
    }
}

impl FromStr for Iban {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim().to_ascii_uppercase();

        if !is_well_formed(&value) {
            return Err(Error::NotWellFormed {
                kind: IdentifierKind::Iban,
                input: s.to_string(),
            });
        }

        let code = &value[..2];
        let country = Country::from_alpha2(code).ok_or_else(|| Error::UnknownCountry {
            kind: IdentifierKind::Iban,
            input: s.to_string(),
            code: code.to_string(),
        })?;

        let structure =
            bban_registry()
                .for_country(country)
                .ok_or_else(|| Error::UnsupportedCountry {
                    kind: IdentifierKind::Iban,
                    input: s.to_string(),
                    country,
                })?;

        if !structure.is_body_valid(&value[4..]) {
            return Err(Error::InvalidStructure {
                kind: IdentifierKind::Iban,
                input: s.to_string(),
            });
        }

        if !check_digit::validate(&value) {
            return Err(Error::InvalidCheckDigit {
                kind: IdentifierKind::Iban,
                input: s.to_string(),
            });
        }

        Ok(Iban {
            value,
            country,
            structure,
        })
    }
}

/// Length and character set check against [`REGEX`].
fn is_well_formed(value: &str) -> bool {
    let bytes = value.as_bytes();
    (MIN_LENGTH..=MAX_LENGTH).contains(&bytes.len())
        && bytes[..2].iter().all(u8::is_ascii_uppercase)
        && bytes[2..4].iter().all(u8::is_ascii_digit)
        && bytes[4..]
            .iter()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

impl TryFrom<&str> for Iban {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        s.parse()
    }
}

impl fmt::Display for Iban {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl fmt::Debug for Iban {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Iban").field(&self.value).finish()
    }
}

impl AsRef<str> for Iban {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl PartialEq for Iban {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Iban {}

impl Hash for Iban {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl PartialOrd for Iban {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Iban {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}
