//! Business Identifier Code (ISO 9362), also known as SWIFT code.
//!
//! Layout: institution code (4), country code (2), location code (2) and an
//! optional branch code (3). An 8 character BIC designates the primary
//! office and is normalised to 11 characters with the `XXX` branch code.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::country::Country;
use crate::error::{Error, Result};
use crate::pattern::Pattern;
use crate::IdentifierKind;

/// Coarse pre-filter for normalised BICs.
///
/// Looser than [`Bic::is_valid`]: the country code is not verified.
pub const REGEX: &str = "[A-Z0-9]{4}[A-Z]{2}[A-Z0-9]{2}([A-Z0-9]{3})?";

/// Branch code of a primary office.
pub const PRIMARY_OFFICE_BRANCH_CODE: &str = "XXX";

/// Second location code character marking a test BIC.
const TEST_BIC_INDICATOR: u8 = b'0';

const SHORT_LENGTH: usize = 8;
const LENGTH: usize = 11;

static STRUCTURE: LazyLock<Pattern> = LazyLock::new(|| {
    Pattern::compile("4!c2!a2!c3!c").expect("BIC structure is a valid pattern")
});

/// A valid BIC in normalised 11 character form.
///
/// # Examples
///
/// ```rust
/// use bankident::Bic;
///
/// let bic: Bic = "psstfrpp".parse()?;
/// assert_eq!(bic.to_string(), "PSSTFRPPXXX");
/// assert_eq!(bic.institution_code(), "PSST");
/// assert_eq!(bic.country_code(), "FR");
/// assert!(bic.is_live_bic());
/// assert_eq!(bic.as_test_bic().to_string(), "PSSTFRP0XXX");
/// # Ok::<(), bankident::Error>(())
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bic {
    value: String,
    country: Country,
}

impl Bic {
    /// Whether `s` is a valid BIC. Never panics.
    pub fn is_valid(s: &str) -> bool {
        s.parse::<Bic>().is_ok()
    }

    /// Normalised string form.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Institution (bank) code.
    pub fn institution_code(&self) -> &str {
        &self.value[..4]
    }

    /// Two letter country code.
    pub fn country_code(&self) -> &str {
        &self.value[4..6]
    }

    /// Country of the institution.
    pub fn country(&self) -> Country {
        self.country
    }

    /// Location code.
    pub fn location_code(&self) -> &str {
        &self.value[6..8]
    }

    /// Branch code, `XXX` for the primary office.
    pub fn branch_code(&self) -> &str {
        &self.value[8..]
    }

    /// Whether this BIC designates the institution's primary office.
    pub fn is_primary_office(&self) -> bool {
        self.branch_code() == PRIMARY_OFFICE_BRANCH_CODE
    }

    /// Whether this is a test BIC (second location character is `0`).
    pub fn is_test_bic(&self) -> bool {
        self.value.as_bytes()[7] == TEST_BIC_INDICATOR
    }

    /// Whether this is a live BIC.
    pub fn is_live_bic(&self) -> bool {
        !self.is_test_bic()
    }

    /// Test counterpart of this BIC. Returns a copy if it already is one.
    pub fn as_test_bic(&self) -> Bic {
        let mut value = String::with_capacity(LENGTH);
        value.push_str(&self.value[..7]);
        value.push(char::from(TEST_BIC_INDICATOR));
        value.push_str(&self.value[8..]);
        Bic {
            value,
            country: self.country,
        }
    }
}

impl FromStr for Bic {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut value = s.trim().to_ascii_uppercase();
        if value.len() == SHORT_LENGTH {
            value.push_str(PRIMARY_OFFICE_BRANCH_CODE);
        }

        if !STRUCTURE.matches(&value) {
            return Err(Error::NotWellFormed {
                kind: IdentifierKind::Bic,
                input: s.to_string(),
            });
        }

        let code = &value[4..6];
        let country = Country::from_alpha2(code).ok_or_else(|| Error::UnknownCountry {
            kind: IdentifierKind::Bic,
            input: s.to_string(),
            code: code.to_string(),
        })?;

        Ok(Bic { value, country })
    }
}

impl TryFrom<&str> for Bic {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        s.parse()
    }
}

impl fmt::Display for Bic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl fmt::Debug for Bic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Bic").field(&self.value).finish()
    }
}

impl AsRef<str> for Bic {
    fn as_ref(&self) -> &str {
        &self.value
    }
}
