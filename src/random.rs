//! Random valid identifiers, for fixtures and load tests.
//!
//! ```rust
//! use bankident::random::Generator;
//! use bankident::Iban;
//!
//! let mut generator = Generator::seeded(42);
//! let iban = generator.iban()?;
//! assert!(Iban::is_valid(iban.as_str()));
//! # Ok::<(), bankident::Error>(())
//! ```

use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};

use crate::bic::{Bic, PRIMARY_OFFICE_BRANCH_CODE};
use crate::country::Country;
use crate::creditor::{CreditorIdentifier, DEFAULT_BUSINESS_CODE, NATIONAL_ID_LENGTH};
use crate::error::{Error, Result};
use crate::iban::Iban;
use crate::pattern::{CharacterClass, Pattern};
use crate::registry::bban_registry;
use crate::IdentifierKind;

const UPPER_ALPHANUMERIC: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Generator of random valid identifiers.
#[derive(Debug)]
pub struct Generator<R> {
    rng: R,
}

impl Generator<ThreadRng> {
    /// Generator backed by the thread-local RNG.
    pub fn new() -> Self {
        Generator::with_rng(rand::thread_rng())
    }
}

impl Default for Generator<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator<StdRng> {
    /// Reproducible generator: the same seed yields the same sequence.
    pub fn seeded(seed: u64) -> Self {
        Generator::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Generator<R> {
    /// Generator backed by `rng`.
    pub fn with_rng(rng: R) -> Self {
        Generator { rng }
    }

    /// Random string matching `pattern`.
    pub fn matching(&mut self, pattern: &Pattern) -> String {
        let mut value = String::with_capacity(pattern.length());
        for group in pattern.groups() {
            for _ in 0..group.length() {
                value.push(self.pick(group.class().alphabet()));
            }
        }
        value
    }

    /// Random IBAN of a random IBAN country.
    pub fn iban(&mut self) -> Result<Iban> {
        let countries: Vec<Country> = bban_registry().countries().collect();
        let country = self.country_of(&countries);
        self.iban_for(country)
    }

    /// Random IBAN of `country`.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedCountry`] if `country` has no IBAN format.
    pub fn iban_for(&mut self, country: Country) -> Result<Iban> {
        let structure = bban_registry()
            .for_country(country)
            .ok_or_else(|| unsupported(IdentifierKind::Iban, country))?;
        let bban = self.matching(structure.pattern());
        Iban::from_parts(country, &bban)
    }

    /// Random live BIC of a random country.
    pub fn bic(&mut self) -> Result<Bic> {
        let countries: Vec<Country> = Country::all().collect();
        let country = self.country_of(&countries);
        self.bic_for(country)
    }

    /// Random live BIC of `country`. One in two designates a primary office.
    pub fn bic_for(&mut self, country: Country) -> Result<Bic> {
        let mut value = String::with_capacity(11);
        for _ in 0..4 {
            value.push(self.pick(CharacterClass::UpperLetters.alphabet()));
        }
        value.push_str(country.alpha2_code());
        value.push(self.pick(UPPER_ALPHANUMERIC));
        // '0' in second position marks a test BIC
        value.push(self.pick(&UPPER_ALPHANUMERIC[1..]));
        if self.rng.gen_bool(0.5) {
            value.push_str(PRIMARY_OFFICE_BRANCH_CODE);
        } else {
            for _ in 0..3 {
                value.push(self.pick(UPPER_ALPHANUMERIC));
            }
        }
        value.parse()
    }

    /// Random creditor identifier of a random SEPA country.
    pub fn creditor_identifier(&mut self) -> Result<CreditorIdentifier> {
        let countries: Vec<Country> = Country::all().filter(Country::is_sepa).collect();
        let country = self.country_of(&countries);
        self.creditor_identifier_for(country)
    }

    /// Random creditor identifier of `country`. One in two uses the default
    /// business code.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedCountry`] if `country` is outside the SEPA scope.
    pub fn creditor_identifier_for(&mut self, country: Country) -> Result<CreditorIdentifier> {
        if !country.is_sepa() {
            return Err(unsupported(IdentifierKind::CreditorIdentifier, country));
        }
        let business_code: String = if self.rng.gen_bool(0.5) {
            DEFAULT_BUSINESS_CODE.to_string()
        } else {
            (0..3).map(|_| self.pick(UPPER_ALPHANUMERIC)).collect()
        };
        let length = self.rng.gen_range(NATIONAL_ID_LENGTH);
        let national_id: String = (0..length).map(|_| self.pick(UPPER_ALPHANUMERIC)).collect();
        CreditorIdentifier::from_parts(country, &business_code, &national_id)
    }

    fn pick(&mut self, alphabet: &str) -> char {
        let bytes = alphabet.as_bytes();
        char::from(bytes[self.rng.gen_range(0..bytes.len())])
    }

    fn country_of(&mut self, countries: &[Country]) -> Country {
        countries[self.rng.gen_range(0..countries.len())]
    }
}

fn unsupported(kind: IdentifierKind, country: Country) -> Error {
    Error::UnsupportedCountry {
        kind,
        input: country.alpha2_code().to_string(),
        country,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_seeded_generators_are_reproducible() {
        let mut first = Generator::seeded(7);
        let mut second = Generator::seeded(7);
        for _ in 0..20 {
            assert_eq!(first.iban().unwrap(), second.iban().unwrap());
            assert_eq!(first.bic().unwrap(), second.bic().unwrap());
        }
    }

    #[test]
    fn test_generated_identifiers_are_valid() {
        let mut generator = Generator::seeded(2024);
        for _ in 0..200 {
            let iban = generator.iban().unwrap();
            assert!(Iban::is_valid(iban.as_str()), "{iban}");
            let bic = generator.bic().unwrap();
            assert!(bic.is_live_bic(), "{bic}");
            let ci = generator.creditor_identifier().unwrap();
            assert!(CreditorIdentifier::is_valid(ci.as_str()), "{ci}");
        }
    }

    #[test]
    fn test_every_iban_country_generates() {
        let mut generator = Generator::seeded(1);
        for country in bban_registry().countries() {
            let iban = generator.iban_for(country).unwrap();
            assert_eq!(iban.country(), country);
            assert_eq!(Iban::length_for(country), Some(iban.as_str().len()));
        }
    }

    #[test]
    fn test_unsupported_country() {
        let mut generator = Generator::seeded(1);
        let us = Country::from_alpha2("US").unwrap();
        assert!(matches!(generator.iban_for(us), Err(Error::UnsupportedCountry { .. })));
        assert!(matches!(
            generator.creditor_identifier_for(us),
            Err(Error::UnsupportedCountry { .. })
        ));
        assert_eq!(generator.bic_for(us).unwrap().country(), us);
    }

    #[test]
    fn test_creditor_identifiers_cover_sepa_countries() {
        let mut generator = Generator::seeded(3);
        for country in Country::all().filter(Country::is_sepa) {
            let ci = generator.creditor_identifier_for(country).unwrap();
            assert_eq!(ci.country(), country);
            assert!(NATIONAL_ID_LENGTH.contains(&ci.national_identifier().len()));
            assert!(CreditorIdentifier::is_valid(ci.as_str()), "{ci}");
        }
    }

    #[test]
    fn test_thread_rng_generator() {
        let mut generator = Generator::default();
        assert!(generator.iban().is_ok());
    }

    proptest! {
        #[test]
        fn matching_strings_match(seed in any::<u64>(),
                                  expression in proptest::sample::select(vec![
                                      "4!n4!n12!c", "5!n5!n11!c2!n", "4!a6!n8!n", "2!a1!e3!n",
                                  ])) {
            let pattern = Pattern::compile(expression).unwrap();
            let value = Generator::seeded(seed).matching(&pattern);
            prop_assert!(pattern.matches(&value), "{} does not match {}", value, expression);
        }
    }
}
