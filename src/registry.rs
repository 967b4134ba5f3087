//! Per-country BBAN structure registry.
//!
//! The registry maps a country to the [`Pattern`] the Basic Bank Account
//! Number of its IBANs must match, together with the offsets of the bank
//! identifier, branch identifier, national check digit and account number
//! inside the BBAN. It is built lazily on first use and never changes
//! afterwards.
//!
//! Territories that issue numbers following another country's layout under
//! their own code (French overseas departments, British crown dependencies)
//! are registered as subdivisions and resolve to the parent entry.

use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::LazyLock;

use tracing::{debug, trace};

use crate::country::Country;
use crate::pattern::Pattern;

/// Structure of the national part of an identifier for one country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureEntry {
    country: Country,
    pattern: Pattern,
    subdivisions: Vec<Country>,
    bank_identifier: Option<Range<usize>>,
    branch_identifier: Option<Range<usize>>,
    national_check_digit: Option<Range<usize>>,
    account_number: Option<Range<usize>>,
}

impl StructureEntry {
    /// Country owning the layout.
    pub fn country(&self) -> Country {
        self.country
    }

    /// Compiled pattern of the national part.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Territories reusing this layout under their own code.
    pub fn subdivisions(&self) -> &[Country] {
        &self.subdivisions
    }

    /// Whether `country` is the owner or one of its subdivisions.
    pub fn covers(&self, country: Country) -> bool {
        self.country == country || self.subdivisions.contains(&country)
    }

    /// Whether `body` matches the national structure.
    pub fn is_body_valid(&self, body: &str) -> bool {
        self.pattern.matches(body)
    }

    /// Offsets of the bank identifier inside the body.
    pub fn bank_identifier(&self) -> Option<Range<usize>> {
        self.bank_identifier.clone()
    }

    /// Offsets of the branch identifier inside the body.
    pub fn branch_identifier(&self) -> Option<Range<usize>> {
        self.branch_identifier.clone()
    }

    /// Offsets of the national check digit inside the body.
    pub fn national_check_digit(&self) -> Option<Range<usize>> {
        self.national_check_digit.clone()
    }

    /// Offsets of the account number inside the body.
    pub fn account_number(&self) -> Option<Range<usize>> {
        self.account_number.clone()
    }
}

/// Read-only lookup table from country to [`StructureEntry`].
#[derive(Debug)]
pub struct Registry {
    entries: Vec<StructureEntry>,
    index: BTreeMap<Country, usize>,
}

impl Registry {
    fn build(layouts: &[Layout]) -> Self {
        let mut entries = Vec::with_capacity(layouts.len());
        let mut index = BTreeMap::new();

        for layout in layouts {
            let entry = layout.compile();
            let position = entries.len();
            index.insert(entry.country, position);
            for subdivision in &entry.subdivisions {
                index.insert(*subdivision, position);
            }
            trace!(
                country = entry.country.alpha2_code(),
                pattern = %entry.pattern,
                "registered structure"
            );
            entries.push(entry);
        }

        debug!(
            entries = entries.len(),
            countries = index.len(),
            "built BBAN registry"
        );
        Registry { entries, index }
    }

    /// Entry for `country`, following subdivisions to their parent.
    ///
    /// `None` when the country does not use this identifier scheme.
    pub fn for_country(&self, country: Country) -> Option<&StructureEntry> {
        self.index.get(&country).map(|&position| &self.entries[position])
    }

    /// Every country that resolves to an entry, subdivisions included,
    /// ordered by code.
    pub fn countries(&self) -> impl Iterator<Item = Country> + '_ {
        self.index.keys().copied()
    }

    /// Distinct entries in table order.
    pub fn entries(&self) -> &[StructureEntry] {
        &self.entries
    }
}

/// IBAN registry: BBAN structure per country.
pub fn bban_registry() -> &'static Registry {
    static REGISTRY: LazyLock<Registry> = LazyLock::new(|| Registry::build(BBAN_LAYOUTS));
    &REGISTRY
}

// ============================================================================
// Literal tables
// ============================================================================

/// One authored table row. Offsets are `[start, end)` inside the body.
#[derive(Debug, Clone, Copy)]
struct Layout {
    country: &'static str,
    expression: &'static str,
    bank: Option<(usize, usize)>,
    branch: Option<(usize, usize)>,
    check: Option<(usize, usize)>,
    account: Option<(usize, usize)>,
    subdivisions: &'static [&'static str],
}

const fn layout(country: &'static str, expression: &'static str) -> Layout {
    Layout {
        country,
        expression,
        bank: None,
        branch: None,
        check: None,
        account: None,
        subdivisions: &[],
    }
}

impl Layout {
    const fn bank(mut self, start: usize, end: usize) -> Self {
        self.bank = Some((start, end));
        self
    }

    const fn branch(mut self, start: usize, end: usize) -> Self {
        self.branch = Some((start, end));
        self
    }

    const fn check(mut self, start: usize, end: usize) -> Self {
        self.check = Some((start, end));
        self
    }

    const fn account(mut self, start: usize, end: usize) -> Self {
        self.account = Some((start, end));
        self
    }

    const fn subdivisions(mut self, subdivisions: &'static [&'static str]) -> Self {
        self.subdivisions = subdivisions;
        self
    }

    fn compile(&self) -> StructureEntry {
        let range = |offsets: Option<(usize, usize)>| offsets.map(|(start, end)| start..end);
        StructureEntry {
            country: known_country(self.country),
            pattern: Pattern::compile(self.expression)
                .expect("registry expressions are valid patterns"),
            subdivisions: self.subdivisions.iter().map(|code| known_country(code)).collect(),
            bank_identifier: range(self.bank),
            branch_identifier: range(self.branch),
            national_check_digit: range(self.check),
            account_number: range(self.account),
        }
    }
}

fn known_country(code: &str) -> Country {
    Country::from_alpha2(code).expect("registry countries are ISO 3166-1 codes")
}

const FRENCH_TERRITORIES: &[&str] = &[
    "BL", "GF", "GP", "MF", "MQ", "NC", "PF", "PM", "RE", "TF", "WF", "YT",
];

const BRITISH_CROWN_DEPENDENCIES: &[&str] = &["GG", "IM", "JE"];

#[rustfmt::skip]
const BBAN_LAYOUTS: &[Layout] = &[
    layout("AD", "4!n4!n12!c").bank(0, 4).branch(4, 8).account(8, 20),
    layout("AE", "3!n16!n").bank(0, 3).account(3, 19),
    layout("AL", "8!n16!c").bank(0, 3).branch(3, 7).check(7, 8).account(8, 24),
    layout("AT", "5!n11!n").bank(0, 5).account(5, 16),
    layout("AZ", "4!a20!c").bank(0, 4).account(4, 24),
    layout("BA", "3!n3!n8!n2!n").bank(0, 3).branch(3, 6).account(6, 14).check(14, 16),
    layout("BE", "3!n7!n2!n").bank(0, 3).account(3, 10).check(10, 12),
    layout("BG", "4!a4!n2!n8!c").bank(0, 4).branch(4, 8).account(8, 18),
    layout("BH", "4!a14!c").bank(0, 4).account(4, 18),
    layout("BI", "5!n5!n11!n2!n").bank(0, 5).branch(5, 10).account(10, 21).check(21, 23),
    layout("BR", "8!n5!n10!n1!a1!c").bank(0, 8).branch(8, 13).account(13, 23),
    layout("BY", "4!c4!n16!c").bank(0, 4).account(4, 24),
    layout("CH", "5!n12!c").bank(0, 5).account(5, 17),
    layout("CR", "4!n14!n").bank(0, 4).account(4, 18),
    layout("CY", "3!n5!n16!c").bank(0, 3).branch(3, 8).account(8, 24),
    layout("CZ", "4!n6!n10!n").bank(0, 4).account(4, 20),
    layout("DE", "8!n10!n").bank(0, 8).account(8, 18),
    layout("DJ", "5!n5!n11!n2!n").bank(0, 5).branch(5, 10).account(10, 21).check(21, 23),
    layout("DK", "4!n9!n1!n").bank(0, 4).account(4, 13).check(13, 14),
    layout("DO", "4!c20!n").bank(0, 4).account(4, 24),
    layout("EE", "2!n2!n11!n1!n").bank(0, 2).branch(2, 4).account(4, 15).check(15, 16),
    layout("EG", "4!n4!n17!n").bank(0, 4).branch(4, 8).account(8, 25),
    layout("ES", "4!n4!n1!n1!n10!n").bank(0, 4).branch(4, 8).check(8, 10).account(10, 20),
    layout("FI", "3!n11!n").bank(0, 3).account(3, 13).check(13, 14).subdivisions(&["AX"]),
    layout("FK", "2!a12!n").bank(0, 2).account(2, 14),
    layout("FO", "4!n9!n1!n").bank(0, 4).account(4, 13).check(13, 14),
    layout("FR", "5!n5!n11!c2!n").bank(0, 5).branch(5, 10).account(10, 21).check(21, 23).subdivisions(FRENCH_TERRITORIES),
    layout("GB", "4!a6!n8!n").bank(0, 4).branch(4, 10).account(10, 18).subdivisions(BRITISH_CROWN_DEPENDENCIES),
    layout("GE", "2!a16!n").bank(0, 2).account(2, 18),
    layout("GI", "4!a15!c").bank(0, 4).account(4, 19),
    layout("GL", "4!n9!n1!n").bank(0, 4).account(4, 13).check(13, 14),
    layout("GR", "3!n4!n16!c").bank(0, 3).branch(3, 7).account(7, 23),
    layout("GT", "4!c20!c").bank(0, 4).account(4, 24),
    layout("HR", "7!n10!n").bank(0, 7).account(7, 17),
    layout("HU", "3!n4!n1!n15!n1!n").bank(0, 3).branch(3, 7).account(8, 23).check(23, 24),
    layout("IE", "4!a6!n8!n").bank(0, 4).branch(4, 10).account(10, 18),
    layout("IL", "3!n3!n13!n").bank(0, 3).branch(3, 6).account(6, 19),
    layout("IQ", "4!a3!n12!n").bank(0, 4).branch(4, 7).account(7, 19),
    layout("IS", "4!n2!n6!n10!n").bank(0, 2).branch(2, 4).account(4, 12),
    layout("IT", "1!a5!n5!n12!c").check(0, 1).bank(1, 6).branch(6, 11).account(11, 23),
    layout("JO", "4!a4!n18!c").bank(0, 4).branch(4, 8).account(8, 26),
    layout("KW", "4!a22!c").bank(0, 4).account(4, 26),
    layout("KZ", "3!n13!c").bank(0, 3).account(3, 16),
    layout("LB", "4!n20!c").bank(0, 4).account(4, 24),
    layout("LC", "4!a24!c").bank(0, 4).account(4, 28),
    layout("LI", "5!n12!c").bank(0, 5).account(5, 17),
    layout("LT", "5!n11!n").bank(0, 5).account(5, 16),
    layout("LU", "3!n13!c").bank(0, 3).account(3, 16),
    layout("LV", "4!a13!c").bank(0, 4).account(4, 17),
    layout("LY", "3!n3!n15!n").bank(0, 3).branch(3, 6).account(6, 21),
    layout("MC", "5!n5!n11!c2!n").bank(0, 5).branch(5, 10).account(10, 21).check(21, 23),
    layout("MD", "2!c18!c").bank(0, 2).account(2, 20),
    layout("ME", "3!n13!n2!n").bank(0, 3).account(3, 16).check(16, 18),
    layout("MK", "3!n10!c2!n").bank(0, 3).account(3, 13).check(13, 15),
    layout("MN", "4!n12!n").bank(0, 4).account(4, 16),
    layout("MR", "5!n5!n11!n2!n").bank(0, 5).branch(5, 10).account(10, 21).check(21, 23),
    layout("MT", "4!a5!n18!c").bank(0, 4).branch(4, 9).account(9, 27),
    layout("MU", "4!a2!n2!n12!n3!n3!a").bank(0, 6).branch(6, 8).account(8, 20),
    layout("NI", "4!a20!n").bank(0, 4).account(4, 24),
    layout("NL", "4!a10!n").bank(0, 4).account(4, 14),
    layout("NO", "4!n6!n1!n").bank(0, 4).account(4, 10).check(10, 11),
    layout("OM", "3!n16!c").bank(0, 3).account(3, 19),
    layout("PK", "4!a16!c").bank(0, 4).account(4, 20),
    layout("PL", "8!n16!n").bank(0, 3).branch(3, 7).check(7, 8).account(8, 24),
    layout("PS", "4!a21!c").bank(0, 4).account(4, 25),
    layout("PT", "4!n4!n11!n2!n").bank(0, 4).branch(4, 8).account(8, 19).check(19, 21),
    layout("QA", "4!a21!c").bank(0, 4).account(4, 25),
    layout("RO", "4!a16!c").bank(0, 4).account(4, 20),
    layout("RS", "3!n13!n2!n").bank(0, 3).account(3, 16).check(16, 18),
    layout("RU", "9!n5!n15!c").bank(0, 9).branch(9, 14).account(14, 29),
    layout("SA", "2!n18!c").bank(0, 2).account(2, 20),
    layout("SC", "4!a2!n2!n16!n3!a").bank(0, 6).branch(6, 8).account(8, 24),
    layout("SD", "2!n12!n").bank(0, 2).account(2, 14),
    layout("SE", "3!n16!n1!n").bank(0, 3).account(3, 19).check(19, 20),
    layout("SI", "5!n8!n2!n").bank(0, 5).account(5, 13).check(13, 15),
    layout("SK", "4!n6!n10!n").bank(0, 4).account(4, 20),
    layout("SM", "1!a5!n5!n12!c").check(0, 1).bank(1, 6).branch(6, 11).account(11, 23),
    layout("SO", "4!n3!n12!n").bank(0, 4).branch(4, 7).account(7, 19),
    layout("ST", "4!n4!n11!n2!n").bank(0, 4).branch(4, 8).account(8, 19).check(19, 21),
    layout("SV", "4!a20!n").bank(0, 4).account(4, 24),
    layout("TL", "3!n14!n2!n").bank(0, 3).account(3, 17).check(17, 19),
    layout("TN", "2!n3!n13!n2!n").bank(0, 2).branch(2, 5).account(5, 18).check(18, 20),
    layout("TR", "5!n1!n16!c").bank(0, 5).account(6, 22),
    layout("UA", "6!n19!c").bank(0, 6).account(6, 25),
    layout("VA", "3!n15!n").bank(0, 3).account(3, 18),
    layout("VG", "4!a16!n").bank(0, 4).account(4, 20),
    layout("XK", "4!n10!n2!n").bank(0, 2).branch(2, 4).account(4, 14).check(14, 16),
    layout("YE", "4!a4!n18!c").bank(0, 4).branch(4, 8).account(8, 26),
];

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn country(code: &str) -> Country {
        Country::from_alpha2(code).unwrap()
    }

    #[test]
    fn test_every_layout_is_registered() {
        assert_eq!(bban_registry().entries().len(), BBAN_LAYOUTS.len());
        for layout in BBAN_LAYOUTS {
            assert!(bban_registry().for_country(country(layout.country)).is_some());
        }
    }

    #[test]
    fn test_bban_ranges_lie_within_the_pattern() {
        for entry in bban_registry().entries() {
            let length = entry.pattern().length();
            let ranges = [
                entry.bank_identifier(),
                entry.branch_identifier(),
                entry.national_check_digit(),
                entry.account_number(),
            ];
            for range in ranges.into_iter().flatten() {
                assert!(
                    range.start < range.end && range.end <= length,
                    "{}: {range:?} outside 0..{length}",
                    entry.country()
                );
            }
            assert!(entry.bank_identifier().is_some(), "{}", entry.country());
            assert!(entry.account_number().is_some(), "{}", entry.country());
        }
    }

    #[test]
    fn test_bban_ranges_do_not_overlap() {
        for entry in bban_registry().entries() {
            let mut ranges: Vec<Range<usize>> = [
                entry.bank_identifier(),
                entry.branch_identifier(),
                entry.national_check_digit(),
                entry.account_number(),
            ]
            .into_iter()
            .flatten()
            .collect();
            ranges.sort_by_key(|range| range.start);
            for pair in ranges.windows(2) {
                assert!(pair[0].end <= pair[1].start, "{}: {pair:?}", entry.country());
            }
        }
    }

    #[test]
    fn test_iban_lengths() {
        // Total IBAN length = country code + check digits + BBAN.
        let expected = [
            ("AD", 24), ("BE", 16), ("BR", 29), ("DE", 22), ("FR", 27), ("GB", 22),
            ("IT", 27), ("LC", 32), ("MT", 31), ("NO", 15), ("RU", 33), ("SC", 31),
        ];
        for (code, length) in expected {
            let entry = bban_registry().for_country(country(code)).unwrap();
            assert_eq!(entry.pattern().length() + 4, length, "{code}");
        }
    }

    #[test]
    fn test_subdivisions_resolve_to_parent() {
        let france = bban_registry().for_country(country("FR")).unwrap();
        for code in ["GP", "RE", "NC", "YT"] {
            let entry = bban_registry().for_country(country(code)).unwrap();
            assert_eq!(entry.country(), country("FR"));
            assert_eq!(entry, france);
            assert!(entry.covers(country(code)));
        }
        let jersey = bban_registry().for_country(country("JE")).unwrap();
        assert_eq!(jersey.country(), country("GB"));
        assert_eq!(
            bban_registry().for_country(country("AX")).unwrap().country(),
            country("FI")
        );
    }

    #[test]
    fn test_unsupported_countries() {
        for code in ["US", "CA", "JP", "AU", "CN"] {
            assert!(bban_registry().for_country(country(code)).is_none(), "{code}");
        }
    }

    #[test]
    fn test_is_body_valid() {
        let france = bban_registry().for_country(country("FR")).unwrap();
        assert!(france.is_body_valid("20041010050500013M02606"));
        assert!(!france.is_body_valid("20041010050500013M0260"));
        assert!(!france.is_body_valid("2004101005050001-M02606"));
    }

    #[test]
    fn test_countries_include_subdivisions_in_order() {
        let countries: Vec<Country> = bban_registry().countries().collect();
        assert!(countries.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(countries.contains(&country("GF")));
        assert!(countries.contains(&country("GG")));
        assert_eq!(
            countries.len(),
            BBAN_LAYOUTS.len() + FRENCH_TERRITORIES.len() + BRITISH_CROWN_DEPENDENCIES.len() + 1
        );
    }

    #[test]
    fn test_french_layout_offsets() {
        let france = bban_registry().for_country(country("FR")).unwrap();
        assert_eq!(france.bank_identifier(), Some(0..5));
        assert_eq!(france.branch_identifier(), Some(5..10));
        assert_eq!(france.account_number(), Some(10..21));
        assert_eq!(france.national_check_digit(), Some(21..23));
        assert_eq!(france.subdivisions().len(), FRENCH_TERRITORIES.len());
    }
}
