//! Fixed-width structural patterns.
//!
//! A pattern is written as a sequence of groups such as `4!n4!n12!c`: a
//! repetition count of one to three digits, the mandatory `!` exact-length
//! marker and a one-letter character class qualifier.
//!
//! | Qualifier | Class                                  |
//! |-----------|----------------------------------------|
//! | `n`       | digits (`0-9`)                         |
//! | `a`       | upper-case letters (`A-Z`)             |
//! | `c`       | mixed-case alphanumerics (`0-9A-Za-z`) |
//! | `e`       | space                                  |
//!
//! Matching is a single linear pass over the input with no backtracking.
//!
//! ```rust
//! use bankident::pattern::Pattern;
//!
//! let pattern = Pattern::compile("4!a6!n8!n")?;
//! assert_eq!(pattern.length(), 18);
//! assert!(pattern.matches("NWBK60161331926819"));
//! assert!(!pattern.matches("MIDLA0051539024150"));
//! # Ok::<(), bankident::Error>(())
//! ```

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use nom::{
    bytes::complete::take_while_m_n,
    character::complete::{char, satisfy},
    combinator::{all_consuming, opt},
    multi::many_m_n,
    sequence::tuple,
    IResult,
};

use crate::error::{Error, Result};

/// Maximum number of groups in a single expression.
pub const MAX_GROUPS: usize = 1000;

/// Maximum repetition count of a single group.
pub const MAX_GROUP_LENGTH: usize = 999;

/// Character class of a pattern group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterClass {
    /// `n`: digits.
    Digits,
    /// `a`: upper-case letters.
    UpperLetters,
    /// `c`: upper and lower-case letters and digits.
    MixedAlphanumeric,
    /// `e`: space.
    Space,
}

impl CharacterClass {
    /// All classes, in qualifier order `n`, `a`, `c`, `e`.
    pub const ALL: [CharacterClass; 4] = [
        CharacterClass::Digits,
        CharacterClass::UpperLetters,
        CharacterClass::MixedAlphanumeric,
        CharacterClass::Space,
    ];

    /// Look up the class for an expression qualifier.
    pub fn from_qualifier(qualifier: char) -> Option<Self> {
        match qualifier {
            'n' => Some(CharacterClass::Digits),
            'a' => Some(CharacterClass::UpperLetters),
            'c' => Some(CharacterClass::MixedAlphanumeric),
            'e' => Some(CharacterClass::Space),
            _ => None,
        }
    }

    /// Expression qualifier of this class.
    pub fn qualifier(self) -> char {
        match self {
            CharacterClass::Digits => 'n',
            CharacterClass::UpperLetters => 'a',
            CharacterClass::MixedAlphanumeric => 'c',
            CharacterClass::Space => 'e',
        }
    }

    /// Whether `c` belongs to this class.
    pub fn contains(self, c: char) -> bool {
        match self {
            CharacterClass::Digits => c.is_ascii_digit(),
            CharacterClass::UpperLetters => c.is_ascii_uppercase(),
            CharacterClass::MixedAlphanumeric => c.is_ascii_alphanumeric(),
            CharacterClass::Space => c == ' ',
        }
    }

    /// Every character accepted by this class.
    ///
    /// Used for generating random matching strings, never for validation.
    pub fn alphabet(self) -> &'static str {
        match self {
            CharacterClass::Digits => "0123456789",
            CharacterClass::UpperLetters => "ABCDEFGHIJKLMNOPQRSTUVWXYZ",
            CharacterClass::MixedAlphanumeric => {
                "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz"
            }
            CharacterClass::Space => " ",
        }
    }
}

/// A fixed-width run of characters of a single class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternGroup {
    class: CharacterClass,
    start: usize,
    length: usize,
}

impl PatternGroup {
    /// Character class of the group.
    pub fn class(&self) -> CharacterClass {
        self.class
    }

    /// Offset of the first character (inclusive).
    pub fn start(&self) -> usize {
        self.start
    }

    /// Number of characters in the group, at least 1.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Offset past the last character (exclusive).
    pub fn end(&self) -> usize {
        self.start + self.length
    }

    /// Span covered by the group.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }

    fn matches(&self, bytes: &[u8]) -> bool {
        bytes[self.range()]
            .iter()
            .all(|&b| self.class.contains(char::from(b)))
    }
}

/// A compiled structural pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    expression: String,
    groups: Vec<PatternGroup>,
    // Adjacent groups of the same class merged together; used for matching.
    runs: Vec<PatternGroup>,
    length: usize,
}

impl Pattern {
    /// Compile a pattern expression.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PatternSyntax`] when the expression is not a sequence
    /// of 1 to 1000 `<count>!<qualifier>` groups, when a group omits the `!`
    /// marker, has a zero count or uses an unknown qualifier.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bankident::pattern::Pattern;
    ///
    /// let pattern = Pattern::compile("4!n4!n12!c")?;
    /// assert_eq!(pattern.groups().len(), 3);
    /// assert_eq!(pattern.length(), 20);
    /// # Ok::<(), bankident::Error>(())
    /// ```
    pub fn compile(expression: &str) -> Result<Self> {
        let tokens = match all_consuming(tokens)(expression) {
            Ok((_, tokens)) => tokens,
            Err(_) => {
                return Err(syntax_error(
                    expression,
                    format!("expected 1 to {MAX_GROUPS} groups of the form <count>!<qualifier>"),
                ))
            }
        };

        let mut groups: Vec<PatternGroup> = Vec::with_capacity(tokens.len());
        let mut runs: Vec<PatternGroup> = Vec::with_capacity(tokens.len());
        let mut offset = 0;

        for token in tokens {
            if !token.exact {
                return Err(syntax_error(
                    expression,
                    format!(
                        "variable length group '{}{}' is not supported",
                        token.count, token.qualifier
                    ),
                ));
            }
            let length: usize = token.count.parse().map_err(|_| {
                syntax_error(expression, format!("invalid group count '{}'", token.count))
            })?;
            if length == 0 {
                return Err(syntax_error(expression, "group count must be at least 1"));
            }
            let class = CharacterClass::from_qualifier(token.qualifier).ok_or_else(|| {
                syntax_error(expression, format!("unknown qualifier '{}'", token.qualifier))
            })?;

            let group = PatternGroup {
                class,
                start: offset,
                length,
            };
            groups.push(group);
            match runs.last_mut() {
                Some(last) if last.class == class => last.length += length,
                _ => runs.push(group),
            }
            offset += length;
        }

        Ok(Pattern {
            expression: expression.to_string(),
            groups,
            runs,
            length: offset,
        })
    }

    /// Whether `s` has exactly [`length`](Self::length) characters and each
    /// group's span holds only characters of the group's class.
    pub fn matches(&self, s: &str) -> bool {
        let bytes = s.as_bytes();
        bytes.len() == self.length && self.runs.iter().all(|run| run.matches(bytes))
    }

    /// Source expression.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Groups in expression order, as written.
    pub fn groups(&self) -> &[PatternGroup] {
        &self.groups
    }

    /// Total number of characters a matching string has.
    pub fn length(&self) -> usize {
        self.length
    }
}

impl FromStr for Pattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Pattern::compile(s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

fn syntax_error(expression: &str, reason: impl Into<String>) -> Error {
    Error::PatternSyntax {
        expression: expression.to_string(),
        reason: reason.into(),
    }
}

// ============================================================================
// Expression grammar: (\d{1,3}!?[a-zA-Z]){1,1000}
// ============================================================================

struct Token<'a> {
    count: &'a str,
    exact: bool,
    qualifier: char,
}

fn token(input: &str) -> IResult<&str, Token<'_>> {
    let (input, (count, exact, qualifier)) = tuple((
        take_while_m_n(1, 3, |c: char| c.is_ascii_digit()),
        opt(char('!')),
        satisfy(|c| c.is_ascii_alphabetic()),
    ))(input)?;
    Ok((
        input,
        Token {
            count,
            exact: exact.is_some(),
            qualifier,
        },
    ))
}

fn tokens(input: &str) -> IResult<&str, Vec<Token<'_>>> {
    many_m_n(1, MAX_GROUPS, token)(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn lengths(pattern: &Pattern) -> Vec<usize> {
        pattern.groups().iter().map(PatternGroup::length).collect()
    }

    #[test]
    fn test_compile_groups() {
        let pattern = Pattern::compile("4!n4!n12!c").unwrap();
        assert_eq!(lengths(&pattern), vec![4, 4, 12]);
        assert_eq!(pattern.length(), 20);
        assert_eq!(pattern.groups()[1].start(), 4);
        assert_eq!(pattern.groups()[2].range(), 8..20);
        assert_eq!(pattern.groups()[2].class(), CharacterClass::MixedAlphanumeric);
        assert_eq!(pattern.expression(), "4!n4!n12!c");
    }

    #[test]
    fn test_adjacent_groups_are_merged_for_matching() {
        let pattern = Pattern::compile("4!n4!n12!c").unwrap();
        assert_eq!(pattern.runs.len(), 2);
        assert_eq!(pattern.runs[0].length(), 8);
        assert_eq!(pattern.runs[1].start(), 8);
    }

    #[test]
    fn test_matches() {
        let pattern = Pattern::compile("4!n4!n12!c").unwrap();
        assert!(pattern.matches("00010030200359100100"));
        assert!(pattern.matches("12345678abcdEFGH1234"));
        assert!(!pattern.matches("1234567abcdEFGH1234"));
        assert!(!pattern.matches("12345678abcdEFGH12345"));
        assert!(!pattern.matches("123A5678abcdEFGH1234"));
        assert!(!pattern.matches("1234567Xabcdefgh1234"));
        assert!(!pattern.matches("12345678abcd-FGH1234"));
        assert!(!pattern.matches(""));
    }

    #[test]
    fn test_character_classes() {
        let pattern = Pattern::compile("2!a1!e2!n").unwrap();
        assert!(pattern.matches("AB 12"));
        assert!(!pattern.matches("ab 12"));
        assert!(!pattern.matches("AB_12"));
        assert!(!pattern.matches("ABé12"));
    }

    #[test]
    fn test_non_ascii_input_never_matches() {
        let pattern = Pattern::compile("2!c").unwrap();
        assert!(!pattern.matches("é"));
        assert!(!pattern.matches("ü"));
    }

    #[test]
    fn test_qualifier_round_trip() {
        for class in CharacterClass::ALL {
            assert_eq!(CharacterClass::from_qualifier(class.qualifier()), Some(class));
            assert!(class.alphabet().chars().all(|c| class.contains(c)));
        }
        assert_eq!(CharacterClass::from_qualifier('x'), None);
    }

    #[test]
    fn test_syntax_errors() {
        for expression in ["", "4n", "!4n", "4!", "4!n ", "1234!n", "0!n", "4!x", "4!n-2!a", "n"] {
            match Pattern::compile(expression) {
                Err(Error::PatternSyntax { expression: e, .. }) => assert_eq!(e, expression),
                other => panic!("expected syntax error for {expression:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_variable_length_group_is_rejected() {
        let err = Pattern::compile("4!n12c").unwrap_err();
        assert!(err.to_string().contains("variable length group '12c'"));
    }

    #[test]
    fn test_group_count_limit() {
        assert!(Pattern::compile(&"1!n".repeat(MAX_GROUPS)).is_ok());
        assert!(Pattern::compile(&"1!n".repeat(MAX_GROUPS + 1)).is_err());
        assert_eq!(Pattern::compile("999!c").unwrap().length(), MAX_GROUP_LENGTH);
    }

    #[test]
    fn test_display_and_from_str() {
        let pattern: Pattern = "5!n5!n11!c2!n".parse().unwrap();
        assert_eq!(pattern.to_string(), "5!n5!n11!c2!n");
        assert_eq!(pattern.length(), 23);
    }

    fn class_string(class: CharacterClass, length: usize) -> impl Strategy<Value = String> {
        let alphabet: Vec<char> = class.alphabet().chars().collect();
        proptest::collection::vec(proptest::sample::select(alphabet), length)
            .prop_map(|chars| chars.into_iter().collect::<String>())
    }

    proptest! {
        #[test]
        fn generated_strings_match(a in class_string(CharacterClass::UpperLetters, 4),
                                   n in class_string(CharacterClass::Digits, 6),
                                   c in class_string(CharacterClass::MixedAlphanumeric, 8)) {
            let pattern = Pattern::compile("4!a6!n8!c").unwrap();
            let candidate = format!("{a}{n}{c}");
            prop_assert!(pattern.matches(&candidate));
        }

        #[test]
        fn wrong_class_character_fails(n in class_string(CharacterClass::Digits, 10),
                                       position in 0usize..10,
                                       letter in class_string(CharacterClass::UpperLetters, 1)) {
            let pattern = Pattern::compile("3!n7!n").unwrap();
            let mut candidate = n;
            candidate.replace_range(position..position + 1, &letter);
            prop_assert!(!pattern.matches(&candidate));
        }
    }
}
