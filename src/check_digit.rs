//! ISO 7064 MOD 97-10 check digits.
//!
//! Shared by IBANs and SEPA creditor identifiers. The candidate string starts
//! with a two letter country code followed by the two check digits; the
//! remainder is the body the check digits protect.
//!
//! The computation moves the first four characters to the end, replaces
//! every letter by its base-36 value (`A` = 10 .. `Z` = 35) and takes the
//! resulting decimal number modulo 97. The number is never materialised: the
//! running total is folded modulo 97 whenever it exceeds nine digits.

use crate::error::{Error, Result};

const MODULUS: u64 = 97;
const MAX_TOTAL: u64 = 999_999_999;

/// Check digits that are never valid, whatever the body.
pub const RESERVED_CHECK_DIGITS: [&str; 3] = ["00", "01", "99"];

/// Calculate the check digits of `input`.
///
/// Characters 2 and 3 of `input` are the check digit placeholder; they are
/// ignored and treated as `"00"`.
///
/// # Errors
///
/// Returns [`Error::CheckDigitInput`] when `input` has 4 characters or fewer,
/// or contains a character other than an ASCII letter or digit.
///
/// # Examples
///
/// ```rust
/// use bankident::check_digit;
///
/// let digits = check_digit::calculate("FR0020041010050500013M02606")?;
/// assert_eq!(digits, "14");
/// assert!(check_digit::validate("FR1420041010050500013M02606"));
/// # Ok::<(), bankident::Error>(())
/// ```
pub fn calculate(input: &str) -> Result<String> {
    if input.len() <= 4 {
        return Err(Error::CheckDigitInput {
            input: input.to_string(),
            reason: "input must be longer than 4 characters".to_string(),
        });
    }
    if !input.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(Error::CheckDigitInput {
            input: input.to_string(),
            reason: "input must only contain ASCII letters and digits".to_string(),
        });
    }

    let remainder = remainder([&input[4..], &input[..2], "00"]).ok_or_else(|| {
        Error::CheckDigitInput {
            input: input.to_string(),
            reason: "input must only contain ASCII letters and digits".to_string(),
        }
    })?;
    Ok(format!("{:02}", 98 - remainder))
}

/// Whether the check digits of `candidate` are correct.
///
/// Never panics: malformed input is simply invalid.
pub fn validate(candidate: &str) -> bool {
    if candidate.len() <= 4 || !candidate.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return false;
    }

    let check_digits = &candidate[2..4];
    if !check_digits.bytes().all(|b| b.is_ascii_digit())
        || RESERVED_CHECK_DIGITS.contains(&check_digits)
    {
        return false;
    }

    remainder([&candidate[4..], &candidate[..4]]) == Some(1)
}

/// Remainder modulo 97 of the concatenated parts, each character replaced by
/// its base-36 value. `None` on a character outside `0-9A-Za-z`.
fn remainder<'a>(parts: impl IntoIterator<Item = &'a str>) -> Option<u64> {
    let mut total: u64 = 0;
    for c in parts.into_iter().flat_map(str::chars) {
        let value = u64::from(c.to_digit(36)?);
        total = if value < 10 {
            total * 10 + value
        } else {
            total * 100 + value
        };
        if total > MAX_TOTAL {
            total %= MODULUS;
        }
    }
    Some(total % MODULUS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const VALID: &[&str] = &[
        "FR1420041010050500013M02606",
        "GB29NWBK60161331926819",
        "DE89370400440532013000",
        "BE68539007547034",
        "NL91ABNA0417164300",
        "CH9300762011623852957",
    ];

    #[test]
    fn test_validate_known_identifiers() {
        for candidate in VALID {
            assert!(validate(candidate), "{candidate} should be valid");
        }
    }

    #[test]
    fn test_lowercase_letters_have_the_same_value() {
        assert!(validate("fr1420041010050500013m02606"));
    }

    #[test]
    fn test_calculate() {
        assert_eq!(calculate("FR0020041010050500013M02606").unwrap(), "14");
        assert_eq!(calculate("GB00NWBK60161331926819").unwrap(), "29");
        // the placeholder is ignored
        assert_eq!(calculate("DE42370400440532013000").unwrap(), "89");
        assert_eq!(calculate("FR00123456").unwrap(), "72");
    }

    #[test]
    fn test_calculate_then_validate() {
        for candidate in VALID {
            let digits = calculate(candidate).unwrap();
            let rebuilt = format!("{}{}{}", &candidate[..2], digits, &candidate[4..]);
            assert_eq!(&rebuilt, candidate);
            assert!(validate(&rebuilt));
        }
    }

    #[test]
    fn test_calculate_rejects_bad_input() {
        assert!(matches!(calculate("FR00"), Err(Error::CheckDigitInput { .. })));
        assert!(matches!(calculate(""), Err(Error::CheckDigitInput { .. })));
        assert!(matches!(calculate("FR00 1234"), Err(Error::CheckDigitInput { .. })));
        assert!(matches!(calculate("FR00ÉÉ"), Err(Error::CheckDigitInput { .. })));
    }

    #[test]
    fn test_reserved_check_digits_are_invalid() {
        // Each of these has a remainder of 1 but uses a reserved value:
        // 98 -> 01, 97 -> 00 and 02 -> 99 are congruent modulo 97.
        assert!(validate("DE98370400441000000008"));
        assert!(!validate("DE01370400441000000008"));
        assert!(validate("DE97370400441000000026"));
        assert!(!validate("DE00370400441000000026"));
        assert!(validate("DE02370400441000000087"));
        assert!(!validate("DE99370400441000000087"));
    }

    #[test]
    fn test_validate_never_panics_on_malformed_input() {
        for candidate in ["", "FR", "FR14", "FRAB1234", "FR14 2004", "FR14é", "ééééé"] {
            assert!(!validate(candidate));
        }
    }

    #[test]
    fn test_single_substitution_detection_rate() {
        let alphabet = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
        for candidate in VALID {
            let mut total = 0u32;
            let mut detected = 0u32;
            for position in 4..candidate.len() {
                for replacement in alphabet.chars() {
                    if candidate[position..].starts_with(replacement) {
                        continue;
                    }
                    let mut mutated = candidate.to_string();
                    mutated.replace_range(position..position + 1, &replacement.to_string());
                    total += 1;
                    if !validate(&mutated) {
                        detected += 1;
                    }
                }
            }
            let rate = f64::from(detected) / f64::from(total);
            assert!(rate >= 0.969, "{candidate}: detection rate {rate}");
        }
    }

    #[test]
    fn test_single_digit_substitution_is_always_detected() {
        let candidate = "DE89370400440532013000";
        for position in 4..candidate.len() {
            for replacement in '0'..='9' {
                if candidate[position..].starts_with(replacement) {
                    continue;
                }
                let mut mutated = candidate.to_string();
                mutated.replace_range(position..position + 1, &replacement.to_string());
                assert!(!validate(&mutated), "{mutated} should be invalid");
            }
        }
    }
}
