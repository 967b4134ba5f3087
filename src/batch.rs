//! Batch validation with CSV reports.
//!
//! Identifiers are read one per line; blank lines are skipped. Each line
//! yields a [`ValidationRecord`] and records are written as CSV with the
//! header `input,kind,valid,normalized,error`.

use std::io::{BufRead, Write};

use csv::Writer;
use serde::Serialize;
use tracing::debug;

use crate::bic::Bic;
use crate::creditor::CreditorIdentifier;
use crate::error::Result;
use crate::iban::Iban;
use crate::IdentifierKind;

/// Outcome of validating a single identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationRecord {
    /// Identifier as read, untrimmed.
    pub input: String,

    /// Kind the input was validated as.
    pub kind: IdentifierKind,

    /// Whether the input is valid.
    pub valid: bool,

    /// Normalised form of a valid input.
    pub normalized: Option<String>,

    /// Reason a rejected input is invalid.
    pub error: Option<String>,
}

/// Validate `input` as an identifier of the given kind.
///
/// # Examples
///
/// ```rust
/// use bankident::{batch, IdentifierKind};
///
/// let record = batch::validate_one(IdentifierKind::Bic, "deutdeff");
/// assert!(record.valid);
/// assert_eq!(record.normalized.as_deref(), Some("DEUTDEFFXXX"));
/// ```
pub fn validate_one(kind: IdentifierKind, input: &str) -> ValidationRecord {
    let outcome = match kind {
        IdentifierKind::Iban => input.parse::<Iban>().map(|iban| iban.to_string()),
        IdentifierKind::Bic => input.parse::<Bic>().map(|bic| bic.to_string()),
        IdentifierKind::CreditorIdentifier => {
            input.parse::<CreditorIdentifier>().map(|ci| ci.to_string())
        }
    };

    match outcome {
        Ok(normalized) => ValidationRecord {
            input: input.to_string(),
            kind,
            valid: true,
            normalized: Some(normalized),
            error: None,
        },
        Err(err) => {
            debug!(%kind, error = %err, "rejected identifier");
            ValidationRecord {
                input: input.to_string(),
                kind,
                valid: false,
                normalized: None,
                error: Some(err.to_string()),
            }
        }
    }
}

/// Validate every non-blank line of `reader`.
///
/// # Errors
///
/// Returns an I/O error if reading fails.
pub fn validate_lines<R: BufRead>(reader: R, kind: IdentifierKind) -> Result<Vec<ValidationRecord>> {
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(validate_one(kind, &line));
    }
    Ok(records)
}

/// Write `records` as CSV to any destination implementing `Write`.
///
/// # Errors
///
/// Returns an error if serialisation or writing fails.
pub fn write_report<W: Write>(writer: &mut W, records: &[ValidationRecord]) -> Result<()> {
    let mut csv_writer = Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    #[test]
    fn test_validate_one() {
        let record = validate_one(IdentifierKind::Iban, "fr1420041010050500013m02606");
        assert!(record.valid);
        assert_eq!(record.normalized.as_deref(), Some("FR1420041010050500013M02606"));
        assert_eq!(record.error, None);

        let record = validate_one(IdentifierKind::Iban, "GB72MIDLA0051539024150");
        assert!(!record.valid);
        assert_eq!(record.normalized, None);
        assert!(record.error.unwrap().contains("expected structure"));
    }

    #[test]
    fn test_validate_lines_skips_blank_lines() {
        let input = "FR72ZZZ123456\n\n   \nFR73ZZZ123456\n";
        let records = validate_lines(Cursor::new(input), IdentifierKind::CreditorIdentifier).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].valid);
        assert!(!records[1].valid);
    }

    #[test]
    fn test_write_report() {
        let records = vec![
            validate_one(IdentifierKind::Bic, "psstfrpp"),
            validate_one(IdentifierKind::Bic, "PSSTZZPP"),
        ];
        let mut output = Vec::new();
        write_report(&mut output, &records).unwrap();
        let report = String::from_utf8(output).unwrap();
        assert_eq!(
            report,
            "input,kind,valid,normalized,error\n\
             psstfrpp,bic,true,PSSTFRPPXXX,\n\
             PSSTZZPP,bic,false,,'PSSTZZPP' is not a valid BIC: unknown country code 'ZZ'\n"
        );
    }
}
