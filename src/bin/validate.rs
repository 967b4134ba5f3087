//! Bank identifier validator - CLI tool writing a CSV validation report.

use bankident::batch::{self, ValidationRecord};
use bankident::{logging, IdentifierKind, Result};
use clap::{ArgAction, Parser};
use std::fs::File;
use std::io::{self, BufReader, Write};
use tracing::info;

#[derive(Parser)]
#[command(name = "bankident_validate")]
#[command(about = "Validate IBANs, BICs and SEPA creditor identifiers", long_about = None)]
struct Cli {
    /// Identifiers to validate (read one per line from the input if none given)
    ids: Vec<String>,

    /// Identifier kind (iban, bic, ci)
    #[arg(short, long, default_value = "iban")]
    kind: String,

    /// Input file path (or stdin if not provided)
    #[arg(short, long)]
    input: Option<String>,

    /// Output file path (or stdout if not provided)
    #[arg(short, long)]
    output: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Returns whether every identifier was valid.
fn run() -> Result<bool> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let kind = cli.kind.parse::<IdentifierKind>()?;

    let mut records: Vec<ValidationRecord> = cli
        .ids
        .iter()
        .map(|id| batch::validate_one(kind, id))
        .collect();

    if let Some(ref input_path) = cli.input {
        let file = File::open(input_path)?;
        records.extend(batch::validate_lines(BufReader::new(file), kind)?);
    } else if cli.ids.is_empty() {
        records.extend(batch::validate_lines(io::stdin().lock(), kind)?);
    }

    let invalid = records.iter().filter(|record| !record.valid).count();
    info!(%kind, total = records.len(), invalid, "validation finished");

    if let Some(ref output_path) = cli.output {
        let mut file = File::create(output_path)?;
        batch::write_report(&mut file, &records)?;
    } else {
        let mut stdout = io::stdout();
        batch::write_report(&mut stdout, &records)?;
        stdout.flush()?;
    }

    Ok(invalid == 0)
}
