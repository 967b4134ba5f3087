//! Bank identifier generator - CLI tool printing random valid identifiers.

use bankident::random::Generator;
use bankident::{logging, Country, Error, IdentifierKind, Result};
use clap::{ArgAction, Parser};
use rand::Rng;
use std::io::{self, Write};
use tracing::debug;

#[derive(Parser)]
#[command(name = "bankident_generate")]
#[command(about = "Generate random valid IBANs, BICs and SEPA creditor identifiers", long_about = None)]
struct Cli {
    /// Identifier kind (iban, bic, ci)
    #[arg(short, long, default_value = "iban")]
    kind: String,

    /// ISO 3166-1 alpha-2 country code (random supported country if not provided)
    #[arg(short, long)]
    country: Option<String>,

    /// Number of identifiers to generate
    #[arg(short = 'n', long, default_value_t = 1)]
    count: usize,

    /// Seed for reproducible output
    #[arg(short, long)]
    seed: Option<u64>,

    /// Print IBANs in groups of four characters
    #[arg(short, long)]
    printable: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let kind = cli.kind.parse::<IdentifierKind>()?;
    let country = match cli.country {
        Some(ref code) => Some(parse_country(kind, code)?),
        None => None,
    };

    let mut stdout = io::stdout().lock();
    match cli.seed {
        Some(seed) => {
            debug!(seed, "using seeded generator");
            let mut generator = Generator::seeded(seed);
            generate(&mut generator, &cli, kind, country, &mut stdout)?;
        }
        None => {
            let mut generator = Generator::new();
            generate(&mut generator, &cli, kind, country, &mut stdout)?;
        }
    }
    stdout.flush()?;

    Ok(())
}

fn parse_country(kind: IdentifierKind, code: &str) -> Result<Country> {
    Country::from_alpha2(code).ok_or_else(|| Error::UnknownCountry {
        kind,
        input: code.to_string(),
        code: code.to_string(),
    })
}

fn generate<R: Rng, W: Write>(
    generator: &mut Generator<R>,
    cli: &Cli,
    kind: IdentifierKind,
    country: Option<Country>,
    writer: &mut W,
) -> Result<()> {
    for _ in 0..cli.count {
        let line = match (kind, country) {
            (IdentifierKind::Iban, Some(country)) => render_iban(generator.iban_for(country)?, cli),
            (IdentifierKind::Iban, None) => render_iban(generator.iban()?, cli),
            (IdentifierKind::Bic, Some(country)) => generator.bic_for(country)?.to_string(),
            (IdentifierKind::Bic, None) => generator.bic()?.to_string(),
            (IdentifierKind::CreditorIdentifier, Some(country)) => {
                generator.creditor_identifier_for(country)?.to_string()
            }
            (IdentifierKind::CreditorIdentifier, None) => {
                generator.creditor_identifier()?.to_string()
            }
        };
        writeln!(writer, "{}", line)?;
    }
    Ok(())
}

fn render_iban(iban: bankident::Iban, cli: &Cli) -> String {
    if cli.printable {
        iban.to_printable_string()
    } else {
        iban.to_string()
    }
}
