use std::fmt;

use chrono::{Duration, Local, NaiveDate};
use storage::SqliteCardStore;
use storage::repository::NewCardRecord;
use tick8_core::model::Stage;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    cards: u32,
    today: Option<NaiveDate>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidCards { raw: String },
    InvalidToday { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidCards { raw } => write!(f, "invalid --cards value: {raw}"),
            ArgsError::InvalidToday { raw } => {
                write!(f, "invalid --today value (expected YYYY-MM-DD): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("TICK8_DB_URL").unwrap_or_else(|_| "sqlite:cards.sqlite3?mode=rwc".into());
        let mut cards = std::env::var("TICK8_CARDS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(8);
        let mut today: Option<NaiveDate> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--cards" => {
                    let value = require_value(&mut args, "--cards")?;
                    cards = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidCards { raw: value.clone() })?;
                }
                "--today" => {
                    let value = require_value(&mut args, "--today")?;
                    let parsed = NaiveDate::parse_from_str(&value, "%Y-%m-%d")
                        .map_err(|_| ArgsError::InvalidToday { raw: value.clone() })?;
                    today = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url, cards, today })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:cards.sqlite3?mode=rwc)");
    eprintln!("  --cards <n>               Number of sample cards to insert (default: 8)");
    eprintln!("  --today <YYYY-MM-DD>      Fixed current day for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  TICK8_DB_URL, TICK8_CARDS");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let store = SqliteCardStore::connect(&args.db_url).await?;
    store.migrate().await?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    let samples = [
        ("Hallo", "Hello"),
        ("Danke", "Thank you"),
        ("Bitte", "Please / You are welcome"),
        ("Tschuss", "Bye"),
        ("Guten Morgen", "Good morning"),
    ];
    for i in 0..args.cards {
        let idx = (i as usize) % samples.len();
        let (front, back) = samples[idx];
        // mix new, lapsed and in-progress rows
        let record = match i % 3 {
            0 => NewCardRecord::new(front, back),
            1 => NewCardRecord::new(front, back).with_progress(
                today - Duration::days(1),
                Stage::UNLEARNED,
                i % 4,
            ),
            _ => NewCardRecord::new(front, back).with_progress(
                today - Duration::days(2),
                Stage::clamped(i64::from(i % 8)),
                0,
            ),
        };
        let id = store.insert_card(&record).await?;
        tracing::debug!(%id, front, "inserted card");
    }

    println!("Seeded {} cards into {}", args.cards, args.db_url);

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
