mod command;
mod input;
mod practice;
mod terminal;
mod view;

use std::fmt;
use std::path::PathBuf;

use flashdeck_core::model::{DeckId, PracticeSettings};
use services::{CardFilter, CardSortMode, SortOrder};
use storage::repository::Storage;
use tracing_subscriber::{EnvFilter, fmt as log_fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::practice::PracticeLoop;
use crate::terminal::PracticeTerminal;

const DEFAULT_DB_PATH: &str = "flashcards.json";
const DEFAULT_DECK_ID: &str = "deck_1";
const ENV_DB_PATH: &str = "FLASHDECK_DB_PATH";
const ENV_DECK_ID: &str = "FLASHDECK_DECK_ID";

#[derive(Debug, PartialEq, Eq)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDeckId { raw: String },
    InvalidDbPath { raw: String },
    InvalidSort { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDeckId { raw } => write!(f, "invalid --deck-id value: {raw}"),
            ArgsError::InvalidDbPath { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidSort { raw } => write!(f, "invalid --sort value: {raw}"),
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Practice,
    Decks,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "practice" => Some(Self::Practice),
            "decks" => Some(Self::Decks),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    db_path: PathBuf,
    deck_id: DeckId,
    filter: CardFilter,
    reverse: bool,
    shuffle: Option<bool>,
}

#[derive(Debug, PartialEq, Eq)]
enum Parsed {
    Run(Command, Args),
    Help,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  flashdeck practice [--db <path>] [--deck-id <id>] [--filter <text>] [--sort <mode>] [--desc] [--reverse] [--no-shuffle]"
    );
    eprintln!("  flashdeck decks    [--db <path>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_PATH}");
    eprintln!("  --deck-id {DEFAULT_DECK_ID}");
    eprintln!("  --sort default   (created, edited, front, back)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  {ENV_DB_PATH}, {ENV_DECK_ID}");
    eprintln!("  FLASHDECK_FEEDBACK_DELAY_MS, FLASHDECK_SKIP_DEBOUNCE_MS, FLASHDECK_SHUFFLE");
    eprintln!("  RUST_LOG (default: warn)");
}

impl Args {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Self {
        let db_path = lookup(ENV_DB_PATH)
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_DB_PATH), PathBuf::from);
        let deck_id = lookup(ENV_DECK_ID)
            .and_then(|value| value.parse::<DeckId>().ok())
            .unwrap_or_else(|| DeckId::new(DEFAULT_DECK_ID));

        Self {
            db_path,
            deck_id,
            filter: CardFilter::all(),
            reverse: false,
            shuffle: None,
        }
    }

    fn parse(
        argv: impl IntoIterator<Item = String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Parsed, ArgsError> {
        let mut argv = argv.into_iter().peekable();

        // Default behavior: practice when no subcommand is provided.
        let cmd = match argv.peek().map(String::as_str) {
            None => Command::Practice,
            Some("--help" | "-h") => return Ok(Parsed::Help),
            Some(first) if first.starts_with('-') => Command::Practice,
            Some(first) => {
                let cmd = Command::from_arg(first)
                    .ok_or_else(|| ArgsError::UnknownArg(first.to_string()))?;
                argv.next();
                cmd
            }
        };

        let mut args = Self::from_lookup(&lookup);
        let mut query = None;
        let mut sort = CardSortMode::Default;
        let mut order = SortOrder::Asc;

        while let Some(arg) = argv.next() {
            match (cmd, arg.as_str()) {
                (_, "--db") => {
                    let value = require_value(&mut argv, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbPath { raw: value });
                    }
                    args.db_path = PathBuf::from(value);
                }
                (Command::Practice, "--deck-id") => {
                    let value = require_value(&mut argv, "--deck-id")?;
                    args.deck_id = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidDeckId { raw: value.clone() })?;
                }
                (Command::Practice, "--filter") => {
                    query = Some(require_value(&mut argv, "--filter")?);
                }
                (Command::Practice, "--sort") => {
                    let value = require_value(&mut argv, "--sort")?;
                    sort = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidSort { raw: value.clone() })?;
                }
                (Command::Practice, "--desc") => order = SortOrder::Desc,
                (Command::Practice, "--reverse") => args.reverse = true,
                (Command::Practice, "--no-shuffle") => args.shuffle = Some(false),
                (_, "--help" | "-h") => return Ok(Parsed::Help),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let filter = CardFilter::all().with_sort(sort, order);
        args.filter = match query {
            Some(query) => filter.with_query(&query),
            None => filter,
        };
        Ok(Parsed::Run(cmd, args))
    }

    fn settings(&self, base: PracticeSettings) -> PracticeSettings {
        let settings = if self.reverse { base.reversed() } else { base };
        match self.shuffle {
            Some(shuffle) => settings.with_shuffle(shuffle),
            None => settings,
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // stdout belongs to the practice screen; redirect stderr to keep logs.
    tracing_subscriber::registry()
        .with(log_fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn list_decks(storage: &Storage) -> Result<(), Box<dyn std::error::Error>> {
    let decks = storage.decks.list_decks().await?;
    if decks.is_empty() {
        println!("No decks yet.");
        return Ok(());
    }
    for deck in decks {
        let pin = if deck.pinned() { "*" } else { " " };
        println!(
            "{pin} {:<12} {:<24} {} cards",
            deck.id().as_str(),
            deck.name(),
            deck.card_count()
        );
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let parsed = Args::parse(std::env::args().skip(1), |key| std::env::var(key).ok())
        .inspect_err(|e| {
            eprintln!("{e}");
            print_usage();
        })?;

    let (cmd, args) = match parsed {
        Parsed::Help => {
            print_usage();
            return Ok(());
        }
        Parsed::Run(cmd, args) => (cmd, args),
    };

    let settings = args.settings(PracticeSettings::from_env()?);
    tracing::debug!(db = %args.db_path.display(), ?cmd, "opening flashcard document");
    let storage = Storage::json_file(&args.db_path).await?;

    match cmd {
        Command::Decks => list_decks(&storage).await,
        Command::Practice => {
            let practice =
                PracticeLoop::open(storage, args.deck_id, args.filter, settings).await?;
            let mut terminal = PracticeTerminal::new()?;
            terminal.run(practice).await?;
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
