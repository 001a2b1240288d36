use std::fmt;
use std::path::PathBuf;

use flashdeck_core::model::{Card, CardId, Deck, DeckId};
use flashdeck_core::Clock;
use storage::{Database, DocumentStore};

#[derive(Debug, Clone)]
struct Args {
    db_path: PathBuf,
    deck_id: Option<DeckId>,
    deck_name: String,
    cards: u32,
    force: bool,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDeckId { raw: String },
    InvalidCards { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDeckId { raw } => write!(f, "invalid --deck-id value: {raw}"),
            ArgsError::InvalidCards { raw } => write!(f, "invalid --cards value: {raw}"),
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
        let mut db_path = std::env::var("FLASHDECK_DB_PATH")
            .map_or_else(|_| PathBuf::from("flashcards.json"), PathBuf::from);
        let mut deck_id = None;
        let mut deck_name = "Drill".to_string();
        let mut cards = 10;
        let mut force = false;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => db_path = PathBuf::from(require_value(&mut args, "--db")?),
                "--deck-id" => {
                    let value = require_value(&mut args, "--deck-id")?;
                    let parsed = value
                        .parse::<DeckId>()
                        .map_err(|_| ArgsError::InvalidDeckId { raw: value.clone() })?;
                    deck_id = Some(parsed);
                }
                "--deck-name" => deck_name = require_value(&mut args, "--deck-name")?,
                "--cards" => {
                    let value = require_value(&mut args, "--cards")?;
                    cards = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidCards { raw: value.clone() })?;
                }
                "--force" => force = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_path,
            deck_id,
            deck_name,
            cards,
            force,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <path>          JSON document (default: flashcards.json)");
    eprintln!("  --deck-id <id>       Also add a generated drill deck with this id");
    eprintln!("  --deck-name <name>   Name of the generated deck (default: Drill)");
    eprintln!("  --cards <n>          Cards in the generated deck (default: 10)");
    eprintln!("  --force              Overwrite an existing document");
}

fn drill_deck(
    deck_id: DeckId,
    name: &str,
    cards: u32,
    db: &mut Database,
) -> Result<(), flashdeck_core::Error> {
    let now = Clock::default().now();
    let mut deck = Deck::new(deck_id.clone(), name, now)?;
    for n in 1..=cards {
        let card_id = CardId::new(format!("{deck_id}_card_{n}"));
        let card = Card::new(card_id.clone(), format!("{n} + {n}"), (n * 2).to_string(), now)?;
        deck.link_card(card_id.clone(), now);
        db.cards.insert(card_id, card);
    }
    db.decks.insert(deck_id, deck);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = match Args::parse() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            std::process::exit(2);
        }
    };

    if args.db_path.exists() && !args.force {
        eprintln!(
            "{} already exists; pass --force to overwrite",
            args.db_path.display()
        );
        std::process::exit(1);
    }

    let mut db = Database::seed();
    if let Some(deck_id) = args.deck_id.clone()
        && let Err(err) = drill_deck(deck_id, &args.deck_name, args.cards, &mut db)
    {
        eprintln!("could not build drill deck: {err}");
        std::process::exit(1);
    }

    let deck_count = db.decks.len();
    let card_count = db.cards.len();
    let store = DocumentStore::in_memory(db).with_path(&args.db_path);
    if let Err(err) = store.save().await {
        eprintln!("could not write {}: {err}", args.db_path.display());
        std::process::exit(1);
    }

    println!(
        "wrote {} ({deck_count} decks, {card_count} cards)",
        args.db_path.display()
    );
}
