use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use flashcard_core::{CardDraft, SessionEnd};
use flashcards_cli::commands::{self, card::resolve_card_id, DEFAULT_EXPORT_FILE};
use flashcards_cli::config::Config;
use flashcards_cli::db::SqliteRepository;
use flashcards_cli::display::Painter;
use flashcards_cli::generate::{GeminiClient, DEFAULT_CARDS};
use flashcards_cli::state::AppState;
use flashcards_cli::study::{Prompt, StudyLoop};
use std::io::{BufRead, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "flashcards", version, about, long_about = None)]
struct Cli {
    /// Database file (overrides FLASHCARDS_DB)
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Log progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Card content given on the command line. Missing front/back are asked for.
#[derive(clap::Args, Debug)]
struct CardArgs {
    #[arg(long)]
    front: Option<String>,

    #[arg(long)]
    back: Option<String>,

    #[arg(long)]
    explanation: Option<String>,

    /// Mark the card as a coding exercise (`--coding false` to unmark)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    coding: Option<bool>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List decks, newest first
    List,
    /// Print every card of a deck
    Show { deck: String },
    /// Create a deck with its first card
    Create {
        title: String,
        #[command(flatten)]
        card: CardArgs,
    },
    /// Append a card to a deck
    Add {
        deck: String,
        #[command(flatten)]
        card: CardArgs,
    },
    /// Generate cards for a topic with Gemini
    Generate {
        topic: String,
        #[arg(short = 'n', long, default_value_t = DEFAULT_CARDS)]
        count: u32,
        /// Append to this deck instead of creating one
        #[arg(long)]
        deck: Option<String>,
    },
    /// Rename a deck
    Rename { deck: String, title: String },
    /// Delete a deck and its cards
    Delete {
        deck: String,
        #[arg(short, long)]
        yes: bool,
    },
    /// Replace a card's content
    EditCard {
        deck: String,
        card: String,
        #[command(flatten)]
        fields: CardArgs,
    },
    /// Delete one card
    DeleteCard {
        deck: String,
        card: String,
        #[arg(short, long)]
        yes: bool,
    },
    /// Study a deck interactively
    Study { deck: String },
    /// Write all decks to a JSON file
    Export {
        #[arg(default_value = DEFAULT_EXPORT_FILE)]
        path: PathBuf,
    },
    /// Add decks from a JSON export in front of the existing ones
    Import {
        path: PathBuf,
        #[arg(short, long)]
        yes: bool,
    },
    /// Render card markdown from a file (or stdin)
    Preview { file: Option<PathBuf> },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    flashcards_cli::init_tracing(cli.verbose);

    let painter = Painter::detect();
    let config = Config::from_env().with_db_path(cli.db);

    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let repository = SqliteRepository::open(&config.db_path)
        .with_context(|| format!("failed to open database at {}", config.db_path.display()))?;
    tracing::debug!(path = %config.db_path.display(), "database opened");
    let state = AppState::load(repository)?;
    let mut prompt = Prompt::stdio();

    match cli.command {
        Command::List => {
            let decks = commands::list_decks(&state)?;
            if decks.is_empty() {
                println!("No decks yet. Create one with `flashcards create` or `flashcards generate`.");
            }
            for (i, deck) in decks.iter().enumerate() {
                println!(
                    "{:>3}. {}  {}",
                    i + 1,
                    painter.bold(&deck.title),
                    painter.dim(&format!("{} cards  {}", deck.card_count, deck.id))
                );
            }
        }
        Command::Show { deck } => {
            let deck = commands::get_deck(&state, &deck)?;
            println!("{}  {}", painter.bold(&deck.title), painter.dim(&deck.id));
            for (i, card) in deck.cards.iter().enumerate() {
                println!();
                let tag = if card.is_coding { " [code]" } else { "" };
                println!("{}", painter.accent(&format!("{}.{tag} {}", i + 1, card.id)));
                for line in painter.markdown(&card.front) {
                    println!("  {line}");
                }
                println!("  {}", painter.dim("──"));
                for line in painter.markdown(&card.back) {
                    println!("  {line}");
                }
            }
        }
        Command::Create { title, card } => {
            let draft = read_draft(&mut prompt, card)?;
            let deck = commands::create_deck(&state, &title, draft)?;
            println!("Created deck \"{}\" ({})", deck.title, deck.id);
        }
        Command::Add { deck, card } => {
            let draft = read_draft(&mut prompt, card)?;
            let deck = commands::add_card(&state, &deck, draft)?;
            println!("\"{}\" now has {} cards", deck.title, deck.card_count);
        }
        Command::Generate { topic, count, deck } => {
            let client = GeminiClient::new(&config);
            eprintln!("Generating {count} cards for \"{topic}\"...");
            let deck = commands::generate_cards(&state, &client, &topic, count, deck.as_deref())
                .await?;
            println!("\"{}\" now has {} cards ({})", deck.title, deck.card_count, deck.id);
        }
        Command::Rename { deck, title } => {
            let deck = commands::rename_deck(&state, &deck, &title)?;
            println!("Renamed to \"{}\"", deck.title);
        }
        Command::Delete { deck, yes } => {
            let target = commands::get_deck(&state, &deck)?;
            let question = format!(
                "Delete \"{}\" and its {} cards?",
                target.title,
                target.cards.len()
            );
            if yes || prompt.confirm(&question)? {
                commands::delete_deck(&state, &target.id)?;
                println!("Deleted \"{}\"", target.title);
            }
        }
        Command::EditCard { deck, card, fields } => {
            let target = commands::get_deck(&state, &deck)?;
            let card_id = resolve_card_id(&target, &card)?;
            let current = target
                .card(&card_id)
                .map(|c| c.to_draft())
                .unwrap_or_default();
            let draft = edit_draft(&mut prompt, current, fields)?;
            commands::update_card(&state, &target.id, &card_id, draft)?;
            println!("Card updated.");
        }
        Command::DeleteCard { deck, card, yes } => {
            let target = commands::get_deck(&state, &deck)?;
            let card_id = resolve_card_id(&target, &card)?;
            if yes || prompt.confirm("Delete this card?")? {
                commands::delete_card(&state, &target.id, &card_id)?;
                println!("Card deleted.");
            }
        }
        Command::Study { deck } => {
            let session = commands::start_study(&state, &deck)?;
            let title = commands::get_deck(&state, session.deck_id())?.title;
            let end = StudyLoop::new(&state, &mut prompt, painter, title).run(session)?;
            tracing::info!(?end, "study session ended");
            if end == SessionEnd::DeckEmptied {
                println!("Deck is empty; add cards before studying again.");
            }
        }
        Command::Export { path } => {
            let count = commands::export_library(&state, &path)?;
            println!("Exported {count} decks to {}", path.display());
        }
        Command::Import { path, yes } => {
            let batch = commands::read_import(&path)?;
            if batch.decks.is_empty() {
                bail!("{} contains no valid decks", path.display());
            }
            let mut question = format!("Import {} decks", batch.decks.len());
            if batch.skipped > 0 {
                question.push_str(&format!(" ({} invalid entries skipped)", batch.skipped));
            }
            question.push('?');
            if yes || prompt.confirm(&question)? {
                let report = commands::import_batch(&state, batch)?;
                println!("Imported {} decks", report.imported);
            }
        }
        Command::Preview { file } => preview(&mut prompt, file.as_ref(), painter)?,
    }

    Ok(())
}

fn read_draft<R: BufRead, W: Write>(prompt: &mut Prompt<R, W>, args: CardArgs) -> Result<CardDraft> {
    let front = match args.front {
        Some(front) => front,
        None => prompt.ask_multiline("Front")?,
    };
    let back = match args.back {
        Some(back) => back,
        None => prompt.ask_multiline("Back")?,
    };
    Ok(CardDraft {
        front,
        back,
        explanation: args.explanation.unwrap_or_default(),
        is_coding: args.coding.unwrap_or(false),
    })
}

/// Flags replace fields directly; with no flags every field is edited in turn.
fn edit_draft<R: BufRead, W: Write>(
    prompt: &mut Prompt<R, W>,
    current: CardDraft,
    args: CardArgs,
) -> Result<CardDraft> {
    let any_flag = args.front.is_some()
        || args.back.is_some()
        || args.explanation.is_some()
        || args.coding.is_some();

    if any_flag {
        return Ok(CardDraft {
            front: args.front.unwrap_or(current.front),
            back: args.back.unwrap_or(current.back),
            explanation: args.explanation.unwrap_or(current.explanation),
            is_coding: args.coding.unwrap_or(current.is_coding),
        });
    }

    Ok(prompt.edit_card(current)?)
}

fn preview<R: BufRead, W: Write>(
    prompt: &mut Prompt<R, W>,
    file: Option<&PathBuf>,
    painter: Painter,
) -> Result<()> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut lines = Vec::new();
            while let Some(line) = prompt.read_line()? {
                lines.push(line);
            }
            lines.join("\n")
        }
    };
    for line in painter.markdown(&text) {
        println!("{line}");
    }
    Ok(())
}
