//! notekeep CLI - inspect and maintain a notes database

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use notekeep_core::{ButtonLink, Config, Database};

#[derive(Debug, Parser)]
#[command(
    name = "notekeep",
    author,
    version,
    about = "Chat-scoped notes with inline buttons",
    propagate_version = true
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Save a note, replacing any note with the same name
    Set {
        /// Chat ID
        #[arg(allow_hyphen_values = true)]
        chat: String,

        /// Note name
        name: String,

        /// Note text
        value: String,

        /// Send the note as a reply
        #[arg(long)]
        reply: bool,

        /// Attach a button, as LABEL=URL (repeatable)
        #[arg(long = "button", value_parser = parse_button)]
        buttons: Vec<ButtonLink>,
    },

    /// Show a note and its buttons
    Get {
        /// Chat ID
        #[arg(allow_hyphen_values = true)]
        chat: String,

        /// Note name
        name: String,
    },

    /// Remove a note and its buttons
    Rm {
        /// Chat ID
        #[arg(allow_hyphen_values = true)]
        chat: String,

        /// Note name
        name: String,
    },

    /// List notes in a chat
    List {
        /// Chat ID
        #[arg(allow_hyphen_values = true)]
        chat: String,
    },

    /// Move all notes of a chat to a new chat ID
    Migrate {
        /// Current chat ID
        #[arg(allow_hyphen_values = true)]
        old: String,

        /// New chat ID
        #[arg(allow_hyphen_values = true)]
        new: String,
    },

    /// Show database statistics
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = match cli.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    // Load config
    let config_path = cli.config.unwrap_or_else(Config::default_config_path);
    let config = Config::ensure_at(&config_path)?;

    // Open database
    let db = Database::open(&config.database, &config.pool).await?;

    let result = match cli.command {
        Command::Set {
            chat,
            name,
            value,
            reply,
            buttons,
        } => cmd_set(&db, &chat, &name, &value, reply, &buttons).await,
        Command::Get { chat, name } => cmd_get(&db, &chat, &name).await,
        Command::Rm { chat, name } => cmd_rm(&db, &chat, &name).await,
        Command::List { chat } => cmd_list(&db, &chat).await,
        Command::Migrate { old, new } => cmd_migrate(&db, &old, &new).await,
        Command::Stats => cmd_stats(&db).await,
    };

    db.close().await;
    result
}

fn parse_button(raw: &str) -> Result<ButtonLink, String> {
    let (label, url) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected LABEL=URL, got '{raw}'"))?;
    if label.is_empty() || url.is_empty() {
        return Err(format!("expected LABEL=URL, got '{raw}'"));
    }
    Ok(ButtonLink::new(label, url))
}

async fn cmd_set(
    db: &Database,
    chat: &str,
    name: &str,
    value: &str,
    reply: bool,
    buttons: &[ButtonLink],
) -> Result<()> {
    db.notes()
        .upsert_note(chat, name, value, reply, buttons)
        .await?;
    println!("Saved note '{}' in {} ({} buttons)", name, chat, buttons.len());
    Ok(())
}

async fn cmd_get(db: &Database, chat: &str, name: &str) -> Result<()> {
    let note = db
        .notes()
        .get_note(chat, name)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Note not found"))?;

    println!("Name:  {}", note.name);
    println!("Reply: {}", if note.is_reply { "yes" } else { "no" });
    println!();
    println!("{}", note.value);

    if note.has_buttons {
        println!();
        for button in db.buttons().list_buttons(chat, name).await? {
            println!("[{}] {}", button.name, button.url);
        }
    }

    Ok(())
}

async fn cmd_rm(db: &Database, chat: &str, name: &str) -> Result<()> {
    if db.notes().remove_note(chat, name).await? {
        println!("Removed note: {}", name);
    } else {
        println!("No note named '{}' in {}", name, chat);
    }
    Ok(())
}

async fn cmd_list(db: &Database, chat: &str) -> Result<()> {
    let notes = db.notes().list_notes(chat).await?;

    if notes.is_empty() {
        println!("No notes in {}.", chat);
        return Ok(());
    }

    for note in notes {
        let mut flags = Vec::new();
        if note.is_reply {
            flags.push("reply");
        }
        if note.has_buttons {
            flags.push("buttons");
        }
        if flags.is_empty() {
            println!("{} | {}", note.name, truncate(&note.value, 60));
        } else {
            println!(
                "{} [{}] | {}",
                note.name,
                flags.join(", "),
                truncate(&note.value, 60)
            );
        }
    }

    Ok(())
}

async fn cmd_migrate(db: &Database, old: &str, new: &str) -> Result<()> {
    let moved = db.notes().migrate_chat(old, new).await?;
    println!(
        "Migrated {} notes and {} buttons from {} to {}",
        moved.notes, moved.buttons, old, new
    );
    Ok(())
}

async fn cmd_stats(db: &Database) -> Result<()> {
    let stats = db.notes().stats().await?;

    println!("Database Statistics");
    println!("-------------------");
    println!("Notes: {}", stats.notes);
    println!("Chats: {}", stats.chats);

    Ok(())
}

fn truncate(s: &str, max_chars: usize) -> String {
    let s = s.replace('\n', " ");
    if s.chars().count() <= max_chars {
        s
    } else {
        let head: String = s.chars().take(max_chars).collect();
        format!("{head}...")
    }
}
