//! flashquiz - browse and cache quiz and flashcard content
//!
//! A command-line front end over the content session: lists the inventory,
//! prints quizzes and flashcard decks, and manages the local cache.

use std::error::Error;
use std::process;

use chrono::{DateTime, Utc};
use clap::Parser;
use futures::future::join_all;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use flashquiz::cli::{Cli, Command, Config};
use flashquiz::data::Content;
use flashquiz::{ContentSession, LoadStatus};

type Result<T> = std::result::Result<T, Box<dyn Error>>;

/// Prints a non-fatal warning (stale data served)
fn print_warning(warning: Option<&str>) {
    if let Some(warning) = warning {
        eprintln!("warning: {}", warning);
    }
}

/// Loads the inventory or fails with the session's error message
async fn require_inventory(session: &mut ContentSession, refresh: bool) -> Result<()> {
    session.load_inventory(refresh).await;
    if session.status == LoadStatus::Error {
        let message = session.error.clone().unwrap_or_default();
        return Err(format!("Could not load inventory: {}", message).into());
    }
    print_warning(session.error.as_deref());
    Ok(())
}

fn print_inventory(session: &ContentSession) {
    for (game, items) in session.grouped_inventory() {
        println!("{}", game);
        for item in items {
            println!("  [{}] {}", item.kind, item.title);
        }
    }
}

fn print_content(content: &Content) {
    match content {
        Content::Quiz(questions) => {
            for (i, question) in questions.iter().enumerate() {
                println!("{}. {}", i + 1, question.question);
                if !question.hint.is_empty() {
                    println!("   hint: {}", question.hint);
                }
                let correct = question.correct_answer();
                for option in &question.answer_options {
                    let is_answer = correct.is_some_and(|c| std::ptr::eq(c, option));
                    let marker = if is_answer { '*' } else { '-' };
                    println!("   {} {}", marker, option.text);
                }
            }
        }
        Content::Flashcards(cards) => {
            for card in cards {
                println!("{} -> {}", card.front, card.back);
            }
        }
    }
}

async fn show(session: &mut ContentSession, game: &str, title: &str, refresh: bool) -> Result<()> {
    require_inventory(session, false).await?;

    let item = session
        .find_item_by_title(game, title)
        .cloned()
        .ok_or_else(|| format!("No item titled '{}' in game '{}'", title, game))?;

    session.select_game(game);
    session.load_content(&item, refresh).await;

    if session.content_status == LoadStatus::Error {
        let message = session.content_error.clone().unwrap_or_default();
        return Err(format!("Could not load '{}': {}", title, message).into());
    }
    print_warning(session.content_error.as_deref());

    if let Some(content) = &session.selected_content {
        print_content(content);
    }
    Ok(())
}

/// Fetches every content document concurrently so they are available offline
async fn prefetch(session: &mut ContentSession) -> Result<()> {
    require_inventory(session, false).await?;

    let fetcher = session.fetcher();
    let items = session.inventory();
    let results = join_all(items.iter().map(|item| fetcher.fetch_content(item, false))).await;

    let mut cached = 0;
    for (item, result) in items.iter().zip(&results) {
        match (&result.data, &result.error) {
            (Some(_), None) => cached += 1,
            (Some(_), Some(warning)) => {
                cached += 1;
                eprintln!("warning: {} / {}: {}", item.game, item.title, warning);
            }
            (None, error) => eprintln!(
                "failed: {} / {}: {}",
                item.game,
                item.title,
                error.as_deref().unwrap_or_default()
            ),
        }
    }

    println!("Cached {} of {} documents", cached, items.len());
    Ok(())
}

fn status(session: &ContentSession) -> Result<()> {
    let cache = session.fetcher().cache();

    let Some(timestamp) = cache.get_cache_timestamp() else {
        println!("No cached inventory");
        return Ok(());
    };

    let cached_at = DateTime::<Utc>::from_timestamp_millis(timestamp)
        .ok_or_else(|| format!("Invalid cache timestamp: {}", timestamp))?;
    let age = Utc::now().signed_duration_since(cached_at);
    let fresh = cache.get_inventory().is_some();

    println!(
        "Inventory cached {} ({}h{:02}m ago, {})",
        cached_at.format("%Y-%m-%d %H:%M:%S UTC"),
        age.num_hours(),
        age.num_minutes() % 60,
        if fresh { "fresh" } else { "expired" }
    );

    let documents = cache.load().map(|data| data.content.len()).unwrap_or(0);
    println!("{} content documents cached", documents);
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_cli(&cli)?;
    let mut session = config.build_session()?;

    match cli.command {
        Command::Inventory { refresh } => {
            require_inventory(&mut session, refresh).await?;
            print_inventory(&session);
        }
        Command::Show {
            game,
            title,
            refresh,
        } => show(&mut session, &game, &title, refresh).await?,
        Command::Prefetch => prefetch(&mut session).await?,
        Command::Status => status(&session)?,
        Command::Clear => {
            session.fetcher().clear_cache();
            println!("Cache cleared");
        }
        Command::Refresh => {
            session.refresh_all().await;
            if session.status == LoadStatus::Error {
                let message = session.error.clone().unwrap_or_default();
                return Err(format!("Could not load inventory: {}", message).into());
            }
            println!("Inventory refreshed: {} items", session.inventory().len());
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
