//! Arena Date terminal front end
//!
//! `arena-date [CARD_NAME]` dates the named card, or the first card in the
//! catalog. The player profile comes from `ARENA_DATE_USER_NAME`,
//! `ARENA_DATE_USER_BIO` and `ARENA_DATE_USER_PHOTO`; a missing bio is
//! asked for on stdin.

use arena_date::config::{self, LlmConfig, SessionConfig};
use arena_date::session::{join_task, SessionSnapshot};
use arena_date::{
    AnthropicService, Catalog, ConversationSession, LoggingClient, ReferenceImage, SessionError,
    SessionHandle, SessionState, UserProfile,
};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they don't interleave with the chat
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arena_date=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let llm_config = LlmConfig::from_env()?;
    let session_config = SessionConfig::from_env()?;

    let catalog_path = config::catalog_path();
    let catalog = Catalog::load(&catalog_path).await?;
    let card = match std::env::args().nth(1) {
        Some(name) => catalog
            .find(&name)
            .ok_or_else(|| format!("no card named {name:?} in {}", catalog_path.display()))?,
        None => catalog.cards().first().ok_or("card catalog is empty")?,
    };
    // The terminal has nowhere to show card art
    let character = Arc::new(card.to_profile(None));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let user = read_user_profile(&mut lines).await?;

    let service = AnthropicService::new(&llm_config)?;
    let client = Arc::new(LoggingClient::new(Arc::new(service)));
    let handle = SessionHandle::new(ConversationSession::new(
        client,
        character.clone(),
        Arc::new(user),
        session_config,
    ));

    println!("You matched with {}! {}", character.name, character.bio);
    println!("Commands: /score, /reset, /quit");
    greet(&handle, &character.name).await;

    loop {
        prompt("> ")?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "" => {}
            "/quit" => break,
            "/score" => match handle.snapshot() {
                Ok(snapshot) => print_snapshot(&snapshot),
                Err(e) => println!("({e})"),
            },
            "/reset" => {
                handle.reset()?;
                println!("-- new date with {} --", character.name);
                greet(&handle, &character.name).await;
            }
            text => match join_task(handle.spawn_advance(text)).await {
                Ok(outcome) => {
                    println!("{}: {}", character.name, outcome.reply);
                    println!("   [score {}/10]", outcome.score);
                    match outcome.state {
                        SessionState::Succeeded => {
                            if let Some(closing) = outcome.closing {
                                println!("{}: {closing}", character.name);
                            }
                            println!("It's a match! Type /reset to date again.");
                        }
                        SessionState::Failed => {
                            println!("{} unmatched you. Type /reset to try again.", character.name);
                        }
                        SessionState::Active => {}
                    }
                }
                Err(e @ SessionError::Terminal { .. }) => println!("({e})"),
                Err(e) if e.is_retryable() => {
                    println!("(message not delivered: {e}; send again to retry)");
                }
                Err(e) => println!("(error: {e})"),
            },
        }
    }

    Ok(())
}

async fn greet(handle: &SessionHandle, name: &str) {
    match join_task(handle.spawn_start()).await {
        Ok(turn) => println!("{name}: {}", turn.text),
        Err(e) => {
            tracing::warn!(error = %e, "Greeting failed");
            println!("({name} is shy today; say something first)");
        }
    }
}

fn prompt(text: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()
}

fn print_snapshot(snapshot: &SessionSnapshot) {
    println!(
        "score {}/10 after {} exchanges ({})",
        snapshot.score, snapshot.exchanges, snapshot.state
    );
    if let Some(pending) = &snapshot.pending_user_text {
        println!("undelivered: {pending}");
    }
}

async fn read_user_profile<R>(lines: &mut Lines<R>) -> Result<UserProfile, Box<dyn std::error::Error>>
where
    R: AsyncBufRead + Unpin,
{
    let name = std::env::var("ARENA_DATE_USER_NAME").unwrap_or_else(|_| "Challenger".to_string());
    let bio = match std::env::var("ARENA_DATE_USER_BIO") {
        Ok(bio) if !bio.trim().is_empty() => bio,
        _ => {
            prompt("Tell your match about yourself: ")?;
            lines.next_line().await?.unwrap_or_default()
        }
    };

    let mut user = UserProfile::new(name, bio.trim());
    if let Ok(path) = std::env::var("ARENA_DATE_USER_PHOTO") {
        match ReferenceImage::load(&path).await {
            Ok(photo) => user = user.with_photo(photo),
            Err(e) => tracing::warn!(error = %e, "Ignoring profile photo"),
        }
    }
    Ok(user)
}
