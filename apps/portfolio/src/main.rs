use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use portfolio::chat::{ChatLocale, ChatSession, SendOutcome};
use portfolio::config::Config;
use portfolio::preferences::FilePreferences;
use portfolio::sync::{LoadOutcome, Snapshot, SyncOrchestrator};
use portfolio::HttpApi;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting portfolio client v{}", env!("CARGO_PKG_VERSION"));

    let api = Arc::new(HttpApi::new(&config.api_url)?);
    let prefs = Arc::new(FilePreferences::open(&config.prefs_path)?);
    info!("Backend: {}, preferences: {}", config.api_url, config.prefs_path);

    let orchestrator = SyncOrchestrator::new(api.clone(), prefs);
    if let Err(e) = orchestrator.bootstrap().await {
        warn!("Starting without content: {e}");
    }
    let snapshot = orchestrator.snapshot();
    print_summary(&snapshot);

    let chat = ChatSession::new(api);
    chat.open(ChatLocale::from_snapshot(&snapshot));
    print_last_turn(&chat);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, arg) = line
            .split_once(' ')
            .map_or((line, ""), |(command, rest)| (command, rest.trim()));

        match (command, arg) {
            ("", _) => continue,
            ("/quit", _) => break,
            ("/lang", code) if !code.is_empty() => {
                match orchestrator.set_language(code).await {
                    LoadOutcome::Unchanged => println!("'{code}' is already active"),
                    LoadOutcome::Superseded => continue,
                    LoadOutcome::Applied | LoadOutcome::Failed(_) => {}
                }
                let snapshot = orchestrator.snapshot();
                print_summary(&snapshot);
                if chat.observe(&snapshot) {
                    print_last_turn(&chat);
                }
            }
            ("/theme", seed) if !seed.is_empty() => {
                orchestrator.set_theme_value(seed);
                print_theme(&orchestrator.snapshot());
            }
            ("/mode", _) => {
                let mode = orchestrator.toggle_theme();
                println!("mode: {}", mode.as_str());
            }
            _ => match chat.send(line).await {
                SendOutcome::Rejected(reason) => println!("(not sent: {reason:?})"),
                SendOutcome::Discarded => {}
                SendOutcome::Replied | SendOutcome::Failed(_) => print_last_turn(&chat),
            },
        }
    }

    Ok(())
}

fn print_summary(snapshot: &Snapshot) {
    let t = snapshot.translator();
    println!(
        "[{}] {:?} generation {}",
        snapshot.active_language(),
        snapshot.phase,
        snapshot.generation
    );
    if let Some(error) = snapshot.content_error() {
        println!("  ! {error}");
    }
    if let Some(content) = snapshot.content() {
        println!("  {}", snapshot.profile_name());
        println!("  {}", t.t("heroTitle"));
        println!(
            "  experience: {}, projects: {}, skills: {}, education: {}, languages: {}, contacts: {}",
            content.experiences.len(),
            content.projects.len(),
            content.skill_categories.len(),
            content.education.len(),
            content.languages.len(),
            content.contact_info.len()
        );
    }
    let languages: Vec<&str> = snapshot
        .site_languages
        .iter()
        .map(|l| l.code.as_str())
        .collect();
    if !languages.is_empty() {
        println!("  available: {}", languages.join(", "));
    }
    print_theme(snapshot);
}

fn print_theme(snapshot: &Snapshot) {
    println!(
        "  theme: {} [{}] ({})",
        snapshot.seed.scheme_name(),
        snapshot.seed,
        snapshot.mode.as_str()
    );
    if let Some(theme) = &snapshot.derived_theme {
        for (name, value) in theme.css_variables() {
            println!("    {name}: {value}");
        }
    }
}

fn print_last_turn(chat: &ChatSession) {
    if let Some(turn) = chat.transcript().last() {
        println!("{:?}> {}", turn.role, turn.text);
    }
}
