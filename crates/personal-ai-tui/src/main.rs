use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use personal_ai_core::{Config, FileProfileStore, ProfileStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod app;
mod handler;
mod tui;
mod ui;

use app::{App, Screen};
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "personal-ai")]
#[command(about = "Train a personal AI on how you think, then chat with it")]
struct Cli {
    /// Profile file to read and write (defaults to the data directory)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the training form
    Train,
    /// Open the chat (default)
    Chat,
    /// Print the stored profile as JSON
    Profile,
}

/// Default `RUST_LOG` directives: this binary and the core library.
const DEFAULT_LOG_FILTER: &str = "personal_ai=info,personal_ai_core=info";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, store) = resolve(&cli)?;

    match cli.command {
        Some(Commands::Profile) => {
            println!("{}", profile_report(&store)?);
            Ok(())
        }
        Some(Commands::Train) => run_tui(config, store, Screen::Train).await,
        Some(Commands::Chat) | None => run_tui(config, store, Screen::Chat).await,
    }
}

/// Config from `--config` (or the default location), with `--store` taking precedence.
fn resolve(cli: &Cli) -> Result<(Config, FileProfileStore)> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => Config::load().unwrap_or_else(|_| Config::new()),
    };
    if let Some(store) = &cli.store {
        config.store_path = Some(store.clone());
    }

    let store = FileProfileStore::from_config(&config)?;
    Ok((config, store))
}

fn profile_report(store: &FileProfileStore) -> Result<String> {
    Ok(match store.load()? {
        Some(profile) => serde_json::to_string_pretty(&profile)?,
        None => format!(
            "No profile saved yet at {}. Run `personal-ai train` first.",
            store.path().display()
        ),
    })
}

/// Log to a file; the terminal belongs to the TUI.
fn init_logging(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    let file = File::options()
        .create(true)
        .append(true)
        .open(dir.join("personal-ai.log"))?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .init();
    Ok(())
}

async fn run_tui(config: Config, store: FileProfileStore, screen: Screen) -> Result<()> {
    let log_dir = match store.path().parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => Config::data_dir()?,
    };
    init_logging(&log_dir)?;
    tracing::info!(store = %store.path().display(), "starting");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let mut events = EventHandler::new();
    let mut app = App::new(config, Box::new(store), events.sender(), screen);
    app.refresh_send_control();

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    tracing::info!("exiting");
    result
}

async fn run(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Arc;

    use chrono::Utc;
    use personal_ai_core::{Profile, ProfileStore, Style};

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn profile() -> Profile {
        Profile {
            name: "Noor Haddad".to_string(),
            field: "Architecture".to_string(),
            approach: "I sketch first and refine with the whole team".to_string(),
            tools: "Pencil".to_string(),
            style: Some(Style::Creative),
            example: "x".repeat(60),
            timestamp: Utc::now(),
            trained: true,
        }
    }

    #[test]
    fn test_default_filter_keeps_app_logs() {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new(DEFAULT_LOG_FILTER))
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(move || writer.clone())
                    .with_ansi(false),
            );

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("profile not saved");
            tracing::info!(target: "personal_ai::app", "from the app");
            tracing::info!(target: "personal_ai_core::store", "saved profile");
            tracing::debug!("too chatty");
            tracing::info!(target: "hyper", "someone else");
        });

        let output = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert!(module_path!().starts_with("personal_ai"));
        assert!(output.contains("profile not saved"));
        assert!(output.contains("from the app"));
        assert!(output.contains("saved profile"));
        assert!(!output.contains("too chatty"));
        assert!(!output.contains("someone else"));
    }

    #[test]
    fn test_store_flag_overrides_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        let mut config = Config::new();
        config.store_path = Some(dir.path().join("from-config.json"));
        config.submit_delay_ms = 10;
        config.save_to(&config_path).unwrap();

        let cli = Cli::try_parse_from([
            "personal-ai",
            "--config",
            config_path.to_str().unwrap(),
            "profile",
        ])
        .unwrap();
        let (loaded, store) = resolve(&cli).unwrap();
        assert_eq!(loaded.submit_delay_ms, 10);
        assert_eq!(store.path(), dir.path().join("from-config.json"));

        let override_path = dir.path().join("override.json");
        let cli = Cli::try_parse_from([
            "personal-ai",
            "profile",
            "--store",
            override_path.to_str().unwrap(),
            "--config",
            config_path.to_str().unwrap(),
        ])
        .unwrap();
        let (loaded, store) = resolve(&cli).unwrap();
        assert_eq!(loaded.store_path.as_deref(), Some(override_path.as_path()));
        assert_eq!(store.path(), override_path);
        assert!(matches!(cli.command, Some(Commands::Profile)));
    }

    #[test]
    fn test_unreadable_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let unreadable = dir.path().join("config.json");
        std::fs::create_dir_all(&unreadable).unwrap();

        let cli = Cli::try_parse_from(["personal-ai", "--config", unreadable.to_str().unwrap()])
            .unwrap();
        assert!(resolve(&cli).is_err());
    }

    #[test]
    fn test_profile_report() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileProfileStore::new(dir.path().join("personalAIData.json"));
        assert!(profile_report(&store).unwrap().starts_with("No profile saved yet"));

        let saved = profile();
        store.save(&saved).unwrap();
        let report = profile_report(&store).unwrap();
        let parsed: Profile = serde_json::from_str(&report).unwrap();
        assert_eq!(parsed, saved);
    }
}
