//! Taleforge terminal client.
//!
//! # Usage
//!
//! ```bash
//! # List your sessions
//! taleforge --token "$TOKEN" sessions
//!
//! # Resume a session
//! taleforge --token "$TOKEN" play 42
//!
//! # Start a new story (scores 1-9, summing to 30)
//! taleforge --token "$TOKEN" new Aria --strength 6 --dexterity 7 --wisdom 3
//! ```

use std::{
    fs::File,
    io::{self, Write},
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};

use clap::{Parser, Subcommand};
use taleforge_app::{App, Bridge, Route, Runtime, SessionOrigin};
use taleforge_client::{
    ACCESS_TOKEN, ApiError, CharacterError, CharacterSheet, CredentialError, CredentialStore,
    FileCredentials, Gateway, MemoryCredentials, REFRESH_TOKEN, SessionId,
    http::{ClientConfig, HttpGateway},
};
use taleforge_core::TypingConfig;
use taleforge_tui::{Departure, TerminalDriver, TerminalError};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Taleforge terminal client
#[derive(Parser, Debug)]
#[command(name = "taleforge")]
#[command(about = "Play Taleforge story sessions in the terminal")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// API root of the story server
    #[arg(
        long,
        global = true,
        env = "TALEFORGE_API_URL",
        default_value = ClientConfig::DEFAULT_BASE_URL
    )]
    api_url: String,

    /// Access token. Stored in the credential store before any request.
    #[arg(long, global = true, env = "TALEFORGE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Refresh token. Stored next to the access token and cleared with it.
    #[arg(long, global = true, env = "TALEFORGE_REFRESH_TOKEN", hide_env_values = true)]
    refresh_token: Option<String>,

    /// Credential file. Credentials are kept in memory when omitted.
    #[arg(long, global = true)]
    credentials: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Log file. The terminal is busy drawing the story.
    #[arg(long, global = true, default_value = "taleforge.log")]
    log_file: PathBuf,

    /// Milliseconds between revealed characters
    #[arg(long, global = true, default_value = "30")]
    typing_interval_ms: u64,

    /// Milliseconds a fully revealed message stays before the next one
    #[arg(long, global = true, default_value = "500")]
    linger_ms: u64,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value = "30")]
    timeout_secs: u64,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List your sessions
    Sessions,

    /// Resume a session
    Play {
        /// Session to resume
        session_id: SessionId,
    },

    /// Create a character and start a new session
    New {
        /// Character name
        name: String,
        /// Strength (1-9)
        #[arg(long, default_value = "5")]
        strength: u8,
        /// Dexterity (1-9)
        #[arg(long, default_value = "5")]
        dexterity: u8,
        /// Constitution (1-9)
        #[arg(long, default_value = "5")]
        constitution: u8,
        /// Intelligence (1-9)
        #[arg(long, default_value = "5")]
        intelligence: u8,
        /// Wisdom (1-9)
        #[arg(long, default_value = "5")]
        wisdom: u8,
        /// Charisma (1-9)
        #[arg(long, default_value = "5")]
        charisma: u8,
    },
}

/// Command-line failures.
#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("invalid character: {0}")]
    Character(#[from] CharacterError),

    #[error("credential store: {0}")]
    Credentials(#[from] CredentialError),

    #[error("terminal: {0}")]
    Terminal(#[from] TerminalError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

fn init_tracing(args: &Args) -> Result<(), CliError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let file = File::create(&args.log_file)?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(filter)
        .init();
    Ok(())
}

fn credential_store(args: &Args) -> Result<Arc<dyn CredentialStore>, CliError> {
    let store: Arc<dyn CredentialStore> = match &args.credentials {
        Some(path) => Arc::new(FileCredentials::open(path.clone())?),
        None => Arc::new(MemoryCredentials::new()),
    };
    if let Some(token) = &args.token {
        store.set(ACCESS_TOKEN, token)?;
    }
    if let Some(token) = &args.refresh_token {
        store.set(REFRESH_TOKEN, token)?;
    }
    Ok(store)
}

async fn list_sessions(gateway: &HttpGateway) -> Result<(), CliError> {
    let listed = gateway.list_sessions().await?;
    let mut out = io::stdout().lock();

    if listed.sessions.is_empty() {
        writeln!(out, "No sessions yet. Start one with `taleforge new <name>`.")?;
        return Ok(());
    }

    for session in listed.sessions {
        writeln!(
            out,
            "{:>6}  {:<20}  floor {:<3}  {:<24}  {}",
            session.id,
            session.player_name,
            session.current_floor,
            session.theme.as_deref().unwrap_or("-"),
            session.game_state.as_str(),
        )?;
    }
    Ok(())
}

async fn play(
    gateway: HttpGateway,
    credentials: Arc<dyn CredentialStore>,
    session_id: SessionId,
    origin: SessionOrigin,
    typing: TypingConfig,
) -> Result<(), CliError> {
    let driver = TerminalDriver::new()?;
    let departure = driver.departure();

    let app = App::new(session_id, typing);
    let bridge = Bridge::new(gateway, credentials);
    let app = Runtime::new(driver, app, bridge, origin).run().await?;
    tracing::info!(session = session_id, mode = ?app.mode(), "session view closed");

    let mut err = io::stderr().lock();
    match departure.take() {
        Some(Departure { route: Route::Login, .. }) => {
            writeln!(err, "Your session has expired. Please log in again.")?;
        },
        Some(Departure { route: Route::Home, reason }) => {
            if let Some(reason) = reason {
                writeln!(err, "{reason}")?;
            }
        },
        None => {},
    }
    Ok(())
}

async fn run(args: Args) -> Result<(), CliError> {
    let credentials = credential_store(&args)?;
    let config = ClientConfig {
        base_url: args.api_url.clone(),
        timeout: Duration::from_secs(args.timeout_secs),
    };
    let gateway = HttpGateway::new(&config, credentials.clone())?;
    let typing = TypingConfig {
        cadence: Duration::from_millis(args.typing_interval_ms),
        linger: Duration::from_millis(args.linger_ms),
    };
    tracing::info!(api = gateway.base_url(), "Taleforge client starting");

    match args.command {
        Command::Sessions => list_sessions(&gateway).await,
        Command::Play { session_id } => {
            play(gateway, credentials, session_id, SessionOrigin::Resume, typing).await
        },
        Command::New {
            name,
            strength,
            dexterity,
            constitution,
            intelligence,
            wisdom,
            charisma,
        } => {
            let sheet = CharacterSheet {
                player_name: name,
                strength,
                dexterity,
                constitution,
                intelligence,
                wisdom,
                charisma,
            };
            sheet.validate()?;

            let created = gateway.create_game(&sheet).await?;
            tracing::info!(session = created.session_id, "session created");
            let origin = SessionOrigin::Fresh { narrative: created.narrative };
            play(gateway, credentials, created.session_id, origin, typing).await
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(&args)?;

    Ok(run(args).await?)
}
