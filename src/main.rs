use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;

use irma_session::bridge::{BridgeLayer, NamedEvent};
use irma_session::config::Config;
use irma_session::irma::{Credentials, IrmaConfiguration, RawCredential, Snapshot};
use irma_session::logging::init_tracing;
use irma_session::session::{Collaborators, SchemeValidator, SessionEvent, SessionId};

#[derive(Parser)]
#[command(name = "irma-session", version, about = "Fold credential session events into session state")]
struct Cli {
    /// Path to config file (default: ~/.config/irma-session/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a JSON-lines event log and print the resulting session states
    Replay(ReplayArgs),
}

#[derive(Args)]
struct ReplayArgs {
    /// File with one `{"name": ..., "payload": {...}}` object per line
    #[arg(long)]
    events: PathBuf,

    /// Scheme configuration snapshot (JSON)
    #[arg(long)]
    configuration: Option<PathBuf>,

    /// Wallet snapshot: JSON array of credentials
    #[arg(long)]
    credentials: Option<PathBuf>,

    /// Only print this session
    #[arg(long)]
    session: Option<SessionId>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Command::Replay(args) => replay(&config, args).await,
    }
}

async fn replay(config: &Config, args: ReplayArgs) -> Result<()> {
    let configuration: IrmaConfiguration = match &args.configuration {
        Some(path) => read_json(path)?,
        None => IrmaConfiguration::default(),
    };
    let credentials = match &args.credentials {
        Some(path) => {
            let raw: Vec<RawCredential> = read_json(path)?;
            Credentials::from_raw(&raw, &configuration)
        }
        None => Credentials::default(),
    };
    let events = read_events(&args.events)?;

    let collaborators = Collaborators {
        configuration: Snapshot::fixed(configuration),
        credentials: Snapshot::fixed(credentials),
        return_url_validator: Arc::new(SchemeValidator::from(&config.return_url)),
    };
    let (bridge, server) = BridgeLayer::new(&config.session, collaborators);
    let repository = bridge.repository().clone();
    let fold = tokio::spawn(server.run());

    let count = events.len();
    for event in events {
        bridge.dispatch(event).await?;
    }
    drop(bridge);
    fold.await.context("session fold task panicked")??;
    tracing::info!(events = count, "Replay finished");

    let states = repository.snapshot();
    tracing::info!(
        sessions = states.len(),
        has_active_sessions = states.has_active_sessions(),
        "Session states"
    );
    let output = match args.session {
        Some(session_id) => serde_json::to_string_pretty(&states.get(session_id))?,
        None => serde_json::to_string_pretty(&*states)?,
    };
    println!("{}", output);
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

fn read_events(path: &Path) -> Result<Vec<SessionEvent>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            let named: NamedEvent = serde_json::from_str(line)
                .with_context(|| format!("{}:{}: malformed event", path.display(), index + 1))?;
            SessionEvent::try_from(named)
                .with_context(|| format!("{}:{}: invalid event", path.display(), index + 1))
        })
        .collect()
}
