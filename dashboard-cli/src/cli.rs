use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dashboard_core::{
    Config, Dashboard, PlaceQuery, SyntheticHistory, ViewState, provider_from_config,
};
use inquire::{InquireError, Password, PasswordDisplayMode, Text};
use tracing::{debug, info};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dashboard", version, about = "Weather dashboard for the terminal")]
pub struct Cli {
    /// Verbosity level (-v info, -vv debug, -vvv trace); RUST_LOG overrides it.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key.
    Configure,

    /// Show the dashboard for a place once.
    Show {
        /// Place name; defaults to the configured default place.
        place: Option<String>,

        /// Print the view state as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Load a place, then keep prompting for new searches.
    Interactive {
        /// Place loaded first; defaults to the configured default place.
        place: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { place, json } => show(place, json).await,
            Command::Interactive { place } => interactive(place).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load()?;

    let api_key = Password::new("OpenWeatherMap API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    cfg.set_api_key(api_key);
    if cfg.api_key().is_none() {
        anyhow::bail!("API key must not be empty");
    }

    let default_place = Text::new("Default place:")
        .with_default(&cfg.default_place)
        .prompt()
        .context("Failed to read default place")?;
    cfg.default_place = PlaceQuery::try_from(default_place)?.into();

    cfg.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn build_dashboard(cfg: &Config, start: &str) -> anyhow::Result<Dashboard> {
    let provider = provider_from_config(cfg)?;
    Ok(Dashboard::with_query(
        Arc::from(provider),
        Arc::new(SyntheticHistory::new()),
        start,
    ))
}

fn start_text(cfg: &Config, place: Option<String>) -> anyhow::Result<String> {
    match place {
        Some(text) => Ok(PlaceQuery::try_from(text)?.into()),
        None => Ok(cfg.default_place()?.into()),
    }
}

async fn show(place: Option<String>, json: bool) -> anyhow::Result<()> {
    let cfg = Config::load()?;
    let start = start_text(&cfg, place)?;
    let dashboard = build_dashboard(&cfg, &start)?;

    let outcome = dashboard.load_initial().await;
    debug!(?outcome, place = %start, "Initial load settled");
    print_state(&dashboard.snapshot(), json)
}

async fn interactive(place: Option<String>) -> anyhow::Result<()> {
    let cfg = Config::load()?;
    let start = start_text(&cfg, place)?;
    let dashboard = build_dashboard(&cfg, &start)?;

    let outcome = dashboard.load_initial().await;
    debug!(?outcome, place = %start, "Initial load settled");
    print_state(&dashboard.snapshot(), false)?;

    loop {
        let pending = dashboard.snapshot().pending_query.clone();
        // The prompt reads the terminal synchronously; keep it off the runtime threads.
        let input = tokio::task::spawn_blocking(move || {
            Text::new("Search place:")
                .with_initial_value(&pending)
                .with_help_message("Enter to search, Esc to quit")
                .prompt()
        })
        .await
        .context("Search prompt task failed")?;

        let text = match input {
            Ok(text) => text,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read search input"),
        };

        dashboard.edit_query(text);
        let loading_for = dashboard.snapshot().pending_query.trim().to_string();
        if !loading_for.is_empty() {
            println!("{}", render::loading(&loading_for));
        }

        let outcome = dashboard.submit().await;
        debug!(?outcome, query = %loading_for, "Search settled");
        print_state(&dashboard.snapshot(), false)?;
    }

    info!("Leaving interactive mode");
    Ok(())
}

fn print_state(state: &ViewState, json: bool) -> anyhow::Result<()> {
    if json {
        let out = serde_json::to_string_pretty(state).context("Failed to serialize view state")?;
        println!("{out}");
    } else {
        println!("{}", render::dashboard(state));
    }
    Ok(())
}
