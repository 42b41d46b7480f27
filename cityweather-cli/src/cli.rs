use anyhow::{Context, bail};
use cityweather_core::{
    Action, Aggregator, Config, RecentCityStore, Session, Tab, UnitSystem, provider_from_config,
};
use clap::{Parser, Subcommand, ValueEnum};
use inquire::{Password, PasswordDisplayMode, Select};

use crate::{interactive, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityweather", version, about = "City weather lookup")]
pub struct Cli {
    /// Print debug logs to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and default unit system.
    Configure,

    /// Show weather for a city.
    Show {
        city: String,

        /// metric or imperial; defaults to the configured system.
        #[arg(long)]
        units: Option<UnitSystem>,

        #[arg(long, value_enum, default_value_t = View::Current)]
        view: View,
    },

    /// Show a city next to a second one.
    Compare {
        city: String,
        other: String,

        #[arg(long)]
        units: Option<UnitSystem>,
    },

    /// List recent searches, or manage them.
    Recent {
        #[command(subcommand)]
        action: Option<RecentCommand>,
    },

    /// Browse interactively: search, switch units and views, compare.
    Interactive {
        #[arg(long)]
        units: Option<UnitSystem>,
    },
}

#[derive(Debug, Subcommand)]
pub enum RecentCommand {
    /// Delete an entry by its number in the list (1 = most recent).
    Remove { number: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum View {
    Current,
    Hourly,
    Daily,
}

impl From<View> for Tab {
    fn from(view: View) -> Self {
        match view {
            View::Current => Tab::Current,
            View::Hourly => Tab::Hourly,
            View::Daily => Tab::Daily,
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure()?,
            Command::Show { city, units, view } => {
                let mut session = open_session(units)?;
                session.dispatch(Action::SelectTab(view.into())).await;
                let state = session.dispatch(Action::Submit(city)).await;

                if let Some(err) = &state.error {
                    bail!("{err}");
                }
                println!("{}", render::state(state));
            }
            Command::Compare { city, other, units } => {
                let mut session = open_session(units)?;
                let state = session.dispatch(Action::Submit(city)).await;
                if let Some(err) = &state.error {
                    bail!("{err}");
                }

                session.dispatch(Action::OpenCompare).await;
                let state = session.dispatch(Action::SubmitCompare(other)).await;
                println!("{}", render::comparison(state));
            }
            Command::Recent { action } => {
                let mut store = RecentCityStore::open(RecentCityStore::default_path()?);
                if let Some(RecentCommand::Remove { number }) = action {
                    if let Some(index) = number.checked_sub(1) {
                        store.remove(index)?;
                    }
                }
                println!("{}", render::history(store.all()));
            }
            Command::Interactive { units } => {
                let session = open_session(units)?;
                interactive::run(session).await?;
            }
        }

        Ok(())
    }
}

fn open_session(units: Option<UnitSystem>) -> anyhow::Result<Session> {
    let config = Config::load()?;
    let provider = provider_from_config(&config)?;
    let aggregator = Aggregator::new(provider, config.timeout());
    let recent = RecentCityStore::open(RecentCityStore::default_path()?);

    Ok(Session::new(aggregator, recent, units.unwrap_or(config.units)))
}

fn configure() -> anyhow::Result<()> {
    // environment overrides must not end up in the file
    let mut config = Config::load_file()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Leave empty to keep the current key")
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key);
    }

    let choices = vec![UnitSystem::Metric, UnitSystem::Imperial];
    let start = choices.iter().position(|u| *u == config.units).unwrap_or(0);
    config.units = Select::new("Default unit system:", choices)
        .with_starting_cursor(start)
        .prompt()
        .context("Failed to read unit system")?;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    if !config.is_configured() {
        println!("No API key stored yet; searches will fail until one is set.");
    }
    Ok(())
}
