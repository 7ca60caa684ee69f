use std::{fmt, process::ExitCode};

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, Select, Text};
use weather_core::{
    App, AppEvent, Config, Period, Pipeline, Theme, catalog, provider_from_config,
};

use crate::{completion::CityCompleter, terminal::TerminalSurface};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key, language and theme.
    Configure,

    /// List catalog cities matching a partial name.
    Suggest {
        /// At least two characters of a city name.
        query: String,
    },

    /// Show weather for a city.
    Show {
        /// City name, e.g. "Dushanbe".
        city: String,

        /// One of: today, tomorrow, 10days.
        #[arg(long, short, default_value = "today")]
        period: Period,

        /// Override the configured theme for this run.
        #[arg(long)]
        theme: Option<Theme>,
    },

    /// Prompt for cities and periods until quit.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Command::Configure => configure()?,
            Command::Suggest { query } => suggest(&query),
            Command::Show {
                city,
                period,
                theme,
            } => return show(city, period, theme).await,
            Command::Interactive => interactive().await?,
        }

        Ok(ExitCode::SUCCESS)
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let key = match Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_help_message("Leave empty to keep the current key")
        .prompt_skippable()?
    {
        Some(key) if !key.trim().is_empty() => Some(key.trim().to_string()),
        _ => config.api_key.clone(),
    };
    config.api_key = key;

    config.lang = Text::new("Language:")
        .with_default(&config.lang)
        .prompt()?;

    let themes = vec![Theme::Light, Theme::Dark];
    let start = themes.iter().position(|t| *t == config.theme).unwrap_or(0);
    config.theme = Select::new("Theme:", themes)
        .with_starting_cursor(start)
        .prompt()?;

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

fn suggest(query: &str) {
    let matches = catalog::suggest(catalog::CITIES, query);
    if matches.is_empty() {
        eprintln!("No matching cities");
    }
    for city in matches {
        println!("{city}");
    }
}

fn build_app(config: &Config, surface: TerminalSurface) -> anyhow::Result<App<TerminalSurface>> {
    let provider = provider_from_config(config)?;
    let pipeline = Pipeline::from_config(config, provider)?;
    Ok(App::new(pipeline, surface, config.theme, config.notice_ttl()))
}

async fn show(city: String, period: Period, theme: Option<Theme>) -> anyhow::Result<ExitCode> {
    let mut config = Config::load()?;
    if let Some(theme) = theme {
        config.theme = theme;
    }

    let mut app = build_app(&config, TerminalSurface::new())?;
    app.dispatch(AppEvent::TextChanged(city));
    app.dispatch(AppEvent::FetchRequested(period));
    app.settle().await;

    if app.state().displayed_rows().is_empty() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Fetch(Period),
    ToggleTheme,
    ChangeCity,
    Quit,
}

impl Action {
    fn menu() -> Vec<Action> {
        Period::all()
            .iter()
            .copied()
            .map(Action::Fetch)
            .chain([Action::ToggleTheme, Action::ChangeCity, Action::Quit])
            .collect()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Fetch(period) => f.write_str(period.label()),
            Action::ToggleTheme => f.write_str("Toggle theme"),
            Action::ChangeCity => f.write_str("Change city"),
            Action::Quit => f.write_str("Quit"),
        }
    }
}

/// Cancelling a prompt (Esc or Ctrl-C) ends the session quietly.
fn cancelled<T>(result: Result<T, InquireError>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

async fn prompt_city(completer: CityCompleter) -> anyhow::Result<Option<String>> {
    let answer = tokio::task::spawn_blocking(move || {
        Text::new("City:")
            .with_autocomplete(completer)
            .with_help_message("Type two or more letters for suggestions")
            .prompt()
    })
    .await
    .context("City prompt task failed")?;

    cancelled(answer)
}

async fn prompt_action(theme: Theme) -> anyhow::Result<Option<Action>> {
    let answer = tokio::task::spawn_blocking(move || {
        Select::new(&format!("Action ({theme} theme):"), Action::menu()).prompt()
    })
    .await
    .context("Action prompt task failed")?;

    cancelled(answer)
}

async fn interactive() -> anyhow::Result<()> {
    let config = Config::load()?;
    let mut app = build_app(&config, TerminalSurface::new())?;

    loop {
        let Some(city) = prompt_city(CityCompleter::new(app.sender())).await? else {
            break;
        };
        if !app.drain() {
            break;
        }
        // The submitted text may differ from the last keystroke the completer saw.
        app.dispatch(AppEvent::TextChanged(city));

        let mut running = true;
        while running {
            let Some(action) = prompt_action(app.state().theme()).await? else {
                return Ok(());
            };

            running = match action {
                Action::Fetch(period) => {
                    app.dispatch(AppEvent::FetchRequested(period)) && app.settle().await
                }
                Action::ToggleTheme => app.dispatch(AppEvent::ThemeToggled),
                Action::ChangeCity => break,
                Action::Quit => {
                    app.dispatch(AppEvent::Quit);
                    return Ok(());
                }
            };
            running &= app.drain();
        }

        if !running {
            break;
        }
    }

    Ok(())
}
