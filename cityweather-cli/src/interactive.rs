use std::fmt;

use anyhow::Context;
use cityweather_core::{Action, AppState, Session, Tab};
use inquire::{InquireError, Select, Text};

use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    Search,
    ToggleUnits,
    View(Tab),
    Compare,
    Recent,
    DeleteRecent,
    Quit,
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuItem::Search => f.write_str("Search a city"),
            MenuItem::ToggleUnits => f.write_str("Switch °C / °F"),
            MenuItem::View(tab) => write!(f, "Show {} view", tab.label()),
            MenuItem::Compare => f.write_str("Compare with another city"),
            MenuItem::Recent => f.write_str("Search a recent city"),
            MenuItem::DeleteRecent => f.write_str("Delete a recent city"),
            MenuItem::Quit => f.write_str("Quit"),
        }
    }
}

fn menu(state: &AppState) -> Vec<MenuItem> {
    let mut items = vec![MenuItem::Search];
    if state.report.is_some() {
        items.extend(
            Tab::ALL
                .iter()
                .filter(|t| **t != state.tab)
                .map(|t| MenuItem::View(*t)),
        );
    }
    items.push(MenuItem::ToggleUnits);
    items.push(MenuItem::Compare);
    if !state.history.is_empty() {
        items.push(MenuItem::Recent);
        items.push(MenuItem::DeleteRecent);
    }
    items.push(MenuItem::Quit);
    items
}

/// A cancelled sub-prompt goes back to the menu instead of ending the session.
fn skippable<T>(answer: Result<T, InquireError>) -> anyhow::Result<Option<T>> {
    match answer {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled) => Ok(None),
        Err(e) => Err(e).context("Failed to read answer"),
    }
}

/// Read a city name; `None` when the user presses Esc.
fn ask_city(prompt: &str, placeholder: Option<&str>) -> anyhow::Result<Option<String>> {
    let mut text = Text::new(prompt);
    if let Some(placeholder) = placeholder {
        text = text.with_placeholder(placeholder);
    }
    skippable(text.prompt())
}

/// Pick an index into the recent list; `None` when the user backs out.
fn pick_recent(state: &AppState, prompt: &str) -> anyhow::Result<Option<usize>> {
    let choice = skippable(Select::new(prompt, state.history.clone()).raw_prompt())?;
    Ok(choice.map(|c| c.index))
}

pub async fn run(mut session: Session) -> anyhow::Result<()> {
    println!("{}", render::history(&session.state().history));

    loop {
        let units = session.state().units;
        let choice = match Select::new(
            &format!("[{}] What next?", units.temperature_symbol()),
            menu(session.state()),
        )
        .prompt()
        {
            Ok(choice) => choice,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read menu choice"),
        };

        let state = match choice {
            MenuItem::Search => match ask_city("City:", Some("e.g., London, New York, Tokyo"))? {
                Some(city) => session.dispatch(Action::Submit(city)).await,
                None => continue,
            },
            MenuItem::ToggleUnits => {
                session
                    .dispatch(Action::SetUnits(units.toggled()))
                    .await
            }
            MenuItem::View(tab) => session.dispatch(Action::SelectTab(tab)).await,
            MenuItem::Compare => {
                session.dispatch(Action::OpenCompare).await;
                if let Some(other) = ask_city("City to compare:", None)? {
                    let state = session.dispatch(Action::SubmitCompare(other)).await;
                    println!("{}\n", render::comparison(state));
                }
                session.dispatch(Action::CloseCompare).await;
                continue;
            }
            MenuItem::Recent => match pick_recent(session.state(), "Search again:")? {
                Some(index) => session.dispatch(Action::SelectRecent(index)).await,
                None => continue,
            },
            MenuItem::DeleteRecent => match pick_recent(session.state(), "Delete:")? {
                Some(index) => {
                    let state = session.dispatch(Action::RemoveRecent(index)).await;
                    println!("{}\n", render::history(&state.history));
                    continue;
                }
                None => continue,
            },
            MenuItem::Quit => break,
        };

        println!("{}\n", render::state(state));
    }

    Ok(())
}
