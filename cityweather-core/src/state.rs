//! UI-agnostic application state and its reducer.
//!
//! `reduce` never performs I/O: it returns the next state plus the effects the
//! caller has to run. Results of those effects come back in as actions.

use crate::{
    error::FetchError,
    model::{CompareSnapshot, SearchQuery, UnitSystem, WeatherReport},
    query::normalize,
};

/// Which view of the current report is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Current,
    Hourly,
    Daily,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Current, Tab::Hourly, Tab::Daily];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Current => "Current",
            Tab::Hourly => "Hourly",
            Tab::Daily => "5-Day",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompareState {
    pub open: bool,
    pub loading: bool,
    pub snapshot: Option<CompareSnapshot>,
    /// Kept apart from the primary error slot.
    pub error: Option<FetchError>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub units: UnitSystem,
    pub tab: Tab,
    pub loading: bool,
    pub report: Option<WeatherReport>,
    pub error: Option<FetchError>,
    pub history: Vec<String>,
    pub compare: CompareState,
}

impl AppState {
    pub fn new(units: UnitSystem, history: Vec<String>) -> Self {
        Self {
            units,
            history,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Raw text from the search input.
    Submit(String),
    SetUnits(UnitSystem),
    SelectTab(Tab),
    SelectRecent(usize),
    RemoveRecent(usize),
    OpenCompare,
    CloseCompare,
    SubmitCompare(String),
    SearchSucceeded(Box<WeatherReport>),
    SearchFailed(FetchError),
    CompareSucceeded(CompareSnapshot),
    CompareFailed(FetchError),
    HistoryChanged(Vec<String>),
}

/// Side effects requested by the reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Search(SearchQuery),
    Compare(SearchQuery),
    RecordRecent(String),
    RemoveRecent(usize),
}

pub fn reduce(state: &AppState, action: Action) -> (AppState, Vec<Effect>) {
    let mut next = state.clone();
    let mut effects = Vec::new();

    match action {
        Action::Submit(raw) => start_search(&mut next, &mut effects, &raw),
        Action::SelectRecent(index) => {
            if let Some(city) = state.history.get(index) {
                start_search(&mut next, &mut effects, city);
            }
        }
        Action::SetUnits(units) => {
            if units != state.units {
                next.units = units;
                // values are unit-specific; re-fetch rather than convert
                if let Some(report) = &state.report {
                    next.loading = true;
                    effects.push(Effect::Search(report.query.with_units(units)));
                }
            }
        }
        Action::SelectTab(tab) => next.tab = tab,
        Action::RemoveRecent(index) => {
            if index < state.history.len() {
                effects.push(Effect::RemoveRecent(index));
            }
        }
        Action::OpenCompare => next.compare.open = true,
        Action::CloseCompare => next.compare.open = false,
        Action::SubmitCompare(raw) => match normalize(&raw, state.units) {
            Ok(query) => {
                next.compare.loading = true;
                next.compare.error = None;
                effects.push(Effect::Compare(query));
            }
            Err(e) => next.compare.error = Some(e),
        },
        Action::SearchSucceeded(report) => {
            next.loading = false;
            next.error = None;
            effects.push(Effect::RecordRecent(report.query.city().to_string()));
            next.report = Some(*report);
        }
        Action::SearchFailed(err) => {
            next.loading = false;
            next.report = None;
            next.error = Some(err);
        }
        Action::CompareSucceeded(snapshot) => {
            next.compare.loading = false;
            next.compare.error = None;
            next.compare.snapshot = Some(snapshot);
        }
        Action::CompareFailed(err) => {
            next.compare.loading = false;
            next.compare.snapshot = None;
            next.compare.error = Some(err);
        }
        Action::HistoryChanged(history) => next.history = history,
    }

    (next, effects)
}

fn start_search(next: &mut AppState, effects: &mut Vec<Effect>, raw: &str) {
    match normalize(raw, next.units) {
        Ok(query) => {
            next.loading = true;
            next.error = None;
            effects.push(Effect::Search(query));
        }
        Err(e) => next.error = Some(e),
    }
}
