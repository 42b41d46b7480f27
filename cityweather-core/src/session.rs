use std::collections::VecDeque;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::{
    aggregator::Aggregator,
    history::RecentCityStore,
    model::UnitSystem,
    state::{Action, AppState, Effect, reduce},
};

/// Runs actions through the reducer and executes the resulting effects.
///
/// One caller at a time: `dispatch` takes `&mut self`, so a new search can't
/// start while one is in flight.
#[derive(Debug)]
pub struct Session {
    aggregator: Aggregator,
    recent: RecentCityStore,
    state: AppState,
    tx: watch::Sender<AppState>,
}

impl Session {
    /// `recent` should already be loaded; its list seeds the initial state.
    pub fn new(aggregator: Aggregator, recent: RecentCityStore, units: UnitSystem) -> Self {
        let state = AppState::new(units, recent.all().to_vec());
        let (tx, _) = watch::channel(state.clone());
        Self {
            aggregator,
            recent,
            state,
            tx,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Receive every state the session settles into.
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.tx.subscribe()
    }

    /// Apply `action` and everything it triggers; returns the settled state.
    pub async fn dispatch(&mut self, action: Action) -> &AppState {
        let mut queue = VecDeque::from([action]);

        while let Some(action) = queue.pop_front() {
            let (next, effects) = reduce(&self.state, action);
            self.state = next;
            self.tx.send_replace(self.state.clone());

            for effect in effects {
                if let Some(follow_up) = self.run(effect).await {
                    queue.push_back(follow_up);
                }
            }
        }

        &self.state
    }

    async fn run(&mut self, effect: Effect) -> Option<Action> {
        debug!(?effect, "Running effect");
        match effect {
            Effect::Search(query) => Some(match self.aggregator.fetch(&query).await {
                Ok(report) => Action::SearchSucceeded(Box::new(report)),
                Err(e) => Action::SearchFailed(e),
            }),
            Effect::Compare(query) => Some(match self.aggregator.fetch_compare(&query).await {
                Ok(snapshot) => Action::CompareSucceeded(snapshot),
                Err(e) => {
                    warn!(kind = e.kind(), error = %e, "Compare fetch failed");
                    Action::CompareFailed(e)
                }
            }),
            Effect::RecordRecent(city) => {
                if let Err(e) = self.recent.record(&city) {
                    warn!(error = %e, "Failed to persist recent cities");
                }
                Some(Action::HistoryChanged(self.recent.all().to_vec()))
            }
            Effect::RemoveRecent(index) => {
                if let Err(e) = self.recent.remove(index) {
                    warn!(error = %e, "Failed to persist recent cities");
                }
                Some(Action::HistoryChanged(self.recent.all().to_vec()))
            }
        }
    }
}
