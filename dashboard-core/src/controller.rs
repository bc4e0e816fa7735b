//! Dashboard state machine.
//!
//! ```text
//! Idle --refresh--> Loading --ok--> Ready
//!                           \--err-> Failed
//! Ready | Failed --refresh--> Loading
//! ```
//!
//! Every transition publishes a new immutable [`ViewState`] on a
//! `tokio::sync::watch` channel. A refresh only lands if no newer refresh was
//! started while it was in flight; otherwise its result is dropped.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use crate::{
    error::RefreshError,
    forecast::normalize_forecast,
    history::HistoryProvider,
    model::{CurrentConditions, ForecastDay, HistoryPoint, PlaceQuery},
    provider::WeatherProvider,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// One published version of the dashboard.
///
/// Results are populated only in [`Phase::Ready`]; `last_error` only in
/// [`Phase::Failed`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub phase: Phase,
    pub current: Option<CurrentConditions>,
    pub forecast: Vec<ForecastDay>,
    pub history: Vec<HistoryPoint>,
    /// Place of the latest started refresh.
    pub active_place: Option<PlaceQuery>,
    /// Unsubmitted text of the search field.
    pub pending_query: String,
    pub last_error: Option<String>,
    /// Sequence number of the latest started refresh.
    pub request_seq: u64,
    /// Incremented on every published change.
    pub version: u64,
}

impl ViewState {
    fn initial(pending_query: String) -> Self {
        Self {
            phase: Phase::Idle,
            current: None,
            forecast: Vec::new(),
            history: Vec::new(),
            active_place: None,
            pending_query,
            last_error: None,
            request_seq: 0,
            version: 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn has_results(&self) -> bool {
        self.current.is_some() || !self.forecast.is_empty() || !self.history.is_empty()
    }

    fn next(&self) -> Self {
        Self {
            version: self.version + 1,
            ..self.clone()
        }
    }

    fn cleared(&self) -> Self {
        Self {
            current: None,
            forecast: Vec::new(),
            history: Vec::new(),
            last_error: None,
            ..self.next()
        }
    }
}

/// What happened to a refresh once it settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The result was published; the state is now in this phase.
    Applied(Phase),
    /// A newer refresh was started meanwhile; the result was dropped.
    Stale,
    /// Submitted text was blank; nothing was started.
    Ignored,
}

struct Loaded {
    current: CurrentConditions,
    forecast: Vec<ForecastDay>,
    history: Vec<HistoryPoint>,
}

/// Owns the single [`ViewState`] of a session and drives refresh cycles.
#[derive(Debug)]
pub struct Dashboard {
    weather: Arc<dyn WeatherProvider>,
    history: Arc<dyn HistoryProvider>,
    state: watch::Sender<Arc<ViewState>>,
}

impl Dashboard {
    pub fn new(weather: Arc<dyn WeatherProvider>, history: Arc<dyn HistoryProvider>) -> Self {
        Self::with_query(weather, history, String::new())
    }

    /// Starts with `pending_query` pre-filled in the search field.
    pub fn with_query(
        weather: Arc<dyn WeatherProvider>,
        history: Arc<dyn HistoryProvider>,
        pending_query: impl Into<String>,
    ) -> Self {
        let (state, _) = watch::channel(Arc::new(ViewState::initial(pending_query.into())));
        Self {
            weather,
            history,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<ViewState>> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> Arc<ViewState> {
        self.state.borrow().clone()
    }

    /// Updates the unsubmitted search text without starting a refresh.
    pub fn edit_query(&self, text: impl Into<String>) {
        let text = text.into();
        self.state.send_if_modified(|slot| {
            if slot.pending_query == text {
                return false;
            }
            *slot = Arc::new(ViewState {
                pending_query: text,
                ..slot.next()
            });
            true
        });
    }

    /// First refresh of a session, using the pre-filled search text.
    pub async fn load_initial(&self) -> RefreshOutcome {
        self.submit().await
    }

    /// Refreshes with the current search text; blank text is ignored.
    pub async fn submit(&self) -> RefreshOutcome {
        let text = self.state.borrow().pending_query.clone();
        match PlaceQuery::try_from(text.as_str()) {
            Ok(place) => self.refresh(place).await,
            Err(_) => {
                debug!("Ignoring blank place query");
                RefreshOutcome::Ignored
            }
        }
    }

    /// Runs one refresh cycle for `place`.
    #[instrument(skip(self), fields(place = %place))]
    pub async fn refresh(&self, place: PlaceQuery) -> RefreshOutcome {
        let seq = self.begin(&place);
        let result = self.load(&place).await;
        self.settle(seq, result)
    }

    fn begin(&self, place: &PlaceQuery) -> u64 {
        let mut seq = 0;
        self.state.send_modify(|slot| {
            seq = slot.request_seq + 1;
            *slot = Arc::new(ViewState {
                phase: Phase::Loading,
                active_place: Some(place.clone()),
                request_seq: seq,
                ..slot.cleared()
            });
        });
        debug!(seq, "Refresh started");
        seq
    }

    async fn load(&self, place: &PlaceQuery) -> Result<Loaded, RefreshError> {
        let (current, raw_forecast) = tokio::try_join!(
            self.weather.fetch_current(place),
            self.weather.fetch_forecast_raw(place),
        )?;

        let forecast = normalize_forecast(&raw_forecast)?;
        let history = self.history.history(&current).await?;

        Ok(Loaded {
            current,
            forecast,
            history,
        })
    }

    fn settle(&self, seq: u64, result: Result<Loaded, RefreshError>) -> RefreshOutcome {
        let mut outcome = RefreshOutcome::Stale;

        self.state.send_if_modified(|slot| {
            if slot.request_seq != seq {
                return false;
            }

            let next = match &result {
                Ok(loaded) => ViewState {
                    phase: Phase::Ready,
                    current: Some(loaded.current.clone()),
                    forecast: loaded.forecast.clone(),
                    history: loaded.history.clone(),
                    ..slot.cleared()
                },
                Err(err) => ViewState {
                    phase: Phase::Failed,
                    last_error: Some(err.to_string()),
                    ..slot.cleared()
                },
            };

            outcome = RefreshOutcome::Applied(next.phase);
            *slot = Arc::new(next);
            true
        });

        match (&outcome, &result) {
            (RefreshOutcome::Stale, _) => debug!(seq, "Dropped stale refresh result"),
            (_, Ok(_)) => debug!(seq, "Refresh ready"),
            (_, Err(err)) => warn!(seq, error = %err, "Refresh failed"),
        }

        outcome
    }
}
