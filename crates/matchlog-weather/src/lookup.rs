//! Per-display weather lookup.
//!
//! A `WeatherLookup` belongs to one showing of a match detail view. The fetch
//! runs on the tokio runtime; its result comes back over a channel and is
//! only applied when the owner calls [`WeatherLookup::poll`] on its own
//! thread. Dropping the lookup cancels the request.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;

use matchlog_journal::MatchRecord;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::provider::WeatherProvider;
use crate::types::{WeatherError, WeatherSnapshot};

type FetchResult = Result<WeatherSnapshot, WeatherError>;

/// `Idle -> Fetching -> Succeeded | Failed`, or `Cancelled` if the owner
/// gave up first. Finished states are final.
#[derive(Debug, Default)]
pub enum LookupState {
    #[default]
    Idle,
    Fetching,
    Succeeded(WeatherSnapshot),
    Failed(WeatherError),
    Cancelled,
}

impl LookupState {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(_) | Self::Cancelled)
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        match self {
            Self::Succeeded(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&WeatherError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}

pub struct WeatherLookup {
    record: MatchRecord,
    state: LookupState,
    rx: Option<Receiver<FetchResult>>,
    cancel: CancellationToken,
}

impl WeatherLookup {
    /// An idle lookup for `record`.
    pub fn new(record: MatchRecord) -> Self {
        Self {
            record,
            state: LookupState::Idle,
            rx: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Create and immediately start a lookup.
    pub fn spawn(runtime: &Handle, provider: Arc<WeatherProvider>, record: MatchRecord) -> Self {
        let mut lookup = Self::new(record);
        lookup.start(runtime, provider);
        lookup
    }

    /// Start fetching. Only valid from `Idle`; later calls are ignored.
    pub fn start(&mut self, runtime: &Handle, provider: Arc<WeatherProvider>) {
        if !matches!(self.state, LookupState::Idle) {
            tracing::debug!("Weather lookup for {} already started", self.record.id());
            return;
        }

        let (tx, rx) = mpsc::channel();
        let token = self.cancel.clone();
        let record = self.record.clone();

        runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::debug!("Weather lookup for {} cancelled", record.id());
                }
                result = provider.fetch(&record) => {
                    // The receiver is gone if the view was dismissed meanwhile
                    let _ = tx.send(result);
                }
            }
        });

        self.rx = Some(rx);
        self.state = LookupState::Fetching;
    }

    /// Apply a delivered result, if any, and return the current state.
    pub fn poll(&mut self) -> &LookupState {
        let received = match (&self.state, &self.rx) {
            (LookupState::Fetching, Some(rx)) => rx.try_recv(),
            _ => return &self.state,
        };

        match received {
            Ok(result) => self.finish(result),
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => self.finish(Err(WeatherError::Cancelled)),
        }
        &self.state
    }

    /// Block the calling thread until the fetch finishes.
    ///
    /// Must not be called from a runtime worker thread.
    pub fn wait(&mut self) -> &LookupState {
        let result = match (&self.state, &self.rx) {
            (LookupState::Fetching, Some(rx)) => rx.recv().unwrap_or(Err(WeatherError::Cancelled)),
            _ => return &self.state,
        };

        self.finish(result);
        &self.state
    }

    fn finish(&mut self, result: FetchResult) {
        self.state = match result {
            Ok(snapshot) => LookupState::Succeeded(snapshot),
            Err(WeatherError::Cancelled) => LookupState::Cancelled,
            Err(e) => {
                tracing::warn!("Weather lookup for {} failed: {}", self.record.id(), e);
                LookupState::Failed(e)
            }
        };
        self.rx = None;
    }

    /// Stop the request. A lookup that already finished keeps its result.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        if matches!(self.state, LookupState::Idle | LookupState::Fetching) {
            self.state = LookupState::Cancelled;
            self.rx = None;
        }
    }

    pub fn state(&self) -> &LookupState {
        &self.state
    }

    /// Consume the lookup, keeping its final state.
    pub fn into_state(mut self) -> LookupState {
        std::mem::take(&mut self.state)
    }

    pub fn record_id(&self) -> Uuid {
        self.record.id()
    }
}

impl Drop for WeatherLookup {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for WeatherLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherLookup")
            .field("record", &self.record.id())
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use matchlog_journal::Coordinate;

    fn record() -> MatchRecord {
        MatchRecord::new(Utc::now(), "Team A", "2-1", 2, 1, "great game", Coordinate::FALLBACK, None)
    }

    #[test]
    fn test_new_lookup_is_idle() {
        let lookup = WeatherLookup::new(record());
        assert!(matches!(lookup.state(), LookupState::Idle));
        assert!(!lookup.state().is_finished());
    }

    #[test]
    fn test_poll_without_start_stays_idle() {
        let mut lookup = WeatherLookup::new(record());
        assert!(matches!(lookup.poll(), LookupState::Idle));
        assert!(matches!(lookup.wait(), LookupState::Idle));
    }

    #[test]
    fn test_cancel_idle_lookup() {
        let mut lookup = WeatherLookup::new(record());
        lookup.cancel();
        assert!(matches!(lookup.state(), LookupState::Cancelled));
        assert!(lookup.state().is_finished());
    }

    #[test]
    fn test_state_accessors() {
        let failed = LookupState::Failed(WeatherError::NotConfigured);
        assert!(failed.error().is_some());
        assert!(failed.snapshot().is_none());
        assert!(LookupState::default().error().is_none());
    }
}
