//! Background refresh of the currently selected city.

use std::{sync::Arc, time::Duration};

use parking_lot::RwLock;
use tokio::{sync::watch, task::JoinHandle, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{catalog::CityCatalog, provider::WeatherProvider, scheduler::fetch_with_timeout};

/// The city the display layer is showing. Shared between the display and the
/// refresher; read once per tick.
#[derive(Debug, Clone, Default)]
pub struct Selection(Arc<RwLock<Option<String>>>);

impl Selection {
    pub fn new(city: Option<String>) -> Self {
        Self(Arc::new(RwLock::new(city)))
    }

    pub fn set(&self, city: impl Into<String>) {
        *self.0.write() = Some(city.into());
    }

    pub fn clear(&self) {
        *self.0.write() = None;
    }

    pub fn get(&self) -> Option<String> {
        self.0.read().clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefresherState {
    Idle,
    Fetching,
}

/// Owner handle for a running refresher. Dropping it leaves the task running
/// until the runtime shuts down; call [`RefresherHandle::stop`] to end it.
#[derive(Debug)]
pub struct RefresherHandle {
    cancel: CancellationToken,
    state: watch::Receiver<RefresherState>,
    task: JoinHandle<()>,
}

impl RefresherHandle {
    pub fn state(&self) -> RefresherState {
        *self.state.borrow()
    }

    /// Receiver that changes on every Idle/Fetching transition.
    pub fn subscribe(&self) -> watch::Receiver<RefresherState> {
        self.state.clone()
    }

    /// Signal the loop to exit and wait for it. An in-flight fetch is abandoned.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(err) = self.task.await {
            tracing::warn!(error = %err, "refresher task ended abnormally");
        }
    }
}

pub struct Refresher {
    provider: Arc<dyn WeatherProvider>,
    catalog: CityCatalog,
    selection: Selection,
    interval: Duration,
    timeout: Duration,
}

impl Refresher {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        catalog: CityCatalog,
        selection: Selection,
        interval: Duration,
        timeout: Duration,
    ) -> Self {
        Self { provider, catalog, selection, interval, timeout }
    }

    /// Start the tick loop. The first refresh happens one interval from now.
    pub fn spawn(self) -> RefresherHandle {
        let cancel = CancellationToken::new();
        let (state_tx, state_rx) = watch::channel(RefresherState::Idle);
        let task = tokio::spawn(self.run(cancel.clone(), state_tx));

        RefresherHandle { cancel, state: state_rx, task }
    }

    async fn run(self, cancel: CancellationToken, state: watch::Sender<RefresherState>) {
        let start = tokio::time::Instant::now() + self.interval;
        let mut ticker = tokio::time::interval_at(start, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(interval_secs = self.interval.as_secs_f64(), "refresher started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let Some(city) = self.selection.get() else {
                tracing::debug!("no city selected, skipping refresh");
                continue;
            };

            state.send_replace(RefresherState::Fetching);
            let fetch = fetch_with_timeout(self.provider.as_ref(), &city, self.timeout);
            let record = tokio::select! {
                _ = cancel.cancelled() => {
                    state.send_replace(RefresherState::Idle);
                    break;
                }
                record = fetch => record,
            };

            tracing::debug!(city = %record.city_name, valid = record.is_valid, "refreshed selected city");
            self.catalog.upsert(record);
            state.send_replace(RefresherState::Idle);
        }

        tracing::info!("refresher stopped");
    }
}
