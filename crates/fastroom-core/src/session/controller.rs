//! Session owner: engine, persistence and timebase in one place.
//!
//! Every command follows the same sequence: mutate the engine, write the
//! fields that changed, broadcast the resulting event, then bring the
//! ticker in line with the running flag (cancel first, respawn only if
//! running). Without an attached timebase no periodic work is ever spawned,
//! which is what one-shot CLI invocations want.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};

use super::engine::{FastingSession, SessionSnapshot};
use super::ticker::Ticker;
use crate::clock::Clock;
use crate::error::Result;
use crate::events::Event;
use crate::format::{parse_start_instant, parse_target_hours};
use crate::phase::PhaseTable;
use crate::storage::{KvStore, SessionStore};

const EVENT_CHANNEL_CAPACITY: usize = 64;

pub struct FastController<S: KvStore> {
    session: Arc<Mutex<FastingSession>>,
    store: SessionStore<S>,
    clock: Arc<dyn Clock>,
    events: broadcast::Sender<Event>,
    ticker: Option<Ticker>,
}

impl<S: KvStore> FastController<S> {
    /// Seed a controller from whatever the store holds.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read.
    pub fn load(
        store: S,
        clock: Arc<dyn Clock>,
        phases: PhaseTable,
        default_target_hours: u32,
    ) -> Result<Self> {
        let store = SessionStore::new(store);
        let persisted = store.load(default_target_hours)?;
        let session = FastingSession::restore(Arc::new(phases), &persisted, clock.now_ms());
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            store,
            clock,
            events,
            ticker: None,
        })
    }

    /// Drive the session from a periodic tick. Spawns immediately if the
    /// session is already running. Must be called inside a tokio runtime.
    pub async fn attach_timebase(&mut self, interval: Duration) {
        self.ticker = Some(Ticker::new(interval));
        self.sync_ticker().await;
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().is_some_and(Ticker::is_active)
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().await.snapshot(self.clock.now_ms())
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub async fn start(&mut self) -> Result<Option<Event>> {
        let event = self.mutate(|s, now| s.start(now)).await?;
        if event.is_some() {
            info!("fast started");
        }
        Ok(event)
    }

    pub async fn pause(&mut self) -> Result<Option<Event>> {
        let event = self.mutate(|s, now| s.pause(now)).await?;
        if event.is_some() {
            info!("fast paused");
        }
        Ok(event)
    }

    pub async fn reset(&mut self) -> Result<Event> {
        let event = self.mutate(|s, now| s.reset(now)).await?;
        info!("fast reset");
        Ok(event)
    }

    pub async fn set_start_instant(&mut self, start_ms: i64) -> Result<Event> {
        let event = self
            .mutate(|s, now| s.set_start_instant(start_ms, now))
            .await?;
        info!(start_ms, "start instant moved");
        Ok(event)
    }

    /// Parse and apply a user-typed start instant. Unparseable input is
    /// ignored and yields `Ok(None)`.
    pub async fn set_start_input(&mut self, input: &str) -> Result<Option<Event>> {
        match parse_start_instant(input) {
            Some(start_ms) => self.set_start_instant(start_ms).await.map(Some),
            None => {
                debug!(input, "ignoring unparseable start instant");
                Ok(None)
            }
        }
    }

    /// Apply a new target. Values below one hour are ignored.
    pub async fn set_target_hours(&mut self, hours: i64) -> Result<Option<Event>> {
        let event = self.mutate(|s, now| s.set_target_hours(hours, now)).await?;
        match &event {
            Some(_) => info!(hours, "target changed"),
            None => debug!(hours, "ignoring invalid target hours"),
        }
        Ok(event)
    }

    pub async fn set_target_input(&mut self, input: &str) -> Result<Option<Event>> {
        match parse_target_hours(input) {
            Some(hours) => self.set_target_hours(hours).await,
            None => {
                debug!(input, "ignoring non-numeric target hours");
                Ok(None)
            }
        }
    }

    /// Recompute once from the clock, outside the periodic timebase.
    pub async fn tick(&mut self) -> Option<Event> {
        let now = self.clock.now_ms();
        let event = self.session.lock().await.tick(now);
        if let Some(ref e) = event {
            let _ = self.events.send(e.clone());
        }
        event
    }

    /// Stop periodic work. Further commands still persist but never respawn
    /// the ticker.
    pub fn shutdown(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            ticker.cancel();
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    async fn mutate<T>(&mut self, op: impl FnOnce(&mut FastingSession, i64) -> T) -> Result<T>
    where
        T: Clone + Into<Option<Event>>,
    {
        let now = self.clock.now_ms();
        let (event, before, after) = {
            let mut guard = self.session.lock().await;
            let before = guard.persisted();
            let event = op(&mut *guard, now);
            (event, before, guard.persisted())
        };

        self.store.save_changes(&before, &after)?;
        let outgoing: Option<Event> = event.clone().into();
        if let Some(e) = outgoing {
            let _ = self.events.send(e);
        }
        if before.running != after.running {
            self.sync_ticker().await;
        }
        Ok(event)
    }

    async fn sync_ticker(&mut self) {
        let running = self.session.lock().await.is_running();
        let Some(ticker) = self.ticker.as_mut() else {
            return;
        };
        if running {
            ticker.restart(self.session.clone(), self.clock.clone(), self.events.clone());
        } else {
            ticker.cancel();
        }
    }
}

impl<S: KvStore> Drop for FastController<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
