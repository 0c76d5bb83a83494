//! The periodic timebase.
//!
//! At most one tick task exists per [`Ticker`]. `restart` always aborts the
//! previous task before spawning, and dropping the ticker aborts whatever
//! is still running, so no tick can mutate a session after teardown.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

use super::engine::FastingSession;
use crate::clock::Clock;
use crate::events::Event;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct Ticker {
    handle: Option<JoinHandle<()>>,
    interval: Duration,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Self {
            handle: None,
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Replace the tick task. Must be called from inside a tokio runtime.
    ///
    /// The task exits on its own if it observes a paused session, but the
    /// owner is expected to `cancel` on pause rather than rely on that.
    pub fn restart(
        &mut self,
        session: Arc<Mutex<FastingSession>>,
        clock: Arc<dyn Clock>,
        events: broadcast::Sender<Event>,
    ) {
        self.cancel();

        let period = self.interval;
        self.handle = Some(tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;

                let (entered, snapshot) = {
                    let mut guard = session.lock().await;
                    if !guard.is_running() {
                        debug!("tick task observed paused session, exiting");
                        break;
                    }
                    let now = clock.now_ms();
                    (guard.tick(now), guard.snapshot(now))
                };

                // No receivers is fine: nobody is watching.
                if let Some(event) = entered {
                    let _ = events.send(event);
                }
                let _ = events.send(Event::StateSnapshot(snapshot));
            }
        }));
        debug!(interval_ms = period.as_millis() as u64, "tick task started");
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("tick task cancelled");
        }
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::phase::{PhaseTable, MS_PER_HOUR};

    const T0: i64 = 1_700_000_000_000;

    fn running_session(clock: &ManualClock) -> Arc<Mutex<FastingSession>> {
        let mut session = FastingSession::new(Arc::new(PhaseTable::standard()), 18);
        session.start(clock.now_ms());
        Arc::new(Mutex::new(session))
    }

    #[tokio::test(start_paused = true)]
    async fn emits_snapshots_while_running() {
        let clock = Arc::new(ManualClock::new(T0));
        let session = running_session(&clock);
        let (tx, mut rx) = broadcast::channel(16);

        let mut ticker = Ticker::default();
        ticker.restart(session.clone(), clock.clone(), tx);
        assert!(ticker.is_active());

        clock.advance(3_000);
        match rx.recv().await.unwrap() {
            Event::StateSnapshot(snap) => assert_eq!(snap.elapsed_ms, 3_000),
            other => panic!("Expected StateSnapshot, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn emits_phase_entered_on_boundary() {
        let clock = Arc::new(ManualClock::new(T0));
        let session = running_session(&clock);
        let (tx, mut rx) = broadcast::channel(16);

        let mut ticker = Ticker::default();
        clock.advance(4 * MS_PER_HOUR as i64);
        ticker.restart(session, clock.clone(), tx);

        match rx.recv().await.unwrap() {
            Event::PhaseEntered { phase_index, .. } => assert_eq!(phase_index, 1),
            other => panic!("Expected PhaseEntered, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_previous_task() {
        let clock = Arc::new(ManualClock::new(T0));
        let session = running_session(&clock);
        let (tx, mut rx) = broadcast::channel(64);

        let mut ticker = Ticker::default();
        ticker.restart(session.clone(), clock.clone(), tx.clone());
        ticker.restart(session.clone(), clock.clone(), tx.clone());

        // Two live tasks would produce two snapshots per period.
        time::sleep(Duration::from_millis(2_500)).await;
        let mut count = 0;
        while rx.try_recv().is_ok() {
            count += 1;
        }
        assert_eq!(count, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_and_drop_stop_ticks() {
        let clock = Arc::new(ManualClock::new(T0));
        let session = running_session(&clock);
        let (tx, mut rx) = broadcast::channel(16);

        let mut ticker = Ticker::default();
        ticker.restart(session.clone(), clock.clone(), tx.clone());
        ticker.cancel();
        assert!(!ticker.is_active());

        ticker.restart(session.clone(), clock.clone(), tx);
        drop(ticker);

        time::sleep(Duration::from_secs(5)).await;
        // Anything sent before the abort landed is allowed; nothing after.
        while rx.try_recv().is_ok() {}
        time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn task_exits_when_session_paused() {
        let clock = Arc::new(ManualClock::new(T0));
        let session = running_session(&clock);
        let (tx, _rx) = broadcast::channel(16);

        session.lock().await.pause(T0);
        let mut ticker = Ticker::default();
        ticker.restart(session, clock, tx);

        time::sleep(Duration::from_millis(10)).await;
        assert!(!ticker.is_active());
    }
}
