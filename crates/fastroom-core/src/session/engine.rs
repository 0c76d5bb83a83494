//! Fasting session engine.
//!
//! A wall-clock-based state machine with no internal thread. Every command
//! takes the current instant, so the engine is deterministic under test and
//! the caller decides where time comes from.
//!
//! ## State Transitions
//!
//! ```text
//! Paused --start--> Running --pause--> Paused
//!   ^                  |
//!   +------reset-------+   (reset from either state, fresh start instant)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut session = FastingSession::new(Arc::new(PhaseTable::standard()), 18);
//! session.start(clock.now_ms());
//! // Once per second while running:
//! session.tick(clock.now_ms()); // Some(Event::PhaseEntered) on a boundary
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::{timestamp, Event};
use crate::phase::{PhaseDefinition, PhaseTable, MS_PER_HOUR};

pub const DEFAULT_TARGET_HOURS: u32 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FastState {
    Running,
    Paused,
}

/// Session fields as they live in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub running: bool,
    pub start_ms: Option<i64>,
    pub target_hours: u32,
    /// Elapsed duration displayed while paused.
    pub frozen_elapsed_ms: u64,
}

impl Default for PersistedSession {
    fn default() -> Self {
        Self {
            running: false,
            start_ms: None,
            target_hours: DEFAULT_TARGET_HOURS,
            frozen_elapsed_ms: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextPhase {
    pub index: usize,
    pub name: String,
    pub threshold_ms: u64,
    pub remaining_ms: u64,
}

/// Everything a front end needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub state: FastState,
    pub start_ms: Option<i64>,
    pub target_hours: u32,
    pub elapsed_ms: u64,
    pub phase_index: usize,
    pub phase: PhaseDefinition,
    pub phase_range: String,
    pub next_phase: Option<NextPhase>,
    pub estimated_end_ms: Option<i64>,
    /// 0.0 .. 100.0 progress toward the target duration.
    pub target_progress_pct: f64,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct FastingSession {
    phases: Arc<PhaseTable>,
    state: FastState,
    start_ms: Option<i64>,
    target_hours: u32,
    /// Last computed elapsed duration. Frozen while paused.
    elapsed_ms: u64,
    phase_index: usize,
}

impl FastingSession {
    /// A paused session with no start instant.
    pub fn new(phases: Arc<PhaseTable>, target_hours: u32) -> Self {
        Self {
            phases,
            state: FastState::Paused,
            start_ms: None,
            target_hours: target_hours.max(1),
            elapsed_ms: 0,
            phase_index: 0,
        }
    }

    /// Rebuild a session from persisted fields.
    ///
    /// A running session recomputes elapsed time from `now`; a paused one
    /// shows the elapsed value it was frozen at.
    pub fn restore(phases: Arc<PhaseTable>, persisted: &PersistedSession, now_ms: i64) -> Self {
        let mut session = Self::new(phases, persisted.target_hours);
        session.start_ms = persisted.start_ms;
        if persisted.running {
            session.state = FastState::Running;
            session.recompute(now_ms);
        } else {
            session.set_elapsed(persisted.frozen_elapsed_ms);
        }
        session
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> FastState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == FastState::Running
    }

    pub fn start_ms(&self) -> Option<i64> {
        self.start_ms
    }

    pub fn target_hours(&self) -> u32 {
        self.target_hours
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn phases(&self) -> &PhaseTable {
        &self.phases
    }

    pub fn phase_index(&self) -> usize {
        self.phase_index
    }

    pub fn current_phase(&self) -> &PhaseDefinition {
        self.phases.resolve_current(self.elapsed_ms)
    }

    pub fn next_phase(&self) -> Option<&PhaseDefinition> {
        self.phases.resolve_next(self.elapsed_ms)
    }

    /// Time left until the next phase begins, if there is one.
    pub fn remaining_to_next_ms(&self) -> Option<u64> {
        self.next_phase()
            .map(|p| p.threshold_ms.saturating_sub(self.elapsed_ms))
    }

    pub fn target_ms(&self) -> u64 {
        u64::from(self.target_hours).saturating_mul(MS_PER_HOUR)
    }

    pub fn estimated_end_ms(&self) -> Option<i64> {
        let target = i64::try_from(self.target_ms()).unwrap_or(i64::MAX);
        self.start_ms.map(|start| start.saturating_add(target))
    }

    pub fn target_progress_pct(&self) -> f64 {
        let target = self.target_ms();
        if target == 0 {
            return 0.0;
        }
        (self.elapsed_ms as f64 / target as f64 * 100.0).min(100.0)
    }

    pub fn persisted(&self) -> PersistedSession {
        PersistedSession {
            running: self.is_running(),
            start_ms: self.start_ms,
            target_hours: self.target_hours,
            frozen_elapsed_ms: self.elapsed_ms,
        }
    }

    pub fn snapshot(&self, now_ms: i64) -> SessionSnapshot {
        let next_phase = self.next_phase().map(|p| NextPhase {
            index: self.phase_index + 1,
            name: p.name.clone(),
            threshold_ms: p.threshold_ms,
            remaining_ms: p.threshold_ms.saturating_sub(self.elapsed_ms),
        });
        SessionSnapshot {
            state: self.state,
            start_ms: self.start_ms,
            target_hours: self.target_hours,
            elapsed_ms: self.elapsed_ms,
            phase_index: self.phase_index,
            phase: self.current_phase().clone(),
            phase_range: self
                .phases
                .range_label(self.phase_index)
                .unwrap_or_default(),
            next_phase,
            estimated_end_ms: self.estimated_end_ms(),
            target_progress_pct: self.target_progress_pct(),
            at: timestamp(now_ms),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin or resume counting from the current start instant.
    ///
    /// Unlike a plain resume, a session that has never had a start instant
    /// gets one: it starts at `now`.
    pub fn start(&mut self, now_ms: i64) -> Option<Event> {
        if self.is_running() {
            return None;
        }
        let start_ms = *self.start_ms.get_or_insert(now_ms);
        self.state = FastState::Running;
        self.recompute(now_ms);
        Some(Event::FastStarted {
            start_ms,
            elapsed_ms: self.elapsed_ms,
            at: timestamp(now_ms),
        })
    }

    /// Stop advancing. The elapsed value stays at the last tick.
    pub fn pause(&mut self, now_ms: i64) -> Option<Event> {
        if !self.is_running() {
            return None;
        }
        self.state = FastState::Paused;
        Some(Event::FastPaused {
            elapsed_ms: self.elapsed_ms,
            at: timestamp(now_ms),
        })
    }

    /// Pause and restart the clock at `now`, whatever the current state.
    pub fn reset(&mut self, now_ms: i64) -> Event {
        self.state = FastState::Paused;
        self.start_ms = Some(now_ms);
        self.set_elapsed(0);
        Event::FastReset {
            start_ms: now_ms,
            estimated_end_ms: self.estimated_end_ms(),
            at: timestamp(now_ms),
        }
    }

    /// Move the start instant. A running session re-derives elapsed time
    /// immediately; a paused one shows zero until it is started again.
    pub fn set_start_instant(&mut self, start_ms: i64, now_ms: i64) -> Event {
        self.start_ms = Some(start_ms);
        if self.is_running() {
            self.recompute(now_ms);
        } else {
            self.set_elapsed(0);
        }
        Event::StartInstantChanged {
            start_ms,
            elapsed_ms: self.elapsed_ms,
            estimated_end_ms: self.estimated_end_ms(),
            at: timestamp(now_ms),
        }
    }

    /// Change the goal length. Anything below one hour is ignored.
    pub fn set_target_hours(&mut self, hours: i64, now_ms: i64) -> Option<Event> {
        let hours = u32::try_from(hours).ok().filter(|h| *h >= 1)?;
        self.target_hours = hours;
        Some(Event::TargetChanged {
            target_hours: hours,
            estimated_end_ms: self.estimated_end_ms(),
            at: timestamp(now_ms),
        })
    }

    /// Call once per timebase period. Returns `Some(Event::PhaseEntered)`
    /// when elapsed time crosses into a different phase.
    pub fn tick(&mut self, now_ms: i64) -> Option<Event> {
        if !self.is_running() {
            return None;
        }
        let before = self.phase_index;
        self.recompute(now_ms);
        if self.phase_index == before {
            return None;
        }
        Some(Event::PhaseEntered {
            phase_index: self.phase_index,
            phase_name: self.current_phase().name.clone(),
            elapsed_ms: self.elapsed_ms,
            at: timestamp(now_ms),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn recompute(&mut self, now_ms: i64) {
        let elapsed = match self.start_ms {
            Some(start) => u64::try_from(now_ms.saturating_sub(start)).unwrap_or(0),
            None => 0,
        };
        self.set_elapsed(elapsed);
    }

    fn set_elapsed(&mut self, elapsed_ms: u64) {
        self.elapsed_ms = elapsed_ms;
        self.phase_index = self.phases.current_index(elapsed_ms);
    }
}
