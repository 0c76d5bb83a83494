//! # Fastroom Core Library
//!
//! Core logic for the Fastroom intermittent-fasting tracker. The CLI is a
//! thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Phase Table**: an immutable, pre-sorted list of fasting phases keyed
//!   by elapsed-duration thresholds
//! - **Session Engine**: a wall-clock-based state machine that requires the
//!   caller to invoke `tick()` for progress updates
//! - **Controller**: owns the engine, writes every change to the kv store,
//!   and runs at most one periodic tick task
//! - **Storage**: SQLite kv table for session fields, TOML configuration
//!
//! ## Key Components
//!
//! - [`PhaseTable`]: phase lookup
//! - [`FastingSession`]: session state machine
//! - [`FastController`]: persistence and timebase around the session
//! - [`Database`]: kv persistence
//! - [`Config`]: application configuration

pub mod clock;
pub mod error;
pub mod events;
pub mod format;
pub mod phase;
pub mod session;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use phase::{PhaseDefinition, PhaseIcon, PhaseTable};
pub use session::{FastController, FastState, FastingSession, SessionSnapshot};
pub use storage::{Config, Database, KvStore, MemoryStore, SessionStore};
