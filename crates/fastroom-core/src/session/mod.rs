mod controller;
mod engine;
mod ticker;

pub use controller::FastController;
pub use engine::{
    FastState, FastingSession, NextPhase, PersistedSession, SessionSnapshot, DEFAULT_TARGET_HOURS,
};
pub use ticker::{Ticker, DEFAULT_TICK_INTERVAL};
