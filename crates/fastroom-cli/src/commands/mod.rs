pub mod completions;
pub mod config;
pub mod fast;
pub mod phases;
