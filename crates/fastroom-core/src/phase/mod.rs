mod definition;
mod table;

pub use definition::{PhaseDefinition, PhaseIcon, MS_PER_HOUR};
pub use table::PhaseTable;
