use clap::Subcommand;
use fastroom_core::phase::MS_PER_HOUR;
use fastroom_core::Config;

use crate::render;

#[derive(Subcommand)]
pub enum PhasesAction {
    /// List every phase in order
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the phase reached after a number of hours
    At {
        /// Elapsed hours, fractions allowed
        #[arg(allow_negative_numbers = true)]
        hours: f64,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: PhasesAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let table = config.phase_table();

    match action {
        PhasesAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&table)?);
            } else {
                for (index, phase) in table.phases().iter().enumerate() {
                    println!(
                        "{} ({})",
                        render::phase_title(phase),
                        table.range_label(index).unwrap_or_default()
                    );
                    if config.display.show_description {
                        println!("    {}", phase.description);
                    }
                }
            }
        }
        PhasesAction::At { hours, json } => {
            if !hours.is_finite() {
                return Err(format!("invalid hours: {hours}").into());
            }
            // Negative durations clamp to the first phase.
            let elapsed_ms = (hours.max(0.0) * MS_PER_HOUR as f64) as u64;
            let index = table.current_index(elapsed_ms);
            let current = table.resolve_current(elapsed_ms);
            if json {
                let value = serde_json::json!({
                    "elapsed_ms": elapsed_ms,
                    "phase_index": index,
                    "phase": current,
                    "next_phase": table.resolve_next(elapsed_ms),
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("Elapsed hours: {hours}");
                println!("  Phase: {}", render::phase_title(current));
                if config.display.show_description {
                    println!("  {}", current.description);
                }
                if let Some(next) = table.resolve_next(elapsed_ms) {
                    println!(
                        "  Next:  {} (at {} hours)",
                        next.name,
                        next.threshold_hours()
                    );
                }
            }
        }
    }
    Ok(())
}
