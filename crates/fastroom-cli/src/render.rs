//! Text rendering of session snapshots.

use fastroom_core::format::{format_clock_time, format_duration, format_local_datetime};
use fastroom_core::storage::DisplayConfig;
use fastroom_core::{FastState, PhaseDefinition, SessionSnapshot};

const DISCLAIMER: &str =
    "Fasting phase information is for general guidance and not medical advice.";

pub fn phase_title(phase: &PhaseDefinition) -> String {
    format!("[{}] {}", phase.icon.as_str(), phase.name)
}

pub fn state_label(state: FastState) -> &'static str {
    match state {
        FastState::Running => "Fasting in Progress",
        FastState::Paused => "Ready to Start",
    }
}

/// Full multi-line status block.
pub fn status_block(snap: &SessionSnapshot, display: &DisplayConfig) -> String {
    let mut out = Vec::new();
    out.push(format!(
        "{}  {}",
        format_duration(snap.elapsed_ms),
        state_label(snap.state)
    ));

    let started = snap
        .start_ms
        .and_then(format_local_datetime)
        .unwrap_or_else(|| "not set".to_string());
    out.push(format!("Started:    {started}"));

    let mut target = format!(
        "Target:     {} hours ({:.1}%)",
        snap.target_hours, snap.target_progress_pct
    );
    if let Some(end) = snap
        .estimated_end_ms
        .and_then(|ms| format_clock_time(ms, display.clock_24h))
    {
        target.push_str(&format!(", estimated end {end}"));
    }
    out.push(target);

    out.push(format!(
        "Phase:      {} ({})",
        phase_title(&snap.phase),
        snap.phase_range
    ));
    if display.show_description && !snap.phase.description.is_empty() {
        out.push(format!("            {}", snap.phase.description));
    }

    if display.show_next_phase {
        if let Some(next) = &snap.next_phase {
            out.push(format!(
                "Next phase: {} at {} hours (in {})",
                next.name,
                next.threshold_ms / fastroom_core::phase::MS_PER_HOUR,
                format_duration(next.remaining_ms)
            ));
        }
    }

    out.push(String::new());
    out.push(DISCLAIMER.to_string());
    out.join("\n")
}

/// One line per tick for `fast watch`.
pub fn status_line(snap: &SessionSnapshot) -> String {
    let mut line = format!("{}  {}", format_duration(snap.elapsed_ms), snap.phase.name);
    if let Some(next) = &snap.next_phase {
        line.push_str(&format!(
            "  | next: {} in {}",
            next.name,
            format_duration(next.remaining_ms)
        ));
    }
    if snap.state == FastState::Paused {
        line.push_str("  (paused)");
    }
    line
}

pub fn print_snapshot(
    snap: &SessionSnapshot,
    display: &DisplayConfig,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(snap)?);
    } else {
        println!("{}", status_block(snap, display));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastroom_core::{FastingSession, PhaseTable};
    use std::sync::Arc;

    const T0: i64 = 1_700_000_000_000;

    #[test]
    fn status_line_shows_next_phase() {
        let mut session = FastingSession::new(Arc::new(PhaseTable::standard()), 18);
        session.start(T0);
        session.tick(T0 + 3_600_000);
        let line = status_line(&session.snapshot(T0 + 3_600_000));
        assert!(line.starts_with("01:00:00  Anabolic"));
        assert!(line.contains("next: Catabolic / Glycogen Depletion in 03:00:00"));
    }

    #[test]
    fn status_block_hides_description_when_disabled() {
        let session = FastingSession::new(Arc::new(PhaseTable::standard()), 18);
        let display = DisplayConfig {
            show_description: false,
            ..DisplayConfig::default()
        };
        let block = status_block(&session.snapshot(T0), &display);
        assert!(block.contains("Ready to Start"));
        assert!(block.contains("Started:    not set"));
        assert!(!block.contains("still digesting"));
    }
}
