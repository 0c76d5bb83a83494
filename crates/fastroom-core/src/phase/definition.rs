use serde::{Deserialize, Serialize};

pub const MS_PER_HOUR: u64 = 60 * 60 * 1000;

/// Display reference for a phase. Rendering is left to the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseIcon {
    Leaf,
    Zap,
    Flame,
    HeartPulse,
    ShieldCheck,
    Sparkles,
}

impl PhaseIcon {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseIcon::Leaf => "leaf",
            PhaseIcon::Zap => "zap",
            PhaseIcon::Flame => "flame",
            PhaseIcon::HeartPulse => "heart_pulse",
            PhaseIcon::ShieldCheck => "shield_check",
            PhaseIcon::Sparkles => "sparkles",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Inclusive minimum elapsed duration, in milliseconds.
    pub threshold_ms: u64,
    pub icon: PhaseIcon,
}

impl PhaseDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        threshold_hours: u64,
        icon: PhaseIcon,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            threshold_ms: threshold_hours.saturating_mul(MS_PER_HOUR),
            icon,
        }
    }

    /// Whole hours at which the phase begins (rounded down).
    pub fn threshold_hours(&self) -> u64 {
        self.threshold_ms / MS_PER_HOUR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_converts_hours_to_ms() {
        let p = PhaseDefinition::new("Fat Burning", "", 12, PhaseIcon::Flame);
        assert_eq!(p.threshold_ms, 43_200_000);
        assert_eq!(p.threshold_hours(), 12);
    }

    #[test]
    fn icon_serializes_snake_case() {
        let json = serde_json::to_string(&PhaseIcon::HeartPulse).unwrap();
        assert_eq!(json, "\"heart_pulse\"");
        assert_eq!(PhaseIcon::HeartPulse.as_str(), "heart_pulse");
    }
}
