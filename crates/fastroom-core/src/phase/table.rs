//! Ordered phase lookup.
//!
//! The table is sorted once at construction. Lookups binary-search the
//! thresholds, so resolving a phase on every tick never re-sorts.
//!
//! ```text
//! 0h ──── 4h ──── 12h ──── 18h ──── 24h ──── 48h ────▶
//! Anabolic│Catabolic│Fat Burning│Autophagy│Deep     │Advanced (open-ended)
//! ```

use serde::{Deserialize, Serialize};

use super::definition::{PhaseDefinition, PhaseIcon};
use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PhaseDefinition>", into = "Vec<PhaseDefinition>")]
pub struct PhaseTable {
    phases: Vec<PhaseDefinition>,
}

impl PhaseTable {
    /// Build a table from phases in any order.
    ///
    /// # Errors
    ///
    /// Fails when the list is empty, when the lowest threshold is not zero,
    /// or when two phases share a threshold. Each of these would leave some
    /// elapsed duration with zero or two current phases.
    pub fn new(mut phases: Vec<PhaseDefinition>) -> Result<Self, ValidationError> {
        phases.sort_by_key(|p| p.threshold_ms);

        let first = phases
            .first()
            .ok_or_else(|| ValidationError::EmptyCollection("phase table".into()))?;
        if first.threshold_ms != 0 {
            return Err(ValidationError::FirstThresholdNotZero {
                name: first.name.clone(),
                threshold_ms: first.threshold_ms,
            });
        }

        if let Some(pair) = phases
            .windows(2)
            .find(|w| w[0].threshold_ms == w[1].threshold_ms)
        {
            return Err(ValidationError::DuplicateThreshold {
                first: pair[0].name.clone(),
                second: pair[1].name.clone(),
                threshold_ms: pair[0].threshold_ms,
            });
        }

        Ok(Self { phases })
    }

    /// The built-in intermittent fasting phases.
    pub fn standard() -> Self {
        Self {
            phases: vec![
                PhaseDefinition::new(
                    "Anabolic",
                    "Your body is still digesting and absorbing nutrients from your last meal. \
                     Glucose levels are high, and insulin is elevated, promoting energy storage \
                     and inhibiting fat burning. Your body primarily uses glucose for fuel. \
                     Ketone production is minimal or non-existent.",
                    0,
                    PhaseIcon::Leaf,
                ),
                PhaseDefinition::new(
                    "Catabolic / Glycogen Depletion",
                    "Digestion is complete. Your body begins to deplete its stored glycogen \
                     in the liver and muscles. Insulin levels start to drop significantly, and \
                     glucagon levels rise, signaling the body to release stored glucose. Fat \
                     burning gradually increases as glycogen stores diminish. Ketone levels \
                     remain low.",
                    4,
                    PhaseIcon::Zap,
                ),
                PhaseDefinition::new(
                    "Fat Burning / Early Ketosis",
                    "Glycogen stores are significantly depleted. Your body makes a metabolic \
                     switch to primarily burning stored fat for energy. Ketone production \
                     begins in the liver from fatty acids and starts to rise. Insulin levels \
                     are low, and growth hormone levels start to rise, aiding in fat loss and \
                     muscle preservation.",
                    12,
                    PhaseIcon::Flame,
                ),
                PhaseDefinition::new(
                    "Autophagy / Enhanced Ketosis",
                    "Your body is firmly in ketosis, relying heavily on fat and ketones for \
                     fuel. Cellular repair processes, particularly autophagy, become \
                     significantly more active. Growth hormone levels continue to increase, \
                     supporting fat metabolism and muscle maintenance.",
                    18,
                    PhaseIcon::HeartPulse,
                ),
                PhaseDefinition::new(
                    "Deep Autophagy / Immune Regeneration",
                    "Autophagy is highly active, promoting cellular rejuvenation and removal \
                     of damaged cells. Your body may begin to regenerate immune cells. Ketone \
                     levels are consistently high, providing a stable energy source for the \
                     brain and body. Insulin sensitivity improves further.",
                    24,
                    PhaseIcon::ShieldCheck,
                ),
                PhaseDefinition::new(
                    "Advanced Autophagy / Stem Cell Activation",
                    "Autophagy reaches peak levels, offering cellular cleansing and repair. \
                     There is potential for stem cell activation, particularly in the immune \
                     system. Ketone bodies are the primary fuel source, and insulin levels are \
                     at their lowest.",
                    48,
                    PhaseIcon::Sparkles,
                ),
            ],
        }
    }

    pub fn phases(&self) -> &[PhaseDefinition] {
        &self.phases
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PhaseDefinition> {
        self.phases.get(index)
    }

    /// Index of the phase with the greatest threshold not exceeding `elapsed_ms`.
    pub fn current_index(&self, elapsed_ms: u64) -> usize {
        // The first threshold is 0, so at least one phase always matches.
        self.phases
            .partition_point(|p| p.threshold_ms <= elapsed_ms)
            .saturating_sub(1)
    }

    /// Phase active at `elapsed_ms`. The last phase is open-ended.
    pub fn resolve_current(&self, elapsed_ms: u64) -> &PhaseDefinition {
        &self.phases[self.current_index(elapsed_ms)]
    }

    /// Phase with the smallest threshold strictly greater than `elapsed_ms`,
    /// or `None` once the final phase has been entered.
    pub fn resolve_next(&self, elapsed_ms: u64) -> Option<&PhaseDefinition> {
        let idx = self.phases.partition_point(|p| p.threshold_ms <= elapsed_ms);
        self.phases.get(idx)
    }

    /// Human-readable span of a phase, e.g. `"0-4 hours"` or `"48+ hours"`.
    pub fn range_label(&self, index: usize) -> Option<String> {
        let phase = self.phases.get(index)?;
        let label = match self.phases.get(index + 1) {
            Some(next) => format!(
                "{}-{} hours",
                phase.threshold_hours(),
                next.threshold_hours()
            ),
            None => format!("{}+ hours", phase.threshold_hours()),
        };
        Some(label)
    }
}

impl Default for PhaseTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<PhaseDefinition>> for PhaseTable {
    type Error = ValidationError;

    fn try_from(phases: Vec<PhaseDefinition>) -> Result<Self, Self::Error> {
        Self::new(phases)
    }
}

impl From<PhaseTable> for Vec<PhaseDefinition> {
    fn from(table: PhaseTable) -> Self {
        table.phases
    }
}
