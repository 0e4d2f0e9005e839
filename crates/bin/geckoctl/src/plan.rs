//! Sequence sources — TOML plan files and exported JSON programs.
//!
//! A plan describes a sequence the way an operator edits it:
//!
//! ```toml
//! repeat = 2
//!
//! [[steps]]
//! axis = "Z"
//! direction = "negative"
//! pulse_interval_ms = 2
//! hold_threshold = 0.5
//!
//! [steps.stop]
//! combinator = "all"
//! conditions = [{ metric = "Fz (N)", comparator = ">=", threshold = 5 }]
//!
//! [steps.hold]
//! conditions = [{ metric = "duration (sec)", threshold = "30" }]
//! ```
//!
//! Plans go through the same step operations as interactive edits, so every
//! role/axis rule applies. Numbers may also be written as text and are read
//! leniently.

use std::path::Path;

use serde::Deserialize;

use gecko_domain::axis::{Axis, Direction};
use gecko_domain::error::{NotFoundError, ValidationError};
use gecko_domain::input::{parse_lenient_number, parse_lenient_pulse};
use gecko_domain::sequence::Sequence;
use gecko_domain::step::SequenceStep;
use gecko_domain::trigger::{Combinator, Comparator, Metric, TriggerRole};
use gecko_domain::wire::CategorizedProgram;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Plan {
    #[serde(default)]
    pub repeat: Option<u32>,
    #[serde(default)]
    pub steps: Vec<PlanStep>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanStep {
    pub axis: Axis,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub direction: Option<Direction>,
    #[serde(default)]
    pub pulse_interval_ms: Option<Lenient>,
    #[serde(default)]
    pub hold_threshold: Option<Lenient>,
    #[serde(default)]
    pub init: Option<PlanTriggers>,
    #[serde(default)]
    pub stop: Option<PlanTriggers>,
    #[serde(default)]
    pub hold: Option<PlanTriggers>,
}

fn enabled_by_default() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanTriggers {
    #[serde(default)]
    pub combinator: Combinator,
    #[serde(default)]
    pub conditions: Vec<PlanCondition>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanCondition {
    /// Metric label, with or without unit (`"Fz (N)"` or `"Fz"`).
    pub metric: String,
    #[serde(default = "default_comparator")]
    pub comparator: String,
    pub threshold: Lenient,
}

fn default_comparator() -> String {
    Comparator::default().symbol().to_string()
}

/// A number typed either as a TOML number or as text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Lenient {
    Number(f64),
    Text(String),
}

impl Lenient {
    fn number(&self) -> f64 {
        match self {
            Self::Number(value) if value.is_finite() => *value,
            Self::Number(_) => 0.0,
            Self::Text(text) => parse_lenient_number(text),
        }
    }

    fn pulse(&self) -> u32 {
        match self {
            Self::Number(value) => parse_lenient_pulse(&value.to_string()),
            Self::Text(text) => parse_lenient_pulse(text),
        }
    }
}

/// Why a sequence source could not be turned into a sequence.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("failed to read {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed plan file")]
    Toml(#[from] toml::de::Error),
    #[error("malformed program file")]
    Json(#[from] serde_json::Error),
    #[error("step {position}: {source}")]
    Step {
        position: usize,
        #[source]
        source: ValidationError,
    },
    #[error(transparent)]
    Program(#[from] ValidationError),
    #[error(transparent)]
    Missing(#[from] NotFoundError),
}

impl Plan {
    /// Build the sequence this plan describes.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Step`] naming the 1-based step whose conditions
    /// break a trigger rule, or [`PlanError::Program`] for a zero repeat.
    pub fn to_sequence(&self) -> Result<Sequence, PlanError> {
        let mut sequence = Sequence::new();
        for (index, planned) in self.steps.iter().enumerate() {
            let id = sequence.add_step(planned.axis);
            let step = sequence.require_step_mut(id)?;
            planned.apply(step).map_err(|source| PlanError::Step {
                position: index + 1,
                source,
            })?;
        }
        sequence.set_repeat(self.repeat)?;
        Ok(sequence)
    }
}

impl PlanStep {
    fn apply(&self, step: &mut SequenceStep) -> Result<(), ValidationError> {
        step.set_enabled(self.enabled);
        if let Some(direction) = self.direction {
            step.set_direction(direction);
        }
        if let Some(pulse) = &self.pulse_interval_ms {
            step.set_pulse_interval_ms(pulse.pulse());
        }
        for (role, triggers) in [
            (TriggerRole::Init, &self.init),
            (TriggerRole::Stop, &self.stop),
            (TriggerRole::Hold, &self.hold),
        ] {
            let Some(triggers) = triggers else {
                continue;
            };
            step.set_combinator(role, triggers.combinator);
            for condition in &triggers.conditions {
                let metric: Metric = condition.metric.parse()?;
                let comparator: Comparator = condition.comparator.parse()?;
                step.add_condition(role, metric, comparator, condition.threshold.number())?;
            }
        }
        if let Some(force) = &self.hold_threshold {
            if !step.set_hold_threshold(force.number()) {
                tracing::warn!(axis = %step.axis(), "hold threshold ignored without hold conditions");
            }
        }
        Ok(())
    }
}

/// Load a sequence from a plan (`.toml`) or an exported program (`.json`).
///
/// # Errors
///
/// Returns a [`PlanError`] when the file cannot be read, parsed or applied.
pub fn load_sequence(path: &Path) -> Result<Sequence, PlanError> {
    let text = std::fs::read_to_string(path).map_err(|source| PlanError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        let program = CategorizedProgram::from_json(&text)?;
        Ok(Sequence::from_program(&program)?)
    } else {
        let plan: Plan = toml::from_str(&text)?;
        plan.to_sequence()
    }
}
