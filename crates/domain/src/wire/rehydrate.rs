//! Rebuild an editable [`Sequence`] from an uploaded program.
//!
//! Buckets are replayed in X, Y, Z order since the original interleaving is
//! not part of the program. Labels are parsed strictly; numbers leniently.

use std::str::FromStr;

use crate::axis::Axis;
use crate::error::ValidationError;
use crate::sequence::Sequence;
use crate::step::{AxisStepConfig, SequenceStep};
use crate::trigger::{Comparator, Metric, TriggerRole};

use super::{CategorizedProgram, FullPayload, StepData, StepDescriptor};

impl Sequence {
    /// Rehydrate a sequence whose export categorizes back to `program`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for unknown metric or comparator labels,
    /// metrics not allowed for their role/axis, negative duration/count
    /// thresholds, descriptors filed under the wrong axis, or a zero repeat.
    pub fn from_program(program: &CategorizedProgram) -> Result<Self, ValidationError> {
        let mut sequence = Self::new();
        for axis in Axis::ALL {
            for descriptor in program.bucket(axis) {
                sequence.push_step(rehydrate_step(axis, descriptor)?);
            }
        }
        sequence.set_repeat(program.repeat)?;
        Ok(sequence)
    }
}

fn rehydrate_step(bucket: Axis, descriptor: &StepDescriptor) -> Result<SequenceStep, ValidationError> {
    check_axis(bucket, descriptor.axis)?;
    match &descriptor.data {
        StepData::Empty => {
            let mut config = AxisStepConfig::new(bucket);
            config.set_enabled(false);
            Ok(SequenceStep::from_config(config))
        }
        StepData::Full(payload) => {
            check_axis(bucket, payload.axis)?;
            let mut step = SequenceStep::from_config(rehydrate_config(payload)?);
            step.mark_configured();
            Ok(step)
        }
    }
}

fn rehydrate_config(payload: &FullPayload) -> Result<AxisStepConfig, ValidationError> {
    let mut config = AxisStepConfig::new(payload.axis);
    config.set_direction(payload.direction);
    config.set_pulse_interval_ms(payload.step_size);
    for role in TriggerRole::ALL {
        for condition in payload.conditions(role) {
            let metric = Metric::from_str(&condition.trigger_type)?;
            let comparator = Comparator::from_str(&condition.comparator)?;
            config.add_condition(role, metric, comparator, condition.value)?;
        }
        config.set_combinator(role, payload.combinator(role));
    }
    if let Some(force) = payload.hold_threshold.force() {
        config.set_hold_threshold(force);
    }
    Ok(config)
}

fn check_axis(expected: Axis, found: Axis) -> Result<(), ValidationError> {
    if expected == found {
        Ok(())
    } else {
        Err(ValidationError::AxisMismatch { expected, found })
    }
}
