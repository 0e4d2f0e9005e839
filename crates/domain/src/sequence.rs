//! Sequence — the ordered list of axis steps an operator builds.

use serde::Serialize;

use crate::axis::Axis;
use crate::error::{NotFoundError, ValidationError};
use crate::id::StepId;
use crate::step::SequenceStep;
use crate::wire::{CategorizedProgram, StepDescriptor};

/// Ordered steps plus the program-level repeat count.
///
/// Insertion order is the intended execution order; [`program`](Self::program)
/// regroups it per axis for the executor.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Sequence {
    steps: Vec<SequenceStep>,
    repeat: Option<u32>,
}

impl Sequence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fresh step for `axis` and return its id.
    pub fn add_step(&mut self, axis: Axis) -> StepId {
        let step = SequenceStep::new(axis);
        let id = step.id();
        self.steps.push(step);
        id
    }

    pub(crate) fn push_step(&mut self, step: SequenceStep) {
        self.steps.push(step);
    }

    /// Take the step out of the sequence. Unknown ids return `None`.
    pub fn remove_step(&mut self, id: StepId) -> Option<SequenceStep> {
        let index = self.steps.iter().position(|s| s.id() == id)?;
        let mut step = self.steps.remove(index);
        step.mark_removed();
        Some(step)
    }

    #[must_use]
    pub fn step(&self, id: StepId) -> Option<&SequenceStep> {
        self.steps.iter().find(|s| s.id() == id)
    }

    pub fn step_mut(&mut self, id: StepId) -> Option<&mut SequenceStep> {
        self.steps.iter_mut().find(|s| s.id() == id)
    }

    /// Like [`step_mut`](Self::step_mut), for callers that must edit an existing step.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] if no step has this id.
    pub fn require_step_mut(&mut self, id: StepId) -> Result<&mut SequenceStep, NotFoundError> {
        self.step_mut(id).ok_or_else(|| NotFoundError {
            entity: "Step",
            id: id.to_string(),
        })
    }

    #[must_use]
    pub fn steps(&self) -> &[SequenceStep] {
        &self.steps
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Display labels from the current positions: `Step 1: Move X Axis`, …
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.steps
            .iter()
            .enumerate()
            .map(|(i, step)| format!("Step {}: Move {} Axis", i + 1, step.axis()))
            .collect()
    }

    #[must_use]
    pub fn repeat(&self) -> Option<u32> {
        self.repeat
    }

    /// Set how many times the executor runs the program; `None` leaves it to the executor.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ZeroRepeat`] for `Some(0)`.
    pub fn set_repeat(&mut self, repeat: Option<u32>) -> Result<(), ValidationError> {
        if repeat == Some(0) {
            return Err(ValidationError::ZeroRepeat);
        }
        self.repeat = repeat;
        Ok(())
    }

    /// One descriptor per step, in insertion order.
    #[must_use]
    pub fn export(&self) -> Vec<StepDescriptor> {
        self.steps.iter().map(SequenceStep::export).collect()
    }

    /// Group descriptors into per-axis buckets, keeping same-axis order.
    #[must_use]
    pub fn categorize(descriptors: &[StepDescriptor]) -> CategorizedProgram {
        CategorizedProgram::from_descriptors(descriptors)
    }

    /// The payload submitted for a run or written to a downloaded file.
    #[must_use]
    pub fn program(&self) -> CategorizedProgram {
        CategorizedProgram {
            repeat: self.repeat,
            ..Self::categorize(&self.export())
        }
    }
}
