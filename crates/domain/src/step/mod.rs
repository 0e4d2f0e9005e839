//! Sequence step — one axis action with a stable identity.
//!
//! A step wraps an [`AxisStepConfig`] and tracks where it is in its
//! lifecycle. Every configuration edit goes through the step so that the
//! first meaningful edit moves it from `Unconfigured` to `Configured`.
//! Toggling `enabled` is orthogonal and never changes the lifecycle state.

mod config;
pub mod summary;

pub use config::{AxisStepConfig, DEFAULT_HOLD_THRESHOLD, DEFAULT_PULSE_INTERVAL_MS};

use serde::Serialize;

use crate::axis::{Axis, Direction};
use crate::error::{GeckoError, ValidationError};
use crate::id::{ConditionId, StepId};
use crate::trigger::{Combinator, Comparator, Metric, TriggerRole};
use crate::wire::StepDescriptor;

/// Lifecycle state of a [`SequenceStep`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    /// Freshly created: enabled, no triggers, default direction and pulse.
    #[default]
    Unconfigured,
    /// At least one trigger, direction or pulse edit happened.
    Configured,
    /// Taken out of its sequence. Terminal.
    Removed,
}

/// One axis action in a [`Sequence`](crate::sequence::Sequence).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceStep {
    id: StepId,
    state: StepState,
    config: AxisStepConfig,
}

impl SequenceStep {
    /// Create an unconfigured step for `axis`.
    #[must_use]
    pub fn new(axis: Axis) -> Self {
        Self::from_config(AxisStepConfig::new(axis))
    }

    pub(crate) fn from_config(config: AxisStepConfig) -> Self {
        Self {
            id: StepId::new(),
            state: StepState::Unconfigured,
            config,
        }
    }

    #[must_use]
    pub fn id(&self) -> StepId {
        self.id
    }

    #[must_use]
    pub fn axis(&self) -> Axis {
        self.config.axis()
    }

    #[must_use]
    pub fn state(&self) -> StepState {
        self.state
    }

    #[must_use]
    pub fn config(&self) -> &AxisStepConfig {
        &self.config
    }

    pub(crate) fn mark_removed(&mut self) {
        self.state = StepState::Removed;
    }

    pub(crate) fn mark_configured(&mut self) {
        if self.state == StepState::Unconfigured {
            self.state = StepState::Configured;
        }
    }

    /// Human-readable description of the step's gating logic.
    #[must_use]
    pub fn summary(&self) -> String {
        self.config.summary()
    }

    /// Wire descriptor; `data` is empty while the step is disabled.
    #[must_use]
    pub fn export(&self) -> StepDescriptor {
        StepDescriptor::from_config(&self.config)
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.set_enabled(enabled);
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.config.set_direction(direction);
        self.mark_configured();
    }

    pub fn set_pulse_interval_ms(&mut self, pulse_interval_ms: u32) {
        self.config.set_pulse_interval_ms(pulse_interval_ms);
        self.mark_configured();
    }

    pub fn set_combinator(&mut self, role: TriggerRole, combinator: Combinator) {
        self.config.set_combinator(role, combinator);
    }

    /// See [`AxisStepConfig::set_hold_threshold`].
    pub fn set_hold_threshold(&mut self, force: f64) -> bool {
        self.config.set_hold_threshold(force)
    }

    /// See [`AxisStepConfig::add_condition`].
    ///
    /// # Errors
    ///
    /// Propagates the config's [`ValidationError`].
    pub fn add_condition(
        &mut self,
        role: TriggerRole,
        metric: Metric,
        comparator: Comparator,
        threshold: f64,
    ) -> Result<ConditionId, ValidationError> {
        let id = self
            .config
            .add_condition(role, metric, comparator, threshold)?;
        self.mark_configured();
        Ok(id)
    }

    /// See [`AxisStepConfig::add_default_condition`].
    pub fn add_default_condition(&mut self, role: TriggerRole) -> ConditionId {
        let id = self.config.add_default_condition(role);
        self.mark_configured();
        id
    }

    /// See [`AxisStepConfig::remove_condition`].
    pub fn remove_condition(&mut self, role: TriggerRole, id: ConditionId) -> bool {
        self.config.remove_condition(role, id)
    }

    /// See [`AxisStepConfig::set_condition_metric`].
    ///
    /// # Errors
    ///
    /// Propagates the config's [`GeckoError`].
    pub fn set_condition_metric(
        &mut self,
        role: TriggerRole,
        id: ConditionId,
        metric: Metric,
    ) -> Result<(), GeckoError> {
        self.config.set_condition_metric(role, id, metric)
    }

    /// See [`AxisStepConfig::set_condition_comparator`].
    ///
    /// # Errors
    ///
    /// Propagates the config's [`GeckoError`].
    pub fn set_condition_comparator(
        &mut self,
        role: TriggerRole,
        id: ConditionId,
        comparator: Comparator,
    ) -> Result<(), GeckoError> {
        self.config.set_condition_comparator(role, id, comparator)
    }

    /// See [`AxisStepConfig::set_condition_threshold`].
    ///
    /// # Errors
    ///
    /// Propagates the config's [`GeckoError`].
    pub fn set_condition_threshold(
        &mut self,
        role: TriggerRole,
        id: ConditionId,
        threshold: f64,
    ) -> Result<(), GeckoError> {
        self.config.set_condition_threshold(role, id, threshold)
    }
}
