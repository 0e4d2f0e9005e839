//! Axis step configuration — one axis's movement and trigger gates.

use serde::Serialize;

use crate::axis::{Axis, Direction};
use crate::error::{GeckoError, NotFoundError, ValidationError};
use crate::id::ConditionId;
use crate::trigger::{
    Combinator, Comparator, DEFAULT_THRESHOLD, Metric, TriggerCondition, TriggerRole, TriggerSet,
};

/// Pulse interval a new step starts with, in milliseconds.
pub const DEFAULT_PULSE_INTERVAL_MS: u32 = 1;

/// Force held once movement stops, when the operator adds the first hold trigger.
pub const DEFAULT_HOLD_THRESHOLD: f64 = 1.0;

/// Movement configuration of one axis within a sequence step.
///
/// The axis is fixed at construction. `hold_threshold` is present exactly
/// when the hold trigger set has at least one condition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisStepConfig {
    axis: Axis,
    enabled: bool,
    direction: Direction,
    pulse_interval_ms: u32,
    init_triggers: TriggerSet,
    stop_triggers: TriggerSet,
    hold_triggers: TriggerSet,
    hold_threshold: Option<f64>,
}

impl AxisStepConfig {
    /// Enabled, positive direction, 1 ms pulses, no triggers.
    #[must_use]
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            enabled: true,
            direction: Direction::default(),
            pulse_interval_ms: DEFAULT_PULSE_INTERVAL_MS,
            init_triggers: TriggerSet::new(TriggerRole::Init),
            stop_triggers: TriggerSet::new(TriggerRole::Stop),
            hold_triggers: TriggerSet::new(TriggerRole::Hold),
            hold_threshold: None,
        }
    }

    #[must_use]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    #[must_use]
    pub fn pulse_interval_ms(&self) -> u32 {
        self.pulse_interval_ms
    }

    pub fn set_pulse_interval_ms(&mut self, pulse_interval_ms: u32) {
        self.pulse_interval_ms = pulse_interval_ms;
    }

    #[must_use]
    pub fn triggers(&self, role: TriggerRole) -> &TriggerSet {
        match role {
            TriggerRole::Init => &self.init_triggers,
            TriggerRole::Stop => &self.stop_triggers,
            TriggerRole::Hold => &self.hold_triggers,
        }
    }

    fn triggers_mut(&mut self, role: TriggerRole) -> &mut TriggerSet {
        match role {
            TriggerRole::Init => &mut self.init_triggers,
            TriggerRole::Stop => &mut self.stop_triggers,
            TriggerRole::Hold => &mut self.hold_triggers,
        }
    }

    #[must_use]
    pub fn init_triggers(&self) -> &TriggerSet {
        &self.init_triggers
    }

    #[must_use]
    pub fn stop_triggers(&self) -> &TriggerSet {
        &self.stop_triggers
    }

    #[must_use]
    pub fn hold_triggers(&self) -> &TriggerSet {
        &self.hold_triggers
    }

    /// Force to hold once movement stops, if any hold trigger exists.
    #[must_use]
    pub fn hold_threshold(&self) -> Option<f64> {
        self.hold_threshold
    }

    /// Set the held force. Ignored (returns `false`) while no hold trigger exists.
    pub fn set_hold_threshold(&mut self, force: f64) -> bool {
        if self.hold_triggers.is_empty() {
            return false;
        }
        self.hold_threshold = Some(if force.is_finite() { force } else { 0.0 });
        true
    }

    pub fn set_combinator(&mut self, role: TriggerRole, combinator: Combinator) {
        self.triggers_mut(role).set_combinator(combinator);
    }

    /// Append a condition to the `role` set.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MetricNotAllowed`] when `metric` is not legal
    /// for `role` on this axis, or [`ValidationError::NegativeThreshold`] for a
    /// negative duration/count threshold.
    pub fn add_condition(
        &mut self,
        role: TriggerRole,
        metric: Metric,
        comparator: Comparator,
        threshold: f64,
    ) -> Result<ConditionId, ValidationError> {
        self.check_metric(role, metric)?;
        let condition = TriggerCondition::new(metric, comparator, threshold)?;
        Ok(self.insert(role, condition))
    }

    /// Append a condition with the preselected metric, `>=` and threshold `1`.
    pub fn add_default_condition(&mut self, role: TriggerRole) -> ConditionId {
        let condition = TriggerCondition::preset(role.default_metric(self.axis), DEFAULT_THRESHOLD);
        self.insert(role, condition)
    }

    fn insert(&mut self, role: TriggerRole, condition: TriggerCondition) -> ConditionId {
        let id = condition.id();
        self.triggers_mut(role).push(condition);
        if role == TriggerRole::Hold && self.hold_threshold.is_none() {
            self.hold_threshold = Some(DEFAULT_HOLD_THRESHOLD);
        }
        id
    }

    /// Remove a condition. Removing an absent condition is a no-op returning `false`.
    ///
    /// Removing the last hold condition also discards the hold threshold.
    pub fn remove_condition(&mut self, role: TriggerRole, id: ConditionId) -> bool {
        let removed = self.triggers_mut(role).remove(id);
        if role == TriggerRole::Hold && self.hold_triggers.is_empty() {
            self.hold_threshold = None;
        }
        removed
    }

    /// Change the metric of an existing condition.
    ///
    /// # Errors
    ///
    /// [`GeckoError::NotFound`] for an unknown id, [`GeckoError::Validation`]
    /// when the metric is not legal for the role/axis or conflicts with the
    /// threshold's sign.
    pub fn set_condition_metric(
        &mut self,
        role: TriggerRole,
        id: ConditionId,
        metric: Metric,
    ) -> Result<(), GeckoError> {
        self.check_metric(role, metric)?;
        self.condition_mut(role, id)?.set_metric(metric)?;
        Ok(())
    }

    /// Change the comparator of an existing condition.
    ///
    /// # Errors
    ///
    /// [`GeckoError::NotFound`] for an unknown id.
    pub fn set_condition_comparator(
        &mut self,
        role: TriggerRole,
        id: ConditionId,
        comparator: Comparator,
    ) -> Result<(), GeckoError> {
        self.condition_mut(role, id)?.set_comparator(comparator);
        Ok(())
    }

    /// Change the threshold of an existing condition.
    ///
    /// # Errors
    ///
    /// [`GeckoError::NotFound`] for an unknown id, [`GeckoError::Validation`]
    /// for a negative duration/count threshold.
    pub fn set_condition_threshold(
        &mut self,
        role: TriggerRole,
        id: ConditionId,
        threshold: f64,
    ) -> Result<(), GeckoError> {
        self.condition_mut(role, id)?.set_threshold(threshold)?;
        Ok(())
    }

    fn condition_mut(
        &mut self,
        role: TriggerRole,
        id: ConditionId,
    ) -> Result<&mut TriggerCondition, NotFoundError> {
        self.triggers_mut(role)
            .get_mut(id)
            .ok_or_else(|| NotFoundError {
                entity: "Condition",
                id: id.to_string(),
            })
    }

    fn check_metric(&self, role: TriggerRole, metric: Metric) -> Result<(), ValidationError> {
        if role.allows(metric, self.axis) {
            Ok(())
        } else {
            Err(ValidationError::MetricNotAllowed {
                metric,
                role,
                axis: self.axis,
            })
        }
    }

    /// Human-readable description of the gating logic.
    #[must_use]
    pub fn summary(&self) -> String {
        super::summary::describe(self)
    }
}
