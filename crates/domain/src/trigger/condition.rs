//! Trigger condition — a single `metric comparator threshold` clause.

use std::fmt;

use serde::Serialize;

use crate::error::ValidationError;
use crate::id::ConditionId;

use super::{Comparator, Metric, MetricSnapshot};

/// Threshold preselected for a freshly added condition.
pub const DEFAULT_THRESHOLD: f64 = 1.0;

/// One comparison clause of a [`TriggerSet`](super::TriggerSet).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerCondition {
    id: ConditionId,
    metric: Metric,
    comparator: Comparator,
    threshold: f64,
}

impl TriggerCondition {
    /// Build a condition with a fresh identity.
    ///
    /// Non-finite thresholds are normalised to `0`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NegativeThreshold`] when a duration or count
    /// metric is given a negative threshold.
    pub fn new(
        metric: Metric,
        comparator: Comparator,
        threshold: f64,
    ) -> Result<Self, ValidationError> {
        let threshold = check_threshold(metric, threshold)?;
        Ok(Self {
            id: ConditionId::new(),
            metric,
            comparator,
            threshold,
        })
    }

    /// Preselected `>=` condition; callers pass a non-negative threshold.
    pub(crate) fn preset(metric: Metric, threshold: f64) -> Self {
        Self {
            id: ConditionId::new(),
            metric,
            comparator: Comparator::GreaterOrEqual,
            threshold,
        }
    }

    #[must_use]
    pub fn id(&self) -> ConditionId {
        self.id
    }

    #[must_use]
    pub fn metric(&self) -> Metric {
        self.metric
    }

    #[must_use]
    pub fn comparator(&self) -> Comparator {
        self.comparator
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Replace the metric. Role/axis checks belong to the owning step config.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NegativeThreshold`] if the current threshold
    /// is negative and the new metric is a duration or count.
    pub(crate) fn set_metric(&mut self, metric: Metric) -> Result<(), ValidationError> {
        check_threshold(metric, self.threshold)?;
        self.metric = metric;
        Ok(())
    }

    pub(crate) fn set_comparator(&mut self, comparator: Comparator) {
        self.comparator = comparator;
    }

    pub(crate) fn set_threshold(&mut self, threshold: f64) -> Result<(), ValidationError> {
        self.threshold = check_threshold(self.metric, threshold)?;
        Ok(())
    }

    /// Whether the live value of this condition's metric satisfies it.
    #[must_use]
    pub fn is_met(&self, snapshot: &MetricSnapshot) -> bool {
        self.comparator
            .holds(snapshot.value_of(self.metric), self.threshold)
    }
}

impl fmt::Display for TriggerCondition {
    /// Summary form, e.g. `Fz > 1N`, `duration >= 2sec`, `steps == 100`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}{}",
            self.metric.bare_name(),
            self.comparator,
            self.threshold,
            self.metric.unit().summary_suffix()
        )
    }
}

fn check_threshold(metric: Metric, threshold: f64) -> Result<f64, ValidationError> {
    let threshold = if threshold.is_finite() { threshold } else { 0.0 };
    if metric.requires_non_negative() && threshold < 0.0 {
        return Err(ValidationError::NegativeThreshold {
            metric,
            value: threshold,
        });
    }
    Ok(threshold)
}
