//! Live metric values a trigger set is evaluated against.

use crate::telemetry::ForceReading;

use super::Metric;

/// A point-in-time view of every quantity a condition can reference.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricSnapshot {
    pub force: ForceReading,
    /// Seconds since the role's reference instant (movement or hold start).
    pub elapsed_secs: f64,
    /// Pulses emitted since the step started.
    pub step_count: i64,
}

impl MetricSnapshot {
    #[must_use]
    pub fn new(force: ForceReading, elapsed_secs: f64, step_count: i64) -> Self {
        Self {
            force,
            elapsed_secs,
            step_count,
        }
    }

    /// Current value of `metric`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn value_of(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Fx => self.force.fx,
            Metric::Fy => self.force.fy,
            Metric::Fz => self.force.fz,
            Metric::FTotal => self.force.magnitude(),
            Metric::Duration => self.elapsed_secs,
            Metric::Steps => self.step_count as f64,
        }
    }
}
