//! Triggers — the start / stop / hold gating logic of an axis step.
//!
//! A [`TriggerCondition`] compares one [`Metric`] against a threshold. A
//! [`TriggerSet`] groups conditions for one [`TriggerRole`] and combines them
//! with a [`Combinator`]. Each axis step owns exactly one set per role.

mod comparator;
mod condition;
mod metric;
mod set;
mod snapshot;

pub use comparator::Comparator;
pub use condition::{DEFAULT_THRESHOLD, TriggerCondition};
pub use metric::{Metric, TriggerRole, Unit};
pub use set::{Combinator, Gate, TriggerSet};
pub use snapshot::MetricSnapshot;
