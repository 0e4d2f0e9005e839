//! Trigger set — an ordered list of conditions joined by AND or OR.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::ConditionId;

use super::{MetricSnapshot, TriggerCondition, TriggerRole};

/// How the conditions of a set combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    /// Every condition must hold (AND).
    All,
    /// At least one condition must hold (OR).
    #[default]
    Any,
}

impl Combinator {
    /// Word joining conditions in a summary line.
    #[must_use]
    pub fn joiner(self) -> &'static str {
        match self {
            Self::All => " AND ",
            Self::Any => " OR ",
        }
    }

    /// Fire-all flag as the backend expects it: `"True"` for [`All`](Self::All).
    #[must_use]
    pub fn as_flag(self) -> &'static str {
        match self {
            Self::All => "True",
            Self::Any => "False",
        }
    }
}

impl FromStr for Combinator {
    type Err = ValidationError;

    /// Parses the backend's fire-all flag.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "True" | "true" => Ok(Self::All),
            "False" | "false" => Ok(Self::Any),
            other => Err(ValidationError::UnknownFlag(other.to_string())),
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Any => f.write_str("any"),
        }
    }
}

/// Outcome of evaluating a set against live values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// The set has no conditions; the role imposes no gate.
    Ungated,
    /// The set has conditions and they are satisfied.
    Open,
    /// The set has conditions and they are not satisfied.
    Closed,
}

/// The conditions controlling one gate (init, stop or hold) of an axis step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerSet {
    role: TriggerRole,
    combinator: Combinator,
    conditions: Vec<TriggerCondition>,
}

impl TriggerSet {
    /// Create an empty set for `role`.
    #[must_use]
    pub fn new(role: TriggerRole) -> Self {
        Self {
            role,
            combinator: Combinator::default(),
            conditions: Vec::new(),
        }
    }

    #[must_use]
    pub fn role(&self) -> TriggerRole {
        self.role
    }

    #[must_use]
    pub fn combinator(&self) -> Combinator {
        self.combinator
    }

    pub fn set_combinator(&mut self, combinator: Combinator) {
        self.combinator = combinator;
    }

    /// Conditions in insertion order.
    #[must_use]
    pub fn conditions(&self) -> &[TriggerCondition] {
        &self.conditions
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    #[must_use]
    pub fn get(&self, id: ConditionId) -> Option<&TriggerCondition> {
        self.conditions.iter().find(|c| c.id() == id)
    }

    pub(crate) fn get_mut(&mut self, id: ConditionId) -> Option<&mut TriggerCondition> {
        self.conditions.iter_mut().find(|c| c.id() == id)
    }

    pub(crate) fn push(&mut self, condition: TriggerCondition) {
        self.conditions.push(condition);
    }

    /// Remove the condition with `id`. Returns `false` if it was not present.
    pub(crate) fn remove(&mut self, id: ConditionId) -> bool {
        let before = self.conditions.len();
        self.conditions.retain(|c| c.id() != id);
        self.conditions.len() != before
    }

    /// Whether the conditions are satisfied under the set's combinator.
    ///
    /// An empty set is never satisfied by its own conditions; use
    /// [`gate`](Self::gate) to tell "no gate" apart from "gate closed".
    #[must_use]
    pub fn is_satisfied(&self, snapshot: &MetricSnapshot) -> bool {
        if self.conditions.is_empty() {
            return false;
        }
        match self.combinator {
            Combinator::All => self.conditions.iter().all(|c| c.is_met(snapshot)),
            Combinator::Any => self.conditions.iter().any(|c| c.is_met(snapshot)),
        }
    }

    #[must_use]
    pub fn gate(&self, snapshot: &MetricSnapshot) -> Gate {
        if self.conditions.is_empty() {
            Gate::Ungated
        } else if self.is_satisfied(snapshot) {
            Gate::Open
        } else {
            Gate::Closed
        }
    }

    /// Conditions rendered and joined with `AND` / `OR`, or `None` when empty.
    #[must_use]
    pub fn joined(&self) -> Option<String> {
        if self.conditions.is_empty() {
            return None;
        }
        let parts: Vec<String> = self.conditions.iter().map(ToString::to_string).collect();
        Some(parts.join(self.combinator.joiner()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::ForceReading;
    use crate::trigger::{Comparator, Metric};

    fn fz_snapshot(fz: f64) -> MetricSnapshot {
        MetricSnapshot::new(
            ForceReading {
                fx: 0.0,
                fy: 0.0,
                fz,
            },
            0.0,
            0,
        )
    }

    fn band(combinator: Combinator) -> TriggerSet {
        let mut set = TriggerSet::new(TriggerRole::Stop);
        set.set_combinator(combinator);
        set.push(TriggerCondition::new(Metric::Fz, Comparator::Greater, 1.0).unwrap());
        set.push(TriggerCondition::new(Metric::Fz, Comparator::Less, -1.0).unwrap());
        set
    }

    #[test]
    fn should_default_to_any() {
        assert_eq!(TriggerSet::new(TriggerRole::Init).combinator(), Combinator::Any);
    }

    #[test]
    fn should_report_ungated_when_empty() {
        let set = TriggerSet::new(TriggerRole::Stop);
        assert_eq!(set.gate(&fz_snapshot(100.0)), Gate::Ungated);
        assert!(!set.is_satisfied(&fz_snapshot(100.0)));
    }

    #[test]
    fn should_open_any_set_when_one_condition_holds() {
        let set = band(Combinator::Any);
        assert_eq!(set.gate(&fz_snapshot(2.0)), Gate::Open);
        assert_eq!(set.gate(&fz_snapshot(0.0)), Gate::Closed);
    }

    #[test]
    fn should_keep_all_set_closed_unless_every_condition_holds() {
        let set = band(Combinator::All);
        assert_eq!(set.gate(&fz_snapshot(2.0)), Gate::Closed);
        assert_eq!(set.gate(&fz_snapshot(-2.0)), Gate::Closed);
    }

    #[test]
    fn should_open_all_set_when_every_condition_holds() {
        let mut set = TriggerSet::new(TriggerRole::Stop);
        set.set_combinator(Combinator::All);
        set.push(TriggerCondition::new(Metric::Fz, Comparator::Greater, 1.0).unwrap());
        set.push(TriggerCondition::new(Metric::Fz, Comparator::Less, 3.0).unwrap());

        assert_eq!(set.gate(&fz_snapshot(2.0)), Gate::Open);
        assert!(set.is_satisfied(&fz_snapshot(2.0)));
        assert_eq!(set.gate(&fz_snapshot(4.0)), Gate::Closed);
        assert!(!set.is_satisfied(&fz_snapshot(0.5)));
    }

    #[test]
    fn should_join_with_and_for_all() {
        assert_eq!(
            band(Combinator::All).joined().as_deref(),
            Some("Fz > 1N AND Fz < -1N")
        );
    }

    #[test]
    fn should_join_with_or_for_any() {
        assert_eq!(
            band(Combinator::Any).joined().as_deref(),
            Some("Fz > 1N OR Fz < -1N")
        );
    }

    #[test]
    fn should_return_false_when_removing_absent_condition() {
        let mut set = band(Combinator::Any);
        assert!(!set.remove(ConditionId::new()));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn should_parse_fire_all_flags() {
        assert_eq!("True".parse::<Combinator>().unwrap(), Combinator::All);
        assert_eq!("False".parse::<Combinator>().unwrap(), Combinator::Any);
        assert!("yes".parse::<Combinator>().is_err());
    }
}
