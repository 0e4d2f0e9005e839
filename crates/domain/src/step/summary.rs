//! Summary — a derived, human-readable description of a step's gating logic.

use crate::trigger::TriggerRole;

use super::AxisStepConfig;

/// Shown when no set contributes a line: all three are empty, or the axis is disabled.
pub const EMPTY_SUMMARY: &str = "This action has no start/stop/hold triggers defined.";

/// One line per non-empty trigger set, in init / stop / hold order.
#[must_use]
pub fn lines(config: &AxisStepConfig) -> Vec<String> {
    if !config.is_enabled() {
        return Vec::new();
    }
    let axis = config.axis();
    TriggerRole::ALL
        .into_iter()
        .filter_map(|role| {
            let joined = config.triggers(role).joined()?;
            Some(match role {
                TriggerRole::Init => format!("Axis {axis} starts moving if {joined}"),
                TriggerRole::Stop => format!("Axis {axis} stops moving if {joined}"),
                TriggerRole::Hold => {
                    format!("Axis {axis} stops holding force along its direction if {joined}")
                }
            })
        })
        .collect()
}

/// Full description; recomputed from the config on every call.
#[must_use]
pub fn describe(config: &AxisStepConfig) -> String {
    let lines = lines(config);
    if lines.is_empty() {
        return EMPTY_SUMMARY.to_string();
    }
    format!("This action ends when:\n- {}", lines.join("\n- "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::Axis;
    use crate::trigger::{Combinator, Comparator, Metric};

    #[test]
    fn should_report_no_triggers_when_all_sets_empty() {
        let cfg = AxisStepConfig::new(Axis::X);
        assert_eq!(
            describe(&cfg),
            "This action has no start/stop/hold triggers defined."
        );
    }

    #[test]
    fn should_describe_disabled_axis_as_untriggered_regardless_of_conditions() {
        let mut cfg = AxisStepConfig::new(Axis::X);
        cfg.add_default_condition(TriggerRole::Stop);
        cfg.set_enabled(false);
        assert_eq!(describe(&cfg), EMPTY_SUMMARY);
        assert!(lines(&cfg).is_empty());
    }

    #[test]
    fn should_join_stop_conditions_with_and_when_all() {
        let mut cfg = AxisStepConfig::new(Axis::Z);
        cfg.add_condition(TriggerRole::Stop, Metric::Fz, Comparator::Greater, 1.0)
            .unwrap();
        cfg.add_condition(TriggerRole::Stop, Metric::Fz, Comparator::Less, -1.0)
            .unwrap();
        cfg.set_combinator(TriggerRole::Stop, Combinator::All);
        assert!(describe(&cfg).contains("Fz > 1N AND Fz < -1N"));

        cfg.set_combinator(TriggerRole::Stop, Combinator::Any);
        assert!(describe(&cfg).contains("Fz > 1N OR Fz < -1N"));
    }

    #[test]
    fn should_emit_lines_in_init_stop_hold_order() {
        let mut cfg = AxisStepConfig::new(Axis::X);
        cfg.add_condition(TriggerRole::Hold, Metric::Duration, Comparator::GreaterOrEqual, 3.0)
            .unwrap();
        cfg.add_condition(TriggerRole::Stop, Metric::Fx, Comparator::GreaterOrEqual, 5.0)
            .unwrap();
        cfg.add_condition(TriggerRole::Init, Metric::Steps, Comparator::Greater, 10.0)
            .unwrap();

        assert_eq!(
            lines(&cfg),
            vec![
                "Axis X starts moving if steps > 10".to_string(),
                "Axis X stops moving if Fx >= 5N".to_string(),
                "Axis X stops holding force along its direction if duration >= 3sec".to_string(),
            ]
        );
        assert_eq!(
            describe(&cfg),
            "This action ends when:\n\
             - Axis X starts moving if steps > 10\n\
             - Axis X stops moving if Fx >= 5N\n\
             - Axis X stops holding force along its direction if duration >= 3sec"
        );
    }

    #[test]
    fn should_be_idempotent() {
        let mut cfg = AxisStepConfig::new(Axis::Y);
        cfg.add_default_condition(TriggerRole::Init);
        assert_eq!(describe(&cfg), describe(&cfg));
    }
}
