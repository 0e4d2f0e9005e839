//! Wire format — the JSON contract shared with the rig's backend executor.
//!
//! A program is a [`CategorizedProgram`]: three per-axis buckets of
//! [`StepDescriptor`]s plus an optional repeat count. The same structure is
//! submitted for a run, written to a downloaded file, and read back on upload.
//!
//! ```json
//! {"X": [{"type": "move-X-axis", "data": {}}], "Y": [], "Z": []}
//! ```

pub(crate) mod number;
mod rehydrate;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::axis::{Axis, Direction};
use crate::error::ValidationError;
use crate::step::AxisStepConfig;
use crate::trigger::{Combinator, TriggerCondition, TriggerRole, TriggerSet};

/// One exported step: a `move-<AXIS>-axis` tag plus its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDescriptor", into = "RawDescriptor")]
pub struct StepDescriptor {
    pub axis: Axis,
    pub data: StepData,
}

#[derive(Serialize, Deserialize)]
struct RawDescriptor {
    #[serde(rename = "type")]
    kind: String,
    data: StepData,
}

impl StepDescriptor {
    /// Descriptor for a config; a disabled config exports an empty payload.
    #[must_use]
    pub fn from_config(config: &AxisStepConfig) -> Self {
        let data = if config.is_enabled() {
            StepData::Full(Box::new(FullPayload::from_config(config)))
        } else {
            StepData::Empty
        };
        Self {
            axis: config.axis(),
            data,
        }
    }

    /// Type tag, e.g. `move-X-axis`.
    #[must_use]
    pub fn kind(&self) -> String {
        format!("move-{}-axis", self.axis)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self.data, StepData::Empty)
    }
}

impl From<StepDescriptor> for RawDescriptor {
    fn from(value: StepDescriptor) -> Self {
        Self {
            kind: value.kind(),
            data: value.data,
        }
    }
}

impl TryFrom<RawDescriptor> for StepDescriptor {
    type Error = ValidationError;

    fn try_from(value: RawDescriptor) -> Result<Self, Self::Error> {
        let axis = value
            .kind
            .strip_prefix("move-")
            .and_then(|rest| rest.strip_suffix("-axis"))
            .ok_or_else(|| ValidationError::UnknownStepType(value.kind.clone()))
            .and_then(|label| {
                Axis::from_str(label)
                    .map_err(|_| ValidationError::UnknownStepType(value.kind.clone()))
            })?;
        Ok(Self {
            axis,
            data: value.data,
        })
    }
}

/// Payload of a step descriptor: `{}` for a disabled axis.
#[derive(Debug, Clone, PartialEq)]
pub enum StepData {
    Empty,
    Full(Box<FullPayload>),
}

impl Serialize for StepData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Empty => serde_json::Map::new().serialize(serializer),
            Self::Full(payload) => payload.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for StepData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        if map.is_empty() {
            return Ok(Self::Empty);
        }
        serde_json::from_value(serde_json::Value::Object(map))
            .map(|payload| Self::Full(Box::new(payload)))
            .map_err(serde::de::Error::custom)
    }
}

/// Everything the executor needs to drive one enabled axis step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullPayload {
    pub direction: Direction,
    /// Pulse interval in milliseconds.
    #[serde(with = "number::pulse", default)]
    pub step_size: u32,
    /// Stop triggers.
    #[serde(default)]
    pub triggers: Vec<WireCondition>,
    #[serde(default)]
    pub move_init_triggers: Vec<WireCondition>,
    #[serde(default)]
    pub hold_triggers: Vec<WireCondition>,
    #[serde(default)]
    pub hold_threshold: HoldThreshold,
    pub axis: Axis,
    #[serde(with = "fire_all", default)]
    pub fire_all_triggers: Combinator,
    #[serde(with = "fire_all", default)]
    pub fire_all_hold_triggers: Combinator,
    #[serde(with = "fire_all", default)]
    pub fire_all_init_triggers: Combinator,
}

impl FullPayload {
    fn from_config(config: &AxisStepConfig) -> Self {
        Self {
            direction: config.direction(),
            step_size: config.pulse_interval_ms(),
            triggers: wire_conditions(config.stop_triggers()),
            move_init_triggers: wire_conditions(config.init_triggers()),
            hold_triggers: wire_conditions(config.hold_triggers()),
            hold_threshold: config
                .hold_threshold()
                .map_or(HoldThreshold::NotANumber, HoldThreshold::Force),
            axis: config.axis(),
            fire_all_triggers: config.stop_triggers().combinator(),
            fire_all_hold_triggers: config.hold_triggers().combinator(),
            fire_all_init_triggers: config.init_triggers().combinator(),
        }
    }

    /// Wire conditions of one role.
    #[must_use]
    pub fn conditions(&self, role: TriggerRole) -> &[WireCondition] {
        match role {
            TriggerRole::Init => &self.move_init_triggers,
            TriggerRole::Stop => &self.triggers,
            TriggerRole::Hold => &self.hold_triggers,
        }
    }

    /// Combinator of one role.
    #[must_use]
    pub fn combinator(&self, role: TriggerRole) -> Combinator {
        match role {
            TriggerRole::Init => self.fire_all_init_triggers,
            TriggerRole::Stop => self.fire_all_triggers,
            TriggerRole::Hold => self.fire_all_hold_triggers,
        }
    }
}

fn wire_conditions(set: &TriggerSet) -> Vec<WireCondition> {
    set.conditions().iter().map(WireCondition::from).collect()
}

/// A condition as the executor reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCondition {
    /// Metric label with unit, e.g. `Fz (N)`.
    #[serde(default)]
    pub trigger_type: String,
    #[serde(with = "number", default)]
    pub value: f64,
    #[serde(default = "default_comparator")]
    pub comparator: String,
}

fn default_comparator() -> String {
    "==".to_string()
}

impl From<&TriggerCondition> for WireCondition {
    fn from(condition: &TriggerCondition) -> Self {
        Self {
            trigger_type: condition.metric().wire_label(),
            value: condition.threshold(),
            comparator: condition.comparator().symbol().to_string(),
        }
    }
}

/// Force to hold after movement stops; `"NaN"` when the step has no hold triggers.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum HoldThreshold {
    Force(f64),
    #[default]
    NotANumber,
}

impl HoldThreshold {
    #[must_use]
    pub fn force(self) -> Option<f64> {
        match self {
            Self::Force(value) => Some(value),
            Self::NotANumber => None,
        }
    }
}

impl fmt::Display for HoldThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Force(value) => write!(f, "{value}"),
            Self::NotANumber => f.write_str("NaN"),
        }
    }
}

impl Serialize for HoldThreshold {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Force(value) if value.is_finite() => number::serialize(value, serializer),
            Self::Force(_) | Self::NotANumber => serializer.serialize_str("NaN"),
        }
    }
}

impl<'de> Deserialize<'de> for HoldThreshold {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
            Null(()),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(value) if value.is_finite() => Ok(Self::Force(value)),
            Raw::Number(_) | Raw::Null(()) => Ok(Self::NotANumber),
            Raw::Text(text) => {
                let text = text.trim();
                if text.eq_ignore_ascii_case("nan") || text.is_empty() {
                    return Ok(Self::NotANumber);
                }
                text.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .map(Self::Force)
                    .ok_or_else(|| {
                        serde::de::Error::custom(format!("invalid hold threshold {text:?}"))
                    })
            }
        }
    }
}

/// `"True"` / `"False"` fire-all flags.
mod fire_all {
    use std::str::FromStr;

    use serde::{Deserialize, Deserializer, Serializer};

    use crate::trigger::Combinator;

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub(super) fn serialize<S: Serializer>(
        value: &Combinator,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.as_flag())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Combinator, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Flag(true) => Ok(Combinator::All),
            Raw::Flag(false) => Ok(Combinator::Any),
            Raw::Text(text) => Combinator::from_str(&text).map_err(serde::de::Error::custom),
        }
    }
}

/// Descriptors grouped into per-axis buckets, as handed to the executor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CategorizedProgram {
    #[serde(rename = "X", default)]
    pub x: Vec<StepDescriptor>,
    #[serde(rename = "Y", default)]
    pub y: Vec<StepDescriptor>,
    #[serde(rename = "Z", default)]
    pub z: Vec<StepDescriptor>,
    /// How many times the executor runs the program.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<u32>,
}

impl CategorizedProgram {
    /// Group descriptors by axis, keeping same-axis relative order.
    #[must_use]
    pub fn from_descriptors(descriptors: &[StepDescriptor]) -> Self {
        let mut program = Self::default();
        for descriptor in descriptors {
            program.bucket_mut(descriptor.axis).push(descriptor.clone());
        }
        program
    }

    #[must_use]
    pub fn bucket(&self, axis: Axis) -> &[StepDescriptor] {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }

    fn bucket_mut(&mut self, axis: Axis) -> &mut Vec<StepDescriptor> {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        }
    }

    /// Total number of descriptors across all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len() + self.y.len() + self.z.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serialize as pretty JSON, the layout of a downloaded program file.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; a well-formed program never fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a program from JSON.
    ///
    /// # Errors
    ///
    /// Returns the parser error for malformed JSON or unknown step types.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::trigger::{Comparator, Metric};

    fn stop_fx_ge_5() -> AxisStepConfig {
        let mut cfg = AxisStepConfig::new(Axis::X);
        cfg.add_condition(TriggerRole::Stop, Metric::Fx, Comparator::GreaterOrEqual, 5.0)
            .unwrap();
        cfg
    }

    #[test]
    fn should_default_missing_condition_fields() {
        let condition: WireCondition = serde_json::from_str("{}").unwrap();
        assert_eq!(condition.trigger_type, "");
        assert!(condition.value.abs() < f64::EPSILON);
        assert_eq!(condition.comparator, "==");
    }

    #[test]
    fn should_export_stop_trigger_with_wire_labels() {
        let descriptor = StepDescriptor::from_config(&stop_fx_ge_5());
        let value = serde_json::to_value(&descriptor).unwrap();

        assert_eq!(value["type"], "move-X-axis");
        assert_eq!(
            value["data"]["triggers"],
            json!([{"triggerType": "Fx (N)", "value": 5, "comparator": ">="}])
        );
        assert_eq!(value["data"]["fireAllTriggers"], "False");
        assert_eq!(value["data"]["holdThreshold"], "NaN");
        assert_eq!(value["data"]["stepSize"], 1);
        assert_eq!(value["data"]["direction"], "positive");
        assert_eq!(value["data"]["axis"], "X");
    }

    #[test]
    fn should_export_empty_payload_when_disabled() {
        let mut cfg = stop_fx_ge_5();
        cfg.set_enabled(false);
        let value = serde_json::to_value(StepDescriptor::from_config(&cfg)).unwrap();
        assert_eq!(value, json!({"type": "move-X-axis", "data": {}}));
    }

    #[test]
    fn should_keep_payload_fields_in_executor_order() {
        let json = serde_json::to_string(&StepDescriptor::from_config(&stop_fx_ge_5())).unwrap();
        let keys = [
            "direction",
            "stepSize",
            "triggers",
            "moveInitTriggers",
            "holdTriggers",
            "holdThreshold",
            "axis",
            "fireAllTriggers",
            "fireAllHoldTriggers",
            "fireAllInitTriggers",
        ];
        let positions: Vec<usize> = keys
            .iter()
            .map(|k| json.find(&format!("\"{k}\"")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn should_export_hold_threshold_and_all_flag() {
        let mut cfg = AxisStepConfig::new(Axis::Z);
        cfg.add_default_condition(TriggerRole::Hold);
        cfg.set_hold_threshold(2.5);
        cfg.set_combinator(TriggerRole::Hold, Combinator::All);

        let value = serde_json::to_value(StepDescriptor::from_config(&cfg)).unwrap();
        assert_eq!(value["data"]["holdThreshold"], 2.5);
        assert_eq!(value["data"]["fireAllHoldTriggers"], "True");
        assert_eq!(value["data"]["holdTriggers"][0]["triggerType"], "Fx (N)");
    }

    #[test]
    fn should_reject_unknown_step_type() {
        let err = serde_json::from_value::<StepDescriptor>(json!({"type": "rotate", "data": {}}));
        assert!(err.is_err());
    }

    #[test]
    fn should_read_hold_threshold_variants() {
        let parse = |v: serde_json::Value| serde_json::from_value::<HoldThreshold>(v).unwrap();
        assert_eq!(parse(json!(3)), HoldThreshold::Force(3.0));
        assert_eq!(parse(json!("1.5")), HoldThreshold::Force(1.5));
        assert_eq!(parse(json!("NaN")), HoldThreshold::NotANumber);
        assert_eq!(parse(json!(null)), HoldThreshold::NotANumber);
        assert!(serde_json::from_value::<HoldThreshold>(json!("heavy")).is_err());
    }

    #[test]
    fn should_partition_descriptors_by_axis_preserving_order() {
        let mut y = AxisStepConfig::new(Axis::Y);
        y.set_pulse_interval_ms(7);
        let mut second_x = AxisStepConfig::new(Axis::X);
        second_x.set_enabled(false);
        let descriptors = vec![
            StepDescriptor::from_config(&stop_fx_ge_5()),
            StepDescriptor::from_config(&y),
            StepDescriptor::from_config(&second_x),
        ];

        let program = CategorizedProgram::from_descriptors(&descriptors);

        assert_eq!(program.x, vec![descriptors[0].clone(), descriptors[2].clone()]);
        assert_eq!(program.y, vec![descriptors[1].clone()]);
        assert!(program.z.is_empty());
        assert_eq!(program.len(), descriptors.len());
    }

    #[test]
    fn should_omit_repeat_unless_set() {
        let mut program = CategorizedProgram::default();
        assert_eq!(
            serde_json::to_value(&program).unwrap(),
            json!({"X": [], "Y": [], "Z": []})
        );
        program.repeat = Some(3);
        assert_eq!(serde_json::to_value(&program).unwrap()["repeat"], 3);
    }

    #[test]
    fn should_parse_downloaded_program() {
        let text = r#"{
            "X": [{"type": "move-X-axis", "data": {
                "direction": "negative", "stepSize": "20",
                "triggers": [{"triggerType": "Fx (N)", "value": "5", "comparator": ">="}],
                "moveInitTriggers": [], "holdTriggers": [],
                "holdThreshold": "NaN", "axis": "X",
                "fireAllTriggers": "True", "fireAllHoldTriggers": "False",
                "fireAllInitTriggers": "False"
            }}],
            "Y": [{"type": "move-Y-axis", "data": {}}]
        }"#;
        let program = CategorizedProgram::from_json(text).unwrap();

        let StepData::Full(payload) = &program.x[0].data else {
            panic!("expected a full payload");
        };
        assert_eq!(payload.step_size, 20);
        assert_eq!(payload.direction, Direction::Negative);
        assert!((payload.triggers[0].value - 5.0).abs() < f64::EPSILON);
        assert_eq!(payload.combinator(TriggerRole::Stop), Combinator::All);
        assert!(program.y[0].is_empty());
        assert!(program.z.is_empty());
    }
}
