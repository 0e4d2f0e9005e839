//! Playback script — the telemetry a real rig would push while executing a program.

use gecko_domain::axis::{Axis, Direction};
use gecko_domain::telemetry::{ForceReading, StepCounts, TelemetryEvent};
use gecko_domain::wire::{CategorizedProgram, StepData};

/// Pulses the virtual rig travels for every executed step.
pub const PULSES_PER_STEP: i64 = 10;

/// Repeats beyond this are not replayed.
pub const MAX_REPLAYED_RUNS: u32 = 100;

fn log(message: impl Into<String>) -> TelemetryEvent {
    TelemetryEvent::Log(message.into())
}

fn counter(counts: &mut StepCounts, axis: Axis) -> &mut i64 {
    match axis {
        Axis::X => &mut counts.x,
        Axis::Y => &mut counts.y,
        Axis::Z => &mut counts.z,
    }
}

/// Events emitted for one run of `program`, updating `counts` as steps execute.
///
/// Disabled steps are skipped. A missing repeat count runs the program once,
/// and at most [`MAX_REPLAYED_RUNS`] runs are replayed.
pub(crate) fn playback(program: &CategorizedProgram, counts: &mut StepCounts) -> Vec<TelemetryEvent> {
    let requested = program.repeat.unwrap_or(1);
    let runs = requested.min(MAX_REPLAYED_RUNS);
    if runs < requested {
        tracing::warn!(requested, replayed = runs, "truncating replay of repeated program");
    }
    let mut events = vec![log("Sequence started")];
    for run in 0..runs {
        events.push(log(format!("Experiment {run} started")));
        for axis in Axis::ALL {
            for (index, descriptor) in program.bucket(axis).iter().enumerate() {
                let StepData::Full(payload) = &descriptor.data else {
                    tracing::debug!(%axis, index, "skipping disabled step");
                    continue;
                };
                events.push(log(format!("{axis}: Step {index} is initiated.")));
                let delta = match payload.direction {
                    Direction::Positive => PULSES_PER_STEP,
                    Direction::Negative => -PULSES_PER_STEP,
                };
                *counter(counts, axis) += delta;
                events.push(TelemetryEvent::StepCount(*counts));
                events.push(TelemetryEvent::Force(contact_force(axis)));
                events.push(log(format!("{axis}: Step {index} is completed!")));
            }
        }
        events.push(log(format!("experiment {run} completed!")));
        events.push(log(format!(
            "Total steps: X {} | Y {} | Z {}",
            counts.x, counts.y, counts.z
        )));
    }
    events.push(log("Sequence complete"));
    events
}

/// A small load along the moving axis.
fn contact_force(axis: Axis) -> ForceReading {
    let mut force = ForceReading {
        fx: 0.0,
        fy: 0.0,
        fz: 0.0,
    };
    match axis {
        Axis::X => force.fx = 0.5,
        Axis::Y => force.fy = 0.5,
        Axis::Z => force.fz = 1.0,
    }
    force
}
