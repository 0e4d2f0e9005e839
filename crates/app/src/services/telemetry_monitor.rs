//! Telemetry monitor — keeps the operator's live view of the rig.
//!
//! The monitor follows the telemetry bus and tracks the latest force sample,
//! the step counters, a bounded log history and the force chart. It never
//! touches sequence state.

use std::collections::VecDeque;

use gecko_domain::telemetry::{ForceReading, LogSignal, StepCounts, TelemetryEvent};
use gecko_domain::time::{Timestamp, now};

use crate::motor_check::MotorCheckGate;
use crate::telemetry_bus::TelemetryTap;

/// Log lines kept before the oldest is dropped.
pub const DEFAULT_LOG_CAPACITY: usize = 200;

/// Chart samples kept before the oldest is dropped.
pub const DEFAULT_SAMPLE_CAPACITY: usize = 600;

/// A log line with the time it was received.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub at: Timestamp,
    pub message: String,
}

/// One point of the force chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartSample {
    /// Seconds since plotting started.
    pub secs: f64,
    pub fz: f64,
}

/// Live view of the rig, fed from the telemetry bus.
#[derive(Debug)]
pub struct TelemetryMonitor {
    gate: MotorCheckGate,
    latest_force: Option<ForceReading>,
    step_counts: StepCounts,
    log: VecDeque<LogEntry>,
    log_capacity: usize,
    plotting_since: Option<Timestamp>,
    samples: VecDeque<ChartSample>,
    sample_capacity: usize,
}

impl TelemetryMonitor {
    /// Create a monitor that opens `gate` when a motor check completes.
    #[must_use]
    pub fn new(gate: MotorCheckGate) -> Self {
        Self::with_capacity(gate, DEFAULT_LOG_CAPACITY, DEFAULT_SAMPLE_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(gate: MotorCheckGate, log_capacity: usize, sample_capacity: usize) -> Self {
        Self {
            gate,
            latest_force: None,
            step_counts: StepCounts::default(),
            log: VecDeque::with_capacity(log_capacity),
            log_capacity: log_capacity.max(1),
            plotting_since: None,
            samples: VecDeque::with_capacity(sample_capacity),
            sample_capacity: sample_capacity.max(1),
        }
    }

    #[must_use]
    pub fn latest_force(&self) -> Option<ForceReading> {
        self.latest_force
    }

    #[must_use]
    pub fn step_counts(&self) -> StepCounts {
        self.step_counts
    }

    /// Log history, oldest first.
    pub fn log(&self) -> impl Iterator<Item = &LogEntry> {
        self.log.iter()
    }

    #[must_use]
    pub fn is_plotting(&self) -> bool {
        self.plotting_since.is_some()
    }

    /// Chart samples of the current (or last) plot, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = &ChartSample> {
        self.samples.iter()
    }

    /// Apply one event received now.
    pub fn apply(&mut self, event: &TelemetryEvent) {
        self.apply_at(event, now());
    }

    /// Apply one event received at `at`.
    #[allow(clippy::cast_precision_loss)]
    pub fn apply_at(&mut self, event: &TelemetryEvent, at: Timestamp) {
        match event {
            TelemetryEvent::Log(message) => self.on_log(message, at),
            TelemetryEvent::Force(force) => {
                self.latest_force = Some(*force);
                if let Some(started) = self.plotting_since {
                    let secs = (at - started).num_milliseconds() as f64 / 1000.0;
                    push_bounded(
                        &mut self.samples,
                        self.sample_capacity,
                        ChartSample { secs, fz: force.fz },
                    );
                }
            }
            TelemetryEvent::StepCount(counts) => self.step_counts = *counts,
        }
    }

    fn on_log(&mut self, message: &str, at: Timestamp) {
        if self.gate.observe_log(message) {
            tracing::info!("motor check completed, runs enabled");
        }
        match LogSignal::classify(message) {
            Some(LogSignal::SequenceStarted) => {
                tracing::debug!("plotting started");
                self.samples.clear();
                self.plotting_since = Some(at);
            }
            Some(LogSignal::SequenceFinished) => {
                tracing::debug!("plotting stopped");
                self.plotting_since = None;
            }
            Some(LogSignal::MotorCheckCompleted) | None => {}
        }
        push_bounded(
            &mut self.log,
            self.log_capacity,
            LogEntry {
                at,
                message: message.to_string(),
            },
        );
    }

    /// Apply events from `tap` until the bus closes.
    pub async fn follow(&mut self, mut tap: TelemetryTap) {
        while let Some(event) = tap.next().await {
            self.apply(&event);
        }
    }

    /// Apply whatever `tap` has buffered, without waiting.
    pub fn catch_up(&mut self, tap: &mut TelemetryTap) {
        for event in tap.drain() {
            self.apply(&event);
        }
    }
}

fn push_bounded<T>(queue: &mut VecDeque<T>, capacity: usize, item: T) {
    while queue.len() >= capacity {
        queue.pop_front();
    }
    queue.push_back(item);
}
