//! # gecko-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `SequenceBackend` — run programs, rig commands, program download/upload
//!   - `TelemetryPublisher` — publish force, step-count and log events
//! - Define **driving/inbound ports** as use-case structs:
//!   - `SequenceService` — edit the sequence, summaries, run, download, upload
//!   - `ControlService` — stop, emergency stop, motor check, zero, calibrate
//!   - `TelemetryMonitor` — latest readings, log history, force chart
//! - Provide **in-process infrastructure** (telemetry bus, motor-check gate) that doesn't need IO
//! - Orchestrate domain objects without knowing *how* the rig is reached
//!
//! ## Dependency rule
//! Depends on `gecko-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod motor_check;
pub mod ports;
pub mod services;
pub mod telemetry_bus;
