//! # gecko-domain
//!
//! Pure domain model for the gecko adhesion testbed's sequence editor.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Axes** and travel directions
//! - Define **Trigger conditions** and **trigger sets** (metric / comparator / threshold, AND / OR)
//! - Define **Axis step configs** and **sequence steps** with their lifecycle
//! - Define the **Sequence** and its export to the executor's **wire format**
//! - Rebuild a sequence from an uploaded program
//! - Define **Telemetry** value types pushed by the rig
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod axis;
pub mod input;
pub mod sequence;
pub mod step;
pub mod telemetry;
pub mod trigger;
pub mod wire;
