//! Simulated runtime: an in-memory scene plus recording haptic and audio sinks.
//!
//! # Invariants
//! - Every scene mutation is recorded in the event log.
//! - Iteration order is deterministic (BTreeMap).
//!
//! # Workaround
//! Stands in for the host engine so the controller can run in tests and from
//! the CLI. Physics is limited to impulse-driven velocity integrated with
//! explicit Euler; there is no gravity or collision.

mod runtime;
mod scene;

pub use runtime::{AudioCall, AudioState, OutputLog, Pulse, SimRuntime};
pub use scene::{RigidBody, SceneEvent, SimProjectile, SimScene};

pub fn crate_info() -> &'static str {
    "chargefire-sim v0.1.0"
}
