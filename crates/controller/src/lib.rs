//! Charge controller: owns the active session and wires samples to collaborators.
//!
//! # Invariants
//! - At most one session is active per controller.
//! - A session never starts with a missing collaborator or invalid profile,
//!   and a failed start leaves no side effects.
//! - Fire happens once per session, after its last sample.

mod config;
mod controller;
mod error;
mod feedback;
mod fire;

pub use config::ControllerConfig;
pub use controller::{ChargeController, SessionEvent};
pub use error::{ConfigError, SessionError};
pub use feedback::{FeedbackSink, FeedbackTargets, HapticRoute, MIN_CHARGE_VOLUME};
pub use fire::{FireController, FireReport};

pub fn crate_info() -> &'static str {
    "chargefire-controller v0.1.0"
}
