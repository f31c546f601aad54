//! Charge progression: profiles, modes and the tick-driven scheduler.
//!
//! # Invariants
//! - A scheduler only exists for a validated profile.
//! - Every session ends with exactly one `ChargeEvent::Completed`, after its last sample.
//! - Progress never decreases within a session and the final sample is at progress 1.0.

mod error;
mod profile;
mod scheduler;

pub use error::ChargeError;
pub use profile::{ChargeMode, ChargeProfile};
pub use scheduler::{ChargeEvent, ChargeSample, ChargeScheduler};

pub fn crate_info() -> &'static str {
    "chargefire-charge v0.1.0"
}
