//! External runtime boundary: the traits the controller drives.
//!
//! The engine hosting the interaction implements these; nothing in this crate
//! renders, mixes audio or simulates physics.
//!
//! # Invariants
//! - Collaborators are driven from a single thread; no `Send` bound is imposed.
//! - `ProjectileHandle::ensure_physics_body` never creates a second body.

mod audio;
mod haptics;
mod scene;

pub use audio::{AudioSink, SoundCue};
pub use haptics::{HapticSink, HapticTarget};
pub use scene::{BodyHandle, ProjectileFactory, ProjectileHandle, TipAnchor};

pub fn crate_info() -> &'static str {
    "chargefire-runtime v0.1.0"
}
