//! Shared identifiers and spatial types used across the chargefire crates.

mod types;

pub use types::{AnchorId, DeviceId, ProjectileId, SessionId, Transform};
