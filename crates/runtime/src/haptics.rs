use chargefire_common::DeviceId;
use serde::{Deserialize, Serialize};

/// Where a haptic pulse is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HapticTarget {
    /// The general controller impulse player.
    Controller,
    /// A specific enumerated device, e.g. the bound stylus.
    Device(DeviceId),
}

impl std::fmt::Display for HapticTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Controller => f.write_str("controller"),
            Self::Device(id) => write!(f, "device#{}", id.0),
        }
    }
}

/// Sends haptic impulses to controllers.
pub trait HapticSink {
    /// Request a pulse of `amplitude` in `[0, 1]` lasting `duration` seconds.
    fn send_pulse(&mut self, target: HapticTarget, amplitude: f32, duration: f32);
}
