use serde::{Deserialize, Serialize};

/// A high-level action raised by the host when a bound input fires.
///
/// Button mapping lives in the host; the controller only sees these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Begin a charge session.
    StartCharge,
    /// Flip between stepped and linear charging.
    SwitchCharging,
    /// No-op (used for input mapping that hasn't been bound yet).
    Noop,
}

impl std::str::FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" | "start-charge" => Ok(Self::StartCharge),
            "switch" | "switch-charging" => Ok(Self::SwitchCharging),
            "noop" => Ok(Self::Noop),
            other => Err(format!("unknown action: {other}")),
        }
    }
}
