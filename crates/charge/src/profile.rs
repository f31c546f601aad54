use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ChargeError;

/// Parameters governing how a charge evolves.
///
/// A profile is read once when a session starts and is not consulted again,
/// so edits only affect later sessions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargeProfile {
    /// Haptic amplitude of the first stepped pulse.
    pub initial_amplitude: f32,
    /// Amplitude reached at full charge.
    pub max_amplitude: f32,
    /// Length in seconds of the first stepped pulse.
    pub initial_duration: f32,
    /// Length in seconds of the last stepped pulse.
    pub min_duration: f32,
    /// Number of increments in stepped mode. Stepped mode emits `step_count + 1` pulses.
    pub step_count: u32,
    /// Seconds needed to charge from zero to full in linear mode.
    pub linear_charge_time: f32,
    /// Impulse magnitude applied to the projectile on fire.
    pub fire_force: f32,
}

impl Default for ChargeProfile {
    fn default() -> Self {
        Self {
            initial_amplitude: 0.2,
            max_amplitude: 1.0,
            initial_duration: 1.0,
            min_duration: 0.1,
            step_count: 10,
            linear_charge_time: 3.0,
            fire_force: 10.0,
        }
    }
}

impl ChargeProfile {
    /// Check every structural invariant, reporting the first one violated.
    pub fn validate(&self) -> Result<(), ChargeError> {
        let fields = [
            ("initial_amplitude", self.initial_amplitude),
            ("max_amplitude", self.max_amplitude),
            ("initial_duration", self.initial_duration),
            ("min_duration", self.min_duration),
            ("linear_charge_time", self.linear_charge_time),
            ("fire_force", self.fire_force),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(invalid(format!("{name} must be finite")));
        }

        if self.initial_amplitude < 0.0 {
            return Err(invalid("initial_amplitude must be >= 0"));
        }
        if self.max_amplitude < self.initial_amplitude {
            return Err(invalid(format!(
                "max_amplitude ({}) must be >= initial_amplitude ({})",
                self.max_amplitude, self.initial_amplitude
            )));
        }
        if self.min_duration < 0.0 {
            return Err(invalid("min_duration must be >= 0"));
        }
        if self.initial_duration < self.min_duration {
            return Err(invalid(format!(
                "initial_duration ({}) must be >= min_duration ({})",
                self.initial_duration, self.min_duration
            )));
        }
        if self.step_count == 0 {
            return Err(invalid("step_count must be >= 1"));
        }
        if self.linear_charge_time <= 0.0 {
            return Err(invalid("linear_charge_time must be > 0"));
        }
        if self.fire_force < 0.0 {
            return Err(invalid("fire_force must be >= 0"));
        }
        Ok(())
    }

    /// Amplitude of stepped pulse `i`. The last pulse lands exactly on `max_amplitude`.
    pub fn stepped_amplitude(&self, i: u32) -> f32 {
        if i >= self.step_count {
            return self.max_amplitude;
        }
        let step = (self.max_amplitude - self.initial_amplitude) / self.step_count as f32;
        self.initial_amplitude + i as f32 * step
    }

    /// Pulse length and following wait of stepped pulse `i`.
    pub fn stepped_duration(&self, i: u32) -> f32 {
        if i >= self.step_count {
            return self.min_duration;
        }
        let step = (self.initial_duration - self.min_duration) / self.step_count as f32;
        (self.initial_duration - i as f32 * step).max(0.0)
    }
}

fn invalid(msg: impl Into<String>) -> ChargeError {
    ChargeError::InvalidConfiguration(msg.into())
}

/// Which progression algorithm a session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ChargeMode {
    /// Discrete pulses that grow stronger and shorter.
    #[default]
    Stepped,
    /// Per-frame ramp from zero to full over a fixed time.
    Linear,
}

impl ChargeMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            Self::Stepped => Self::Linear,
            Self::Linear => Self::Stepped,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stepped => "stepped",
            Self::Linear => "linear",
        }
    }
}

impl std::fmt::Display for ChargeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChargeMode {
    type Err = ChargeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stepped" => Ok(Self::Stepped),
            "linear" => Ok(Self::Linear),
            _ => Err(ChargeError::UnknownMode(s.to_string())),
        }
    }
}

impl TryFrom<String> for ChargeMode {
    type Error = ChargeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ChargeMode> for String {
    fn from(mode: ChargeMode) -> Self {
        mode.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn default_profile_is_valid() {
        assert!(ChargeProfile::default().validate().is_ok());
    }

    #[test]
    fn zero_steps_is_invalid() {
        let profile = ChargeProfile {
            step_count: 0,
            ..ChargeProfile::default()
        };
        let err = profile.validate().unwrap_err();
        assert!(matches!(err, ChargeError::InvalidConfiguration(ref m) if m.contains("step_count")));
    }

    #[test]
    fn amplitude_ordering_enforced() {
        let profile = ChargeProfile {
            initial_amplitude: 0.8,
            max_amplitude: 0.5,
            ..ChargeProfile::default()
        };
        assert!(profile.validate().is_err());

        let negative = ChargeProfile {
            initial_amplitude: -0.1,
            ..ChargeProfile::default()
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn duration_ordering_enforced() {
        let profile = ChargeProfile {
            initial_duration: 0.05,
            min_duration: 0.1,
            ..ChargeProfile::default()
        };
        assert!(profile.validate().is_err());
    }

    #[test]
    fn linear_time_must_be_positive() {
        let profile = ChargeProfile {
            linear_charge_time: 0.0,
            ..ChargeProfile::default()
        };
        assert!(profile.validate().is_err());
    }

    #[test]
    fn non_finite_values_rejected() {
        let profile = ChargeProfile {
            max_amplitude: f32::NAN,
            ..ChargeProfile::default()
        };
        let err = profile.validate().unwrap_err();
        assert_eq!(
            err,
            ChargeError::InvalidConfiguration("max_amplitude must be finite".into())
        );
    }

    #[test]
    fn stepped_endpoints() {
        let p = ChargeProfile::default();
        assert!(approx(p.stepped_amplitude(0), 0.2));
        assert!(approx(p.stepped_duration(0), 1.0));
        assert_eq!(p.stepped_amplitude(10), 1.0);
        assert_eq!(p.stepped_duration(10), 0.1);
    }

    #[test]
    fn toggle_is_involution() {
        for mode in [ChargeMode::Stepped, ChargeMode::Linear] {
            assert_ne!(mode.toggled(), mode);
            assert_eq!(mode.toggled().toggled(), mode);
        }
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("Linear".parse::<ChargeMode>().unwrap(), ChargeMode::Linear);
        assert_eq!(" stepped ".parse::<ChargeMode>().unwrap(), ChargeMode::Stepped);
    }

    #[test]
    fn unknown_mode_is_reported() {
        let err = "burst".parse::<ChargeMode>().unwrap_err();
        assert_eq!(err, ChargeError::UnknownMode("burst".into()));
    }
}
