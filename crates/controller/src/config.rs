use chargefire_charge::{ChargeMode, ChargeProfile};
use chargefire_input::DEFAULT_STYLUS_TOKEN;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::feedback::HapticRoute;

/// Controller configuration: charge profile, starting mode, stylus matching
/// and haptic routing.
///
/// Missing fields fall back to their defaults, so a file only needs to name
/// what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub profile: ChargeProfile,
    pub mode: ChargeMode,
    /// Case-insensitive substring identifying the stylus by device name.
    pub stylus_token: String,
    /// Haptic destinations pulsed for every sample, in order.
    pub haptic_routes: Vec<HapticRoute>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            profile: ChargeProfile::default(),
            mode: ChargeMode::default(),
            stylus_token: DEFAULT_STYLUS_TOKEN.to_string(),
            haptic_routes: HapticRoute::default_routes(),
        }
    }
}

impl ControllerConfig {
    /// Load from a `.yaml`/`.yml` or `.json` file and validate the profile.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let text = std::fs::read_to_string(path)?;
        let config = match ext.as_deref() {
            Some("yaml" | "yml") => Self::from_yaml_str(&text)?,
            Some("json") => Self::from_json_str(&text)?,
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        };
        tracing::debug!(path = %path.display(), mode = %config.mode, "loaded controller config");
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.profile.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chargefire_charge::ChargeError;
    use std::io::Write;

    #[test]
    fn default_matches_inspector_values() {
        let config = ControllerConfig::default();
        assert_eq!(config.profile.step_count, 10);
        assert_eq!(config.profile.fire_force, 10.0);
        assert_eq!(config.mode, ChargeMode::Stepped);
        assert_eq!(config.stylus_token, "logitech");
        assert_eq!(
            config.haptic_routes,
            vec![HapticRoute::Controller, HapticRoute::Stylus]
        );
    }

    #[test]
    fn yaml_partial_overrides() {
        let text = "mode: linear\nprofile:\n  linear_charge_time: 1.5\n";
        let config = ControllerConfig::from_yaml_str(text).unwrap();
        assert_eq!(config.mode, ChargeMode::Linear);
        assert_eq!(config.profile.linear_charge_time, 1.5);
        assert_eq!(config.profile.step_count, 10);
        assert_eq!(config.stylus_token, "logitech");
    }

    #[test]
    fn yaml_roundtrip_default() {
        let config = ControllerConfig::default();
        let text = config.to_yaml_string().unwrap();
        assert!(text.contains("mode: stepped"));
        assert_eq!(ControllerConfig::from_yaml_str(&text).unwrap(), config);
    }

    #[test]
    fn unknown_mode_is_reported() {
        let err = ControllerConfig::from_yaml_str("mode: burst\n").unwrap_err();
        assert!(err.to_string().contains("unknown charge mode"), "{err}");
    }

    #[test]
    fn invalid_profile_rejected() {
        let err = ControllerConfig::from_json_str(r#"{"profile": {"step_count": 0}}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Charge(ChargeError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn load_yaml_and_json_files() {
        let dir = tempfile::tempdir().unwrap();

        let yaml_path = dir.path().join("charge.yaml");
        let mut f = std::fs::File::create(&yaml_path).unwrap();
        writeln!(f, "stylus_token: MX Ink\nhaptic_routes: [stylus]").unwrap();
        let config = ControllerConfig::load(&yaml_path).unwrap();
        assert_eq!(config.stylus_token, "MX Ink");
        assert_eq!(config.haptic_routes, vec![HapticRoute::Stylus]);

        let json_path = dir.path().join("charge.json");
        std::fs::write(&json_path, r#"{"mode": "Linear"}"#).unwrap();
        let config = ControllerConfig::load(&json_path).unwrap();
        assert_eq!(config.mode, ChargeMode::Linear);
    }

    #[test]
    fn unsupported_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("charge.toml");
        std::fs::write(&path, "mode = 'linear'").unwrap();
        let err = ControllerConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ControllerConfig::load("/nonexistent/charge.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
