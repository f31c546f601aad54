use chargefire_charge::ChargeError;
use std::path::PathBuf;

/// Errors from starting or driving a charge session.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("invalid configuration: {0} is not assigned")]
    MissingCollaborator(&'static str),
    #[error(transparent)]
    Charge(#[from] ChargeError),
    #[error("a charge session is already active")]
    Busy,
}

impl SessionError {
    /// Missing collaborators and invalid profiles both count as configuration errors.
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingCollaborator(_) | Self::Charge(ChargeError::InvalidConfiguration(_))
        )
    }
}

/// Errors from loading a controller configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error(transparent)]
    Charge(#[from] ChargeError),
}
