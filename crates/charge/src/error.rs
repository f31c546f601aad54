/// Errors raised while configuring a charge.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChargeError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("unknown charge mode: {0:?}")]
    UnknownMode(String),
}
