use thiserror::Error;

#[derive(Error, Debug)]
pub enum AiError {
    #[error("Planet not found: {0:?}")]
    PlanetNotFound(crate::core::types::PlanetId),

    #[error("Fleet not found: {0:?}")]
    FleetNotFound(crate::core::types::FleetId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Dispatch fault: {0}")]
    DispatchFault(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AiError>;

/// Fault raised by the host's `send_fleet` capability.
///
/// Distinct from [`AiError`] so the executor can treat it as a per-action
/// outcome rather than a pipeline failure.
#[derive(Error, Debug, Clone)]
#[error("send_fleet fault: {0}")]
pub struct DispatchError(pub String);
