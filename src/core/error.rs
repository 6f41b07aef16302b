use thiserror::Error;

/// Faults: unexpected conditions caught at component boundaries.
///
/// Rejections (cooldowns, chance rolls, disabled triggers) are NOT errors;
/// they are returned as plain values. See `trigger::RejectReason`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("No usable camera could be acquired")]
    CameraUnavailable,

    #[error("Camera handle lost mid-session")]
    CameraLost,

    #[error("Killcam target lost: {0:?}")]
    TargetLost(crate::core::types::CreatureId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
