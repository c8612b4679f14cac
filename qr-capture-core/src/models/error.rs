use thiserror::Error;

use super::camera_models::AuthorizationStatus;

/// Errors emitted by the capture engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("camera access not authorized ({0})")]
    Unauthorized(AuthorizationStatus),

    #[error("capture device failure: {0}")]
    DeviceFailure(DeviceFailure),

    #[error("metadata object could not be read")]
    ReadFailure,

    #[error("unknown error: {0}")]
    Unknown(String),
}

/// The specific configuration-time device precondition that failed.
///
/// Checks run in declaration order; the first failure aborts configuration
/// with nothing attached to the session.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DeviceFailure {
    #[error("no default video capture device")]
    VideoUnavailable,

    #[error("session rejected the device input")]
    InputInvalid,

    #[error("session cannot accept a metadata output")]
    MetadataOutputUnavailable,

    #[error("session cannot accept a raw-frame output")]
    RawFrameOutputUnavailable,
}
