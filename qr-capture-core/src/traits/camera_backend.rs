use crate::models::camera_models::{AuthorizationStatus, CameraInfo, TorchState};
use crate::models::error::ScanError;
use crate::traits::capture_session::CaptureSession;

/// Interface to the platform camera subsystem.
///
/// Implemented by platform backends (AVFoundation, Media Foundation, V4L2)
/// and by `qr-capture-sim` for tests.
pub trait CameraBackend: Send + Sync + 'static {
    type Device: CameraDevice;
    type Session: CaptureSession<Device = Self::Device>;

    /// Current camera permission status.
    ///
    /// Queried fresh on every check, never cached. When the status is
    /// not-determined, the platform may present its one-time consent prompt
    /// as a side effect of this call.
    fn authorization_status(&self) -> AuthorizationStatus;

    /// The system default video capture device, if any.
    fn default_video_device(&self) -> Option<Self::Device>;

    /// Create an unconfigured capture session.
    fn new_session(&self) -> Self::Session;
}

/// A video capture device with an optional torch.
pub trait CameraDevice: Clone + Send + Sync + 'static {
    fn info(&self) -> CameraInfo;

    /// Whether the device physically has a torch.
    fn has_torch(&self) -> bool;

    /// Whether the torch can be used right now (not overheated, not in use).
    fn is_torch_available(&self) -> bool;

    fn torch_state(&self) -> TorchState;

    /// Set the torch, wrapping the platform lock/set/unlock sequence.
    fn set_torch_state(&self, state: TorchState) -> Result<(), ScanError>;
}
