use std::sync::Arc;

use crate::models::camera_models::{OutputKind, PixelFormat, Symbology};
use crate::models::detection::MetadataCandidate;
use crate::traits::camera_backend::CameraDevice;

/// Callback invoked by the backend for each raw metadata detection.
///
/// Fires on a backend delivery thread; implementations must hand the
/// candidate off to their own queue and return quickly.
pub type MetadataCallback = Arc<dyn Fn(MetadataCandidate) + Send + Sync + 'static>;

/// A platform capture session: owns the device input and output attachments
/// and the running state of the hardware pipeline.
///
/// Attach/detach calls are only valid inside a
/// `begin_configuration`/`commit_configuration` bracket; the bracket applies
/// the batched changes atomically.
pub trait CaptureSession: Send + Sync + 'static {
    type Device: CameraDevice;

    /// Whether the session would accept `device` as an input.
    fn can_add_input(&self, device: &Self::Device) -> bool;

    fn add_input(&self, device: &Self::Device);

    /// Whether the session would accept an output of `kind`.
    fn can_add_output(&self, kind: OutputKind) -> bool;

    fn add_output(&self, kind: OutputKind);

    /// Restrict the metadata output to the given symbologies.
    fn set_metadata_symbologies(&self, symbologies: &[Symbology]);

    /// Register the handler for raw metadata detections.
    fn set_metadata_handler(&self, handler: MetadataCallback);

    /// Pixel format for buffers delivered by the raw-frame output.
    fn set_raw_pixel_format(&self, format: PixelFormat);

    fn begin_configuration(&self);

    fn commit_configuration(&self);

    fn is_running(&self) -> bool;

    /// Start the hardware pipeline. Blocking call; dispatch onto a worker
    /// queue, never the presentation thread.
    fn start_running(&self);

    /// Stop the hardware pipeline. Blocking, same dispatch rule as start.
    fn stop_running(&self);

    /// Detach every input and output.
    fn remove_all_io(&self);
}
