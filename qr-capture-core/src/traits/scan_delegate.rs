use crate::models::camera_models::TorchState;
use crate::models::config::ImageHandle;
use crate::models::detection::DetectionResult;
use crate::models::error::ScanError;

/// Event delegate for scan engine notifications.
///
/// All methods are invoked on the engine's callback queue, never on the
/// caller's thread. After a detection is accepted and the confirmation
/// delay elapses, delivery order is `on_torch_changed(Off)` then
/// `on_success`.
pub trait ScanDelegate: Send + Sync {
    /// Called after a successful configuration and on each `rescan`, so the
    /// presentation layer can attach the preview and (re)build the focus
    /// overlay.
    fn on_ready_to_display(&self, overlay: Option<&ImageHandle>);

    /// Called with the single accepted detection of the current cycle.
    fn on_success(&self, result: &DetectionResult);

    /// Called for configuration errors and per-occurrence read failures.
    fn on_failure(&self, error: &ScanError);

    /// Called with the resulting torch state after every applied transition.
    fn on_torch_changed(&self, state: TorchState);
}
