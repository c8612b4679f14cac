use crate::models::camera_models::TorchState;
use crate::models::state::OutputPhase;
use crate::traits::camera_backend::CameraDevice;

/// Torch toggling, gated on device capability and an active output.
pub struct TorchController;

impl TorchController {
    /// Apply a torch request against `device`.
    ///
    /// Silent no-op (returns `None`) when the device has no torch, the torch
    /// is unavailable, or no output is active — the torch is never toggled
    /// while the engine is fully idle.
    ///
    /// Requesting on while the torch is already on toggles it off. Every
    /// applied transition returns the resulting state for observer
    /// notification, including a same-state off.
    pub fn apply<D: CameraDevice>(
        device: &D,
        phase: OutputPhase,
        requested_on: bool,
    ) -> Option<TorchState> {
        if !device.has_torch() || !device.is_torch_available() || !phase.is_active() {
            return None;
        }

        let next = if requested_on && device.torch_state() == TorchState::On {
            TorchState::Off
        } else if requested_on {
            TorchState::On
        } else {
            TorchState::Off
        };

        if let Err(error) = device.set_torch_state(next) {
            log::warn!("torch transition failed: {error}");
            return None;
        }
        Some(next)
    }
}
