//! Scripted camera device with a controllable torch.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use qr_capture_core::models::camera_models::{CameraInfo, TorchState};
use qr_capture_core::models::error::ScanError;
use qr_capture_core::traits::camera_backend::CameraDevice;

struct CameraState {
    info: CameraInfo,
    has_torch: bool,
    torch_available: AtomicBool,
    fail_torch: AtomicBool,
    torch: Mutex<TorchState>,
}

/// Simulated video capture device.
///
/// Cloning shares the same underlying state, so a test can hold one handle
/// while the engine holds another.
#[derive(Clone)]
pub struct SimCamera {
    state: Arc<CameraState>,
}

impl SimCamera {
    /// The scripted default camera: torch present and available.
    pub fn default_device() -> Self {
        Self::new("sim-camera-0", "Simulated Back Camera", true)
    }

    /// A camera without any torch hardware.
    pub fn without_torch() -> Self {
        Self::new("sim-camera-1", "Simulated Front Camera", false)
    }

    fn new(id: &str, name: &str, has_torch: bool) -> Self {
        Self {
            state: Arc::new(CameraState {
                info: CameraInfo {
                    id: id.into(),
                    name: name.into(),
                    is_default: true,
                },
                has_torch,
                torch_available: AtomicBool::new(has_torch),
                fail_torch: AtomicBool::new(false),
                torch: Mutex::new(TorchState::Off),
            }),
        }
    }

    /// Script the torch as temporarily unavailable.
    pub fn set_torch_available(&self, available: bool) {
        self.state.torch_available.store(available, Ordering::SeqCst);
    }

    /// Make every torch transition fail, for error-path tests.
    pub fn fail_torch_transitions(&self, fail: bool) {
        self.state.fail_torch.store(fail, Ordering::SeqCst);
    }
}

impl CameraDevice for SimCamera {
    fn info(&self) -> CameraInfo {
        self.state.info.clone()
    }

    fn has_torch(&self) -> bool {
        self.state.has_torch
    }

    fn is_torch_available(&self) -> bool {
        self.state.has_torch && self.state.torch_available.load(Ordering::SeqCst)
    }

    fn torch_state(&self) -> TorchState {
        *self.state.torch.lock()
    }

    fn set_torch_state(&self, state: TorchState) -> Result<(), ScanError> {
        if self.state.fail_torch.load(Ordering::SeqCst) {
            return Err(ScanError::Unknown("scripted torch failure".into()));
        }
        *self.state.torch.lock() = state;
        Ok(())
    }
}
