//! Scripted camera backend: permission states and device presence.

use std::sync::Arc;

use parking_lot::Mutex;

use qr_capture_core::models::camera_models::AuthorizationStatus;
use qr_capture_core::traits::camera_backend::CameraBackend;

use crate::camera::SimCamera;
use crate::session::SimSession;

struct BackendState {
    authorization: Mutex<AuthorizationStatus>,
    // Set when the consent prompt is scripted: a status query that sees
    // NotDetermined "presents the prompt" and the outcome applies to the
    // next query, mirroring platform prompt timing.
    prompt_outcome: Mutex<Option<AuthorizationStatus>>,
    device: Mutex<Option<SimCamera>>,
    session: SimSession,
}

/// Simulated camera backend. Clones share state, so tests keep a handle
/// while the engine owns another.
#[derive(Clone)]
pub struct SimBackend {
    state: Arc<BackendState>,
}

impl SimBackend {
    /// Backend with permission granted and the default torch-equipped camera.
    pub fn authorized() -> Self {
        Self::with_authorization(AuthorizationStatus::Authorized)
    }

    pub fn with_authorization(status: AuthorizationStatus) -> Self {
        Self {
            state: Arc::new(BackendState {
                authorization: Mutex::new(status),
                prompt_outcome: Mutex::new(None),
                device: Mutex::new(Some(SimCamera::default_device())),
                session: SimSession::new(),
            }),
        }
    }

    pub fn set_authorization(&self, status: AuthorizationStatus) {
        *self.state.authorization.lock() = status;
    }

    /// Script the outcome of the one-time consent prompt.
    pub fn script_prompt_outcome(&self, outcome: AuthorizationStatus) {
        *self.state.prompt_outcome.lock() = Some(outcome);
    }

    pub fn set_device(&self, device: Option<SimCamera>) {
        *self.state.device.lock() = device;
    }

    pub fn device(&self) -> Option<SimCamera> {
        self.state.device.lock().clone()
    }

    /// The session handed to the engine; tests use it to inject detections
    /// and inspect attachments.
    pub fn session(&self) -> SimSession {
        self.state.session.clone()
    }
}

impl CameraBackend for SimBackend {
    type Device = SimCamera;
    type Session = SimSession;

    fn authorization_status(&self) -> AuthorizationStatus {
        let mut authorization = self.state.authorization.lock();
        let current = *authorization;
        if current == AuthorizationStatus::NotDetermined {
            if let Some(outcome) = self.state.prompt_outcome.lock().take() {
                log::debug!("consent prompt resolved to {outcome}");
                *authorization = outcome;
            }
        }
        current
    }

    fn default_video_device(&self) -> Option<SimCamera> {
        self.state.device.lock().clone()
    }

    fn new_session(&self) -> SimSession {
        self.state.session.clone()
    }
}
