use crate::models::camera_models::AuthorizationStatus;
use crate::models::error::ScanError;
use crate::traits::camera_backend::CameraBackend;

/// Gates engine operations on the platform camera permission.
///
/// Each check queries the backend fresh; the status is never cached, so a
/// permission change in system settings is picked up on the next operation.
pub struct AuthorizationGate<'a, B: CameraBackend> {
    backend: &'a B,
}

impl<'a, B: CameraBackend> AuthorizationGate<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Query the current permission status. May trigger the platform's
    /// one-time consent prompt when the status is not determined.
    pub fn status(&self) -> AuthorizationStatus {
        self.backend.authorization_status()
    }

    /// Query and classify: authorized proceeds, anything else is an error
    /// carrying the offending status.
    pub fn ensure_authorized(&self) -> Result<(), ScanError> {
        classify(self.status())
    }
}

pub fn classify(status: AuthorizationStatus) -> Result<(), ScanError> {
    if status.is_authorized() {
        Ok(())
    } else {
        Err(ScanError::Unauthorized(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorized_passes() {
        assert_eq!(classify(AuthorizationStatus::Authorized), Ok(()));
    }

    #[test]
    fn non_authorized_states_carry_the_status() {
        for status in [
            AuthorizationStatus::NotDetermined,
            AuthorizationStatus::RestrictedOrDenied,
        ] {
            assert_eq!(classify(status), Err(ScanError::Unauthorized(status)));
        }
    }
}
