use super::camera_models::AuthorizationStatus;

/// Engine facade state machine.
///
/// State transitions:
/// ```text
/// idle → configuring → authorized / unauthorized
/// authorized → running(armed) ⇄ running(cooldown) → stopped
/// any state → idle (teardown)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Configuring,
    Unauthorized(AuthorizationStatus),
    Authorized,
    Running(ScanPhase),
    Stopped,
}

/// Detection phase while running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    /// Accepting the next qualifying event as the unique result of the cycle.
    Armed,
    /// Ignoring further events until `rescan`.
    Cooldown,
}

impl ScanState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running(_))
    }

    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized | Self::Running(_))
    }
}

/// Which capture output is currently consuming events.
///
/// The metadata and raw-frame outputs are mutually exclusive phases of one
/// scanning cycle. Encoding them as a single enum makes the invalid
/// both-enabled configuration unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputPhase {
    /// Neither output enabled; the engine is idle or stopped.
    Inactive,
    /// Metadata output enabled: armed for detection.
    Metadata,
    /// Raw-frame output enabled: cooldown after an accepted detection.
    RawFrame,
}

impl OutputPhase {
    /// True when any output is enabled. Gates torch toggling.
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Inactive)
    }
}
