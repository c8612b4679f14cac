use std::fmt;

use serde::{Deserialize, Serialize};

/// Camera permission status, queried from the platform on every check.
///
/// Denied and restricted are collapsed into one state: neither can be
/// resolved by this process, only by the user in system settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthorizationStatus {
    Authorized,
    NotDetermined,
    RestrictedOrDenied,
}

impl AuthorizationStatus {
    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized)
    }
}

impl fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Authorized => "authorized",
            Self::NotDetermined => "not determined",
            Self::RestrictedOrDenied => "restricted or denied",
        };
        f.write_str(s)
    }
}

/// Torch (device light) state. Mutated only by the torch controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TorchState {
    On,
    Off,
}

/// The encoding format a metadata detector is configured to recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Symbology {
    Qr,
    Aztec,
    DataMatrix,
    Pdf417,
}

/// Kind of output attached to a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    Metadata,
    RawFrame,
}

/// Pixel format requested for the raw-frame output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Bgra32,
}

/// A video device available for capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraInfo {
    pub id: String,
    pub name: String,
    pub is_default: bool,
}
