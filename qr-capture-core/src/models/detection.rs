use serde::{Deserialize, Serialize};

use super::camera_models::Symbology;

/// A raw metadata detection as delivered by the camera backend, before
/// filtering. Symbology or payload may be absent for partial reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataCandidate {
    pub symbology: Option<Symbology>,
    pub payload: Option<String>,
}

impl MetadataCandidate {
    pub fn new(symbology: Symbology, payload: impl Into<String>) -> Self {
        Self {
            symbology: Some(symbology),
            payload: Some(payload.into()),
        }
    }
}

/// The single accepted detection of a scanning cycle. Immutable once produced.
///
/// Serializable so the embedding application can hand it across UI or
/// process boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub payload: String,
    pub symbology: Symbology,
}
