use std::time::Duration;

use super::camera_models::{PixelFormat, Symbology};

/// Default pause between an accepted detection and the success callback,
/// giving the presentation layer time to show the confirmation visual.
pub const DEFAULT_CONFIRMATION_DELAY: Duration = Duration::from_secs(1);

/// Opaque handle to a presentation-layer image resource. The engine never
/// interprets it; it is carried through `on_ready_to_display` so the
/// presentation layer can build the focus overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHandle(pub String);

/// Configuration for a scan engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfiguration {
    /// Symbology the metadata output is restricted to.
    pub symbology: Symbology,

    /// Optional focus overlay image supplied by the presentation layer.
    pub focus_overlay: Option<ImageHandle>,

    /// Delay between detection acceptance and the success callback.
    pub confirmation_delay: Duration,

    /// Pixel format applied to the raw-frame output.
    pub raw_pixel_format: PixelFormat,
}

impl ScanConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.confirmation_delay.is_zero() {
            return Err("confirmation delay must be non-zero".into());
        }
        Ok(())
    }
}

impl Default for ScanConfiguration {
    fn default() -> Self {
        Self {
            symbology: Symbology::Qr,
            focus_overlay: None,
            confirmation_delay: DEFAULT_CONFIRMATION_DELAY,
            raw_pixel_format: PixelFormat::Bgra32,
        }
    }
}
