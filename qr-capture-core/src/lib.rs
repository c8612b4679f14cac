//! # qr-capture-core
//!
//! Platform-agnostic QR capture core library.
//!
//! Provides authorization gating, capture session lifecycle, queue-based
//! detection dispatch with single-shot debouncing, and torch control.
//! Platform camera backends (and the scripted `qr-capture-sim` backend)
//! implement the `CameraBackend` family of traits and plug into the
//! generic `ScanEngine`.
//!
//! ## Architecture
//!
//! ```text
//! qr-capture-core (this crate)
//! ├── traits/       ← CameraBackend, CameraDevice, CaptureSession, ScanDelegate
//! ├── models/       ← ScanError, ScanState, ScanConfiguration, DetectionResult, etc.
//! ├── processing/   ← SerialQueue dispatch, DetectionPipeline debounce
//! └── session/      ← AuthorizationGate, TorchController, ScanEngine (facade)
//! ```
//!
//! Detection flows one way: backend → metadata queue → filter/debounce →
//! callback queue → delegate. Control flows the other way: delegate-side
//! calls (`start`/`rescan`/`stop`/`set_torch`) → engine → session/torch.

pub mod models;
pub mod processing;
pub mod session;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::camera_models::{
    AuthorizationStatus, CameraInfo, OutputKind, PixelFormat, Symbology, TorchState,
};
pub use models::config::{ImageHandle, ScanConfiguration, DEFAULT_CONFIRMATION_DELAY};
pub use models::detection::{DetectionResult, MetadataCandidate};
pub use models::error::{DeviceFailure, ScanError};
pub use models::state::{OutputPhase, ScanPhase, ScanState};
pub use processing::dispatch::SerialQueue;
pub use processing::pipeline::{DetectionPipeline, Verdict};
pub use session::authorization::AuthorizationGate;
pub use session::engine::ScanEngine;
pub use session::torch::TorchController;
pub use traits::camera_backend::{CameraBackend, CameraDevice};
pub use traits::capture_session::{CaptureSession, MetadataCallback};
pub use traits::scan_delegate::ScanDelegate;
