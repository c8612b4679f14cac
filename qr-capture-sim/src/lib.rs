//! # qr-capture-sim
//!
//! Scripted in-process camera backend for qr-capture-core.
//!
//! Provides:
//! - `SimBackend` — permission states, prompt scripting, device presence
//! - `SimCamera` — torch-equipped video device with failure injection
//! - `SimSession` — capture session recording attachments and lifecycle calls
//!
//! Everything a real platform backend would get from the camera subsystem
//! is scripted here, so the full engine can be driven in tests and on
//! machines without a camera.
//!
//! ## Usage
//! ```ignore
//! use qr_capture_core::{ScanConfiguration, ScanEngine};
//! use qr_capture_sim::SimBackend;
//!
//! let backend = SimBackend::authorized();
//! let session = backend.session();
//! let engine = ScanEngine::new(backend);
//! engine.configure(ScanConfiguration::default()).unwrap();
//! engine.start();
//! // session.emit_detection(...) to feed scripted detections
//! ```

pub mod backend;
pub mod camera;
pub mod session;

pub use backend::SimBackend;
pub use camera::SimCamera;
pub use session::SimSession;
