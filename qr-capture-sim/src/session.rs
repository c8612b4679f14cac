//! Scripted capture session recording every attach and lifecycle call.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use qr_capture_core::models::camera_models::{OutputKind, PixelFormat, Symbology};
use qr_capture_core::models::detection::MetadataCandidate;
use qr_capture_core::traits::capture_session::{CaptureSession, MetadataCallback};

use crate::camera::SimCamera;

#[derive(Default)]
struct Attachments {
    inputs: usize,
    outputs: Vec<OutputKind>,
}

struct SessionState {
    accept_input: AtomicBool,
    accept_metadata: AtomicBool,
    accept_raw: AtomicBool,
    in_bracket: AtomicBool,
    staged: Mutex<Attachments>,
    attached: Mutex<Attachments>,
    symbologies: Mutex<Vec<Symbology>>,
    raw_format: Mutex<Option<PixelFormat>>,
    handler: Mutex<Option<MetadataCallback>>,
    running: AtomicBool,
    start_calls: AtomicUsize,
    stop_calls: AtomicUsize,
}

/// Simulated capture session.
///
/// Attachments inside a `begin_configuration`/`commit_configuration`
/// bracket are staged and only applied on commit, so tests can verify the
/// all-or-nothing attach contract. Clones share state.
#[derive(Clone)]
pub struct SimSession {
    state: Arc<SessionState>,
}

impl Default for SimSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SimSession {
    pub fn new() -> Self {
        Self {
            state: Arc::new(SessionState {
                accept_input: AtomicBool::new(true),
                accept_metadata: AtomicBool::new(true),
                accept_raw: AtomicBool::new(true),
                in_bracket: AtomicBool::new(false),
                staged: Mutex::new(Attachments::default()),
                attached: Mutex::new(Attachments::default()),
                symbologies: Mutex::new(Vec::new()),
                raw_format: Mutex::new(None),
                handler: Mutex::new(None),
                running: AtomicBool::new(false),
                start_calls: AtomicUsize::new(0),
                stop_calls: AtomicUsize::new(0),
            }),
        }
    }

    // --- Scripting knobs ---

    pub fn set_accept_input(&self, accept: bool) {
        self.state.accept_input.store(accept, Ordering::SeqCst);
    }

    pub fn set_accept_output(&self, kind: OutputKind, accept: bool) {
        let flag = match kind {
            OutputKind::Metadata => &self.state.accept_metadata,
            OutputKind::RawFrame => &self.state.accept_raw,
        };
        flag.store(accept, Ordering::SeqCst);
    }

    /// Deliver a raw detection to the registered metadata handler.
    ///
    /// Returns false when no handler is registered (session unconfigured).
    pub fn emit_detection(&self, candidate: MetadataCandidate) -> bool {
        let handler = self.state.handler.lock().clone();
        match handler {
            Some(handler) => {
                handler(candidate);
                true
            }
            None => false,
        }
    }

    // --- Inspection ---

    pub fn attached_input_count(&self) -> usize {
        self.state.attached.lock().inputs
    }

    pub fn attached_outputs(&self) -> Vec<OutputKind> {
        self.state.attached.lock().outputs.clone()
    }

    pub fn metadata_symbologies(&self) -> Vec<Symbology> {
        self.state.symbologies.lock().clone()
    }

    pub fn raw_pixel_format(&self) -> Option<PixelFormat> {
        *self.state.raw_format.lock()
    }

    pub fn start_calls(&self) -> usize {
        self.state.start_calls.load(Ordering::SeqCst)
    }

    pub fn stop_calls(&self) -> usize {
        self.state.stop_calls.load(Ordering::SeqCst)
    }
}

impl CaptureSession for SimSession {
    type Device = SimCamera;

    fn can_add_input(&self, _device: &SimCamera) -> bool {
        self.state.accept_input.load(Ordering::SeqCst)
    }

    fn add_input(&self, _device: &SimCamera) {
        if self.state.in_bracket.load(Ordering::SeqCst) {
            self.state.staged.lock().inputs += 1;
        } else {
            self.state.attached.lock().inputs += 1;
        }
    }

    fn can_add_output(&self, kind: OutputKind) -> bool {
        match kind {
            OutputKind::Metadata => self.state.accept_metadata.load(Ordering::SeqCst),
            OutputKind::RawFrame => self.state.accept_raw.load(Ordering::SeqCst),
        }
    }

    fn add_output(&self, kind: OutputKind) {
        if self.state.in_bracket.load(Ordering::SeqCst) {
            self.state.staged.lock().outputs.push(kind);
        } else {
            self.state.attached.lock().outputs.push(kind);
        }
    }

    fn set_metadata_symbologies(&self, symbologies: &[Symbology]) {
        *self.state.symbologies.lock() = symbologies.to_vec();
    }

    fn set_metadata_handler(&self, handler: MetadataCallback) {
        *self.state.handler.lock() = Some(handler);
    }

    fn set_raw_pixel_format(&self, format: PixelFormat) {
        *self.state.raw_format.lock() = Some(format);
    }

    fn begin_configuration(&self) {
        self.state.in_bracket.store(true, Ordering::SeqCst);
        *self.state.staged.lock() = Attachments::default();
    }

    fn commit_configuration(&self) {
        let staged = std::mem::take(&mut *self.state.staged.lock());
        let mut attached = self.state.attached.lock();
        attached.inputs += staged.inputs;
        attached.outputs.extend(staged.outputs);
        self.state.in_bracket.store(false, Ordering::SeqCst);
    }

    fn is_running(&self) -> bool {
        self.state.running.load(Ordering::SeqCst)
    }

    fn start_running(&self) {
        self.state.start_calls.fetch_add(1, Ordering::SeqCst);
        self.state.running.store(true, Ordering::SeqCst);
    }

    fn stop_running(&self) {
        self.state.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.state.running.store(false, Ordering::SeqCst);
    }

    fn remove_all_io(&self) {
        *self.state.staged.lock() = Attachments::default();
        *self.state.attached.lock() = Attachments::default();
        *self.state.handler.lock() = None;
    }
}
