use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::models::camera_models::{OutputKind, TorchState};
use crate::models::config::ScanConfiguration;
use crate::models::detection::{DetectionResult, MetadataCandidate};
use crate::models::error::{DeviceFailure, ScanError};
use crate::models::state::{OutputPhase, ScanPhase, ScanState};
use crate::processing::dispatch::SerialQueue;
use crate::processing::pipeline::{DetectionPipeline, Verdict};
use crate::session::authorization::AuthorizationGate;
use crate::session::torch::TorchController;
use crate::traits::camera_backend::{CameraBackend, CameraDevice};
use crate::traits::capture_session::{CaptureSession, MetadataCallback};
use crate::traits::scan_delegate::ScanDelegate;

/// Mutable engine state, protected by `parking_lot::Mutex`.
struct Shared<D> {
    state: ScanState,
    device: Option<D>,
    config: ScanConfiguration,
    delegate: Option<Arc<dyn ScanDelegate>>,
}

struct EngineInner<B: CameraBackend> {
    backend: B,
    session: B::Session,
    pipeline: DetectionPipeline,
    shared: Mutex<Shared<B::Device>>,

    // Dedicated queues: session start and detection processing on the
    // metadata queue, session stop on the raw-frame queue, delegate
    // notifications and the confirmation delay on the callback queue.
    metadata_queue: SerialQueue,
    raw_frame_queue: SerialQueue,
    callback_queue: SerialQueue,

    // Jobs in flight hold only a weak reference; this flag covers the case
    // where teardown ran but the owner is still alive.
    torn_down: AtomicBool,
    weak_self: Weak<EngineInner<B>>,
}

/// The capture & detection engine facade.
///
/// Owns the capture session, the detection pipeline, and the worker queues.
/// Data flows hardware → metadata queue → filter/debounce → callback queue
/// → delegate; control flows delegate-side calls → engine → session/torch.
///
/// ```text
/// idle → configuring → authorized / unauthorized
/// authorized → running(armed) ⇄ running(cooldown) → stopped
/// any state → idle (teardown)
/// ```
pub struct ScanEngine<B: CameraBackend> {
    inner: Arc<EngineInner<B>>,
}

impl<B: CameraBackend> ScanEngine<B> {
    pub fn new(backend: B) -> Self {
        let session = backend.new_session();
        let config = ScanConfiguration::default();
        let pipeline = DetectionPipeline::new(config.symbology);

        let inner = Arc::new_cyclic(|weak| EngineInner {
            backend,
            session,
            pipeline,
            shared: Mutex::new(Shared {
                state: ScanState::Idle,
                device: None,
                config,
                delegate: None,
            }),
            metadata_queue: SerialQueue::new("qr-metadata"),
            raw_frame_queue: SerialQueue::new("qr-raw-frame"),
            callback_queue: SerialQueue::new("qr-callback"),
            torn_down: AtomicBool::new(false),
            weak_self: weak.clone(),
        });

        Self { inner }
    }

    /// Register the observer. Held as the only strong reference the engine
    /// keeps to the presentation side; released on teardown.
    pub fn set_delegate(&self, delegate: Arc<dyn ScanDelegate>) {
        self.inner.shared.lock().delegate = Some(delegate);
    }

    pub fn state(&self) -> ScanState {
        self.inner.shared.lock().state
    }

    pub fn output_phase(&self) -> OutputPhase {
        self.inner.pipeline.phase()
    }

    /// Configure the capture session.
    ///
    /// Checks the camera permission first, then runs the four device
    /// preconditions in order and attaches input and outputs in one atomic
    /// configuration bracket. Any failure leaves nothing attached and is
    /// both returned and surfaced once through `on_failure`.
    pub fn configure(&self, config: ScanConfiguration) -> Result<(), ScanError> {
        let inner = &self.inner;
        if inner.torn_down.load(Ordering::SeqCst) {
            return Err(ScanError::Unknown("engine has been torn down".into()));
        }

        {
            let mut shared = inner.shared.lock();
            match shared.state {
                ScanState::Idle | ScanState::Unauthorized(_) => {
                    shared.state = ScanState::Configuring;
                }
                _ => {
                    return Err(ScanError::Unknown(
                        "configure is only valid from the idle state".into(),
                    ))
                }
            }
        }

        if let Err(reason) = config.validate() {
            inner.shared.lock().state = ScanState::Idle;
            let error = ScanError::Unknown(reason);
            inner.emit_failure(error.clone());
            return Err(error);
        }

        let gate = AuthorizationGate::new(&inner.backend);
        let status = gate.status();
        if !status.is_authorized() {
            log::warn!("camera permission {status}; session not configured");
            inner.shared.lock().state = ScanState::Unauthorized(status);
            let error = ScanError::Unauthorized(status);
            inner.emit_failure(error.clone());
            return Err(error);
        }

        match inner.attach_session(&config) {
            Ok(device) => {
                inner.pipeline.set_target(config.symbology);
                let mut shared = inner.shared.lock();
                shared.device = Some(device);
                shared.config = config;
                shared.state = ScanState::Authorized;
                drop(shared);
                inner.emit_ready();
                Ok(())
            }
            Err(error) => {
                inner.shared.lock().state = ScanState::Idle;
                inner.emit_failure(error.clone());
                Err(error)
            }
        }
    }

    /// Start the capture session. No-op if already running or not
    /// authorized (the permission error is still reported). The blocking
    /// hardware start is dispatched onto the metadata queue.
    pub fn start(&self) {
        let inner = &self.inner;
        if inner.torn_down.load(Ordering::SeqCst) {
            return;
        }
        if !inner.check_authorized() || inner.session.is_running() {
            return;
        }

        inner.pipeline.arm();
        inner.shared.lock().state = ScanState::Running(ScanPhase::Armed);

        let weak = Weak::clone(&inner.weak_self);
        inner.metadata_queue.dispatch(move || {
            if let Some(inner) = weak.upgrade() {
                inner.session.start_running();
            }
        });
    }

    /// Stop the capture session. No-op if not running. Outputs are disabled
    /// synchronously; the blocking hardware stop is dispatched onto the
    /// raw-frame queue.
    pub fn stop(&self) {
        let inner = &self.inner;
        if inner.torn_down.load(Ordering::SeqCst) || !inner.session.is_running() {
            return;
        }

        let weak = Weak::clone(&inner.weak_self);
        inner.raw_frame_queue.dispatch(move || {
            if let Some(inner) = weak.upgrade() {
                inner.session.stop_running();
            }
        });

        inner.pipeline.disarm();
        inner.shared.lock().state = ScanState::Stopped;
    }

    /// Re-arm detection for a new scanning cycle and reset the focus
    /// overlay. No-op while already armed; reports the permission error and
    /// does nothing when not authorized.
    pub fn rescan(&self) {
        let inner = &self.inner;
        if inner.torn_down.load(Ordering::SeqCst) || !inner.check_authorized() {
            return;
        }

        {
            let mut shared = inner.shared.lock();
            if shared.state == ScanState::Running(ScanPhase::Cooldown) {
                shared.state = ScanState::Running(ScanPhase::Armed);
            }
        }
        inner.pipeline.arm();
        inner.emit_ready();
    }

    /// Toggle the device torch. Silent no-op unless a torch is available
    /// and an output is active; repeat-on toggles off (see
    /// [`TorchController::apply`]).
    pub fn set_torch(&self, on: bool) {
        let inner = &self.inner;
        if inner.torn_down.load(Ordering::SeqCst) {
            return;
        }

        let (device, delegate) = {
            let shared = inner.shared.lock();
            (shared.device.clone(), shared.delegate.clone())
        };
        let Some(device) = device else { return };

        if let Some(state) = TorchController::apply(&device, inner.pipeline.phase(), on) {
            if let Some(delegate) = delegate {
                inner
                    .callback_queue
                    .dispatch(move || delegate.on_torch_changed(state));
            }
        }
    }

    /// Release the session: torch off, all inputs and outputs removed,
    /// delegate dropped. Idempotent; also runs on `Drop`. A confirmation
    /// callback pending at this point will no-op instead of emitting.
    pub fn teardown(&self) {
        self.inner.teardown();
    }
}

impl<B: CameraBackend> Drop for ScanEngine<B> {
    fn drop(&mut self) {
        self.inner.teardown();
    }
}

impl<B: CameraBackend> EngineInner<B> {
    /// Run the ordered device preconditions and the atomic attach bracket.
    fn attach_session(&self, config: &ScanConfiguration) -> Result<B::Device, ScanError> {
        let device = self
            .backend
            .default_video_device()
            .ok_or(ScanError::DeviceFailure(DeviceFailure::VideoUnavailable))?;
        log::debug!("configuring capture session for {}", device.info().name);

        if !self.session.can_add_input(&device) {
            return Err(ScanError::DeviceFailure(DeviceFailure::InputInvalid));
        }
        if !self.session.can_add_output(OutputKind::Metadata) {
            return Err(ScanError::DeviceFailure(
                DeviceFailure::MetadataOutputUnavailable,
            ));
        }
        if !self.session.can_add_output(OutputKind::RawFrame) {
            return Err(ScanError::DeviceFailure(
                DeviceFailure::RawFrameOutputUnavailable,
            ));
        }

        self.session.begin_configuration();
        self.session.add_input(&device);
        self.session.add_output(OutputKind::Metadata);
        self.session.set_metadata_symbologies(&[config.symbology]);
        self.session.set_metadata_handler(self.metadata_handler());
        self.session.set_raw_pixel_format(config.raw_pixel_format);
        self.session.add_output(OutputKind::RawFrame);
        self.session.commit_configuration();

        Ok(device)
    }

    /// Handler registered with the session's metadata output. Hops onto the
    /// metadata queue so detection processing is serialized there.
    fn metadata_handler(&self) -> MetadataCallback {
        let weak = Weak::clone(&self.weak_self);
        Arc::new(move |candidate: MetadataCandidate| {
            let Some(inner) = weak.upgrade() else { return };
            let weak = Weak::clone(&inner.weak_self);
            inner.metadata_queue.dispatch(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.handle_candidate(candidate);
                }
            });
        })
    }

    /// Runs on the metadata queue, in arrival order.
    fn handle_candidate(&self, candidate: MetadataCandidate) {
        if self.torn_down.load(Ordering::SeqCst) {
            return;
        }

        match self.pipeline.process(candidate) {
            Verdict::Ignored => {}
            Verdict::ReadFailure => {
                log::debug!("unreadable metadata candidate");
                self.emit_failure(ScanError::ReadFailure);
            }
            Verdict::Accepted(result) => {
                // The pipeline has already flipped to cooldown; the delay
                // only postpones delivery, not acceptance.
                let delay = {
                    let mut shared = self.shared.lock();
                    shared.state = ScanState::Running(ScanPhase::Cooldown);
                    shared.config.confirmation_delay
                };

                let weak = Weak::clone(&self.weak_self);
                self.callback_queue.dispatch_after(delay, move || {
                    if let Some(inner) = weak.upgrade() {
                        inner.finish_detection(result);
                    }
                });
            }
        }
    }

    /// Runs on the callback queue after the confirmation delay.
    fn finish_detection(&self, result: DetectionResult) {
        if self.torn_down.load(Ordering::SeqCst) {
            return;
        }

        let (device, delegate) = {
            let shared = self.shared.lock();
            (shared.device.clone(), shared.delegate.clone())
        };
        let Some(delegate) = delegate else { return };

        if let Some(device) = device {
            if let Some(state) = TorchController::apply(&device, self.pipeline.phase(), false) {
                delegate.on_torch_changed(state);
            }
        }
        delegate.on_success(&result);
    }

    fn check_authorized(&self) -> bool {
        match AuthorizationGate::new(&self.backend).ensure_authorized() {
            Ok(()) => true,
            Err(error) => {
                self.emit_failure(error);
                false
            }
        }
    }

    fn emit_failure(&self, error: ScanError) {
        let Some(delegate) = self.shared.lock().delegate.clone() else {
            return;
        };
        self.callback_queue
            .dispatch(move || delegate.on_failure(&error));
    }

    fn emit_ready(&self) {
        let (delegate, overlay) = {
            let shared = self.shared.lock();
            (shared.delegate.clone(), shared.config.focus_overlay.clone())
        };
        let Some(delegate) = delegate else { return };
        self.callback_queue
            .dispatch(move || delegate.on_ready_to_display(overlay.as_ref()));
    }

    fn teardown(&self) {
        if self.torn_down.swap(true, Ordering::SeqCst) {
            return;
        }

        let device = self.shared.lock().device.take();
        if let Some(device) = device {
            if device.has_torch() {
                if let Err(error) = device.set_torch_state(TorchState::Off) {
                    log::warn!("failed to force torch off during teardown: {error}");
                }
            }
        }

        if self.session.is_running() {
            self.session.stop_running();
        }
        self.session.remove_all_io();
        self.pipeline.disarm();

        let mut shared = self.shared.lock();
        shared.state = ScanState::Idle;
        shared.delegate = None;
    }
}
