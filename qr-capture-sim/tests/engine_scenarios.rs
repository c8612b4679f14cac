//! Full-engine scenarios driven through the scripted backend.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use qr_capture_core::{
    AuthorizationStatus, CameraDevice, CaptureSession, DetectionResult, DeviceFailure,
    ImageHandle, MetadataCandidate, OutputKind, OutputPhase, ScanConfiguration, ScanDelegate,
    ScanEngine, ScanError, ScanPhase, ScanState, Symbology, TorchState,
};
use qr_capture_sim::SimBackend;

const WAIT: Duration = Duration::from_secs(2);
const SETTLE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Ready(Option<ImageHandle>),
    Success(DetectionResult),
    Failure(ScanError),
    Torch(TorchState),
}

#[derive(Default)]
struct RecordingDelegate {
    events: Mutex<Vec<Event>>,
    condvar: Condvar,
}

impl RecordingDelegate {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, event: Event) {
        self.events.lock().push(event);
        self.condvar.notify_all();
    }

    fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    fn successes(&self) -> Vec<DetectionResult> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Event::Success(r) => Some(r.clone()),
                _ => None,
            })
            .collect()
    }

    /// Block until `pred` holds over the recorded events or `timeout` passes.
    fn wait_until(&self, timeout: Duration, pred: impl Fn(&[Event]) -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        let mut events = self.events.lock();
        loop {
            if pred(&events) {
                return true;
            }
            if self.condvar.wait_until(&mut events, deadline).timed_out() {
                return pred(&events);
            }
        }
    }
}

impl ScanDelegate for RecordingDelegate {
    fn on_ready_to_display(&self, overlay: Option<&ImageHandle>) {
        self.push(Event::Ready(overlay.cloned()));
    }

    fn on_success(&self, result: &DetectionResult) {
        self.push(Event::Success(result.clone()));
    }

    fn on_failure(&self, error: &ScanError) {
        self.push(Event::Failure(error.clone()));
    }

    fn on_torch_changed(&self, state: TorchState) {
        self.push(Event::Torch(state));
    }
}

fn short_delay_config() -> ScanConfiguration {
    ScanConfiguration {
        confirmation_delay: Duration::from_millis(50),
        ..ScanConfiguration::default()
    }
}

fn qr(payload: &str) -> MetadataCandidate {
    MetadataCandidate::new(Symbology::Qr, payload)
}

fn running_engine(backend: &SimBackend) -> (ScanEngine<SimBackend>, Arc<RecordingDelegate>) {
    let delegate = RecordingDelegate::new();
    let engine = ScanEngine::new(backend.clone());
    engine.set_delegate(delegate.clone());
    engine
        .configure(short_delay_config())
        .expect("configure should succeed");
    engine.start();
    (engine, delegate)
}

fn wait_for(pred: impl Fn() -> bool, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if pred() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    pred()
}

#[test]
fn exactly_one_success_per_cycle() {
    let backend = SimBackend::authorized();
    let session = backend.session();
    let (engine, delegate) = running_engine(&backend);

    assert!(wait_for(|| session.is_running(), WAIT));

    // A burst of detections while armed: only the first qualifying one wins.
    session.emit_detection(qr("first"));
    session.emit_detection(qr("second"));
    session.emit_detection(qr("third"));
    session.emit_detection(MetadataCandidate::new(Symbology::Aztec, "noise"));

    assert!(delegate.wait_until(WAIT, |e| {
        e.iter().any(|ev| matches!(ev, Event::Success(_)))
    }));
    std::thread::sleep(SETTLE);

    let successes = delegate.successes();
    assert_eq!(successes.len(), 1);
    assert_eq!(successes[0].payload, "first");
    // Post-acceptance events are debounced silently, not read failures.
    assert!(!delegate
        .events()
        .iter()
        .any(|ev| matches!(ev, Event::Failure(_))));
    assert_eq!(engine.state(), ScanState::Running(ScanPhase::Cooldown));
}

#[test]
fn rescan_rearms_for_one_more_success() {
    let backend = SimBackend::authorized();
    let session = backend.session();
    let (engine, delegate) = running_engine(&backend);

    assert!(wait_for(|| session.is_running(), WAIT));
    session.emit_detection(qr("first"));
    assert!(delegate.wait_until(WAIT, |e| {
        e.iter().any(|ev| matches!(ev, Event::Success(_)))
    }));

    // Ignored until rescan re-arms.
    session.emit_detection(qr("ignored"));
    std::thread::sleep(SETTLE);
    assert_eq!(delegate.successes().len(), 1);

    engine.rescan();
    assert_eq!(engine.state(), ScanState::Running(ScanPhase::Armed));
    session.emit_detection(qr("second"));

    assert!(delegate.wait_until(WAIT, |e| {
        e.iter().filter(|ev| matches!(ev, Event::Success(_))).count() == 2
    }));
    let payloads: Vec<_> = delegate.successes().iter().map(|r| r.payload.clone()).collect();
    assert_eq!(payloads, vec!["first", "second"]);

    // Rescan resets the overlay: one ready event per configure/rescan.
    let readies = delegate
        .events()
        .iter()
        .filter(|ev| matches!(ev, Event::Ready(_)))
        .count();
    assert_eq!(readies, 2);
}

#[test]
fn failed_precondition_leaves_nothing_attached() {
    struct Case {
        name: &'static str,
        prepare: fn(&SimBackend),
        expected: DeviceFailure,
    }
    let cases = [
        Case {
            name: "no device",
            prepare: |b| b.set_device(None),
            expected: DeviceFailure::VideoUnavailable,
        },
        Case {
            name: "input rejected",
            prepare: |b| b.session().set_accept_input(false),
            expected: DeviceFailure::InputInvalid,
        },
        Case {
            name: "metadata output rejected",
            prepare: |b| b.session().set_accept_output(OutputKind::Metadata, false),
            expected: DeviceFailure::MetadataOutputUnavailable,
        },
        Case {
            name: "raw output rejected",
            prepare: |b| b.session().set_accept_output(OutputKind::RawFrame, false),
            expected: DeviceFailure::RawFrameOutputUnavailable,
        },
    ];

    for case in cases {
        let backend = SimBackend::authorized();
        (case.prepare)(&backend);
        let session = backend.session();
        let delegate = RecordingDelegate::new();
        let engine = ScanEngine::new(backend.clone());
        engine.set_delegate(delegate.clone());

        let result = engine.configure(short_delay_config());
        assert_eq!(
            result,
            Err(ScanError::DeviceFailure(case.expected)),
            "{}",
            case.name
        );
        assert_eq!(session.attached_input_count(), 0, "{}", case.name);
        assert!(session.attached_outputs().is_empty(), "{}", case.name);
        assert!(!session.is_running(), "{}", case.name);
        assert_eq!(engine.state(), ScanState::Idle, "{}", case.name);

        // Surfaced exactly once through the delegate as well.
        assert!(delegate.wait_until(WAIT, |e| {
            e.len() == 1 && e[0] == Event::Failure(ScanError::DeviceFailure(case.expected))
        }));
    }
}

#[test]
fn configure_attaches_input_and_both_outputs() {
    let backend = SimBackend::authorized();
    let session = backend.session();
    let (_engine, delegate) = running_engine(&backend);

    assert_eq!(session.attached_input_count(), 1);
    assert_eq!(
        session.attached_outputs(),
        vec![OutputKind::Metadata, OutputKind::RawFrame]
    );
    assert_eq!(session.metadata_symbologies(), vec![Symbology::Qr]);
    assert!(session.raw_pixel_format().is_some());
    assert!(delegate.wait_until(WAIT, |e| {
        e.iter().any(|ev| matches!(ev, Event::Ready(_)))
    }));
}

#[test]
fn torch_is_a_silent_noop_while_idle() {
    let backend = SimBackend::authorized();
    let delegate = RecordingDelegate::new();
    let engine = ScanEngine::new(backend.clone());
    engine.set_delegate(delegate.clone());
    engine.configure(short_delay_config()).unwrap();

    // Configured but not started: no output is active.
    assert_eq!(engine.output_phase(), OutputPhase::Inactive);
    engine.set_torch(true);

    assert!(!delegate.wait_until(SETTLE, |e| {
        e.iter().any(|ev| matches!(ev, Event::Torch(_)))
    }));
    assert_eq!(
        backend.device().unwrap().torch_state(),
        TorchState::Off
    );
}

#[test]
fn repeated_torch_on_toggles_off() {
    let backend = SimBackend::authorized();
    let (engine, delegate) = running_engine(&backend);

    engine.set_torch(true);
    assert!(delegate.wait_until(WAIT, |e| {
        e.iter().any(|ev| *ev == Event::Torch(TorchState::On))
    }));

    engine.set_torch(true);
    assert!(delegate.wait_until(WAIT, |e| {
        e.iter().any(|ev| *ev == Event::Torch(TorchState::Off))
    }));
    assert_eq!(backend.device().unwrap().torch_state(), TorchState::Off);
}

#[test]
fn url_detection_forces_torch_off_before_success() {
    let backend = SimBackend::authorized();
    let session = backend.session();
    let (engine, delegate) = running_engine(&backend);

    assert!(wait_for(|| session.is_running(), WAIT));
    engine.set_torch(true);
    assert!(delegate.wait_until(WAIT, |e| {
        e.iter().any(|ev| *ev == Event::Torch(TorchState::On))
    }));

    session.emit_detection(qr("https://example.com/x"));
    assert!(delegate.wait_until(WAIT, |e| {
        e.iter().any(|ev| matches!(ev, Event::Success(_)))
    }));

    let events = delegate.events();
    let success_at = events
        .iter()
        .position(|ev| matches!(ev, Event::Success(_)))
        .unwrap();
    assert_eq!(
        events[success_at],
        Event::Success(DetectionResult {
            payload: "https://example.com/x".into(),
            symbology: Symbology::Qr,
        })
    );
    // The torch-off notification lands immediately before the result.
    assert_eq!(events[success_at - 1], Event::Torch(TorchState::Off));
    assert_eq!(backend.device().unwrap().torch_state(), TorchState::Off);
}

#[test]
fn not_determined_configures_nothing_until_prompt_resolves() {
    let backend = SimBackend::with_authorization(AuthorizationStatus::NotDetermined);
    backend.script_prompt_outcome(AuthorizationStatus::Authorized);
    let session = backend.session();
    let delegate = RecordingDelegate::new();
    let engine = ScanEngine::new(backend.clone());
    engine.set_delegate(delegate.clone());

    let result = engine.configure(short_delay_config());
    assert_eq!(
        result,
        Err(ScanError::Unauthorized(AuthorizationStatus::NotDetermined))
    );
    assert_eq!(
        engine.state(),
        ScanState::Unauthorized(AuthorizationStatus::NotDetermined)
    );
    assert_eq!(session.attached_input_count(), 0);
    assert!(session.attached_outputs().is_empty());
    assert_eq!(session.start_calls(), 0);
    assert!(delegate.wait_until(WAIT, |e| {
        e.iter().any(|ev| {
            *ev == Event::Failure(ScanError::Unauthorized(AuthorizationStatus::NotDetermined))
        })
    }));

    // The scripted prompt granted access; a retry configures and runs.
    assert!(engine.configure(short_delay_config()).is_ok());
    engine.start();
    assert!(wait_for(|| session.is_running(), WAIT));
}

#[test]
fn denied_is_terminal_for_the_attempt() {
    let backend = SimBackend::with_authorization(AuthorizationStatus::RestrictedOrDenied);
    let session = backend.session();
    let delegate = RecordingDelegate::new();
    let engine = ScanEngine::new(backend.clone());
    engine.set_delegate(delegate.clone());

    assert_eq!(
        engine.configure(short_delay_config()),
        Err(ScanError::Unauthorized(
            AuthorizationStatus::RestrictedOrDenied
        ))
    );
    assert_eq!(session.attached_input_count(), 0);

    // start and rescan are no-ops that re-report the permission error.
    engine.start();
    engine.rescan();
    std::thread::sleep(SETTLE);
    assert_eq!(session.start_calls(), 0);
    assert!(delegate.events().iter().all(|ev| matches!(
        ev,
        Event::Failure(ScanError::Unauthorized(_))
    )));
}

#[test]
fn teardown_during_confirmation_delay_suppresses_the_result() {
    let backend = SimBackend::authorized();
    let session = backend.session();
    let delegate = RecordingDelegate::new();
    let engine = ScanEngine::new(backend.clone());
    engine.set_delegate(delegate.clone());
    engine
        .configure(ScanConfiguration {
            confirmation_delay: Duration::from_millis(200),
            ..ScanConfiguration::default()
        })
        .unwrap();
    engine.start();
    assert!(wait_for(|| session.is_running(), WAIT));

    session.emit_detection(qr("late"));
    assert!(wait_for(
        || engine.state() == ScanState::Running(ScanPhase::Cooldown),
        WAIT
    ));

    engine.teardown();
    std::thread::sleep(Duration::from_millis(400));

    assert!(!delegate
        .events()
        .iter()
        .any(|ev| matches!(ev, Event::Success(_))));
    assert_eq!(engine.state(), ScanState::Idle);
    assert_eq!(session.attached_input_count(), 0);
}

#[test]
fn read_failure_keeps_the_engine_listening() {
    let backend = SimBackend::authorized();
    let session = backend.session();
    let (_engine, delegate) = running_engine(&backend);

    assert!(wait_for(|| session.is_running(), WAIT));
    session.emit_detection(MetadataCandidate::new(Symbology::Aztec, "wrong"));
    assert!(delegate.wait_until(WAIT, |e| {
        e.iter().any(|ev| *ev == Event::Failure(ScanError::ReadFailure))
    }));

    // Still armed: the next qualifying detection succeeds.
    session.emit_detection(qr("ok"));
    assert!(delegate.wait_until(WAIT, |e| {
        e.iter().any(|ev| matches!(ev, Event::Success(_)))
    }));
    assert_eq!(delegate.successes()[0].payload, "ok");
}

#[test]
fn start_twice_starts_the_hardware_once() {
    let backend = SimBackend::authorized();
    let session = backend.session();
    let (engine, _delegate) = running_engine(&backend);

    assert!(wait_for(|| session.is_running(), WAIT));
    engine.start();
    std::thread::sleep(SETTLE);
    assert_eq!(session.start_calls(), 1);
}

#[test]
fn stop_is_a_noop_unless_running() {
    let backend = SimBackend::authorized();
    let session = backend.session();
    let delegate = RecordingDelegate::new();
    let engine = ScanEngine::new(backend.clone());
    engine.set_delegate(delegate.clone());
    engine.configure(short_delay_config()).unwrap();

    engine.stop();
    std::thread::sleep(SETTLE);
    assert_eq!(session.stop_calls(), 0);
}

#[test]
fn stop_disables_outputs_synchronously() {
    let backend = SimBackend::authorized();
    let session = backend.session();
    let (engine, delegate) = running_engine(&backend);

    assert!(wait_for(|| session.is_running(), WAIT));
    engine.stop();

    // Output flags drop with the call, before the hardware stop lands.
    assert_eq!(engine.output_phase(), OutputPhase::Inactive);
    assert_eq!(engine.state(), ScanState::Stopped);
    assert!(wait_for(|| session.stop_calls() == 1, WAIT));

    // Detections after stop are debounced by the inactive phase.
    session.emit_detection(qr("after-stop"));
    std::thread::sleep(SETTLE);
    assert!(!delegate
        .events()
        .iter()
        .any(|ev| matches!(ev, Event::Success(_))));
}

#[test]
fn dropping_the_engine_tears_down_the_session() {
    let backend = SimBackend::authorized();
    let session = backend.session();
    {
        let (engine, _delegate) = running_engine(&backend);
        assert!(wait_for(|| session.is_running(), WAIT));
        assert_eq!(session.attached_input_count(), 1);
        drop(engine);
    }
    assert!(!session.is_running());
    assert_eq!(session.attached_input_count(), 0);
    assert!(session.attached_outputs().is_empty());
}

#[test]
fn overlay_handle_is_carried_to_ready() {
    let backend = SimBackend::authorized();
    let delegate = RecordingDelegate::new();
    let engine = ScanEngine::new(backend.clone());
    engine.set_delegate(delegate.clone());

    let overlay = ImageHandle("focus-frame".into());
    engine
        .configure(ScanConfiguration {
            focus_overlay: Some(overlay.clone()),
            ..short_delay_config()
        })
        .unwrap();

    assert!(delegate.wait_until(WAIT, |e| {
        e.iter().any(|ev| *ev == Event::Ready(Some(overlay.clone())))
    }));
}
