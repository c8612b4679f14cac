use parking_lot::Mutex;

use crate::models::camera_models::Symbology;
use crate::models::detection::{DetectionResult, MetadataCandidate};
use crate::models::state::OutputPhase;

/// Outcome of running one raw detection event through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Discarded without observer traffic: the pipeline was not armed.
    Ignored,
    /// The candidate did not qualify; surfaced as a read failure. The phase
    /// is left unchanged, so the engine keeps listening.
    ReadFailure,
    /// First qualifying event of the cycle. The phase has already flipped
    /// to cooldown by the time this is returned.
    Accepted(DetectionResult),
}

struct PipelineState {
    phase: OutputPhase,
    target: Symbology,
}

/// Filters raw metadata detections to the target symbology and debounces to
/// exactly one accepted result per scanning cycle.
///
/// The phase flip on acceptance is the debounce mechanism: it happens under
/// the lock, before `process` returns, so every later event of the cycle is
/// rejected regardless of how the caller schedules its follow-up work.
pub struct DetectionPipeline {
    state: Mutex<PipelineState>,
}

impl DetectionPipeline {
    pub fn new(target: Symbology) -> Self {
        Self {
            state: Mutex::new(PipelineState {
                phase: OutputPhase::Inactive,
                target,
            }),
        }
    }

    pub fn set_target(&self, target: Symbology) {
        self.state.lock().target = target;
    }

    /// Re-arm for a new scanning cycle. Idempotent while already armed.
    pub fn arm(&self) {
        self.state.lock().phase = OutputPhase::Metadata;
    }

    /// Disable both outputs (stop/teardown).
    pub fn disarm(&self) {
        self.state.lock().phase = OutputPhase::Inactive;
    }

    pub fn phase(&self) -> OutputPhase {
        self.state.lock().phase
    }

    /// Run one raw detection event through the filter and debounce guard.
    pub fn process(&self, candidate: MetadataCandidate) -> Verdict {
        let mut state = self.state.lock();
        if state.phase != OutputPhase::Metadata {
            return Verdict::Ignored;
        }

        match (candidate.symbology, candidate.payload) {
            (Some(symbology), Some(payload))
                if symbology == state.target && !payload.is_empty() =>
            {
                state.phase = OutputPhase::RawFrame;
                Verdict::Accepted(DetectionResult { payload, symbology })
            }
            _ => Verdict::ReadFailure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qr(payload: &str) -> MetadataCandidate {
        MetadataCandidate::new(Symbology::Qr, payload)
    }

    #[test]
    fn accepts_exactly_one_per_cycle() {
        let pipeline = DetectionPipeline::new(Symbology::Qr);
        pipeline.arm();

        let first = pipeline.process(qr("a"));
        assert_eq!(
            first,
            Verdict::Accepted(DetectionResult {
                payload: "a".into(),
                symbology: Symbology::Qr,
            })
        );

        // Every later event of the cycle is ignored, matching or not.
        assert_eq!(pipeline.process(qr("b")), Verdict::Ignored);
        assert_eq!(pipeline.process(qr("a")), Verdict::Ignored);
        assert_eq!(pipeline.phase(), OutputPhase::RawFrame);
    }

    #[test]
    fn rearm_allows_next_cycle() {
        let pipeline = DetectionPipeline::new(Symbology::Qr);
        pipeline.arm();

        assert!(matches!(pipeline.process(qr("a")), Verdict::Accepted(_)));
        pipeline.arm();
        assert!(matches!(pipeline.process(qr("b")), Verdict::Accepted(_)));
    }

    #[test]
    fn mismatch_reports_read_failure_and_stays_armed() {
        let pipeline = DetectionPipeline::new(Symbology::Qr);
        pipeline.arm();

        let wrong_symbology = MetadataCandidate::new(Symbology::Aztec, "x");
        assert_eq!(pipeline.process(wrong_symbology), Verdict::ReadFailure);

        let missing_payload = MetadataCandidate {
            symbology: Some(Symbology::Qr),
            payload: None,
        };
        assert_eq!(pipeline.process(missing_payload), Verdict::ReadFailure);

        let empty_payload = MetadataCandidate::new(Symbology::Qr, "");
        assert_eq!(pipeline.process(empty_payload), Verdict::ReadFailure);

        // Still armed: the next qualifying event is accepted.
        assert_eq!(pipeline.phase(), OutputPhase::Metadata);
        assert!(matches!(pipeline.process(qr("ok")), Verdict::Accepted(_)));
    }

    #[test]
    fn inactive_pipeline_ignores_everything() {
        let pipeline = DetectionPipeline::new(Symbology::Qr);
        assert_eq!(pipeline.process(qr("a")), Verdict::Ignored);

        pipeline.arm();
        pipeline.disarm();
        assert_eq!(pipeline.process(qr("a")), Verdict::Ignored);
    }

    #[test]
    fn target_symbology_is_configurable() {
        let pipeline = DetectionPipeline::new(Symbology::Qr);
        pipeline.set_target(Symbology::Aztec);
        pipeline.arm();

        assert_eq!(pipeline.process(qr("a")), Verdict::ReadFailure);
        let aztec = MetadataCandidate::new(Symbology::Aztec, "a");
        assert!(matches!(pipeline.process(aztec), Verdict::Accepted(_)));
    }
}
