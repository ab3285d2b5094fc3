use lesenne_types::{ProcessingStage, StageEvent};
use std::sync::Mutex;

/// Passive consumer of pipeline stage transitions.
///
/// Observers must tolerate best-effort delivery; nothing in the pipeline
/// waits on them.
pub trait StageObserver: Send + Sync {
    /// Called once when an invocation begins, before any stage event.
    fn on_request_start(&self) {}

    fn on_stage(&self, event: &StageEvent);
}

#[derive(Debug)]
struct TrackerState {
    current: ProcessingStage,
    completed: Vec<ProcessingStage>,
}

/// Retains the current stage and the ordered list of stages already completed
/// for the active request, for display layers to poll.
///
/// One tracker instance serves one request at a time; it is reset defensively
/// at the start of every invocation, so an abandoned request never leaves
/// stale state behind.
pub struct StageTracker {
    state: Mutex<TrackerState>,
}

impl StageTracker {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(TrackerState {
                current: ProcessingStage::Idle,
                completed: Vec::new(),
            }),
        }
    }

    pub fn current_stage(&self) -> ProcessingStage {
        self.state.lock().expect("tracker lock").current
    }

    /// Stages already completed for the active request, in execution order.
    pub fn completed_stages(&self) -> Vec<ProcessingStage> {
        self.state.lock().expect("tracker lock").completed.clone()
    }
}

impl Default for StageTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StageObserver for StageTracker {
    fn on_request_start(&self) {
        let mut state = self.state.lock().expect("tracker lock");
        state.current = ProcessingStage::Idle;
        state.completed.clear();
    }

    fn on_stage(&self, event: &StageEvent) {
        let mut state = self.state.lock().expect("tracker lock");

        // A new stage beginning marks the previous one as done.
        let previous = state.current;
        if previous != ProcessingStage::Idle && !state.completed.contains(&previous) {
            state.completed.push(previous);
        }

        state.current = event.stage;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesenne_types::STAGE_SEQUENCE;

    fn drive_full_request(tracker: &StageTracker) {
        tracker.on_request_start();
        for stage in STAGE_SEQUENCE {
            tracker.on_stage(&StageEvent::new(stage));
        }
        tracker.on_stage(&StageEvent::new(ProcessingStage::Completed));
    }

    #[test]
    fn full_request_completes_all_five_stages_in_order() {
        let tracker = StageTracker::new();
        drive_full_request(&tracker);

        assert_eq!(tracker.current_stage(), ProcessingStage::Completed);
        assert_eq!(tracker.completed_stages(), STAGE_SEQUENCE.to_vec());
    }

    #[test]
    fn request_start_resets_stale_state() {
        let tracker = StageTracker::new();

        // Simulate a request abandoned mid-flight.
        tracker.on_request_start();
        tracker.on_stage(&StageEvent::new(ProcessingStage::QuestionProcessing));
        tracker.on_stage(&StageEvent::new(ProcessingStage::DocumentRetrieval));

        drive_full_request(&tracker);
        assert_eq!(tracker.completed_stages(), STAGE_SEQUENCE.to_vec());
    }

    #[test]
    fn no_duplicate_completed_entries() {
        let tracker = StageTracker::new();
        drive_full_request(&tracker);

        let completed = tracker.completed_stages();
        let mut deduped = completed.clone();
        deduped.dedup();
        assert_eq!(completed, deduped);
    }
}
