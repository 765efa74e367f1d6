//! Phase tracking for one submission.

use std::sync::Arc;

use shelfie_core::models::events::{SubmitEvent, SubmitPhase};
use shelfie_core::ports::SubmitObserver;

/// Walks a submission through its phase sequence, emitting a phase event on
/// every transition. Transition legality lives on [`SubmitPhase`]; an
/// illegal advance is an orchestrator bug.
pub(crate) struct PhaseTracker {
    phase: SubmitPhase,
    observer: Arc<dyn SubmitObserver>,
}

impl PhaseTracker {
    pub fn start(observer: Arc<dyn SubmitObserver>) -> Self {
        let tracker = Self {
            phase: SubmitPhase::Idle,
            observer,
        };
        tracker.emit();
        tracker
    }

    pub fn phase(&self) -> SubmitPhase {
        self.phase
    }

    pub fn advance(&mut self, next: SubmitPhase) {
        if !self.phase.can_transition_to(next) {
            debug_assert!(
                false,
                "illegal phase transition {:?} -> {:?}",
                self.phase, next
            );
            tracing::warn!(from = ?self.phase, to = ?next, "illegal phase transition");
        }
        tracing::debug!(from = ?self.phase, to = ?next, "phase transition");
        self.phase = next;
        self.emit();
    }

    fn emit(&self) {
        self.observer.on_event(SubmitEvent::Phase {
            phase: self.phase,
            status: self.phase.status_text(),
        });
    }
}
