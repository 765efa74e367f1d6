//! Unified byte-level progress across both variant transfers.
//!
//! Expected bytes are only known incrementally (each blob's size as it is
//! produced), so a raw ratio could reach 100 while later work is still
//! unknown. The contract enforced here: the reported percentage is
//! non-decreasing, capped at 99 until `finalize`, and exactly 100 after it.
//! Any re-implementation that parallelizes the transfers must preserve the
//! same observable contract.

use std::sync::{Arc, Mutex};

use shelfie_core::models::events::SubmitEvent;
use shelfie_core::ports::SubmitObserver;
use shelfie_storage::ProgressFn;

/// Pure progress arithmetic for one submission.
#[derive(Debug, Default)]
pub struct ProgressAggregator {
    expected: u64,
    completed: u64,
    current_total: u64,
    in_flight: u64,
    finished: bool,
    high_water: u8,
}

impl ProgressAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grow the running total of expected bytes (called as each blob is
    /// produced).
    pub fn add_expected(&mut self, bytes: u64) {
        self.expected += bytes;
    }

    /// Start a transfer of `total` bytes.
    pub fn begin_transfer(&mut self, total: u64) {
        self.current_total = total;
        self.in_flight = 0;
    }

    /// Cumulative bytes reported by the in-flight transfer.
    pub fn tick(&mut self, transferred: u64) {
        self.in_flight = transferred.min(self.current_total);
    }

    /// The in-flight transfer finished; its bytes move into the completed
    /// total.
    pub fn complete_transfer(&mut self) {
        self.completed += self.current_total;
        self.current_total = 0;
        self.in_flight = 0;
    }

    /// All transfers are done; the percentage may now reach 100.
    pub fn finalize(&mut self) {
        self.finished = true;
    }

    pub fn transferred(&self) -> u64 {
        self.completed + self.in_flight
    }

    pub fn expected(&self) -> u64 {
        self.expected
    }

    /// Current percentage: non-decreasing, 99 at most before `finalize`,
    /// 100 after.
    pub fn percent(&mut self) -> u8 {
        if self.finished {
            return 100;
        }
        let raw = if self.expected == 0 {
            0
        } else {
            ((self.transferred() * 100) / self.expected) as u8
        };
        let capped = raw.min(99);
        if capped > self.high_water {
            self.high_water = capped;
        }
        self.high_water
    }
}

/// Shares an aggregator between the orchestrator and storage progress
/// callbacks, emitting a progress event on every change.
pub(crate) struct ProgressReporter {
    state: Mutex<ProgressAggregator>,
    observer: Arc<dyn SubmitObserver>,
}

impl ProgressReporter {
    pub fn new(observer: Arc<dyn SubmitObserver>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ProgressAggregator::new()),
            observer,
        })
    }

    pub fn add_expected(&self, bytes: u64) {
        self.update(|s| s.add_expected(bytes));
    }

    pub fn begin_transfer(&self, total: u64) {
        self.update(|s| s.begin_transfer(total));
    }

    pub fn complete_transfer(&self) {
        self.update(ProgressAggregator::complete_transfer);
    }

    pub fn finalize(&self) {
        self.update(ProgressAggregator::finalize);
    }

    /// Storage-facing callback reporting cumulative transfer bytes.
    pub fn callback(self: &Arc<Self>) -> ProgressFn {
        let reporter = Arc::clone(self);
        Arc::new(move |transferred| reporter.update(|s| s.tick(transferred)))
    }

    fn update(&self, apply: impl FnOnce(&mut ProgressAggregator)) {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        apply(&mut state);
        self.observer.on_event(SubmitEvent::Progress {
            percent: state.percent(),
            transferred_bytes: state.transferred(),
            expected_bytes: state.expected(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_is_zero_before_any_expected_bytes() {
        let mut p = ProgressAggregator::new();
        assert_eq!(p.percent(), 0);
    }

    #[test]
    fn capped_at_99_until_finalized() {
        let mut p = ProgressAggregator::new();
        p.add_expected(1000);
        p.begin_transfer(1000);
        p.tick(1000);
        // First blob fully transferred but the second is not yet known.
        assert_eq!(p.percent(), 99);
        p.complete_transfer();
        assert_eq!(p.percent(), 99);
        p.finalize();
        assert_eq!(p.percent(), 100);
    }

    #[test]
    fn growing_expected_never_lowers_the_reported_percent() {
        let mut p = ProgressAggregator::new();
        p.add_expected(1000);
        p.begin_transfer(1000);
        p.tick(800);
        let before = p.percent();
        assert_eq!(before, 80);

        // Second blob produced: raw ratio drops, reported percent holds.
        p.add_expected(1000);
        assert!(p.percent() >= before);
        p.tick(1000);
        p.complete_transfer();

        p.begin_transfer(1000);
        let mut last = p.percent();
        for step in [250, 500, 750, 1000] {
            p.tick(step);
            let now = p.percent();
            assert!(now >= last);
            last = now;
        }
        p.complete_transfer();
        p.finalize();
        assert_eq!(p.percent(), 100);
    }

    #[test]
    fn ticks_beyond_the_declared_total_are_clamped() {
        let mut p = ProgressAggregator::new();
        p.add_expected(100);
        p.begin_transfer(100);
        p.tick(500);
        assert_eq!(p.transferred(), 100);
    }
}
