//! Notification and event-stream adapters.
//!
//! UI consumers attach through tokio channels; headless callers use the
//! tracing-backed notifier so nothing is silently dropped.

use tokio::sync::mpsc;

use shelfie_core::models::events::{Notice, Severity, SubmitEvent};
use shelfie_core::ports::{Notifier, SubmitObserver};

/// Notifier that logs notices at a level matching their severity.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.severity {
            Severity::Info => tracing::info!(message = %notice.message, "notice"),
            Severity::Warning => tracing::warn!(message = %notice.message, "notice"),
            Severity::Critical => tracing::error!(message = %notice.message, "notice"),
        }
    }
}

/// Notifier delivering notices onto an unbounded channel.
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notice>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        // A dropped receiver means no UI is listening; nothing to do.
        let _ = self.tx.send(notice);
    }
}

/// Observer delivering submission events onto an unbounded channel.
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<SubmitEvent>,
}

impl ChannelObserver {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SubmitEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl SubmitObserver for ChannelObserver {
    fn on_event(&self, event: SubmitEvent) {
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfie_core::models::events::SubmitPhase;

    #[tokio::test]
    async fn channel_notifier_delivers_in_order() {
        let (notifier, mut rx) = ChannelNotifier::new();
        notifier.notify(Notice::warning("goal update failed"));
        notifier.notify(Notice::critical("cleanup failed"));

        assert_eq!(rx.recv().await.unwrap().severity, Severity::Warning);
        assert_eq!(rx.recv().await.unwrap().severity, Severity::Critical);
    }

    #[tokio::test]
    async fn channel_observer_forwards_events() {
        let (observer, mut rx) = ChannelObserver::new();
        observer.on_event(SubmitEvent::Phase {
            phase: SubmitPhase::Staged,
            status: SubmitPhase::Staged.status_text(),
        });
        match rx.recv().await.unwrap() {
            SubmitEvent::Phase { phase, .. } => assert_eq!(phase, SubmitPhase::Staged),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn dropped_receiver_does_not_panic() {
        let (notifier, rx) = ChannelNotifier::new();
        drop(rx);
        notifier.notify(Notice::warning("nobody listening"));
    }
}
