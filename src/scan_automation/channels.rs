// Communication channels for scan automation
use super::observer::ScanObserver;
use super::types::{ClickCounts, ScanEvent, ScanState};
use crate::error::ClickerError;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

pub const DEFAULT_EVENT_CAPACITY: usize = 32;

/// Observer forwarding every notification into a bounded channel.
/// The worker never blocks on a slow consumer; events that do not fit
/// are dropped with a warning.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    event_tx: mpsc::Sender<ScanEvent>,
}

impl ChannelObserver {
    pub fn new(event_tx: mpsc::Sender<ScanEvent>) -> Self {
        Self { event_tx }
    }

    fn forward(&self, event: ScanEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                log::warn!("⚠️ Event channel full, dropping {event:?}");
            }
            Err(TrySendError::Closed(_)) => {
                log::debug!("Event channel closed, receiver is gone");
            }
        }
    }
}

impl ScanObserver for ChannelObserver {
    fn on_update(&self, counts: &ClickCounts, elapsed: Duration) {
        self.forward(ScanEvent::Update {
            counts: counts.clone(),
            elapsed,
        });
    }

    fn on_capture_failure(&self, template: &str, reason: &ClickerError) {
        self.forward(ScanEvent::CaptureFailure {
            template: template.to_string(),
            reason: reason.to_string(),
        });
    }

    fn on_action_failure(&self, template: &str, reason: &ClickerError) {
        self.forward(ScanEvent::ActionFailure {
            template: template.to_string(),
            reason: reason.to_string(),
        });
    }

    fn on_interrupt(&self, template: &str) {
        self.forward(ScanEvent::Interrupt {
            template: template.to_string(),
        });
    }

    fn on_state_changed(&self, state: ScanState) {
        self.forward(ScanEvent::StateChanged(state));
    }
}

/// Helper function to create the observer/receiver pair
pub fn create_event_channel(capacity: usize) -> (ChannelObserver, mpsc::Receiver<ScanEvent>) {
    let (event_tx, event_rx) = mpsc::channel(capacity.max(1));
    (ChannelObserver::new(event_tx), event_rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        let (observer, mut rx) = create_event_channel(DEFAULT_EVENT_CAPACITY);
        let mut counts = ClickCounts::new();
        counts.insert("confirm".to_string(), 1);

        observer.on_state_changed(ScanState::Running);
        observer.on_update(&counts, Duration::from_millis(1500));
        observer.on_capture_failure("watch", &ClickerError::capture("no frame"));

        assert_eq!(rx.recv().await, Some(ScanEvent::StateChanged(ScanState::Running)));
        assert_eq!(
            rx.recv().await,
            Some(ScanEvent::Update {
                counts,
                elapsed: Duration::from_millis(1500)
            })
        );
        match rx.recv().await {
            Some(ScanEvent::CaptureFailure { template, reason }) => {
                assert_eq!(template, "watch");
                assert!(reason.contains("no frame"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_full_channel_drops_instead_of_blocking() {
        let (observer, mut rx) = create_event_channel(1);
        observer.on_interrupt("popup");
        observer.on_interrupt("dialog");

        assert_eq!(
            rx.recv().await,
            Some(ScanEvent::Interrupt {
                template: "popup".to_string()
            })
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_channel_is_ignored() {
        let (observer, rx) = create_event_channel(4);
        drop(rx);
        observer.on_state_changed(ScanState::Idle);
    }
}
