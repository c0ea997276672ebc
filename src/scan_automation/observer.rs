//! Notification port between the scan worker and the hosting application.
//!
//! Every method is called synchronously from the worker thread, so
//! implementations must do their own synchronization before touching
//! shared state.

use super::types::{ClickCounts, ScanState};
use crate::error::ClickerError;
use std::time::Duration;

pub trait ScanObserver: Send + Sync {
    /// Called after every successful normal-template click
    fn on_update(&self, counts: &ClickCounts, elapsed: Duration);

    /// Capture or match failure for one template; scanning continues
    fn on_capture_failure(&self, template: &str, reason: &ClickerError);

    fn on_action_failure(&self, template: &str, reason: &ClickerError) {
        log::warn!("⚠️ Input for '{template}' was not delivered: {reason}");
    }

    fn on_interrupt(&self, _template: &str) {}

    fn on_state_changed(&self, _state: ScanState) {}
}
