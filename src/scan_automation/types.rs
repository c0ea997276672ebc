// Types and enums for scan automation
use std::collections::BTreeMap;
use std::time::Duration;

/// Click counter per normal template name
pub type ClickCounts = BTreeMap<String, u64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Running,
    Stopping,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    Update { counts: ClickCounts, elapsed: Duration },
    CaptureFailure { template: String, reason: String },
    ActionFailure { template: String, reason: String },
    Interrupt { template: String },
    StateChanged(ScanState),
}

/// Point-in-time copy of a session's counters
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub counts: ClickCounts,
    pub elapsed: Duration,
    pub running: bool,
}

impl SessionSnapshot {
    pub fn total_clicks(&self) -> u64 {
        self.counts.values().sum()
    }
}

/// What a single tick ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// An interrupt template hit; normal scanning was skipped
    Interrupted(String),
    /// Normal templates were scanned, `clicks` of them hit
    Scanned { clicks: usize },
}
