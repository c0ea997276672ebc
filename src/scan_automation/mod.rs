// Scan automation module
// Watches configured screen regions for reference images and clicks them
// from a background worker, with interrupt templates that preempt scanning.

pub mod channels;
pub mod fsm;
pub mod match_image;
pub mod observer;
pub mod scan_loop;
pub mod session;
pub mod types;

// Re-export the main types and functions for easy access
pub use channels::{ChannelObserver, DEFAULT_EVENT_CAPACITY, create_event_channel};
pub use fsm::ScanController;
pub use match_image::{
    ActionEvent, InterruptConfig, ScanConfig, TemplateConfig, TemplateStore, Zone,
};
pub use observer::ScanObserver;
pub use scan_loop::ScanLoop;
pub use session::SessionState;
pub use types::{ClickCounts, ScanEvent, ScanState, SessionSnapshot, TickOutcome};
