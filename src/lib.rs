pub mod args;
pub mod capture;
pub mod error;
pub mod input;
pub mod scan_automation;
pub mod template_matching;

#[cfg(test)]
mod testing;

pub use capture::{CaptureBackend, ScreenCapture};
pub use error::{ClickerError, ClickerResult};
pub use scan_automation::{ScanConfig, ScanController};
