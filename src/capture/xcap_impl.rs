// Capture through xcap (X11, Windows, macOS)
use super::types::{ScreenCapture, SearchRegion};
use crate::error::{ClickerError, ClickerResult};
use image::{DynamicImage, RgbImage};
use xcap::Monitor;

/// Captures regions of the primary monitor.
///
/// The monitor handle is looked up on every call rather than stored, so the
/// backend stays `Send + Sync` on every platform and picks up a re-plugged
/// display without restarting.
pub struct XcapCapture {
    _private: (),
}

impl XcapCapture {
    pub fn new() -> ClickerResult<Self> {
        let backend = Self { _private: () };
        let (screen_x, screen_y) = backend.screen_dimensions()?;
        log::debug!("🖥️ xcap primary monitor {}x{}", screen_x, screen_y);
        Ok(backend)
    }

    fn primary_monitor() -> ClickerResult<Monitor> {
        let monitors = Monitor::all()
            .map_err(|e| ClickerError::capture(format!("Failed to enumerate monitors: {e}")))?;
        let primary = monitors
            .iter()
            .find(|m| m.is_primary().unwrap_or(false))
            .cloned();
        primary
            .or_else(|| monitors.into_iter().next())
            .ok_or_else(|| ClickerError::capture("No monitors found"))
    }
}

impl ScreenCapture for XcapCapture {
    fn capture(&self, region: &SearchRegion) -> ClickerResult<RgbImage> {
        let monitor = Self::primary_monitor()?;
        let frame = monitor.capture_image().map_err(|e| {
            ClickerError::capture(format!(
                "Failed to capture monitor: {e}. On macOS grant Screen Recording permission to the terminal"
            ))
        })?;
        if frame.width() == 0 || frame.height() == 0 {
            return Err(ClickerError::capture(
                "Captured empty frame - possible permission issue or no display",
            ));
        }
        let frame = DynamicImage::ImageRgba8(frame).to_rgb8();
        region.crop_from(&frame)
    }

    fn screen_dimensions(&self) -> ClickerResult<(u32, u32)> {
        let monitor = Self::primary_monitor()?;
        let screen_x = monitor
            .width()
            .map_err(|e| ClickerError::capture(format!("Failed to read monitor width: {e}")))?;
        let screen_y = monitor
            .height()
            .map_err(|e| ClickerError::capture(format!("Failed to read monitor height: {e}")))?;
        Ok((screen_x, screen_y))
    }

    fn backend_name(&self) -> &'static str {
        "xcap"
    }
}
