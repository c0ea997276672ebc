// Core capture types and traits
use crate::error::{ClickerError, ClickerResult};
use image::RgbImage;

/// Absolute pixel rectangle on the primary screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl SearchRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check if this region is valid (non-zero dimensions)
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Check if the whole region lies inside a screen of the given size
    pub fn fits_within(&self, screen_width: u32, screen_height: u32) -> bool {
        self.is_valid()
            && self.x.checked_add(self.width).is_some_and(|r| r <= screen_width)
            && self.y.checked_add(self.height).is_some_and(|b| b <= screen_height)
    }

    /// Crop a full-screen frame down to this region.
    pub fn crop_from(&self, frame: &RgbImage) -> ClickerResult<RgbImage> {
        if !self.fits_within(frame.width(), frame.height()) {
            return Err(ClickerError::capture(format!(
                "Region {}x{} at ({},{}) lies outside the {}x{} display",
                self.width,
                self.height,
                self.x,
                self.y,
                frame.width(),
                frame.height()
            )));
        }
        Ok(image::imageops::crop_imm(frame, self.x, self.y, self.width, self.height).to_image())
    }
}

#[derive(Debug, Clone)]
pub struct RegionCapture {
    pub image: RgbImage,
    pub duration_ms: u128,
}

// Capability every capture backend provides
pub trait ScreenCapture: Send + Sync {
    /// Capture exactly `region.width x region.height` RGB pixels.
    fn capture(&self, region: &SearchRegion) -> ClickerResult<RgbImage>;

    fn screen_dimensions(&self) -> ClickerResult<(u32, u32)>;

    fn backend_name(&self) -> &'static str;

    // Default capture with timing
    fn timed_capture(&self, region: &SearchRegion) -> ClickerResult<RegionCapture> {
        let start = std::time::Instant::now();
        let image = self.capture(region)?;
        Ok(RegionCapture {
            image,
            duration_ms: start.elapsed().as_millis(),
        })
    }
}
