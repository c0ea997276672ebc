// Capture through the grim binary (wlroots Wayland compositors)
use super::types::{ScreenCapture, SearchRegion};
use crate::error::{ClickerError, ClickerResult};
use image::RgbImage;
use std::path::Path;
use std::process::Command;

pub struct GrimCapture {
    screen_x: u32,
    screen_y: u32,
}

impl GrimCapture {
    pub fn ensure_grim_available() -> ClickerResult<()> {
        match Command::new("grim").arg("-h").output() {
            Ok(_) => Ok(()),
            Err(e) => {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Err(ClickerError::capture(
                        "Wayland detected but 'grim' is not installed. Install it (e.g. 'sudo apt install grim') or force --backend=xcap.",
                    ))
                } else {
                    Err(ClickerError::capture(format!(
                        "Failed to invoke 'grim': {e}. Verify installation or force --backend=xcap."
                    )))
                }
            }
        }
    }

    pub fn new() -> ClickerResult<Self> {
        Self::ensure_grim_available()?;
        let snapshot = Self::snapshot(None)?;
        let (screen_x, screen_y) = image::image_dimensions(snapshot.path()).map_err(|e| {
            ClickerError::capture(format!("Failed to read screenshot from grim: {e}"))
        })?;
        log::debug!("🖥️ grim output {}x{}", screen_x, screen_y);
        Ok(Self { screen_x, screen_y })
    }

    /// Geometry argument in grim's "<x>,<y> <width>x<height>" format
    pub fn geometry(region: &SearchRegion) -> String {
        format!(
            "{},{} {}x{}",
            region.x, region.y, region.width, region.height
        )
    }

    // The snapshot file lives as long as the returned handle and is removed
    // on drop, on success and failure alike.
    fn snapshot(region: Option<&SearchRegion>) -> ClickerResult<tempfile::NamedTempFile> {
        let file = tempfile::Builder::new()
            .prefix("screen-clicker-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| ClickerError::capture(format!("Failed to create snapshot file: {e}")))?;

        let mut cmd = Command::new("grim");
        cmd.arg("-s").arg("1");
        if let Some(region) = region {
            cmd.arg("-g").arg(Self::geometry(region));
        }
        let output = cmd
            .arg(file.path())
            .output()
            .map_err(|e| ClickerError::capture(format!("Failed to run grim: {e}")))?;
        if !output.status.success() {
            return Err(ClickerError::capture(format!(
                "grim failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(file)
    }

    fn read_snapshot(path: &Path) -> ClickerResult<RgbImage> {
        let img = image::open(path).map_err(|e| {
            ClickerError::capture(format!("Failed to read screenshot from grim: {e}"))
        })?;
        Ok(img.to_rgb8())
    }
}

impl ScreenCapture for GrimCapture {
    fn capture(&self, region: &SearchRegion) -> ClickerResult<RgbImage> {
        if !region.fits_within(self.screen_x, self.screen_y) {
            return Err(ClickerError::capture(format!(
                "Region {}x{} at ({},{}) lies outside the {}x{} output",
                region.width, region.height, region.x, region.y, self.screen_x, self.screen_y
            )));
        }
        let snapshot = Self::snapshot(Some(region))?;
        let img = Self::read_snapshot(snapshot.path())?;
        if img.dimensions() == (region.width, region.height) {
            return Ok(img);
        }
        // Fractional output scales can round the frame up by a pixel.
        if img.width() >= region.width && img.height() >= region.height {
            return SearchRegion::new(0, 0, region.width, region.height).crop_from(&img);
        }
        Err(ClickerError::capture(format!(
            "grim returned {}x{} for a {}x{} region",
            img.width(),
            img.height(),
            region.width,
            region.height
        )))
    }

    fn screen_dimensions(&self) -> ClickerResult<(u32, u32)> {
        Ok((self.screen_x, self.screen_y))
    }

    fn backend_name(&self) -> &'static str {
        "grim"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_format() {
        let region = SearchRegion::new(1478, 907, 422, 162);
        assert_eq!(GrimCapture::geometry(&region), "1478,907 422x162");
    }
}
