//! Relative zone to absolute pixel region mapping

use super::config::Zone;
use crate::capture::SearchRegion;
use crate::error::{ClickerError, ClickerResult};

/// Map a fractional zone onto a `screen_width x screen_height` screen.
///
/// Corners are floored independently, so the result always lies inside
/// `[0, W) x [0, H)`. Returns `None` for malformed zones and for zones too
/// thin to cover a single pixel.
pub fn to_absolute(zone: &Zone, screen_width: u32, screen_height: u32) -> Option<SearchRegion> {
    if !zone.is_valid() {
        return None;
    }
    let x1 = (zone.x1 * screen_width as f64).floor() as u32;
    let y1 = (zone.y1 * screen_height as f64).floor() as u32;
    let x2 = (zone.x2 * screen_width as f64).floor() as u32;
    let y2 = (zone.y2 * screen_height as f64).floor() as u32;
    let region = SearchRegion::new(x1, y1, x2.saturating_sub(x1), y2.saturating_sub(y1));
    region.is_valid().then_some(region)
}

/// Resolves template zones for one screen size, fixed at load time
#[derive(Debug, Clone, Copy)]
pub struct RegionMapper {
    screen_width: u32,
    screen_height: u32,
}

impl RegionMapper {
    pub fn new(screen_width: u32, screen_height: u32) -> Self {
        Self {
            screen_width,
            screen_height,
        }
    }

    pub fn screen_dimensions(&self) -> (u32, u32) {
        (self.screen_width, self.screen_height)
    }

    pub fn resolve(&self, name: &str, zone: &Zone) -> ClickerResult<SearchRegion> {
        if !zone.is_valid() {
            return Err(ClickerError::InvalidZone {
                name: name.to_string(),
                zone: zone.as_array(),
            });
        }
        to_absolute(zone, self.screen_width, self.screen_height).ok_or_else(|| {
            ClickerError::DegenerateRegion {
                name: name.to_string(),
                screen_width: self.screen_width,
                screen_height: self.screen_height,
            }
        })
    }
}
