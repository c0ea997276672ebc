use super::grim_impl::GrimCapture;
use super::types::{ScreenCapture, SearchRegion};
use super::xcap_impl::XcapCapture;
use crate::error::{ClickerError, ClickerResult};
use image::RgbImage;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Xcap,
    Grim,
}

impl BackendKind {
    /// Pick a backend from the session environment.
    /// Linux sessions with a Wayland display go through grim, everything
    /// else (X11, Windows, macOS) through xcap.
    pub fn probe(is_linux: bool, wayland_display: Option<&str>) -> Self {
        match wayland_display {
            Some(display) if is_linux && !display.is_empty() => BackendKind::Grim,
            _ => BackendKind::Xcap,
        }
    }

    pub fn from_env() -> Self {
        let wayland = std::env::var("WAYLAND_DISPLAY").ok();
        Self::probe(cfg!(target_os = "linux"), wayland.as_deref())
    }
}

impl FromStr for BackendKind {
    type Err = ClickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "xcap" => Ok(BackendKind::Xcap),
            "grim" => Ok(BackendKind::Grim),
            other => Err(ClickerError::Configuration {
                description: format!("Unknown capture backend '{other}', expected 'xcap' or 'grim'"),
            }),
        }
    }
}

pub enum CaptureBackend {
    Xcap(XcapCapture),
    Grim(GrimCapture),
}

impl CaptureBackend {
    pub fn detect() -> ClickerResult<Self> {
        Self::new(BackendKind::from_env())
    }

    pub fn new(kind: BackendKind) -> ClickerResult<Self> {
        let backend = match kind {
            BackendKind::Xcap => CaptureBackend::Xcap(XcapCapture::new()?),
            BackendKind::Grim => CaptureBackend::Grim(GrimCapture::new()?),
        };
        log::info!("📸 Screen capture backend: {}", backend.backend_name());
        Ok(backend)
    }
}

impl ScreenCapture for CaptureBackend {
    fn capture(&self, region: &SearchRegion) -> ClickerResult<RgbImage> {
        match self {
            CaptureBackend::Xcap(x) => x.capture(region),
            CaptureBackend::Grim(g) => g.capture(region),
        }
    }

    fn screen_dimensions(&self) -> ClickerResult<(u32, u32)> {
        match self {
            CaptureBackend::Xcap(x) => x.screen_dimensions(),
            CaptureBackend::Grim(g) => g.screen_dimensions(),
        }
    }

    fn backend_name(&self) -> &'static str {
        match self {
            CaptureBackend::Xcap(x) => x.backend_name(),
            CaptureBackend::Grim(g) => g.backend_name(),
        }
    }
}
