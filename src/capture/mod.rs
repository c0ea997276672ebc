// Capture module - screen region acquisition
// This module abstracts over the platform mechanisms that can produce a
// color frame of a rectangular screen region.

pub mod backend;
pub mod grim_impl;
pub mod types;
pub mod xcap_impl;

// Re-export the main types for easy access
pub use backend::{BackendKind, CaptureBackend};
pub use grim_impl::GrimCapture;
pub use types::{RegionCapture, ScreenCapture, SearchRegion};
pub use xcap_impl::XcapCapture;
