// Test doubles shared by unit tests across modules
use crate::capture::{ScreenCapture, SearchRegion};
use crate::error::{ClickerError, ClickerResult};
use crate::input::{InputDriver, KeyName};
use crate::scan_automation::observer::ScanObserver;
use crate::scan_automation::types::ClickCounts;
use image::{Rgb, RgbImage};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Deterministic grayscale noise, different for every seed
pub fn noise_image(width: u32, height: u32, seed: u64) -> RgbImage {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    RgbImage::from_fn(width, height, |_, _| {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let v = (state >> 56) as u8;
        Rgb([v, v, v])
    })
}

pub fn paste(target: &mut RgbImage, patch: &RgbImage, x: u32, y: u32) {
    image::imageops::replace(target, patch, x as i64, y as i64);
}

/// Capture backend serving crops of a fixed frame, or failing on demand
pub struct FrameCapture {
    frame: Mutex<RgbImage>,
    failing: Mutex<bool>,
    pub calls: AtomicUsize,
}

impl FrameCapture {
    pub fn new(frame: RgbImage) -> Self {
        Self {
            frame: Mutex::new(frame),
            failing: Mutex::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_frame(&self, frame: RgbImage) {
        *self.frame.lock().unwrap() = frame;
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }
}

impl ScreenCapture for FrameCapture {
    fn capture(&self, region: &SearchRegion) -> ClickerResult<RgbImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if *self.failing.lock().unwrap() {
            return Err(ClickerError::capture("display went away"));
        }
        region.crop_from(&self.frame.lock().unwrap())
    }

    fn screen_dimensions(&self) -> ClickerResult<(u32, u32)> {
        Ok(self.frame.lock().unwrap().dimensions())
    }

    fn backend_name(&self) -> &'static str {
        "frame"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Click(u32, u32),
    Key(KeyName),
}

/// Input driver recording every event it is asked to deliver
#[derive(Clone, Default)]
pub struct RecordingInput {
    pub events: Arc<Mutex<Vec<InputEvent>>>,
    pub reject: Arc<Mutex<bool>>,
}

impl RecordingInput {
    pub fn events(&self) -> Vec<InputEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl InputDriver for RecordingInput {
    fn click(&mut self, x: u32, y: u32) -> ClickerResult<()> {
        if *self.reject.lock().unwrap() {
            return Err(ClickerError::dispatch("input rejected"));
        }
        self.events.lock().unwrap().push(InputEvent::Click(x, y));
        Ok(())
    }

    fn press_key(&mut self, key: KeyName) -> ClickerResult<()> {
        if *self.reject.lock().unwrap() {
            return Err(ClickerError::dispatch("input rejected"));
        }
        self.events.lock().unwrap().push(InputEvent::Key(key));
        Ok(())
    }

    fn cursor_position(&mut self) -> ClickerResult<(i32, i32)> {
        Ok((0, 0))
    }
}

/// Observer keeping every notification for later assertions
#[derive(Default)]
pub struct RecordingObserver {
    pub updates: Mutex<Vec<(ClickCounts, Duration)>>,
    pub failures: Mutex<Vec<(String, String)>>,
    pub interrupts: Mutex<Vec<String>>,
}

impl ScanObserver for RecordingObserver {
    fn on_update(&self, counts: &ClickCounts, elapsed: Duration) {
        self.updates.lock().unwrap().push((counts.clone(), elapsed));
    }

    fn on_capture_failure(&self, template: &str, reason: &ClickerError) {
        self.failures
            .lock()
            .unwrap()
            .push((template.to_string(), reason.to_string()));
    }

    fn on_interrupt(&self, template: &str) {
        self.interrupts.lock().unwrap().push(template.to_string());
    }
}
