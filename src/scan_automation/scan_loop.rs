//! The tick procedure run by the scan worker.
//!
//! One tick checks interrupt templates in priority order, and on the first
//! hit plays that template's action sequence and skips normal scanning.
//! Otherwise every normal template is scanned and each hit is clicked.
//! Per-template failures are reported and never end the loop.

use super::match_image::config::seconds;
use super::match_image::{ActionEvent, InterruptTemplate, Template, TemplateStore};
use super::observer::ScanObserver;
use super::session::SessionState;
use super::types::TickOutcome;
use crate::capture::ScreenCapture;
use crate::error::{ClickerError, ClickerResult};
use crate::input::InputDriver;
use crate::template_matching::MatchResult;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

/// Longest uninterrupted sleep between two stop-flag checks
const SLEEP_SLICE: Duration = Duration::from_millis(100);

pub struct ScanLoop {
    store: Arc<TemplateStore>,
    capture: Arc<dyn ScreenCapture>,
    input: Arc<Mutex<dyn InputDriver>>,
    observer: Arc<dyn ScanObserver>,
    session: Arc<RwLock<SessionState>>,
    delay: Duration,
    stop: Arc<AtomicBool>,
}

impl ScanLoop {
    pub fn new(
        store: Arc<TemplateStore>,
        capture: Arc<dyn ScreenCapture>,
        input: Arc<Mutex<dyn InputDriver>>,
        observer: Arc<dyn ScanObserver>,
        session: Arc<RwLock<SessionState>>,
        delay: Duration,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Self {
            store,
            capture,
            input,
            observer,
            session,
            delay,
            stop,
        }
    }

    fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// Tick until the stop flag is observed, then freeze the session clock.
    pub fn run(&self) {
        log::info!(
            "🚀 Scan loop started ({} template(s), {} interrupt(s), delay {:.2}s, backend {})",
            self.store.templates().len(),
            self.store.interrupts().len(),
            self.delay.as_secs_f64(),
            self.capture.backend_name()
        );
        let mut ticks: u64 = 0;

        while !self.stop_requested() {
            self.run_tick();
            ticks += 1;
            if self.stop_requested() {
                break;
            }
            self.pause();
        }

        let snapshot = {
            let mut session = self.session.write().unwrap_or_else(PoisonError::into_inner);
            session.finish();
            session.snapshot()
        };
        log::info!(
            "⏹️ Scan loop ended after {} tick(s), {} click(s) in {:.1} s",
            ticks,
            snapshot.total_clicks(),
            snapshot.elapsed.as_secs_f64()
        );
    }

    pub fn run_tick(&self) -> TickOutcome {
        for interrupt in self.store.interrupts() {
            if let Some(hit) = self.scan(&interrupt.template)
                && hit.found
            {
                self.handle_interrupt(interrupt, &hit);
                return TickOutcome::Interrupted(interrupt.template.name.clone());
            }
        }

        let mut clicks = 0;
        for template in self.store.templates() {
            if let Some(hit) = self.scan(template)
                && hit.found
                && self.click_hit(template, &hit)
            {
                clicks += 1;
            }
        }
        TickOutcome::Scanned { clicks }
    }

    /// Capture the template's region and match it. Failures go to the
    /// observer and yield `None`.
    fn scan(&self, template: &Template) -> Option<MatchResult> {
        let result = self
            .capture
            .capture(&template.region)
            .and_then(|image| template.matcher().find(&image, template.threshold));

        match result {
            Ok(hit) => {
                log::trace!(
                    "'{}' best score {:.3} at {:?}",
                    template.name,
                    hit.score,
                    hit.top_left
                );
                Some(hit)
            }
            Err(e) => {
                log::warn!("⚠️ Scan of '{}' failed: {}", template.name, e);
                self.observer.on_capture_failure(&template.name, &e);
                None
            }
        }
    }

    fn click_hit(&self, template: &Template, hit: &MatchResult) -> bool {
        let (x, y) = hit.screen_point(template.region.x, template.region.y);
        log::debug!(
            "🎯 '{}' matched (score {:.3}), clicking at ({}, {})",
            template.name,
            hit.score,
            x,
            y
        );

        if let Err(e) = self.with_input(|input| input.click(x, y)) {
            self.observer.on_action_failure(&template.name, &e);
            return false;
        }

        let (counts, elapsed) = {
            let mut session = self.session.write().unwrap_or_else(PoisonError::into_inner);
            session.increment(&template.name);
            (session.counts().clone(), session.elapsed())
        };
        self.observer.on_update(&counts, elapsed);
        true
    }

    fn handle_interrupt(&self, interrupt: &InterruptTemplate, hit: &MatchResult) {
        let template = &interrupt.template;
        log::info!(
            "🚨 Interrupt '{}' matched (score {:.3}), running {} action(s)",
            template.name,
            hit.score,
            interrupt.actions.len()
        );

        for action in &interrupt.actions {
            let result = match action {
                ActionEvent::Key(key) => {
                    log::debug!("⌨️ Pressing {key}");
                    self.with_input(|input| input.press_key(*key))
                }
                ActionEvent::Wait(secs) => match seconds(*secs) {
                    Some(wait) => {
                        std::thread::sleep(wait);
                        Ok(())
                    }
                    None => Err(ClickerError::Configuration {
                        description: format!("Invalid wait of {secs} seconds"),
                    }),
                },
                ActionEvent::Click => {
                    let (x, y) = hit.screen_point(template.region.x, template.region.y);
                    log::debug!("🖱️ Clicking at ({x}, {y})");
                    self.with_input(|input| input.click(x, y))
                }
            };
            if let Err(e) = result {
                self.observer.on_action_failure(&template.name, &e);
                break;
            }
        }
        self.observer.on_interrupt(&template.name);
    }

    fn with_input<T>(
        &self,
        f: impl FnOnce(&mut dyn InputDriver) -> ClickerResult<T>,
    ) -> ClickerResult<T> {
        let mut input = self.input.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *input)
    }

    /// Sleep for the configured delay in short slices, returning early
    /// once a stop is requested.
    fn pause(&self) {
        let mut remaining = self.delay;
        while !remaining.is_zero() && !self.stop_requested() {
            let slice = remaining.min(SLEEP_SLICE);
            std::thread::sleep(slice);
            remaining -= slice;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::SearchRegion;
    use crate::input::KeyName;
    use crate::scan_automation::match_image::{RegionMapper, TemplateConfig, Zone};
    use crate::testing::{
        FrameCapture, InputEvent, RecordingInput, RecordingObserver, noise_image, paste,
    };
    use image::RgbImage;
    use std::time::Instant;

    struct Harness {
        capture: Arc<FrameCapture>,
        input: RecordingInput,
        observer: Arc<RecordingObserver>,
        session: Arc<RwLock<SessionState>>,
        stop: Arc<AtomicBool>,
        scan: ScanLoop,
    }

    fn template(name: &str, zone: Zone, image: &RgbImage, screen: (u32, u32)) -> Template {
        let config = TemplateConfig::new(name, format!("{name}.png"), zone, 0.85);
        let region = RegionMapper::new(screen.0, screen.1)
            .resolve(name, &zone)
            .unwrap();
        Template::from_image(&config, region, image)
    }

    fn harness(
        frame: RgbImage,
        templates: Vec<Template>,
        interrupts: Vec<InterruptTemplate>,
        delay: Duration,
    ) -> Harness {
        let (w, h) = frame.dimensions();
        let names: Vec<String> = templates.iter().map(|t| t.name.clone()).collect();
        let store = Arc::new(TemplateStore::from_parts(templates, interrupts, w, h));
        let capture = Arc::new(FrameCapture::new(frame));
        let input = RecordingInput::default();
        let observer = Arc::new(RecordingObserver::default());
        let session = Arc::new(RwLock::new(SessionState::new(names)));
        let stop = Arc::new(AtomicBool::new(false));
        let scan = ScanLoop::new(
            store,
            capture.clone(),
            Arc::new(Mutex::new(input.clone())),
            observer.clone(),
            session.clone(),
            delay,
            stop.clone(),
        );
        Harness {
            capture,
            input,
            observer,
            session,
            stop,
            scan,
        }
    }

    fn full() -> Zone {
        Zone::new(0.0, 0.0, 1.0, 1.0)
    }

    #[test]
    fn test_single_tick_clicks_exact_match() {
        let mut frame = noise_image(1000, 1000, 7);
        let button = noise_image(50, 50, 8);
        paste(&mut frame, &button, 100, 100);
        let confirm = template("confirm", full(), &button, (1000, 1000));
        let h = harness(frame, vec![confirm], Vec::new(), Duration::ZERO);

        assert_eq!(h.scan.run_tick(), TickOutcome::Scanned { clicks: 1 });

        assert_eq!(h.input.events(), vec![InputEvent::Click(125, 125)]);
        assert_eq!(h.session.read().unwrap().count("confirm"), 1);
        let updates = h.observer.updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].0.get("confirm"), Some(&1));
    }

    #[test]
    fn test_click_is_translated_to_screen_coordinates() {
        let mut frame = noise_image(400, 300, 11);
        let button = noise_image(20, 20, 12);
        paste(&mut frame, &button, 260, 190);
        let zone = Zone::new(0.5, 0.5, 1.0, 1.0);
        let confirm = template("confirm", zone, &button, (400, 300));
        assert_eq!(confirm.region, SearchRegion::new(200, 150, 200, 150));
        let h = harness(frame, vec![confirm], Vec::new(), Duration::ZERO);

        h.scan.run_tick();
        assert_eq!(h.input.events(), vec![InputEvent::Click(270, 200)]);
    }

    #[test]
    fn test_all_normal_templates_evaluated_each_tick() {
        let mut frame = noise_image(240, 160, 21);
        let confirm_img = noise_image(24, 16, 22);
        let watch_img = noise_image(18, 18, 23);
        let absent_img = noise_image(20, 20, 24);
        paste(&mut frame, &confirm_img, 10, 10);
        paste(&mut frame, &watch_img, 150, 100);
        let templates = vec![
            template("confirm", full(), &confirm_img, (240, 160)),
            template("absent", full(), &absent_img, (240, 160)),
            template("watch", full(), &watch_img, (240, 160)),
        ];
        let h = harness(frame, templates, Vec::new(), Duration::ZERO);

        assert_eq!(h.scan.run_tick(), TickOutcome::Scanned { clicks: 2 });
        assert_eq!(
            h.input.events(),
            vec![InputEvent::Click(22, 18), InputEvent::Click(159, 109)]
        );
        let session = h.session.read().unwrap();
        assert_eq!(session.count("absent"), 0);
        let updates = h.observer.updates.lock().unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[1].0.get("confirm"), Some(&1));
        assert_eq!(updates[1].0.get("watch"), Some(&1));
    }

    #[test]
    fn test_interrupt_preempts_normal_scan() {
        let mut frame = noise_image(200, 150, 31);
        let popup_img = noise_image(16, 16, 32);
        let confirm_img = noise_image(20, 12, 33);
        paste(&mut frame, &popup_img, 20, 20);
        paste(&mut frame, &confirm_img, 120, 100);
        let popup = InterruptTemplate {
            template: template("popup", full(), &popup_img, (200, 150)),
            actions: vec![
                ActionEvent::Key(KeyName::Escape),
                ActionEvent::Wait(0.0),
                ActionEvent::Click,
            ],
        };
        let confirm = template("confirm", full(), &confirm_img, (200, 150));
        let h = harness(frame, vec![confirm], vec![popup], Duration::ZERO);

        assert_eq!(h.scan.run_tick(), TickOutcome::Interrupted("popup".to_string()));

        assert_eq!(
            h.input.events(),
            vec![InputEvent::Key(KeyName::Escape), InputEvent::Click(28, 28)]
        );
        assert_eq!(h.session.read().unwrap().count("confirm"), 0);
        assert!(h.observer.updates.lock().unwrap().is_empty());
        assert_eq!(*h.observer.interrupts.lock().unwrap(), vec!["popup".to_string()]);
        // only the interrupt region was captured
        assert_eq!(h.capture.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_interrupts_checked_in_declared_order() {
        let mut frame = noise_image(200, 150, 41);
        let first_img = noise_image(16, 16, 42);
        let second_img = noise_image(16, 16, 43);
        paste(&mut frame, &first_img, 10, 10);
        paste(&mut frame, &second_img, 100, 100);
        let interrupts = vec![
            InterruptTemplate {
                template: template("first", full(), &first_img, (200, 150)),
                actions: vec![ActionEvent::Key(KeyName::Enter)],
            },
            InterruptTemplate {
                template: template("second", full(), &second_img, (200, 150)),
                actions: vec![ActionEvent::Key(KeyName::Escape)],
            },
        ];
        let h = harness(frame, Vec::new(), interrupts, Duration::ZERO);

        assert_eq!(h.scan.run_tick(), TickOutcome::Interrupted("first".to_string()));
        assert_eq!(h.input.events(), vec![InputEvent::Key(KeyName::Enter)]);
    }

    #[test]
    fn test_capture_failure_is_reported_and_scanning_continues() {
        let mut frame = noise_image(200, 150, 51);
        let button = noise_image(20, 20, 52);
        paste(&mut frame, &button, 40, 40);
        let confirm = template("confirm", full(), &button, (200, 150));
        let h = harness(frame, vec![confirm], Vec::new(), Duration::ZERO);

        h.capture.set_failing(true);
        assert_eq!(h.scan.run_tick(), TickOutcome::Scanned { clicks: 0 });
        {
            let failures = h.observer.failures.lock().unwrap();
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].0, "confirm");
            assert!(failures[0].1.contains("display went away"));
        }

        h.capture.set_failing(false);
        assert_eq!(h.scan.run_tick(), TickOutcome::Scanned { clicks: 1 });
        assert_eq!(h.session.read().unwrap().count("confirm"), 1);
    }

    #[test]
    fn test_oversized_template_is_reported_not_matched() {
        let frame = noise_image(200, 150, 61);
        let huge = noise_image(120, 120, 62);
        let zone = Zone::new(0.0, 0.0, 0.5, 0.5);
        let big = template("big", zone, &huge, (200, 150));
        let h = harness(frame, vec![big], Vec::new(), Duration::ZERO);

        assert_eq!(h.scan.run_tick(), TickOutcome::Scanned { clicks: 0 });
        let failures = h.observer.failures.lock().unwrap();
        assert!(failures[0].1.contains("larger than the captured region"));
        assert!(h.input.events().is_empty());
    }

    #[test]
    fn test_rejected_click_does_not_count() {
        let mut frame = noise_image(200, 150, 71);
        let button = noise_image(20, 20, 72);
        paste(&mut frame, &button, 40, 40);
        let confirm = template("confirm", full(), &button, (200, 150));
        let h = harness(frame, vec![confirm], Vec::new(), Duration::ZERO);
        *h.input.reject.lock().unwrap() = true;

        assert_eq!(h.scan.run_tick(), TickOutcome::Scanned { clicks: 0 });
        assert_eq!(h.session.read().unwrap().count("confirm"), 0);
        assert!(h.observer.updates.lock().unwrap().is_empty());
    }

    #[test]
    fn test_stop_flag_ends_long_delay_promptly() {
        let frame = noise_image(120, 90, 81);
        let absent = template("absent", full(), &noise_image(10, 10, 82), (120, 90));
        let h = harness(frame, vec![absent], Vec::new(), Duration::from_secs(30));
        let Harness {
            scan,
            stop,
            session,
            capture,
            ..
        } = h;

        let started = Instant::now();
        let worker = std::thread::spawn(move || scan.run());
        while capture.calls.load(Ordering::SeqCst) == 0 {
            std::thread::sleep(Duration::from_millis(5));
        }
        std::thread::sleep(Duration::from_millis(50));
        stop.store(true, Ordering::Release);
        worker.join().unwrap();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(capture.calls.load(Ordering::SeqCst), 1);
        assert!(!session.read().unwrap().is_running());
    }

    #[test]
    fn test_stop_before_run_skips_ticks() {
        let frame = noise_image(120, 90, 91);
        let absent = template("absent", full(), &noise_image(10, 10, 92), (120, 90));
        let h = harness(frame, vec![absent], Vec::new(), Duration::ZERO);
        h.stop.store(true, Ordering::Release);

        h.scan.run();
        assert_eq!(h.capture.calls.load(Ordering::SeqCst), 0);
    }
}
