// Idle/Running/Stopping control state machine around the scan worker
use super::match_image::{ScanConfig, TemplateStore};
use super::observer::ScanObserver;
use super::scan_loop::ScanLoop;
use super::session::SessionState;
use super::types::{ScanState, SessionSnapshot};
use crate::capture::ScreenCapture;
use crate::error::{ClickerError, ClickerResult};
use crate::input::InputDriver;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread::JoinHandle;

pub struct ScanController {
    capture: Arc<dyn ScreenCapture>,
    input: Arc<Mutex<dyn InputDriver>>,
    observer: Arc<dyn ScanObserver>,
    state: ScanState,
    session: Arc<RwLock<SessionState>>,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    last_config: Option<ScanConfig>,
}

impl ScanController {
    pub fn new(
        capture: Arc<dyn ScreenCapture>,
        input: Arc<Mutex<dyn InputDriver>>,
        observer: Arc<dyn ScanObserver>,
    ) -> Self {
        let mut session = SessionState::new(Vec::<String>::new());
        session.finish();
        Self {
            capture,
            input,
            observer,
            state: ScanState::Idle,
            session: Arc::new(RwLock::new(session)),
            stop: Arc::new(AtomicBool::new(false)),
            worker: None,
            last_config: None,
        }
    }

    fn change_state(&mut self, new_state: ScanState) {
        if self.state != new_state {
            log::debug!("🎮 Scan state: {:?} -> {:?}", self.state, new_state);
            self.state = new_state;
            self.observer.on_state_changed(new_state);
        }
    }

    /// Load every template and spawn the worker. A no-op while a session
    /// is already running; any configuration error leaves the controller
    /// idle.
    pub fn start(&mut self, config: &ScanConfig) -> ClickerResult<()> {
        if self.worker.is_some() {
            log::info!("🤖 Scan already running, ignoring start");
            return Ok(());
        }

        let delay = config.delay()?;
        let (screen_width, screen_height) = self.capture.screen_dimensions()?;
        let store = Arc::new(TemplateStore::load(config, screen_width, screen_height)?);

        let stop = Arc::new(AtomicBool::new(false));
        *self.session.write().unwrap_or_else(PoisonError::into_inner) =
            SessionState::new(store.names());
        let scan = ScanLoop::new(
            store,
            self.capture.clone(),
            self.input.clone(),
            self.observer.clone(),
            self.session.clone(),
            delay,
            stop.clone(),
        );
        let worker = std::thread::Builder::new()
            .name("scan-loop".to_string())
            .spawn(move || scan.run())
            .map_err(|source| ClickerError::WorkerSpawn { source })?;

        self.stop = stop;
        self.worker = Some(worker);
        self.last_config = Some(config.clone());
        self.change_state(ScanState::Running);
        Ok(())
    }

    /// Request a cooperative stop and block until the worker has exited.
    /// Calling it while idle does nothing.
    pub fn stop(&mut self) -> ClickerResult<()> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };

        self.change_state(ScanState::Stopping);
        self.stop.store(true, Ordering::Release);
        let joined = worker.join();

        self.session
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .finish();
        self.change_state(ScanState::Idle);

        match joined {
            Ok(()) => Ok(()),
            Err(_) => {
                log::error!("❌ Scan worker panicked");
                Err(ClickerError::WorkerPanicked)
            }
        }
    }

    /// Stop, then start again with the last configuration and every
    /// counter back at zero.
    pub fn restart(&mut self) -> ClickerResult<()> {
        let config = self.last_config.clone().ok_or(ClickerError::NotConfigured)?;
        if let Err(e) = self.stop() {
            log::warn!("⚠️ Previous session ended badly: {e}");
        }

        // Counters are zeroed even if the new session fails to start
        let mut session = SessionState::new(config.templates.iter().map(|t| t.name.clone()));
        session.finish();
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = session;

        log::info!("🔄 Restarting scan");
        self.start(&config)
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot()
    }

    pub fn last_config(&self) -> Option<&ScanConfig> {
        self.last_config.as_ref()
    }
}

impl Drop for ScanController {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log::warn!("⚠️ Scan worker did not shut down cleanly: {e}");
        }
    }
}
