// Per-session counters and timing
use super::types::{ClickCounts, SessionSnapshot};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct SessionState {
    counts: ClickCounts,
    started_at: Instant,
    stopped_at: Option<Instant>,
}

impl SessionState {
    /// Fresh session with every counter at zero and the clock started now
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            counts: names.into_iter().map(|n| (n.into(), 0)).collect(),
            started_at: Instant::now(),
            stopped_at: None,
        }
    }

    pub fn increment(&mut self, name: &str) -> u64 {
        let count = self.counts.entry(name.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    pub fn count(&self, name: &str) -> u64 {
        self.counts.get(name).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &ClickCounts {
        &self.counts
    }

    /// Elapsed time since start, frozen once the session is finished
    pub fn elapsed(&self) -> Duration {
        match self.stopped_at {
            Some(stopped) => stopped.duration_since(self.started_at),
            None => self.started_at.elapsed(),
        }
    }

    pub fn finish(&mut self) {
        if self.stopped_at.is_none() {
            self.stopped_at = Some(Instant::now());
        }
    }

    pub fn is_running(&self) -> bool {
        self.stopped_at.is_none()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            counts: self.counts.clone(),
            elapsed: self.elapsed(),
            running: self.is_running(),
        }
    }
}
