//! Configuration for a scan session

use crate::error::{ClickerError, ClickerResult};
use crate::input::KeyName;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_DELAY_SECS: f64 = 1.0;
pub const DEFAULT_THRESHOLD: f32 = 0.85;

fn default_delay() -> f64 {
    DEFAULT_DELAY_SECS
}

fn default_threshold() -> f32 {
    DEFAULT_THRESHOLD
}

/// Seconds as a `Duration`; `None` for negative, NaN or out-of-range values
pub fn seconds(secs: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(secs).ok()
}

/// Screen sub-region as fractions of the full screen width/height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Zone {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Zone {
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// 0 <= x1 < x2 <= 1 and 0 <= y1 < y2 <= 1 (NaN never passes)
    pub fn is_valid(&self) -> bool {
        (0.0 <= self.x1 && self.x1 < self.x2 && self.x2 <= 1.0)
            && (0.0 <= self.y1 && self.y1 < self.y2 && self.y2 <= 1.0)
    }

    pub fn as_array(&self) -> [f64; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }
}

impl From<[f64; 4]> for Zone {
    fn from(v: [f64; 4]) -> Self {
        Zone::new(v[0], v[1], v[2], v[3])
    }
}

impl From<Zone> for [f64; 4] {
    fn from(zone: Zone) -> Self {
        zone.as_array()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateConfig {
    pub name: String,
    pub path: PathBuf,
    pub zone: Zone,
    #[serde(default = "default_threshold")]
    pub threshold: f32,
}

impl TemplateConfig {
    pub fn new(name: &str, path: impl Into<PathBuf>, zone: Zone, threshold: f32) -> Self {
        Self {
            name: name.to_string(),
            path: path.into(),
            zone,
            threshold,
        }
    }
}

/// One step of an interrupt action sequence.
/// JSON forms: `{"key": "escape"}`, `{"wait": 2.5}`, `"click"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionEvent {
    /// Press and release a key
    Key(KeyName),
    /// Sleep for the given number of seconds
    Wait(f64),
    /// Left-click the center of the interrupt match
    Click,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterruptConfig {
    #[serde(flatten)]
    pub template: TemplateConfig,
    pub actions: Vec<ActionEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Sleep between ticks, in seconds
    #[serde(default = "default_delay")]
    pub delay_secs: f64,
    /// Normal templates, scanned in declared order
    #[serde(default)]
    pub templates: Vec<TemplateConfig>,
    /// Interrupt templates, checked first in declared priority order
    #[serde(default)]
    pub interrupts: Vec<InterruptConfig>,
}

impl Default for ScanConfig {
    /// The stock game-client setup: a confirm button bottom right and a
    /// "watch" button below center.
    fn default() -> Self {
        Self {
            delay_secs: DEFAULT_DELAY_SECS,
            templates: vec![
                TemplateConfig::new(
                    "confirm_button",
                    "templates/confirm.png",
                    Zone::new(0.77, 0.84, 0.99, 0.99),
                    DEFAULT_THRESHOLD,
                ),
                TemplateConfig::new(
                    "watch_button",
                    "templates/watch.png",
                    Zone::new(0.48, 0.65, 0.73, 0.80),
                    DEFAULT_THRESHOLD,
                ),
            ],
            interrupts: Vec::new(),
        }
    }
}

impl ScanConfig {
    /// Load a JSON config; relative image paths resolve against the
    /// directory holding the file.
    pub fn from_file(path: &Path) -> ClickerResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ClickerError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_json(&text).map_err(|source| ClickerError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn resolve_paths(&mut self, base: &Path) {
        let all = self
            .templates
            .iter_mut()
            .chain(self.interrupts.iter_mut().map(|i| &mut i.template));
        for template in all {
            if template.path.is_relative() {
                template.path = base.join(&template.path);
            }
        }
    }

    pub fn with_delay(mut self, delay_secs: f64) -> Self {
        self.delay_secs = delay_secs;
        self
    }

    /// Inter-tick sleep
    pub fn delay(&self) -> ClickerResult<Duration> {
        seconds(self.delay_secs).ok_or_else(|| ClickerError::Configuration {
            description: format!(
                "Scan delay must be a non-negative number of seconds, got {}",
                self.delay_secs
            ),
        })
    }

    /// All templates in evaluation order: interrupts first, then normal ones
    pub fn all_templates(&self) -> impl Iterator<Item = &TemplateConfig> {
        self.interrupts
            .iter()
            .map(|i| &i.template)
            .chain(self.templates.iter())
    }

    /// Check everything that can be checked without touching disk or screen.
    pub fn validate(&self) -> ClickerResult<()> {
        self.delay()?;
        if self.templates.is_empty() && self.interrupts.is_empty() {
            return Err(ClickerError::Configuration {
                description: "No templates configured".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for template in self.all_templates() {
            if template.name.trim().is_empty() {
                return Err(ClickerError::Configuration {
                    description: format!(
                        "Template with image {:?} has an empty name",
                        template.path
                    ),
                });
            }
            if !seen.insert(template.name.as_str()) {
                return Err(ClickerError::DuplicateTemplate {
                    name: template.name.clone(),
                });
            }
            if !template.zone.is_valid() {
                return Err(ClickerError::InvalidZone {
                    name: template.name.clone(),
                    zone: template.zone.as_array(),
                });
            }
            if !(0.0..=1.0).contains(&template.threshold) {
                return Err(ClickerError::InvalidThreshold {
                    name: template.name.clone(),
                    threshold: template.threshold,
                });
            }
        }

        for interrupt in &self.interrupts {
            for action in &interrupt.actions {
                if let ActionEvent::Wait(secs) = action
                    && seconds(*secs).is_none()
                {
                    return Err(ClickerError::Configuration {
                        description: format!(
                            "Interrupt '{}' has an invalid wait of {} seconds",
                            interrupt.template.name, secs
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}
