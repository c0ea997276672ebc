use crate::error::{ClickerError, ClickerResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Keys an interrupt action sequence may press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum KeyName {
    Escape,
    Enter,
    Space,
    Tab,
    Backspace,
    Up,
    Down,
    Left,
    Right,
    F(u8),
    Char(char),
}

impl FromStr for KeyName {
    type Err = ClickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let key = match lower.as_str() {
            "escape" | "esc" => KeyName::Escape,
            "enter" | "return" => KeyName::Enter,
            "space" => KeyName::Space,
            "tab" => KeyName::Tab,
            "backspace" => KeyName::Backspace,
            "up" => KeyName::Up,
            "down" => KeyName::Down,
            "left" => KeyName::Left,
            "right" => KeyName::Right,
            other => {
                if let Some(n) = other.strip_prefix('f')
                    && let Ok(n) = n.parse::<u8>()
                    && (1..=12).contains(&n)
                {
                    KeyName::F(n)
                } else {
                    let mut chars = other.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => KeyName::Char(c),
                        _ => {
                            return Err(ClickerError::Configuration {
                                description: format!("Unknown key '{s}'"),
                            });
                        }
                    }
                }
            }
        };
        Ok(key)
    }
}

impl TryFrom<String> for KeyName {
    type Error = ClickerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<KeyName> for String {
    fn from(key: KeyName) -> Self {
        key.to_string()
    }
}

impl fmt::Display for KeyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyName::Escape => write!(f, "escape"),
            KeyName::Enter => write!(f, "enter"),
            KeyName::Space => write!(f, "space"),
            KeyName::Tab => write!(f, "tab"),
            KeyName::Backspace => write!(f, "backspace"),
            KeyName::Up => write!(f, "up"),
            KeyName::Down => write!(f, "down"),
            KeyName::Left => write!(f, "left"),
            KeyName::Right => write!(f, "right"),
            KeyName::F(n) => write!(f, "f{n}"),
            KeyName::Char(c) => write!(f, "{c}"),
        }
    }
}

// Trait defining synthetic input capabilities
pub trait InputDriver: Send {
    /// Move the pointer to absolute screen coordinates and left-click.
    fn click(&mut self, x: u32, y: u32) -> ClickerResult<()>;

    fn press_key(&mut self, key: KeyName) -> ClickerResult<()>;

    fn cursor_position(&mut self) -> ClickerResult<(i32, i32)>;
}
