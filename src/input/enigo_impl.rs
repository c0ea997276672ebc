// Synthetic input through enigo
use super::types::{InputDriver, KeyName};
use crate::error::{ClickerError, ClickerResult};
use enigo::{Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};

pub struct EnigoInput {
    enigo: Enigo,
}

impl EnigoInput {
    pub fn new() -> ClickerResult<Self> {
        let enigo = Enigo::new(&Settings::default()).map_err(|e| {
            ClickerError::dispatch(format!("Failed to connect to the input system: {e}"))
        })?;
        Ok(Self { enigo })
    }

    /// Size of the main display as seen by the input system
    pub fn display_size(&self) -> ClickerResult<(i32, i32)> {
        self.enigo
            .main_display()
            .map_err(|e| ClickerError::dispatch(format!("Failed to query display size: {e}")))
    }

    fn to_enigo_key(key: KeyName) -> Key {
        match key {
            KeyName::Escape => Key::Escape,
            KeyName::Enter => Key::Return,
            KeyName::Space => Key::Space,
            KeyName::Tab => Key::Tab,
            KeyName::Backspace => Key::Backspace,
            KeyName::Up => Key::UpArrow,
            KeyName::Down => Key::DownArrow,
            KeyName::Left => Key::LeftArrow,
            KeyName::Right => Key::RightArrow,
            KeyName::F(1) => Key::F1,
            KeyName::F(2) => Key::F2,
            KeyName::F(3) => Key::F3,
            KeyName::F(4) => Key::F4,
            KeyName::F(5) => Key::F5,
            KeyName::F(6) => Key::F6,
            KeyName::F(7) => Key::F7,
            KeyName::F(8) => Key::F8,
            KeyName::F(9) => Key::F9,
            KeyName::F(10) => Key::F10,
            KeyName::F(11) => Key::F11,
            KeyName::F(_) => Key::F12,
            KeyName::Char(c) => Key::Unicode(c),
        }
    }
}

impl InputDriver for EnigoInput {
    fn click(&mut self, x: u32, y: u32) -> ClickerResult<()> {
        self.enigo
            .move_mouse(x as i32, y as i32, Coordinate::Abs)
            .map_err(|e| ClickerError::dispatch(format!("Failed to move pointer to ({x}, {y}): {e}")))?;
        self.enigo
            .button(Button::Left, Direction::Click)
            .map_err(|e| ClickerError::dispatch(format!("Failed to click at ({x}, {y}): {e}")))
    }

    fn press_key(&mut self, key: KeyName) -> ClickerResult<()> {
        self.enigo
            .key(Self::to_enigo_key(key), Direction::Click)
            .map_err(|e| ClickerError::dispatch(format!("Failed to press '{key}': {e}")))
    }

    fn cursor_position(&mut self) -> ClickerResult<(i32, i32)> {
        self.enigo
            .location()
            .map_err(|e| ClickerError::dispatch(format!("Failed to read cursor position: {e}")))
    }
}
