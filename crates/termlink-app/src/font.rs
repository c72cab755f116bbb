//! Font size control: step, clamp, reset, persist.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use termlink_common::ConfigError;
use termlink_config::settings::{clamp_font_size, Settings, DEFAULT_FONT_SIZE};
use termlink_config::SettingsStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontAction {
    Increase,
    Decrease,
    Reset,
}

impl FontAction {
    pub fn label(self) -> &'static str {
        match self {
            FontAction::Increase => "Increase Font Size (Ctrl/Cmd +)",
            FontAction::Decrease => "Decrease Font Size (Ctrl/Cmd -)",
            FontAction::Reset => "Reset Font Size (Ctrl/Cmd 0)",
        }
    }
}

/// Map Ctrl/Cmd `=`/`+`, `-` and `0` to font actions.
pub fn shortcut(event: &KeyEvent) -> Option<FontAction> {
    if event.kind == KeyEventKind::Release {
        return None;
    }
    let primary = event.modifiers.contains(KeyModifiers::CONTROL)
        || event.modifiers.contains(KeyModifiers::SUPER);
    if !primary || event.modifiers.contains(KeyModifiers::ALT) {
        return None;
    }
    match event.code {
        KeyCode::Char('=') | KeyCode::Char('+') => Some(FontAction::Increase),
        KeyCode::Char('-') => Some(FontAction::Decrease),
        KeyCode::Char('0') => Some(FontAction::Reset),
        _ => None,
    }
}

/// Current font size backed by a settings store.
#[derive(Debug)]
pub struct FontControl {
    store: SettingsStore,
    size: u32,
}

impl FontControl {
    pub fn load(store: SettingsStore) -> Self {
        let size = store.load().font_size;
        Self { store, size }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Apply `action` and persist the result if the size changed.
    /// Returns whether it changed.
    pub fn apply(&mut self, action: FontAction) -> Result<bool, ConfigError> {
        let next = match action {
            FontAction::Increase => clamp_font_size(i64::from(self.size) + 1),
            FontAction::Decrease => clamp_font_size(i64::from(self.size) - 1),
            FontAction::Reset => DEFAULT_FONT_SIZE,
        };
        if next == self.size {
            return Ok(false);
        }

        self.store.save(&Settings { font_size: next })?;
        tracing::info!(from = self.size, to = next, "font size changed");
        self.size = next;
        Ok(true)
    }
}
