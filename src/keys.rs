use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Message};
use crate::catalog::ViewSelector;
use crate::session::SessionStatus;

/// A declarative keybinding map that can be composed and extended.
#[derive(Clone)]
pub struct Keymap {
    bindings: Vec<(KeyCode, KeyModifiers, Message)>,
}

impl Keymap {
    pub const fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Add a key binding with no modifiers.
    pub fn bind(mut self, code: KeyCode, message: Message) -> Self {
        self.bindings.push((code, KeyModifiers::NONE, message));
        self
    }

    /// Add a key binding with Ctrl modifier.
    pub fn bind_ctrl(mut self, code: KeyCode, message: Message) -> Self {
        self.bindings.push((code, KeyModifiers::CONTROL, message));
        self
    }

    /// Look up a message for a key event.
    /// Later bindings take precedence over earlier ones.
    pub fn get(&self, event: &KeyEvent) -> Option<Message> {
        self.bindings
            .iter()
            .rev()
            .find(|(code, mods, _)| *code == event.code && event.modifiers.contains(*mods))
            .map(|(_, _, msg)| msg.clone())
    }

    /// Extend this keymap with another. The other keymap's bindings take precedence.
    pub fn extend(mut self, other: Self) -> Self {
        self.bindings.extend(other.bindings);
        self
    }

    /// Find the first key bound to a specific message.
    pub fn find_key(&self, message: &Message) -> Option<(KeyCode, KeyModifiers)> {
        self.bindings
            .iter()
            .find(|(_, _, msg)| msg == message)
            .map(|(code, mods, _)| (*code, *mods))
    }
}

/// Format a key binding for display in help text.
pub fn format_key(code: KeyCode, mods: KeyModifiers) -> String {
    let key_str = match code {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Up => "↑".to_string(),
        KeyCode::Down => "↓".to_string(),
        KeyCode::Left => "←".to_string(),
        KeyCode::Right => "→".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::F(n) => format!("F{n}"),
        _ => "?".to_string(),
    };
    if mods.contains(KeyModifiers::CONTROL) {
        format!("C-{key_str}")
    } else {
        key_str
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new()
    }
}

/// Global keybindings that work everywhere.
pub fn global_keymap() -> Keymap {
    Keymap::new()
        .bind(KeyCode::Char('q'), Message::Quit)
        .bind_ctrl(KeyCode::Char('c'), Message::Quit)
        .bind(KeyCode::Char('`'), Message::ToggleDebug)
}

/// Keybindings while the help overlay is open.
fn help_overlay_keymap() -> Keymap {
    Keymap::new()
        .bind(KeyCode::Char('?'), Message::ToggleHelp)
        .bind(KeyCode::Esc, Message::ToggleHelp)
        .bind(KeyCode::Char('q'), Message::ToggleHelp)
        .bind_ctrl(KeyCode::Char('c'), Message::Quit)
}

/// Keybindings while a media item is enlarged.
fn media_keymap() -> Keymap {
    Keymap::new()
        .bind(KeyCode::Esc, Message::DismissMedia)
        .bind(KeyCode::Char('v'), Message::DismissMedia)
        .bind(KeyCode::Char('q'), Message::DismissMedia)
        .bind(KeyCode::Char('o'), Message::OpenExternal)
        .bind(KeyCode::Enter, Message::OpenExternal)
        .bind_ctrl(KeyCode::Char('c'), Message::Quit)
}

fn navigation_keymap() -> Keymap {
    Keymap::new()
        .bind(KeyCode::Char('j'), Message::SelectNext)
        .bind(KeyCode::Down, Message::SelectNext)
        .bind(KeyCode::Char('k'), Message::SelectPrev)
        .bind(KeyCode::Up, Message::SelectPrev)
        .bind(KeyCode::Char('g'), Message::SelectFirst)
        .bind(KeyCode::Char('G'), Message::SelectLast)
        .bind_ctrl(KeyCode::Char('d'), Message::PageDown)
        .bind_ctrl(KeyCode::Char('u'), Message::PageUp)
}

/// Timeline keybindings.
pub fn timeline_keymap() -> Keymap {
    let mut keymap = navigation_keymap()
        .bind(KeyCode::Char('r'), Message::Refresh)
        .bind(KeyCode::Char('m'), Message::ShowMore)
        .bind(KeyCode::Char('v'), Message::EnlargeMedia)
        .bind(KeyCode::Enter, Message::EnlargeMedia)
        .bind(KeyCode::Char('o'), Message::OpenExternal)
        .bind(KeyCode::Char('i'), Message::Login)
        .bind(KeyCode::Char('x'), Message::Logout)
        .bind(KeyCode::Char('H'), Message::PrevView)
        .bind(KeyCode::Char('L'), Message::NextView)
        .bind(KeyCode::Tab, Message::NextView)
        .bind(KeyCode::Char('?'), Message::ToggleHelp);
    for (n, view) in ViewSelector::all().iter().enumerate() {
        if let Some(digit) = char::from_digit(n as u32 + 1, 10) {
            keymap = keymap.bind(KeyCode::Char(digit), Message::SelectView(*view));
        }
    }
    keymap
}

pub fn handle_key(key: KeyEvent, app: &App) -> Option<Message> {
    if app.show_help {
        return help_overlay_keymap().get(&key);
    }
    if app.viewer.is_open() {
        return media_keymap().get(&key);
    }

    if let Some(msg) = global_keymap().get(&key) {
        return Some(msg);
    }

    let keymap = if app.session.status == SessionStatus::Authenticating {
        timeline_keymap().extend(Keymap::new().bind(KeyCode::Esc, Message::CancelLogin))
    } else {
        timeline_keymap()
    };
    keymap.get(&key)
}
