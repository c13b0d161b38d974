//! Dynamic help text generation from keymaps.

use crate::app::Message;
use crate::catalog::ViewSelector;
use crate::keys::{Keymap, format_key};

/// A single help item representing one or more related actions.
pub struct HelpItem {
    /// Messages to look up keys for. Keys are joined with "/".
    messages: Vec<Message>,
    /// The label to show (e.g., "nav", "expand", "quit").
    label: &'static str,
}

impl HelpItem {
    /// Create a help item for a single action.
    pub fn new(message: Message, label: &'static str) -> Self {
        Self {
            messages: vec![message],
            label,
        }
    }

    /// Create a help item for paired actions (e.g., j/k for next/prev).
    pub fn pair(first: Message, second: Message, label: &'static str) -> Self {
        Self {
            messages: vec![first, second],
            label,
        }
    }

    /// Format this help item using the given keymap.
    /// Returns None if no keys are bound for any of the messages.
    pub fn format(&self, keymap: &Keymap) -> Option<String> {
        let keys: Vec<String> = self
            .messages
            .iter()
            .filter_map(|msg| {
                keymap
                    .find_key(msg)
                    .map(|(code, mods)| format_key(code, mods))
            })
            .collect();
        if keys.is_empty() {
            return None;
        }
        Some(format!("{}:{}", keys.join("/"), self.label))
    }

    /// Format this help item for overlay display.
    /// Returns (`keys_string`, label) or None if no keys are bound.
    pub fn format_for_overlay(&self, keymap: &Keymap) -> Option<(String, &'static str)> {
        let keys: Vec<String> = self
            .messages
            .iter()
            .filter_map(|msg| {
                keymap
                    .find_key(msg)
                    .map(|(code, mods)| format_key(code, mods))
            })
            .collect();
        if keys.is_empty() {
            return None;
        }
        Some((keys.join("/"), self.label))
    }
}

/// A collection of help items for a specific context.
pub struct HelpConfig {
    /// Items to show in expanded (full help) mode.
    pub expanded: Vec<HelpItem>,
    /// Items to show in compact (minimal) mode.
    pub compact: Vec<HelpItem>,
}

impl HelpConfig {
    /// Format help text for the given mode.
    pub fn format(&self, keymap: &Keymap, show_expanded: bool) -> String {
        let items = if show_expanded {
            &self.expanded
        } else {
            &self.compact
        };
        items
            .iter()
            .filter_map(|item| item.format(keymap))
            .collect::<Vec<_>>()
            .join("  ")
    }
}

/// Help configuration for the timeline screen.
pub fn timeline_help() -> HelpConfig {
    use Message::{
        EnlargeMedia, Login, Logout, NextView, OpenExternal, PrevView, Quit, Refresh, SelectNext,
        SelectPrev, ShowMore, ToggleDebug, ToggleHelp,
    };
    HelpConfig {
        expanded: vec![
            HelpItem::pair(SelectNext, SelectPrev, "nav"),
            HelpItem::pair(PrevView, NextView, "views"),
            HelpItem::new(Refresh, "refresh"),
            HelpItem::new(ShowMore, "more"),
            HelpItem::new(EnlargeMedia, "media"),
            HelpItem::new(OpenExternal, "open"),
            HelpItem::new(Login, "login"),
            HelpItem::new(Logout, "logout"),
            HelpItem::new(ToggleDebug, "debug"),
            HelpItem::new(Quit, "quit"),
            HelpItem::new(ToggleHelp, "hide"),
        ],
        compact: vec![
            HelpItem::pair(PrevView, NextView, "views"),
            HelpItem::new(ShowMore, "more"),
            HelpItem::new(ToggleHelp, "help"),
            HelpItem::new(Quit, "quit"),
        ],
    }
}

/// Help items for the overlay.
pub fn timeline_overlay_items() -> Vec<HelpItem> {
    use Message::{
        EnlargeMedia, Login, Logout, NextView, OpenExternal, PrevView, Quit, Refresh, SelectFirst,
        SelectLast, SelectNext, SelectPrev, ShowMore, ToggleDebug, ToggleHelp,
    };
    vec![
        HelpItem::pair(SelectNext, SelectPrev, "navigate"),
        HelpItem::pair(SelectFirst, SelectLast, "top/bottom"),
        HelpItem::pair(
            Message::SelectView(ViewSelector::Home),
            Message::SelectView(ViewSelector::Live),
            "jump to view",
        ),
        HelpItem::pair(PrevView, NextView, "switch views"),
        HelpItem::new(Refresh, "refresh"),
        HelpItem::new(ShowMore, "show more posts"),
        HelpItem::new(EnlargeMedia, "enlarge media"),
        HelpItem::new(OpenExternal, "open in browser"),
        HelpItem::new(Login, "log in"),
        HelpItem::new(Logout, "log out"),
        HelpItem::new(ToggleDebug, "debug"),
        HelpItem::new(Quit, "quit"),
        HelpItem::new(ToggleHelp, "close"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{global_keymap, timeline_keymap};

    #[test]
    fn timeline_help_expanded_contains_expected_items() {
        let keymap = global_keymap().extend(timeline_keymap());
        let help = timeline_help().format(&keymap, true);
        assert!(help.contains("j/k:nav"));
        assert!(help.contains("H/L:views"));
        assert!(help.contains("m:more"));
        assert!(help.contains("i:login"));
        assert!(help.contains("q:quit"));
    }

    #[test]
    fn timeline_help_compact_is_shorter() {
        let keymap = global_keymap().extend(timeline_keymap());
        let expanded = timeline_help().format(&keymap, true);
        let compact = timeline_help().format(&keymap, false);
        assert!(compact.len() < expanded.len());
        assert!(compact.contains("?:help"));
    }

    #[test]
    fn overlay_lists_view_digits() {
        let keymap = global_keymap().extend(timeline_keymap());
        let rows: Vec<_> = timeline_overlay_items()
            .iter()
            .filter_map(|item| item.format_for_overlay(&keymap))
            .collect();
        assert!(rows.contains(&("1/5".to_string(), "jump to view")));
    }

    #[test]
    fn help_item_returns_none_for_unbound_message() {
        let keymap = Keymap::new();
        let item = HelpItem::new(Message::Quit, "quit");
        assert!(item.format(&keymap).is_none());
    }
}
