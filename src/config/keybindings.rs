//! Keybinding configuration for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::Deserialize;

use crate::tui::event::Action;

/// Key strings bound to each TUI action.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeybindingConfig {
    pub quit: Vec<String>,
    pub move_up: Vec<String>,
    pub move_down: Vec<String>,
    pub next_page: Vec<String>,
    pub prev_page: Vec<String>,
    pub next_tab: Vec<String>,
    pub prev_tab: Vec<String>,
    pub select: Vec<String>,
    pub back: Vec<String>,
    pub toggle_bookmark: Vec<String>,
    pub open_in_browser: Vec<String>,
    pub refresh: Vec<String>,
    pub search: Vec<String>,
    pub toggle_maximize: Vec<String>,
    pub clear_bookmarks: Vec<String>,
}

fn keys(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for KeybindingConfig {
    fn default() -> Self {
        Self {
            quit: keys(&["q", "Ctrl+c"]),
            move_up: keys(&["k", "Up"]),
            move_down: keys(&["j", "Down"]),
            next_page: keys(&["n", "PageDown"]),
            prev_page: keys(&["p", "PageUp"]),
            next_tab: keys(&["Tab", "l"]),
            prev_tab: keys(&["BackTab", "Shift+Tab", "h"]),
            select: keys(&["Enter"]),
            back: keys(&["Esc"]),
            toggle_bookmark: keys(&["b"]),
            open_in_browser: keys(&["o"]),
            refresh: keys(&["R"]),
            search: keys(&["/"]),
            toggle_maximize: keys(&["m"]),
            clear_bookmarks: keys(&["X"]),
        }
    }
}

impl KeybindingConfig {
    /// Map a key event to an action. Earlier entries win when a key is bound twice.
    pub fn get_action(&self, key: &KeyEvent) -> Action {
        let table: [(&[String], Action); 15] = [
            (&self.quit, Action::Quit),
            (&self.move_up, Action::MoveUp),
            (&self.move_down, Action::MoveDown),
            (&self.next_page, Action::NextPage),
            (&self.prev_page, Action::PrevPage),
            (&self.next_tab, Action::NextTab),
            (&self.prev_tab, Action::PrevTab),
            (&self.select, Action::Select),
            (&self.back, Action::Back),
            (&self.toggle_bookmark, Action::ToggleBookmark),
            (&self.open_in_browser, Action::OpenInBrowser),
            (&self.refresh, Action::Refresh),
            (&self.search, Action::Search),
            (&self.toggle_maximize, Action::ToggleMaximize),
            (&self.clear_bookmarks, Action::ClearBookmarks),
        ];

        table
            .iter()
            .find(|(bindings, _)| matches_any(key, bindings))
            .map(|(_, action)| *action)
            .unwrap_or(Action::None)
    }
}

fn matches_any(key: &KeyEvent, bindings: &[String]) -> bool {
    bindings
        .iter()
        .filter_map(|b| parse_key_string(b).ok())
        .any(|binding| binding.matches(key))
}

/// A parsed key binding with code and modifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    /// Shift is ignored when the binding does not ask for it, since terminals
    /// report `R` as Shift+`R`.
    pub fn matches(&self, key: &KeyEvent) -> bool {
        self.code == key.code
            && (self.modifiers == key.modifiers
                || self.modifiers == key.modifiers.difference(KeyModifiers::SHIFT))
    }
}

/// Parse a key string such as `"j"`, `"PageDown"`, `"F5"` or `"Ctrl+Shift+a"`.
pub fn parse_key_string(s: &str) -> Result<KeyBinding, String> {
    let s = s.trim();
    // A lone "+" is a key, not a separator
    let (modifier_parts, key_part) = match s.rsplit_once('+') {
        Some((mods, key)) if !key.is_empty() => (Some(mods), key),
        _ => (None, s),
    };

    let mut modifiers = KeyModifiers::NONE;
    for part in modifier_parts.into_iter().flat_map(|m| m.split('+')) {
        modifiers |= match part.to_lowercase().as_str() {
            "ctrl" | "control" => KeyModifiers::CONTROL,
            "shift" => KeyModifiers::SHIFT,
            "alt" => KeyModifiers::ALT,
            _ => return Err(format!("Unknown modifier: {}", part)),
        };
    }

    Ok(KeyBinding {
        code: parse_key_code(key_part)?,
        modifiers,
    })
}

fn parse_key_code(s: &str) -> Result<KeyCode, String> {
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::Char(c));
    }

    let lower = s.to_lowercase();
    if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
        if (1..=12).contains(&n) {
            return Ok(KeyCode::F(n));
        }
    }

    match lower.as_str() {
        "enter" | "return" => Ok(KeyCode::Enter),
        "tab" => Ok(KeyCode::Tab),
        "backtab" => Ok(KeyCode::BackTab),
        "backspace" | "bs" => Ok(KeyCode::Backspace),
        "delete" | "del" => Ok(KeyCode::Delete),
        "home" => Ok(KeyCode::Home),
        "end" => Ok(KeyCode::End),
        "pageup" | "pgup" => Ok(KeyCode::PageUp),
        "pagedown" | "pgdn" => Ok(KeyCode::PageDown),
        "up" => Ok(KeyCode::Up),
        "down" => Ok(KeyCode::Down),
        "left" => Ok(KeyCode::Left),
        "right" => Ok(KeyCode::Right),
        "esc" | "escape" => Ok(KeyCode::Esc),
        "space" => Ok(KeyCode::Char(' ')),
        _ => Err(format!("Unknown key: {}", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chars() {
        let binding = parse_key_string("/").unwrap();
        assert_eq!(binding.code, KeyCode::Char('/'));
        assert_eq!(binding.modifiers, KeyModifiers::NONE);

        let binding = parse_key_string("+").unwrap();
        assert_eq!(binding.code, KeyCode::Char('+'));
    }

    #[test]
    fn test_parse_special_keys() {
        assert_eq!(parse_key_string("Esc").unwrap().code, KeyCode::Esc);
        assert_eq!(parse_key_string("backtab").unwrap().code, KeyCode::BackTab);
        assert_eq!(parse_key_string("PgDn").unwrap().code, KeyCode::PageDown);
        assert_eq!(parse_key_string("F5").unwrap().code, KeyCode::F(5));
        assert!(parse_key_string("F13").is_err());
        assert!(parse_key_string("Hyper").is_err());
    }

    #[test]
    fn test_parse_modifiers() {
        let binding = parse_key_string("Ctrl+Shift+a").unwrap();
        assert_eq!(binding.code, KeyCode::Char('a'));
        assert_eq!(
            binding.modifiers,
            KeyModifiers::CONTROL | KeyModifiers::SHIFT
        );
        assert!(parse_key_string("Super+a").is_err());
    }

    #[test]
    fn test_shift_is_ignored_for_plain_bindings() {
        let binding = parse_key_string("R").unwrap();
        assert!(binding.matches(&KeyEvent::new(KeyCode::Char('R'), KeyModifiers::SHIFT)));

        let binding = parse_key_string("Ctrl+c").unwrap();
        assert!(!binding.matches(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));
    }

    #[test]
    fn test_default_actions() {
        let config = KeybindingConfig::default();
        let action = |code, modifiers| config.get_action(&KeyEvent::new(code, modifiers));

        assert_eq!(action(KeyCode::Char('c'), KeyModifiers::CONTROL), Action::Quit);
        assert_eq!(action(KeyCode::Char('/'), KeyModifiers::NONE), Action::Search);
        assert_eq!(action(KeyCode::Char('b'), KeyModifiers::NONE), Action::ToggleBookmark);
        assert_eq!(action(KeyCode::Char('X'), KeyModifiers::SHIFT), Action::ClearBookmarks);
        assert_eq!(action(KeyCode::BackTab, KeyModifiers::SHIFT), Action::PrevTab);
        assert_eq!(action(KeyCode::Esc, KeyModifiers::NONE), Action::Back);
        assert_eq!(action(KeyCode::Char('z'), KeyModifiers::NONE), Action::None);
    }
}
