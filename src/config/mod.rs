//! Configuration for Brief.
//!
//! Read from `~/.config/brief/config.toml` at startup. If the file doesn't
//! exist, a default configuration with comments is written there first.

pub mod colors;
pub mod keybindings;

pub use colors::ColorConfig;
pub use keybindings::KeybindingConfig;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::fetcher::http_fetcher::DEFAULT_TIMEOUT_SECS;
use crate::fetcher::remote::DEFAULT_PAGE_URL;
use crate::parser::DEFAULT_BASE_URL;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub colors: ColorConfig,
    pub keybindings: KeybindingConfig,
    pub source: SourceConfig,
    pub cache: CacheConfig,
}

/// Where the news page comes from.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Page that is fetched and parsed
    pub page_url: String,
    /// Base for resolving relative links inside articles
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            page_url: DEFAULT_PAGE_URL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Days a non-bookmarked article stays cached. 0 disables pruning.
    pub ttl_days: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_days: 7 }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Option<chrono::Duration> {
        (self.ttl_days > 0).then(|| chrono::Duration::days(i64::from(self.ttl_days)))
    }
}

impl Config {
    /// Load configuration from the default path.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_config_path()?)
    }

    /// Load configuration from `path`, writing the commented default there
    /// if nothing exists yet. Missing fields use their default values.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            Self::create_default_config(path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// `~/.config/brief/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("brief").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        let io_error = |p: &Path| {
            let p = p.to_path_buf();
            move |source| ConfigError::Io { path: p, source }
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        fs::write(path, DEFAULT_CONFIG).map_err(io_error(path))
    }
}

const DEFAULT_CONFIG: &str = r##"# Brief configuration
#
# Colors can be specified as:
# - Named colors: Black, Red, Green, Yellow, Blue, Magenta, Cyan, Gray,
#   DarkGray, LightRed, LightGreen, LightYellow, LightBlue, LightMagenta,
#   LightCyan, White, Reset
# - Hex colors: "#RRGGBB" or "#RGB"
#
# Keybindings can be specified as:
# - Single characters: "a", "A", "/"
# - Special keys: Enter, Tab, BackTab, Backspace, Delete, Home, End,
#   PageUp, PageDown, Up, Down, Left, Right, Esc, Space, F1-F12
# - With modifiers: "Ctrl+c", "Shift+Tab", "Alt+Enter"

[source]
page_url = "https://en.m.wikipedia.org/wiki/Portal:Current_events"
# Relative links inside articles are resolved against this
base_url = "https://en.m.wikipedia.org/"
timeout_secs = 30

[cache]
# Non-bookmarked articles older than this are pruned after each sync (0 = keep)
ttl_days = 7

[colors]
# Picked by `brief settings theme dark|light`
background_dark = "Black"
background_light = "Reset"
text_dark = "White"
text_light = "Reset"

active_border = "Cyan"
inactive_border = "DarkGray"
active_tab = "Yellow"
selection_bg = "Cyan"
selection_fg = "Black"
section_header = "LightBlue"
bookmark = "Yellow"
link = "Blue"

status_fg = "White"
status_bg = "DarkGray"

[keybindings]
quit = ["q", "Ctrl+c"]
move_up = ["k", "Up"]
move_down = ["j", "Down"]
next_page = ["n", "PageDown"]
prev_page = ["p", "PageUp"]
next_tab = ["Tab", "l"]
prev_tab = ["BackTab", "Shift+Tab", "h"]

# Enter focuses the preview, Esc returns to the list
select = ["Enter"]
back = ["Esc"]
toggle_bookmark = ["b"]
open_in_browser = ["o"]
refresh = ["R"]
search = ["/"]
toggle_maximize = ["m"]
clear_bookmarks = ["X"]
"##;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    #[test]
    fn test_default_config_deserializes() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).expect("default config is valid TOML");

        assert_eq!(config.colors.section_header, Color::LightBlue);
        assert_eq!(config.keybindings.search, vec!["/"]);
        assert_eq!(config.source.page_url, DEFAULT_PAGE_URL);
        assert_eq!(config.source.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.cache.ttl_days, 7);
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[colors]
background_dark = "#1E1E2E"

[cache]
ttl_days = 0
"##;
        let config: Config = toml::from_str(content).expect("partial config should work");

        assert_eq!(config.colors.background_dark, Color::Rgb(30, 30, 46));
        assert_eq!(config.colors.bookmark, Color::Yellow);
        assert_eq!(config.source.timeout(), Duration::from_secs(30));
        assert!(config.cache.ttl().is_none());
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("empty config should work");
        assert_eq!(config.keybindings.quit, vec!["q", "Ctrl+c"]);
        assert_eq!(config.cache.ttl(), Some(chrono::Duration::days(7)));
    }

    #[test]
    fn test_load_from_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brief").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.cache.ttl_days, 7);
        assert_eq!(fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);

        // Second load reads the file that was written
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.source.timeout_secs, 30);
    }

    #[test]
    fn test_load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[cache]\nttl_days = \"soon\"\n").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
