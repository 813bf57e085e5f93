use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

use crate::app::Result;

pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Polls the terminal, yielding a tick when nothing arrives within `tick_rate`
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    pub fn next(&self) -> Result<AppEvent> {
        if !event::poll(self.tick_rate)? {
            return Ok(AppEvent::Tick);
        }
        Ok(match event::read()? {
            // Release events would double every keystroke on Windows
            Event::Key(key) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
            Event::Resize(..) => AppEvent::Resize,
            _ => AppEvent::Tick,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    MoveUp,
    MoveDown,
    NextPage,
    PrevPage,
    NextTab,
    PrevTab,
    /// Move focus from the list to the preview
    Select,
    /// Move focus back to the list
    Back,
    ToggleBookmark,
    OpenInBrowser,
    Refresh,
    Search,
    ToggleMaximize,
    ClearBookmarks,
    None,
}
