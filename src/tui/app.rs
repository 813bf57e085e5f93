use ratatui::widgets::ListState;

use crate::app::Result;
use crate::domain::{NewsArticle, NewsSection};
use crate::view::{BookmarksUiState, NewsUiState, SearchUiState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    News,
    Bookmarks,
    Search,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::News, Tab::Bookmarks, Tab::Search];

    pub fn index(self) -> usize {
        match self {
            Tab::News => 0,
            Tab::Bookmarks => 1,
            Tab::Search => 2,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Tab::News => "News",
            Tab::Bookmarks => "Bookmarks",
            Tab::Search => "Search",
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePane {
    List,
    Preview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Keystrokes edit the search query
    Search,
}

pub const PAGE_SIZE: usize = 10;

pub struct TuiApp {
    pub tab: Tab,
    pub active_pane: ActivePane,
    pub input_mode: InputMode,
    pub news: NewsUiState,
    pub bookmarks: BookmarksUiState,
    pub search: SearchUiState,
    pub search_query: String,
    /// Selected article per tab, counted over articles only
    selection: [usize; 3],
    pub list_state: ListState,
    pub preview_scroll: u16,
    pub should_quit: bool,
    pub status_message: Option<String>,
    pub is_refreshing: bool,
    pub maximized: bool,
    pub dark_theme: bool,
    pub pending_clear_bookmarks: bool,
}

impl TuiApp {
    pub fn new(dark_theme: bool) -> Self {
        Self {
            tab: Tab::News,
            active_pane: ActivePane::List,
            input_mode: InputMode::Normal,
            news: NewsUiState::Loading,
            bookmarks: BookmarksUiState::Loading,
            search: SearchUiState::Idle,
            search_query: String::new(),
            selection: [0; 3],
            list_state: ListState::default(),
            preview_scroll: 0,
            should_quit: false,
            status_message: None,
            is_refreshing: false,
            maximized: false,
            dark_theme,
            pending_clear_bookmarks: false,
        }
    }

    pub fn sections(&self) -> &[NewsSection] {
        match self.tab {
            Tab::News => self.news.sections(),
            Tab::Bookmarks => self.bookmarks.sections(),
            Tab::Search => self.search.sections(),
        }
    }

    pub fn article_count(&self) -> usize {
        self.sections().iter().map(|s| s.articles.len()).sum()
    }

    pub fn selected_index(&self) -> usize {
        self.selection[self.tab.index()]
    }

    pub fn selected_article(&self) -> Option<&NewsArticle> {
        self.sections()
            .iter()
            .flat_map(|s| s.articles.iter())
            .nth(self.selected_index())
    }

    /// Row of the selected article in the list, where every section adds a
    /// header row before its articles.
    pub fn selected_row(&self) -> Option<usize> {
        let mut remaining = self.selected_index();
        let mut row = 0;
        for section in self.sections() {
            row += 1;
            if remaining < section.articles.len() {
                return Some(row + remaining);
            }
            remaining -= section.articles.len();
            row += section.articles.len();
        }
        None
    }

    fn select(&mut self, index: usize) {
        let max_index = self.article_count().saturating_sub(1);
        let index = index.min(max_index);
        if index != self.selected_index() {
            self.preview_scroll = 0;
        }
        self.selection[self.tab.index()] = index;
        self.list_state.select(self.selected_row());
    }

    /// Clamp the selection after the visible sections changed
    pub fn sync_selection(&mut self) {
        self.select(self.selected_index());
    }

    pub fn move_up(&mut self) {
        match self.active_pane {
            ActivePane::List => self.select(self.selected_index().saturating_sub(1)),
            ActivePane::Preview => self.preview_scroll = self.preview_scroll.saturating_sub(1),
        }
    }

    pub fn move_down(&mut self) {
        match self.active_pane {
            ActivePane::List => self.select(self.selected_index() + 1),
            ActivePane::Preview => self.preview_scroll = self.preview_scroll.saturating_add(1),
        }
    }

    pub fn next_page(&mut self) {
        match self.active_pane {
            ActivePane::List => self.select(self.selected_index() + PAGE_SIZE),
            ActivePane::Preview => {
                self.preview_scroll = self.preview_scroll.saturating_add(PAGE_SIZE as u16)
            }
        }
    }

    pub fn prev_page(&mut self) {
        match self.active_pane {
            ActivePane::List => self.select(self.selected_index().saturating_sub(PAGE_SIZE)),
            ActivePane::Preview => {
                self.preview_scroll = self.preview_scroll.saturating_sub(PAGE_SIZE as u16)
            }
        }
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
        self.active_pane = ActivePane::List;
        self.preview_scroll = 0;
        self.sync_selection();
    }

    pub fn focus_preview(&mut self) {
        if self.selected_article().is_some() {
            self.active_pane = ActivePane::Preview;
        }
    }

    pub fn focus_list(&mut self) {
        self.active_pane = ActivePane::List;
        self.maximized = false;
    }

    pub fn toggle_maximize(&mut self) {
        self.maximized = !self.maximized;
        self.active_pane = if self.maximized {
            ActivePane::Preview
        } else {
            ActivePane::List
        };
    }

    pub fn start_search(&mut self) {
        self.set_tab(Tab::Search);
        self.input_mode = InputMode::Search;
    }

    pub fn finish_search(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Leave search input, discarding the query
    pub fn cancel_search(&mut self) {
        self.input_mode = InputMode::Normal;
        self.search_query.clear();
        self.search = SearchUiState::Idle;
        self.sync_selection();
    }

    pub fn apply_news(&mut self, emission: Result<Vec<NewsSection>>) {
        self.news.on_emission(emission);
        self.sync_selection();
    }

    pub fn apply_bookmarks(&mut self, emission: Result<Vec<NewsSection>>) {
        self.bookmarks.on_emission(emission);
        self.sync_selection();
    }

    pub fn apply_search(&mut self, emission: Result<Vec<NewsSection>>) {
        self.search.on_emission(&self.search_query, emission);
        self.selection[Tab::Search.index()] = 0;
        self.sync_selection();
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }
}
