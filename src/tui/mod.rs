pub mod app;
pub mod event;
pub mod layout;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{KeyCode, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::app::{AppContext, Result};
use crate::config::Config;
use crate::repository::{NewsRepository, RefreshOutcome, Subscription};

use self::app::{InputMode, Tab, TuiApp};
use self::event::{Action, AppEvent, EventHandler};

type Tui = Terminal<CrosstermBackend<Stdout>>;

pub async fn run(ctx: Arc<AppContext>, dark_theme: bool) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, ctx, dark_theme).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Live subscriptions backing the three tabs
struct TabSubscriptions {
    news: Subscription,
    bookmarks: Subscription,
    search: Subscription,
}

impl TabSubscriptions {
    fn new(repository: &NewsRepository) -> Self {
        Self {
            news: repository.observe_news(),
            bookmarks: repository.observe_bookmarked_news(),
            search: repository.observe_search_results(""),
        }
    }

    /// Apply whatever changed since the last poll
    fn poll(&mut self, app: &mut TuiApp) {
        if self.news.has_changed() {
            app.apply_news(self.news.current());
        }
        if self.bookmarks.has_changed() {
            app.apply_bookmarks(self.bookmarks.current());
        }
        if self.search.has_changed() {
            app.apply_search(self.search.current());
        }
    }
}

type RefreshTask = JoinHandle<Result<RefreshOutcome>>;

fn start_refresh(app: &mut TuiApp, repository: &Arc<NewsRepository>) -> RefreshTask {
    if app.news.sections().is_empty() {
        app.news.on_refresh_started();
    }
    app.is_refreshing = true;
    app.clear_status();

    let repository = repository.clone();
    tokio::spawn(async move { repository.refresh_news().await })
}

async fn finish_refresh(app: &mut TuiApp, repository: &NewsRepository, task: RefreshTask) {
    app.is_refreshing = false;
    let result = match task.await {
        Ok(result) => result,
        Err(e) => {
            error!(error = %e, "Refresh task failed");
            app.set_status(format!("Refresh failed: {}", e));
            return;
        }
    };

    match result {
        Ok(RefreshOutcome::Updated { articles, .. }) => {
            app.set_status(format!("Refreshed: {} articles", articles));
        }
        Ok(RefreshOutcome::NotModified) => {
            app.set_status("Already up to date");
            if app.news.sections().is_empty() {
                app.apply_news(repository.cached_sections());
            }
        }
        Err(e) => {
            let cached = repository.cached_sections().unwrap_or_default();
            if !cached.is_empty() {
                app.set_status(format!("Refresh failed, showing cached news: {}", e));
            }
            app.news.on_refresh_failed(e.to_string(), cached);
            app.sync_selection();
        }
    }
}

async fn run_app(terminal: &mut Tui, ctx: Arc<AppContext>, dark_theme: bool) -> Result<()> {
    let config: Arc<Config> = ctx.config.clone();
    let repository = ctx.repository.clone();
    let mut tui_app = TuiApp::new(dark_theme);
    let event_handler = EventHandler::new(Duration::from_millis(100));

    let mut subscriptions = TabSubscriptions::new(&repository);
    subscriptions.poll(&mut tui_app);
    let mut refresh: Option<RefreshTask> = Some(start_refresh(&mut tui_app, &repository));

    loop {
        if let Some(task) = refresh.take_if(|t| t.is_finished()) {
            finish_refresh(&mut tui_app, &repository, task).await;
        }
        subscriptions.poll(&mut tui_app);

        terminal.draw(|frame| layout::render(frame, &mut tui_app, &config.colors))?;

        let key = match event_handler.next()? {
            AppEvent::Key(key) => key,
            AppEvent::Resize | AppEvent::Tick => continue,
        };

        if tui_app.pending_clear_bookmarks {
            tui_app.pending_clear_bookmarks = false;
            confirm_clear_bookmarks(&mut tui_app, &repository, key);
            continue;
        }

        if tui_app.input_mode == InputMode::Search {
            if edit_search(&mut tui_app, key) {
                subscriptions.search = repository.observe_search_results(&tui_app.search_query);
            }
            continue;
        }

        match config.keybindings.get_action(&key) {
            Action::Quit => tui_app.should_quit = true,
            Action::MoveUp => tui_app.move_up(),
            Action::MoveDown => tui_app.move_down(),
            Action::NextPage => tui_app.next_page(),
            Action::PrevPage => tui_app.prev_page(),
            Action::NextTab => tui_app.set_tab(tui_app.tab.next()),
            Action::PrevTab => tui_app.set_tab(tui_app.tab.prev()),
            Action::Select => tui_app.focus_preview(),
            Action::Back => tui_app.focus_list(),
            Action::ToggleMaximize => tui_app.toggle_maximize(),
            Action::Search => tui_app.start_search(),
            Action::ToggleBookmark => toggle_bookmark(&mut tui_app, &repository),
            Action::OpenInBrowser => open_selected(&mut tui_app),
            Action::Refresh => {
                if refresh.is_none() {
                    refresh = Some(start_refresh(&mut tui_app, &repository));
                }
            }
            Action::ClearBookmarks => match repository.bookmarked_count() {
                Ok(0) => tui_app.set_status("No bookmarks to clear"),
                Ok(_) => tui_app.pending_clear_bookmarks = true,
                Err(e) => tui_app.set_status(format!("Failed to read bookmarks: {}", e)),
            },
            Action::None => {}
        }

        if tui_app.should_quit {
            break;
        }
    }

    if let Some(task) = refresh {
        debug!("Abandoning refresh in flight");
        task.abort();
    }
    Ok(())
}

/// Returns whether the query changed
fn edit_search(app: &mut TuiApp, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => {
            app.cancel_search();
            true
        }
        KeyCode::Enter => {
            app.finish_search();
            false
        }
        KeyCode::Backspace => app.search_query.pop().is_some(),
        KeyCode::Char(c) => {
            app.search_query.push(c);
            true
        }
        _ => false,
    }
}

fn confirm_clear_bookmarks(app: &mut TuiApp, repository: &NewsRepository, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => match repository.clear_bookmarks() {
            Ok(cleared) => app.set_status(format!("Cleared {} bookmarks", cleared)),
            Err(e) => app.set_status(format!("Failed to clear bookmarks: {}", e)),
        },
        _ => app.set_status("Clear bookmarks cancelled"),
    }
}

fn toggle_bookmark(app: &mut TuiApp, repository: &NewsRepository) {
    let Some(article) = app.selected_article() else {
        return;
    };
    let (id, bookmarked) = (article.id.clone(), !article.is_bookmarked);

    match repository.toggle_bookmark(&id, bookmarked) {
        Ok(()) if bookmarked => app.set_status("Bookmarked"),
        Ok(()) => app.set_status("Removed bookmark"),
        Err(e) => app.set_status(format!("Failed to update bookmark: {}", e)),
    }
    if app.tab == Tab::Bookmarks {
        app.sync_selection();
    }
}

fn open_selected(app: &mut TuiApp) {
    let Some(url) = app.selected_article().map(|a| a.url.clone()) else {
        return;
    };
    if url.is_empty() {
        app.set_status("Article has no link");
    } else if let Err(e) = open::that(&url) {
        app.set_status(format!("Failed to open browser: {}", e));
    }
}
