use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Tabs, Wrap},
    Frame,
};
use scraper::Html;

use crate::config::ColorConfig;
use crate::tui::app::{ActivePane, InputMode, Tab, TuiApp};
use crate::view::{BookmarksUiState, NewsUiState, SearchUiState};

pub fn render(frame: &mut Frame, app: &mut TuiApp, colors: &ColorConfig) {
    let base = Style::default()
        .bg(colors.background(app.dark_theme))
        .fg(colors.text(app.dark_theme));
    frame.render_widget(Block::default().style(base), frame.area());

    if app.maximized {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(1)])
            .split(frame.area());

        render_preview_pane(frame, app, chunks[0], colors);
        render_status_bar(frame, app, chunks[1], colors);
        return;
    }

    let search_height = if app.tab == Tab::Search { 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),             // Tabs
            Constraint::Length(search_height), // Search input
            Constraint::Percentage(45),        // Article list
            Constraint::Min(5),                // Preview
            Constraint::Length(1),             // Status bar
        ])
        .split(frame.area());

    render_tabs(frame, app, chunks[0], colors);
    if app.tab == Tab::Search {
        render_search_input(frame, app, chunks[1], colors);
    }
    render_list_pane(frame, app, chunks[2], colors);
    render_preview_pane(frame, app, chunks[3], colors);
    render_status_bar(frame, app, chunks[4], colors);
}

fn render_tabs(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let titles: Vec<Line> = Tab::ALL.iter().map(|t| Line::from(t.title())).collect();

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .title(" Brief · Wikipedia Current Events ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors.inactive_border)),
        )
        .select(app.tab.index())
        .highlight_style(
            Style::default()
                .fg(colors.active_tab)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        );

    frame.render_widget(tabs, area);
}

fn render_search_input(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let editing = app.input_mode == InputMode::Search;
    let border = if editing {
        colors.active_border
    } else {
        colors.inactive_border
    };

    let input = Paragraph::new(app.search_query.as_str()).block(
        Block::default()
            .title(" Search ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    frame.render_widget(input, area);

    if editing {
        let x = area.x + 1 + app.search_query.chars().count() as u16;
        frame.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

/// Message shown in place of the list when there is nothing to select
fn placeholder(app: &TuiApp) -> Option<String> {
    match app.tab {
        Tab::News => match &app.news {
            NewsUiState::Loading => Some("Loading current events...".into()),
            NewsUiState::Empty => Some("No news cached. Press R to refresh.".into()),
            NewsUiState::Error { message, can_retry } => Some(if *can_retry {
                format!("{}\n\nPress R to retry.", message)
            } else {
                message.clone()
            }),
            NewsUiState::Success(_) => None,
        },
        Tab::Bookmarks => match &app.bookmarks {
            BookmarksUiState::Loading => Some("Loading bookmarks...".into()),
            BookmarksUiState::Empty => Some("No bookmarks yet. Press b on an article.".into()),
            BookmarksUiState::Error { message } => Some(message.clone()),
            BookmarksUiState::Success(_) => None,
        },
        Tab::Search => match &app.search {
            SearchUiState::Idle => Some("Press / and type to search cached articles.".into()),
            SearchUiState::NoResults => Some(format!("No results for \"{}\"", app.search_query)),
            SearchUiState::Error { message } => Some(message.clone()),
            SearchUiState::Results(_) => None,
        },
    }
}

fn render_list_pane(frame: &mut Frame, app: &mut TuiApp, area: Rect, colors: &ColorConfig) {
    let is_active = app.active_pane == ActivePane::List;
    let border_style = if is_active {
        Style::default().fg(colors.active_border)
    } else {
        Style::default().fg(colors.inactive_border)
    };

    let count = app.article_count();
    let title = format!(
        " {} ({}) [{}/{}] ",
        app.tab.title(),
        count,
        if count == 0 { 0 } else { app.selected_index() + 1 },
        count
    );
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    if let Some(message) = placeholder(app) {
        let paragraph = Paragraph::new(message)
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let mut rows = Vec::new();
    for section in app.sections() {
        rows.push(ListItem::new(Line::from(Span::styled(
            section.header.clone(),
            Style::default()
                .fg(colors.section_header)
                .add_modifier(Modifier::BOLD),
        ))));
        for article in &section.articles {
            let marker = if article.is_bookmarked {
                Span::styled("★ ", Style::default().fg(colors.bookmark))
            } else {
                Span::raw("  ")
            };
            rows.push(ListItem::new(Line::from(vec![
                marker,
                Span::raw(article.display_title().to_string()),
            ])));
        }
    }

    let highlight_style = if is_active {
        Style::default()
            .bg(colors.selection_bg)
            .fg(colors.selection_fg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::REVERSED)
    };

    let list = List::new(rows)
        .block(block)
        .highlight_style(highlight_style)
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_preview_pane(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let is_active = app.active_pane == ActivePane::Preview;
    let border_style = if is_active {
        Style::default().fg(colors.active_border)
    } else {
        Style::default().fg(colors.inactive_border)
    };

    let (title, content) = match app.selected_article() {
        Some(article) => {
            let mut lines = vec![
                Line::from(Span::styled(
                    article.section_header.clone(),
                    Style::default().fg(colors.section_header),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    article.display_title().to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
            ];
            if article.is_bookmarked {
                lines.push(Line::from(Span::styled(
                    "★ Bookmarked",
                    Style::default().fg(colors.bookmark),
                )));
            }
            if !article.url.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("Link: {}", article.url),
                    Style::default().fg(colors.link),
                )));
            }
            lines.push(Line::from(format!(
                "Fetched: {}",
                article.timestamp.format("%Y-%m-%d %H:%M UTC")
            )));
            lines.push(Line::from(
                "─".repeat(area.width.saturating_sub(2) as usize),
            ));
            lines.push(Line::from(strip_html(&article.html_content)));

            (format!(" {} ", article.short_id()), Text::from(lines))
        }
        None => (" Preview ".to_string(), Text::from("No article selected")),
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.preview_scroll, 0));

    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let status = if app.pending_clear_bookmarks {
        "Clear all bookmarks? (y/n)".to_string()
    } else if app.input_mode == InputMode::Search {
        "Type to search  Enter:Done  Esc:Cancel".to_string()
    } else if app.is_refreshing {
        "Refreshing current events...".to_string()
    } else if let Some(ref msg) = app.status_message {
        msg.clone()
    } else if app.maximized {
        "j/k:Scroll  n/p:Page  m:Exit maximize  q:Quit".to_string()
    } else {
        "j/k:Nav  Tab:Switch tab  Enter:Read  b:Bookmark  o:Open  /:Search  R:Refresh  X:Clear bookmarks  m:Max  q:Quit"
            .to_string()
    };

    let paragraph =
        Paragraph::new(status).style(Style::default().fg(colors.status_fg).bg(colors.status_bg));

    frame.render_widget(paragraph, area);
}

/// Text content of an HTML fragment with whitespace collapsed
pub fn strip_html(html: &str) -> String {
    Html::parse_fragment(html)
        .root_element()
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
