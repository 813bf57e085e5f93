use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;

use crate::app::{AppContext, BriefError, Result};
use crate::cli::{SettingsAction, Theme};
use crate::domain::{article_count, NewsSection};
use crate::notify::{LogNotifier, Notifier};
use crate::preferences::{PreferenceStore, UserPreferences};
use crate::repository::RefreshOutcome;
use crate::sync::{self, DaemonConfig, SyncDaemon, SyncWorker};

pub async fn refresh(
    ctx: &AppContext,
    force: bool,
    prefs: &UserPreferences,
    notifier: &dyn Notifier,
) -> Result<()> {
    println!("Fetching {}...", ctx.repository.remote().page_url());

    if force {
        let sections = ctx.repository.force_refresh().await?;
        println!(
            "{} articles in {} sections",
            article_count(&sections),
            sections.len()
        );
    } else {
        match ctx.repository.refresh_news().await? {
            RefreshOutcome::Updated { sections, articles } => {
                println!("Updated: {} articles in {} sections", articles, sections);
            }
            RefreshOutcome::NotModified => println!("Page not modified since last sync"),
        }
    }

    if prefs.notifications {
        notifier.sync_complete();
    }
    Ok(())
}

pub fn list(ctx: &AppContext, bookmarks: bool, json: bool) -> Result<()> {
    let sections = if bookmarks {
        ctx.repository.bookmarked_sections()?
    } else {
        ctx.repository.cached_sections()?
    };

    if sections.is_empty() && !json {
        if bookmarks {
            println!("No bookmarks");
        } else {
            println!("No cached news. Run `brief refresh` first.");
        }
        return Ok(());
    }
    print_sections(&sections, json)
}

pub fn search(ctx: &AppContext, query: &str, json: bool) -> Result<()> {
    let sections = ctx.repository.search_articles(query)?;
    if sections.is_empty() && !json {
        println!("No articles match \"{}\"", query.trim());
        return Ok(());
    }
    print_sections(&sections, json)
}

fn print_sections(sections: &[NewsSection], json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(sections)
            .map_err(|e| BriefError::Other(format!("Failed to encode JSON: {}", e)))?;
        println!("{}", out);
    } else {
        print!("{}", format_sections(sections));
    }
    Ok(())
}

/// Plain-text listing: a header line per section, then one line per article
/// with its bookmark marker and short ID.
pub fn format_sections(sections: &[NewsSection]) -> String {
    let mut out = String::new();
    for (i, section) in sections.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "== {} ==", section.header);
        for article in &section.articles {
            let marker = if article.is_bookmarked { "★" } else { " " };
            let _ = writeln!(
                out,
                "{} {} {}",
                marker,
                article.short_id(),
                article.display_title()
            );
            if !article.url.is_empty() {
                let _ = writeln!(out, "           {}", article.url);
            }
        }
    }
    out
}

pub fn set_bookmark(ctx: &AppContext, id: &str, bookmarked: bool) -> Result<()> {
    let article = ctx.repository.find_article(id)?;
    ctx.repository.toggle_bookmark(&article.id, bookmarked)?;

    let verb = if bookmarked { "Bookmarked" } else { "Removed bookmark" };
    println!("{}: {}", verb, article.display_title());
    Ok(())
}

pub fn clear_bookmarks(ctx: &AppContext) -> Result<()> {
    let cleared = ctx.repository.clear_bookmarks()?;
    println!("Cleared {} bookmarks", cleared);
    Ok(())
}

pub fn status(ctx: &AppContext) -> Result<()> {
    let last_sync = ctx
        .repository
        .last_synced_at()?
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "never".to_string());

    println!("Cached articles:    {}", ctx.repository.cached_news_count());
    println!("Bookmarked:         {}", ctx.repository.bookmarked_count()?);
    println!("Last sync:          {}", last_sync);
    println!("Source:             {}", ctx.repository.remote().page_url());
    println!("{}", sync::daemon_status());
    Ok(())
}

pub fn clear_cache(ctx: &AppContext) {
    let count = ctx.repository.cached_news_count();
    ctx.repository.clear_cache();
    println!("Cleared {} cached articles", count);
}

pub fn prune(ctx: &AppContext, older_than: Option<&str>) -> Result<()> {
    let ttl = match older_than {
        Some(age) => {
            let secs = sync::parse_interval(age).map_err(BriefError::Config)?;
            chrono::Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX))
        }
        None => ctx.config.cache.ttl().ok_or_else(|| {
            BriefError::Config("Cache TTL is disabled; pass --older-than".into())
        })?,
    };

    let deleted = ctx.repository.prune_expired(ttl)?;
    println!("Pruned {} articles", deleted);
    Ok(())
}

pub struct DaemonOptions {
    pub interval: Option<String>,
    pub no_initial_sync: bool,
    pub log: Option<PathBuf>,
    pub notify_log: Option<PathBuf>,
}

pub async fn start_daemon(ctx: &AppContext, options: DaemonOptions) -> Result<()> {
    let interval_override = options
        .interval
        .as_deref()
        .map(sync::parse_sync_interval)
        .transpose()
        .map_err(BriefError::Config)?;

    let mut config = DaemonConfig::with_defaults()?;
    config.interval_override = interval_override;
    config.sync_on_start = !options.no_initial_sync;
    config.log_file = options.log;
    config.cache_ttl = ctx.config.cache.ttl();

    let notifier: Arc<dyn Notifier> = match options.notify_log {
        Some(path) => Arc::new(LogNotifier::with_file(path)),
        None => Arc::new(LogNotifier::new()),
    };
    let worker = SyncWorker::new(ctx.repository.clone(), notifier);

    SyncDaemon::new(worker, config).run().await
}

pub fn stop_daemon() -> Result<()> {
    let pid = sync::stop_daemon()?;
    println!("Daemon stopped (PID: {})", pid);
    Ok(())
}

/// Apply a `brief settings` action, then print the resulting preferences
pub fn settings(store: &mut PreferenceStore, action: SettingsAction) -> Result<()> {
    match action {
        SettingsAction::Show => {}
        SettingsAction::Theme { theme } => store.set_dark_theme(theme == Theme::Dark)?,
        SettingsAction::Sync { state } => store.set_background_sync(state.enabled())?,
        SettingsAction::Interval { hours } => store.set_sync_interval_hours(hours)?,
        SettingsAction::Notifications { state } => store.set_notifications(state.enabled())?,
        SettingsAction::Reset => store.reset()?,
    }
    show_settings(store);
    Ok(())
}

fn show_settings(store: &PreferenceStore) {
    let prefs = store.get();
    let on_off = |b: bool| if b { "on" } else { "off" };

    println!("Theme:              {}", if prefs.dark_theme { "dark" } else { "light" });
    println!("Background sync:    {}", on_off(prefs.background_sync));
    println!("Sync interval:      {}h", prefs.sync_interval_hours);
    println!("Notifications:      {}", on_off(prefs.notifications));
    println!("File:               {}", store.path().display());
}
