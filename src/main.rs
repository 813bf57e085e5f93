use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use brief::app::AppContext;
use brief::cli::{commands, Cli, Commands, DaemonAction};
use brief::config::Config;
use brief::notify::LogNotifier;
use brief::preferences::PreferenceStore;
use brief::sync;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    // Commands that touch neither the cache nor the config
    match cli.command {
        Commands::Settings { action } => {
            let mut prefs = PreferenceStore::open_default()?;
            commands::settings(&mut prefs, action)?;
            return Ok(());
        }
        Commands::Daemon {
            action: DaemonAction::Stop,
        } => {
            commands::stop_daemon()?;
            return Ok(());
        }
        Commands::Daemon {
            action: DaemonAction::Status,
        } => {
            println!("{}", sync::daemon_status());
            return Ok(());
        }
        _ => {}
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let ctx = AppContext::new(cli.db, config)?;

    match cli.command {
        Commands::Refresh { force } => {
            let prefs = PreferenceStore::open_default()?;
            commands::refresh(&ctx, force, prefs.get(), &LogNotifier::new()).await?;
        }
        Commands::List { bookmarks, json } => commands::list(&ctx, bookmarks, json)?,
        Commands::Search { query, json } => commands::search(&ctx, &query, json)?,
        Commands::Bookmark { id } => commands::set_bookmark(&ctx, &id, true)?,
        Commands::Unbookmark { id } => commands::set_bookmark(&ctx, &id, false)?,
        Commands::ClearBookmarks => commands::clear_bookmarks(&ctx)?,
        Commands::Status => commands::status(&ctx)?,
        Commands::ClearCache => commands::clear_cache(&ctx),
        Commands::Prune { older_than } => commands::prune(&ctx, older_than.as_deref())?,
        Commands::Tui => {
            let dark_theme = PreferenceStore::open_default()?.get().dark_theme;
            brief::tui::run(Arc::new(ctx), dark_theme).await?;
        }
        Commands::Daemon {
            action:
                DaemonAction::Start {
                    interval,
                    no_initial_sync,
                    log,
                    notify_log,
                },
        } => {
            let options = commands::DaemonOptions {
                interval,
                no_initial_sync,
                log,
                notify_log,
            };
            commands::start_daemon(&ctx, options).await?;
        }
        // Handled before the context was built
        Commands::Settings { .. } | Commands::Daemon { .. } => {}
    }

    Ok(())
}
