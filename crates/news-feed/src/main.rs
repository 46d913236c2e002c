use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use shared::feed::FeedView;
use shared::{
    render, Config, FeedController, HttpNewsApi, LoadOutcome, PriorityFilter, SortKey,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const TEXT_WIDTH: usize = 100;

#[derive(Parser)]
#[command(name = "news-feed")]
#[command(about = "Show the RADAR news feed and keep it up to date")]
struct Args {
    /// Sort order (hotness, date_new, date_old, source)
    #[arg(short, long, default_value = "hotness")]
    sort: SortKey,

    /// Priority filter (all, high, medium, low)
    #[arg(short, long, default_value = "all")]
    priority: PriorityFilter,

    /// How many hours back to look (overrides RADAR_NEWS_HOURS)
    #[arg(long)]
    hours: Option<u32>,

    /// Maximum number of items (overrides RADAR_NEWS_LIMIT)
    #[arg(long)]
    limit: Option<u32>,

    /// Start a backend collection job first
    #[arg(long)]
    collect: bool,

    /// Ask the backend to refresh before listing
    #[arg(long)]
    refresh: bool,

    /// Keep polling and reprint the feed until Ctrl-C
    #[arg(short, long)]
    watch: bool,

    /// Save the dashboard as an HTML page (defaults to ~/Documents when no path is given)
    #[arg(short, long, num_args = 0..=1)]
    output: Option<Option<PathBuf>>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = Config::from_env()?;
    if let Some(hours) = args.hours {
        config.news_hours = hours;
    }
    if let Some(limit) = args.limit {
        config.news_limit = limit;
    }

    println!("📡 Connecting to {}", config.api_url);
    let api = HttpNewsApi::new(config.api_url.clone())?;
    let feed = FeedController::new(Arc::new(api), config);

    feed.select(args.sort, args.priority).await;

    println!("\n📰 Loading news...");
    report_load(feed.initialize().await);

    if args.collect {
        println!("\n🚀 Starting news collection...");
        if feed.collect_now().await {
            println!("✓ Collection started, the feed reloads once it completes");
        }
    }

    if args.refresh {
        println!("\n🔍 Refreshing news...");
        feed.refresh_news().await;
    }

    let view = feed.snapshot().await;
    print_view(&view);

    if let Some(path) = &args.output {
        save(&view, path.as_deref())?;
    }

    if !args.watch {
        feed.teardown().await;
        return Ok(());
    }

    println!("\n👀 Watching for updates (Ctrl-C to stop)...");
    let polling = feed.start_polling();
    let mut last_printed = view.news;
    let mut ticker = tokio::time::interval(Duration::from_secs(1));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {
                let view = feed.snapshot().await;
                if view.news != last_printed {
                    print_view(&view);
                    if let Some(path) = &args.output {
                        save(&view, path.as_deref())?;
                    }
                    last_printed = view.news;
                }
            }
        }
    }

    polling.stop();
    feed.teardown().await;
    println!("\n✅ Stopped watching.");

    Ok(())
}

fn report_load(outcome: LoadOutcome) {
    match outcome {
        LoadOutcome::Loaded(count) => println!("✓ Loaded {} news items", count),
        LoadOutcome::Empty => println!("No news yet."),
        LoadOutcome::Failed => println!("⚠ Could not load news"),
        LoadOutcome::Superseded => {}
    }
}

fn print_view(view: &FeedView) {
    let html = render::page(view, Utc::now());
    println!("\n{}", render::to_text(&html, TEXT_WIDTH));
}

/// Writes the dashboard page to `path`, or to ~/Documents when `None`.
fn save(view: &FeedView, path: Option<&Path>) -> Result<()> {
    let now = Utc::now();
    let html = render::page(view, now);
    let filepath = render::save_page(&html, path, now).context("Failed to save dashboard")?;
    println!("💾 Dashboard saved to: {}", filepath.display());
    Ok(())
}
