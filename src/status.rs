// System status display — shows storage backend, stored posts, scrape state.

use anyhow::Result;
use std::sync::Arc;

use colored::Colorize;

use crate::db::Database;
use crate::output::terminal;
use crate::pipeline::scrape::{LAST_SCRAPE_KEY, WATERMARK_PREFIX};

/// Display system status to the terminal.
///
/// `backend_label` describes where data lives (a file path or Supabase URL).
pub async fn show(db: &Arc<dyn Database>, backend_label: &str) -> Result<()> {
    println!("Storage: {backend_label}");
    println!("Tables: {}", db.table_count().await?);

    let total = db.post_count().await?;
    println!("Stored help posts: {}", total.to_string().bold());
    if total > 0 {
        terminal::display_theme_counts(&db.theme_counts().await?);
    }

    match db.get_scan_state(LAST_SCRAPE_KEY).await? {
        Some(last) => println!("Last scrape: {last} UTC"),
        None => {
            println!("Last scrape: never");
            println!("  Run `embedhelp scrape` to fetch posts");
        }
    }

    let watermarks: Vec<(String, String)> = db
        .get_all_scan_state()
        .await?
        .into_iter()
        .filter_map(|(key, value)| {
            key.strip_prefix(WATERMARK_PREFIX)
                .map(|sub| (sub.to_string(), value))
        })
        .collect();
    if !watermarks.is_empty() {
        println!("Newest post seen:");
        for (subreddit, value) in &watermarks {
            println!("  r/{:<16} {}", subreddit, format_watermark(value));
        }
    }

    Ok(())
}

/// Render a created_utc watermark as a UTC timestamp, or echo it back if
/// it isn't one.
pub fn format_watermark(value: &str) -> String {
    value
        .parse::<i64>()
        .ok()
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| value.to_string())
}
