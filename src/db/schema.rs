// Database schema — table creation.
//
// A `schema_version` table records the schema version so a later change can
// be applied as a migration on top of version 1.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Create all tables if they don't exist yet. Safe to call on every startup.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Accepted posts, one row per permalink
        CREATE TABLE IF NOT EXISTS reddit_posts (
            url TEXT PRIMARY KEY,
            subreddit TEXT NOT NULL,
            title TEXT NOT NULL,
            selftext TEXT NOT NULL DEFAULT '',
            score INTEGER NOT NULL DEFAULT 0,
            num_comments INTEGER NOT NULL DEFAULT 0,
            theme TEXT NOT NULL,
            scraped_at TEXT NOT NULL DEFAULT (datetime('now')),
            -- NULL until the same url is upserted again
            updated_at TEXT
        );

        -- Last scrape time and per-subreddit watermarks
        CREATE TABLE IF NOT EXISTS scan_state (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_posts_theme
            ON reddit_posts(theme);

        CREATE INDEX IF NOT EXISTS idx_posts_scraped
            ON reddit_posts(scraped_at);
        ",
    )
    .context("Failed to create database tables")?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [1],
    )?;

    Ok(())
}

/// Count user tables (shown by `embedhelp init`).
pub fn table_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}
