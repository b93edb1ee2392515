// Database queries — every SQL statement against the SQLite backend.
//
// Keeps SQL in one place; SqliteDatabase wraps these behind the async trait.

use std::collections::HashMap;

use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;

use super::models::{ThemeCount, ThemedPost};
use crate::classify::Theme;
use crate::post::Post;

// --- Scan state ---

/// Get a scan state value by key (e.g. "last_scrape_at").
pub fn get_scan_state(conn: &Connection, key: &str) -> Result<Option<String>> {
    let mut stmt = conn.prepare("SELECT value FROM scan_state WHERE key = ?1")?;
    let result = stmt.query_row(params![key], |row| row.get(0)).optional()?;
    Ok(result)
}

/// Set a scan state value (upsert).
pub fn set_scan_state(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO scan_state (key, value, updated_at)
         VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
        params![key, value],
    )?;
    Ok(())
}

/// All scan state entries, ordered by key.
pub fn get_all_scan_state(conn: &Connection) -> Result<Vec<(String, String)>> {
    let mut stmt = conn.prepare("SELECT key, value FROM scan_state ORDER BY key")?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;

    let mut entries = Vec::new();
    for row in rows {
        entries.push(row?);
    }
    Ok(entries)
}

// --- Posts ---

/// Insert or update a themed post, keyed by url.
///
/// Re-upserting the same url overwrites the content columns but keeps the
/// original `scraped_at`.
pub fn upsert_post(conn: &Connection, themed: &ThemedPost) -> Result<()> {
    let post = &themed.post;
    conn.execute(
        "INSERT INTO reddit_posts (url, subreddit, title, selftext, score, num_comments, theme)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(url) DO UPDATE SET
            subreddit = ?2,
            title = ?3,
            selftext = ?4,
            score = ?5,
            num_comments = ?6,
            theme = ?7,
            updated_at = datetime('now')",
        params![
            post.url,
            post.subreddit,
            post.title,
            post.selftext,
            post.score,
            post.num_comments,
            themed.theme.as_str(),
        ],
    )?;
    Ok(())
}

/// Most recently stored posts, optionally restricted to one theme.
pub fn get_recent_posts(
    conn: &Connection,
    theme: Option<Theme>,
    limit: u32,
) -> Result<Vec<ThemedPost>> {
    let mut stmt = conn.prepare(
        "SELECT subreddit, title, selftext, score, num_comments, url, theme
         FROM reddit_posts
         WHERE ?1 IS NULL OR theme = ?1
         ORDER BY scraped_at DESC, rowid DESC
         LIMIT ?2",
    )?;

    let rows = stmt.query_map(params![theme.map(|t| t.as_str()), limit], |row| {
        let label: String = row.get(6)?;
        Ok((
            Post {
                subreddit: row.get(0)?,
                title: row.get(1)?,
                selftext: row.get(2)?,
                score: row.get(3)?,
                num_comments: row.get(4)?,
                url: row.get(5)?,
            },
            label,
        ))
    })?;

    let mut posts = Vec::new();
    for row in rows {
        let (post, label) = row?;
        match label.parse::<Theme>() {
            Ok(theme) => posts.push(ThemedPost::new(post, theme)),
            Err(e) => warn!(url = %post.url, error = %e, "Skipping row with unknown theme"),
        }
    }
    Ok(posts)
}

/// Stored post count per theme, zeros included.
pub fn theme_counts(conn: &Connection) -> Result<Vec<ThemeCount>> {
    let mut stmt = conn.prepare("SELECT theme, COUNT(*) FROM reddit_posts GROUP BY theme")?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;

    let mut counts = HashMap::new();
    for row in rows {
        let (label, count) = row?;
        match label.parse::<Theme>() {
            Ok(theme) => *counts.entry(theme).or_insert(0) += count,
            Err(e) => warn!(label = %label, error = %e, "Ignoring unknown theme in counts"),
        }
    }
    Ok(ThemeCount::tally(&counts))
}

/// Total stored posts.
pub fn post_count(conn: &Connection) -> Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM reddit_posts", [], |row| row.get(0))?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::create_tables;

    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        conn
    }

    fn themed(url: &str, title: &str, theme: Theme) -> ThemedPost {
        ThemedPost::new(
            Post {
                subreddit: "arduino".to_string(),
                title: title.to_string(),
                selftext: String::new(),
                score: 1,
                num_comments: 0,
                url: url.to_string(),
            },
            theme,
        )
    }

    #[test]
    fn test_scan_state_roundtrip() {
        let conn = test_db();
        assert_eq!(get_scan_state(&conn, "last_scrape_at").unwrap(), None);

        set_scan_state(&conn, "last_scrape_at", "2026-10-01").unwrap();
        set_scan_state(&conn, "last_scrape_at", "2026-10-02").unwrap();
        assert_eq!(
            get_scan_state(&conn, "last_scrape_at").unwrap(),
            Some("2026-10-02".to_string())
        );
    }

    #[test]
    fn test_all_scan_state_sorted() {
        let conn = test_db();
        set_scan_state(&conn, "newest_created:stm32", "2").unwrap();
        set_scan_state(&conn, "newest_created:arduino", "1").unwrap();
        let all = get_all_scan_state(&conn).unwrap();
        assert_eq!(all[0].0, "newest_created:arduino");
        assert_eq!(all[1].0, "newest_created:stm32");
    }

    #[test]
    fn test_upsert_same_url_does_not_duplicate() {
        let conn = test_db();
        upsert_post(&conn, &themed("https://r/1", "first", Theme::Communication)).unwrap();
        upsert_post(&conn, &themed("https://r/1", "edited", Theme::WiringAndPower)).unwrap();

        assert_eq!(post_count(&conn).unwrap(), 1);
        let posts = get_recent_posts(&conn, None, 10).unwrap();
        assert_eq!(posts[0].post.title, "edited");
        assert_eq!(posts[0].theme, Theme::WiringAndPower);
    }

    #[test]
    fn test_updated_at_set_only_on_re_upsert() {
        let conn = test_db();
        let updated_at = |conn: &Connection| -> Option<String> {
            conn.query_row("SELECT updated_at FROM reddit_posts", [], |row| row.get(0))
                .unwrap()
        };

        upsert_post(&conn, &themed("https://r/1", "first", Theme::Communication)).unwrap();
        assert_eq!(updated_at(&conn), None);

        upsert_post(&conn, &themed("https://r/1", "first", Theme::Communication)).unwrap();
        assert!(updated_at(&conn).is_some());
    }

    #[test]
    fn test_recent_posts_newest_first_and_filtered() {
        let conn = test_db();
        upsert_post(&conn, &themed("https://r/1", "a", Theme::Communication)).unwrap();
        upsert_post(&conn, &themed("https://r/2", "b", Theme::BuildCompileErrors)).unwrap();
        upsert_post(&conn, &themed("https://r/3", "c", Theme::Communication)).unwrap();

        let all = get_recent_posts(&conn, None, 10).unwrap();
        let titles: Vec<&str> = all.iter().map(|p| p.post.title.as_str()).collect();
        assert_eq!(titles, vec!["c", "b", "a"]);

        let comms = get_recent_posts(&conn, Some(Theme::Communication), 10).unwrap();
        assert_eq!(comms.len(), 2);

        let limited = get_recent_posts(&conn, None, 1).unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn test_theme_counts() {
        let conn = test_db();
        upsert_post(&conn, &themed("https://r/1", "a", Theme::Communication)).unwrap();
        upsert_post(&conn, &themed("https://r/2", "b", Theme::Communication)).unwrap();
        upsert_post(&conn, &themed("https://r/3", "c", Theme::GeneralBeginnerHelp)).unwrap();

        let counts = theme_counts(&conn).unwrap();
        assert_eq!(counts.len(), 5);
        let comm = counts
            .iter()
            .find(|c| c.theme == Theme::Communication)
            .unwrap();
        assert_eq!(comm.count, 2);
        let power = counts
            .iter()
            .find(|c| c.theme == Theme::WiringAndPower)
            .unwrap();
        assert_eq!(power.count, 0);
    }

    #[test]
    fn test_theme_stored_as_label() {
        let conn = test_db();
        upsert_post(&conn, &themed("https://r/1", "a", Theme::AnalogAndSensors)).unwrap();
        let label: String = conn
            .query_row("SELECT theme FROM reddit_posts", [], |row| row.get(0))
            .unwrap();
        assert_eq!(label, "Analog & Sensors");
    }
}
