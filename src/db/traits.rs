// Database trait — backend-agnostic async interface for persistence.
//
// Implementors: SqliteDatabase (wraps rusqlite), SupabaseDatabase (PostgREST
// over reqwest). Callers hold an `Arc<dyn Database>` built once in main.

use anyhow::Result;
use async_trait::async_trait;

use super::models::{ThemeCount, ThemedPost};
use crate::classify::Theme;

#[async_trait]
pub trait Database: Send + Sync {
    // --- Lifecycle ---

    /// Number of tables this backend can see (confirmation for `init`).
    async fn table_count(&self) -> Result<i64>;

    // --- Scan state ---

    /// Get a scan state value by key (e.g. "newest_created:arduino").
    async fn get_scan_state(&self, key: &str) -> Result<Option<String>>;

    /// Set a scan state value (upsert).
    async fn set_scan_state(&self, key: &str, value: &str) -> Result<()>;

    /// Every scan state entry, ordered by key.
    async fn get_all_scan_state(&self) -> Result<Vec<(String, String)>>;

    // --- Posts ---

    /// Idempotent upsert keyed by the post url.
    async fn upsert_post(&self, post: &ThemedPost) -> Result<()>;

    /// Newest stored posts first, optionally filtered to one theme.
    async fn get_recent_posts(&self, theme: Option<Theme>, limit: u32) -> Result<Vec<ThemedPost>>;

    /// Stored posts per theme, one entry per theme in decision-list order.
    async fn theme_counts(&self) -> Result<Vec<ThemeCount>>;

    /// Total stored posts.
    async fn post_count(&self) -> Result<i64>;
}
