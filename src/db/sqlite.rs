// SqliteDatabase — rusqlite backend implementing the Database trait.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is !Sync.
// Trait methods lock, do synchronous rusqlite work, and return; the guard is
// never held across an .await.

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::models::{ThemeCount, ThemedPost};
use super::traits::Database;
use crate::classify::Theme;

pub struct SqliteDatabase {
    conn: Mutex<Connection>,
}

impl SqliteDatabase {
    /// Wrap an already-opened connection whose tables exist.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }

    async fn get_scan_state(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().await;
        super::queries::get_scan_state(&conn, key)
    }

    async fn set_scan_state(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        super::queries::set_scan_state(&conn, key, value)
    }

    async fn get_all_scan_state(&self) -> Result<Vec<(String, String)>> {
        let conn = self.conn.lock().await;
        super::queries::get_all_scan_state(&conn)
    }

    async fn upsert_post(&self, post: &ThemedPost) -> Result<()> {
        let conn = self.conn.lock().await;
        super::queries::upsert_post(&conn, post)
    }

    async fn get_recent_posts(&self, theme: Option<Theme>, limit: u32) -> Result<Vec<ThemedPost>> {
        let conn = self.conn.lock().await;
        super::queries::get_recent_posts(&conn, theme, limit)
    }

    async fn theme_counts(&self) -> Result<Vec<ThemeCount>> {
        let conn = self.conn.lock().await;
        super::queries::theme_counts(&conn)
    }

    async fn post_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::queries::post_count(&conn)
    }
}
