// Database layer — where accepted posts and scrape state are stored.
//
// Two backends sit behind the `Database` trait:
// - SQLite via rusqlite (default, `bundled` so no system SQLite needed)
// - Supabase via its PostgREST API, used when SUPABASE_URL and
//   SUPABASE_SERVICE_ROLE_KEY are both set

pub mod models;
pub mod supabase;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod queries;
#[cfg(feature = "sqlite")]
pub mod schema;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use traits::Database;

use anyhow::Result;
use std::sync::Arc;

/// Create (or open) the SQLite database and run migrations.
///
/// Called by `embedhelp init`; creates parent directories as needed.
#[cfg(feature = "sqlite")]
pub fn initialize_sqlite(db_path: &str) -> Result<Arc<dyn Database>> {
    use anyhow::Context;

    if let Some(parent) = std::path::Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory for database: {db_path}"))?;
        }
    }

    let conn = connect_sqlite(db_path)?;
    Ok(Arc::new(sqlite::SqliteDatabase::new(conn)))
}

/// Open an existing SQLite database (fails if `init` hasn't been run).
#[cfg(feature = "sqlite")]
pub fn open_sqlite(db_path: &str) -> Result<Arc<dyn Database>> {
    if !std::path::Path::new(db_path).exists() {
        anyhow::bail!("Database not found at {db_path}. Run `embedhelp init` first.");
    }
    let conn = connect_sqlite(db_path)?;
    Ok(Arc::new(sqlite::SqliteDatabase::new(conn)))
}

#[cfg(feature = "sqlite")]
fn connect_sqlite(db_path: &str) -> Result<rusqlite::Connection> {
    use anyhow::Context;

    let conn = rusqlite::Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {db_path}"))?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    // Idempotent; brings older files up to the current schema.
    schema::create_tables(&conn)?;
    Ok(conn)
}

/// Connect to a Supabase project's REST API.
pub fn connect_supabase(
    project_url: &str,
    service_role_key: &str,
    posts_table: &str,
) -> Result<Arc<dyn Database>> {
    let db = supabase::SupabaseDatabase::new(project_url, service_role_key, posts_table)?;
    Ok(Arc::new(db))
}
