use std::env;

use anyhow::Result;

use crate::reddit::client::{DEFAULT_API_URL, DEFAULT_AUTH_URL};
use crate::reddit::RedditCredentials;

/// User-Agent sent to Reddit unless REDDIT_USER_AGENT overrides it.
pub const DEFAULT_USER_AGENT: &str = "script:embedded_helper_scraper:v1.0";

/// Communities scraped when EMBEDHELP_SUBREDDITS is unset.
pub const DEFAULT_SUBREDDITS: &[&str] = &["arduino", "esp32", "embedded", "stm32"];

pub const DEFAULT_DB_PATH: &str = "./embedhelp.db";
pub const DEFAULT_SUPABASE_TABLE: &str = "reddit_posts";

/// Where themed posts get written.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageBackend {
    Sqlite { path: String },
    Supabase { url: String, key: String, table: String },
}

/// Central configuration loaded from environment variables.
///
/// Secrets only ever come from the environment. A `.env` file is loaded at
/// startup via dotenvy.
#[derive(Debug, Clone)]
pub struct Config {
    pub reddit_client_id: String,
    pub reddit_client_secret: String,
    pub reddit_user_agent: String,
    /// OAuth API host (override for testing)
    pub reddit_api_url: String,
    /// Token endpoint host (override for testing)
    pub reddit_auth_url: String,
    pub subreddits: Vec<String>,
    pub db_path: String,
    pub supabase_url: Option<String>,
    pub supabase_service_role_key: Option<String>,
    pub supabase_table: String,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self> {
        Ok(Self::from_lookup(|key| env::var(key).ok()))
    }

    /// Build a config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let subreddits = get("EMBEDHELP_SUBREDDITS")
            .map(|raw| parse_subreddit_list(&raw))
            .filter(|list| !list.is_empty())
            .unwrap_or_else(|| DEFAULT_SUBREDDITS.iter().map(|s| s.to_string()).collect());

        Self {
            reddit_client_id: get("REDDIT_CLIENT_ID").unwrap_or_default(),
            reddit_client_secret: get("REDDIT_CLIENT_SECRET").unwrap_or_default(),
            reddit_user_agent: get("REDDIT_USER_AGENT")
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            reddit_api_url: get("REDDIT_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            reddit_auth_url: get("REDDIT_AUTH_URL")
                .unwrap_or_else(|| DEFAULT_AUTH_URL.to_string()),
            subreddits,
            db_path: get("EMBEDHELP_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
            supabase_url: get("SUPABASE_URL"),
            supabase_service_role_key: get("SUPABASE_SERVICE_ROLE_KEY"),
            supabase_table: get("SUPABASE_TABLE")
                .unwrap_or_else(|| DEFAULT_SUPABASE_TABLE.to_string()),
        }
    }

    /// Supabase when both its URL and key are set, otherwise SQLite.
    pub fn storage_backend(&self) -> StorageBackend {
        match (&self.supabase_url, &self.supabase_service_role_key) {
            (Some(url), Some(key)) => StorageBackend::Supabase {
                url: url.clone(),
                key: key.clone(),
                table: self.supabase_table.clone(),
            },
            _ => StorageBackend::Sqlite {
                path: self.db_path.clone(),
            },
        }
    }

    /// Check that Reddit app credentials are configured.
    /// Call this before any command that fetches from Reddit.
    pub fn require_reddit(&self) -> Result<()> {
        if self.reddit_client_id.is_empty() || self.reddit_client_secret.is_empty() {
            anyhow::bail!(
                "REDDIT_CLIENT_ID and REDDIT_CLIENT_SECRET must be set. Add them to your .env file.\n\
                 See .env.example for the required variables."
            );
        }
        Ok(())
    }

    /// Warn-worthy half-configured Supabase (one of URL/key missing).
    pub fn supabase_partially_configured(&self) -> bool {
        self.supabase_url.is_some() != self.supabase_service_role_key.is_some()
    }

    pub fn reddit_credentials(&self) -> RedditCredentials {
        RedditCredentials {
            client_id: self.reddit_client_id.clone(),
            client_secret: self.reddit_client_secret.clone(),
            user_agent: self.reddit_user_agent.clone(),
            api_url: self.reddit_api_url.clone(),
            auth_url: self.reddit_auth_url.clone(),
        }
    }
}

/// Split a comma/whitespace separated list, dropping blanks and `r/`
/// prefixes, keeping first-seen order without duplicates.
pub fn parse_subreddit_list(raw: &str) -> Vec<String> {
    let mut subs: Vec<String> = Vec::new();
    for part in raw.split(|c: char| c == ',' || c.is_whitespace()) {
        let name = crate::reddit::client::subreddit_name(part).to_lowercase();
        if !name.is_empty() && !subs.contains(&name) {
            subs.push(name);
        }
    }
    subs
}
