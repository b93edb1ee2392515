// SupabaseDatabase — PostgREST backend implementing the Database trait.
//
// Talks to `{SUPABASE_URL}/rest/v1/` with the service-role key, which
// bypasses row-level security. Upserts use `on_conflict` plus
// `Prefer: resolution=merge-duplicates`, so re-sending a url updates the
// existing row instead of inserting a second one.
//
// Expected tables (see sql/supabase.sql):
//   reddit_posts(url text primary key, subreddit, title, selftext, score,
//                num_comments, theme, created_at timestamptz default now())
//   scan_state(key text primary key, value text)

use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE};
use reqwest::{RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::models::{ThemeCount, ThemedPost};
use super::traits::Database;
use crate::classify::Theme;

const SCAN_STATE_TABLE: &str = "scan_state";
const POST_COLUMNS: &str = "subreddit,title,selftext,score,num_comments,url,theme";

pub struct SupabaseDatabase {
    client: reqwest::Client,
    rest_url: String,
    posts_table: String,
}

impl SupabaseDatabase {
    /// Build a client for the project at `project_url`.
    pub fn new(project_url: &str, service_role_key: &str, posts_table: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(service_role_key).context("Invalid Supabase key")?,
        );
        let mut bearer = HeaderValue::from_str(&format!("Bearer {service_role_key}"))
            .context("Invalid Supabase key")?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            rest_url: rest_url(project_url),
            posts_table: posts_table.to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.rest_url, table)
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response> {
        let response = request
            .send()
            .await
            .with_context(|| format!("Supabase request failed: {what}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Supabase {what} returned {status}: {body}");
        }
        Ok(response)
    }

    async fn upsert<T: Serialize + Sync>(&self, table: &str, key: &str, row: &T) -> Result<()> {
        let request = self
            .client
            .post(self.table_url(table))
            .query(&[("on_conflict", key)])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[row]);
        self.send(request, &format!("upsert into {table}")).await?;
        Ok(())
    }
}

#[async_trait]
impl Database for SupabaseDatabase {
    async fn table_count(&self) -> Result<i64> {
        // Reading zero rows from each table confirms it exists and the key
        // can see it.
        for table in [self.posts_table.as_str(), SCAN_STATE_TABLE] {
            let request = self
                .client
                .get(self.table_url(table))
                .query(&[("select", "*"), ("limit", "0")]);
            self.send(request, &format!("probe {table}")).await?;
        }
        Ok(2)
    }

    async fn get_scan_state(&self, key: &str) -> Result<Option<String>> {
        let request = self
            .client
            .get(self.table_url(SCAN_STATE_TABLE))
            .query(&[("select", "key,value".to_string()), ("key", format!("eq.{key}"))]);
        let rows: Vec<ScanStateRow> = self
            .send(request, "read scan_state")
            .await?
            .json()
            .await
            .context("Failed to parse scan_state rows")?;
        Ok(rows.into_iter().next().map(|r| r.value))
    }

    async fn set_scan_state(&self, key: &str, value: &str) -> Result<()> {
        let row = ScanStateRow {
            key: key.to_string(),
            value: value.to_string(),
        };
        self.upsert(SCAN_STATE_TABLE, "key", &row).await
    }

    async fn get_all_scan_state(&self) -> Result<Vec<(String, String)>> {
        let request = self
            .client
            .get(self.table_url(SCAN_STATE_TABLE))
            .query(&[("select", "key,value"), ("order", "key.asc")]);
        let rows: Vec<ScanStateRow> = self
            .send(request, "read scan_state")
            .await?
            .json()
            .await
            .context("Failed to parse scan_state rows")?;
        Ok(rows.into_iter().map(|r| (r.key, r.value)).collect())
    }

    async fn upsert_post(&self, post: &ThemedPost) -> Result<()> {
        debug!(url = %post.post.url, "Upserting post to Supabase");
        self.upsert(&self.posts_table, "url", post).await
    }

    async fn get_recent_posts(&self, theme: Option<Theme>, limit: u32) -> Result<Vec<ThemedPost>> {
        let mut params = vec![
            ("select", POST_COLUMNS.to_string()),
            ("order", "created_at.desc".to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(theme) = theme {
            params.push(("theme", format!("eq.{}", theme.as_str())));
        }
        let request = self
            .client
            .get(self.table_url(&self.posts_table))
            .query(&params);

        // Deserialize loosely so one row with an unexpected theme label
        // doesn't hide the rest.
        let rows: Vec<serde_json::Value> = self
            .send(request, "read posts")
            .await?
            .json()
            .await
            .context("Failed to parse post rows")?;

        let mut posts = Vec::with_capacity(rows.len());
        for row in rows {
            match serde_json::from_value::<ThemedPost>(row) {
                Ok(post) => posts.push(post),
                Err(e) => warn!(error = %e, "Skipping unreadable Supabase row"),
            }
        }
        Ok(posts)
    }

    async fn theme_counts(&self) -> Result<Vec<ThemeCount>> {
        let request = self
            .client
            .get(self.table_url(&self.posts_table))
            .query(&[("select", "theme")]);
        let rows: Vec<ThemeRow> = self
            .send(request, "read themes")
            .await?
            .json()
            .await
            .context("Failed to parse theme rows")?;

        let mut counts: HashMap<Theme, i64> = HashMap::new();
        for row in rows {
            match row.theme.parse::<Theme>() {
                Ok(theme) => *counts.entry(theme).or_insert(0) += 1,
                Err(e) => warn!(error = %e, "Ignoring unknown theme in counts"),
            }
        }
        Ok(ThemeCount::tally(&counts))
    }

    async fn post_count(&self) -> Result<i64> {
        let request = self
            .client
            .get(self.table_url(&self.posts_table))
            .query(&[("select", "url")])
            .header("Prefer", "count=exact")
            .header("Range", "0-0");
        let response = self.send(request, "count posts").await?;
        let header = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .context("Supabase count response had no Content-Range header")?;
        parse_content_range_total(header)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ScanStateRow {
    key: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct ThemeRow {
    theme: String,
}

/// `https://abc.supabase.co/` → `https://abc.supabase.co/rest/v1`
pub fn rest_url(project_url: &str) -> String {
    format!("{}/rest/v1", project_url.trim_end_matches('/'))
}

/// Total from a PostgREST `Content-Range` header such as `0-0/42` or `*/0`.
pub fn parse_content_range_total(header: &str) -> Result<i64> {
    let total = header
        .rsplit_once('/')
        .map(|(_, total)| total)
        .context("Content-Range header has no total")?;
    total
        .trim()
        .parse()
        .with_context(|| format!("Content-Range total is not a number: {header}"))
}
