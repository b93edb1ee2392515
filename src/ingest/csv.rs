// CSV loading — reads exported posts from a `subreddit,title,selftext,
// score,num_comments,url` file.
//
// Missing or empty text columns become "", missing or empty counts become 0.
// A row that still can't be turned into a Post is logged and skipped so one
// bad line doesn't throw away the whole export.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use crate::post::Post;

/// A row as it appears in the file, before numeric parsing.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CsvRow {
    subreddit: String,
    title: String,
    selftext: String,
    score: String,
    num_comments: String,
    url: String,
}

impl CsvRow {
    fn into_post(self) -> Result<Post> {
        Ok(Post {
            score: parse_count(&self.score).context("bad score")?,
            num_comments: parse_count(&self.num_comments).context("bad num_comments")?,
            subreddit: self.subreddit,
            title: self.title,
            selftext: self.selftext,
            url: self.url,
        })
    }
}

/// Load every readable post from a CSV file.
pub fn load_posts_from_csv(path: impl AsRef<Path>) -> Result<Vec<Post>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open CSV file {}", path.display()))?;
    let posts = read_posts(file)?;
    info!(count = posts.len(), path = %path.display(), "Loaded posts from CSV");
    Ok(posts)
}

/// Parse posts from any reader. The first row must be the header.
pub fn read_posts<R: Read>(reader: R) -> Result<Vec<Post>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    // Reading the header up front turns an unreadable file into an error
    // instead of an empty result.
    reader.headers().context("Failed to read CSV header")?;

    let mut posts = Vec::new();
    for (index, row) in reader.deserialize::<CsvRow>().enumerate() {
        // +2: one for the header, one because lines are 1-based
        let line = index + 2;
        match row.map_err(anyhow::Error::from).and_then(CsvRow::into_post) {
            Ok(post) => posts.push(post),
            Err(e) => warn!(line, error = %e, "Skipping malformed CSV row"),
        }
    }
    Ok(posts)
}

fn parse_count(raw: &str) -> Result<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse::<i64>()
        .with_context(|| format!("not an integer: {trimmed:?}"))
}
