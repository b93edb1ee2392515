// Serde types for Reddit listing responses and their conversion to Posts.

use serde::Deserialize;

use crate::post::Post;

/// Base for building post URLs from permalinks.
pub const PERMALINK_BASE: &str = "https://reddit.com";

/// `{"kind": "Listing", "data": {...}}`
#[derive(Debug, Clone, Deserialize)]
pub struct Listing<T> {
    pub kind: String,
    pub data: ListingData<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingData<T> {
    pub children: Vec<ListingChild<T>>,
    pub after: Option<String>,
    #[serde(default)]
    pub dist: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingChild<T> {
    pub kind: String,
    pub data: T,
}

/// The fields of a `t3` (link/submission) object that we use.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionData {
    pub id: String,
    pub subreddit: String,
    pub title: String,
    /// Absent or null on some link posts.
    #[serde(default)]
    pub selftext: Option<String>,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub num_comments: i64,
    pub permalink: String,
    /// Seconds since the epoch. Reddit sends it as a float.
    pub created_utc: f64,
}

/// A fetched submission: the Post plus the creation time the scrape
/// watermark is based on.
#[derive(Debug, Clone)]
pub struct RedditSubmission {
    pub post: Post,
    pub created_utc: i64,
}

impl SubmissionData {
    /// Convert to a submission, labelling it with the subreddit it was
    /// requested from rather than Reddit's display casing.
    pub fn into_submission(self, requested_subreddit: &str) -> RedditSubmission {
        RedditSubmission {
            post: Post {
                subreddit: requested_subreddit.to_string(),
                url: permalink_url(&self.permalink),
                title: self.title,
                selftext: self.selftext.unwrap_or_default(),
                score: self.score,
                num_comments: self.num_comments,
            },
            created_utc: self.created_utc as i64,
        }
    }
}

/// `/r/x/comments/abc/title/` → `https://reddit.com/r/x/comments/abc/title/`
pub fn permalink_url(permalink: &str) -> String {
    format!("{PERMALINK_BASE}{permalink}")
}

/// Pull the submissions out of a listing, skipping anything that isn't a
/// link (`t3`).
pub fn submissions(listing: Listing<SubmissionData>, subreddit: &str) -> Vec<RedditSubmission> {
    listing
        .data
        .children
        .into_iter()
        .filter(|child| child.kind == "t3")
        .map(|child| child.data.into_submission(subreddit))
        .collect()
}
