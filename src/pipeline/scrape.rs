// Scrape pipeline: fetch new posts, classify, persist accepted ones.
//
// Subreddits are fetched concurrently (bounded by `concurrency`, paced by
// the client's rate limiter). Classification is pure and database writes
// happen sequentially afterwards, so one bad subreddit or one failed write
// never aborts the run.
//
// Each subreddit keeps a `newest_created:<sub>` watermark in scan_state:
// the newest created_utc seen on the last run. Posts older than it are
// skipped unless `all` is set. Posts at exactly the watermark are kept,
// since a re-upsert is harmless and a same-second post would otherwise be
// lost. When an upsert fails, the watermark stops at that post's
// created_utc so the next run picks it up again.

use anyhow::Result;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::classify::{Classifier, Decision};
use crate::db::models::ThemedPost;
use crate::db::Database;
use crate::output::terminal;
use crate::pipeline::batch::RejectionTally;
use crate::reddit::{RedditClient, RedditSubmission};

/// scan_state key holding the time of the last completed scrape.
pub const LAST_SCRAPE_KEY: &str = "last_scrape_at";

/// Prefix of the per-subreddit watermark keys.
pub const WATERMARK_PREFIX: &str = "newest_created:";

#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    /// Posts requested per subreddit.
    pub limit: u32,
    /// Subreddits fetched at once.
    pub concurrency: usize,
    /// Ignore watermarks and process everything returned.
    pub all: bool,
    /// Classify and print, but write nothing.
    pub dry_run: bool,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            limit: 50,
            concurrency: 4,
            all: false,
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeSummary {
    pub fetched: usize,
    /// Posts newer than their subreddit's watermark.
    pub fresh: usize,
    pub accepted: usize,
    pub saved: usize,
    pub rejected: RejectionTally,
    pub failed_subreddits: Vec<String>,
}

pub fn watermark_key(subreddit: &str) -> String {
    format!("{WATERMARK_PREFIX}{subreddit}")
}

/// Keep submissions at or after `watermark` and return the newest
/// created_utc among everything fetched.
pub fn fresh_submissions(
    submissions: Vec<RedditSubmission>,
    watermark: Option<i64>,
) -> (Vec<RedditSubmission>, Option<i64>) {
    let newest = submissions.iter().map(|s| s.created_utc).max();
    let fresh = match watermark {
        Some(mark) => submissions
            .into_iter()
            .filter(|s| s.created_utc >= mark)
            .collect(),
        None => submissions,
    };
    (fresh, newest)
}

/// Watermark to store after processing a subreddit, or None to leave the
/// current one alone.
///
/// Never moves backwards, and never past the oldest post whose write failed.
pub fn next_watermark(
    current: Option<i64>,
    newest: Option<i64>,
    oldest_failed: Option<i64>,
) -> Option<i64> {
    let candidate = match (newest, oldest_failed) {
        (Some(newest), Some(failed)) => Some(newest.min(failed)),
        (newest, None) => newest,
        (None, failed) => failed,
    };
    candidate.filter(|c| current.map_or(true, |w| *c > w))
}

/// Run one scrape over `subreddits`.
pub async fn run(
    reddit: &RedditClient,
    classifier: &Classifier,
    db: &dyn Database,
    subreddits: &[String],
    options: &ScrapeOptions,
) -> Result<ScrapeSummary> {
    let mut summary = ScrapeSummary::default();
    let mut any_fetched = false;

    println!(
        "Fetching r/{} ({} posts each, {} concurrent)...",
        subreddits.join(", r/"),
        options.limit,
        options.concurrency.max(1),
    );

    let pb = ProgressBar::new(subreddits.len() as u64);
    pb.set_style(ProgressStyle::default_bar().template("  Fetching [{bar:30}] {pos}/{len} {msg}")?);

    let mut fetched: Vec<(String, Result<Vec<RedditSubmission>>)> =
        stream::iter(subreddits.iter().map(|sub| {
            let pb = pb.clone();
            async move {
                let result = reddit.fetch_new(sub, options.limit).await;
                pb.set_message(format!("r/{sub}"));
                pb.inc(1);
                (sub.clone(), result)
            }
        }))
        .buffer_unordered(options.concurrency.max(1))
        .collect()
        .await;
    pb.finish_and_clear();

    // Results arrive in completion order; report in the order asked for.
    fetched.sort_by_key(|(sub, _)| subreddits.iter().position(|s| s == sub));

    for (subreddit, result) in fetched {
        let submissions = match result {
            Ok(submissions) => submissions,
            Err(e) => {
                warn!(subreddit = %subreddit, error = %e, "Failed to fetch subreddit, skipping");
                summary.failed_subreddits.push(subreddit);
                continue;
            }
        };
        summary.fetched += submissions.len();
        any_fetched = true;

        let key = watermark_key(&subreddit);
        let watermark = if options.all {
            None
        } else {
            read_watermark(db, &key).await
        };
        let (fresh, newest) = fresh_submissions(submissions, watermark);
        debug!(subreddit = %subreddit, fresh = fresh.len(), ?watermark, "Filtered by watermark");
        summary.fresh += fresh.len();

        let mut oldest_failed: Option<i64> = None;
        for submission in fresh {
            let created_utc = submission.created_utc;
            let post = submission.post;
            let theme = match classifier.evaluate(&post) {
                Decision::Accepted { theme, .. } => theme,
                Decision::Rejected(reason) => {
                    summary.rejected.record(reason);
                    continue;
                }
            };
            summary.accepted += 1;

            if options.dry_run {
                terminal::display_would_save(theme, &post.title);
                continue;
            }

            let themed = ThemedPost::new(post, theme);
            match db.upsert_post(&themed).await {
                Ok(()) => {
                    summary.saved += 1;
                    terminal::display_saved(theme, &themed.post.title);
                }
                Err(e) => {
                    warn!(url = %themed.post.url, error = %e, "Database error, post not saved");
                    oldest_failed =
                        Some(oldest_failed.map_or(created_utc, |o| o.min(created_utc)));
                }
            }
        }

        if options.dry_run {
            continue;
        }
        if let Some(mark) = next_watermark(watermark, newest, oldest_failed) {
            if let Err(e) = db.set_scan_state(&key, &mark.to_string()).await {
                warn!(subreddit = %subreddit, error = %e, "Failed to update watermark");
            }
        }
    }

    // A run where every fetch failed didn't scrape anything.
    if !options.dry_run && any_fetched {
        let now = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
        db.set_scan_state(LAST_SCRAPE_KEY, &now).await?;
    }

    info!(
        fetched = summary.fetched,
        fresh = summary.fresh,
        accepted = summary.accepted,
        saved = summary.saved,
        failed = summary.failed_subreddits.len(),
        "Scrape complete"
    );
    Ok(summary)
}

async fn read_watermark(db: &dyn Database, key: &str) -> Option<i64> {
    match db.get_scan_state(key).await {
        Ok(Some(value)) => match value.parse() {
            Ok(mark) => Some(mark),
            Err(_) => {
                warn!(key, value = %value, "Ignoring unparseable watermark");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!(key, error = %e, "Failed to read watermark, processing everything");
            None
        }
    }
}
