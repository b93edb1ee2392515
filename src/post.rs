// Post — the single record shape that flows from ingestion to persistence.
//
// Both ingestion paths (Reddit listings and CSV files) build these, the
// classifier reads them, and the database stores them with a theme attached.

use serde::{Deserialize, Serialize};

/// One ingested submission.
///
/// The classifier only ever borrows a `Post`; it never changes one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Source community (e.g. "arduino")
    pub subreddit: String,
    pub title: String,
    /// Body text, empty for link posts
    pub selftext: String,
    /// Upvote score. Carried through, never read by the classifier.
    pub score: i64,
    /// Carried through, never read by the classifier.
    pub num_comments: i64,
    /// Permalink. Unique key for persistence.
    pub url: String,
}

impl Post {
    /// The text the classifier inspects: title, one space, body.
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.title, self.selftext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combined_text_keeps_title_first() {
        let post = Post {
            subreddit: "arduino".to_string(),
            title: "Servo jitter".to_string(),
            selftext: "on pin 9".to_string(),
            score: 0,
            num_comments: 0,
            url: "https://reddit.com/r/arduino/comments/x".to_string(),
        };
        assert_eq!(post.combined_text(), "Servo jitter on pin 9");
    }

    #[test]
    fn combined_text_with_empty_body_ends_in_space() {
        let post = Post {
            subreddit: String::new(),
            title: "Title".to_string(),
            selftext: String::new(),
            score: 0,
            num_comments: 0,
            url: String::new(),
        };
        assert_eq!(post.combined_text(), "Title ");
    }
}
