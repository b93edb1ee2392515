// Batch classification over an in-memory set of posts.
//
// Used by `classify` (CSV in, themed posts out) and `audit` (two rule sets
// over the same posts, reporting where they disagree). Posts are
// independent, so this is a plain map with no shared state.

use crate::classify::{Classifier, Decision, Rejection};
use crate::db::models::ThemedPost;
use crate::post::Post;

/// How many posts each filter pass turned away.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RejectionTally {
    pub bad_phrase: usize,
    pub no_help_signal: usize,
    pub no_keyword: usize,
}

impl RejectionTally {
    pub fn record(&mut self, reason: Rejection) {
        match reason {
            Rejection::BadPhrase(_) => self.bad_phrase += 1,
            Rejection::NoHelpSignal => self.no_help_signal += 1,
            Rejection::NoKeyword => self.no_keyword += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.bad_phrase + self.no_help_signal + self.no_keyword
    }
}

/// Result of classifying a batch.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Accepted posts in input order.
    pub accepted: Vec<ThemedPost>,
    pub rejected: RejectionTally,
}

/// Classify every post; accepted ones come back themed.
pub fn classify_posts(classifier: &Classifier, posts: Vec<Post>) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    for post in posts {
        match classifier.evaluate(&post) {
            Decision::Accepted { theme, .. } => {
                outcome.accepted.push(ThemedPost::new(post, theme));
            }
            Decision::Rejected(reason) => outcome.rejected.record(reason),
        }
    }
    outcome
}

/// A post two rule sets classify differently.
#[derive(Debug, Clone)]
pub struct Divergence {
    pub post: Post,
    pub primary: Decision,
    pub other: Decision,
}

/// Posts whose outcome (accept/reject or theme) differs between the two
/// classifiers. Differences only in rejection reason are not reported.
pub fn find_divergences(
    posts: &[Post],
    primary: &Classifier,
    other: &Classifier,
) -> Vec<Divergence> {
    posts
        .iter()
        .filter_map(|post| {
            let a = primary.evaluate(post);
            let b = other.evaluate(post);
            (a.theme() != b.theme()).then(|| Divergence {
                post: post.clone(),
                primary: a,
                other: b,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{RuleSet, Theme};

    fn post(title: &str) -> Post {
        Post {
            subreddit: "arduino".to_string(),
            title: title.to_string(),
            selftext: String::new(),
            score: 0,
            num_comments: 0,
            url: format!("https://reddit.com/{}", title.len()),
        }
    }

    #[test]
    fn classify_posts_splits_and_tallies() {
        let posts = vec![
            post("Help! My Arduino UART isn't working"),
            post("Tutorial: blinking an LED on Arduino, help welcome"),
            post("ESP32 project roundup"),
            post("My code doesn't work, help"),
        ];
        let outcome = classify_posts(&Classifier::canonical(), posts);
        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.accepted[0].theme, Theme::Communication);
        assert_eq!(
            outcome.rejected,
            RejectionTally {
                bad_phrase: 1,
                no_help_signal: 1,
                no_keyword: 1,
            }
        );
        assert_eq!(outcome.rejected.total(), 3);
    }

    #[test]
    fn divergence_found_for_canonical_only_keyword() {
        // "gpio" is only in the canonical keyword list.
        let posts = vec![post("Help, GPIO pin stuck high"), post("Help! My Arduino UART isn't working")];
        let canonical = Classifier::canonical();
        let legacy = Classifier::new(RuleSet::LEGACY_SCRAPER);
        let diverged = find_divergences(&posts, &canonical, &legacy);
        assert_eq!(diverged.len(), 1);
        assert!(diverged[0].primary.is_accepted());
        assert!(!diverged[0].other.is_accepted());
    }

    #[test]
    fn divergence_found_for_theme_order() {
        // Both accept; canonical checks analog before build errors.
        let posts = vec![post("Help, sensor upload keeps failing on my Arduino")];
        let canonical = Classifier::canonical();
        let legacy = Classifier::new(RuleSet::LEGACY_SCRAPER);
        let diverged = find_divergences(&posts, &canonical, &legacy);
        assert_eq!(diverged.len(), 1);
        assert_eq!(diverged[0].primary.theme(), Some(Theme::AnalogAndSensors));
        assert_eq!(diverged[0].other.theme(), Some(Theme::BuildCompileErrors));
    }
}
