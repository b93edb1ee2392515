// Filter and theme stages over a normalized post.
//
// The filter is three ordered, short-circuiting passes over one normalized
// string: bad phrases reject, a missing help signal rejects, a missing
// keyword rejects. Accepted posts then walk the theme decision list and take
// the first group with any member present. Everything is plain substring
// containment, so "serialization" satisfies "serial".

use std::fmt;

use super::normalize::normalize;
use super::rules::RuleSet;
use super::theme::Theme;
use crate::post::Post;

/// Why a post was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Contains a showcase/announcement marker.
    BadPhrase(&'static str),
    NoHelpSignal,
    NoKeyword,
}

/// Outcome of running a post through both stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accepted {
        theme: Theme,
        /// The first keyword that let the post through.
        keyword: &'static str,
    },
    Rejected(Rejection),
}

impl Decision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Decision::Accepted { .. })
    }

    pub fn theme(&self) -> Option<Theme> {
        match self {
            Decision::Accepted { theme, .. } => Some(*theme),
            Decision::Rejected(_) => None,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::BadPhrase(phrase) => write!(f, "showcase phrase \"{phrase}\""),
            Rejection::NoHelpSignal => write!(f, "no help signal"),
            Rejection::NoKeyword => write!(f, "no embedded keyword"),
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Accepted { theme, keyword } => {
                write!(f, "accepted as {theme} (keyword \"{keyword}\")")
            }
            Decision::Rejected(reason) => write!(f, "rejected: {reason}"),
        }
    }
}

/// Stateless classifier over a fixed rule set.
///
/// `Copy` and free of interior state, so it can be shared across threads
/// and called on posts in any order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classifier {
    rules: RuleSet,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::canonical()
    }
}

impl Classifier {
    pub const fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub const fn canonical() -> Self {
        Self::new(RuleSet::CANONICAL)
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Filter stage: true if the post is a help-seeking embedded question.
    pub fn matches(&self, post: &Post) -> bool {
        self.filter_text(&normalized_text(post)).is_ok()
    }

    /// Theme stage. Meant for posts that passed `matches`, but defined for
    /// any post.
    pub fn assign_theme(&self, post: &Post) -> Theme {
        self.theme_for_text(&normalized_text(post))
    }

    /// Both stages at once: `Some(theme)` for accepted posts.
    pub fn classify(&self, post: &Post) -> Option<Theme> {
        self.evaluate(post).theme()
    }

    /// Both stages, reporting which rule decided.
    pub fn evaluate(&self, post: &Post) -> Decision {
        self.evaluate_text(&normalized_text(post))
    }

    /// Run both stages over text that has already been normalized.
    pub fn evaluate_text(&self, text: &str) -> Decision {
        match self.filter_text(text) {
            Ok(keyword) => Decision::Accepted {
                theme: self.theme_for_text(text),
                keyword,
            },
            Err(reason) => Decision::Rejected(reason),
        }
    }

    fn filter_text(&self, text: &str) -> Result<&'static str, Rejection> {
        if let Some(phrase) = first_contained(self.rules.bad_phrases, text) {
            return Err(Rejection::BadPhrase(phrase));
        }
        if first_contained(self.rules.help_signals, text).is_none() {
            return Err(Rejection::NoHelpSignal);
        }
        first_contained(self.rules.keywords, text).ok_or(Rejection::NoKeyword)
    }

    fn theme_for_text(&self, text: &str) -> Theme {
        self.rules
            .theme_rules
            .iter()
            .find(|rule| first_contained(rule.terms, text).is_some())
            .map(|rule| rule.theme)
            .unwrap_or(self.rules.fallback_theme)
    }
}

/// Normalized title + " " + body, the only text the rules ever see.
pub fn normalized_text(post: &Post) -> String {
    normalize(&post.combined_text())
}

fn first_contained(terms: &'static [&'static str], text: &str) -> Option<&'static str> {
    terms.iter().copied().find(|term| text.contains(term))
}
