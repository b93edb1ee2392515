// Rule-based classification of posts into help-seeking themes.

pub mod classifier;
pub mod normalize;
pub mod rules;
pub mod theme;

pub use classifier::{Classifier, Decision, Rejection};
pub use normalize::normalize;
pub use rules::{RuleSet, ThemeRule};
pub use theme::Theme;

use crate::post::Post;

/// Filter stage with the canonical rule set.
pub fn matches(post: &Post) -> bool {
    Classifier::canonical().matches(post)
}

/// Theme stage with the canonical rule set.
pub fn assign_theme(post: &Post) -> Theme {
    Classifier::canonical().assign_theme(post)
}
