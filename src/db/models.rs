// Data models — the records the database layer reads and writes.
//
// Kept apart from the backends so the pipeline and output modules can use
// them without depending on rusqlite or reqwest.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::classify::Theme;
use crate::post::Post;

/// An accepted post with its theme: every Post field plus `theme`.
///
/// Serializes flat, which is the row shape both backends store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemedPost {
    #[serde(flatten)]
    pub post: Post,
    pub theme: Theme,
}

impl ThemedPost {
    pub fn new(post: Post, theme: Theme) -> Self {
        Self { post, theme }
    }
}

/// Number of stored posts in one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeCount {
    pub theme: Theme,
    pub count: i64,
}

impl ThemeCount {
    /// One entry per theme in decision-list order, zeros included.
    pub fn tally(counts: &HashMap<Theme, i64>) -> Vec<ThemeCount> {
        Theme::ALL
            .into_iter()
            .map(|theme| ThemeCount {
                theme,
                count: counts.get(&theme).copied().unwrap_or(0),
            })
            .collect()
    }
}
