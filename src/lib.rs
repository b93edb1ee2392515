// embedhelp: find beginner embedded-systems help requests on Reddit
//
// This is the library root. Posts come in from Reddit or CSV, pass through
// the rule-based classifier, and accepted ones are stored with a theme.

pub mod classify;
pub mod config;
pub mod db;
pub mod ingest;
pub mod output;
pub mod pipeline;
pub mod post;
pub mod reddit;
pub mod status;
