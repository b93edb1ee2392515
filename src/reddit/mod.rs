// Reddit ingestion — OAuth client, listing types, request pacing.

pub mod client;
pub mod listing;
pub mod rate_limiter;

pub use client::{RedditClient, RedditCredentials};
pub use listing::RedditSubmission;
