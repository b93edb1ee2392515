// Pipelines — the multi-step operations behind `scrape`, `classify` and `audit`.

pub mod batch;
pub mod scrape;
