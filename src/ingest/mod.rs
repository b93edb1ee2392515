// Offline ingestion — posts loaded from files rather than fetched live.

pub mod csv;
