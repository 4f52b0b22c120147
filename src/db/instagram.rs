//! Types for the Instagram feed cache.

/// The single cached feed row: raw payload plus when it was fetched.
#[derive(Debug, Clone)]
pub struct CachedFeed {
    pub payload: String,
    pub fetched_at: String,
}
