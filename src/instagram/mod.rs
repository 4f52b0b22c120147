//! Instagram feed client and cache.
//!
//! The public site shows the studio's latest posts. Rather than hitting
//! the Graph API on every page view, the feed is fetched on demand (or
//! on a schedule) and kept in a single denormalized cache row; readers
//! take the cached payload as long as it is fresh enough.

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::InstagramConfig;
use crate::db::Database;

/// One media item from the feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstagramPost {
    pub id: String,
    #[serde(default)]
    pub caption: Option<String>,
    pub media_type: String,
    pub media_url: String,
    pub permalink: String,
    /// Present for video posts.
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
struct FeedResponse {
    data: Vec<InstagramPost>,
}

/// Fetch the latest posts from the Graph API media edge.
pub fn fetch_feed(config: &InstagramConfig) -> Result<Vec<InstagramPost>> {
    let token = config
        .access_token
        .as_deref()
        .context("Instagram access token not configured")?;
    let url = format!("{}/me/media", config.api_base.trim_end_matches('/'));

    let response: FeedResponse = ureq::get(&url)
        .query(
            "fields",
            "id,caption,media_type,media_url,permalink,thumbnail_url,timestamp",
        )
        .query("limit", &config.feed_limit.to_string())
        .query("access_token", token)
        .call()
        .context("Failed to fetch Instagram feed")?
        .into_json()
        .context("Failed to parse Instagram feed")?;

    Ok(response.data)
}

/// Fetch the feed and overwrite the cache row. Returns the number of
/// posts cached.
pub fn refresh_cache(db: &Database, config: &InstagramConfig) -> Result<usize> {
    let posts = fetch_feed(config)?;
    let payload = serde_json::to_string(&posts)?;
    db.store_cached_feed(&payload)?;
    Ok(posts.len())
}

/// Read posts from the cache row, or `None` when the cache is missing,
/// stale, or unparseable — the caller decides whether to refresh.
pub fn cached_posts(db: &Database, config: &InstagramConfig) -> Result<Option<Vec<InstagramPost>>> {
    let Some(feed) = db.get_cached_feed()? else {
        return Ok(None);
    };
    if is_stale(&feed.fetched_at, config.cache_max_age_minutes) {
        return Ok(None);
    }
    match serde_json::from_str(&feed.payload) {
        Ok(posts) => Ok(Some(posts)),
        Err(_) => Ok(None),
    }
}

fn is_stale(fetched_at: &str, max_age_minutes: i64) -> bool {
    match NaiveDateTime::parse_from_str(fetched_at, "%Y-%m-%dT%H:%M:%S") {
        Ok(dt) => {
            let age = Utc::now().signed_duration_since(dt.and_utc());
            age > chrono::Duration::minutes(max_age_minutes)
        }
        // Unparseable timestamp: treat as stale and refetch.
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_feed_response() {
        let json = r#"{
            "data": [
                {
                    "id": "1790",
                    "caption": "Before & after in the old town",
                    "media_type": "IMAGE",
                    "media_url": "https://scontent.cdninstagram.com/1790.jpg",
                    "permalink": "https://www.instagram.com/p/abc/",
                    "timestamp": "2024-05-02T09:15:00+0000"
                },
                {
                    "id": "1791",
                    "media_type": "VIDEO",
                    "media_url": "https://scontent.cdninstagram.com/1791.mp4",
                    "thumbnail_url": "https://scontent.cdninstagram.com/1791.jpg",
                    "permalink": "https://www.instagram.com/p/def/",
                    "timestamp": "2024-05-01T18:00:00+0000"
                }
            ],
            "paging": {"next": "ignored"}
        }"#;

        let response: FeedResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.data.len(), 2);
        assert_eq!(response.data[0].caption.as_deref(), Some("Before & after in the old town"));
        assert!(response.data[1].caption.is_none());
        assert_eq!(
            response.data[1].thumbnail_url.as_deref(),
            Some("https://scontent.cdninstagram.com/1791.jpg")
        );
    }

    #[test]
    fn test_is_stale() {
        let fresh = Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string();
        assert!(!is_stale(&fresh, 60));
        assert!(is_stale("2001-01-01T00:00:00", 60));
        assert!(is_stale("not a timestamp", 60));
    }

    #[test]
    fn test_cached_posts_round_trip() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        let config = InstagramConfig::default();

        assert!(cached_posts(&db, &config).unwrap().is_none());

        let posts = vec![InstagramPost {
            id: "1".to_string(),
            caption: None,
            media_type: "IMAGE".to_string(),
            media_url: "https://cdn.test/1.jpg".to_string(),
            permalink: "https://www.instagram.com/p/xyz/".to_string(),
            thumbnail_url: None,
            timestamp: "2024-05-02T09:15:00+0000".to_string(),
        }];
        db.store_cached_feed(&serde_json::to_string(&posts).unwrap())
            .unwrap();

        let cached = cached_posts(&db, &config).unwrap().unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].id, "1");

        // A zero max age makes any cached payload stale.
        let strict = InstagramConfig {
            cache_max_age_minutes: -1,
            ..InstagramConfig::default()
        };
        assert!(cached_posts(&db, &strict).unwrap().is_none());
    }
}
