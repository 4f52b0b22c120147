//! Types for editorials.

/// A blog-style article. `is_ai_drafted` marks pieces generated by the
/// drafting assistant and still awaiting a human pass.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct Editorial {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub body: Option<String>,
    pub cover_image_url: Option<String>,
    pub is_ai_drafted: bool,
    pub is_published: bool,
    pub published_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}
