//! Types for renovation projects.

/// A renovation case study as stored in the catalog.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct Project {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub summary: Option<String>,
    pub body: Option<String>,
    pub location: Option<String>,
    pub completed_year: Option<i64>,
    pub hero_image_id: Option<i64>,
    pub is_published: bool,
    pub published_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Editable text fields of a project, applied in one update.
#[derive(Debug, Clone, Default)]
pub struct ProjectDetails {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub body: Option<String>,
    pub location: Option<String>,
    pub completed_year: Option<i64>,
}
