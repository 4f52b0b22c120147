//! Editorial drafting on top of an LLM provider.
//!
//! The drafting assistant turns a project's catalog entry (and a few of
//! its images) into an editorial draft. Drafts are marked as
//! AI-generated and left unpublished for a human pass.

use anyhow::Result;
use std::path::Path;

use super::provider::{create_provider, LlmProvider};
use crate::config::LlmConfig;
use crate::db::Project;

pub struct DraftClient {
    provider: Box<dyn LlmProvider>,
    custom_prompt: Option<String>,
}

/// A parsed editorial draft.
#[derive(Debug, Clone)]
pub struct EditorialDraft {
    pub title: String,
    pub excerpt: Option<String>,
    pub body: String,
}

impl DraftClient {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            provider: create_provider(config),
            custom_prompt: config.custom_prompt.clone(),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    /// Draft an editorial about a project. Images are attached when the
    /// provider supports them; failures propagate to the caller, which
    /// reports and moves on.
    pub fn draft_editorial(&self, project: &Project, images: &[&Path]) -> Result<EditorialDraft> {
        let prompt = build_draft_prompt(project, self.custom_prompt.as_deref());
        let response = self.provider.generate(&prompt, images)?;
        Ok(parse_draft(&response, &project.title))
    }
}

fn build_draft_prompt(project: &Project, custom: Option<&str>) -> String {
    let mut prompt = String::new();
    if let Some(custom) = custom {
        prompt.push_str(custom);
        prompt.push_str("\n\n");
    }
    prompt.push_str(
        "Write an editorial article about the renovation project described below, \
         for the journal of a property-development studio. Aim for 400-600 words, \
         warm but concrete, no marketing superlatives. Respond with a line \
         'TITLE: <title>', a line 'EXCERPT: <one-sentence excerpt>', then the \
         article body.\n\n",
    );
    prompt.push_str(&format!("Project: {}\n", project.title));
    if let Some(location) = &project.location {
        prompt.push_str(&format!("Location: {}\n", location));
    }
    if let Some(year) = project.completed_year {
        prompt.push_str(&format!("Completed: {}\n", year));
    }
    if let Some(summary) = &project.summary {
        prompt.push_str(&format!("Summary: {}\n", summary));
    }
    if let Some(body) = &project.body {
        prompt.push_str(&format!("\nNotes:\n{}\n", body));
    }
    prompt
}

/// Parse the `TITLE:` / `EXCERPT:` markers out of a response. Falls back
/// to the project title and no excerpt when the model skipped them.
fn parse_draft(response: &str, fallback_title: &str) -> EditorialDraft {
    let mut title = None;
    let mut excerpt = None;
    let mut body_lines = Vec::new();

    for line in response.lines() {
        if title.is_none() {
            if let Some(rest) = line.trim().strip_prefix("TITLE:") {
                title = Some(rest.trim().to_string());
                continue;
            }
        }
        if excerpt.is_none() {
            if let Some(rest) = line.trim().strip_prefix("EXCERPT:") {
                excerpt = Some(rest.trim().to_string());
                continue;
            }
        }
        body_lines.push(line);
    }

    let body = body_lines.join("\n").trim().to_string();
    EditorialDraft {
        title: title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| fallback_title.to_string()),
        excerpt: excerpt.filter(|e| !e.is_empty()),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_project() -> Project {
        Project {
            id: 1,
            slug: "villa-aurelia".to_string(),
            title: "Villa Aurelia".to_string(),
            summary: Some("A 1920s villa opened up to the garden".to_string()),
            body: None,
            location: Some("Porto".to_string()),
            completed_year: Some(2023),
            hero_image_id: None,
            is_published: false,
            published_at: None,
            created_at: "2024-01-01T00:00:00".to_string(),
            updated_at: "2024-01-01T00:00:00".to_string(),
        }
    }

    #[test]
    fn test_build_draft_prompt_includes_project_facts() {
        let prompt = build_draft_prompt(&test_project(), Some("House style: plain voice."));
        assert!(prompt.starts_with("House style: plain voice."));
        assert!(prompt.contains("Project: Villa Aurelia"));
        assert!(prompt.contains("Location: Porto"));
        assert!(prompt.contains("Completed: 2023"));
    }

    #[test]
    fn test_parse_draft_with_markers() {
        let response = "TITLE: Opening the villa\nEXCERPT: How a dark floor plan found its garden.\n\nThe villa sat closed for decades.\nThen the walls came down.";
        let draft = parse_draft(response, "Fallback");
        assert_eq!(draft.title, "Opening the villa");
        assert_eq!(
            draft.excerpt.as_deref(),
            Some("How a dark floor plan found its garden.")
        );
        assert_eq!(
            draft.body,
            "The villa sat closed for decades.\nThen the walls came down."
        );
    }

    #[test]
    fn test_parse_draft_without_markers_falls_back() {
        let draft = parse_draft("Just a body with no markers.", "Villa Aurelia");
        assert_eq!(draft.title, "Villa Aurelia");
        assert!(draft.excerpt.is_none());
        assert_eq!(draft.body, "Just a body with no markers.");
    }

    #[test]
    fn test_parse_draft_markers_only_taken_once() {
        let response = "TITLE: First\nbody starts\nTITLE: not a marker anymore\nmore body";
        let draft = parse_draft(response, "Fallback");
        assert_eq!(draft.title, "First");
        assert!(draft.body.contains("TITLE: not a marker anymore"));
    }
}
