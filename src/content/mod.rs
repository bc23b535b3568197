//! Generated learning content: quizzes, roadmaps, reading links and dashboard
//! insights.
//!
//! [`ContentGenerator`] is the raw, fallible boundary to a language-model API.
//! Application code never calls it directly; it goes through
//! [`ContentService`], which substitutes fixed fallback content whenever the
//! generator errors or returns something unusable.

use async_trait::async_trait;
use thiserror::Error;

pub mod fallback;
pub mod gemini;
pub mod service;

pub use gemini::GeminiClient;
pub use service::{ContentService, ContentSource, Generated};

use crate::models::{LearningResource, QuizQuestion, RoadmapStep};

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("no API key configured for the content generator")]
    MissingApiKey,
    #[error("content generator quota exhausted: {0}")]
    QuotaExhausted(String),
    #[error("content generator returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("request to content generator failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("content generator returned malformed data: {0}")]
    Malformed(String),
    #[error("content generator returned no content")]
    Empty,
}

pub type ContentResult<T> = Result<T, ContentError>;

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Identifies the backend in logs.
    fn name(&self) -> &'static str;

    /// Multiple-choice questions about `skill`.
    async fn generate_quiz(&self, skill: &str) -> ContentResult<Vec<QuizQuestion>>;

    /// Ordered study steps for `skill`.
    async fn learning_roadmap(&self, skill: &str) -> ContentResult<Vec<RoadmapStep>>;

    /// Reference links for `skill`. An empty list is a valid answer.
    async fn web_resources(&self, skill: &str) -> ContentResult<Vec<LearningResource>>;

    /// One motivational sentence for a student learning `skills`.
    async fn growth_insight(&self, skills: &[String]) -> ContentResult<String>;
}

/// Generator used when no API key is configured: every call reports
/// [`ContentError::MissingApiKey`], so callers run purely on fallback content.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineGenerator;

#[async_trait]
impl ContentGenerator for OfflineGenerator {
    fn name(&self) -> &'static str {
        "offline"
    }

    async fn generate_quiz(&self, _skill: &str) -> ContentResult<Vec<QuizQuestion>> {
        Err(ContentError::MissingApiKey)
    }

    async fn learning_roadmap(&self, _skill: &str) -> ContentResult<Vec<RoadmapStep>> {
        Err(ContentError::MissingApiKey)
    }

    async fn web_resources(&self, _skill: &str) -> ContentResult<Vec<LearningResource>> {
        Err(ContentError::MissingApiKey)
    }

    async fn growth_insight(&self, _skills: &[String]) -> ContentResult<String> {
        Err(ContentError::MissingApiKey)
    }
}
