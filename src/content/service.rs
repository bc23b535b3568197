use std::sync::Arc;

use super::{fallback, ContentError, ContentGenerator, OfflineGenerator};
use crate::models::{LearningResource, QuizQuestion, RoadmapStep};
use crate::{log_debug, log_warn};

const ENABLE_LOGS: bool = true;

/// Number of questions a session quiz is cut down to.
pub const QUIZ_LENGTH: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSource {
    Generated,
    Fallback,
}

/// Content plus where it came from, so callers can show a soft notice when
/// the generator was unavailable.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated<T> {
    pub value: T,
    pub source: ContentSource,
}

impl<T> Generated<T> {
    fn generated(value: T) -> Self {
        Self {
            value,
            source: ContentSource::Generated,
        }
    }

    fn fallback(value: T) -> Self {
        Self {
            value,
            source: ContentSource::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == ContentSource::Fallback
    }
}

/// Infallible front for a [`ContentGenerator`].
#[derive(Clone)]
pub struct ContentService {
    generator: Arc<dyn ContentGenerator>,
}

impl ContentService {
    pub fn new(generator: Arc<dyn ContentGenerator>) -> Self {
        Self { generator }
    }

    pub fn offline() -> Self {
        Self::new(Arc::new(OfflineGenerator))
    }

    pub fn backend(&self) -> &'static str {
        self.generator.name()
    }

    pub async fn quiz(&self, skill: &str) -> Generated<Vec<QuizQuestion>> {
        match self.generator.generate_quiz(skill).await {
            Ok(mut questions)
                if !questions.is_empty() && questions.iter().all(QuizQuestion::is_well_formed) =>
            {
                questions.truncate(QUIZ_LENGTH);
                log_debug!("Generated {} quiz questions for {}", questions.len(), skill);
                Generated::generated(questions)
            }
            Ok(_) => {
                log_warn!("Quiz for {} was empty or invalid; using fallback quiz", skill);
                Generated::fallback(fallback::quiz(skill))
            }
            Err(err) => {
                log_warn!("Quiz fallback triggered for {}: {}", skill, err);
                Generated::fallback(fallback::quiz(skill))
            }
        }
    }

    pub async fn roadmap(&self, skill: &str) -> Generated<Vec<RoadmapStep>> {
        match self.generator.learning_roadmap(skill).await {
            Ok(steps)
                if !steps.is_empty() && steps.iter().all(|step| !step.title.trim().is_empty()) =>
            {
                Generated::generated(steps)
            }
            Ok(_) => {
                log_warn!("Roadmap for {} was empty; using fallback roadmap", skill);
                Generated::fallback(fallback::roadmap())
            }
            Err(err) => {
                log_warn!("Roadmap fallback triggered for {}: {}", skill, err);
                Generated::fallback(fallback::roadmap())
            }
        }
    }

    pub async fn resources(&self, skill: &str) -> Generated<Vec<LearningResource>> {
        match self.generator.web_resources(skill).await {
            Ok(links) if !links.is_empty() => Generated::generated(links),
            Ok(_) => Generated::fallback(fallback::documentation_resources(skill)),
            Err(err) => {
                log_warn!("Resource fallback triggered for {}: {}", skill, err);
                Generated::fallback(fallback::search_resources(skill))
            }
        }
    }

    pub async fn insight(&self, skills: &[String]) -> Generated<String> {
        match self.generator.growth_insight(skills).await {
            Ok(text) if !text.trim().is_empty() => Generated::generated(text.trim().to_string()),
            Ok(_) => Generated::fallback(fallback::INSIGHT_ON_EMPTY.to_string()),
            Err(ContentError::QuotaExhausted(_)) => {
                log_warn!("Insight quota exhausted");
                Generated::fallback(fallback::INSIGHT_ON_QUOTA.to_string())
            }
            Err(err) => {
                log_warn!("Insight fallback triggered: {}", err);
                Generated::fallback(fallback::INSIGHT_ON_ERROR.to_string())
            }
        }
    }
}
