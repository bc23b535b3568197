//! Google Gemini backend for [`ContentGenerator`].
//!
//! Talks to the REST `generateContent` endpoint directly over reqwest. Quiz
//! and roadmap requests ask for JSON constrained by a response schema; the
//! resource lookup enables the Google Search tool and reads the grounding
//! chunks instead of the text.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ContentError, ContentGenerator, ContentResult};
use crate::models::{LearningResource, QuizQuestion, RoadmapStep};
use crate::settings::ContentSettings;

const MAX_RESOURCES: usize = 3;
const UNTITLED_RESOURCE: &str = "External Resource";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebChunk>,
}

#[derive(Debug, Deserialize)]
struct WebChunk {
    uri: Option<String>,
    title: Option<String>,
}

impl GenerateContentResponse {
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    fn web_links(&self) -> Vec<LearningResource> {
        self.candidates
            .first()
            .and_then(|candidate| candidate.grounding_metadata.as_ref())
            .map(|metadata| {
                metadata
                    .grounding_chunks
                    .iter()
                    .filter_map(|chunk| chunk.web.as_ref())
                    .filter_map(|web| {
                        let uri = web.uri.clone()?;
                        Some(LearningResource {
                            title: web
                                .title
                                .clone()
                                .filter(|title| !title.trim().is_empty())
                                .unwrap_or_else(|| UNTITLED_RESOURCE.to_string()),
                            uri,
                        })
                    })
                    .take(MAX_RESOURCES)
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn quiz_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "question": { "type": "STRING" },
                "options": { "type": "ARRAY", "items": { "type": "STRING" } },
                "correctIndex": { "type": "INTEGER" }
            },
            "required": ["question", "options", "correctIndex"]
        }
    })
}

fn roadmap_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": { "type": "STRING" },
                "description": { "type": "STRING" }
            },
            "required": ["title", "description"]
        }
    })
}

fn prompt_body(prompt: &str) -> Value {
    json!({ "contents": [{ "role": "user", "parts": [{ "text": prompt }] }] })
}

fn structured_body(prompt: &str, schema: Value) -> Value {
    let mut body = prompt_body(prompt);
    body["generationConfig"] = json!({
        "responseMimeType": "application/json",
        "responseSchema": schema,
    });
    body
}

fn search_body(prompt: &str) -> Value {
    let mut body = prompt_body(prompt);
    body["tools"] = json!([{ "google_search": {} }]);
    body
}

fn is_quota_error(status: reqwest::StatusCode, body: &str) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS || body.contains("RESOURCE_EXHAUSTED")
}

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(settings: &ContentSettings, api_key: Option<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .context("failed to build HTTP client for content generator")?;

        Ok(Self {
            client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    async fn generate(&self, body: Value) -> ContentResult<GenerateContentResponse> {
        let api_key = self.api_key.as_deref().ok_or(ContentError::MissingApiKey)?;

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if is_quota_error(status, &body) {
                return Err(ContentError::QuotaExhausted(body));
            }
            return Err(ContentError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let raw = response.text().await?;
        serde_json::from_str(&raw).map_err(|err| ContentError::Malformed(err.to_string()))
    }

    async fn generate_json<T>(&self, prompt: &str, schema: Value) -> ContentResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self.generate(structured_body(prompt, schema)).await?;
        let text = response.text();
        if text.trim().is_empty() {
            return Err(ContentError::Empty);
        }
        serde_json::from_str(text.trim()).map_err(|err| ContentError::Malformed(err.to_string()))
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate_quiz(&self, skill: &str) -> ContentResult<Vec<QuizQuestion>> {
        let prompt = format!("Generate a 3-question multiple choice quiz for the skill: {skill}.");
        self.generate_json(&prompt, quiz_schema()).await
    }

    async fn learning_roadmap(&self, skill: &str) -> ContentResult<Vec<RoadmapStep>> {
        let prompt = format!(
            "Create a 4-step professional learning roadmap for {skill}. Keep descriptions high-impact."
        );
        self.generate_json(&prompt, roadmap_schema()).await
    }

    async fn web_resources(&self, skill: &str) -> ContentResult<Vec<LearningResource>> {
        let prompt =
            format!("Find official documentation and top tutorials for learning {skill}.");
        let response = self.generate(search_body(&prompt)).await?;
        Ok(response.web_links())
    }

    async fn growth_insight(&self, skills: &[String]) -> ContentResult<String> {
        let prompt = format!(
            "Based on a student learning {}, provide one short, motivational 1-sentence analytical insight for their dashboard.",
            skills.join(", ")
        );
        let response = self.generate(prompt_body(&prompt)).await?;
        Ok(response.text().trim().to_string())
    }
}
