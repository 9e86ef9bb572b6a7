//! Gemini `generateContent` client used for personalized messages.

use std::time::Duration;

use notifier_core::{MessageConfig, NotifierError};
use notifier_engine::MessageGenerator;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    endpoint: String,
    api_key: String,
}

impl GeminiClient {
    pub fn from_config(config: &MessageConfig) -> Result<Self, NotifierError> {
        let api_key = config
            .configured_api_key()
            .map(str::to_string)
            .ok_or_else(|| NotifierError::Config("messages.api_key is not set".to_string()))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| NotifierError::Config(format!("message client: {err}")))?;

        Ok(Self {
            http,
            endpoint: format!(
                "{}/models/{}:generateContent",
                config.base_url.trim_end_matches('/'),
                config.model
            ),
            api_key,
        })
    }
}

impl MessageGenerator for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, NotifierError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .map_err(|err| NotifierError::MessageUnavailable(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifierError::MessageUnavailable(format!(
                "generation API returned status {status}"
            )));
        }

        let body = response
            .text()
            .map_err(|err| NotifierError::MessageUnavailable(err.to_string()))?;
        parse_generation_payload(&body)
    }
}

/// Joins the text parts of the first candidate.
pub fn parse_generation_payload(body: &str) -> Result<String, NotifierError> {
    let payload: GenerateResponse =
        serde_json::from_str(body).map_err(|err| NotifierError::Parse(err.to_string()))?;

    let text = payload
        .candidates
        .into_iter()
        .next()
        .map(|candidate| {
            candidate
                .content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let text = text.trim();
    if text.is_empty() {
        return Err(NotifierError::MessageUnavailable(
            "generation API returned no text".to_string(),
        ));
    }
    Ok(text.to_string())
}
