//! Gemini-backed line resolver
//!
//! Sends the submission and its trace to `generateContent` with a JSON
//! response schema and reads back `{"error_lines": [int, ...]}`.

use std::fmt;
use std::future::Future;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::config::ResolverConfig;
use crate::locate::{LineResolver, ResolutionError};
use crate::types::ErrorLines;

/// Remote resolver using the Gemini REST API
#[derive(Clone)]
pub struct GeminiResolver {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    api_key_env: String,
}

impl fmt::Debug for GeminiResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiResolver")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("api_key_env", &self.api_key_env)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
    #[serde(rename = "responseSchema")]
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Structured answer requested from the model
#[derive(Debug, Deserialize)]
struct ErrorAnalysis {
    error_lines: ErrorLines,
}

impl GeminiResolver {
    /// Create a resolver, reading the API key from the environment
    pub fn new(config: &ResolverConfig) -> Result<Self, ResolutionError> {
        Self::with_api_key(config, config.api_key())
    }

    /// Create a resolver with an explicit API key
    pub fn with_api_key(
        config: &ResolverConfig,
        api_key: Option<String>,
    ) -> Result<Self, ResolutionError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        let endpoint = format!(
            "{}/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            config.model
        );

        Ok(Self {
            client,
            endpoint,
            api_key,
            api_key_env: config.api_key_env.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    #[instrument(skip_all, fields(endpoint = %self.endpoint))]
    async fn request(&self, code: &str, diagnostic: &str) -> Result<ErrorLines, ResolutionError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ResolutionError::MissingApiKey(self.api_key_env.clone()))?;

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", api_key)
            .json(&build_request(code, diagnostic))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(%status, body_len = body.len(), "resolver responded");

        if !status.is_success() {
            return Err(ResolutionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_response(&body)
    }
}

impl LineResolver for GeminiResolver {
    fn resolve_lines(
        &self,
        code: &str,
        diagnostic: &str,
    ) -> impl Future<Output = Result<ErrorLines, ResolutionError>> + Send {
        self.request(code, diagnostic)
    }
}

fn build_prompt(code: &str, diagnostic: &str) -> String {
    format!(
        "Analyze the Python CODE and TRACEBACK below.\n\
         Return ONLY a JSON object of the form {{\"error_lines\": [line_numbers]}}.\n\
         \n\
         Rules:\n\
         - Line numbers refer to the user's CODE, counting its first line as 1.\n\
         - Only report lines that exist in CODE.\n\
         - Ignore frames from internal or framework files.\n\
         \n\
         CODE:\n{code}\n\
         \n\
         TRACEBACK:\n{diagnostic}\n"
    )
}

fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "error_lines": {
                "type": "ARRAY",
                "items": { "type": "INTEGER" }
            }
        },
        "required": ["error_lines"]
    })
}

fn build_request(code: &str, diagnostic: &str) -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content {
            role: Some("user".to_owned()),
            parts: vec![Part {
                text: Some(build_prompt(code, diagnostic)),
            }],
        }],
        generation_config: GenerationConfig {
            temperature: 0.0,
            response_mime_type: "application/json",
            response_schema: response_schema(),
        },
    }
}

/// Extract and validate `error_lines` from a `generateContent` body
fn parse_response(body: &str) -> Result<ErrorLines, ResolutionError> {
    let response: GenerateResponse = serde_json::from_str(body)?;

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    let text = strip_code_fence(text.trim());
    if text.is_empty() {
        return Err(ResolutionError::EmptyResponse);
    }

    let analysis: ErrorAnalysis = serde_json::from_str(text)?;
    Ok(analysis.error_lines)
}

/// Models occasionally wrap JSON in a markdown fence despite the mime type
fn strip_code_fence(text: &str) -> &str {
    text.strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .and_then(|inner| inner.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(text)
}
