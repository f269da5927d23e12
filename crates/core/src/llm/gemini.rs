use crate::config::Settings;
use crate::llm::error::AnalysisError;
use crate::llm::prompt::SchemaDescriptor;
use crate::llm::{GenerateInput, LlmClient, Provider};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
const JSON_MIME_TYPE: &str = "application/json";

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn from_settings(settings: &Settings) -> Result<Self, AnalysisError> {
        let api_key = settings.require_gemini_api_key()?.to_string();
        let base_url = settings
            .gemini_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = settings
            .gemini_model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        // No timeout unless configured: the transport default applies.
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = settings.gemini_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().map_err(|e| {
            AnalysisError::Configuration(format!("failed to build reqwest client: {e}"))
        })?;

        Ok(Self {
            http,
            api_key,
            base_url,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    fn headers(&self) -> Result<HeaderMap, AnalysisError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&self.api_key).map_err(|_| {
            AnalysisError::Configuration("GEMINI_API_KEY contains invalid characters".to_string())
        })?;
        headers.insert("x-goog-api-key", key);
        Ok(headers)
    }

    async fn generate(
        &self,
        req: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, AnalysisError> {
        let res = self
            .http
            .post(self.url())
            .headers(self.headers()?)
            .json(req)
            .send()
            .await
            .map_err(AnalysisError::transport)?;

        let status = res.status();
        let text = res.text().await.map_err(AnalysisError::transport)?;
        if !status.is_success() {
            let message = api_error_message(&text);
            tracing::warn!(%status, model = %self.model, error = %message, "Gemini request rejected");
            return Err(AnalysisError::http_status(status.as_u16(), &message));
        }

        // An undecodable envelope yields no text, which surfaces as a parse failure.
        Ok(serde_json::from_str::<GenerateContentResponse>(&text).unwrap_or_else(|e| {
            tracing::error!(error = %e, body = %text, "failed to decode Gemini response envelope");
            GenerateContentResponse::default()
        }))
    }
}

#[async_trait::async_trait]
impl LlmClient for GeminiClient {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    async fn generate_content(&self, input: GenerateInput) -> Result<String, AnalysisError> {
        let req = GenerateContentRequest::new(input);
        let res = self.generate(&req).await?;

        if let Some(reason) = res
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            tracing::warn!(block_reason = reason, "Gemini blocked the prompt");
        }
        if let Some(reason) = res.candidates.first().and_then(|c| c.finish_reason.as_deref()) {
            tracing::debug!(finish_reason = reason, "Gemini candidate finished");
        }

        Ok(res.text())
    }
}

fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(body)
        .ok()
        .and_then(|env| env.error.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| body.trim().to_string())
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    fn new(input: GenerateInput) -> Self {
        let tools = if input.web_search {
            vec![Tool {
                google_search: GoogleSearch {},
            }]
        } else {
            Vec::new()
        };

        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(input.prompt),
                }],
            }],
            tools,
            generation_config: GenerationConfig {
                response_mime_type: JSON_MIME_TYPE,
                response_schema: input.response_schema,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Clone, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: SchemaDescriptor,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate; empty when absent.
    fn text(&self) -> String {
        let Some(candidate) = self.candidates.first() else {
            return String::new();
        };
        let Some(content) = &candidate.content else {
            return String::new();
        };
        content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
}
