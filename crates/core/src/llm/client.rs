use crate::config::Settings;
use crate::domain::{AnalysisRequest, AnalysisResult};
use crate::llm::error::AnalysisError;
use crate::llm::gemini::GeminiClient;
use crate::llm::{json, prompt, GenerateInput, LlmClient, Provider};
use std::sync::Arc;

/// Turns an [`AnalysisRequest`] into a single model call and parses the answer.
#[derive(Clone)]
pub struct AnalysisClient {
    llm: Arc<dyn LlmClient>,
    strict_arity: bool,
}

impl AnalysisClient {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            strict_arity: false,
        }
    }

    /// Gemini-backed client. Fails fast when the credential is missing.
    pub fn from_settings(settings: &Settings) -> Result<Self, AnalysisError> {
        let gemini = GeminiClient::from_settings(settings)?;
        Ok(Self::new(Arc::new(gemini)).with_strict_arity(settings.strict_arity))
    }

    /// Treat recommendation/spec/con count mismatches as parse failures.
    pub fn with_strict_arity(mut self, strict: bool) -> Self {
        self.strict_arity = strict;
        self
    }

    pub fn provider(&self) -> Provider {
        self.llm.provider()
    }

    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        request.validate()?;

        let built = prompt::build(request);
        let input = GenerateInput {
            prompt: built.prompt,
            response_schema: built.schema,
            web_search: true,
        };

        tracing::info!(
            provider = self.llm.provider().as_str(),
            category = %request.category,
            budget = %request.budget,
            language = %request.language,
            "requesting product analysis"
        );

        let text = self.llm.generate_content(input).await?;

        let result = json::parse_result(&text).inspect_err(|err| {
            if let AnalysisError::Parse { detail } = err {
                tracing::error!(error = %detail, raw_output = %text, "failed to parse model response");
            }
        })?;

        if let Err(violation) = result.check_arity() {
            if self.strict_arity {
                tracing::error!(error = %violation, "model response violates expected arity");
                return Err(AnalysisError::Parse {
                    detail: violation.to_string(),
                });
            }
            tracing::warn!(error = %violation, "model response arity differs from prompt; keeping as-is");
        }

        tracing::info!(
            recommendations = result.recommendations.len(),
            "product analysis completed"
        );
        Ok(result)
    }
}

impl std::fmt::Debug for AnalysisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisClient")
            .field("provider", &self.llm.provider())
            .field("strict_arity", &self.strict_arity)
            .finish()
    }
}
