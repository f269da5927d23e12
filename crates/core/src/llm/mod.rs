pub mod client;
pub mod error;
pub mod gemini;
pub mod json;
pub mod prompt;

use crate::llm::error::AnalysisError;
use crate::llm::prompt::SchemaDescriptor;

pub use client::AnalysisClient;

/// One structured-output call to a hosted model.
#[derive(Debug, Clone)]
pub struct GenerateInput {
    pub prompt: String,
    pub response_schema: SchemaDescriptor,
    /// Ground the answer with live web search.
    pub web_search: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gemini,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
        }
    }
}

#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    fn provider(&self) -> Provider;

    /// Returns the response's text payload, which may be empty.
    async fn generate_content(&self, input: GenerateInput) -> Result<String, AnalysisError>;
}
