use crate::domain::AnalysisResult;
use crate::llm::error::AnalysisError;

/// The payload with one surrounding Markdown code fence removed, if present.
/// The fence may carry an info string (`json`) and may sit on a single line.
/// Anything outside the fence is left alone and will fail to parse.
pub fn unfenced(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = body.strip_suffix("```") else {
        return trimmed;
    };
    body.trim_start_matches(|c: char| c.is_ascii_alphanumeric()).trim()
}

/// Parses the model's text payload. The raw error stays in `detail`; the
/// displayed message is always the fixed user-facing one.
pub fn parse_result(text: &str) -> Result<AnalysisResult, AnalysisError> {
    if text.trim().is_empty() {
        return Err(AnalysisError::Parse {
            detail: "model returned an empty payload".to_string(),
        });
    }

    serde_json::from_str::<AnalysisResult>(unfenced(text)).map_err(|e| AnalysisError::Parse {
        detail: format!("model output is not valid JSON for the result schema: {e}"),
    })
}
