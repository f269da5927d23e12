use thiserror::Error;

/// Message shown to users whenever the model's answer cannot be parsed.
pub const PARSE_FAILURE_MESSAGE: &str = "Failed to analyze products. Please try again.";

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Missing or unusable credential/settings. Raised before any network call.
    #[error("{0}")]
    Configuration(String),

    /// `detail` already carries the HTTP status when there was a response.
    #[error("analysis request failed: {detail}")]
    Transport {
        status: Option<u16>,
        detail: String,
    },

    /// Payload empty or not the expected JSON. `detail` is for logs only.
    #[error("Failed to analyze products. Please try again.")]
    Parse { detail: String },

    #[error("{0}")]
    Input(&'static str),
}

impl AnalysisError {
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::Configuration(_) => "configuration",
            AnalysisError::Transport { .. } => "transport",
            AnalysisError::Parse { .. } => "parse",
            AnalysisError::Input(_) => "input",
        }
    }

    pub(crate) fn transport(err: reqwest::Error) -> Self {
        AnalysisError::Transport {
            status: err.status().map(|s| s.as_u16()),
            detail: err.to_string(),
        }
    }

    pub(crate) fn http_status(status: u16, message: &str) -> Self {
        AnalysisError::Transport {
            status: Some(status),
            detail: format!("status={status}: {message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_hides_diagnostics() {
        let err = AnalysisError::Parse {
            detail: "expected value at line 1 column 2".to_string(),
        };
        assert_eq!(err.to_string(), PARSE_FAILURE_MESSAGE);
        assert_eq!(err.kind(), "parse");
    }

    #[test]
    fn transport_error_mentions_status() {
        let err = AnalysisError::http_status(429, "Resource has been exhausted");
        let msg = err.to_string();
        assert!(msg.contains("status=429"));
        assert!(msg.contains("Resource has been exhausted"));
        assert_eq!(err.kind(), "transport");
    }
}
