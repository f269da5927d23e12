pub mod domain;
pub mod i18n;
pub mod llm;
pub mod ui;

pub mod config {
    use crate::llm::error::AnalysisError;
    use anyhow::Context;

    #[derive(Debug, Clone, Default)]
    pub struct Settings {
        pub gemini_api_key: Option<String>,
        pub gemini_base_url: Option<String>,
        pub gemini_model: Option<String>,
        pub gemini_timeout_secs: Option<u64>,
        pub strict_arity: bool,
        pub sentry_dsn: Option<String>,
        pub port: Option<u16>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                gemini_api_key: std::env::var("GEMINI_API_KEY").ok(),
                gemini_base_url: non_empty_var("GEMINI_BASE_URL"),
                gemini_model: non_empty_var("GEMINI_MODEL"),
                gemini_timeout_secs: non_empty_var("GEMINI_TIMEOUT_SECS")
                    .map(|s| s.parse::<u64>())
                    .transpose()
                    .context("GEMINI_TIMEOUT_SECS must be a whole number of seconds")?,
                strict_arity: non_empty_var("ANALYSIS_STRICT_ARITY")
                    .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                    .unwrap_or(false),
                sentry_dsn: non_empty_var("SENTRY_DSN"),
                port: non_empty_var("PORT")
                    .map(|s| s.parse::<u16>())
                    .transpose()
                    .context("PORT must be a valid port number")?,
            })
        }

        /// Blank keys count as missing so we never send an empty credential.
        pub fn require_gemini_api_key(&self) -> Result<&str, AnalysisError> {
            self.gemini_api_key
                .as_deref()
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .ok_or_else(|| AnalysisError::Configuration("GEMINI_API_KEY is required".to_string()))
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|s| !s.trim().is_empty())
    }

}
