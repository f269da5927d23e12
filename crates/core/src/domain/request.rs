use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output language requested from the model. English is the primary locale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "my")]
    Myanmar,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::English, Language::Myanmar];

    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Myanmar => "my",
        }
    }

    /// Name used inside the prompt's language directive.
    pub fn prompt_name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Myanmar => "Myanmar (Burmese)",
        }
    }

    pub fn is_secondary(self) -> bool {
        matches!(self, Language::Myanmar)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::English),
            "my" => Ok(Language::Myanmar),
            other => Err(format!("unsupported language: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub category: String,
    pub budget: String,
    #[serde(default)]
    pub language: Language,
}

impl AnalysisRequest {
    /// Rejects blank category or budget. Values are kept verbatim otherwise.
    pub fn try_new(
        category: impl Into<String>,
        budget: impl Into<String>,
        language: Language,
    ) -> Result<Self, crate::llm::error::AnalysisError> {
        let request = Self {
            category: category.into(),
            budget: budget.into(),
            language,
        };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), crate::llm::error::AnalysisError> {
        use crate::llm::error::AnalysisError;

        if self.category.trim().is_empty() {
            return Err(AnalysisError::Input("category must be non-empty"));
        }
        if self.budget.trim().is_empty() {
            return Err(AnalysisError::Input("budget must be non-empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_codes_round_trip_through_serde() {
        let v = serde_json::to_value(Language::Myanmar).unwrap();
        assert_eq!(v, serde_json::json!("my"));
        let back: Language = serde_json::from_value(serde_json::json!("en")).unwrap();
        assert_eq!(back, Language::English);
        assert_eq!("MY".parse::<Language>().unwrap(), Language::Myanmar);
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn request_defaults_to_primary_language() {
        let req: AnalysisRequest =
            serde_json::from_str(r#"{"category":"Laptops","budget":"$800"}"#).unwrap();
        assert_eq!(req.language, Language::English);
        assert!(!req.language.is_secondary());
    }

    #[test]
    fn rejects_blank_inputs() {
        assert!(AnalysisRequest::try_new("", "$100", Language::English).is_err());
        assert!(AnalysisRequest::try_new("Mice", "   ", Language::English).is_err());
        let ok = AnalysisRequest::try_new(" Mice ", "$100", Language::Myanmar).unwrap();
        assert_eq!(ok.category, " Mice ");
    }
}
