use crate::domain::{AnalysisRequest, AnalysisResult, Language};
use crate::i18n::{self, Strings, CAPTION_COUNT};
use crate::llm::error::AnalysisError;
use thiserror::Error;
use uuid::Uuid;

pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Loading {
        submission_id: Uuid,
        step: usize,
    },
    Result(AnalysisResult),
    Error(String),
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Loading { .. } => "loading",
            Phase::Result(_) => "result",
            Phase::Error(_) => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("{0}")]
    Invalid(&'static str),
    #[error("an analysis is already in progress")]
    Busy,
}

/// Everything the form shows. Only [`FormState::begin_submission`] enters
/// `Loading`; only [`FormState::resolve`] leaves it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub category: String,
    pub budget: String,
    pub language: Language,
    phase: Phase,
}

impl FormState {
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading { .. })
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match &self.phase {
            Phase::Result(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn strings(&self) -> &'static Strings {
        i18n::strings(self.language)
    }

    /// Current progress caption, only while loading.
    pub fn caption(&self) -> Option<&'static str> {
        match self.phase {
            Phase::Loading { step, .. } => Some(self.strings().caption(step)),
            _ => None,
        }
    }

    /// Inputs are frozen while Loading so they always match the request in
    /// flight. Returns whether anything changed.
    pub fn set_inputs(&mut self, category: impl Into<String>, budget: impl Into<String>) -> bool {
        if self.is_loading() {
            return false;
        }
        let (category, budget) = (category.into(), budget.into());
        if self.category == category && self.budget == budget {
            return false;
        }
        self.category = category;
        self.budget = budget;
        true
    }

    pub fn set_language(&mut self, language: Language) -> bool {
        let changed = self.language != language;
        self.language = language;
        changed
    }

    /// Idle/Result/Error -> Loading. Clears any previous outcome.
    pub fn begin_submission(&mut self) -> Result<(Uuid, AnalysisRequest), SubmitError> {
        if self.is_loading() {
            return Err(SubmitError::Busy);
        }

        let request = AnalysisRequest {
            category: self.category.clone(),
            budget: self.budget.clone(),
            language: self.language,
        };
        request.validate().map_err(|err| match err {
            AnalysisError::Input(msg) => SubmitError::Invalid(msg),
            _ => SubmitError::Invalid("invalid request"),
        })?;

        let submission_id = Uuid::new_v4();
        self.phase = Phase::Loading {
            submission_id,
            step: 0,
        };
        Ok((submission_id, request))
    }

    /// Rotates the caption of the matching in-flight submission.
    pub fn advance_caption(&mut self, id: Uuid) -> bool {
        match &mut self.phase {
            Phase::Loading {
                submission_id,
                step,
            } if *submission_id == id => {
                *step = (*step + 1) % CAPTION_COUNT;
                true
            }
            _ => false,
        }
    }

    /// Loading -> Result | Error. Outcomes for any other submission are dropped.
    pub fn resolve(&mut self, id: Uuid, outcome: Result<AnalysisResult, AnalysisError>) -> bool {
        if !self.is_loading_submission(id) {
            tracing::debug!(submission_id = %id, "ignoring outcome of stale submission");
            return false;
        }

        self.phase = match outcome {
            Ok(result) => Phase::Result(result),
            Err(err) => Phase::Error(display_message(&err)),
        };
        true
    }

    /// Loading -> Error when a submission goes away without an outcome.
    pub fn abandon(&mut self, id: Uuid) -> bool {
        if !self.is_loading_submission(id) {
            return false;
        }
        self.phase = Phase::Error(UNEXPECTED_ERROR_MESSAGE.to_string());
        true
    }

    fn is_loading_submission(&self, id: Uuid) -> bool {
        matches!(self.phase, Phase::Loading { submission_id, .. } if submission_id == id)
    }
}

fn display_message(err: &AnalysisError) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        UNEXPECTED_ERROR_MESSAGE.to_string()
    } else {
        message
    }
}
