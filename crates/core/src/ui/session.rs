use crate::domain::{AnalysisRequest, Language};
use crate::llm::error::AnalysisError;
use crate::llm::AnalysisClient;
use crate::ui::state::{FormState, Phase, SubmitError};
use crate::ui::ticker::CaptionTicker;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use uuid::Uuid;

pub const DEFAULT_CAPTION_PERIOD: Duration = Duration::from_millis(3500);

/// Shared form state plus the submission lifecycle around it.
#[derive(Debug, Clone)]
pub struct Session {
    state: Arc<watch::Sender<FormState>>,
    active_tickers: Arc<AtomicUsize>,
    caption_period: Duration,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(FormState::default());
        Self {
            state: Arc::new(tx),
            active_tickers: Arc::new(AtomicUsize::new(0)),
            caption_period: DEFAULT_CAPTION_PERIOD,
        }
    }

    pub fn with_caption_period(mut self, period: Duration) -> Self {
        self.caption_period = period;
        self
    }

    pub fn snapshot(&self) -> FormState {
        self.state.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    pub fn subscribe(&self) -> watch::Receiver<FormState> {
        self.state.subscribe()
    }

    /// Caption tickers currently running; at most one per in-flight submission.
    pub fn active_tickers(&self) -> usize {
        self.active_tickers.load(Ordering::SeqCst)
    }

    /// Ignored while a submission is in flight.
    pub fn set_inputs(&self, category: impl Into<String>, budget: impl Into<String>) -> bool {
        let (category, budget) = (category.into(), budget.into());
        self.state.send_if_modified(|s| s.set_inputs(category, budget))
    }

    pub fn set_language(&self, language: Language) {
        self.state.send_if_modified(|s| s.set_language(language));
    }

    /// Enters `Loading` and starts the caption ticker. Must be called from
    /// within a tokio runtime.
    pub fn begin(&self) -> Result<Submission, SubmitError> {
        let mut begun = None;
        self.state.send_if_modified(|s| match s.begin_submission() {
            Ok(started) => {
                begun = Some(Ok(started));
                true
            }
            Err(err) => {
                begun = Some(Err(err));
                false
            }
        });
        let (id, request) = begun.unwrap_or(Err(SubmitError::Busy))?;

        let state = self.state.clone();
        let ticker = CaptionTicker::spawn(self.caption_period, self.active_tickers.clone(), move || {
            state.send_if_modified(|s| s.advance_caption(id));
        });

        tracing::info!(
            submission_id = %id,
            category = %request.category,
            budget = %request.budget,
            language = %request.language,
            "submission started"
        );

        Ok(Submission {
            id,
            request,
            state: self.state.clone(),
            ticker: Some(ticker),
        })
    }

    /// Begins and runs a submission to completion.
    pub async fn submit(&self, client: &AnalysisClient) -> Result<Phase, SubmitError> {
        let submission = self.begin()?;
        Ok(submission.run(client).await)
    }
}

/// One in-flight analysis. Resolving it stops its caption ticker; dropping
/// it unresolved moves the form to a generic error.
#[derive(Debug)]
pub struct Submission {
    id: Uuid,
    request: AnalysisRequest,
    state: Arc<watch::Sender<FormState>>,
    ticker: Option<CaptionTicker>,
}

impl Submission {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn request(&self) -> &AnalysisRequest {
        &self.request
    }

    pub async fn run(self, client: &AnalysisClient) -> Phase {
        let outcome = client.analyze(&self.request).await;
        self.finish(outcome).await
    }

    /// Resolves without calling the model, e.g. when no client could be built.
    pub async fn fail(self, err: AnalysisError) -> Phase {
        self.finish(Err(err)).await
    }

    async fn finish(
        mut self,
        outcome: Result<crate::domain::AnalysisResult, AnalysisError>,
    ) -> Phase {
        if let Some(ticker) = self.ticker.take() {
            ticker.stop().await;
        }

        match &outcome {
            Ok(result) => tracing::info!(
                submission_id = %self.id,
                recommendations = result.recommendations.len(),
                "submission resolved"
            ),
            Err(err) => tracing::warn!(
                submission_id = %self.id,
                kind = err.kind(),
                error = %err,
                "submission failed"
            ),
        }

        let id = self.id;
        self.state.send_if_modified(|s| s.resolve(id, outcome));
        let phase = self.state.borrow().phase().clone();
        phase
    }
}

impl Drop for Submission {
    fn drop(&mut self) {
        // `ticker` is only still present when the submission never resolved.
        if self.ticker.is_some() {
            let id = self.id;
            if self.state.send_if_modified(|s| s.abandon(id)) {
                tracing::warn!(submission_id = %id, "submission dropped before resolving");
            }
        }
    }
}
