use askama::Template;
use serde::Serialize;
use value_analyst_core::domain::{AnalysisResult, Language};
use value_analyst_core::i18n::Strings;
use value_analyst_core::ui::FormState;

/// Seconds between automatic page refreshes while an analysis is running.
pub const LOADING_REFRESH_SECS: u64 = 2;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    s: &'static Strings,
    lang: &'static str,
    category: String,
    budget: String,
    loading: bool,
    refresh_secs: u64,
    caption: &'static str,
    error: Option<String>,
    result: Option<ResultView>,
    show_empty: bool,
}

struct ResultView {
    overview: String,
    verdict: String,
    cards: Vec<CardView>,
}

struct CardView {
    rank: usize,
    name: String,
    price: String,
    why: String,
    specs: Vec<String>,
    cons: Vec<String>,
}

impl ResultView {
    fn from_result(result: &AnalysisResult) -> Self {
        Self {
            overview: result.category_overview.clone(),
            verdict: result.final_verdict.clone(),
            cards: result
                .ranked()
                .map(|(rank, rec)| CardView {
                    rank,
                    name: rec.name.clone(),
                    price: rec.price.clone(),
                    why: rec.why.clone(),
                    specs: rec.specs.clone(),
                    cons: rec.cons.clone(),
                })
                .collect(),
        }
    }
}

impl IndexTemplate {
    pub fn from_state(state: &FormState) -> Self {
        let result = state.result().map(ResultView::from_result);
        let loading = state.is_loading();
        Self {
            s: state.strings(),
            lang: state.language.code(),
            category: state.category.clone(),
            budget: state.budget.clone(),
            loading,
            refresh_secs: LOADING_REFRESH_SECS,
            caption: state.caption().unwrap_or_default(),
            error: state.error().map(str::to_string),
            show_empty: result.is_none() && !loading,
            result,
        }
    }
}

/// JSON view of the form state served at `/api/state`.
#[derive(Debug, Serialize)]
pub struct ApiState {
    pub phase: &'static str,
    pub category: String,
    pub budget: String,
    pub language: Language,
    pub caption: Option<&'static str>,
    pub result: Option<AnalysisResult>,
    pub error: Option<String>,
    pub active_tickers: usize,
}

impl ApiState {
    pub fn from_state(state: &FormState, active_tickers: usize) -> Self {
        Self {
            phase: state.phase().name(),
            category: state.category.clone(),
            budget: state.budget.clone(),
            language: state.language,
            caption: state.caption(),
            result: state.result().cloned(),
            error: state.error().map(str::to_string),
            active_tickers,
        }
    }
}
