use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use value_analyst_core::domain::{AnalysisRequest, AnalysisResult, Language};
use value_analyst_core::llm::error::AnalysisError;
use value_analyst_core::llm::AnalysisClient;
use value_analyst_core::ui::{SubmitError, Submission};

use crate::sessions::{Sessions, Visitor};
use crate::views::{ApiState, IndexTemplate};

#[derive(Debug, Clone)]
pub struct AppState {
    pub sessions: Sessions,
    /// `Err` holds the configuration message when the server runs degraded.
    pub client: Result<AnalysisClient, String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/analyze", post(submit_form))
        .route("/language", post(set_language))
        .route("/healthz", get(healthz))
        .route("/api/state", get(get_state))
        .route("/api/analyze", post(analyze_json))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

async fn index(visitor: Visitor) -> Response {
    let template = IndexTemplate::from_state(&visitor.session.snapshot());
    let res = match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!(session_id = %visitor.id, error = %e, "failed to render index page");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    };
    visitor.respond(res)
}

#[derive(Debug, Deserialize)]
struct AnalyzeForm {
    #[serde(default)]
    category: String,
    #[serde(default)]
    budget: String,
}

async fn submit_form(
    State(state): State<AppState>,
    visitor: Visitor,
    Form(form): Form<AnalyzeForm>,
) -> Response {
    let session = &visitor.session;
    if session.is_loading() {
        tracing::info!(session_id = %visitor.id, "submission ignored; an analysis is already running");
        return visitor.respond(Redirect::to("/"));
    }

    session.set_inputs(form.category, form.budget);
    match session.begin() {
        Ok(submission) => spawn_submission(&state, submission),
        Err(SubmitError::Invalid(reason)) => {
            tracing::info!(session_id = %visitor.id, reason, "submission rejected");
        }
        Err(SubmitError::Busy) => {
            tracing::info!(session_id = %visitor.id, "submission ignored; an analysis is already running");
        }
    }

    visitor.respond(Redirect::to("/"))
}

fn spawn_submission(state: &AppState, submission: Submission) {
    match state.client.clone() {
        Ok(client) => {
            tokio::spawn(async move {
                submission.run(&client).await;
            });
        }
        Err(message) => {
            tokio::spawn(async move {
                submission.fail(AnalysisError::Configuration(message)).await;
            });
        }
    }
}

#[derive(Debug, Deserialize)]
struct LanguageForm {
    language: Language,
}

async fn set_language(visitor: Visitor, Form(form): Form<LanguageForm>) -> Response {
    visitor.session.set_language(form.language);
    visitor.respond(Redirect::to("/"))
}

async fn get_state(visitor: Visitor) -> Response {
    let view = ApiState::from_state(&visitor.session.snapshot(), visitor.session.active_tickers());
    visitor.respond(Json(view))
}

#[derive(Debug, Serialize)]
struct ApiAnalysis {
    analysis_id: Uuid,
    provider: &'static str,
    analyzed_at: DateTime<Utc>,
    result: AnalysisResult,
}

#[derive(Debug, Serialize)]
struct ApiError {
    kind: &'static str,
    error: String,
}

async fn analyze_json(
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<ApiAnalysis>, (StatusCode, Json<ApiError>)> {
    let client = state
        .client
        .as_ref()
        .map_err(|message| error_response(AnalysisError::Configuration(message.clone())))?;

    let analysis_id = Uuid::new_v4();
    let result = client.analyze(&request).await.map_err(|err| {
        tracing::warn!(%analysis_id, kind = err.kind(), error = %err, "api analysis failed");
        error_response(err)
    })?;

    Ok(Json(ApiAnalysis {
        analysis_id,
        provider: client.provider().as_str(),
        analyzed_at: Utc::now(),
        result,
    }))
}

fn error_response(err: AnalysisError) -> (StatusCode, Json<ApiError>) {
    let status = match &err {
        AnalysisError::Input(_) => StatusCode::BAD_REQUEST,
        AnalysisError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        AnalysisError::Transport { .. } | AnalysisError::Parse { .. } => StatusCode::BAD_GATEWAY,
    };
    (
        status,
        Json(ApiError {
            kind: err.kind(),
            error: err.to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sessions::SESSION_COOKIE;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, HeaderValue, Request};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;
    use value_analyst_core::llm::{GenerateInput, LlmClient, Provider};
    use value_analyst_core::ui::{FormState, Session};

    const REPLY: &str = r#"{"categoryOverview":"x","recommendations":[{"name":"A","price":"$10","why":"w","specs":["s1"],"cons":["c1"]}],"finalVerdict":"v"}"#;

    struct CannedLlm {
        reply: Result<&'static str, u16>,
        delay: Duration,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl LlmClient for CannedLlm {
        fn provider(&self) -> Provider {
            Provider::Gemini
        }

        async fn generate_content(&self, _input: GenerateInput) -> Result<String, AnalysisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            match self.reply {
                Ok(text) => Ok(text.to_string()),
                Err(status) => Err(AnalysisError::Transport {
                    status: Some(status),
                    detail: format!("status={status}: quota exceeded"),
                }),
            }
        }
    }

    fn state_with(reply: Result<&'static str, u16>) -> (AppState, Arc<CannedLlm>) {
        slow_state_with(reply, Duration::ZERO)
    }

    fn slow_state_with(
        reply: Result<&'static str, u16>,
        delay: Duration,
    ) -> (AppState, Arc<CannedLlm>) {
        let llm = Arc::new(CannedLlm {
            reply,
            delay,
            calls: AtomicUsize::new(0),
        });
        let state = AppState {
            sessions: Sessions::default(),
            client: Ok(AnalysisClient::new(llm.clone())),
        };
        (state, llm)
    }

    fn form_post(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    /// `name=value` of the session cookie handed out by `res`.
    fn issued_cookie(res: &Response) -> String {
        let set = res.headers()[header::SET_COOKIE].to_str().unwrap();
        set.split(';').next().unwrap().to_string()
    }

    fn with_cookie(mut req: Request<Body>, cookie: &str) -> Request<Body> {
        req.headers_mut()
            .insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        req
    }

    fn session_for(sessions: &Sessions, cookie: &str) -> Session {
        let (name, value) = cookie.split_once('=').unwrap();
        assert_eq!(name, SESSION_COOKIE);
        sessions.get(value.parse().unwrap()).unwrap()
    }

    async fn body_string(res: Response) -> String {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn settled(session: &Session) -> FormState {
        let mut rx = session.subscribe();
        loop {
            let state = rx.borrow_and_update().clone();
            if !state.is_loading() {
                return state;
            }
            rx.changed().await.unwrap();
        }
    }

    #[tokio::test]
    async fn healthz_returns_ok() {
        let (state, _) = state_with(Ok(REPLY));
        let res = router(state).oneshot(get("/healthz")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_string(res).await, "ok");
    }

    #[tokio::test]
    async fn index_renders_form_and_issues_session_cookie() {
        let (state, _) = state_with(Ok(REPLY));
        let res = router(state).oneshot(get("/")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(issued_cookie(&res).starts_with(SESSION_COOKIE));
        let html = body_string(res).await;
        assert!(html.contains("name=\"category\""));
        assert!(html.contains("name=\"budget\""));
    }

    #[tokio::test]
    async fn empty_category_redirects_without_calling_model() {
        let (state, llm) = state_with(Ok(REPLY));
        let sessions = state.sessions.clone();
        let res = router(state)
            .oneshot(form_post("/analyze", "category=&budget=Under+%24150"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);

        let snapshot = session_for(&sessions, &issued_cookie(&res)).snapshot();
        assert_eq!(snapshot.phase().name(), "idle");
        assert_eq!(snapshot.budget, "Under $150");
    }

    #[tokio::test]
    async fn form_submission_runs_in_background_and_stores_result() {
        let (state, llm) = state_with(Ok(REPLY));
        let sessions = state.sessions.clone();
        let res = router(state)
            .oneshot(form_post(
                "/analyze",
                "category=Mechanical+Keyboards&budget=Under+%24150",
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()[header::LOCATION], "/");

        let session = session_for(&sessions, &issued_cookie(&res));
        let settled = settled(&session).await;
        assert_eq!(settled.result().unwrap().recommendations[0].name, "A");
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.active_tickers(), 0);
    }

    #[tokio::test]
    async fn visitors_keep_separate_forms() {
        let (state, _) = slow_state_with(Ok(REPLY), Duration::from_secs(3600));
        let sessions = state.sessions.clone();
        let app = router(state);

        let res = app
            .clone()
            .oneshot(form_post(
                "/analyze",
                "category=Mechanical+Keyboards&budget=Under+%24150",
            ))
            .await
            .unwrap();
        let first = issued_cookie(&res);

        let res = app
            .clone()
            .oneshot(form_post("/analyze", "category=Tents&budget=%24200"))
            .await
            .unwrap();
        let second = issued_cookie(&res);
        assert_ne!(first, second);

        let res = app
            .clone()
            .oneshot(with_cookie(form_post("/language", "language=my"), &second))
            .await
            .unwrap();
        assert!(res.headers().get(header::SET_COOKIE).is_none());

        // A resubmit from the first visitor while its analysis runs changes nothing.
        app.clone()
            .oneshot(with_cookie(
                form_post("/analyze", "category=Mice&budget=%2450"),
                &first,
            ))
            .await
            .unwrap();

        let a = session_for(&sessions, &first).snapshot();
        assert!(a.is_loading());
        assert_eq!(a.category, "Mechanical Keyboards");
        assert_eq!(a.budget, "Under $150");
        assert_eq!(a.language, Language::English);

        let b = session_for(&sessions, &second).snapshot();
        assert!(b.is_loading());
        assert_eq!(b.category, "Tents");
        assert_eq!(b.budget, "$200");
        assert_eq!(b.language, Language::Myanmar);

        let res = app
            .oneshot(with_cookie(get("/api/state"), &first))
            .await
            .unwrap();
        let v: serde_json::Value = serde_json::from_str(&body_string(res).await).unwrap();
        assert_eq!(v["phase"], "loading");
        assert_eq!(v["category"], "Mechanical Keyboards");
        assert_eq!(v["language"], "en");
        assert_eq!(sessions.len(), 2);
    }

    #[tokio::test]
    async fn degraded_mode_resolves_to_configuration_error() {
        let sessions = Sessions::default();
        let state = AppState {
            sessions: sessions.clone(),
            client: Err("GEMINI_API_KEY is required".to_string()),
        };
        let res = router(state)
            .oneshot(form_post("/analyze", "category=Tents&budget=%24200"))
            .await
            .unwrap();

        let session = session_for(&sessions, &issued_cookie(&res));
        let settled = settled(&session).await;
        assert_eq!(settled.error(), Some("GEMINI_API_KEY is required"));
    }

    #[tokio::test]
    async fn language_toggle_switches_labels() {
        let (state, _) = state_with(Ok(REPLY));
        let app = router(state);

        let res = app
            .clone()
            .oneshot(form_post("/language", "language=my"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        let cookie = issued_cookie(&res);

        let res = app
            .oneshot(with_cookie(get("/api/state"), &cookie))
            .await
            .unwrap();
        let v: serde_json::Value = serde_json::from_str(&body_string(res).await).unwrap();
        assert_eq!(v["language"], "my");
        assert_eq!(v["phase"], "idle");
    }

    #[tokio::test]
    async fn unknown_language_is_rejected() {
        let (state, _) = state_with(Ok(REPLY));
        let res = router(state)
            .oneshot(form_post("/language", "language=fr"))
            .await
            .unwrap();
        assert!(res.status().is_client_error());
    }

    #[tokio::test]
    async fn api_analyze_returns_result_envelope() {
        let (state, _) = state_with(Ok(REPLY));
        let res = router(state)
            .oneshot(json_post(
                "/api/analyze",
                serde_json::json!({"category": "Mechanical Keyboards", "budget": "Under $150", "language": "en"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let v: serde_json::Value = serde_json::from_str(&body_string(res).await).unwrap();
        assert_eq!(v["provider"], "gemini");
        assert_eq!(v["result"]["recommendations"][0]["name"], "A");
        assert!(v["analysis_id"].is_string());
    }

    #[tokio::test]
    async fn api_analyze_maps_error_kinds_to_status() {
        let (state, _) = state_with(Ok("{not json"));
        let res = router(state)
            .oneshot(json_post(
                "/api/analyze",
                serde_json::json!({"category": "Tents", "budget": "$200"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
        let v: serde_json::Value = serde_json::from_str(&body_string(res).await).unwrap();
        assert_eq!(v["kind"], "parse");
        assert_eq!(v["error"], "Failed to analyze products. Please try again.");

        let (state, _) = state_with(Err(429));
        let res = router(state)
            .oneshot(json_post(
                "/api/analyze",
                serde_json::json!({"category": "Tents", "budget": "$200"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);

        let (state, llm) = state_with(Ok(REPLY));
        let res = router(state)
            .oneshot(json_post(
                "/api/analyze",
                serde_json::json!({"category": "", "budget": "$200"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }
}
