use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use uuid::Uuid;

use value_analyst_core::ui::Session;

use crate::app::AppState;

pub const SESSION_COOKIE: &str = "va_session";

/// Idle sessions are forgotten after this long without a request.
pub const SESSION_IDLE_TTL: Duration = Duration::from_secs(60 * 60);

/// One form session per browser, keyed by the session cookie.
#[derive(Debug, Clone, Default)]
pub struct Sessions {
    inner: Arc<Mutex<HashMap<Uuid, Entry>>>,
}

#[derive(Debug)]
struct Entry {
    session: Session,
    last_seen: Instant,
}

impl Sessions {
    /// Returns the visitor's session, or a fresh one when the cookie is
    /// missing or unknown (e.g. after a restart).
    pub fn visit(&self, id: Option<Uuid>) -> Visitor {
        self.visit_at(id, Instant::now())
    }

    fn visit_at(&self, id: Option<Uuid>, now: Instant) -> Visitor {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(id) = id {
            if let Some(entry) = map.get_mut(&id) {
                entry.last_seen = now;
                return Visitor {
                    id,
                    session: entry.session.clone(),
                    fresh: false,
                };
            }
        }

        let before = map.len();
        map.retain(|_, e| {
            e.session.is_loading() || now.saturating_duration_since(e.last_seen) < SESSION_IDLE_TTL
        });
        if map.len() < before {
            tracing::debug!(evicted = before - map.len(), "evicted idle sessions");
        }

        let id = Uuid::new_v4();
        let session = Session::new();
        map.insert(
            id,
            Entry {
                session: session.clone(),
                last_seen: now,
            },
        );
        tracing::debug!(session_id = %id, sessions = map.len(), "new visitor session");

        Visitor {
            id,
            session,
            fresh: true,
        }
    }

    #[cfg(test)]
    pub fn get(&self, id: Uuid) -> Option<Session> {
        let map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.get(&id).map(|e| e.session.clone())
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// The requesting browser's session.
#[derive(Debug, Clone)]
pub struct Visitor {
    pub id: Uuid,
    pub session: Session,
    fresh: bool,
}

impl Visitor {
    /// Adds `Set-Cookie` when the session was created by this request.
    pub fn respond(&self, res: impl IntoResponse) -> Response {
        let mut res = res.into_response();
        if self.fresh {
            let cookie = format!("{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax", self.id);
            match HeaderValue::from_str(&cookie) {
                Ok(value) => {
                    res.headers_mut().append(header::SET_COOKIE, value);
                }
                Err(e) => tracing::error!(error = %e, "invalid session cookie"),
            }
        }
        res
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for Visitor {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(state.sessions.visit(session_cookie(&parts.headers)))
    }
}

fn session_cookie(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_session_id_among_other_cookies() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {SESSION_COOKIE}={id}; lang=my")).unwrap(),
        );
        assert_eq!(session_cookie(&headers), Some(id));

        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("va_session=not-a-uuid"),
        );
        assert_eq!(session_cookie(&headers), None);
        assert_eq!(session_cookie(&HeaderMap::new()), None);
    }

    #[test]
    fn known_cookie_returns_same_session() {
        let sessions = Sessions::default();
        let first = sessions.visit(None);
        assert!(first.fresh);

        first.session.set_inputs("Tents", "$200");
        let again = sessions.visit(Some(first.id));
        assert!(!again.fresh);
        assert_eq!(again.id, first.id);
        assert_eq!(again.session.snapshot().category, "Tents");
        assert_eq!(sessions.len(), 1);
    }

    #[test]
    fn unknown_cookie_gets_a_new_session() {
        let sessions = Sessions::default();
        let stale = Uuid::new_v4();
        let visitor = sessions.visit(Some(stale));
        assert!(visitor.fresh);
        assert_ne!(visitor.id, stale);
        assert!(sessions.get(visitor.id).is_some());
    }

    #[test]
    fn fresh_visitor_gets_cookie_returning_one_does_not() {
        let sessions = Sessions::default();
        let visitor = sessions.visit(None);
        let res = visitor.respond("ok");
        let cookie = res.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with(&format!("{SESSION_COOKIE}={}", visitor.id)));
        assert!(cookie.contains("HttpOnly"));

        let res = sessions.visit(Some(visitor.id)).respond("ok");
        assert!(res.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn idle_sessions_are_evicted_but_loading_ones_kept() {
        let sessions = Sessions::default();
        let start = Instant::now();

        let idle = sessions.visit_at(None, start);
        let busy = sessions.visit_at(None, start);
        busy.session.set_inputs("Tents", "$200");
        let submission = busy.session.begin().unwrap();

        let later = start + SESSION_IDLE_TTL + Duration::from_secs(1);
        let newcomer = sessions.visit_at(None, later);

        assert!(sessions.get(idle.id).is_none());
        assert!(sessions.get(busy.id).is_some());
        assert!(sessions.get(newcomer.id).is_some());
        assert_eq!(sessions.len(), 2);
        drop(submission);
    }
}
