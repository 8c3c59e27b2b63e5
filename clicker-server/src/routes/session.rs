//! `/api/session/*` routes: the worker's bridge between the auth session and
//! `localStorage`. Plain-text responses, not HTML.

use tracing::{info, warn};

use crate::app::App;
use crate::auth::AuthProvider;
use crate::routes::util::{get_param, parse_form_body};
use crate::session::{export_session, import_session};
use crate::store::PlayerStore;

// ── GET /api/session/export ────────────────────────────────────────

/// Returns the current session as a base64 string, or empty when signed out.
pub async fn handle_export_get<A, S>(app: &App<A, S>) -> String
where
    A: AuthProvider,
    S: PlayerStore,
{
    let session = match app.auth.get_session().await {
        Ok(Some(session)) => session,
        Ok(None) => return String::new(),
        Err(e) => {
            warn!("session export failed: {}", e);
            return String::new();
        }
    };
    export_session(&session).unwrap_or_else(|e| {
        warn!("session export failed: {}", e);
        String::new()
    })
}

// ── POST /api/session/restore ──────────────────────────────────────

/// Body: state={base64} or the raw base64 string.
/// Called by the worker on page load with the remembered session.
pub fn handle_restore_post<A, S>(app: &App<A, S>, body: &str) -> String
where
    A: AuthProvider,
    S: PlayerStore,
{
    let params = parse_form_body(body);
    let state_b64 = get_param(&params, "state").unwrap_or(body.trim());
    match import_session(state_b64) {
        Ok(session) => {
            info!("restored session for {}", session.user_id());
            app.auth.restore_session(session);
            "ok".to_string()
        }
        Err(e) => format!("error: {}", e),
    }
}

// ── POST /api/session/refresh ──────────────────────────────────────

pub async fn handle_refresh_post<A, S>(app: &App<A, S>) -> String
where
    A: AuthProvider,
    S: PlayerStore,
{
    match app.auth.refresh_session().await {
        Ok(_) => "ok".to_string(),
        Err(e) => format!("error: {}", e),
    }
}
