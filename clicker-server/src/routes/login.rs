//! `/api/login/*` and `/api/logout` routes: the login view and its actions.

use tracing::warn;

use crate::app::App;
use crate::auth::{unix_now, AuthProvider, Session};
use crate::guard::Navigation;
use crate::login::{self, SIGNUP_SUCCESS_MESSAGE};
use crate::routes::util::{
    error_message, escape_html, get_param, is_checked, js_string, navigate, parse_form_body,
    parse_query, redirect_to_url, success_message,
};
use crate::session::export_session;
use crate::store::PlayerStore;

/// `localStorage` key holding the exported session for "remember me".
pub const SESSION_STORAGE_KEY: &str = "clicker-session";

// ── GET /api/login ─────────────────────────────────────────────────

/// Signed-in visitors are sent on; everyone else gets the form.
pub async fn handle_login_get<A, S>(app: &App<A, S>) -> String
where
    A: AuthProvider,
    S: PlayerStore,
{
    match login::existing_session_route(app).await {
        Some(next) => navigate(next),
        None => render_login_panel("", ""),
    }
}

// ── POST /api/login/signup ─────────────────────────────────────────

/// Body: email={email}&password={password}
pub async fn handle_signup_post<A, S>(app: &App<A, S>, body: &str) -> String
where
    A: AuthProvider,
    S: PlayerStore,
{
    let params = parse_form_body(body);
    let email = get_param(&params, "email").unwrap_or("");
    let password = get_param(&params, "password").unwrap_or("");

    match login::sign_up(app, email, password).await {
        Ok(()) => render_login_panel(&success_message(SIGNUP_SUCCESS_MESSAGE), email),
        Err(e) => render_login_panel(&error_message(&e.to_string()), email),
    }
}

// ── POST /api/login/password ───────────────────────────────────────

/// Body: email={email}&password={password}[&remember=on]
pub async fn handle_password_post<A, S>(app: &App<A, S>, body: &str) -> String
where
    A: AuthProvider,
    S: PlayerStore,
{
    let params = parse_form_body(body);
    let email = get_param(&params, "email").unwrap_or("");
    let password = get_param(&params, "password").unwrap_or("");
    let remember = is_checked(&params, "remember");

    match login::sign_in_with_password(app, email, password).await {
        Ok((session, next)) => signed_in(&session, next, remember),
        Err(e) => render_login_panel(&error_message(&e.to_string()), email),
    }
}

// ── GET /api/login/oauth ───────────────────────────────────────────

/// Handle GET /api/login/oauth?provider={name}
/// Sends the browser to the provider's authorize page.
pub fn handle_oauth_get<A, S>(app: &App<A, S>, query: &str) -> String
where
    A: AuthProvider,
    S: PlayerStore,
{
    let params = parse_query(query);
    match login::oauth_url(app, get_param(&params, "provider")) {
        Ok(url) => redirect_to_url(&url),
        Err(e) => render_login_panel(&error_message(&e.to_string()), ""),
    }
}

// ── POST /api/login/callback ───────────────────────────────────────

/// Body: access_token={token}&refresh_token={token}[&expires_at={unix}|&expires_in={secs}][&remember=on]
/// Posted by the OAuth callback page with the values from the URL fragment.
pub async fn handle_callback_post<A, S>(app: &App<A, S>, body: &str) -> String
where
    A: AuthProvider,
    S: PlayerStore,
{
    let params = parse_form_body(body);
    let access_token = get_param(&params, "access_token").unwrap_or("");
    let refresh_token = get_param(&params, "refresh_token").unwrap_or("");
    if access_token.is_empty() {
        return render_login_panel(&error_message("Missing access token"), "");
    }
    let remember = is_checked(&params, "remember");

    match login::finish_oauth(app, access_token, refresh_token, callback_expiry(&params)).await {
        Ok((session, next)) => signed_in(&session, next, remember),
        Err(e) => render_login_panel(&error_message(&e.to_string()), ""),
    }
}

/// Expiry from the redirect fragment: `expires_at` when present, otherwise
/// `expires_in` counted from now.
fn callback_expiry(params: &[(String, String)]) -> Option<i64> {
    let number = |key: &str| get_param(params, key).and_then(|v| v.trim().parse::<i64>().ok());
    number("expires_at").or_else(|| number("expires_in").map(|secs| unix_now() + secs))
}

// ── POST /api/logout ───────────────────────────────────────────────

pub async fn handle_logout_post<A, S>(app: &App<A, S>) -> String
where
    A: AuthProvider,
    S: PlayerStore,
{
    login::sign_out(app).await;
    format!(
        "<script>localStorage.removeItem({});</script>{}",
        js_string(SESSION_STORAGE_KEY),
        navigate(Navigation::Login)
    )
}

/// Fragment sent after a successful sign-in: optionally remember the
/// session, then move on.
fn signed_in(session: &Session, next: Navigation, remember: bool) -> String {
    let mut html = String::new();
    if remember {
        match export_session(session) {
            Ok(blob) => html.push_str(&remember_script(&blob)),
            Err(e) => warn!("could not export session: {}", e),
        }
    }
    html.push_str(&navigate(next));
    html
}

fn remember_script(blob: &str) -> String {
    format!(
        "<script>localStorage.setItem({}, {});</script>",
        js_string(SESSION_STORAGE_KEY),
        js_string(blob)
    )
}

// ── Panel rendering ────────────────────────────────────────────────

/// Render the login card. `message` is a pre-rendered fragment.
fn render_login_panel(message: &str, email: &str) -> String {
    let mut html = String::with_capacity(2048);
    html.push_str(r#"<div id="login-panel" class="w-full max-w-md p-8 bg-white shadow-lg rounded-lg">"#);
    html.push_str(r#"<h1 class="text-3xl font-bold text-center mb-8 text-gray-800">Welcome Back</h1>"#);
    html.push_str(message);
    html.push_str(r##"<form id="login-form" hx-target="#login-panel" hx-swap="outerHTML">"##);

    html.push_str(r#"<div class="mb-6"><label class="block mb-2 text-gray-600" for="login-email">Email</label>"#);
    html.push_str(&format!(
        r#"<input id="login-email" type="email" name="email" value="{}" class="w-full px-4 py-2 border border-gray-300 rounded-md" placeholder="Enter your email"></div>"#,
        escape_html(email)
    ));

    html.push_str(r#"<div class="mb-6"><label class="block mb-2 text-gray-600" for="login-password">Password</label>"#);
    html.push_str(
        r#"<input id="login-password" type="password" name="password" class="w-full px-4 py-2 border border-gray-300 rounded-md" placeholder="Enter your password"></div>"#,
    );

    html.push_str(
        r#"<div class="mb-6 flex items-center"><input id="login-remember" type="checkbox" name="remember" class="mr-2"><label class="text-gray-600" for="login-remember">Remember Me</label></div>"#,
    );

    html.push_str(
        r##"<button type="button" hx-post="/api/login/signup" hx-include="#login-form" class="w-full bg-green-500 text-white py-2 rounded-md hover:bg-green-600 transition mb-4">Sign Up</button>"##,
    );
    html.push_str(
        r#"<button type="submit" hx-post="/api/login/password" class="w-full bg-blue-500 text-white py-2 rounded-md hover:bg-blue-600 transition mb-4">Log In</button>"#,
    );
    html.push_str(
        r#"<button type="button" hx-get="/api/login/oauth" class="w-full bg-red-500 text-white py-2 rounded-md hover:bg-red-600 transition">Continue with Google</button>"#,
    );
    html.push_str("</form></div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{sign_in, test_app};
    use crate::session::import_session;
    use crate::store::PlayerPatch;
    use futures::executor::block_on;

    fn stored_blob(html: &str) -> Option<String> {
        let start = html.find("localStorage.setItem(")?;
        let rest = &html[start..];
        let value = rest.split(", \"").nth(1)?;
        Some(value.split('"').next()?.to_string())
    }

    #[test]
    fn login_get_renders_form() {
        let app = test_app();
        let html = block_on(handle_login_get(&app));
        assert!(html.contains("Welcome Back"));
        assert!(html.contains(r#"name="email""#));
        assert!(html.contains(r#"name="password""#));
        assert!(html.contains(r#"name="remember""#));
        assert!(html.contains("Sign Up"));
        assert!(html.contains("Log In"));
        assert!(html.contains("Continue with Google"));
        assert!(html.contains(r##"hx-target="#login-panel""##));
        assert!(html.contains(r##"hx-include="#login-form""##));
    }

    #[test]
    fn login_get_with_session_redirects() {
        let app = test_app();
        let id = sign_in(&app, "p@example.com");
        let html = block_on(handle_login_get(&app));
        assert!(html.contains(r#"assign("/choose-username")"#));

        block_on(app.store.upsert(&id, &PlayerPatch::username("ada"))).unwrap();
        let html = block_on(handle_login_get(&app));
        assert!(html.contains(r#"assign("/")"#));
    }

    #[test]
    fn signup_success_message() {
        let app = test_app();
        let html = block_on(handle_signup_post(
            &app,
            "email=p%40example.com&password=hunter22",
        ));
        assert!(html.contains(SIGNUP_SUCCESS_MESSAGE));
        assert!(html.contains(r#"value="p@example.com""#));
    }

    #[test]
    fn signup_error_shows_provider_message() {
        let app = test_app();
        let html = block_on(handle_signup_post(&app, "email=p%40example.com&password=abc"));
        assert!(html.contains("Password should be at least 6 characters."));
        assert!(html.contains("text-red-600"));
    }

    #[test]
    fn password_login_routes_and_remembers() {
        let app = test_app();
        block_on(login::sign_up(&app, "p@example.com", "hunter22")).unwrap();

        let html = block_on(handle_password_post(
            &app,
            "email=p%40example.com&password=hunter22&remember=on",
        ));
        assert!(html.contains(r#"assign("/choose-username")"#));
        let blob = stored_blob(&html).unwrap();
        let session = import_session(&blob).unwrap();
        assert_eq!(session.user.email.as_deref(), Some("p@example.com"));
    }

    #[test]
    fn password_login_without_remember_stores_nothing() {
        let app = test_app();
        block_on(login::sign_up(&app, "p@example.com", "hunter22")).unwrap();
        let html = block_on(handle_password_post(
            &app,
            "email=p%40example.com&password=hunter22",
        ));
        assert!(!html.contains("localStorage"));
        assert!(html.contains("window.location.assign"));
    }

    #[test]
    fn password_login_failure_keeps_form() {
        let app = test_app();
        let html = block_on(handle_password_post(&app, "email=p%40example.com&password=nope"));
        assert!(html.contains("Invalid login credentials"));
        assert!(html.contains("login-form"));
        assert!(block_on(app.auth.get_session()).unwrap().is_none());
    }

    #[test]
    fn oauth_get_redirects_to_provider() {
        let app = test_app();
        let html = handle_oauth_get(&app, "");
        assert!(html.contains("provider=google"));
        assert!(html.contains("window.location.assign"));
    }

    #[test]
    fn callback_installs_session() {
        let app = test_app();
        let (access, refresh) = app.auth.issue_oauth_tokens("g@example.com");
        let body = format!("access_token={access}&refresh_token={refresh}");
        let html = block_on(handle_callback_post(&app, &body));
        assert!(html.contains(r#"assign("/choose-username")"#));
        assert!(block_on(app.auth.get_session()).unwrap().is_some());
    }

    #[test]
    fn callback_keeps_token_expiry() {
        let app = test_app();
        let (access, refresh) = app.auth.issue_oauth_tokens("g@example.com");
        let expires_at = unix_now() + 3600;
        let body = format!("access_token={access}&refresh_token={refresh}&expires_at={expires_at}");
        block_on(handle_callback_post(&app, &body));
        let session = block_on(app.auth.get_session()).unwrap().unwrap();
        assert_eq!(session.expires_at, Some(expires_at));
    }

    #[test]
    fn callback_expiry_falls_back_to_expires_in() {
        let before = unix_now();
        let params = vec![("expires_in".to_string(), "3600".to_string())];
        let at = callback_expiry(&params).unwrap();
        assert!(at >= before + 3600 && at <= unix_now() + 3600);
        assert_eq!(callback_expiry(&[]), None);
        let junk = vec![("expires_at".to_string(), "soon".to_string())];
        assert_eq!(callback_expiry(&junk), None);
    }

    #[test]
    fn callback_rejects_bad_tokens() {
        let app = test_app();
        let html = block_on(handle_callback_post(&app, ""));
        assert!(html.contains("Missing access token"));
        let html = block_on(handle_callback_post(&app, "access_token=forged&refresh_token=x"));
        assert!(html.contains("Invalid JWT"));
    }

    #[test]
    fn logout_clears_everything() {
        let app = test_app();
        sign_in(&app, "p@example.com");
        block_on(app.mount_game()).unwrap();
        let html = block_on(handle_logout_post(&app));
        assert!(html.contains("localStorage.removeItem"));
        assert!(html.contains(r#"assign("/login")"#));
        assert!(app.controller().is_none());
        assert!(block_on(app.auth.get_session()).unwrap().is_none());
    }

    #[test]
    fn email_is_escaped() {
        let html = render_login_panel("", r#""><script>"#);
        assert!(!html.contains(r#""><script>"#));
        assert!(html.contains("&quot;&gt;&lt;script&gt;"));
    }
}
