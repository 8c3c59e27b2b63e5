//! `/api/username` routes: the username chooser shown after first login.

use crate::app::App;
use crate::auth::AuthProvider;
use crate::error::Error;
use crate::guard::Navigation;
use crate::routes::util::{
    error_message, escape_html, get_param, navigate, navigate_after, parse_form_body,
    success_message,
};
use crate::store::PlayerStore;
use crate::username::{NO_SESSION_MESSAGE, SAVED_MESSAGE, submit_username};

// ── GET /api/username ──────────────────────────────────────────────

/// Mounts the guarded username view.
pub async fn handle_username_get<A, S>(app: &App<A, S>) -> String
where
    A: AuthProvider,
    S: PlayerStore,
{
    if !app.mount_username().await {
        return navigate(Navigation::Login);
    }
    render_username_panel("", "")
}

// ── POST /api/username ─────────────────────────────────────────────

/// Body: username={name}
pub async fn handle_username_post<A, S>(app: &App<A, S>, body: &str) -> String
where
    A: AuthProvider,
    S: PlayerStore,
{
    let params = parse_form_body(body);
    let username = get_param(&params, "username").unwrap_or("");

    match submit_username(&app.auth, &app.store, username).await {
        Ok(()) => {
            let mut html = render_username_panel(&success_message(SAVED_MESSAGE), username);
            html.push_str(&navigate_after(
                Navigation::Game,
                app.config.redirect_delay_ms,
            ));
            html
        }
        Err(Error::NoSession) => {
            let mut html = render_username_panel(&error_message(NO_SESSION_MESSAGE), username);
            html.push_str(&navigate(Navigation::Login));
            html
        }
        Err(e) => render_username_panel(&error_message(&e.to_string()), username),
    }
}

fn render_username_panel(message: &str, username: &str) -> String {
    let mut html = String::with_capacity(1024);
    html.push_str(r#"<div id="username-panel" class="w-full max-w-md p-8 bg-white shadow-lg rounded-lg">"#);
    html.push_str(r#"<h1 class="text-3xl font-bold text-center mb-6 text-gray-800">Choose a Username</h1>"#);
    html.push_str(message);
    html.push_str(
        r##"<form hx-post="/api/username" hx-target="#username-panel" hx-swap="outerHTML">"##,
    );
    html.push_str(r#"<div class="mb-6"><label class="block mb-2 text-gray-600" for="username-input">Username</label>"#);
    html.push_str(&format!(
        r#"<input id="username-input" type="text" name="username" value="{}" class="w-full px-4 py-2 border border-gray-300 rounded-md" placeholder="Enter your username"></div>"#,
        escape_html(username)
    ));
    html.push_str(
        r#"<button type="submit" class="w-full bg-blue-500 text-white py-2 rounded-md hover:bg-blue-600 transition">Save Username</button>"#,
    );
    html.push_str("</form></div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{sign_in, test_app};
    use crate::username::EMPTY_USERNAME_MESSAGE;
    use futures::executor::block_on;

    #[test]
    fn get_without_session_redirects_to_login() {
        let app = test_app();
        let html = block_on(handle_username_get(&app));
        assert_eq!(html, navigate(Navigation::Login));
    }

    #[test]
    fn get_renders_form_and_mounts_guard() {
        let app = test_app();
        sign_in(&app, "p@example.com");
        let html = block_on(handle_username_get(&app));
        assert!(html.contains("Choose a Username"));
        assert!(html.contains(r#"name="username""#));
        assert_eq!(app.auth.listener_count(), 1);
    }

    #[test]
    fn post_saves_and_redirects_after_delay() {
        let app = test_app();
        let id = sign_in(&app, "p@example.com");
        let html = block_on(handle_username_post(&app, "username=Ada+L"));
        assert!(html.contains(SAVED_MESSAGE));
        assert!(html.contains("setTimeout"));
        assert!(html.contains("2000"));
        assert_eq!(app.store.row(&id).unwrap().username.as_deref(), Some("Ada L"));
    }

    #[test]
    fn post_blank_username() {
        let app = test_app();
        sign_in(&app, "p@example.com");
        let html = block_on(handle_username_post(&app, "username=+++"));
        assert!(html.contains(EMPTY_USERNAME_MESSAGE));
        assert!(!html.contains("setTimeout"));
    }

    #[test]
    fn post_without_session() {
        let app = test_app();
        let html = block_on(handle_username_post(&app, "username=ada"));
        assert!(html.contains(NO_SESSION_MESSAGE));
        assert!(html.contains(r#"assign("/login")"#));
    }

    #[test]
    fn post_store_error_is_shown() {
        let app = test_app();
        sign_in(&app, "p@example.com");
        app.store.fail_writes("duplicate key value violates unique constraint");
        let html = block_on(handle_username_post(&app, "username=ada"));
        assert!(html.contains("duplicate key value violates unique constraint"));
        assert!(!html.contains("setTimeout"));
    }
}
