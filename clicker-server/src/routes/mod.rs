//! Request routing. Every handler returns an HTML fragment (or a plain-text
//! reply for the `/api/session/*` bridge).

pub mod game;
pub mod login;
pub mod nav;
pub mod session;
pub mod username;
pub mod util;

use tracing::debug;

use crate::app::App;
use crate::auth::AuthProvider;
use crate::store::PlayerStore;

/// Build the route table. matchit compiles route patterns into a radix tree;
/// the value is a tag matched on in `dispatch`.
fn router() -> matchit::Router<&'static str> {
    let mut router = matchit::Router::new();

    router.insert("/api/login", "login").ok();
    router.insert("/api/login/signup", "login_signup").ok();
    router.insert("/api/login/password", "login_password").ok();
    router.insert("/api/login/oauth", "login_oauth").ok();
    router.insert("/api/login/callback", "login_callback").ok();
    router.insert("/api/logout", "logout").ok();

    router.insert("/api/username", "username").ok();

    router.insert("/api/game", "game").ok();
    router.insert("/api/game/click", "game_click").ok();
    router.insert("/api/game/upgrade", "game_upgrade").ok();

    router.insert("/api/nav", "nav").ok();
    router.insert("/api/view/unmount", "view_unmount").ok();

    router.insert("/api/session/export", "session_export").ok();
    router.insert("/api/session/restore", "session_restore").ok();
    router.insert("/api/session/refresh", "session_refresh").ok();

    router
}

/// Route one request.
///
/// A navigation requested by an auth-state change (e.g. sign-out in
/// another tab) wins over whatever was asked for.
pub async fn dispatch<A, S>(app: &App<A, S>, method: &str, path: &str, query: &str, body: &str) -> String
where
    A: AuthProvider,
    S: PlayerStore,
{
    if let Some(next) = app.take_navigation() {
        debug!("{} {} preempted by navigation to {}", method, path, next.path());
        return util::navigate(next);
    }

    let router = router();
    let Ok(matched) = router.at(path) else {
        return not_found();
    };

    match (*matched.value, method) {
        ("login", "GET") => login::handle_login_get(app).await,
        ("login_signup", "POST") => login::handle_signup_post(app, body).await,
        ("login_password", "POST") => login::handle_password_post(app, body).await,
        ("login_oauth", "GET") => login::handle_oauth_get(app, query),
        ("login_callback", "POST") => login::handle_callback_post(app, body).await,
        ("logout", "POST") => login::handle_logout_post(app).await,

        ("username", "GET") => username::handle_username_get(app).await,
        ("username", "POST") => username::handle_username_post(app, body).await,

        ("game", "GET") => game::handle_game_get(app).await,
        ("game_click", "POST") => game::handle_click_post(app).await,
        ("game_upgrade", "POST") => game::handle_upgrade_post(app).await,

        ("nav", "GET") => nav::handle_nav_get(),
        ("view_unmount", "POST") => {
            app.unmount();
            String::new()
        }

        ("session_export", "GET") => session::handle_export_get(app).await,
        ("session_restore", "POST") => session::handle_restore_post(app, body),
        ("session_refresh", "POST") => session::handle_refresh_post(app).await,

        _ => method_not_allowed(),
    }
}

fn not_found() -> String {
    r#"<span class="text-red-600">404 — route not found</span>"#.to_string()
}

fn method_not_allowed() -> String {
    r#"<span class="text-red-600">405 — method not allowed</span>"#.to_string()
}
