//! `/api/game/*` routes: the guarded game view, clicks and upgrades.
//!
//! The view is mounted by `GET /api/game`. Click and upgrade act on the
//! mounted controller and re-render the panel; without one the browser is
//! sent back to login.

use std::rc::Rc;

use crate::app::App;
use crate::auth::AuthProvider;
use crate::game::GameController;
use crate::guard::Navigation;
use crate::routes::util::{escape_html, navigate};
use crate::store::PlayerStore;

// ── GET /api/game ──────────────────────────────────────────────────

pub async fn handle_game_get<A, S>(app: &App<A, S>) -> String
where
    A: AuthProvider,
    S: PlayerStore,
{
    match app.mount_game().await {
        Some(controller) => render_game(&controller),
        None => navigate(Navigation::Login),
    }
}

// ── POST /api/game/click ───────────────────────────────────────────

pub async fn handle_click_post<A, S>(app: &App<A, S>) -> String
where
    A: AuthProvider,
    S: PlayerStore,
{
    let Some(controller) = app.controller() else {
        return navigate(Navigation::Login);
    };
    controller.apply_click(&app.auth, &app.store).await;
    render_game_panel(&controller)
}

// ── POST /api/game/upgrade ─────────────────────────────────────────

/// Affordability is checked again here; the disabled button is only a hint.
pub async fn handle_upgrade_post<A, S>(app: &App<A, S>) -> String
where
    A: AuthProvider,
    S: PlayerStore,
{
    let Some(controller) = app.controller() else {
        return navigate(Navigation::Login);
    };
    controller.apply_upgrade(&app.auth, &app.store).await;
    render_game_panel(&controller)
}

// ── Rendering ──────────────────────────────────────────────────────

/// Full game view: header plus the swappable panel.
fn render_game(controller: &Rc<GameController>) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str(r#"<div class="min-h-screen bg-gradient-to-b from-gray-900 to-black text-white select-none">"#);
    html.push_str(r#"<header class="flex items-center justify-between px-6 py-4 border-b border-gray-700">"#);
    html.push_str(r#"<h1 class="text-2xl font-bold tracking-wide">Clicker Game</h1>"#);
    html.push_str(&format!(
        r#"<p class="text-lg text-gray-400">Welcome, {}</p>"#,
        escape_html(&controller.username())
    ));
    html.push_str("</header>");
    html.push_str(&render_game_panel(controller));
    html.push_str("</div>");
    html
}

/// Balance card, clicker area and upgrade button.
fn render_game_panel(controller: &GameController) -> String {
    let state = controller.state();
    let username = escape_html(&controller.username());
    let mut html = String::with_capacity(3072);

    html.push_str(r#"<div id="game-panel">"#);

    // Balance card
    html.push_str(r#"<div class="mt-6 mx-4 bg-gradient-to-br from-gray-800 via-gray-900 to-black rounded-2xl shadow-2xl p-16">"#);
    html.push_str(r#"<p class="text-lg text-gray-400">Balance:</p>"#);
    html.push_str(&format!(
        r#"<h2 class="text-5xl font-bold mt-2 text-white">${:.2}</h2>"#,
        state.balance
    ));
    html.push_str(r#"<div class="flex justify-between mt-4 text-md text-gray-400">"#);
    html.push_str(&format!("<p>Username: {}</p>", username));
    html.push_str(&format!("<p>Multiplier: {:.2}x</p>", state.multiplier));
    html.push_str("</div>");
    html.push_str(&format!(
        r#"<p class="mt-4 font-mono tracking-widest text-gray-300">{}</p>"#,
        escape_html(&controller.card_number())
    ));
    html.push_str("</div>");

    // Clicker area
    html.push_str(
        r##"<div hx-post="/api/game/click" hx-target="#game-panel" hx-swap="outerHTML" class="mt-10 mx-4 bg-gradient-to-b from-gray-700 to-gray-950 rounded-lg py-64 shadow-lg text-center cursor-pointer">"##,
    );
    html.push_str(r#"<img src="/clicker.png" alt="Clicker" width="200" height="200" class="mx-auto">"#);
    html.push_str("</div>");

    // Upgrade
    html.push_str(r#"<div class="mt-6 mx-4 bg-gradient-to-br from-gray-800 to-gray-700 rounded-lg p-6 shadow-lg">"#);
    html.push_str(r#"<h2 class="text-xl font-bold mb-4">Upgrade Your Multiplier</h2>"#);
    let (disabled, class) = if state.can_upgrade() {
        ("", "bg-gradient-to-r from-purple-500 to-indigo-600")
    } else {
        (" disabled", "bg-gray-600 cursor-not-allowed")
    };
    html.push_str(&format!(
        r##"<button hx-post="/api/game/upgrade" hx-target="#game-panel" hx-swap="outerHTML" class="w-full py-3 rounded-lg shadow-lg {}"{}>Spend ${} to Increase Multiplier</button>"##,
        class, disabled, state.upgrade_cost
    ));
    html.push_str("</div>");

    html.push_str("</div>");
    html
}
