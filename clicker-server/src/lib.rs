//! Clicker game in-browser WASM server.
//!
//! Exports `init(config_json)` and `handle_request(method, path, query, body)`
//! for the Service Worker bridge to call. Uses `matchit` for URL routing;
//! every route returns an HTML fragment for HTMX to swap in.
//!
//! With a `project_url` configured the worker talks to the hosted auth and
//! database REST APIs. Without one it runs fully in memory (offline play).

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{error, info};
use wasm_bindgen::prelude::*;

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod game;
pub mod guard;
pub mod http;
pub mod logging;
pub mod login;
pub mod routes;
pub mod session;
pub mod store;
pub mod username;

use app::App;
use auth::{AuthEvent, AuthProvider, MemoryAuth, RestAuth, Session, Subscription};
use config::Config;
use store::rest::AccessToken;
use store::{MemoryStore, RestStore};

/// The worker's application, wired to either the hosted collaborators or
/// in-memory ones.
enum Runtime {
    Online {
        app: App<RestAuth, RestStore>,
        _token_sync: Subscription,
    },
    Offline(App<MemoryAuth, MemoryStore>),
}

impl Runtime {
    fn build(config: Config) -> error::Result<Self> {
        let Some(url) = config.project_url()? else {
            info!("no project_url configured; running offline");
            return Ok(Runtime::Offline(App::new(
                MemoryAuth::new(),
                MemoryStore::new(),
                config,
            )));
        };
        let auth = RestAuth::new(url.clone(), &config.anon_key, config.redirect_to.clone());
        let store = RestStore::new(&url, &config.anon_key, &config.table)?;
        let token_sync = sync_access_token(&auth, store.access_token());
        info!("connected to {}", url);
        Ok(Runtime::Online {
            app: App::new(auth, store, config),
            _token_sync: token_sync,
        })
    }

    async fn dispatch(&self, method: &str, path: &str, query: &str, body: &str) -> String {
        match self {
            Runtime::Online { app, .. } => routes::dispatch(app, method, path, query, body).await,
            Runtime::Offline(app) => routes::dispatch(app, method, path, query, body).await,
        }
    }
}

/// Keep the store's bearer token in step with the auth session.
fn sync_access_token<A: AuthProvider>(auth: &A, token: AccessToken) -> Subscription {
    auth.on_auth_state_change(Box::new(move |event: AuthEvent, session: Option<&Session>| {
        let next = match event {
            AuthEvent::SignedIn | AuthEvent::TokenRefreshed => {
                session.map(|s| s.access_token.clone())
            }
            AuthEvent::SignedOut => None,
        };
        *token.borrow_mut() = next;
    }))
}

thread_local! {
    static RUNTIME: RefCell<Option<Rc<Runtime>>> = const { RefCell::new(None) };
}

/// The installed runtime, or an offline one with default config when the
/// worker never called `init`.
fn runtime() -> Rc<Runtime> {
    RUNTIME.with(|slot| {
        slot.borrow_mut()
            .get_or_insert_with(|| {
                Rc::new(Runtime::Offline(App::new(
                    MemoryAuth::new(),
                    MemoryStore::new(),
                    Config::default(),
                )))
            })
            .clone()
    })
}

/// Configure the worker. Returns `"ok"` or `"error: <message>"`.
///
/// Called once by the Service Worker with the JSON config before the first
/// request. Calling it again replaces the runtime (and its session).
#[wasm_bindgen]
pub fn init(config_json: &str) -> String {
    let config = match Config::from_json(config_json) {
        Ok(config) => config,
        Err(e) => return format!("error: {}", e),
    };
    logging::init(config.log_level());
    match Runtime::build(config) {
        Ok(runtime) => {
            RUNTIME.with(|slot| *slot.borrow_mut() = Some(Rc::new(runtime)));
            "ok".to_string()
        }
        Err(e) => {
            error!("init failed: {}", e);
            format!("error: {}", e)
        }
    }
}

/// Process an HTTP-like request and return an HTML fragment.
///
/// Called from JavaScript (Web Worker) via wasm-bindgen; resolves to a string.
///
/// # Arguments
/// * `method` - HTTP method (e.g., "GET", "POST")
/// * `path`   - URL path (e.g., "/api/game/click")
/// * `query`  - Query string (e.g., "?provider=google")
/// * `body`   - Request body (e.g., POST form data). Empty string for GET requests.
#[wasm_bindgen]
pub async fn handle_request(method: String, path: String, query: String, body: String) -> String {
    let runtime = runtime();
    runtime.dispatch(&method, &path, &query, &body).await
}
