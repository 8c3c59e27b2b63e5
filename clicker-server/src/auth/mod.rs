//! Auth collaborator: sessions, sign-in flows and auth-state notifications.
//!
//! `AuthProvider` is the seam the rest of the crate talks to. `RestAuth`
//! speaks the hosted provider's REST API; `MemoryAuth` keeps accounts in
//! process for offline play and tests. Both keep the current session in a
//! `SessionSlot`, which also owns the listener list behind
//! `on_auth_state_change`.

pub mod memory;
pub mod rest;

use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tracing::debug;

use crate::error::Result;

pub use memory::MemoryAuth;
pub use rest::RestAuth;

/// The authenticated user as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Proof of authentication issued by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix seconds, when the provider reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    pub user: User,
}

impl Session {
    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    /// True once `now` (Unix seconds) has reached `expires_at`. Sessions
    /// without an expiry never expire locally.
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Current time in Unix seconds.
#[cfg(target_arch = "wasm32")]
pub fn unix_now() -> i64 {
    (js_sys::Date::now() / 1000.0) as i64
}

/// Current time in Unix seconds.
#[cfg(not(target_arch = "wasm32"))]
pub fn unix_now() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Auth-state notifications delivered to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

impl AuthEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthEvent::SignedIn => "SIGNED_IN",
            AuthEvent::SignedOut => "SIGNED_OUT",
            AuthEvent::TokenRefreshed => "TOKEN_REFRESHED",
        }
    }
}

/// Callback invoked on every auth-state change. Listeners must not
/// subscribe or unsubscribe from inside the callback.
pub type Listener = Box<dyn Fn(AuthEvent, Option<&Session>)>;

#[allow(async_fn_in_trait)]
pub trait AuthProvider {
    /// Current session, if any. An expired session is refreshed first; one
    /// that cannot be refreshed is signed out.
    async fn get_session(&self) -> Result<Option<Session>>;

    /// Register an email/password account. Does not sign in.
    async fn sign_up(&self, email: &str, password: &str) -> Result<()>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session>;

    /// URL the browser must visit to start an OAuth sign-in.
    fn sign_in_with_oauth(&self, provider: &str) -> Result<String>;

    /// Finish an OAuth sign-in with the tokens the provider redirected back
    /// with. `expires_at` is Unix seconds, when the redirect carried it.
    async fn set_session(
        &self,
        access_token: &str,
        refresh_token: &str,
        expires_at: Option<i64>,
    ) -> Result<Session>;

    /// Install a previously exported session without contacting the provider.
    /// Listeners see it as `SignedIn`.
    fn restore_session(&self, session: Session);

    /// Exchange the refresh token for a fresh session.
    async fn refresh_session(&self) -> Result<Session>;

    async fn sign_out(&self) -> Result<()>;

    fn on_auth_state_change(&self, listener: Listener) -> Subscription;
}

/// Registered auth-state listeners.
#[derive(Default)]
pub struct Listeners {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(u64, Listener)>>,
}

impl Listeners {
    pub fn subscribe(self: &Rc<Self>, listener: Listener) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.entries.borrow_mut().push((id, listener));
        Subscription {
            listeners: Rc::downgrade(self),
            id,
        }
    }

    pub fn emit(&self, event: AuthEvent, session: Option<&Session>) {
        for (_, listener) in self.entries.borrow().iter() {
            listener(event, session);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn remove(&self, id: u64) {
        self.entries.borrow_mut().retain(|(entry, _)| *entry != id);
    }
}

/// Handle returned by `on_auth_state_change`; dropping it unsubscribes.
pub struct Subscription {
    listeners: Weak<Listeners>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.remove(self.id);
        }
    }
}

/// Current session plus its listeners, shared by both providers.
#[derive(Default)]
pub struct SessionSlot {
    session: RefCell<Option<Session>>,
    listeners: Rc<Listeners>,
}

impl SessionSlot {
    pub fn current(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    /// Store `session` and notify listeners with `event`.
    pub fn install(&self, session: Session, event: AuthEvent) {
        debug!("auth event {} for {}", event.as_str(), session.user_id());
        *self.session.borrow_mut() = Some(session.clone());
        self.listeners.emit(event, Some(&session));
    }

    /// Drop the session and notify listeners with `SignedOut`.
    pub fn clear(&self) {
        debug!("auth event {}", AuthEvent::SignedOut.as_str());
        self.session.borrow_mut().take();
        self.listeners.emit(AuthEvent::SignedOut, None);
    }

    pub fn subscribe(&self, listener: Listener) -> Subscription {
        self.listeners.subscribe(listener)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}
