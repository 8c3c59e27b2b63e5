//! Session guard for the protected views (game, username).
//!
//! Mounting checks for a session and subscribes to auth-state changes for
//! as long as the guard lives. A sign-out while the view is mounted, or a
//! sign-in as a different user, leaves a pending navigation to the login
//! view, picked up by the next request.

use std::cell::Cell;
use std::rc::Rc;
use tracing::{debug, info, warn};

use crate::auth::{AuthEvent, AuthProvider, Session, Subscription};

/// Client-side views the worker can send the browser to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Login,
    ChooseUsername,
    Game,
}

impl Navigation {
    pub fn path(&self) -> &'static str {
        match self {
            Navigation::Login => "/login",
            Navigation::ChooseUsername => "/choose-username",
            Navigation::Game => "/",
        }
    }
}

pub struct SessionGuard {
    session: Session,
    pending: Rc<Cell<Option<Navigation>>>,
    _subscription: Subscription,
}

impl SessionGuard {
    /// `None` when there is no session (or the provider failed); the caller
    /// should navigate to the login view and render nothing else.
    pub async fn mount<A: AuthProvider>(auth: &A) -> Option<Self> {
        let session = match auth.get_session().await {
            Ok(Some(session)) => session,
            Ok(None) => {
                debug!("no session, redirecting to login");
                return None;
            }
            Err(e) => {
                warn!("session check failed: {}", e);
                return None;
            }
        };

        let pending = Rc::new(Cell::new(None));
        let on_change = pending.clone();
        let mounted_user = session.user_id().to_string();
        let subscription = auth.on_auth_state_change(Box::new(
            move |event: AuthEvent, current: Option<&Session>| match event {
                AuthEvent::SignedOut => on_change.set(Some(Navigation::Login)),
                AuthEvent::TokenRefreshed => info!("Token refreshed successfully"),
                AuthEvent::SignedIn => {
                    if current.is_some_and(|s| s.user_id() != mounted_user) {
                        debug!("{} left by a sign-in as another user", mounted_user);
                        on_change.set(Some(Navigation::Login));
                    }
                }
            },
        ));

        Some(Self {
            session,
            pending,
            _subscription: subscription,
        })
    }

    pub fn user_id(&self) -> &str {
        self.session.user_id()
    }

    /// Take the navigation requested by an auth-state change, if any.
    pub fn take_navigation(&self) -> Option<Navigation> {
        self.pending.take()
    }
}
