//! In-process auth provider for offline play and tests.
//!
//! Mirrors the hosted provider's observable behavior: the same error
//! messages for bad credentials and duplicate sign-ups, OAuth sign-in via an
//! authorize URL followed by a token callback, and the same auth events.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use tracing::warn;

use super::{
    unix_now, AuthEvent, AuthProvider, Listener, Session, SessionSlot, Subscription, User,
};
use crate::error::{Error, Result};

const MIN_PASSWORD_LEN: usize = 6;

struct Account {
    password: String,
    user_id: String,
}

#[derive(Default)]
pub struct MemoryAuth {
    accounts: RefCell<HashMap<String, Account>>,
    /// Access token → user, for every token handed out.
    issued: RefCell<HashMap<String, User>>,
    next_id: Cell<u64>,
    /// When set, `get_session` fails with this message.
    outage: RefCell<Option<String>>,
    slot: SessionSlot,
}

impl MemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `get_session` fail until `clear_outage` is called.
    pub fn set_outage(&self, message: &str) {
        *self.outage.borrow_mut() = Some(message.to_string());
    }

    pub fn clear_outage(&self) {
        self.outage.borrow_mut().take();
    }

    /// Issue OAuth tokens for `email` the way the provider's redirect would,
    /// creating the account on first use. Returns `(access, refresh)`.
    pub fn issue_oauth_tokens(&self, email: &str) -> (String, String) {
        let user_id = self.user_id_for(email);
        let session = self.issue(&user_id, Some(email));
        (session.access_token, session.refresh_token)
    }

    pub fn listener_count(&self) -> usize {
        self.slot.listener_count()
    }

    fn fresh_id(&self, prefix: &str) -> String {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        format!("{prefix}-{id}")
    }

    fn user_id_for(&self, email: &str) -> String {
        if let Some(account) = self.accounts.borrow().get(email) {
            return account.user_id.clone();
        }
        let user_id = self.fresh_id("user");
        self.accounts.borrow_mut().insert(
            email.to_string(),
            Account {
                password: String::new(),
                user_id: user_id.clone(),
            },
        );
        user_id
    }

    fn issue(&self, user_id: &str, email: Option<&str>) -> Session {
        let user = User {
            id: user_id.to_string(),
            email: email.map(str::to_string),
        };
        let access_token = self.fresh_id("access");
        self.issued
            .borrow_mut()
            .insert(access_token.clone(), user.clone());
        Session {
            access_token,
            refresh_token: self.fresh_id("refresh"),
            expires_at: None,
            user,
        }
    }
}

impl AuthProvider for MemoryAuth {
    async fn get_session(&self) -> Result<Option<Session>> {
        if let Some(message) = self.outage.borrow().as_ref() {
            return Err(Error::Auth(message.clone()));
        }
        match self.slot.current() {
            Some(session) if session.is_expired(unix_now()) => match self.refresh_session().await {
                Ok(refreshed) => Ok(Some(refreshed)),
                Err(e) => {
                    warn!("expired session could not be refreshed: {}", e);
                    self.slot.clear();
                    Ok(None)
                }
            },
            current => Ok(current),
        }
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<()> {
        if email.trim().is_empty() {
            return Err(Error::Auth(
                "Anonymous sign-ins are disabled".to_string(),
            ));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(Error::Auth(format!(
                "Password should be at least {MIN_PASSWORD_LEN} characters."
            )));
        }
        if self.accounts.borrow().contains_key(email) {
            return Err(Error::Auth("User already registered".to_string()));
        }
        let user_id = self.fresh_id("user");
        self.accounts.borrow_mut().insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                user_id,
            },
        );
        Ok(())
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        let user_id = match self.accounts.borrow().get(email) {
            Some(account) if !account.password.is_empty() && account.password == password => {
                account.user_id.clone()
            }
            _ => return Err(Error::Auth("Invalid login credentials".to_string())),
        };
        let session = self.issue(&user_id, Some(email));
        self.slot.install(session.clone(), AuthEvent::SignedIn);
        Ok(session)
    }

    fn sign_in_with_oauth(&self, provider: &str) -> Result<String> {
        if provider.trim().is_empty() {
            return Err(Error::Auth("Unsupported provider: missing name".to_string()));
        }
        Ok(format!("/login/oauth?provider={provider}"))
    }

    async fn set_session(
        &self,
        access_token: &str,
        refresh_token: &str,
        expires_at: Option<i64>,
    ) -> Result<Session> {
        let user = self
            .issued
            .borrow()
            .get(access_token)
            .cloned()
            .ok_or_else(|| Error::Auth("Invalid JWT".to_string()))?;
        let session = Session {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.to_string(),
            expires_at,
            user,
        };
        self.slot.install(session.clone(), AuthEvent::SignedIn);
        Ok(session)
    }

    fn restore_session(&self, session: Session) {
        self.issued
            .borrow_mut()
            .insert(session.access_token.clone(), session.user.clone());
        self.slot.install(session, AuthEvent::SignedIn);
    }

    async fn refresh_session(&self) -> Result<Session> {
        let current = self.slot.current().ok_or(Error::NoSession)?;
        let session = self.issue(&current.user.id, current.user.email.as_deref());
        self.slot.install(session.clone(), AuthEvent::TokenRefreshed);
        Ok(session)
    }

    async fn sign_out(&self) -> Result<()> {
        if let Some(current) = self.slot.current() {
            self.issued.borrow_mut().remove(&current.access_token);
        }
        self.slot.clear();
        Ok(())
    }

    fn on_auth_state_change(&self, listener: Listener) -> Subscription {
        self.slot.subscribe(listener)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::rc::Rc;

    #[test]
    fn sign_up_then_sign_in() {
        let auth = MemoryAuth::new();
        block_on(async {
            auth.sign_up("p@example.com", "hunter22").await.unwrap();
            assert!(auth.get_session().await.unwrap().is_none());
            let session = auth
                .sign_in_with_password("p@example.com", "hunter22")
                .await
                .unwrap();
            assert_eq!(
                auth.get_session().await.unwrap().unwrap().user_id(),
                session.user_id()
            );
        });
    }

    #[test]
    fn sign_up_errors_use_provider_messages() {
        let auth = MemoryAuth::new();
        block_on(async {
            let err = auth.sign_up("p@example.com", "123").await.unwrap_err();
            assert_eq!(err.to_string(), "Password should be at least 6 characters.");
            auth.sign_up("p@example.com", "hunter22").await.unwrap();
            let err = auth.sign_up("p@example.com", "hunter22").await.unwrap_err();
            assert_eq!(err.to_string(), "User already registered");
        });
    }

    #[test]
    fn wrong_password_is_rejected() {
        let auth = MemoryAuth::new();
        block_on(async {
            auth.sign_up("p@example.com", "hunter22").await.unwrap();
            let err = auth
                .sign_in_with_password("p@example.com", "wrong-one")
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), "Invalid login credentials");
        });
    }

    #[test]
    fn oauth_tokens_install_a_session() {
        let auth = MemoryAuth::new();
        assert!(auth.sign_in_with_oauth("google").unwrap().contains("google"));
        let (access, refresh) = auth.issue_oauth_tokens("g@example.com");
        block_on(async {
            let session = auth
                .set_session(&access, &refresh, Some(1_900_000_000))
                .await
                .unwrap();
            assert_eq!(session.user.email.as_deref(), Some("g@example.com"));
            assert_eq!(session.expires_at, Some(1_900_000_000));
            assert!(auth.set_session("forged", "token", None).await.is_err());
        });
    }

    #[test]
    fn oauth_account_cannot_sign_in_with_empty_password() {
        let auth = MemoryAuth::new();
        auth.issue_oauth_tokens("g@example.com");
        let result = block_on(auth.sign_in_with_password("g@example.com", ""));
        assert!(result.is_err());
    }

    #[test]
    fn refresh_and_sign_out_emit_events() {
        let auth = MemoryAuth::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let _sub = auth.on_auth_state_change(Box::new(move |event, _| {
            sink.borrow_mut().push(event)
        }));
        block_on(async {
            auth.sign_up("p@example.com", "hunter22").await.unwrap();
            let first = auth
                .sign_in_with_password("p@example.com", "hunter22")
                .await
                .unwrap();
            let refreshed = auth.refresh_session().await.unwrap();
            assert_ne!(first.access_token, refreshed.access_token);
            assert_eq!(first.user_id(), refreshed.user_id());
            auth.sign_out().await.unwrap();
            assert!(auth.get_session().await.unwrap().is_none());
        });
        assert_eq!(
            *seen.borrow(),
            vec![
                AuthEvent::SignedIn,
                AuthEvent::TokenRefreshed,
                AuthEvent::SignedOut
            ]
        );
    }

    #[test]
    fn expired_session_is_refreshed_on_read() {
        let auth = MemoryAuth::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let _sub = auth.on_auth_state_change(Box::new(move |event, _| {
            sink.borrow_mut().push(event)
        }));
        let (access, refresh) = auth.issue_oauth_tokens("g@example.com");
        block_on(async {
            let stale = auth.set_session(&access, &refresh, Some(1)).await.unwrap();
            let current = auth.get_session().await.unwrap().unwrap();
            assert_ne!(current.access_token, stale.access_token);
            assert_eq!(current.user_id(), stale.user_id());
            assert!(!current.is_expired(unix_now()));
        });
        assert_eq!(
            *seen.borrow(),
            vec![AuthEvent::SignedIn, AuthEvent::TokenRefreshed]
        );
    }

    #[test]
    fn unexpired_session_is_returned_as_is() {
        let auth = MemoryAuth::new();
        let (access, refresh) = auth.issue_oauth_tokens("g@example.com");
        block_on(async {
            let later = unix_now() + 3600;
            auth.set_session(&access, &refresh, Some(later)).await.unwrap();
            let current = auth.get_session().await.unwrap().unwrap();
            assert_eq!(current.access_token, access);
            assert_eq!(current.expires_at, Some(later));
        });
    }

    #[test]
    fn refresh_without_session_fails() {
        let auth = MemoryAuth::new();
        assert!(matches!(
            block_on(auth.refresh_session()),
            Err(Error::NoSession)
        ));
    }

    #[test]
    fn outage_fails_get_session() {
        let auth = MemoryAuth::new();
        auth.set_outage("service unavailable");
        assert!(block_on(auth.get_session()).is_err());
        auth.clear_outage();
        assert!(block_on(auth.get_session()).unwrap().is_none());
    }
}
