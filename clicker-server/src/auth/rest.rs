//! Auth provider backed by the hosted project's `/auth/v1` REST API.

use reqwest::Client as HttpClient;
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use super::{
    unix_now, AuthEvent, AuthProvider, Listener, Session, SessionSlot, Subscription, User,
};
use crate::error::{Error, Result};
use crate::http::{authorize, endpoint, failure_message};

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

pub struct RestAuth {
    base_url: Url,
    anon_key: String,
    redirect_to: Option<String>,
    http_client: HttpClient,
    slot: SessionSlot,
}

impl RestAuth {
    pub fn new(base_url: Url, anon_key: &str, redirect_to: Option<String>) -> Self {
        let mut base_url = base_url;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            base_url,
            anon_key: anon_key.to_string(),
            redirect_to,
            http_client: HttpClient::new(),
            slot: SessionSlot::default(),
        }
    }

    /// Build the provider's authorize URL for `provider`.
    pub fn authorize_url(&self, provider: &str) -> Result<Url> {
        let mut url = endpoint(&self.base_url, "auth/v1/authorize")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("provider", provider);
            if let Some(redirect_to) = &self.redirect_to {
                query.append_pair("redirect_to", redirect_to);
            }
        }
        Ok(url)
    }

    async fn token_grant<T: Serialize>(&self, grant_type: &str, body: &T) -> Result<Session> {
        let mut url = endpoint(&self.base_url, "auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", grant_type);
        debug!("token grant {} at {}", grant_type, url);
        let response = authorize(self.http_client.post(url), &self.anon_key, None)
            .json(body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::Auth(failure_message(response).await));
        }
        Ok(response.json::<Session>().await?)
    }

    async fn fetch_user(&self, access_token: &str) -> Result<User> {
        let url = endpoint(&self.base_url, "auth/v1/user")?;
        let response = authorize(self.http_client.get(url), &self.anon_key, Some(access_token))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::Auth(failure_message(response).await));
        }
        Ok(response.json::<User>().await?)
    }
}

impl AuthProvider for RestAuth {
    async fn get_session(&self) -> Result<Option<Session>> {
        let Some(session) = self.slot.current() else {
            return Ok(None);
        };
        if !session.is_expired(unix_now()) {
            return Ok(Some(session));
        }
        debug!("session for {} expired; refreshing", session.user_id());
        match self.refresh_session().await {
            Ok(refreshed) => Ok(Some(refreshed)),
            // Rejected refresh token: the session is gone for good.
            Err(Error::Auth(message)) => {
                warn!("expired session could not be refreshed: {}", message);
                self.slot.clear();
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<()> {
        let url = endpoint(&self.base_url, "auth/v1/signup")?;
        let response = authorize(self.http_client.post(url), &self.anon_key, None)
            .json(&Credentials { email, password })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::Auth(failure_message(response).await));
        }
        info!("signed up {}", email);
        Ok(())
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        let session = self
            .token_grant("password", &Credentials { email, password })
            .await?;
        self.slot.install(session.clone(), AuthEvent::SignedIn);
        Ok(session)
    }

    fn sign_in_with_oauth(&self, provider: &str) -> Result<String> {
        if provider.trim().is_empty() {
            return Err(Error::Auth("Unsupported provider: missing name".to_string()));
        }
        Ok(self.authorize_url(provider)?.to_string())
    }

    async fn set_session(
        &self,
        access_token: &str,
        refresh_token: &str,
        expires_at: Option<i64>,
    ) -> Result<Session> {
        let user = self.fetch_user(access_token).await?;
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
        self.slot.install(session, AuthEvent::SignedIn);
    }

    async fn refresh_session(&self) -> Result<Session> {
        let current = self.slot.current().ok_or(Error::NoSession)?;
        let session = self
            .token_grant(
                "refresh_token",
                &RefreshGrant {
                    refresh_token: &current.refresh_token,
                },
            )
            .await?;
        self.slot.install(session.clone(), AuthEvent::TokenRefreshed);
        Ok(session)
    }

    async fn sign_out(&self) -> Result<()> {
        if let Some(current) = self.slot.current() {
            let url = endpoint(&self.base_url, "auth/v1/logout")?;
            let result = authorize(
                self.http_client.post(url),
                &self.anon_key,
                Some(&current.access_token),
            )
            .send()
            .await;
            // The local session is dropped either way.
            match result {
                Ok(response) if !response.status().is_success() => {
                    warn!("logout rejected: {}", failure_message(response).await);
                }
                Err(e) => warn!("logout request failed: {}", e),
                Ok(_) => {}
            }
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

    fn auth(redirect_to: Option<&str>) -> RestAuth {
        RestAuth::new(
            Url::parse("https://abc.example.co").unwrap(),
            "anon",
            redirect_to.map(str::to_string),
        )
    }

    #[test]
    fn authorize_url_carries_provider_and_redirect() {
        let url = auth(Some("https://game.example.com/login"))
            .sign_in_with_oauth("google")
            .unwrap();
        assert!(url.starts_with("https://abc.example.co/auth/v1/authorize?"));
        assert!(url.contains("provider=google"));
        assert!(url.contains("redirect_to=https%3A%2F%2Fgame.example.com%2Flogin"));
    }

    #[test]
    fn base_path_is_kept() {
        let auth = RestAuth::new(
            Url::parse("https://proxy.example.com/project").unwrap(),
            "anon",
            None,
        );
        let url = auth.authorize_url("github").unwrap();
        assert_eq!(
            url.as_str(),
            "https://proxy.example.com/project/auth/v1/authorize?provider=github"
        );
    }

    #[test]
    fn unexpired_session_is_returned_without_network() {
        let auth = auth(None);
        let expires_at = unix_now() + 3600;
        auth.restore_session(Session {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_at: Some(expires_at),
            user: User {
                id: "player-1".to_string(),
                email: None,
            },
        });
        let session = block_on(auth.get_session()).unwrap().unwrap();
        assert_eq!(session.user_id(), "player-1");
        assert_eq!(session.expires_at, Some(expires_at));
    }

    #[test]
    fn refresh_without_session_fails_locally() {
        assert!(matches!(
            block_on(auth(None).refresh_session()),
            Err(Error::NoSession)
        ));
    }

    #[test]
    fn empty_oauth_provider_is_rejected() {
        assert!(auth(None).sign_in_with_oauth(" ").is_err());
    }
}
