//! Login flow: sign-up, sign-in (password and OAuth), sign-out, and the
//! post-login decision between the username view and the game.

use tracing::{info, warn};

use crate::app::App;
use crate::auth::{AuthProvider, Session};
use crate::error::Result;
use crate::guard::Navigation;
use crate::store::PlayerStore;

pub const SIGNUP_SUCCESS_MESSAGE: &str = "Signup successful! You can now log in.";

/// Where an already signed-in visitor of the login view should go.
/// `None` means there is no session and the form should be shown.
pub async fn existing_session_route<A, S>(app: &App<A, S>) -> Option<Navigation>
where
    A: AuthProvider,
    S: PlayerStore,
{
    match app.auth.get_session().await {
        Ok(Some(session)) => Some(app.route_after_login(session.user_id()).await),
        Ok(None) => None,
        Err(e) => {
            warn!("session check failed: {}", e);
            None
        }
    }
}

pub async fn sign_up<A, S>(app: &App<A, S>, email: &str, password: &str) -> Result<()>
where
    A: AuthProvider,
    S: PlayerStore,
{
    app.auth.sign_up(email, password).await
}

/// Sign in and decide where to go next.
pub async fn sign_in_with_password<A, S>(
    app: &App<A, S>,
    email: &str,
    password: &str,
) -> Result<(Session, Navigation)>
where
    A: AuthProvider,
    S: PlayerStore,
{
    let session = app.auth.sign_in_with_password(email, password).await?;
    info!("signed in {}", session.user_id());
    let next = app.route_after_login(session.user_id()).await;
    Ok((session, next))
}

/// Authorize URL for `provider`, or the configured default provider.
pub fn oauth_url<A, S>(app: &App<A, S>, provider: Option<&str>) -> Result<String>
where
    A: AuthProvider,
    S: PlayerStore,
{
    let provider = provider
        .filter(|p| !p.trim().is_empty())
        .unwrap_or(app.config.oauth_provider.as_str());
    app.auth.sign_in_with_oauth(provider)
}

/// Install the tokens from the OAuth redirect and decide where to go next.
pub async fn finish_oauth<A, S>(
    app: &App<A, S>,
    access_token: &str,
    refresh_token: &str,
    expires_at: Option<i64>,
) -> Result<(Session, Navigation)>
where
    A: AuthProvider,
    S: PlayerStore,
{
    let session = app
        .auth
        .set_session(access_token, refresh_token, expires_at)
        .await?;
    info!("signed in {} via OAuth", session.user_id());
    let next = app.route_after_login(session.user_id()).await;
    Ok((session, next))
}

/// End the session. The mounted view is dropped by its guard's pending
/// navigation or here, whichever comes first.
pub async fn sign_out<A, S>(app: &App<A, S>)
where
    A: AuthProvider,
    S: PlayerStore,
{
    if let Err(e) = app.auth.sign_out().await {
        warn!("sign out failed: {}", e);
    }
    app.unmount();
}
