//! Username setter: the one-time form shown before the first game.

use tracing::info;

use crate::auth::AuthProvider;
use crate::error::{Error, Result};
use crate::store::{PlayerPatch, PlayerStore};

pub const NO_SESSION_MESSAGE: &str = "No authenticated user found. Please log in again.";
pub const EMPTY_USERNAME_MESSAGE: &str = "Username cannot be empty.";
pub const SAVED_MESSAGE: &str = "Username saved successfully! Redirecting to the game...";

/// Save `username` for the signed-in player.
///
/// # Errors
/// - `Error::NoSession` when the session is gone (or the provider failed).
/// - `Error::Validation` for empty or whitespace-only input.
/// - `Error::Store` with the store's own message when the upsert fails.
///
/// Uniqueness is left to the store.
pub async fn submit_username<A, S>(auth: &A, store: &S, username: &str) -> Result<()>
where
    A: AuthProvider,
    S: PlayerStore,
{
    let session = match auth.get_session().await {
        Ok(Some(session)) => session,
        Ok(None) | Err(_) => return Err(Error::NoSession),
    };
    if username.trim().is_empty() {
        return Err(Error::Validation(EMPTY_USERNAME_MESSAGE.to_string()));
    }
    store
        .upsert(session.user_id(), &PlayerPatch::username(username))
        .await?;
    info!("username set for {}", session.user_id());
    Ok(())
}
