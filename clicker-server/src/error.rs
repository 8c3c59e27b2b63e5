//! Crate-wide error type.
//!
//! Provider failures carry the provider's own message string verbatim so
//! route handlers can show it to the player unchanged.

use thiserror::Error;

/// Error type for auth, store and request handling.
#[derive(Error, Debug)]
pub enum Error {
    /// Auth provider rejected the request (bad credentials, expired refresh token, ...).
    #[error("{0}")]
    Auth(String),
    /// Hosted database rejected the request.
    #[error("{0}")]
    Store(String),
    /// Player input failed validation.
    #[error("{0}")]
    Validation(String),
    #[error("no authenticated session")]
    NoSession,
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("invalid config: {0}")]
    Config(String),
}

/// Result type for crate operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_messages_display_verbatim() {
        let err = Error::Auth("Invalid login credentials".to_string());
        assert_eq!(err.to_string(), "Invalid login credentials");
        let err = Error::Store("permission denied for table players".to_string());
        assert_eq!(err.to_string(), "permission denied for table players");
    }

    #[test]
    fn json_errors_convert() {
        let err: Error = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(err.to_string().starts_with("invalid JSON"));
    }
}
