//! Session export/restore for "remember me".
//!
//! The session is serialized as JSON and encoded as URL-safe base64 so the
//! worker can keep it in `localStorage` and hand it back on the next page
//! load.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::auth::Session;
use crate::error::Result;

/// Encode a session for `localStorage`.
pub fn export_session(session: &Session) -> Result<String> {
    let json = serde_json::to_vec(session)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Decode a previously exported session.
pub fn import_session(state_b64: &str) -> Result<Session> {
    let bytes = URL_SAFE_NO_PAD.decode(state_b64.trim())?;
    Ok(serde_json::from_slice(&bytes)?)
}
