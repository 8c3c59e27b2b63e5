//! Helpers shared by the REST-backed collaborators.

use reqwest::{RequestBuilder, Response};
use serde::Deserialize;
use url::Url;

use crate::error::Result;

/// Error body shapes used by the hosted auth and table APIs.
#[derive(Debug, Default, Deserialize)]
struct ProviderError {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ProviderError {
    fn into_message(self) -> Option<String> {
        self.msg
            .or(self.message)
            .or(self.error_description)
            .or(self.error)
    }
}

/// Join `path` onto the project base URL.
pub fn endpoint(base: &Url, path: &str) -> Result<Url> {
    Ok(base.join(path)?)
}

/// Attach the project key, plus a bearer token when one is given.
pub fn authorize(request: RequestBuilder, anon_key: &str, bearer: Option<&str>) -> RequestBuilder {
    request
        .header("apikey", anon_key)
        .bearer_auth(bearer.unwrap_or(anon_key))
}

/// Extract the provider's message from a failed response.
pub async fn failure_message(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    message_from_body(&body).unwrap_or_else(|| format!("request failed: {status}"))
}

pub fn message_from_body(body: &str) -> Option<String> {
    serde_json::from_str::<ProviderError>(body)
        .ok()
        .and_then(ProviderError::into_message)
}
