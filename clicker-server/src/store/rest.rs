//! Players table backed by the hosted project's `/rest/v1` table API.
//!
//! Filters use the `column=eq.value` query syntax; `Prefer` headers select
//! merge-on-conflict for upserts and return the stored row for inserts.

use reqwest::Client as HttpClient;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;
use url::Url;

use super::{PlayerPatch, PlayerRow, PlayerStore};
use crate::error::{Error, Result};
use crate::http::{authorize, endpoint, failure_message};

/// Bearer token used for table requests, kept current by the auth listener.
pub type AccessToken = Rc<RefCell<Option<String>>>;

#[derive(Serialize)]
struct Keyed<'a> {
    id: &'a str,
    #[serde(flatten)]
    patch: &'a PlayerPatch,
}

pub struct RestStore {
    table_url: Url,
    anon_key: String,
    http_client: HttpClient,
    access_token: AccessToken,
}

impl RestStore {
    pub fn new(base_url: &Url, anon_key: &str, table: &str) -> Result<Self> {
        let mut base_url = base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            table_url: endpoint(&base_url, &format!("rest/v1/{table}"))?,
            anon_key: anon_key.to_string(),
            http_client: HttpClient::new(),
            access_token: AccessToken::default(),
        })
    }

    /// Shared handle to the bearer token slot.
    pub fn access_token(&self) -> AccessToken {
        self.access_token.clone()
    }

    /// Table URL filtered to a single id.
    pub fn row_url(&self, id: &str) -> Url {
        let mut url = self.table_url.clone();
        url.query_pairs_mut().append_pair("id", &format!("eq.{id}"));
        url
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        let token = self.access_token.borrow().clone();
        authorize(
            self.http_client.request(method, url),
            &self.anon_key,
            token.as_deref(),
        )
    }
}

impl PlayerStore for RestStore {
    async fn select_by_id(&self, id: &str) -> Result<Option<PlayerRow>> {
        let mut url = self.row_url(id);
        url.query_pairs_mut().append_pair("select", "*");
        debug!("select {}", url);
        let response = self.request(reqwest::Method::GET, url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Store(failure_message(response).await));
        }
        let rows: Vec<PlayerRow> = response.json().await?;
        Ok(rows.into_iter().next())
    }

    async fn insert(&self, row: &PlayerRow) -> Result<PlayerRow> {
        let response = self
            .request(reqwest::Method::POST, self.table_url.clone())
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::Store(failure_message(response).await));
        }
        let rows: Vec<PlayerRow> = response.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| Error::Store("insert returned no row".to_string()))
    }

    async fn update_by_id(&self, id: &str, patch: &PlayerPatch) -> Result<()> {
        let response = self
            .request(reqwest::Method::PATCH, self.row_url(id))
            .json(patch)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::Store(failure_message(response).await));
        }
        Ok(())
    }

    async fn upsert(&self, id: &str, patch: &PlayerPatch) -> Result<()> {
        let response = self
            .request(reqwest::Method::POST, self.table_url.clone())
            .header("Prefer", "resolution=merge-duplicates")
            .json(&Keyed { id, patch })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::Store(failure_message(response).await));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> RestStore {
        RestStore::new(
            &Url::parse("https://abc.example.co").unwrap(),
            "anon",
            "players",
        )
        .unwrap()
    }

    #[test]
    fn row_url_filters_by_id() {
        assert_eq!(
            store().row_url("0b6f-42").as_str(),
            "https://abc.example.co/rest/v1/players?id=eq.0b6f-42"
        );
    }

    #[test]
    fn upsert_body_flattens_patch() {
        let patch = PlayerPatch::username("ada");
        let body = serde_json::to_string(&Keyed {
            id: "p1",
            patch: &patch,
        })
        .unwrap();
        assert_eq!(body, r#"{"id":"p1","username":"ada"}"#);
    }

    #[test]
    fn access_token_handle_is_shared() {
        let store = store();
        *store.access_token().borrow_mut() = Some("jwt".to_string());
        assert_eq!(store.access_token.borrow().as_deref(), Some("jwt"));
    }
}
