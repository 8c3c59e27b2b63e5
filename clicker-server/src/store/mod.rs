//! Store collaborator: the hosted `players` table.
//!
//! One row per player keyed by the auth user id. `RestStore` talks to the
//! hosted table API; `MemoryStore` keeps rows in process and can be told
//! to fail, which is how the gameplay error paths are exercised.

pub mod memory;
pub mod rest;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;

pub use memory::MemoryStore;
pub use rest::RestStore;

/// A row of the players table as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRow {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "balance_or_zero")]
    pub balance: f64,
    #[serde(default = "default_multiplier", deserialize_with = "multiplier_or_one")]
    pub multiplier: f64,
    #[serde(default)]
    pub card_number: Option<String>,
    /// Only present when the table carries the optional column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrade_cost: Option<f64>,
}

fn default_multiplier() -> f64 {
    1.0
}

// The table API returns every column, so an unset numeric column arrives as
// an explicit `null` rather than a missing key.
fn balance_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

fn multiplier_or_one<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_else(default_multiplier))
}

impl PlayerRow {
    /// A row with the table defaults and no username or card yet.
    pub fn blank(id: &str) -> Self {
        Self {
            id: id.to_string(),
            username: None,
            balance: 0.0,
            multiplier: default_multiplier(),
            card_number: None,
            upgrade_cost: None,
        }
    }

    pub fn apply(&mut self, patch: &PlayerPatch) {
        if let Some(username) = &patch.username {
            self.username = Some(username.clone());
        }
        if let Some(balance) = patch.balance {
            self.balance = balance;
        }
        if let Some(multiplier) = patch.multiplier {
            self.multiplier = multiplier;
        }
        if let Some(card_number) = &patch.card_number {
            self.card_number = Some(card_number.clone());
        }
        if let Some(upgrade_cost) = patch.upgrade_cost {
            self.upgrade_cost = Some(upgrade_cost);
        }
    }
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgrade_cost: Option<f64>,
}

impl PlayerPatch {
    pub fn username(username: &str) -> Self {
        Self {
            username: Some(username.to_string()),
            ..Self::default()
        }
    }

    pub fn card_number(card_number: &str) -> Self {
        Self {
            card_number: Some(card_number.to_string()),
            ..Self::default()
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait PlayerStore {
    /// `Ok(None)` when no row has this id.
    async fn select_by_id(&self, id: &str) -> Result<Option<PlayerRow>>;

    /// Insert a new row and return it as stored.
    async fn insert(&self, row: &PlayerRow) -> Result<PlayerRow>;

    /// Update the row with this id. Updating a missing row is not an error.
    async fn update_by_id(&self, id: &str, patch: &PlayerPatch) -> Result<()>;

    /// Insert or merge `{id, ..patch}`.
    async fn upsert(&self, id: &str, patch: &PlayerPatch) -> Result<()>;
}
