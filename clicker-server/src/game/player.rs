//! Player record loader: fetch or lazily create the player's row.

use tracing::{debug, info};

use super::state::{BASE_UPGRADE_COST, GameState};
use crate::config::UpgradeCostPolicy;
use crate::error::Result;
use crate::store::{PlayerPatch, PlayerRow, PlayerStore};

/// Username given to rows created before the player picks one.
pub const DEFAULT_USERNAME: &str = "NewPlayer";

/// Local view of a player's record.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: String,
    pub username: String,
    pub card_number: String,
    pub state: GameState,
}

impl Player {
    /// Local state before any record has loaded.
    pub fn initial(id: &str) -> Self {
        Self {
            id: id.to_string(),
            username: String::new(),
            card_number: String::new(),
            state: GameState::default(),
        }
    }

    pub fn from_row(row: PlayerRow, policy: UpgradeCostPolicy) -> Self {
        let upgrade_cost = match policy {
            UpgradeCostPolicy::Persisted => row.upgrade_cost.unwrap_or(BASE_UPGRADE_COST),
            UpgradeCostPolicy::SessionOnly => BASE_UPGRADE_COST,
        };
        Self {
            id: row.id,
            username: row.username.unwrap_or_default(),
            card_number: row.card_number.unwrap_or_default(),
            state: GameState {
                balance: row.balance,
                multiplier: row.multiplier,
                upgrade_cost,
            },
        }
    }
}

/// True when the player still has to pick a username.
pub fn needs_username(username: Option<&str>) -> bool {
    match username.map(str::trim) {
        None | Some("") => true,
        Some(name) => name == DEFAULT_USERNAME,
    }
}

/// Fields written after every click or upgrade.
pub fn progress_patch(state: GameState, policy: UpgradeCostPolicy) -> PlayerPatch {
    PlayerPatch {
        balance: Some(state.balance),
        multiplier: Some(state.multiplier),
        upgrade_cost: match policy {
            UpgradeCostPolicy::Persisted => Some(state.upgrade_cost),
            UpgradeCostPolicy::SessionOnly => None,
        },
        ..PlayerPatch::default()
    }
}

/// Load the player with `user_id`, creating the row or its card number
/// when missing. `new_card` is only called when a card has to be minted.
pub async fn load_player<S, F>(
    store: &S,
    user_id: &str,
    policy: UpgradeCostPolicy,
    new_card: F,
) -> Result<Player>
where
    S: PlayerStore,
    F: FnOnce() -> String,
{
    match store.select_by_id(user_id).await? {
        Some(row) if row.card_number.as_deref().is_some_and(|c| !c.is_empty()) => {
            debug!("loaded player {}", user_id);
            Ok(Player::from_row(row, policy))
        }
        Some(mut row) => {
            let card_number = new_card();
            store
                .update_by_id(user_id, &PlayerPatch::card_number(&card_number))
                .await?;
            info!("issued card number for player {}", user_id);
            row.card_number = Some(card_number);
            Ok(Player::from_row(row, policy))
        }
        None => {
            let row = PlayerRow {
                username: Some(DEFAULT_USERNAME.to_string()),
                card_number: Some(new_card()),
                upgrade_cost: match policy {
                    UpgradeCostPolicy::Persisted => Some(BASE_UPGRADE_COST),
                    UpgradeCostPolicy::SessionOnly => None,
                },
                ..PlayerRow::blank(user_id)
            };
            let created = store.insert(&row).await?;
            info!("created player {}", user_id);
            Ok(Player::from_row(created, policy))
        }
    }
}
