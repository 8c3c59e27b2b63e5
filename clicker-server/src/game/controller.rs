//! Game controller: owns one player's `GameState` and persists it
//! explicitly after every command.
//!
//! Writes are fire-and-log: a failed write leaves the local state ahead of
//! the store until the next successful write carries the newer values.
//! Every write re-reads the session and is skipped unless it still belongs
//! to this controller's player.

use std::cell::{Cell, RefCell};
use tracing::{debug, error};

use super::player::{Player, load_player, progress_patch};
use super::state::GameState;
use crate::auth::AuthProvider;
use crate::config::UpgradeCostPolicy;
use crate::error::{Error, Result};
use crate::store::PlayerStore;

pub struct GameController {
    user_id: String,
    policy: UpgradeCostPolicy,
    state: Cell<GameState>,
    username: RefCell<String>,
    card_number: RefCell<String>,
}

impl GameController {
    /// Controller with initial values, before any load.
    pub fn new(user_id: &str, policy: UpgradeCostPolicy) -> Self {
        Self::from_player(Player::initial(user_id), policy)
    }

    pub fn from_player(player: Player, policy: UpgradeCostPolicy) -> Self {
        Self {
            user_id: player.id,
            policy,
            state: Cell::new(player.state),
            username: RefCell::new(player.username),
            card_number: RefCell::new(player.card_number),
        }
    }

    /// Load (or create) the player's record. Errors are logged and the
    /// controller keeps its initial values.
    pub async fn load<S, F>(store: &S, user_id: &str, policy: UpgradeCostPolicy, new_card: F) -> Self
    where
        S: PlayerStore,
        F: FnOnce() -> String,
    {
        match load_player(store, user_id, policy, new_card).await {
            Ok(player) => Self::from_player(player, policy),
            Err(e) => {
                error!("Error fetching player data for {}: {}", user_id, e);
                Self::new(user_id, policy)
            }
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn state(&self) -> GameState {
        self.state.get()
    }

    pub fn username(&self) -> String {
        self.username.borrow().clone()
    }

    pub fn card_number(&self) -> String {
        self.card_number.borrow().clone()
    }

    pub fn player(&self) -> Player {
        Player {
            id: self.user_id.clone(),
            username: self.username(),
            card_number: self.card_number(),
            state: self.state(),
        }
    }

    /// Click, then persist the new state.
    pub async fn apply_click<A, S>(&self, auth: &A, store: &S) -> GameState
    where
        A: AuthProvider,
        S: PlayerStore,
    {
        let next = self.state.get().click();
        self.state.set(next);
        if let Err(e) = self.persist(auth, store, next).await {
            error!("Error saving player data for {}: {}", self.user_id, e);
        }
        next
    }

    /// Upgrade when affordable, then persist. An unaffordable upgrade
    /// changes nothing and writes nothing.
    pub async fn apply_upgrade<A, S>(&self, auth: &A, store: &S) -> GameState
    where
        A: AuthProvider,
        S: PlayerStore,
    {
        let current = self.state.get();
        let Some(next) = current.upgrade() else {
            debug!(
                "upgrade refused for {}: balance {} < cost {}",
                self.user_id, current.balance, current.upgrade_cost
            );
            return current;
        };
        self.state.set(next);
        if let Err(e) = self.persist(auth, store, next).await {
            error!("Error saving player data for {}: {}", self.user_id, e);
        }
        next
    }

    /// Write `state`'s progress fields to the signed-in player's row.
    ///
    /// # Errors
    /// - `Error::NoSession` when nobody is signed in (nothing is written).
    /// - `Error::Auth` when the session now belongs to another user
    ///   (nothing is written).
    /// - the store's error when the update fails.
    pub async fn persist<A, S>(&self, auth: &A, store: &S, state: GameState) -> Result<()>
    where
        A: AuthProvider,
        S: PlayerStore,
    {
        let session = auth.get_session().await?.ok_or(Error::NoSession)?;
        if session.user_id() != self.user_id {
            return Err(Error::Auth(format!(
                "signed-in user changed to {}",
                session.user_id()
            )));
        }
        store
            .update_by_id(session.user_id(), &progress_patch(state, self.policy))
            .await
    }
}
