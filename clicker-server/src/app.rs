//! Application state shared by all routes: the two collaborators, the
//! config, and the currently mounted protected view.
//!
//! Only one protected view is mounted at a time. Mounting a view unmounts
//! the previous one, which drops its guard and releases its auth
//! subscription.

use rand::SeedableRng;
use rand::rngs::StdRng;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

use crate::auth::AuthProvider;
use crate::config::Config;
use crate::game::card::generate_card_number;
use crate::game::{GameController, needs_username};
use crate::guard::{Navigation, SessionGuard};
use crate::store::PlayerStore;

struct MountedView {
    guard: SessionGuard,
    /// Present while the game view is mounted.
    controller: Option<Rc<GameController>>,
}

pub struct App<A, S> {
    pub auth: A,
    pub store: S,
    pub config: Config,
    mounted: RefCell<Option<MountedView>>,
    rng: RefCell<StdRng>,
}

impl<A: AuthProvider, S: PlayerStore> App<A, S> {
    pub fn new(auth: A, store: S, config: Config) -> Self {
        Self {
            auth,
            store,
            config,
            mounted: RefCell::new(None),
            rng: RefCell::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic card numbers, for tests.
    pub fn with_seed(self, seed: u64) -> Self {
        *self.rng.borrow_mut() = StdRng::seed_from_u64(seed);
        self
    }

    pub fn next_card_number(&self) -> String {
        generate_card_number(&mut *self.rng.borrow_mut())
    }

    /// Mount the game view: guard the session, then load the player.
    /// `None` means the browser must go to the login view.
    pub async fn mount_game(&self) -> Option<Rc<GameController>> {
        self.unmount();
        let guard = SessionGuard::mount(&self.auth).await?;
        let controller = Rc::new(
            GameController::load(
                &self.store,
                guard.user_id(),
                self.config.upgrade_cost_policy,
                || self.next_card_number(),
            )
            .await,
        );
        *self.mounted.borrow_mut() = Some(MountedView {
            guard,
            controller: Some(controller.clone()),
        });
        Some(controller)
    }

    /// Mount the username view. `false` means the browser must go to login.
    pub async fn mount_username(&self) -> bool {
        self.unmount();
        match SessionGuard::mount(&self.auth).await {
            Some(guard) => {
                *self.mounted.borrow_mut() = Some(MountedView {
                    guard,
                    controller: None,
                });
                true
            }
            None => false,
        }
    }

    pub fn unmount(&self) {
        if self.mounted.borrow_mut().take().is_some() {
            debug!("view unmounted");
        }
    }

    /// Controller of the mounted game view.
    pub fn controller(&self) -> Option<Rc<GameController>> {
        self.mounted
            .borrow()
            .as_ref()
            .and_then(|view| view.controller.clone())
    }

    /// Navigation requested by an auth-state change since the last request.
    /// Unmounts the view when one is pending.
    pub fn take_navigation(&self) -> Option<Navigation> {
        let pending = self
            .mounted
            .borrow()
            .as_ref()
            .and_then(|view| view.guard.take_navigation());
        if pending.is_some() {
            self.unmount();
        }
        pending
    }

    /// Where a freshly signed-in player goes: the username view when the
    /// record has no chosen username (or cannot be read), else the game.
    pub async fn route_after_login(&self, user_id: &str) -> Navigation {
        match self.store.select_by_id(user_id).await {
            Ok(Some(row)) if !needs_username(row.username.as_deref()) => Navigation::Game,
            Ok(_) => Navigation::ChooseUsername,
            Err(e) => {
                warn!("username lookup failed for {}: {}", user_id, e);
                Navigation::ChooseUsername
            }
        }
    }
}
