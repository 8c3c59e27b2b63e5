//! Game state value object and the click/upgrade rules.
//!
//! `GameState` is `Copy`: every rule takes the current value and returns
//! the next one, so the controller decides when (and whether) to persist.

use serde::{Deserialize, Serialize};

/// Cost of the first upgrade.
pub const BASE_UPGRADE_COST: f64 = 10.0;
/// Factor applied to the multiplier on every upgrade.
pub const MULTIPLIER_GROWTH: f64 = 1.5;
/// Factor applied to the upgrade cost on every upgrade (then rounded up).
pub const COST_GROWTH: f64 = 7.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub balance: f64,
    pub multiplier: f64,
    pub upgrade_cost: f64,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            balance: 0.0,
            multiplier: 1.0,
            upgrade_cost: BASE_UPGRADE_COST,
        }
    }
}

impl GameState {
    /// Balance gains exactly one multiplier.
    pub fn click(self) -> Self {
        Self {
            balance: self.balance + self.multiplier,
            ..self
        }
    }

    pub fn can_upgrade(&self) -> bool {
        self.balance >= self.upgrade_cost
    }

    /// Spend the upgrade cost for a bigger multiplier. `None` when the
    /// balance does not cover the cost; the state is then left as is.
    pub fn upgrade(self) -> Option<Self> {
        if !self.can_upgrade() {
            return None;
        }
        Some(Self {
            balance: self.balance - self.upgrade_cost,
            multiplier: self.multiplier * MULTIPLIER_GROWTH,
            upgrade_cost: (self.upgrade_cost * COST_GROWTH).ceil(),
        })
    }
}
