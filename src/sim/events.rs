//! Advisory notifications for user feedback
//!
//! The session queues these as it changes; hosts drain them into toasts or
//! logs. Nothing in the simulation depends on them being read.

use std::fmt;

use serde::Serialize;

use super::state::{EntityId, PlayerId};

/// Something the player should be told about
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GameEvent {
    OrbCollected { ufo: EntityId, value: u32 },
    EnergyDeposited { player: PlayerId, amount: u32 },
    InsufficientEnergy { ufo: EntityId, available: u32, required: u32 },
    /// Collect was requested but no orb is in reach
    OrbOutOfReach,
    LevelUp { player: PlayerId, level: u32 },
    UfoDestroyed { ufo: EntityId, owner: PlayerId, by: PlayerId },
    UfoRespawned { ufo: EntityId, owner: PlayerId },
    PlayerWon { player: PlayerId },
    PlayerLost { player: PlayerId },
}

impl GameEvent {
    /// Whether this is good news (for toast styling)
    pub fn is_positive(&self) -> bool {
        matches!(
            self,
            GameEvent::OrbCollected { .. }
                | GameEvent::EnergyDeposited { .. }
                | GameEvent::LevelUp { .. }
                | GameEvent::UfoRespawned { .. }
                | GameEvent::PlayerWon { .. }
        )
    }
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameEvent::OrbCollected { value, .. } => write!(f, "Collected {value} energy!"),
            GameEvent::EnergyDeposited { amount, .. } => write!(f, "Deposited {amount} energy!"),
            GameEvent::InsufficientEnergy { required, .. } => {
                write!(f, "Not enough energy to shoot! Need {required} energy.")
            }
            GameEvent::OrbOutOfReach => write!(f, "Move closer to an orb!"),
            GameEvent::LevelUp { level, .. } => write!(f, "Base upgraded to level {level}!"),
            GameEvent::UfoDestroyed { owner, by, .. } => {
                write!(f, "{by} destroyed a UFO belonging to {owner}!")
            }
            GameEvent::UfoRespawned { owner, .. } => write!(f, "{owner} launched a new UFO"),
            GameEvent::PlayerWon { player } => write!(f, "{player} wins!"),
            GameEvent::PlayerLost { player } => write!(f, "{player} is out of the game!"),
        }
    }
}
