//! Game session state and entity types
//!
//! `GameState` owns every entity by value. Mutation goes through the
//! actions in `actions.rs` and the simulation step in `tick.rs`; everything
//! here is either a type definition or a read accessor.

use std::fmt;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Positioned;
use super::events::GameEvent;
use super::schedule::Scheduler;
use crate::consts::*;
use crate::tuning::GameConfig;

/// Identifier for UFOs, orbs and projectiles (unique within a session)
pub type EntityId = u32;

/// A participating side. Player 1 is always present; player 2 only in
/// two-player sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    pub const ONE: PlayerId = PlayerId(1);
    pub const TWO: PlayerId = PlayerId(2);
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Which rule set a session plays by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Ruleset {
    /// Corner bases, shooting, respawn economy, win/lose thresholds
    #[default]
    Competitive,
    /// Single player, central base that levels up, no win/lose
    Classic,
}

/// Arena dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaSize {
    pub width: f32,
    pub height: f32,
}

impl ArenaSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// False until the host has laid out a real, nonzero area
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for ArenaSize {
    fn default() -> Self {
        Self::new(DEFAULT_ARENA_WIDTH, DEFAULT_ARENA_HEIGHT)
    }
}

/// A player-controlled craft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ufo {
    pub id: EntityId,
    pub position: Vec2,
    /// Carried energy, lost if the UFO is destroyed
    pub collected_energy: u32,
    pub speed: f32,
    pub radius: f32,
    pub is_dragging: bool,
    /// Facing, degrees
    pub rotation: f32,
    pub owner: PlayerId,
    /// Time until the UFO may fire again (ms)
    pub cooldown: f32,
}

impl Positioned for Ufo {
    fn position(&self) -> Vec2 {
        self.position
    }
}

/// A collectible energy pickup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyOrb {
    pub id: EntityId,
    pub position: Vec2,
    pub value: u32,
    /// Diameter (pixels)
    pub size: f32,
}

impl Positioned for EnergyOrb {
    fn position(&self) -> Vec2 {
        self.position
    }
}

/// A player's home base
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Base {
    pub position: Vec2,
    pub player: PlayerId,
    /// Diameter (pixels)
    pub size: f32,
    /// Classic ruleset progression (stays 1 in competitive play)
    pub level: u32,
}

impl Positioned for Base {
    fn position(&self) -> Vec2 {
        self.position
    }
}

/// One participating side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub base_position: Vec2,
    pub color: String,
    /// Banked energy: the score and the respawn currency
    pub stored_energy: u32,
    /// UFOs currently owned, in creation order
    pub ufos: Vec<EntityId>,
    /// Sticky until reset
    pub is_winner: bool,
    /// Sticky until reset
    pub is_loser: bool,
}

/// A shot in flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: EntityId,
    pub position: Vec2,
    /// Heading, degrees
    pub direction: f32,
    /// Pixels per reference frame
    pub speed: f32,
    pub owner: PlayerId,
    /// Remaining lifetime (ms)
    pub time_to_live: f32,
}

/// Read-only copy of everything a renderer or input adapter needs
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub players: Vec<Player>,
    pub ufos: Vec<Ufo>,
    pub energy_orbs: Vec<EnergyOrb>,
    pub bases: Vec<Base>,
    pub projectiles: Vec<Projectile>,
    pub game_area_size: ArenaSize,
    pub is_running: bool,
    pub is_multiplayer: bool,
    pub winning_score: u32,
    pub ruleset: Ruleset,
}

/// The authoritative game session
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed for reproducibility
    pub seed: u64,
    pub config: GameConfig,
    pub(crate) rng: Pcg32,

    pub(crate) players: Vec<Player>,
    pub(crate) ufos: Vec<Ufo>,
    pub(crate) energy_orbs: Vec<EnergyOrb>,
    pub(crate) bases: Vec<Base>,
    pub(crate) projectiles: Vec<Projectile>,

    pub(crate) arena: ArenaSize,
    pub(crate) is_running: bool,
    /// Applies on the next reset
    pub(crate) is_multiplayer: bool,
    /// Applies on the next reset
    pub(crate) ruleset: Ruleset,
    pub(crate) winning_score: u32,

    pub(crate) scheduler: Scheduler,
    pub(crate) events: Vec<GameEvent>,
    next_id: EntityId,
}

impl GameState {
    /// Create an empty session; call `reset_game` to populate it
    pub fn new(seed: u64, config: GameConfig) -> Self {
        let winning_score = config.winning_score;
        Self {
            seed,
            config,
            rng: Pcg32::seed_from_u64(seed),
            players: Vec::new(),
            ufos: Vec::new(),
            energy_orbs: Vec::new(),
            bases: Vec::new(),
            projectiles: Vec::new(),
            arena: ArenaSize::default(),
            is_running: false,
            is_multiplayer: false,
            ruleset: Ruleset::default(),
            winning_score,
            scheduler: Scheduler::new(),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub(crate) fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(crate) fn notify(&mut self, event: GameEvent) {
        log::debug!("event: {event}");
        self.events.push(event);
    }

    // === Read surface ===

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn ufos(&self) -> &[Ufo] {
        &self.ufos
    }

    pub fn energy_orbs(&self) -> &[EnergyOrb] {
        &self.energy_orbs
    }

    pub fn bases(&self) -> &[Base] {
        &self.bases
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn game_area_size(&self) -> ArenaSize {
        self.arena
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn is_multiplayer(&self) -> bool {
        self.is_multiplayer
    }

    pub fn ruleset(&self) -> Ruleset {
        self.ruleset
    }

    pub fn winning_score(&self) -> u32 {
        self.winning_score
    }

    /// Simulation time since the last reset (ms)
    pub fn elapsed_ms(&self) -> f64 {
        self.scheduler.now_ms()
    }

    /// Deferred actions still waiting to run
    pub fn pending_actions(&self) -> usize {
        self.scheduler.len()
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn ufo(&self, id: EntityId) -> Option<&Ufo> {
        self.ufos.iter().find(|u| u.id == id)
    }

    pub fn orb(&self, id: EntityId) -> Option<&EnergyOrb> {
        self.energy_orbs.iter().find(|o| o.id == id)
    }

    pub fn base_for(&self, player: PlayerId) -> Option<&Base> {
        self.bases.iter().find(|b| b.player == player)
    }

    /// First UFO (in creation order) owned by `player`
    pub fn first_ufo_of(&self, player: PlayerId) -> Option<&Ufo> {
        self.ufos.iter().find(|u| u.owner == player)
    }

    /// Progress toward the winning score, 0-100
    pub fn winning_progress(&self, player: PlayerId) -> f32 {
        match self.player(player) {
            Some(p) if self.winning_score > 0 => {
                (p.stored_energy as f32 / self.winning_score as f32 * 100.0).min(100.0)
            }
            Some(_) => 100.0,
            None => 0.0,
        }
    }

    /// Total energy present in the session: orbs + carried + stored
    pub fn total_energy(&self) -> u64 {
        let orbs: u64 = self.energy_orbs.iter().map(|o| o.value as u64).sum();
        let carried: u64 = self.ufos.iter().map(|u| u.collected_energy as u64).sum();
        let stored: u64 = self.players.iter().map(|p| p.stored_energy as u64).sum();
        orbs + carried + stored
    }

    /// Copy of the full read surface
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            players: self.players.clone(),
            ufos: self.ufos.clone(),
            energy_orbs: self.energy_orbs.clone(),
            bases: self.bases.clone(),
            projectiles: self.projectiles.clone(),
            game_area_size: self.arena,
            is_running: self.is_running,
            is_multiplayer: self.is_multiplayer,
            winning_score: self.winning_score,
            ruleset: self.ruleset,
        }
    }

    /// Take all notifications queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let state = GameState::new(1, GameConfig::default());
        assert!(state.players().is_empty());
        assert!(state.ufos().is_empty());
        assert!(!state.is_running());
        assert_eq!(state.winning_score(), 500);
        assert_eq!(state.game_area_size(), ArenaSize::new(800.0, 600.0));
    }

    #[test]
    fn test_entity_ids_unique() {
        let mut state = GameState::new(1, GameConfig::default());
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_arena_validity() {
        assert!(!ArenaSize::new(0.0, 600.0).is_valid());
        assert!(!ArenaSize::new(800.0, f32::NAN).is_valid());
        assert!(ArenaSize::new(1.0, 1.0).is_valid());
    }

    #[test]
    fn test_player_id_format() {
        assert_eq!(PlayerId::ONE.to_string(), "Player 1");
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = GameState::new(1, GameConfig::default());
        let json = serde_json::to_string(&state.snapshot()).unwrap();
        assert!(json.contains("\"gameAreaSize\""));
        assert!(json.contains("\"isRunning\":false"));
    }
}
