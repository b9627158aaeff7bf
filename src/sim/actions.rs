//! Session actions
//!
//! These are the only ways to change a `GameState`. Each runs to
//! completion before returning. Unknown ids are no-ops, and game-rule
//! refusals come back as values (plus an advisory event) rather than
//! panics.

use std::error::Error;
use std::fmt;

use glam::Vec2;
use rand::Rng;

use super::events::GameEvent;
use super::state::{
    ArenaSize, Base, EnergyOrb, EntityId, GameState, Player, PlayerId, Projectile, Ruleset, Ufo,
};
use crate::consts::*;
use crate::{clamp_to_arena, distance};

/// Why a shot was refused
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FireError {
    UnknownUfo,
    InsufficientEnergy { available: u32, required: u32 },
    CoolingDown { remaining_ms: f32 },
}

impl fmt::Display for FireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FireError::UnknownUfo => write!(f, "no such UFO"),
            FireError::InsufficientEnergy { available, required } => {
                write!(f, "insufficient energy ({available} of {required})")
            }
            FireError::CoolingDown { remaining_ms } => {
                write!(f, "weapon cooling down ({remaining_ms:.0} ms left)")
            }
        }
    }
}

impl Error for FireError {}

impl GameState {
    // === UFOs ===

    /// Add a UFO for `owner` at `position` and return its id
    pub fn add_ufo(&mut self, owner: PlayerId, position: Vec2) -> EntityId {
        let id = self.next_entity_id();
        self.ufos.push(Ufo {
            id,
            position,
            collected_energy: 0,
            speed: self.config.ufo_speed,
            radius: self.config.ufo_radius,
            is_dragging: false,
            rotation: 0.0,
            owner,
            cooldown: 0.0,
        });
        if let Some(player) = self.players.iter_mut().find(|p| p.id == owner) {
            player.ufos.push(id);
        }
        id
    }

    /// Remove a UFO and unregister it from its owner
    pub fn remove_ufo(&mut self, id: EntityId) -> bool {
        let Some(idx) = self.ufos.iter().position(|u| u.id == id) else {
            log::debug!("remove_ufo: unknown ufo {id}");
            return false;
        };
        let ufo = self.ufos.remove(idx);
        if let Some(player) = self.players.iter_mut().find(|p| p.id == ufo.owner) {
            player.ufos.retain(|&u| u != id);
        }
        true
    }

    /// Overwrite a UFO's position. Callers clamp to the arena first.
    pub fn update_ufo_position(&mut self, id: EntityId, position: Vec2) -> bool {
        match self.ufos.iter_mut().find(|u| u.id == id) {
            Some(ufo) => {
                ufo.position = position;
                true
            }
            None => false,
        }
    }

    /// Set a UFO's facing (degrees)
    pub fn update_ufo_rotation(&mut self, id: EntityId, rotation: f32) -> bool {
        match self.ufos.iter_mut().find(|u| u.id == id) {
            Some(ufo) => {
                ufo.rotation = rotation;
                true
            }
            None => false,
        }
    }

    pub fn set_ufo_dragging(&mut self, id: EntityId, dragging: bool) -> bool {
        match self.ufos.iter_mut().find(|u| u.id == id) {
            Some(ufo) => {
                ufo.is_dragging = dragging;
                true
            }
            None => false,
        }
    }

    // === Orbs ===

    /// Place an orb unless it would sit within the minimum distance of any base
    pub fn add_energy_orb(&mut self, position: Vec2) -> Option<EntityId> {
        let min_dist = self.config.min_orb_distance_from_base;
        if self
            .bases
            .iter()
            .any(|b| distance(position, b.position) < min_dist)
        {
            log::debug!("Orb at ({:.0}, {:.0}) rejected: too close to a base", position.x, position.y);
            return None;
        }

        let id = self.next_entity_id();
        self.energy_orbs.push(EnergyOrb {
            id,
            position,
            value: self.config.orb_value,
            size: self.config.orb_size,
        });
        Some(id)
    }

    pub fn remove_energy_orb(&mut self, id: EntityId) -> bool {
        let before = self.energy_orbs.len();
        self.energy_orbs.retain(|o| o.id != id);
        self.energy_orbs.len() != before
    }

    /// Try to place an orb at a random padded position, retrying a bounded
    /// number of times when it lands too close to a base
    pub fn spawn_random_orb(&mut self) -> Option<EntityId> {
        let ArenaSize { width, height } = self.arena;
        let padding = self.config.spawn_padding;

        for _ in 0..self.config.spawn_attempts.max(1) {
            let x = sample_axis(&mut self.rng, width, padding);
            let y = sample_axis(&mut self.rng, height, padding);
            if let Some(id) = self.add_energy_orb(Vec2::new(x, y)) {
                return Some(id);
            }
        }

        log::debug!("spawn_random_orb: no free spot after {} attempts", self.config.spawn_attempts);
        None
    }

    /// Move an orb's value into a UFO's carried energy and remove the orb.
    ///
    /// Returns false if either entity is gone (a replayed or late request).
    pub fn collect_energy_orb(&mut self, ufo_id: EntityId, orb_id: EntityId) -> bool {
        let Some(orb_idx) = self.energy_orbs.iter().position(|o| o.id == orb_id) else {
            return false;
        };
        let Some(ufo) = self.ufos.iter_mut().find(|u| u.id == ufo_id) else {
            log::debug!("collect_energy_orb: unknown ufo {ufo_id}");
            return false;
        };

        let orb = self.energy_orbs.remove(orb_idx);
        ufo.collected_energy += orb.value;
        self.notify(GameEvent::OrbCollected { ufo: ufo_id, value: orb.value });
        true
    }

    // === Economy ===

    /// Bank a UFO's carried energy with its owner. Returns the amount moved.
    pub fn deposit_energy(&mut self, ufo_id: EntityId) -> u32 {
        let Some(ufo) = self.ufos.iter_mut().find(|u| u.id == ufo_id) else {
            return 0;
        };
        if ufo.collected_energy == 0 {
            return 0;
        }
        let owner = ufo.owner;
        let Some(player) = self.players.iter_mut().find(|p| p.id == owner) else {
            log::warn!("deposit_energy: ufo {ufo_id} has no owner {owner}");
            return 0;
        };

        let amount = std::mem::take(&mut ufo.collected_energy);
        player.stored_energy += amount;
        log::info!("{owner} deposited {amount} (total {})", player.stored_energy);
        self.notify(GameEvent::EnergyDeposited { player: owner, amount });

        match self.ruleset {
            Ruleset::Competitive => self.check_win_lose_conditions(),
            Ruleset::Classic => self.apply_level_up(owner),
        }
        amount
    }

    /// Classic ruleset: one level per deposit once the threshold is reached
    fn apply_level_up(&mut self, player_id: PlayerId) {
        let Some(stored) = self.player(player_id).map(|p| p.stored_energy) else {
            return;
        };
        let threshold = self.config.level_threshold;
        let Some(base) = self.bases.iter_mut().find(|b| b.player == player_id) else {
            return;
        };
        if stored >= base.level * threshold {
            base.level += 1;
            base.size = self.config.base_size_at_level(base.level);
            let level = base.level;
            log::info!("{player_id} base reached level {level}");
            self.notify(GameEvent::LevelUp { player: player_id, level });
        }
    }

    // === Combat ===

    /// Fire from a UFO's position along `direction` (degrees)
    pub fn fire_projectile(&mut self, ufo_id: EntityId, direction: f32) -> Result<EntityId, FireError> {
        let cost = self.config.shoot_cost;
        let Some(ufo) = self.ufos.iter().find(|u| u.id == ufo_id) else {
            return Err(FireError::UnknownUfo);
        };

        if ufo.collected_energy < cost {
            let available = ufo.collected_energy;
            log::debug!("ufo {ufo_id} cannot fire: {available} of {cost} energy");
            self.notify(GameEvent::InsufficientEnergy { ufo: ufo_id, available, required: cost });
            return Err(FireError::InsufficientEnergy { available, required: cost });
        }
        if ufo.cooldown > 0.0 {
            return Err(FireError::CoolingDown { remaining_ms: ufo.cooldown });
        }

        let id = self.next_entity_id();
        let cooldown = self.config.shoot_cooldown_ms;
        let Some(ufo) = self.ufos.iter_mut().find(|u| u.id == ufo_id) else {
            return Err(FireError::UnknownUfo);
        };
        ufo.collected_energy -= cost;
        ufo.cooldown = cooldown;
        let projectile = Projectile {
            id,
            position: ufo.position,
            direction,
            speed: self.config.projectile_speed,
            owner: ufo.owner,
            time_to_live: self.config.projectile_ttl_ms,
        };
        self.projectiles.push(projectile);
        Ok(id)
    }

    /// Buy a new UFO for `player_id` near its base.
    ///
    /// Without enough stored energy nothing is bought, and a player left
    /// with no UFOs is marked as the loser.
    pub fn respawn_ufo(&mut self, player_id: PlayerId) -> bool {
        let cost = self.config.respawn_cost;
        let Some(player) = self.players.iter_mut().find(|p| p.id == player_id) else {
            log::debug!("respawn_ufo: unknown player {player_id}");
            return false;
        };

        if player.stored_energy < cost {
            if player.ufos.is_empty() && !player.is_loser {
                player.is_loser = true;
                log::info!("{player_id} cannot afford a respawn and has no UFOs left");
                self.notify(GameEvent::PlayerLost { player: player_id });
            }
            return false;
        }

        player.stored_energy -= cost;
        let Some(ufo) = self.spawn_near_base(player_id) else {
            return false;
        };
        log::info!("{player_id} respawned ufo {ufo}");
        self.notify(GameEvent::UfoRespawned { ufo, owner: player_id });
        self.check_win_lose_conditions();
        true
    }

    /// Evaluate the sticky win/lose flags for every player.
    ///
    /// Both flags may end up set on the same player; the winner
    /// notification takes precedence. A new winner pauses the session.
    pub fn check_win_lose_conditions(&mut self) {
        if self.ruleset == Ruleset::Classic {
            return;
        }

        let winning_score = self.winning_score;
        let respawn_cost = self.config.respawn_cost;
        let mut new_winners = Vec::new();
        let mut new_losers = Vec::new();

        for player in &mut self.players {
            let was_winner = player.is_winner;
            let was_loser = player.is_loser;
            if player.stored_energy >= winning_score {
                player.is_winner = true;
            }
            if player.stored_energy < respawn_cost && player.ufos.is_empty() {
                player.is_loser = true;
            }

            if player.is_winner && !was_winner {
                new_winners.push(player.id);
            } else if player.is_loser && !was_loser {
                new_losers.push(player.id);
            }
        }

        for player in new_winners {
            log::info!("{player} reached {winning_score} and wins");
            self.notify(GameEvent::PlayerWon { player });
            self.is_running = false;
        }
        for player in new_losers {
            log::info!("{player} lost");
            self.notify(GameEvent::PlayerLost { player });
        }
    }

    // === Session ===

    /// Choose one- or two-player play; applies on the next reset
    pub fn toggle_multiplayer(&mut self, enabled: bool) {
        self.is_multiplayer = enabled;
    }

    /// Choose the rule set; applies on the next reset
    pub fn set_ruleset(&mut self, ruleset: Ruleset) {
        self.ruleset = ruleset;
    }

    /// Update the arena dimensions used for bounds and orb placement.
    ///
    /// Zero, negative or non-finite sizes are ignored.
    pub fn set_game_area_size(&mut self, size: ArenaSize) {
        if !size.is_valid() {
            log::debug!("ignoring arena size {}x{}", size.width, size.height);
            return;
        }
        self.arena = size;

        // The classic base follows the arena center
        if self.ruleset == Ruleset::Classic {
            let center = size.center();
            for base in &mut self.bases {
                base.position = center;
            }
            for player in &mut self.players {
                player.base_position = center;
            }
        }
    }

    pub fn start_game(&mut self) {
        if !self.is_running {
            log::info!("Game started");
        }
        self.is_running = true;
    }

    pub fn pause_game(&mut self) {
        if self.is_running {
            log::info!("Game paused");
        }
        self.is_running = false;
    }

    /// Rebuild the session from scratch for the current mode flags
    pub fn reset_game(&mut self) {
        self.players.clear();
        self.ufos.clear();
        self.energy_orbs.clear();
        self.bases.clear();
        self.projectiles.clear();
        self.scheduler.clear();
        self.events.clear();
        self.winning_score = self.config.winning_score;
        self.is_running = false;

        match self.ruleset {
            Ruleset::Competitive => {
                let ArenaSize { width, height } = self.arena;
                let corners = [
                    Vec2::new(width * FIRST_BASE_FRACTION, height * FIRST_BASE_FRACTION),
                    Vec2::new(width * SECOND_BASE_FRACTION, height * SECOND_BASE_FRACTION),
                ];
                let count = if self.is_multiplayer { 2 } else { 1 };
                for (i, &position) in corners.iter().take(count).enumerate() {
                    let id = PlayerId(i as u8 + 1);
                    self.add_player(id, position, self.config.starting_energy, i);
                    self.spawn_near_base(id);
                }
            }
            Ruleset::Classic => {
                let center = self.arena.center();
                self.add_player(PlayerId::ONE, center, 0, 0);
                let start = clamp_to_arena(
                    center - Vec2::new(CLASSIC_UFO_OFFSET, 0.0),
                    self.config.ufo_radius,
                    self.arena.width,
                    self.arena.height,
                );
                self.add_ufo(PlayerId::ONE, start);
            }
        }

        log::info!(
            "Game reset: {:?}, {} player(s), arena {}x{}",
            self.ruleset,
            self.players.len(),
            self.arena.width,
            self.arena.height
        );
    }

    fn add_player(&mut self, id: PlayerId, base_position: Vec2, stored_energy: u32, color_index: usize) {
        let color = PLAYER_COLORS[color_index % PLAYER_COLORS.len()].to_string();
        self.players.push(Player {
            id,
            base_position,
            color,
            stored_energy,
            ufos: Vec::new(),
            is_winner: false,
            is_loser: false,
        });
        self.bases.push(Base {
            position: base_position,
            player: id,
            size: self.config.base_size,
            level: 1,
        });
    }

    /// Add a UFO at the player's base with a small random offset
    pub(crate) fn spawn_near_base(&mut self, player_id: PlayerId) -> Option<EntityId> {
        let base = self.base_for(player_id)?.position;
        let jitter = self.config.spawn_jitter;
        let offset = if jitter > 0.0 {
            Vec2::new(
                self.rng.random_range(-jitter..=jitter),
                self.rng.random_range(-jitter..=jitter),
            )
        } else {
            Vec2::ZERO
        };
        let position = clamp_to_arena(
            base + offset,
            self.config.ufo_radius,
            self.arena.width,
            self.arena.height,
        );
        Some(self.add_ufo(player_id, position))
    }
}

/// Uniform sample in `[padding, extent - padding]`, or the midpoint when
/// the arena is too small to pad
fn sample_axis<R: Rng>(rng: &mut R, extent: f32, padding: f32) -> f32 {
    if extent - 2.0 * padding <= 0.0 {
        extent / 2.0
    } else {
        rng.random_range(padding..=extent - padding)
    }
}
