//! Per-frame simulation step
//!
//! Advances projectiles by the real elapsed time, resolves hits, cools
//! weapons down and runs deferred actions that have come due.

use glam::Vec2;
use rand::Rng;

use super::collision::{in_arena, point_in_circle};
use super::events::GameEvent;
use super::schedule::ScheduledAction;
use super::state::{EntityId, GameState, PlayerId, Projectile};
use crate::consts::REFERENCE_FRAME_MS;
use crate::{clamp_to_arena, direction_from_degrees};

/// A projectile hit resolved during a step
#[derive(Debug, Clone, Copy, PartialEq)]
struct Hit {
    ufo: EntityId,
    owner: PlayerId,
    shooter: PlayerId,
    position: Vec2,
}

impl GameState {
    /// Advance the simulation by `delta_ms` of wall-clock time.
    ///
    /// Call once per rendered frame with the true elapsed time. A
    /// projectile ends when it leaves the arena, runs out of lifetime, or
    /// hits the first enemy UFO it overlaps.
    pub fn update_projectiles(&mut self, delta_ms: f32) {
        let delta_ms = delta_ms.max(0.0);
        let frame_scale = delta_ms / REFERENCE_FRAME_MS;
        let (width, height) = (self.arena.width, self.arena.height);

        let in_flight = std::mem::take(&mut self.projectiles);
        let mut survivors: Vec<Projectile> = Vec::with_capacity(in_flight.len());

        for mut projectile in in_flight {
            projectile.position +=
                direction_from_degrees(projectile.direction) * projectile.speed * frame_scale;

            if !in_arena(projectile.position, width, height) {
                continue;
            }

            projectile.time_to_live -= delta_ms;
            if projectile.time_to_live <= 0.0 {
                continue;
            }

            let target = self
                .ufos
                .iter()
                .filter(|u| u.owner != projectile.owner)
                .find(|u| point_in_circle(projectile.position, u.position, u.radius))
                .map(|u| Hit {
                    ufo: u.id,
                    owner: u.owner,
                    shooter: projectile.owner,
                    position: u.position,
                });

            match target {
                Some(hit) => self.resolve_hit(hit),
                None => survivors.push(projectile),
            }
        }

        self.projectiles = survivors;

        for ufo in &mut self.ufos {
            ufo.cooldown = (ufo.cooldown - delta_ms).max(0.0);
        }

        for action in self.scheduler.advance(delta_ms) {
            match action {
                ScheduledAction::Respawn(player) => {
                    self.respawn_ufo(player);
                }
            }
        }
    }

    /// Destroy the hit UFO, scatter loot and queue its owner's respawn
    fn resolve_hit(&mut self, hit: Hit) {
        log::info!("{} destroyed ufo {} of {}", hit.shooter, hit.ufo, hit.owner);
        self.remove_ufo(hit.ufo);

        let scatter = self.config.loot_scatter;
        let orb_radius = self.config.orb_size / 2.0;
        for _ in 0..self.config.loot_orbs {
            let offset = if scatter > 0.0 {
                Vec2::new(
                    self.rng.random_range(-scatter..=scatter),
                    self.rng.random_range(-scatter..=scatter),
                )
            } else {
                Vec2::ZERO
            };
            let spot = clamp_to_arena(
                hit.position + offset,
                orb_radius,
                self.arena.width,
                self.arena.height,
            );
            self.add_energy_orb(spot);
        }

        self.notify(GameEvent::UfoDestroyed {
            ufo: hit.ufo,
            owner: hit.owner,
            by: hit.shooter,
        });
        let delay = self.config.respawn_delay_ms;
        self.scheduler.schedule(delay, ScheduledAction::Respawn(hit.owner));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance;
    use crate::sim::state::{ArenaSize, Ruleset};
    use crate::tuning::GameConfig;

    fn two_player() -> GameState {
        let mut state = GameState::new(2024, GameConfig::default());
        state.set_game_area_size(ArenaSize::new(800.0, 600.0));
        state.toggle_multiplayer(true);
        state.reset_game();
        state.start_game();
        state
    }

    fn ufo_of(state: &GameState, player: PlayerId) -> EntityId {
        state.first_ufo_of(player).unwrap().id
    }

    #[test]
    fn test_scenario_collect_single_player() {
        let mut state = GameState::new(1, GameConfig::default());
        state.set_ruleset(Ruleset::Competitive);
        state.set_game_area_size(ArenaSize::new(800.0, 600.0));
        state.toggle_multiplayer(false);
        state.reset_game();

        let player = state.player(PlayerId::ONE).unwrap();
        assert_eq!(player.stored_energy, 200);
        let ufo = state.ufos()[0].clone();
        assert!(distance(ufo.position, player.base_position) <= 50.0);

        let orb = state.add_energy_orb(Vec2::new(400.0, 300.0)).unwrap();
        assert_eq!(state.energy_orbs().len(), 1);

        assert!(state.collect_energy_orb(ufo.id, orb));
        assert_eq!(state.ufo(ufo.id).unwrap().collected_energy, 10);
        assert!(state.energy_orbs().is_empty());
    }

    #[test]
    fn test_scenario_fire_and_advance() {
        let mut state = two_player();
        let ufo1 = ufo_of(&state, PlayerId::ONE);
        // Keep the shot clear of player 2
        state.update_ufo_position(ufo1, Vec2::new(100.0, 300.0));
        state.ufos.iter_mut().find(|u| u.id == ufo1).unwrap().collected_energy = 20;

        state.fire_projectile(ufo1, 0.0).unwrap();
        assert_eq!(state.projectiles().len(), 1);
        assert_eq!(state.projectiles()[0].time_to_live, 1500.0);

        state.update_projectiles(16.0);
        let p = &state.projectiles()[0];
        let speed = state.config.projectile_speed;
        assert!((p.position.x - (100.0 + speed)).abs() < 1e-4);
        assert!((p.position.y - 300.0).abs() < 1e-4);
        assert_eq!(p.time_to_live, 1484.0);

        let ufo = state.ufo(ufo1).unwrap();
        assert_eq!(ufo.collected_energy, 0);
        // Cooldown was 500 at fire time and has since ticked once
        assert_eq!(ufo.cooldown, 484.0);
    }

    #[test]
    fn test_movement_is_frame_rate_independent() {
        let mut a = two_player();
        let mut b = two_player();
        for state in [&mut a, &mut b] {
            let ufo1 = ufo_of(state, PlayerId::ONE);
            state.update_ufo_position(ufo1, Vec2::new(100.0, 300.0));
            state.ufos.iter_mut().find(|u| u.id == ufo1).unwrap().collected_energy = 20;
            state.fire_projectile(ufo1, 0.0).unwrap();
        }

        a.update_projectiles(32.0);
        b.update_projectiles(16.0);
        b.update_projectiles(16.0);
        assert!((a.projectiles()[0].position.x - b.projectiles()[0].position.x).abs() < 1e-3);
    }

    #[test]
    fn test_scenario_hit_and_respawn() {
        let mut state = two_player();
        let ufo1 = ufo_of(&state, PlayerId::ONE);
        let ufo2 = ufo_of(&state, PlayerId::TWO);
        let target = Vec2::new(500.0, 300.0);
        state.update_ufo_position(ufo2, target);
        state.update_ufo_position(ufo1, Vec2::new(400.0, 300.0));
        state.ufos.iter_mut().find(|u| u.id == ufo1).unwrap().collected_energy = 20;

        state.fire_projectile(ufo1, 0.0).unwrap();
        // 10 px per frame: reaches within 40 px of x=500 after 7 frames
        for _ in 0..7 {
            state.update_projectiles(16.0);
        }

        assert!(state.ufo(ufo2).is_none());
        assert!(state.player(PlayerId::TWO).unwrap().ufos.is_empty());
        assert!(state.projectiles().is_empty());
        assert_eq!(state.energy_orbs().len(), 3);
        for orb in state.energy_orbs() {
            assert!(distance(orb.position, target) <= 40.0 * std::f32::consts::SQRT_2 + 1e-3);
            for base in state.bases() {
                assert!(distance(orb.position, base.position) >= 150.0);
            }
        }
        assert_eq!(state.pending_actions(), 1);

        // Not yet due
        state.update_projectiles(1000.0);
        assert!(state.player(PlayerId::TWO).unwrap().ufos.is_empty());

        state.update_projectiles(500.0);
        let player2 = state.player(PlayerId::TWO).unwrap();
        assert_eq!(player2.ufos.len(), 1);
        assert_eq!(player2.stored_energy, 100);
        assert!(!player2.is_loser);
    }

    #[test]
    fn test_loot_near_base_is_rejected() {
        let mut state = two_player();
        let ufo1 = ufo_of(&state, PlayerId::ONE);
        let ufo2 = ufo_of(&state, PlayerId::TWO);
        // Player 2's base sits at (720, 540)
        state.update_ufo_position(ufo2, Vec2::new(700.0, 520.0));
        state.update_ufo_position(ufo1, Vec2::new(655.0, 520.0));
        state.ufos.iter_mut().find(|u| u.id == ufo1).unwrap().collected_energy = 20;

        state.fire_projectile(ufo1, 0.0).unwrap();
        state.update_projectiles(16.0);

        assert!(state.ufo(ufo2).is_none());
        assert!(state.energy_orbs().len() < 3);
        let min = state.config.min_orb_distance_from_base;
        for orb in state.energy_orbs() {
            for base in state.bases() {
                assert!(distance(orb.position, base.position) >= min);
            }
        }
    }

    #[test]
    fn test_scenario_hit_without_funds_loses() {
        let mut state = two_player();
        state.players[1].stored_energy = 50;
        let ufo1 = ufo_of(&state, PlayerId::ONE);
        let ufo2 = ufo_of(&state, PlayerId::TWO);
        state.update_ufo_position(ufo2, Vec2::new(500.0, 300.0));
        state.update_ufo_position(ufo1, Vec2::new(455.0, 300.0));
        state.ufos.iter_mut().find(|u| u.id == ufo1).unwrap().collected_energy = 20;

        state.fire_projectile(ufo1, 0.0).unwrap();
        state.update_projectiles(16.0);
        assert!(state.ufo(ufo2).is_none());

        state.update_projectiles(1500.0);
        let player2 = state.player(PlayerId::TWO).unwrap();
        assert!(player2.is_loser);
        assert!(player2.ufos.is_empty());
        assert!(state.drain_events().contains(&GameEvent::PlayerLost { player: PlayerId::TWO }));
    }

    #[test]
    fn test_scenario_win_on_deposit() {
        let mut state = two_player();
        state.players[0].stored_energy = 480;
        let ufo1 = ufo_of(&state, PlayerId::ONE);
        state.ufos.iter_mut().find(|u| u.id == ufo1).unwrap().collected_energy = 20;

        state.deposit_energy(ufo1);
        let player1 = state.player(PlayerId::ONE).unwrap();
        assert_eq!(player1.stored_energy, 500);
        assert!(player1.is_winner);
        assert!(!state.is_running());

        let player2 = state.player(PlayerId::TWO).unwrap();
        assert!(!player2.is_winner && !player2.is_loser);
    }

    #[test]
    fn test_projectile_ignores_own_side() {
        let mut state = two_player();
        let ufo1 = ufo_of(&state, PlayerId::ONE);
        state.update_ufo_position(ufo1, Vec2::new(300.0, 300.0));
        // A second player-1 UFO directly in the line of fire
        let friendly = state.add_ufo(PlayerId::ONE, Vec2::new(330.0, 300.0));
        state.ufos.iter_mut().find(|u| u.id == ufo1).unwrap().collected_energy = 20;

        state.fire_projectile(ufo1, 0.0).unwrap();
        for _ in 0..5 {
            state.update_projectiles(16.0);
        }
        assert!(state.ufo(friendly).is_some());
        assert_eq!(state.projectiles().len(), 1);
    }

    #[test]
    fn test_projectile_leaves_arena() {
        let mut state = two_player();
        let ufo1 = ufo_of(&state, PlayerId::ONE);
        state.update_ufo_position(ufo1, Vec2::new(795.0, 100.0));
        state.ufos.iter_mut().find(|u| u.id == ufo1).unwrap().collected_energy = 20;

        state.fire_projectile(ufo1, 0.0).unwrap();
        state.update_projectiles(16.0);
        assert!(state.projectiles().is_empty());
    }

    #[test]
    fn test_projectile_expires() {
        let mut state = two_player();
        let ufo1 = ufo_of(&state, PlayerId::ONE);
        state.update_ufo_position(ufo1, Vec2::new(400.0, 100.0));
        state.ufos.iter_mut().find(|u| u.id == ufo1).unwrap().collected_energy = 20;

        state.fire_projectile(ufo1, 180.0).unwrap();
        state.projectiles[0].speed = 0.0;
        state.update_projectiles(1499.0);
        assert_eq!(state.projectiles().len(), 1);
        state.update_projectiles(1.0);
        assert!(state.projectiles().is_empty());
    }

    #[test]
    fn test_one_hit_per_projectile() {
        let mut state = two_player();
        let ufo1 = ufo_of(&state, PlayerId::ONE);
        state.update_ufo_position(ufo1, Vec2::new(300.0, 300.0));
        // Two overlapping enemy UFOs
        let a = state.add_ufo(PlayerId::TWO, Vec2::new(315.0, 300.0));
        let b = state.add_ufo(PlayerId::TWO, Vec2::new(320.0, 300.0));
        state.ufos.iter_mut().find(|u| u.id == ufo1).unwrap().collected_energy = 20;

        state.fire_projectile(ufo1, 0.0).unwrap();
        state.update_projectiles(16.0);
        let remaining = [a, b].iter().filter(|id| state.ufo(**id).is_some()).count();
        assert_eq!(remaining, 1);
        assert!(state.projectiles().is_empty());
    }

    #[test]
    fn test_cooldown_floors_at_zero() {
        let mut state = two_player();
        state.ufos[0].cooldown = 10.0;
        state.update_projectiles(16.0);
        assert_eq!(state.ufos[0].cooldown, 0.0);
    }

    #[test]
    fn test_respawn_dropped_by_reset() {
        let mut state = two_player();
        let ufo1 = ufo_of(&state, PlayerId::ONE);
        let ufo2 = ufo_of(&state, PlayerId::TWO);
        state.update_ufo_position(ufo2, Vec2::new(500.0, 300.0));
        state.update_ufo_position(ufo1, Vec2::new(455.0, 300.0));
        state.ufos.iter_mut().find(|u| u.id == ufo1).unwrap().collected_energy = 20;
        state.fire_projectile(ufo1, 0.0).unwrap();
        state.update_projectiles(16.0);
        assert_eq!(state.pending_actions(), 1);

        state.reset_game();
        assert_eq!(state.pending_actions(), 0);
        state.start_game();
        state.update_projectiles(2000.0);
        assert_eq!(state.player(PlayerId::TWO).unwrap().ufos.len(), 1);
        assert_eq!(state.player(PlayerId::TWO).unwrap().stored_energy, 200);
    }

    #[test]
    fn test_determinism() {
        let run = || {
            let mut state = two_player();
            for _ in 0..20 {
                state.spawn_random_orb();
            }
            state.energy_orbs().iter().map(|o| o.position).collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}
