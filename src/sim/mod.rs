//! Game session module
//!
//! All gameplay rules live here. This module must stay host-agnostic:
//! - Mutation only through `GameState` actions and the simulation step
//! - Seeded RNG only
//! - Delayed effects go through the scheduler, never an external timer
//! - No rendering or platform dependencies

pub mod actions;
pub mod collision;
pub mod events;
pub mod schedule;
pub mod state;
pub mod tick;

pub use actions::FireError;
pub use collision::{Positioned, nearest};
pub use events::GameEvent;
pub use schedule::{ScheduledAction, Scheduler};
pub use state::{
    ArenaSize, Base, EnergyOrb, EntityId, GameSnapshot, GameState, Player, PlayerId, Projectile,
    Ruleset, Ufo,
};

#[cfg(test)]
mod proptests {
    use glam::Vec2;
    use proptest::prelude::*;

    use super::*;
    use crate::tuning::GameConfig;
    use crate::{clamp_to_arena, distance};

    fn session(seed: u64, multiplayer: bool) -> GameState {
        let mut state = GameState::new(seed, GameConfig::default());
        state.set_game_area_size(ArenaSize::new(800.0, 600.0));
        state.toggle_multiplayer(multiplayer);
        state.reset_game();
        state
    }

    proptest! {
        #[test]
        fn clamped_positions_stay_in_bounds(
            x in -2000.0f32..2000.0,
            y in -2000.0f32..2000.0,
            width in 100.0f32..2000.0,
            height in 100.0f32..2000.0,
        ) {
            let mut state = session(1, false);
            state.set_game_area_size(ArenaSize::new(width, height));
            let ufo = state.ufos()[0].clone();
            let clamped = clamp_to_arena(Vec2::new(x, y), ufo.radius, width, height);
            state.update_ufo_position(ufo.id, clamped);

            let p = state.ufo(ufo.id).unwrap().position;
            prop_assert!(p.x >= ufo.radius && p.x <= width - ufo.radius);
            prop_assert!(p.y >= ufo.radius && p.y <= height - ufo.radius);
        }

        #[test]
        fn orbs_never_near_bases(
            seed in any::<u64>(),
            points in proptest::collection::vec((0.0f32..800.0, 0.0f32..600.0), 1..40),
            random_spawns in 0usize..20,
        ) {
            let mut state = session(seed, true);
            for (x, y) in points {
                state.add_energy_orb(Vec2::new(x, y));
            }
            for _ in 0..random_spawns {
                state.spawn_random_orb();
            }
            let min = state.config.min_orb_distance_from_base;
            for orb in state.energy_orbs() {
                for base in state.bases() {
                    prop_assert!(distance(orb.position, base.position) >= min);
                }
            }
        }

        #[test]
        fn fire_accounting(carried in 0u32..100, cooldown in prop_oneof![Just(0.0f32), 1.0f32..500.0]) {
            let mut state = session(9, false);
            let id = state.ufos()[0].id;
            state.ufos[0].collected_energy = carried;
            state.ufos[0].cooldown = cooldown;

            let result = state.fire_projectile(id, 45.0);
            let ufo = state.ufo(id).unwrap();
            if carried < 20 || cooldown > 0.0 {
                prop_assert!(result.is_err());
                prop_assert!(state.projectiles().is_empty());
                prop_assert_eq!(ufo.collected_energy, carried);
            } else {
                prop_assert!(result.is_ok());
                prop_assert_eq!(state.projectiles().len(), 1);
                prop_assert_eq!(ufo.collected_energy, carried - 20);
                prop_assert_eq!(ufo.cooldown, 500.0);
            }
        }

        #[test]
        fn collection_conserves_energy(
            orbs in proptest::collection::vec((300.0f32..500.0, 200.0f32..400.0), 1..10),
            replays in 1usize..4,
        ) {
            let mut state = session(4, false);
            let ufo = state.ufos()[0].id;
            let ids: Vec<EntityId> = orbs
                .iter()
                .filter_map(|&(x, y)| state.add_energy_orb(Vec2::new(x, y)))
                .collect();
            let total = state.total_energy();

            for _ in 0..replays {
                for &orb in &ids {
                    state.collect_energy_orb(ufo, orb);
                }
            }
            prop_assert_eq!(state.total_energy(), total);
            prop_assert_eq!(state.ufo(ufo).unwrap().collected_energy, 10 * ids.len() as u32);

            state.deposit_energy(ufo);
            prop_assert_eq!(state.total_energy(), total);
            prop_assert_eq!(state.ufo(ufo).unwrap().collected_energy, 0);
        }

        #[test]
        fn reset_twice_has_same_shape(seed in any::<u64>(), multiplayer in any::<bool>()) {
            let mut state = session(seed, multiplayer);
            state.start_game();
            state.spawn_random_orb();
            state.reset_game();
            let first = state.snapshot();
            state.reset_game();
            let second = state.snapshot();

            for snap in [&first, &second] {
                let players = if multiplayer { 2 } else { 1 };
                prop_assert_eq!(snap.players.len(), players);
                prop_assert_eq!(snap.bases.len(), players);
                prop_assert_eq!(snap.ufos.len(), players);
                prop_assert!(snap.energy_orbs.is_empty());
                prop_assert!(snap.projectiles.is_empty());
                prop_assert!(!snap.is_running);
                for player in &snap.players {
                    prop_assert_eq!(player.ufos.len(), 1);
                }
            }
        }
    }
}
