//! Input adapters
//!
//! Translate raw device input into session actions. The adapters keep only
//! interaction bookkeeping (held keys, drag offsets); every gameplay
//! decision reads the session and goes through its actions.

use glam::Vec2;

use crate::consts::REFERENCE_FRAME_MS;
use crate::sim::collision::{docked_at_base, nearest, point_in_circle, within_reach};
use crate::sim::{EntityId, GameEvent, GameState, PlayerId};
use crate::{clamp_to_arena, heading_degrees};

/// Cap on movement ticks applied in one frame
const MAX_MOVE_TICKS: u32 = 8;

/// One reference frame in milliseconds
pub const FRAME_MS: f32 = REFERENCE_FRAME_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Which directions are currently held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirectionSet {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl DirectionSet {
    pub fn set(&mut self, direction: Direction, held: bool) {
        match direction {
            Direction::Up => self.up = held,
            Direction::Down => self.down = held,
            Direction::Left => self.left = held,
            Direction::Right => self.right = held,
        }
    }

    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            up: self.up || other.up,
            down: self.down || other.down,
            left: self.left || other.left,
            right: self.right || other.right,
        }
    }

    /// Screen-space displacement for one tick (opposites cancel)
    pub fn displacement(&self, step: f32) -> Vec2 {
        let mut d = Vec2::ZERO;
        if self.up {
            d.y -= step;
        }
        if self.down {
            d.y += step;
        }
        if self.left {
            d.x -= step;
        }
        if self.right {
            d.x += step;
        }
        d
    }
}

/// Keyboard movement layouts for local two-player play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlScheme {
    /// Arrow keys, always player 1
    Arrows,
    /// W/A/S/D, player 2 (player 1 in single-player sessions)
    Wasd,
}

impl ControlScheme {
    /// Map a `KeyboardEvent.key` value to a scheme and direction
    pub fn from_key(key: &str) -> Option<(Self, Direction)> {
        let mapped = match key {
            "ArrowUp" => (ControlScheme::Arrows, Direction::Up),
            "ArrowDown" => (ControlScheme::Arrows, Direction::Down),
            "ArrowLeft" => (ControlScheme::Arrows, Direction::Left),
            "ArrowRight" => (ControlScheme::Arrows, Direction::Right),
            "w" | "W" => (ControlScheme::Wasd, Direction::Up),
            "s" | "S" => (ControlScheme::Wasd, Direction::Down),
            "a" | "A" => (ControlScheme::Wasd, Direction::Left),
            "d" | "D" => (ControlScheme::Wasd, Direction::Right),
            _ => return None,
        };
        Some(mapped)
    }
}

// === Shared helpers ===

/// Move a UFO toward `target`, clamped so it stays fully inside the arena.
///
/// With `face_movement` the UFO also turns to face the direction it moved.
pub fn move_ufo_within_arena(
    state: &mut GameState,
    id: EntityId,
    target: Vec2,
    face_movement: bool,
) -> bool {
    let Some(ufo) = state.ufo(id) else {
        return false;
    };
    let arena = state.game_area_size();
    let bounded = clamp_to_arena(target, ufo.radius, arena.width, arena.height);
    let delta = bounded - ufo.position;

    if face_movement && delta != Vec2::ZERO {
        state.update_ufo_rotation(id, heading_degrees(delta));
    }
    state.update_ufo_position(id, bounded)
}

/// End direct control of a UFO and bank its energy if it is docked at its
/// owner's base. Returns the amount deposited.
pub fn release_ufo(state: &mut GameState, id: EntityId) -> u32 {
    state.set_ufo_dragging(id, false);

    let Some(ufo) = state.ufo(id) else {
        return 0;
    };
    if ufo.collected_energy == 0 {
        return 0;
    }
    let Some(base) = state.base_for(ufo.owner) else {
        return 0;
    };
    if docked_at_base(ufo.position, ufo.radius, base.position, base.size) {
        state.deposit_energy(id)
    } else {
        0
    }
}

/// Fire from the player's lead UFO along its facing
pub fn fire_from_player(state: &mut GameState, player: PlayerId) -> Option<EntityId> {
    if !state.is_running() {
        log::debug!("fire ignored: game not running");
        return None;
    }
    let ufo = state.first_ufo_of(player)?;
    let (id, rotation) = (ufo.id, ufo.rotation);
    match state.fire_projectile(id, rotation) {
        Ok(projectile) => Some(projectile),
        Err(e) => {
            log::debug!("{player} could not fire: {e}");
            None
        }
    }
}

/// Collect the closest reachable orb for the locally controlled UFOs.
///
/// In two-player sessions only player 1's UFOs take part. Stops after the
/// first successful pickup.
pub fn collect_nearest(state: &mut GameState) -> Option<EntityId> {
    if !state.is_running() {
        return None;
    }

    let multiplayer = state.players().len() > 1;
    let candidates: Vec<(EntityId, Vec2, f32)> = state
        .ufos()
        .iter()
        .filter(|u| !multiplayer || u.owner == PlayerId::ONE)
        .map(|u| (u.id, u.position, u.radius))
        .collect();

    for (ufo, position, radius) in candidates {
        let Some((orb, _)) = nearest(position, state.energy_orbs()) else {
            continue;
        };
        if within_reach(position, radius, orb.position, orb.size) {
            let orb_id = orb.id;
            if state.collect_energy_orb(ufo, orb_id) {
                return Some(orb_id);
            }
        }
    }

    state.notify(GameEvent::OrbOutOfReach);
    None
}

/// Collect a specific orb (clicked or tapped) with whichever UFO is closest
pub fn collect_orb(state: &mut GameState, orb_id: EntityId) -> bool {
    if !state.is_running() {
        return false;
    }
    let Some(orb) = state.orb(orb_id) else {
        return false;
    };
    let (orb_pos, orb_size) = (orb.position, orb.size);

    let Some((ufo, _)) = nearest(orb_pos, state.ufos()) else {
        return false;
    };
    if within_reach(ufo.position, ufo.radius, orb_pos, orb_size) {
        let ufo_id = ufo.id;
        state.collect_energy_orb(ufo_id, orb_id)
    } else {
        state.notify(GameEvent::OrbOutOfReach);
        false
    }
}

// === Continuous steering ===

/// Applies held directions to a player's lead UFO at a fixed tick rate
#[derive(Debug, Clone, Default)]
struct Steering {
    driving: Option<EntityId>,
    accumulator_ms: f32,
}

impl Steering {
    fn advance(&mut self, state: &mut GameState, player: PlayerId, held: DirectionSet, delta_ms: f32) {
        if !held.any() {
            if let Some(id) = self.driving.take() {
                release_ufo(state, id);
            }
            self.accumulator_ms = 0.0;
            return;
        }
        if !state.is_running() {
            return;
        }

        let Some(ufo) = state.first_ufo_of(player) else {
            self.driving = None;
            return;
        };
        let id = ufo.id;
        if self.driving != Some(id) {
            if let Some(previous) = self.driving {
                state.set_ufo_dragging(previous, false);
            }
            state.set_ufo_dragging(id, true);
            self.driving = Some(id);
        }

        let tick = state.config.movement_tick_ms.max(1.0);
        self.accumulator_ms += delta_ms.max(0.0);
        let mut ticks = 0;
        while self.accumulator_ms >= tick && ticks < MAX_MOVE_TICKS {
            self.accumulator_ms -= tick;
            ticks += 1;
            self.step(state, id, held);
        }
        if ticks == MAX_MOVE_TICKS {
            self.accumulator_ms = 0.0;
        }
    }

    fn step(&self, state: &mut GameState, id: EntityId, held: DirectionSet) {
        let Some(ufo) = state.ufo(id) else {
            return;
        };
        let step = ufo.speed * state.config.keyboard_speed_multiplier;
        let delta = held.displacement(step);
        if delta == Vec2::ZERO {
            return;
        }
        let target = ufo.position + delta;
        state.update_ufo_rotation(id, heading_degrees(delta));
        move_ufo_within_arena(state, id, target, false);
    }
}

// === Keyboard ===

/// Arrow keys for player 1, WASD for player 2, F to fire, Space to collect
#[derive(Debug, Clone, Default)]
pub struct KeyboardAdapter {
    arrows_held: DirectionSet,
    wasd_held: DirectionSet,
    arrows: Steering,
    wasd: Steering,
}

impl KeyboardAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a key press. Returns true if the key is a game key.
    pub fn key_down(&mut self, state: &mut GameState, key: &str) -> bool {
        if let Some((scheme, direction)) = ControlScheme::from_key(key) {
            self.held_mut(scheme).set(direction, true);
            return true;
        }
        match key {
            "f" | "F" => {
                fire_from_player(state, PlayerId::ONE);
                true
            }
            " " => {
                collect_nearest(state);
                true
            }
            _ => false,
        }
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        match ControlScheme::from_key(key) {
            Some((scheme, direction)) => {
                self.held_mut(scheme).set(direction, false);
                true
            }
            None => false,
        }
    }

    /// Forget every held key (focus loss)
    pub fn release_all(&mut self) {
        self.arrows_held.clear();
        self.wasd_held.clear();
    }

    pub fn is_moving(&self) -> bool {
        self.arrows_held.any() || self.wasd_held.any()
    }

    /// Apply held movement for `delta_ms` of elapsed time
    pub fn advance(&mut self, state: &mut GameState, delta_ms: f32) {
        // Single-player sessions accept both layouts for player 1
        let (first, second) = if state.players().len() > 1 {
            (self.arrows_held, self.wasd_held)
        } else {
            (self.arrows_held.union(self.wasd_held), DirectionSet::default())
        };
        self.arrows.advance(state, PlayerId::ONE, first, delta_ms);
        self.wasd.advance(state, PlayerId::TWO, second, delta_ms);
    }

    fn held_mut(&mut self, scheme: ControlScheme) -> &mut DirectionSet {
        match scheme {
            ControlScheme::Arrows => &mut self.arrows_held,
            ControlScheme::Wasd => &mut self.wasd_held,
        }
    }
}

// === Pointer / touch drag ===

#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    ufo: EntityId,
    /// Grab point relative to the UFO center
    offset: Vec2,
    /// Touch identifier, `None` for a mouse
    pointer: Option<i32>,
}

/// Click-and-drag (or touch-and-drag) a UFO around the arena
#[derive(Debug, Clone, Default)]
pub struct DragAdapter {
    active: Option<Drag>,
}

impl DragAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start dragging the UFO under `point`, if any
    pub fn pointer_down(&mut self, state: &mut GameState, point: Vec2, pointer: Option<i32>) -> Option<EntityId> {
        if self.active.is_some() {
            return None;
        }
        let (id, position) = state
            .ufos()
            .iter()
            .rev()
            .find(|u| point_in_circle(point, u.position, u.radius))
            .map(|u| (u.id, u.position))?;

        state.set_ufo_dragging(id, true);
        self.active = Some(Drag {
            ufo: id,
            offset: point - position,
            pointer,
        });
        Some(id)
    }

    /// Follow the pointer while a drag is active
    pub fn pointer_move(&mut self, state: &mut GameState, point: Vec2, pointer: Option<i32>) -> bool {
        let Some(drag) = self.active else {
            return false;
        };
        if drag.pointer != pointer {
            return false;
        }
        match state.ufo(drag.ufo) {
            Some(ufo) if ufo.is_dragging => {}
            Some(_) => return false,
            None => {
                // Destroyed mid-drag
                self.active = None;
                return false;
            }
        }
        move_ufo_within_arena(state, drag.ufo, point - drag.offset, true)
    }

    /// Drop the UFO; deposits if it was released on its own base
    pub fn pointer_up(&mut self, state: &mut GameState, pointer: Option<i32>) -> u32 {
        match self.active {
            Some(drag) if drag.pointer == pointer => {
                self.active = None;
                release_ufo(state, drag.ufo)
            }
            _ => 0,
        }
    }

    /// Abandon the drag without a deposit check (touch cancel, teardown)
    pub fn cancel(&mut self, state: &mut GameState) {
        if let Some(drag) = self.active.take() {
            state.set_ufo_dragging(drag.ufo, false);
        }
    }

    pub fn dragging(&self) -> Option<EntityId> {
        self.active.map(|d| d.ufo)
    }
}

// === On-screen pad ===

/// Touch buttons: a direction pad for player 1 plus GRAB and FIRE
#[derive(Debug, Clone, Default)]
pub struct OnScreenPad {
    held: DirectionSet,
    steering: Steering,
}

impl OnScreenPad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, direction: Direction) {
        self.held.set(direction, true);
    }

    /// Any button release stops all movement
    pub fn release(&mut self) {
        self.held.clear();
    }

    pub fn advance(&mut self, state: &mut GameState, delta_ms: f32) {
        self.steering.advance(state, PlayerId::ONE, self.held, delta_ms);
    }

    pub fn grab(&mut self, state: &mut GameState) -> Option<EntityId> {
        collect_nearest(state)
    }

    pub fn fire(&mut self, state: &mut GameState) -> Option<EntityId> {
        fire_from_player(state, PlayerId::ONE)
    }
}
