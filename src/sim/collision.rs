//! Collision and proximity queries
//!
//! Everything in the arena is a circle, so "hit" and "in reach" are both
//! center-distance tests. `nearest` is the one scan used for orb pickup,
//! orb clicks and projectile hits.

use glam::Vec2;

/// Anything with a position in the arena
pub trait Positioned {
    fn position(&self) -> Vec2;
}

impl Positioned for Vec2 {
    fn position(&self) -> Vec2 {
        *self
    }
}

/// Closest item to `origin` and its distance, or `None` for an empty input.
///
/// Ties keep the earliest item, so results follow iteration order.
pub fn nearest<'a, T, I>(origin: Vec2, items: I) -> Option<(&'a T, f32)>
where
    T: Positioned + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut best: Option<(&'a T, f32)> = None;
    for item in items {
        let d = origin.distance(item.position());
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((item, d)),
        }
    }
    best
}

/// Whether a point lies strictly inside a circle
#[inline]
pub fn point_in_circle(point: Vec2, center: Vec2, radius: f32) -> bool {
    point.distance(center) < radius
}

/// Whether a collector of `collector_radius` can pick up an orb of
/// diameter `orb_size` (touching counts)
#[inline]
pub fn within_reach(collector: Vec2, collector_radius: f32, orb: Vec2, orb_size: f32) -> bool {
    collector.distance(orb) <= collector_radius + orb_size / 2.0
}

/// Whether a UFO is close enough to its base to deposit.
///
/// The UFO counts as docked once its center is within half the base size
/// plus half its own radius.
#[inline]
pub fn docked_at_base(ufo_pos: Vec2, ufo_radius: f32, base_pos: Vec2, base_size: f32) -> bool {
    ufo_pos.distance(base_pos) < base_size / 2.0 + ufo_radius / 2.0
}

/// Whether a point is inside the arena rectangle (edges included)
#[inline]
pub fn in_arena(point: Vec2, width: f32, height: f32) -> bool {
    point.x >= 0.0 && point.x <= width && point.y >= 0.0 && point.y <= height
}
