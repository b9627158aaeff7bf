//! Energy Drift - A UFO energy-collecting arcade game
//!
//! Core modules:
//! - `sim`: Authoritative game session (entities, actions, simulation step)
//! - `platform`: Frame driver and input adapters that feed the session
//! - `tuning`: Data-driven game balance

pub mod platform;
pub mod sim;
pub mod tuning;

pub use tuning::GameConfig;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Reference frame duration in milliseconds. Projectile speeds are
    /// expressed in pixels per reference frame.
    pub const REFERENCE_FRAME_MS: f32 = 16.0;

    /// Arena size used before the host reports a layout
    pub const DEFAULT_ARENA_WIDTH: f32 = 800.0;
    pub const DEFAULT_ARENA_HEIGHT: f32 = 600.0;

    /// Base placement as fractions of the arena (competitive ruleset)
    pub const FIRST_BASE_FRACTION: f32 = 0.1;
    pub const SECOND_BASE_FRACTION: f32 = 0.9;

    /// Classic ruleset: starting UFO sits this far left of the base
    pub const CLASSIC_UFO_OFFSET: f32 = 150.0;

    /// Player colors (player 1, player 2)
    pub const PLAYER_COLORS: [&str; 2] = ["#9b87f5", "#E879F9"];
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Heading of a movement delta in degrees, `atan2(dy, dx)`.
///
/// Screen coordinates: +x right, +y down, so 90° points down.
#[inline]
pub fn heading_degrees(delta: Vec2) -> f32 {
    delta.y.atan2(delta.x).to_degrees()
}

/// Unit vector for a heading given in degrees
#[inline]
pub fn direction_from_degrees(degrees: f32) -> Vec2 {
    let rad = degrees.to_radians();
    Vec2::new(rad.cos(), rad.sin())
}

/// Clamp a circle's center so the whole circle stays inside a
/// `width` x `height` arena.
///
/// If the arena is narrower than the circle the center collapses to the
/// arena midline instead of producing an inverted range.
pub fn clamp_to_arena(pos: Vec2, radius: f32, width: f32, height: f32) -> Vec2 {
    let clamp_axis = |v: f32, extent: f32| {
        if extent < radius * 2.0 {
            extent / 2.0
        } else {
            v.clamp(radius, extent - radius)
        }
    };
    Vec2::new(clamp_axis(pos.x, width), clamp_axis(pos.y, height))
}
