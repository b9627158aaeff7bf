//! Platform abstraction layer
//!
//! Host-agnostic glue between a browser (or any other host) and the game
//! session:
//! - Frame driver: elapsed time, orb spawning, deferred init on first layout
//! - Input adapters: keyboard, pointer/touch drag, on-screen pad

pub mod driver;
pub mod input;

pub use driver::{FrameDriver, FrameReport};
pub use input::{
    ControlScheme, Direction, DirectionSet, DragAdapter, KeyboardAdapter, OnScreenPad,
};
