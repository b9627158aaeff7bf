//! Frame driver
//!
//! Owned by the host and fed animation-frame timestamps. Turns them into
//! elapsed time for the session, spawns orbs on a fixed interval while the
//! game runs, and holds off the first session reset until the host reports
//! a real arena size.

use crate::sim::{ArenaSize, GameState};

/// What happened during one driven frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameReport {
    /// Elapsed time since the previous frame (0 on the first frame)
    pub delta_ms: f32,
    /// Whether the session was stepped
    pub stepped: bool,
    pub orbs_spawned: u32,
}

#[derive(Debug, Clone, Default)]
pub struct FrameDriver {
    last_timestamp_ms: Option<f64>,
    /// Running time since the last orb spawn attempt
    spawn_elapsed_ms: f32,
    initialized: bool,
    torn_down: bool,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the session has been reset against a real arena size
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Report the current arena size.
    ///
    /// The first valid size resets the session; later sizes only resize it.
    /// Returns true on the call that performed the initial reset.
    pub fn on_resize(&mut self, state: &mut GameState, width: f32, height: f32) -> bool {
        if self.torn_down {
            return false;
        }
        let size = ArenaSize::new(width, height);
        if !size.is_valid() {
            log::debug!("ignoring arena size {width}x{height}");
            return false;
        }

        state.set_game_area_size(size);
        if self.initialized {
            return false;
        }
        self.initialized = true;
        state.reset_game();
        log::info!("session initialized at {width}x{height}");
        true
    }

    /// Drive one animation frame at `timestamp_ms` (host clock)
    pub fn on_animation_frame(&mut self, state: &mut GameState, timestamp_ms: f64) -> FrameReport {
        if self.torn_down {
            return FrameReport::default();
        }

        let delta_ms = match self.last_timestamp_ms {
            Some(last) => (timestamp_ms - last).max(0.0) as f32,
            None => 0.0,
        };
        self.last_timestamp_ms = Some(timestamp_ms);

        let mut report = FrameReport {
            delta_ms,
            ..FrameReport::default()
        };
        if !self.initialized {
            return report;
        }

        if !state.is_running() {
            // Spawn interval restarts when play resumes
            self.spawn_elapsed_ms = 0.0;
            return report;
        }

        state.update_projectiles(delta_ms);
        report.stepped = true;

        // A win during the step pauses the session
        if !state.is_running() {
            self.spawn_elapsed_ms = 0.0;
            return report;
        }

        let interval = state.config.orb_spawn_interval_ms;
        if interval > 0.0 {
            self.spawn_elapsed_ms += delta_ms;
            if self.spawn_elapsed_ms >= interval {
                // At most one spawn per frame, even after a long stall
                self.spawn_elapsed_ms %= interval;
                if state.spawn_random_orb().is_some() {
                    report.orbs_spawned += 1;
                }
            }
        }
        report
    }

    /// Stop driving. Every later call is a no-op.
    pub fn teardown(&mut self) {
        if !self.torn_down {
            log::info!("frame driver torn down");
        }
        self.torn_down = true;
        self.last_timestamp_ms = None;
    }

    /// Re-arm after `teardown` (page restored from the back/forward cache).
    ///
    /// The next frame counts as a first frame, so no time passes for the
    /// period the driver was down.
    pub fn resume(&mut self) {
        if self.torn_down {
            log::info!("frame driver resumed");
        }
        self.torn_down = false;
        self.last_timestamp_ms = None;
        self.spawn_elapsed_ms = 0.0;
    }
}
