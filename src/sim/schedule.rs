//! Deferred actions on the simulation clock
//!
//! Delayed effects (respawning a destroyed UFO) are queued here with a due
//! time instead of running on a free-standing timer. The simulation step
//! advances the clock and applies whatever has come due, so every mutation
//! happens inside the same serialized tick.

use super::state::PlayerId;

/// An action to run once its due time is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledAction {
    /// Attempt to respawn a UFO for this player
    Respawn(PlayerId),
}

#[derive(Debug, Clone)]
struct Entry {
    due_ms: f64,
    /// Insertion order, breaks ties between equal due times
    seq: u64,
    action: ScheduledAction,
}

/// Ordered queue of deferred actions
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now_ms: f64,
    next_seq: u64,
    pending: Vec<Entry>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulation time (ms since session reset)
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Queue `action` to run `delay_ms` from now
    pub fn schedule(&mut self, delay_ms: f32, action: ScheduledAction) {
        let entry = Entry {
            due_ms: self.now_ms + delay_ms.max(0.0) as f64,
            seq: self.next_seq,
            action,
        };
        self.next_seq += 1;
        self.pending.push(entry);
    }

    /// Advance the clock and return every action now due, earliest first
    pub fn advance(&mut self, delta_ms: f32) -> Vec<ScheduledAction> {
        self.now_ms += delta_ms.max(0.0) as f64;
        let now = self.now_ms;

        let mut due: Vec<Entry> = Vec::new();
        self.pending.retain(|e| {
            if e.due_ms <= now {
                due.push(e.clone());
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|e| e.action).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop everything and rewind the clock
    pub fn clear(&mut self) {
        self.pending.clear();
        self.now_ms = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_due_early() {
        let mut s = Scheduler::new();
        s.schedule(1500.0, ScheduledAction::Respawn(PlayerId(1)));
        assert!(s.advance(1000.0).is_empty());
        assert_eq!(s.len(), 1);
        assert_eq!(s.advance(500.0), vec![ScheduledAction::Respawn(PlayerId(1))]);
        assert!(s.is_empty());
    }

    #[test]
    fn test_due_order() {
        let mut s = Scheduler::new();
        s.schedule(300.0, ScheduledAction::Respawn(PlayerId(2)));
        s.schedule(100.0, ScheduledAction::Respawn(PlayerId(1)));
        s.schedule(300.0, ScheduledAction::Respawn(PlayerId(1)));
        let due = s.advance(1000.0);
        assert_eq!(
            due,
            vec![
                ScheduledAction::Respawn(PlayerId(1)),
                ScheduledAction::Respawn(PlayerId(2)),
                ScheduledAction::Respawn(PlayerId(1)),
            ]
        );
    }

    #[test]
    fn test_clear() {
        let mut s = Scheduler::new();
        s.advance(50.0);
        s.schedule(10.0, ScheduledAction::Respawn(PlayerId(1)));
        s.clear();
        assert!(s.is_empty());
        assert_eq!(s.now_ms(), 0.0);
    }
}
