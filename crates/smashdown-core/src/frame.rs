use std::fmt::Debug;

use serde::Serialize;

use crate::clock::TICK_RATE_HZ;

/// Surface a frame driver uses to run a simulation.
///
/// The driver owns input capture and rendering; the simulation only consumes
/// commands and hands back snapshots and events. One call to [`tick`] is one
/// fixed simulation step, never scaled by wall-clock time.
///
/// [`tick`]: FrameDriven::tick
pub trait FrameDriven {
    /// Per-tick command from a human-controlled participant.
    type Command;
    /// Read-only view of the simulation for rendering.
    type Snapshot: Serialize + PartialEq + Debug;
    /// Notable things that happened during a tick (hits, match over).
    type Event: Debug;

    /// Queue a command to be consumed by the next tick.
    fn queue_command(&mut self, command: Self::Command);

    /// Advance the simulation by exactly one step.
    fn tick(&mut self) -> Vec<Self::Event>;

    /// Snapshot of the current state.
    fn snapshot(&self) -> Self::Snapshot;

    /// Whether the match has reached a terminal state.
    fn is_over(&self) -> bool;

    /// Tear down the current match and return to pre-start.
    fn reset(&mut self);

    /// Steps per second the tuning constants assume.
    fn tick_rate(&self) -> f32 {
        TICK_RATE_HZ
    }
}

/// Run `n` ticks without queuing any command, returning all accumulated events.
pub fn run_ticks<S: FrameDriven>(sim: &mut S, n: usize) -> Vec<S::Event> {
    let mut all_events = Vec::new();
    for _ in 0..n {
        all_events.extend(sim.tick());
    }
    all_events
}

/// Tick until the simulation reports it is over, up to `max_ticks`.
/// Returns the number of ticks run, or `None` if it never finished.
pub fn run_until_over<S: FrameDriven>(sim: &mut S, max_ticks: usize) -> Option<usize> {
    for i in 0..max_ticks {
        if sim.is_over() {
            return Some(i);
        }
        sim.tick();
    }
    sim.is_over().then_some(max_ticks)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts down to zero, emitting the remaining count each tick.
    struct Countdown {
        left: u32,
    }

    impl FrameDriven for Countdown {
        type Command = ();
        type Snapshot = u32;
        type Event = u32;

        fn queue_command(&mut self, _command: ()) {}

        fn tick(&mut self) -> Vec<u32> {
            if self.left == 0 {
                return Vec::new();
            }
            self.left -= 1;
            vec![self.left]
        }

        fn snapshot(&self) -> u32 {
            self.left
        }

        fn is_over(&self) -> bool {
            self.left == 0
        }

        fn reset(&mut self) {
            self.left = 0;
        }
    }

    #[test]
    fn run_ticks_collects_events() {
        let mut sim = Countdown { left: 5 };
        assert_eq!(run_ticks(&mut sim, 3), vec![4, 3, 2]);
    }

    #[test]
    fn run_until_over_counts_ticks() {
        let mut sim = Countdown { left: 4 };
        assert_eq!(run_until_over(&mut sim, 10), Some(4));

        let mut slow = Countdown { left: 50 };
        assert_eq!(run_until_over(&mut slow, 10), None);
        assert_eq!(slow.snapshot(), 40);
    }

    #[test]
    fn default_tick_rate() {
        assert_eq!(Countdown { left: 1 }.tick_rate(), 60.0);
    }
}
