pub mod clock;
pub mod cooldown;
pub mod frame;
pub mod geometry;

pub use clock::{Scheduler, TICK, TICK_RATE_HZ, TimerHandle};
pub use cooldown::Cooldowns;
pub use frame::{FrameDriven, run_ticks, run_until_over};
pub use geometry::Rect;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    pub use crate::frame::{run_ticks, run_until_over};

    use crate::frame::FrameDriven;

    /// Assert that the snapshot differs from `before`.
    pub fn assert_snapshot_changed<S: FrameDriven>(sim: &S, before: &S::Snapshot) {
        let after = sim.snapshot();
        assert_ne!(
            before, &after,
            "Snapshot should have changed after operation"
        );
    }

    // ================================================================
    // FrameDriven contract tests
    // ================================================================
    // Generic checks every FrameDriven implementation must pass. Game crates
    // call them from their own test modules with a started simulation.

    /// A running simulation must change its snapshot when ticked.
    pub fn contract_tick_advances_state<S: FrameDriven>(sim: &mut S) {
        let before = sim.snapshot();
        sim.tick();
        assert_snapshot_changed(sim, &before);
    }

    /// Once over, further ticks must not change the snapshot.
    pub fn contract_over_is_frozen<S: FrameDriven>(sim: &mut S, max_ticks: usize) {
        assert!(
            run_until_over(sim, max_ticks).is_some(),
            "Simulation must finish within {max_ticks} ticks"
        );
        let frozen = sim.snapshot();
        let events = run_ticks(sim, 10);
        assert!(events.is_empty(), "No events may be emitted after the end");
        assert_eq!(frozen, sim.snapshot(), "State must not change after the end");
    }

    /// reset() must return to pre-start: not over, and ticking emits nothing.
    pub fn contract_reset_returns_to_pre_start<S: FrameDriven>(sim: &mut S) {
        sim.reset();
        assert!(!sim.is_over(), "A reset simulation is not over");
        let before = sim.snapshot();
        let events = run_ticks(sim, 5);
        assert!(events.is_empty(), "Pre-start ticks must not emit events");
        assert_eq!(before, sim.snapshot(), "Pre-start ticks must not change state");
    }
}
