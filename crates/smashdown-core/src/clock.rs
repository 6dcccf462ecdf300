use std::time::Duration;

/// Simulation step length. Every tuning constant is a per-tick delta at this cadence.
pub const TICK: Duration = Duration::from_nanos(16_666_667);

/// Nominal frame-driver cadence in Hz.
pub const TICK_RATE_HZ: f32 = 60.0;

/// Handle to a scheduled entry. Stays inert once the entry fires or is cancelled,
/// even if the underlying slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    index: u32,
    generation: u32,
}

#[derive(Debug)]
struct Entry<E> {
    due: Duration,
    seq: u64,
    event: E,
}

#[derive(Debug)]
struct Slot<E> {
    generation: u32,
    entry: Option<Entry<E>>,
}

/// Virtual clock plus a deferred-event queue.
///
/// Deferred work is stored as plain event values instead of closures; the owner
/// advances the clock once per tick and dispatches whatever comes due. Nothing
/// fires unless [`Scheduler::advance`] is called, so the simulation stays
/// single-threaded and deterministic.
#[derive(Debug)]
pub struct Scheduler<E> {
    now: Duration,
    slots: Vec<Slot<E>>,
    free: Vec<u32>,
    next_seq: u64,
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            slots: Vec::new(),
            free: Vec::new(),
            next_seq: 0,
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `event` to come due `delay` after the current time.
    pub fn after(&mut self, delay: Duration, event: E) -> TimerHandle {
        let entry = Entry {
            due: self.now.saturating_add(delay),
            seq: self.next_seq,
            event,
        };
        self.next_seq += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entry = Some(entry);
            return TimerHandle {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            entry: Some(entry),
        });
        TimerHandle {
            index,
            generation: 0,
        }
    }

    /// Cancel a pending entry. Returns false if the handle is stale.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        if !self.is_pending(handle) {
            return false;
        }
        self.release(handle.index);
        true
    }

    /// Whether the entry behind `handle` is still waiting to fire.
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.slots
            .get(handle.index as usize)
            .is_some_and(|s| s.generation == handle.generation && s.entry.is_some())
    }

    /// Invalidate every pending entry and every outstanding handle.
    pub fn cancel_all(&mut self) {
        self.free.clear();
        for (i, slot) in self.slots.iter_mut().enumerate() {
            slot.entry = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(i as u32);
        }
    }

    /// Cancel everything and rewind the clock to zero.
    pub fn reset(&mut self) {
        self.cancel_all();
        self.now = Duration::ZERO;
    }

    /// Number of entries waiting to fire.
    pub fn pending(&self) -> usize {
        self.slots.iter().filter(|s| s.entry.is_some()).count()
    }

    /// Move the clock forward and return the events that came due, ordered by
    /// due time and then by scheduling order.
    pub fn advance(&mut self, dt: Duration) -> Vec<E> {
        self.now += dt;

        let mut due: Vec<(Duration, u64, u32)> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| {
                s.entry
                    .as_ref()
                    .filter(|e| e.due <= self.now)
                    .map(|e| (e.due, e.seq, i as u32))
            })
            .collect();
        due.sort_unstable();

        due.into_iter()
            .filter_map(|(_, _, index)| self.release(index))
            .collect()
    }

    fn release(&mut self, index: u32) -> Option<E> {
        let slot = &mut self.slots[index as usize];
        let entry = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        Some(entry.event)
    }
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Whole milliseconds in `d`, for snapshots and logs.
pub fn as_millis_u64(d: Duration) -> u64 {
    d.as_millis().min(u64::MAX as u128) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn nothing_fires_before_due() {
        let mut sched = Scheduler::new();
        sched.after(ms(100), "a");
        assert!(sched.advance(ms(99)).is_empty());
        assert_eq!(sched.advance(ms(1)), vec!["a"]);
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn fires_in_due_then_insertion_order() {
        let mut sched = Scheduler::new();
        sched.after(ms(50), 2);
        sched.after(ms(10), 1);
        sched.after(ms(50), 3);
        assert_eq!(sched.advance(ms(60)), vec![1, 2, 3]);
    }

    #[test]
    fn cancelled_entry_never_fires() {
        let mut sched = Scheduler::new();
        let h = sched.after(ms(10), "x");
        assert!(sched.cancel(h));
        assert!(!sched.cancel(h), "second cancel is a no-op");
        assert!(sched.advance(ms(20)).is_empty());
    }

    #[test]
    fn stale_handle_cannot_cancel_reused_slot() {
        let mut sched = Scheduler::new();
        let old = sched.after(ms(10), "old");
        assert_eq!(sched.advance(ms(10)), vec!["old"]);

        let new = sched.after(ms(10), "new");
        assert!(!sched.cancel(old));
        assert!(sched.is_pending(new));
        assert_eq!(sched.advance(ms(10)), vec!["new"]);
    }

    #[test]
    fn cancel_all_invalidates_handles() {
        let mut sched = Scheduler::new();
        let a = sched.after(ms(10), 'a');
        let b = sched.after(ms(20), 'b');
        sched.cancel_all();
        assert!(!sched.is_pending(a));
        assert!(!sched.is_pending(b));
        assert!(sched.advance(ms(100)).is_empty());

        let c = sched.after(ms(5), 'c');
        assert!(!sched.cancel(a), "pre-cancel handle must not touch new entries");
        assert!(sched.is_pending(c));
    }

    #[test]
    fn huge_delay_saturates_instead_of_overflowing() {
        let mut sched = Scheduler::new();
        sched.advance(ms(10));
        sched.after(Duration::MAX, "never");
        assert!(sched.advance(ms(1000)).is_empty());
        assert_eq!(sched.pending(), 1);
    }

    #[test]
    fn reset_rewinds_clock() {
        let mut sched: Scheduler<()> = Scheduler::new();
        sched.advance(ms(500));
        sched.after(ms(1), ());
        sched.reset();
        assert_eq!(sched.now(), Duration::ZERO);
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn sixty_ticks_is_about_one_second() {
        let total = TICK * 60;
        assert!(total >= Duration::from_secs(1));
        assert!(total < Duration::from_millis(1001));
    }
}
